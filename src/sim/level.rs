//! Level parameters, level tables and the difficulty curve
//!
//! A level table only supplies glitch probability and fall speed; the
//! spawn interval always comes from [`spawn_interval_for_level`].

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::consts::*;
use crate::error::{ConfigError, Result, SpawnError};

/// One row of the level table
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LevelRow {
    /// Probability in [0, 1] that a spawn is glitched
    pub bad_emoji_chance: f32,
    /// Pixels per second
    pub fall_speed: f32,
}

/// Resolved parameters for the running level
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LevelParameters {
    pub level_index: u32,
    pub spawn_interval_seconds: f32,
    pub bad_emoji_chance: f32,
    pub fall_speed: f32,
}

impl LevelParameters {
    /// Combine a table row with the difficulty curve, validating both
    pub fn resolve(level_index: u32, row: LevelRow) -> Result<Self> {
        let invalid = |reason| SpawnError::InvalidLevelParameters {
            level_index,
            reason,
        };
        if !(0.0..=1.0).contains(&row.bad_emoji_chance) {
            return Err(invalid("bad_emoji_chance must be within [0, 1]"));
        }
        if !(row.fall_speed > 0.0) || !row.fall_speed.is_finite() {
            return Err(invalid("fall_speed must be positive"));
        }
        Ok(Self {
            level_index,
            spawn_interval_seconds: spawn_interval_for_level(level_index),
            bad_emoji_chance: row.bad_emoji_chance,
            fall_speed: row.fall_speed,
        })
    }
}

/// Difficulty curve: seconds between spawns for a level
///
/// Step function with strict `>` thresholds. Level 50 is its own tier;
/// levels past it fall back to the chaos tier.
pub fn spawn_interval_for_level(level_index: u32) -> f32 {
    if level_index == VOID_LEVEL {
        return VOID_SPAWN_INTERVAL;
    }
    if level_index > CHAOS_TIER_AFTER {
        CHAOS_SPAWN_INTERVAL
    } else if level_index > FAST_TIER_AFTER {
        FAST_SPAWN_INTERVAL
    } else {
        BASE_SPAWN_INTERVAL
    }
}

/// Lookup capability for level rows
pub trait LevelTable {
    fn get_row(&self, level_index: u32) -> Option<LevelRow>;
}

impl<T: LevelTable + ?Sized> LevelTable for Box<T> {
    fn get_row(&self, level_index: u32) -> Option<LevelRow> {
        (**self).get_row(level_index)
    }
}

/// Explicit rows keyed by level index
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StaticLevelTable {
    rows: BTreeMap<u32, LevelRow>,
}

#[derive(Deserialize)]
struct RowRecord {
    level: u32,
    bad_emoji_chance: f32,
    fall_speed: f32,
}

impl StaticLevelTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_row(mut self, level_index: u32, row: LevelRow) -> Self {
        self.insert(level_index, row);
        self
    }

    pub fn insert(&mut self, level_index: u32, row: LevelRow) {
        self.rows.insert(level_index, row);
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Parse a JSON array of `{ level, bad_emoji_chance, fall_speed }`
    pub fn from_json(json: &str) -> std::result::Result<Self, ConfigError> {
        let records: Vec<RowRecord> = serde_json::from_str(json)?;
        let mut table = Self::new();
        for record in records {
            if table.rows.contains_key(&record.level) {
                return Err(ConfigError::Invalid(format!(
                    "duplicate row for level {}",
                    record.level
                )));
            }
            table.insert(
                record.level,
                LevelRow {
                    bad_emoji_chance: record.bad_emoji_chance,
                    fall_speed: record.fall_speed,
                },
            );
        }
        log::info!("Loaded level table with {} rows", table.len());
        Ok(table)
    }
}

impl LevelTable for StaticLevelTable {
    fn get_row(&self, level_index: u32) -> Option<LevelRow> {
        self.rows.get(&level_index).copied()
    }
}

/// Formula-driven table covering levels `1..=max_level`
///
/// Fall speed ramps linearly; every `wave_cycle_length`-th level is a
/// relief wave that falls slower. Glitch chance ramps from zero at level 1
/// to `max_bad_emoji_chance` at `max_level`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProceduralLevelTable {
    pub max_level: u32,
    pub base_fall_speed: f32,
    pub fall_speed_per_level: f32,
    pub wave_cycle_length: u32,
    pub relief_speed_factor: f32,
    pub max_bad_emoji_chance: f32,
}

impl Default for ProceduralLevelTable {
    fn default() -> Self {
        Self {
            max_level: VOID_LEVEL,
            base_fall_speed: 100.0,
            fall_speed_per_level: 6.0,
            wave_cycle_length: 10,
            relief_speed_factor: 0.8,
            max_bad_emoji_chance: 0.35,
        }
    }
}

impl ProceduralLevelTable {
    /// Relief waves close each cycle (levels 10, 20, ...)
    pub fn is_relief_wave(&self, level_index: u32) -> bool {
        self.wave_cycle_length > 0
            && level_index >= 1
            && (level_index - 1) % self.wave_cycle_length == self.wave_cycle_length - 1
    }
}

impl LevelTable for ProceduralLevelTable {
    fn get_row(&self, level_index: u32) -> Option<LevelRow> {
        if level_index == 0 || level_index > self.max_level {
            return None;
        }
        let ramp = (level_index - 1) as f32;
        let mut fall_speed = self.base_fall_speed + ramp * self.fall_speed_per_level;
        if self.is_relief_wave(level_index) {
            fall_speed *= self.relief_speed_factor;
        }
        let progress = if self.max_level > 1 {
            ramp / (self.max_level - 1) as f32
        } else {
            1.0
        };
        Some(LevelRow {
            bad_emoji_chance: (progress * self.max_bad_emoji_chance).clamp(0.0, 1.0),
            fall_speed,
        })
    }
}
