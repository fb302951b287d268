//! Spawn tuning and play-area settings
//!
//! Everything a designer may want to tweak without touching the simulation.
//! Loaded from JSON; missing fields fall back to defaults.

use serde::{Deserialize, Serialize};

use crate::consts::*;
use crate::error::ConfigError;

/// What the pool does when every entry is in flight
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum PoolPolicy {
    /// Hard capacity; spawns are dropped while exhausted
    #[default]
    Fixed,
    /// Grow one entry at a time up to `max_capacity`, then drop
    Grow { max_capacity: usize },
}

impl PoolPolicy {
    pub fn as_str(&self) -> &'static str {
        match self {
            PoolPolicy::Fixed => "fixed",
            PoolPolicy::Grow { .. } => "grow",
        }
    }

    /// Upper bound on pool size given its warm-up capacity
    pub fn max_capacity(&self, warm_capacity: usize) -> usize {
        match self {
            PoolPolicy::Fixed => warm_capacity,
            PoolPolicy::Grow { max_capacity } => (*max_capacity).max(warm_capacity),
        }
    }
}

/// Play-area geometry in pixels, origin at top-left, y grows downward
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlayArea {
    pub width: f32,
    pub height: f32,
    /// Number of equal-width spawn columns
    pub lanes: u32,
    /// Vertical spawn origin (negative = above the visible area)
    pub spawn_y: f32,
    /// Distance of the kill line from the bottom edge
    pub floor_margin: f32,
}

impl Default for PlayArea {
    fn default() -> Self {
        Self {
            width: PLAY_AREA_WIDTH,
            height: PLAY_AREA_HEIGHT,
            lanes: LANE_COUNT,
            spawn_y: SPAWN_Y,
            floor_margin: FLOOR_MARGIN,
        }
    }
}

impl PlayArea {
    /// Y coordinate past which a projectile has left the play area
    #[inline]
    pub fn kill_y(&self) -> f32 {
        self.height - self.floor_margin
    }

    #[inline]
    pub fn lane_width(&self) -> f32 {
        self.width / self.lanes.max(1) as f32
    }

    /// Horizontal centre of a lane (lanes beyond the last are clamped)
    pub fn lane_center_x(&self, lane: u32) -> f32 {
        let lane = lane.min(self.lanes.max(1) - 1);
        let w = self.lane_width();
        lane as f32 * w + w / 2.0
    }
}

/// Irregular motion applied to glitched projectiles
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GlitchSettings {
    /// Maximum lateral displacement from the lane centre (pixels)
    pub jitter_amplitude: f32,
    /// How many times per second the jitter target re-rolls
    pub step_hz: f32,
    /// Fall speed multiplier range; each step picks a value in between
    pub stutter_min: f32,
    pub stutter_max: f32,
}

impl Default for GlitchSettings {
    fn default() -> Self {
        Self {
            jitter_amplitude: 18.0,
            step_hz: 12.0,
            stutter_min: 0.4,
            stutter_max: 1.6,
        }
    }
}

/// Complete spawn-core configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SpawnSettings {
    /// Entries constructed at warm-up
    pub pool_capacity: usize,
    pub pool_policy: PoolPolicy,
    pub play_area: PlayArea,
    pub glitch: GlitchSettings,
    /// Redraws allowed to avoid a word already on screen
    pub unique_word_retries: u32,
    /// Seed for the spawn coordinator's RNG
    pub seed: u64,
    /// Spiral-of-death guard for the spawn timer
    pub max_timer_fires_per_frame: u32,
}

impl Default for SpawnSettings {
    fn default() -> Self {
        Self {
            pool_capacity: DEFAULT_POOL_CAPACITY,
            pool_policy: PoolPolicy::Fixed,
            play_area: PlayArea::default(),
            glitch: GlitchSettings::default(),
            unique_word_retries: UNIQUE_WORD_RETRIES,
            seed: 0x4e45_5855_53,
            max_timer_fires_per_frame: MAX_TIMER_FIRES_PER_FRAME,
        }
    }
}

impl SpawnSettings {
    /// Parse settings from JSON and validate them
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let settings: Self = serde_json::from_str(json)?;
        settings.validate()?;
        log::info!(
            "Loaded spawn settings (pool {} / {}, {} lanes)",
            settings.pool_capacity,
            settings.pool_policy.as_str(),
            settings.play_area.lanes
        );
        Ok(settings)
    }

    pub fn to_json(&self) -> Result<String, ConfigError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.pool_capacity == 0 {
            return Err(ConfigError::Invalid("pool_capacity must be at least 1".into()));
        }
        if self.play_area.lanes == 0 {
            return Err(ConfigError::Invalid("play_area.lanes must be at least 1".into()));
        }
        if !(self.play_area.width > 0.0) || !(self.play_area.kill_y() > self.play_area.spawn_y) {
            return Err(ConfigError::Invalid(
                "play area must be wider than 0 with the kill line below the spawn line".into(),
            ));
        }
        if !(self.glitch.step_hz > 0.0) {
            return Err(ConfigError::Invalid("glitch.step_hz must be positive".into()));
        }
        if self.glitch.stutter_min > self.glitch.stutter_max {
            return Err(ConfigError::Invalid(
                "glitch.stutter_min must not exceed stutter_max".into(),
            ));
        }
        if self.max_timer_fires_per_frame == 0 {
            return Err(ConfigError::Invalid(
                "max_timer_fires_per_frame must be at least 1".into(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        assert!(SpawnSettings::default().validate().is_ok());
    }

    #[test]
    fn test_partial_json_uses_defaults() {
        let settings = SpawnSettings::from_json(
            r#"{ "pool_capacity": 8, "pool_policy": { "kind": "grow", "max_capacity": 12 } }"#,
        )
        .unwrap();
        assert_eq!(settings.pool_capacity, 8);
        assert_eq!(settings.pool_policy, PoolPolicy::Grow { max_capacity: 12 });
        assert_eq!(settings.play_area, PlayArea::default());
        assert_eq!(settings.unique_word_retries, UNIQUE_WORD_RETRIES);
    }

    #[test]
    fn test_rejects_zero_capacity() {
        let err = SpawnSettings::from_json(r#"{ "pool_capacity": 0 }"#).unwrap_err();
        assert!(matches!(err, ConfigError::Invalid(_)));
    }

    #[test]
    fn test_rejects_malformed_json() {
        let err = SpawnSettings::from_json("{ pool_capacity: ").unwrap_err();
        assert!(matches!(err, ConfigError::Json(_)));
    }

    #[test]
    fn test_json_roundtrip_preserves_policy() {
        let mut settings = SpawnSettings::default();
        settings.pool_policy = PoolPolicy::Grow { max_capacity: 64 };
        let json = settings.to_json().unwrap();
        assert_eq!(SpawnSettings::from_json(&json).unwrap(), settings);
    }

    #[test]
    fn test_lane_centers() {
        let area = PlayArea {
            width: 600.0,
            lanes: 6,
            ..Default::default()
        };
        assert_eq!(area.lane_center_x(0), 50.0);
        assert_eq!(area.lane_center_x(5), 550.0);
        // Out-of-range lanes clamp to the last one
        assert_eq!(area.lane_center_x(9), 550.0);
        assert_eq!(area.kill_y(), PLAY_AREA_HEIGHT - FLOOR_MARGIN);
    }

    #[test]
    fn test_grow_policy_bound() {
        assert_eq!(PoolPolicy::Fixed.max_capacity(10), 10);
        assert_eq!(PoolPolicy::Grow { max_capacity: 16 }.max_capacity(10), 16);
        // Max below warm capacity never shrinks the pool
        assert_eq!(PoolPolicy::Grow { max_capacity: 4 }.max_capacity(10), 10);
    }
}
