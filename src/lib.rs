//! Nexus Fall - spawn and pool core for a falling-word arcade game
//!
//! Core modules:
//! - `sim`: Deterministic spawn/pool simulation (projectiles, levels, timers)
//! - `settings`: Data-driven tuning for pool capacity, play area and glitch motion
//! - `error`: Error taxonomy shared by the simulation

pub mod error;
pub mod settings;
pub mod sim;

pub use error::{ConfigError, Result, SpawnError};
pub use settings::{GlitchSettings, PlayArea, PoolPolicy, SpawnSettings};

/// Game configuration constants
pub mod consts {
    /// Nominal frame timestep used by the demo driver (60 Hz)
    pub const FRAME_DT: f32 = 1.0 / 60.0;
    /// Maximum timer firings per frame to prevent spiral of death
    pub const MAX_TIMER_FIRES_PER_FRAME: u32 = 8;

    /// Difficulty curve (seconds between spawns)
    pub const BASE_SPAWN_INTERVAL: f32 = 2.0;
    pub const FAST_SPAWN_INTERVAL: f32 = 1.5; // level > 10
    pub const CHAOS_SPAWN_INTERVAL: f32 = 0.8; // level > 30
    pub const VOID_SPAWN_INTERVAL: f32 = 0.4; // level == 50 only
    pub const FAST_TIER_AFTER: u32 = 10;
    pub const CHAOS_TIER_AFTER: u32 = 30;
    pub const VOID_LEVEL: u32 = 50;

    /// Pool defaults
    pub const DEFAULT_POOL_CAPACITY: usize = 32;

    /// Play area defaults (pixels)
    pub const PLAY_AREA_WIDTH: f32 = 1280.0;
    pub const PLAY_AREA_HEIGHT: f32 = 720.0;
    pub const LANE_COUNT: u32 = 6;
    /// Spawn line sits above the visible area so words slide in
    pub const SPAWN_Y: f32 = -100.0;
    /// Kill line is this far above the bottom edge
    pub const FLOOR_MARGIN: f32 = 60.0;

    /// Word selection
    pub const UNIQUE_WORD_RETRIES: u32 = 5;
    /// Returned by staged word lists that have nothing to offer
    pub const FALLBACK_WORD: &str = "VOID";
}

/// Deterministic integer hash for frame-derived pseudo-randomness
///
/// Knuth multiplicative mix followed by an xorshift finaliser. Used where
/// motion must vary per step without consuming the seeded RNG.
#[inline]
pub fn frame_hash(step: u64, salt: u64) -> u32 {
    let mut x = step.wrapping_mul(2_654_435_761).wrapping_add(salt);
    x ^= x >> 33;
    x = x.wrapping_mul(0xff51_afd7_ed55_8ccd);
    x ^= x >> 33;
    x as u32
}

/// Map a hash to a signed unit value in [-1, 1]
#[inline]
pub fn hash_to_signed_unit(h: u32) -> f32 {
    (h as f32 / u32::MAX as f32) * 2.0 - 1.0
}
