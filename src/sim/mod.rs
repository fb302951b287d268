//! Deterministic spawn/pool simulation
//!
//! All spawn and motion logic lives here. This module must stay
//! deterministic for a given seed and frame sequence:
//! - Seeded RNG only (glitch rolls, words, lanes)
//! - Glitch jitter derived from elapsed time, never from the RNG
//! - Stable iteration order (by pool index)
//! - No rendering, audio or platform dependencies

pub mod director;
pub mod events;
pub mod level;
pub mod pool;
pub mod projectile;
pub mod session;
pub mod spawner;
pub mod timer;
pub mod words;

pub use director::LevelDirector;
pub use events::FrameEvent;
pub use level::{
    LevelParameters, LevelRow, LevelTable, ProceduralLevelTable, StaticLevelTable,
    spawn_interval_for_level,
};
pub use pool::ObjectPool;
pub use projectile::{JitterState, Motion, Projectile, ProjectileHandle, ProjectileState};
pub use session::SpawnSession;
pub use spawner::SpawnCoordinator;
pub use timer::{FrameTimers, TimerHandle, TimerService};
pub use words::{StagedWordList, WordList, WordSource, WordStage};
