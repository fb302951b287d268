//! Frame events reported to the host
//!
//! The host drains these after every frame: landings drive damage, level
//! boundaries feed the save/progress store, drops feed telemetry. Events
//! hold no owned heap data, so pushing one into a reserved buffer never
//! allocates.

use std::sync::Arc;

use serde::Serialize;

use super::projectile::ProjectileHandle;
use crate::error::SpawnError;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum FrameEvent {
    /// A level's timer is running
    LevelStarted { level_index: u32, spawn_interval: f32 },
    /// Level ended by the host; persistence hook
    LevelCompleted { level_index: u32, score: u64 },
    /// A projectile was activated
    Spawned {
        handle: ProjectileHandle,
        glitch: bool,
    },
    /// A spawn tick produced nothing (pool exhausted, no word)
    SpawnDropped { level_index: u32, error: SpawnError },
    /// The pool added an entry to serve a spawn
    PoolGrew { capacity: usize },
    /// A projectile crossed the kill line
    Landed {
        handle: ProjectileHandle,
        word: Arc<str>,
        glitch: bool,
    },
    /// The player dealt with a projectile before it landed
    Resolved {
        handle: ProjectileHandle,
        word: Arc<str>,
        glitch: bool,
    },
}

impl FrameEvent {
    /// True for events the save/progress store cares about
    pub fn is_level_boundary(&self) -> bool {
        matches!(
            self,
            FrameEvent::LevelStarted { .. } | FrameEvent::LevelCompleted { .. }
        )
    }
}
