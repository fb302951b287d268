use core::fmt;

use serde::Serialize;

use crate::sim::{ProjectileHandle, ProjectileState};

/// Holds no heap data, so it can ride along in frame events
#[derive(Clone, Debug, PartialEq, Serialize)]
pub enum SpawnError {
    LevelNotFound {
        level_index: u32,
    },
    InvalidLevelParameters {
        level_index: u32,
        reason: &'static str,
    },
    PoolExhausted {
        capacity: usize,
    },
    InvalidStateTransition {
        handle: ProjectileHandle,
        state: ProjectileState,
        action: &'static str,
    },
    UnknownHandle {
        handle: ProjectileHandle,
    },
    EmptyWordSource {
        glitch: bool,
    },
}

impl fmt::Display for SpawnError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::LevelNotFound { level_index } => {
                write!(f, "no level table row for level {level_index}")
            }
            Self::InvalidLevelParameters {
                level_index,
                reason,
            } => write!(f, "level {level_index} has invalid parameters: {reason}"),
            Self::PoolExhausted { capacity } => {
                write!(f, "projectile pool exhausted ({capacity} entries in use)")
            }
            Self::InvalidStateTransition {
                handle,
                state,
                action,
            } => write!(f, "cannot {action} projectile {handle} while {state:?}"),
            Self::UnknownHandle { handle } => write!(f, "unknown projectile handle {handle}"),
            Self::EmptyWordSource { glitch } => {
                let kind = if *glitch { "glitch" } else { "standard" };
                write!(f, "{kind} word source produced no word")
            }
        }
    }
}

impl std::error::Error for SpawnError {}

pub type Result<T> = std::result::Result<T, SpawnError>;

/// Failure to parse settings or a level table
#[derive(Debug)]
pub enum ConfigError {
    Json(serde_json::Error),
    Invalid(String),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Json(err) => write!(f, "malformed config json: {err}"),
            Self::Invalid(reason) => write!(f, "invalid config: {reason}"),
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Json(err) => Some(err),
            Self::Invalid(_) => None,
        }
    }
}

impl From<serde_json::Error> for ConfigError {
    fn from(err: serde_json::Error) -> Self {
        Self::Json(err)
    }
}
