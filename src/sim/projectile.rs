//! Pooled falling projectile
//!
//! A projectile is constructed once at pool warm-up and then cycles between
//! `Inactive` (parked in the pool) and `Active` (falling) for the whole
//! session. Glitched projectiles stutter and jitter sideways; the jitter is a
//! pure function of elapsed time and the projectile's identity, so two runs
//! with the same inputs produce the same motion.

use std::fmt;
use std::sync::Arc;

use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::settings::GlitchSettings;
use crate::{frame_hash, hash_to_signed_unit};

/// Stable index of a projectile inside its pool
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ProjectileHandle(pub u32);

impl ProjectileHandle {
    #[inline]
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Display for ProjectileHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Lifecycle state of a pooled projectile
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ProjectileState {
    /// Parked in the pool: not updated, not collidable
    Inactive,
    /// Carrying a word and falling
    Active,
}

/// Result of advancing a projectile by one frame
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Motion {
    /// Projectile was inactive; nothing happened
    Idle,
    /// Still inside the play area
    Falling,
    /// Crossed the kill line this frame and deactivated itself
    Landed { word: Arc<str> },
}

/// Glitch jitter bookkeeping, cleared on every activation
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct JitterState {
    /// Jitter step the cached values belong to
    pub step: u64,
    /// Lateral offset from the spawn origin
    pub offset_x: f32,
    /// Fall speed multiplier for the current step
    pub stutter: f32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Projectile {
    handle: ProjectileHandle,
    state: ProjectileState,
    /// Word the player has to type; released on deactivation
    target_word: Option<Arc<str>>,
    /// Glitched projectiles render corrupted and move irregularly
    is_bad_emoji: bool,
    /// Pixels per second
    fall_speed: f32,
    origin: Vec2,
    pos: Vec2,
    /// Seconds since activation
    elapsed: f32,
    jitter: Option<JitterState>,
    /// Bumped on every activation; salts the jitter so reuses differ
    generation: u32,
}

impl Projectile {
    /// Construct a parked projectile (pool warm-up only)
    pub fn new(handle: ProjectileHandle) -> Self {
        Self {
            handle,
            state: ProjectileState::Inactive,
            target_word: None,
            is_bad_emoji: false,
            fall_speed: 0.0,
            origin: Vec2::ZERO,
            pos: Vec2::ZERO,
            elapsed: 0.0,
            jitter: None,
            generation: 0,
        }
    }

    pub fn handle(&self) -> ProjectileHandle {
        self.handle
    }

    pub fn state(&self) -> ProjectileState {
        self.state
    }

    #[inline]
    pub fn is_active(&self) -> bool {
        self.state == ProjectileState::Active
    }

    /// Current word, empty while parked
    pub fn target_word(&self) -> &str {
        self.target_word.as_deref().unwrap_or("")
    }

    /// Shared handle to the current word
    pub fn shared_word(&self) -> Option<&Arc<str>> {
        self.target_word.as_ref()
    }

    pub fn is_bad_emoji(&self) -> bool {
        self.is_bad_emoji
    }

    pub fn fall_speed(&self) -> f32 {
        self.fall_speed
    }

    pub fn position(&self) -> Vec2 {
        self.pos
    }

    pub fn origin(&self) -> Vec2 {
        self.origin
    }

    pub fn elapsed(&self) -> f32 {
        self.elapsed
    }

    pub fn jitter(&self) -> Option<JitterState> {
        self.jitter
    }

    pub fn generation(&self) -> u32 {
        self.generation
    }

    /// Load a payload and start falling from `origin`
    ///
    /// Also accepted while already active: the payload is overwritten in
    /// place and the fall restarts, dropping the previous word. Passing an
    /// `Arc<str>` shares it; a `&str` is copied.
    pub fn activate_from_pool(
        &mut self,
        word: impl Into<Arc<str>>,
        bad_glitch: bool,
        speed: f32,
        origin: Vec2,
    ) {
        let word = word.into();
        if self.is_active() {
            log::trace!(
                "Projectile {} re-activated while falling ('{}' -> '{}')",
                self.handle,
                self.target_word(),
                word
            );
        }
        self.target_word = Some(word);
        self.is_bad_emoji = bad_glitch;
        self.fall_speed = speed;
        self.origin = origin;
        self.pos = origin;
        self.elapsed = 0.0;
        self.jitter = None;
        self.generation = self.generation.wrapping_add(1);
        self.state = ProjectileState::Active;
    }

    /// Advance by `dt` seconds; deactivates once past `kill_y`
    pub fn update(&mut self, dt: f32, kill_y: f32, glitch: &GlitchSettings) -> Motion {
        if !self.is_active() {
            log::trace!("Ignoring update on inactive projectile {}", self.handle);
            return Motion::Idle;
        }

        self.elapsed += dt;

        if self.is_bad_emoji {
            let jitter = self.jitter_for_step(glitch);
            self.pos.y += self.fall_speed * jitter.stutter * dt;
            self.pos.x = self.origin.x + jitter.offset_x;
            self.jitter = Some(jitter);
        } else {
            self.pos.y += self.fall_speed * dt;
        }

        if self.pos.y > kill_y {
            let word = self.target_word.take().unwrap_or_else(|| Arc::from(""));
            self.deactivate_to_pool();
            return Motion::Landed { word };
        }
        Motion::Falling
    }

    /// Jitter for the current step, re-rolled `step_hz` times per second
    fn jitter_for_step(&self, glitch: &GlitchSettings) -> JitterState {
        let step = (self.elapsed * glitch.step_hz).floor() as u64;
        if let Some(cached) = self.jitter {
            if cached.step == step {
                return cached;
            }
        }

        let salt = ((self.handle.0 as u64) << 32) | self.generation as u64;
        let lateral = hash_to_signed_unit(frame_hash(step, salt));
        let stutter_t = (hash_to_signed_unit(frame_hash(step, !salt)) + 1.0) * 0.5;

        JitterState {
            step,
            offset_x: lateral * glitch.jitter_amplitude,
            stutter: glitch.stutter_min + (glitch.stutter_max - glitch.stutter_min) * stutter_t,
        }
    }

    /// Return to the parked state
    ///
    /// Returns `true` if the projectile was active. Only the owning pool
    /// calls this, and it puts the entry back on its free list in the same
    /// step; hosts go through [`ObjectPool::release`].
    ///
    /// [`ObjectPool::release`]: super::pool::ObjectPool::release
    pub(crate) fn deactivate_to_pool(&mut self) -> bool {
        if !self.is_active() {
            return false;
        }
        self.target_word = None;
        self.jitter = None;
        self.state = ProjectileState::Inactive;
        true
    }
}
