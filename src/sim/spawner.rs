//! Spawn coordinator
//!
//! Turns one spawn tick into at most one falling projectile. All randomness
//! goes through the coordinator's own RNG, so a seed fixes the glitch
//! rolls, word picks and lanes of a whole run.

use glam::Vec2;
use rand::{Rng, RngCore, SeedableRng};
use rand_pcg::Pcg32;

use super::level::LevelParameters;
use super::pool::ObjectPool;
use super::projectile::ProjectileHandle;
use super::words::WordSource;
use crate::error::{Result, SpawnError};
use crate::settings::PlayArea;

pub struct SpawnCoordinator<R: RngCore = Pcg32> {
    rng: R,
    standard_words: Box<dyn WordSource>,
    glitch_words: Box<dyn WordSource>,
    play_area: PlayArea,
    unique_word_retries: u32,
}

impl SpawnCoordinator<Pcg32> {
    /// Coordinator with a seeded PCG generator
    pub fn seeded(
        seed: u64,
        standard_words: Box<dyn WordSource>,
        glitch_words: Box<dyn WordSource>,
        play_area: PlayArea,
    ) -> Self {
        Self::with_rng(
            Pcg32::seed_from_u64(seed),
            standard_words,
            glitch_words,
            play_area,
        )
    }
}

impl<R: RngCore> SpawnCoordinator<R> {
    /// Coordinator with an injected random source
    pub fn with_rng(
        rng: R,
        standard_words: Box<dyn WordSource>,
        glitch_words: Box<dyn WordSource>,
        play_area: PlayArea,
    ) -> Self {
        Self {
            rng,
            standard_words,
            glitch_words,
            play_area,
            unique_word_retries: crate::consts::UNIQUE_WORD_RETRIES,
        }
    }

    pub fn set_unique_word_retries(&mut self, retries: u32) {
        self.unique_word_retries = retries;
    }

    pub fn play_area(&self) -> &PlayArea {
        &self.play_area
    }

    pub fn rng_mut(&mut self) -> &mut R {
        &mut self.rng
    }

    /// Draw `r` in [0, 1) and compare against the glitch chance
    pub fn roll_glitch(&mut self, bad_emoji_chance: f32) -> bool {
        let r: f32 = self.rng.random();
        r < bad_emoji_chance
    }

    /// Uniform lane and its spawn origin
    pub fn roll_origin(&mut self) -> (u32, Vec2) {
        let lanes = self.play_area.lanes.max(1);
        let lane = self.rng.random_range(0..lanes);
        let origin = Vec2::new(self.play_area.lane_center_x(lane), self.play_area.spawn_y);
        (lane, origin)
    }

    /// Spawn one projectile for the running level
    ///
    /// `PoolExhausted` and `EmptyWordSource` are expected outcomes that the
    /// caller treats as a dropped tick.
    pub fn spawn_next(
        &mut self,
        params: &LevelParameters,
        pool: &mut ObjectPool,
    ) -> Result<ProjectileHandle> {
        let glitch = self.roll_glitch(params.bad_emoji_chance);
        let (lane, origin) = self.roll_origin();

        let source = if glitch {
            &self.glitch_words
        } else {
            &self.standard_words
        };
        let mut word = source
            .pick_random_word(params.level_index, &mut self.rng)
            .ok_or(SpawnError::EmptyWordSource { glitch })?;
        // Avoid two identical words on screen; give up after a few redraws
        let mut retries = self.unique_word_retries;
        while retries > 0 && pool.contains_active_word(&word) {
            if let Some(next) = source.pick_random_word(params.level_index, &mut self.rng) {
                word = next;
            }
            retries -= 1;
        }

        let handle = pool.acquire()?;
        log::debug!(
            "Spawning {} '{}' in lane {} (glitch: {}, speed: {})",
            handle,
            word,
            lane,
            glitch,
            params.fall_speed
        );
        pool.activate(handle, word, glitch, params.fall_speed, origin)?;
        Ok(handle)
    }
}
