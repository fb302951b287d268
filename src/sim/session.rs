//! Frame driver
//!
//! Wires director, coordinator and pool together behind one `frame` call.
//! Everything runs on the caller's thread; events go into a buffer the
//! host owns and drains.

use rand_pcg::Pcg32;

use super::director::LevelDirector;
use super::events::FrameEvent;
use super::level::{LevelParameters, LevelTable};
use super::pool::ObjectPool;
use super::projectile::ProjectileHandle;
use super::spawner::SpawnCoordinator;
use super::timer::{FrameTimers, TimerService};
use super::words::WordSource;
use crate::error::Result;
use crate::settings::SpawnSettings;

pub struct SpawnSession<L: LevelTable, T: TimerService = FrameTimers> {
    settings: SpawnSettings,
    pool: ObjectPool,
    director: LevelDirector<L, T>,
    coordinator: SpawnCoordinator<Pcg32>,
}

impl<L: LevelTable> SpawnSession<L, FrameTimers> {
    pub fn new(
        settings: SpawnSettings,
        table: L,
        standard_words: Box<dyn WordSource>,
        glitch_words: Box<dyn WordSource>,
    ) -> Self {
        let timers = FrameTimers::new(settings.max_timer_fires_per_frame);
        Self::with_timers(settings, table, timers, standard_words, glitch_words)
    }
}

impl<L: LevelTable, T: TimerService> SpawnSession<L, T> {
    pub fn with_timers(
        settings: SpawnSettings,
        table: L,
        timers: T,
        standard_words: Box<dyn WordSource>,
        glitch_words: Box<dyn WordSource>,
    ) -> Self {
        let pool = ObjectPool::new(settings.pool_capacity, settings.pool_policy);
        let mut coordinator = SpawnCoordinator::seeded(
            settings.seed,
            standard_words,
            glitch_words,
            settings.play_area,
        );
        coordinator.set_unique_word_retries(settings.unique_word_retries);
        log::info!("Spawn session ready (seed {})", settings.seed);
        Self {
            settings,
            pool,
            director: LevelDirector::new(table, timers),
            coordinator,
        }
    }

    /// Start or replace the running level
    pub fn start_level(
        &mut self,
        level_index: u32,
        events: &mut Vec<FrameEvent>,
    ) -> Result<LevelParameters> {
        let params = self.director.start_level(level_index)?;
        events.push(FrameEvent::LevelStarted {
            level_index,
            spawn_interval: params.spawn_interval_seconds,
        });
        Ok(params)
    }

    /// Stop spawning; projectiles already falling keep falling
    pub fn end_level(&mut self, score: u64, events: &mut Vec<FrameEvent>) {
        if let Some(event) = self.director.end_level(score) {
            events.push(event);
        }
    }

    /// Advance one frame
    ///
    /// Falling projectiles move first, then due spawn ticks run, so a fresh
    /// spawn is first drawn at its origin and moves from the next frame on.
    pub fn frame(&mut self, dt: f32, events: &mut Vec<FrameEvent>) {
        if !(dt > 0.0) || !dt.is_finite() {
            log::trace!("Skipping frame with dt {}", dt);
            return;
        }

        self.pool.update(
            dt,
            &self.settings.play_area,
            &self.settings.glitch,
            events,
        );

        let due = self.director.advance(dt);
        for _ in 0..due {
            self.director
                .on_spawn_tick(&mut self.coordinator, &mut self.pool, events);
        }
    }

    /// The player dealt with a falling projectile
    pub fn resolve(&mut self, handle: ProjectileHandle, events: &mut Vec<FrameEvent>) -> Result<()> {
        let event = self.pool.resolve(handle)?;
        events.push(event);
        Ok(())
    }

    /// Resolve the falling projectile carrying `word`, if any
    pub fn resolve_word(
        &mut self,
        word: &str,
        events: &mut Vec<FrameEvent>,
    ) -> Option<ProjectileHandle> {
        let handle = self.pool.find_active_word(word)?;
        self.resolve(handle, events).ok()?;
        Some(handle)
    }

    pub fn pool(&self) -> &ObjectPool {
        &self.pool
    }

    pub fn director(&self) -> &LevelDirector<L, T> {
        &self.director
    }

    pub fn settings(&self) -> &SpawnSettings {
        &self.settings
    }

    pub fn current_level(&self) -> Option<&LevelParameters> {
        self.director.current()
    }
}
