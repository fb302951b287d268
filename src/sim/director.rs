//! Level director
//!
//! Owns the running level's parameters and its single spawn timer. Timer
//! scheduling and level lookup are injected so hosts and tests can swap
//! them out.

use rand::RngCore;

use super::events::FrameEvent;
use super::level::{LevelParameters, LevelTable};
use super::pool::ObjectPool;
use super::spawner::SpawnCoordinator;
use super::timer::{TimerHandle, TimerService};
use crate::error::{Result, SpawnError};

pub struct LevelDirector<L: LevelTable, T: TimerService> {
    table: L,
    timers: T,
    current: Option<LevelParameters>,
    spawn_timer: Option<TimerHandle>,
    /// Scratch buffer reused by `advance`
    fired: Vec<TimerHandle>,
}

impl<L: LevelTable, T: TimerService> LevelDirector<L, T> {
    pub fn new(table: L, timers: T) -> Self {
        Self {
            table,
            timers,
            current: None,
            spawn_timer: None,
            fired: Vec::with_capacity(crate::consts::MAX_TIMER_FIRES_PER_FRAME as usize),
        }
    }

    /// Resolve `level_index` and (re)start the spawn timer
    ///
    /// Any previous timer is cancelled first. On failure no level is left
    /// running, so stale parameters never keep spawning.
    pub fn start_level(&mut self, level_index: u32) -> Result<LevelParameters> {
        self.cancel_timer();

        let resolved = self
            .table
            .get_row(level_index)
            .ok_or(SpawnError::LevelNotFound { level_index })
            .and_then(|row| LevelParameters::resolve(level_index, row));
        let params = match resolved {
            Ok(params) => params,
            Err(err) => {
                log::warn!("Level {} failed to start: {}", level_index, err);
                self.current = None;
                return Err(err);
            }
        };

        self.spawn_timer = Some(self.timers.set_repeating(params.spawn_interval_seconds));
        self.current = Some(params);

        log::info!(
            "Level {} started: spawn every {}s, glitch probability {}, fall speed {}",
            level_index,
            params.spawn_interval_seconds,
            params.bad_emoji_chance,
            params.fall_speed
        );
        Ok(params)
    }

    /// Stop spawning and report the level boundary
    ///
    /// Returns `None` if no level was running.
    pub fn end_level(&mut self, score: u64) -> Option<FrameEvent> {
        self.cancel_timer();
        let params = self.current.take()?;
        log::info!("Level {} completed with score {}", params.level_index, score);
        Some(FrameEvent::LevelCompleted {
            level_index: params.level_index,
            score,
        })
    }

    fn cancel_timer(&mut self) {
        if let Some(handle) = self.spawn_timer.take() {
            self.timers.clear(handle);
        }
    }

    /// Advance the timer service; returns how many spawn ticks are due
    pub fn advance(&mut self, dt: f32) -> u32 {
        self.fired.clear();
        self.timers.advance(dt, &mut self.fired);
        match self.spawn_timer {
            Some(handle) => self.fired.iter().filter(|&&h| h == handle).count() as u32,
            None => 0,
        }
    }

    /// One spawn tick for the running level
    ///
    /// Spawn failures never escape: they are logged and reported as a
    /// `SpawnDropped` event so the cadence survives.
    pub fn on_spawn_tick<R: RngCore>(
        &mut self,
        coordinator: &mut SpawnCoordinator<R>,
        pool: &mut ObjectPool,
        events: &mut Vec<FrameEvent>,
    ) {
        let Some(params) = self.current else {
            return;
        };

        let capacity_before = pool.capacity();
        match coordinator.spawn_next(&params, pool) {
            Ok(handle) => {
                if pool.capacity() > capacity_before {
                    events.push(FrameEvent::PoolGrew {
                        capacity: pool.capacity(),
                    });
                }
                let glitch = pool.get(handle).is_some_and(|p| p.is_bad_emoji());
                events.push(FrameEvent::Spawned { handle, glitch });
            }
            Err(err) => {
                log::warn!("Dropped spawn on level {}: {}", params.level_index, err);
                events.push(FrameEvent::SpawnDropped {
                    level_index: params.level_index,
                    error: err,
                });
            }
        }
    }

    pub fn current(&self) -> Option<&LevelParameters> {
        self.current.as_ref()
    }

    pub fn spawn_timer(&self) -> Option<TimerHandle> {
        self.spawn_timer
    }

    pub fn timers(&self) -> &T {
        &self.timers
    }

    pub fn table(&self) -> &L {
        &self.table
    }
}
