//! Repeating timers driven by frame time
//!
//! The spawn cadence is a timer registration rather than ambient global
//! state: the director holds a [`TimerService`] and the host advances it.

use serde::{Deserialize, Serialize};

/// Registration handle; stale after `clear`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TimerHandle {
    slot: u32,
    generation: u32,
}

/// Timer-scheduling capability
pub trait TimerService {
    /// Register a timer that fires every `interval_secs` until cleared
    fn set_repeating(&mut self, interval_secs: f32) -> TimerHandle;
    /// Cancel a timer; clearing a stale handle is a no-op
    fn clear(&mut self, handle: TimerHandle);
    fn is_active(&self, handle: TimerHandle) -> bool;
    fn active_count(&self) -> usize;
    /// Advance time, appending one handle per firing to `fired`
    fn advance(&mut self, dt: f32, fired: &mut Vec<TimerHandle>);
}

#[derive(Debug, Clone)]
struct TimerSlot {
    generation: u32,
    interval: f32,
    elapsed: f32,
    active: bool,
}

/// Accumulator-based timers, one slot per registration
#[derive(Debug, Clone)]
pub struct FrameTimers {
    slots: Vec<TimerSlot>,
    /// Spiral-of-death guard; backlog past this is discarded
    max_fires_per_frame: u32,
}

impl FrameTimers {
    pub fn new(max_fires_per_frame: u32) -> Self {
        Self {
            slots: Vec::new(),
            max_fires_per_frame: max_fires_per_frame.max(1),
        }
    }

    /// Interval of a live timer
    pub fn interval(&self, handle: TimerHandle) -> Option<f32> {
        self.live_slot(handle).map(|s| s.interval)
    }

    fn live_slot(&self, handle: TimerHandle) -> Option<&TimerSlot> {
        self.slots
            .get(handle.slot as usize)
            .filter(|s| s.active && s.generation == handle.generation)
    }
}

impl Default for FrameTimers {
    fn default() -> Self {
        Self::new(crate::consts::MAX_TIMER_FIRES_PER_FRAME)
    }
}

impl TimerService for FrameTimers {
    fn set_repeating(&mut self, interval_secs: f32) -> TimerHandle {
        let interval = interval_secs.max(f32::EPSILON);
        // Reuse a cleared slot before growing
        let slot = match self.slots.iter().position(|s| !s.active) {
            Some(i) => i,
            None => {
                self.slots.push(TimerSlot {
                    generation: 0,
                    interval,
                    elapsed: 0.0,
                    active: false,
                });
                self.slots.len() - 1
            }
        };

        let entry = &mut self.slots[slot];
        entry.generation = entry.generation.wrapping_add(1);
        entry.interval = interval;
        entry.elapsed = 0.0;
        entry.active = true;

        TimerHandle {
            slot: slot as u32,
            generation: entry.generation,
        }
    }

    fn clear(&mut self, handle: TimerHandle) {
        if let Some(slot) = self.slots.get_mut(handle.slot as usize) {
            if slot.generation == handle.generation {
                slot.active = false;
            }
        }
    }

    fn is_active(&self, handle: TimerHandle) -> bool {
        self.live_slot(handle).is_some()
    }

    fn active_count(&self) -> usize {
        self.slots.iter().filter(|s| s.active).count()
    }

    fn advance(&mut self, dt: f32, fired: &mut Vec<TimerHandle>) {
        if !(dt > 0.0) || !dt.is_finite() {
            return;
        }
        for (i, slot) in self.slots.iter_mut().enumerate() {
            if !slot.active {
                continue;
            }
            slot.elapsed += dt;
            let mut fires = 0;
            while slot.elapsed >= slot.interval {
                slot.elapsed -= slot.interval;
                fires += 1;
                if fires == self.max_fires_per_frame {
                    // Drop the backlog rather than bursting next frame
                    slot.elapsed = slot.elapsed.rem_euclid(slot.interval);
                    break;
                }
            }
            for _ in 0..fires {
                fired.push(TimerHandle {
                    slot: i as u32,
                    generation: slot.generation,
                });
            }
        }
    }
}
