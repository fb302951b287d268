//! Projectile object pool
//!
//! Entries are constructed at warm-up and live until the pool is dropped.
//! A free-list stack gives O(1) acquire and release; the active flag itself
//! lives on the projectile, so "in use" and "falling" can never disagree.
//!
//! Projectiles are only mutated through the pool, so every deactivation
//! also puts the entry back on the free list.

use std::sync::Arc;

use glam::Vec2;

use super::events::FrameEvent;
use super::projectile::{Motion, Projectile, ProjectileHandle, ProjectileState};
use crate::error::{Result, SpawnError};
use crate::settings::{GlitchSettings, PlayArea, PoolPolicy};

pub struct ObjectPool {
    entries: Vec<Projectile>,
    /// Indices available to `acquire`, used as a stack
    free_list: Vec<u32>,
    /// `listed[i]` is true while `i` sits on the free list
    listed: Vec<bool>,
    policy: PoolPolicy,
    max_capacity: usize,
}

impl ObjectPool {
    /// Create a pool and warm it up with `capacity` parked projectiles
    pub fn new(capacity: usize, policy: PoolPolicy) -> Self {
        let max_capacity = policy.max_capacity(capacity);
        let mut pool = Self {
            entries: Vec::with_capacity(max_capacity),
            free_list: Vec::with_capacity(max_capacity),
            listed: Vec::with_capacity(max_capacity),
            policy,
            max_capacity,
        };
        pool.warm_up(capacity);
        pool
    }

    /// Construct parked entries until the pool holds `capacity`
    ///
    /// Never destroys entries; a smaller `capacity` is a no-op.
    pub fn warm_up(&mut self, capacity: usize) {
        let before = self.entries.len();
        while self.entries.len() < capacity {
            self.push_entry();
        }
        let after = self.entries.len();
        // Stack pops from the back: lowest new index comes out first
        self.free_list.splice(0..0, (before..after).rev().map(|i| i as u32));
        for listed in &mut self.listed[before..after] {
            *listed = true;
        }
        self.max_capacity = self.max_capacity.max(self.entries.len());
        if self.entries.len() > before {
            log::info!(
                "Projectile pool warmed up: {} entries ({} policy)",
                self.entries.len(),
                self.policy.as_str()
            );
        }
    }

    fn push_entry(&mut self) -> ProjectileHandle {
        let handle = ProjectileHandle(self.entries.len() as u32);
        self.entries.push(Projectile::new(handle));
        self.listed.push(false);
        handle
    }

    /// Hand out a parked entry without activating it
    ///
    /// The caller activates it through [`ObjectPool::activate`]. On
    /// exhaustion a growing pool adds one entry; a fixed pool fails with
    /// `PoolExhausted`.
    pub fn acquire(&mut self) -> Result<ProjectileHandle> {
        while let Some(idx) = self.free_list.pop() {
            self.listed[idx as usize] = false;
            // Skip entries someone re-activated while they sat on the list
            if !self.entries[idx as usize].is_active() {
                return Ok(ProjectileHandle(idx));
            }
        }

        if self.entries.len() < self.max_capacity {
            let handle = self.push_entry();
            log::info!("Projectile pool grew to {} entries", self.entries.len());
            return Ok(handle);
        }

        Err(SpawnError::PoolExhausted {
            capacity: self.entries.len(),
        })
    }

    /// Make an entry available for a future `acquire`
    ///
    /// Releasing an already-parked entry is a no-op. Releasing a falling
    /// entry deactivates it first.
    pub fn release(&mut self, handle: ProjectileHandle) -> Result<()> {
        let projectile = self
            .entries
            .get_mut(handle.index())
            .ok_or(SpawnError::UnknownHandle { handle })?;
        projectile.deactivate_to_pool();
        mark_free(&mut self.free_list, &mut self.listed, handle.0);
        Ok(())
    }

    /// Load a payload into an acquired entry
    pub fn activate(
        &mut self,
        handle: ProjectileHandle,
        word: impl Into<Arc<str>>,
        bad_glitch: bool,
        speed: f32,
        origin: Vec2,
    ) -> Result<()> {
        let projectile = self.get_mut(handle)?;
        projectile.activate_from_pool(word, bad_glitch, speed, origin);
        Ok(())
    }

    /// Retire a falling projectile the player dealt with
    ///
    /// Fails with `InvalidStateTransition` if it is not falling.
    pub fn resolve(&mut self, handle: ProjectileHandle) -> Result<FrameEvent> {
        let projectile = self.get_mut(handle)?;
        if !projectile.is_active() {
            return Err(SpawnError::InvalidStateTransition {
                handle,
                state: ProjectileState::Inactive,
                action: "resolve",
            });
        }
        let event = FrameEvent::Resolved {
            handle,
            word: projectile
                .shared_word()
                .cloned()
                .unwrap_or_else(|| Arc::from("")),
            glitch: projectile.is_bad_emoji(),
        };
        self.release(handle)?;
        Ok(event)
    }

    /// Advance every falling projectile and reclaim the ones that landed
    pub fn update(
        &mut self,
        dt: f32,
        area: &PlayArea,
        glitch: &GlitchSettings,
        events: &mut Vec<FrameEvent>,
    ) {
        let kill_y = area.kill_y();
        for projectile in self.entries.iter_mut().filter(|p| p.is_active()) {
            let glitched = projectile.is_bad_emoji();
            if let Motion::Landed { word } = projectile.update(dt, kill_y, glitch) {
                let handle = projectile.handle();
                mark_free(&mut self.free_list, &mut self.listed, handle.0);
                events.push(FrameEvent::Landed {
                    handle,
                    word,
                    glitch: glitched,
                });
            }
        }
    }

    pub fn get(&self, handle: ProjectileHandle) -> Option<&Projectile> {
        self.entries.get(handle.index())
    }

    pub(crate) fn get_mut(&mut self, handle: ProjectileHandle) -> Result<&mut Projectile> {
        self.entries
            .get_mut(handle.index())
            .ok_or(SpawnError::UnknownHandle { handle })
    }

    /// Total constructed entries
    pub fn capacity(&self) -> usize {
        self.entries.len()
    }

    /// Largest size the pool may reach under its policy
    pub fn max_capacity(&self) -> usize {
        self.max_capacity
    }

    pub fn policy(&self) -> PoolPolicy {
        self.policy
    }

    pub fn active_count(&self) -> usize {
        self.entries.iter().filter(|p| p.is_active()).count()
    }

    /// Entries waiting on the free list
    pub fn available(&self) -> usize {
        self.free_list.len()
    }

    pub fn is_listed(&self, handle: ProjectileHandle) -> bool {
        self.listed.get(handle.index()).copied().unwrap_or(false)
    }

    pub fn iter_active(&self) -> impl Iterator<Item = &Projectile> {
        self.entries.iter().filter(|p| p.is_active())
    }

    /// First falling projectile carrying `word`
    pub fn find_active_word(&self, word: &str) -> Option<ProjectileHandle> {
        self.iter_active()
            .find(|p| p.target_word() == word)
            .map(|p| p.handle())
    }

    pub fn contains_active_word(&self, word: &str) -> bool {
        self.find_active_word(word).is_some()
    }
}

fn mark_free(free_list: &mut Vec<u32>, listed: &mut [bool], idx: u32) {
    let slot = &mut listed[idx as usize];
    if !*slot {
        *slot = true;
        free_list.push(idx);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn area() -> PlayArea {
        PlayArea::default()
    }

    #[test]
    fn test_warm_up_parks_everything() {
        let pool = ObjectPool::new(4, PoolPolicy::Fixed);
        assert_eq!(pool.capacity(), 4);
        assert_eq!(pool.available(), 4);
        assert_eq!(pool.active_count(), 0);
        assert!(pool.iter_active().next().is_none());
    }

    #[test]
    fn test_acquire_does_not_activate() {
        let mut pool = ObjectPool::new(2, PoolPolicy::Fixed);
        let h = pool.acquire().unwrap();
        assert_eq!(h, ProjectileHandle(0));
        assert!(!pool.get(h).unwrap().is_active());
        assert_eq!(pool.active_count(), 0);
        assert_eq!(pool.available(), 1);
    }

    #[test]
    fn test_fixed_pool_exhausts() {
        let mut pool = ObjectPool::new(2, PoolPolicy::Fixed);
        for _ in 0..2 {
            let h = pool.acquire().unwrap();
            pool.activate(h, "ZAP", false, 100.0, Vec2::ZERO).unwrap();
        }
        assert_eq!(
            pool.acquire(),
            Err(SpawnError::PoolExhausted { capacity: 2 })
        );
        assert_eq!(pool.capacity(), 2);
    }

    #[test]
    fn test_grow_pool_adds_one_until_limit() {
        let mut pool = ObjectPool::new(1, PoolPolicy::Grow { max_capacity: 3 });
        for expected in 1..=3 {
            let h = pool.acquire().unwrap();
            pool.activate(h, "ZIG", false, 100.0, Vec2::ZERO).unwrap();
            assert_eq!(pool.capacity(), expected);
        }
        assert!(matches!(
            pool.acquire(),
            Err(SpawnError::PoolExhausted { capacity: 3 })
        ));
        // The grown entry is not double-listed
        assert_eq!(pool.available(), 0);
    }

    #[test]
    fn test_release_is_idempotent() {
        let mut pool = ObjectPool::new(3, PoolPolicy::Fixed);
        let h = pool.acquire().unwrap();
        pool.activate(h, "BONK", false, 100.0, Vec2::ZERO).unwrap();

        pool.release(h).unwrap();
        pool.release(h).unwrap();
        assert_eq!(pool.available(), 3);
        assert!(pool.is_listed(h));
        assert!(!pool.get(h).unwrap().is_active());
    }

    #[test]
    fn test_release_relists_entry_parked_in_place() {
        let mut pool = ObjectPool::new(1, PoolPolicy::Fixed);
        let h = pool.acquire().unwrap();
        pool.activate(h, "OOF", false, 100.0, Vec2::ZERO).unwrap();

        // Parking the entity behind the pool's back leaves it unlisted...
        assert!(pool.get_mut(h).unwrap().deactivate_to_pool());
        assert_eq!(pool.available(), 0);
        assert!(!pool.is_listed(h));

        // ...and release is the path that restores it
        pool.release(h).unwrap();
        assert_eq!(pool.active_count() + pool.available(), pool.capacity());
        assert_eq!(pool.acquire(), Ok(h));
    }

    #[test]
    fn test_acquire_skips_listed_entry_activated_in_place() {
        let mut pool = ObjectPool::new(2, PoolPolicy::Fixed);
        // Index 0 is next on the free list; activate it without acquiring
        pool.activate(ProjectileHandle(0), "ZIG", false, 100.0, Vec2::ZERO)
            .unwrap();
        assert!(pool.is_listed(ProjectileHandle(0)));

        let h = pool.acquire().unwrap();
        assert_eq!(h, ProjectileHandle(1));
        assert!(!pool.is_listed(ProjectileHandle(0)));
        assert!(pool.get(ProjectileHandle(0)).unwrap().is_active());

        pool.activate(h, "ZAG", false, 100.0, Vec2::ZERO).unwrap();
        assert_eq!(
            pool.acquire(),
            Err(SpawnError::PoolExhausted { capacity: 2 })
        );

        // The skipped entry comes back once it is released
        pool.release(ProjectileHandle(0)).unwrap();
        assert_eq!(pool.acquire(), Ok(ProjectileHandle(0)));
    }

    #[test]
    fn test_release_unknown_handle() {
        let mut pool = ObjectPool::new(1, PoolPolicy::Fixed);
        let h = ProjectileHandle(9);
        assert_eq!(pool.release(h), Err(SpawnError::UnknownHandle { handle: h }));
    }

    #[test]
    fn test_landing_returns_entry() {
        let mut pool = ObjectPool::new(1, PoolPolicy::Fixed);
        let h = pool.acquire().unwrap();
        pool.activate(h, "CRASH", true, 100_000.0, Vec2::new(0.0, 0.0))
            .unwrap();

        let mut events = Vec::new();
        pool.update(0.1, &area(), &GlitchSettings::default(), &mut events);
        assert_eq!(pool.active_count(), 0);
        assert_eq!(pool.available(), 1);
        assert_eq!(
            events,
            vec![FrameEvent::Landed {
                handle: h,
                word: "CRASH".into(),
                glitch: true,
            }]
        );
        assert_eq!(pool.acquire(), Ok(h));
    }

    #[test]
    fn test_reacquired_entry_is_fully_reset() {
        let glitch = GlitchSettings::default();
        let mut pool = ObjectPool::new(1, PoolPolicy::Fixed);
        let h = pool.acquire().unwrap();
        pool.activate(h, "SIGKILL", true, 5_000.0, Vec2::new(100.0, -100.0))
            .unwrap();

        let mut events = Vec::new();
        while pool.active_count() > 0 {
            pool.update(1.0 / 60.0, &area(), &glitch, &mut events);
        }

        let again = pool.acquire().unwrap();
        assert_eq!(again, h);
        let parked = pool.get(again).unwrap();
        assert_eq!(parked.target_word(), "");
        assert!(parked.jitter().is_none());

        pool.activate(again, "FOX", false, 100.0, Vec2::new(300.0, -100.0))
            .unwrap();
        let p = pool.get(again).unwrap();
        assert_eq!(p.target_word(), "FOX");
        assert!(!p.is_bad_emoji());
        assert_eq!(p.position(), Vec2::new(300.0, -100.0));
        assert_eq!(p.elapsed(), 0.0);
        assert!(p.jitter().is_none());
    }

    #[test]
    fn test_resolve_requires_active() {
        let mut pool = ObjectPool::new(1, PoolPolicy::Fixed);
        let h = pool.acquire().unwrap();
        assert!(matches!(
            pool.resolve(h),
            Err(SpawnError::InvalidStateTransition { action: "resolve", .. })
        ));

        pool.activate(h, "YEET", false, 100.0, Vec2::ZERO).unwrap();
        assert_eq!(pool.find_active_word("YEET"), Some(h));
        let event = pool.resolve(h).unwrap();
        assert_eq!(
            event,
            FrameEvent::Resolved {
                handle: h,
                word: "YEET".into(),
                glitch: false,
            }
        );
        assert!(!pool.contains_active_word("YEET"));
        assert_eq!(pool.available(), 1);
    }

    #[derive(Debug, Clone)]
    enum Op {
        AcquireAndActivate,
        Release(u32),
        Update,
    }

    fn op_strategy() -> impl Strategy<Value = Op> {
        prop_oneof![
            Just(Op::AcquireAndActivate),
            (0u32..12).prop_map(Op::Release),
            Just(Op::Update),
        ]
    }

    proptest! {
        #[test]
        fn prop_fixed_pool_conserves_entries(ops in prop::collection::vec(op_strategy(), 0..200)) {
            let mut pool = ObjectPool::new(8, PoolPolicy::Fixed);
            let mut events = Vec::new();
            for op in ops {
                match op {
                    Op::AcquireAndActivate => {
                        if let Ok(h) = pool.acquire() {
                            pool.activate(h, "ZOOM", false, 400.0, Vec2::ZERO).unwrap();
                        }
                    }
                    Op::Release(i) => {
                        let _ = pool.release(ProjectileHandle(i));
                    }
                    Op::Update => pool.update(0.25, &area(), &GlitchSettings::default(), &mut events),
                }
                prop_assert_eq!(pool.capacity(), 8);
                prop_assert!(pool.active_count() <= pool.capacity());
                // Every entry is either falling or reclaimable, never both
                prop_assert_eq!(pool.active_count() + pool.available(), pool.capacity());
            }
        }

        #[test]
        fn prop_grow_pool_grows_in_single_steps(acquires in 0usize..40) {
            let mut pool = ObjectPool::new(2, PoolPolicy::Grow { max_capacity: 16 });
            let mut last = pool.capacity();
            for _ in 0..acquires {
                if let Ok(h) = pool.acquire() {
                    pool.activate(h, "POW", false, 100.0, Vec2::ZERO).unwrap();
                }
                let now = pool.capacity();
                prop_assert!(now == last || now == last + 1);
                prop_assert!(now <= 16);
                last = now;
            }
        }
    }
}
