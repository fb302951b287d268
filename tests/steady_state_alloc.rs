//! Steady-state frames must not touch the heap
//!
//! Counts allocations made by the test thread only, so the harness and
//! other threads cannot skew the result.

use std::alloc::{GlobalAlloc, Layout, System};
use std::cell::Cell;
use std::sync::atomic::{AtomicUsize, Ordering};

use nexus_fall::consts::FRAME_DT;
use nexus_fall::sim::{FrameEvent, ProceduralLevelTable, SpawnSession, WordList};
use nexus_fall::{SpawnError, SpawnSettings};

struct CountingAlloc;

static ALLOCATIONS: AtomicUsize = AtomicUsize::new(0);

thread_local! {
    static COUNTING: Cell<bool> = const { Cell::new(false) };
}

fn note_allocation() {
    if COUNTING.try_with(Cell::get).unwrap_or(false) {
        ALLOCATIONS.fetch_add(1, Ordering::Relaxed);
    }
}

unsafe impl GlobalAlloc for CountingAlloc {
    unsafe fn alloc(&self, layout: Layout) -> *mut u8 {
        note_allocation();
        unsafe { System.alloc(layout) }
    }

    unsafe fn alloc_zeroed(&self, layout: Layout) -> *mut u8 {
        note_allocation();
        unsafe { System.alloc_zeroed(layout) }
    }

    unsafe fn realloc(&self, ptr: *mut u8, layout: Layout, new_size: usize) -> *mut u8 {
        note_allocation();
        unsafe { System.realloc(ptr, layout, new_size) }
    }

    unsafe fn dealloc(&self, ptr: *mut u8, layout: Layout) {
        unsafe { System.dealloc(ptr, layout) }
    }
}

#[global_allocator]
static GLOBAL: CountingAlloc = CountingAlloc;

#[test]
fn frames_with_landings_and_drops_do_not_allocate() {
    // Small pool at the fastest cadence: entries land, get reused, and some
    // ticks find the pool exhausted
    let settings = SpawnSettings {
        pool_capacity: 4,
        ..Default::default()
    };
    let mut session = SpawnSession::new(
        settings,
        ProceduralLevelTable::default(),
        Box::new(WordList::standard()),
        Box::new(WordList::glitch()),
    );
    let mut events: Vec<FrameEvent> = Vec::with_capacity(256);
    session.start_level(50, &mut events).unwrap();
    events.clear();

    let mut landed = 0;
    let mut dropped = 0;
    let mut resolved = 0;

    COUNTING.with(|c| c.set(true));
    for frame in 0..1200u32 {
        session.frame(FRAME_DT, &mut events);
        if frame % 180 == 0 {
            let target = session.pool().iter_active().next().map(|p| p.handle());
            if let Some(handle) = target {
                // Resolving shares the word instead of copying it
                let _ = session.resolve(handle, &mut events);
            }
        }
        for event in &events {
            match event {
                FrameEvent::Landed { .. } => landed += 1,
                FrameEvent::Resolved { .. } => resolved += 1,
                FrameEvent::SpawnDropped { error, .. } => {
                    assert!(matches!(error, SpawnError::PoolExhausted { .. }));
                    dropped += 1;
                }
                _ => {}
            }
        }
        events.clear();
    }
    COUNTING.with(|c| c.set(false));

    let allocations = ALLOCATIONS.load(Ordering::Relaxed);
    assert!(landed > 0, "no projectile landed");
    assert!(dropped > 0, "pool never ran dry");
    assert!(resolved > 0, "nothing was resolved");
    assert_eq!(
        allocations, 0,
        "allocated {allocations} times (landed {landed}, dropped {dropped}, resolved {resolved})"
    );
}
