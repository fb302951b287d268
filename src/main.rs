//! Nexus Fall headless demo
//!
//! Drives a spawn session at a fixed frame rate with a scripted "player"
//! that types the lowest standard word every half second, then prints a
//! per-level summary. Usage: `nexus-fall [seed] [level...]`.

use nexus_fall::SpawnSettings;
use nexus_fall::consts::FRAME_DT;
use nexus_fall::sim::{FrameEvent, ProceduralLevelTable, SpawnSession, WordList};

/// Simulated seconds per level
const LEVEL_SECONDS: f32 = 30.0;
/// The scripted player types one word this often
const TYPE_EVERY_FRAMES: u32 = 30;

#[derive(Debug, Default)]
struct LevelSummary {
    spawned: u32,
    glitched: u32,
    dropped: u32,
    landed: u32,
    resolved: u32,
}

impl LevelSummary {
    fn record(&mut self, event: &FrameEvent) {
        match event {
            FrameEvent::Spawned { glitch, .. } => {
                self.spawned += 1;
                if *glitch {
                    self.glitched += 1;
                }
            }
            FrameEvent::SpawnDropped { .. } => self.dropped += 1,
            FrameEvent::Landed { .. } => self.landed += 1,
            FrameEvent::Resolved { .. } => self.resolved += 1,
            _ => {}
        }
    }
}

fn run(seed: u64, levels: &[u32]) {
    let settings = SpawnSettings {
        seed,
        ..Default::default()
    };
    let mut session = SpawnSession::new(
        settings,
        ProceduralLevelTable::default(),
        Box::new(WordList::standard()),
        Box::new(WordList::glitch()),
    );
    let mut events = Vec::with_capacity(64);
    let frames = (LEVEL_SECONDS / FRAME_DT) as u32;

    for &level in levels {
        events.clear();
        let params = match session.start_level(level, &mut events) {
            Ok(params) => params,
            Err(err) => {
                log::error!("Skipping level {}: {}", level, err);
                continue;
            }
        };

        let mut summary = LevelSummary::default();
        let mut score = 0u64;
        for frame in 0..frames {
            session.frame(FRAME_DT, &mut events);

            if frame % TYPE_EVERY_FRAMES == 0 {
                // Glitched words are left alone; the player types the lowest normal one
                let target = session
                    .pool()
                    .iter_active()
                    .filter(|p| !p.is_bad_emoji())
                    .max_by(|a, b| a.position().y.total_cmp(&b.position().y))
                    .map(|p| p.handle());
                if let Some(handle) = target {
                    if session.resolve(handle, &mut events).is_ok() {
                        score += 100;
                    }
                }
            }

            for event in events.drain(..) {
                summary.record(&event);
            }
        }
        session.end_level(score, &mut events);

        println!(
            "level {:>2}: every {:.1}s, glitch {:>4.1}%, speed {:>5.1} | spawned {:>3} (glitched {:>2}) dropped {:>2} landed {:>3} typed {:>3}",
            level,
            params.spawn_interval_seconds,
            params.bad_emoji_chance * 100.0,
            params.fall_speed,
            summary.spawned,
            summary.glitched,
            summary.dropped,
            summary.landed,
            summary.resolved,
        );
    }

    let pool = session.pool();
    println!(
        "pool: {} entries, {} still falling",
        pool.capacity(),
        pool.active_count()
    );
}

#[cfg(not(target_arch = "wasm32"))]
fn main() {
    env_logger::init();
    log::info!("Nexus Fall (headless) starting...");

    let mut args = std::env::args().skip(1);
    let seed = args
        .next()
        .and_then(|s| s.parse::<u64>().ok())
        .unwrap_or_else(|| SpawnSettings::default().seed);
    let mut levels: Vec<u32> = args.filter_map(|s| s.parse().ok()).collect();
    if levels.is_empty() {
        levels = vec![1, 10, 11, 31, 49, 50];
    }

    run(seed, &levels);
}

#[cfg(target_arch = "wasm32")]
fn main() {
    // No browser host; the library is embedded by the game instead
    run(SpawnSettings::default().seed, &[1]);
}
