//! Endless Bridge entry point
//!
//! Runs the generator headless against the sandbox world, walking an
//! observer along the track at a fixed pace.

#[cfg(not(target_arch = "wasm32"))]
use endless_bridge::GeneratorSettings;
#[cfg(not(target_arch = "wasm32"))]
use endless_bridge::track::TrackError;

/// Fixed simulation timestep (60 Hz)
#[cfg(not(target_arch = "wasm32"))]
const SIM_DT: f32 = 1.0 / 60.0;
/// Observer walking speed (units per second)
#[cfg(not(target_arch = "wasm32"))]
const WALK_SPEED: f32 = 12.0;
/// Simulated ticks
#[cfg(not(target_arch = "wasm32"))]
const TICKS: u32 = 60 * 60;

#[cfg(not(target_arch = "wasm32"))]
fn main() {
    env_logger::init();
    log::info!("Endless Bridge (native) starting...");

    // Optional settings file as the first argument
    let settings = match std::env::args().nth(1) {
        Some(path) => match GeneratorSettings::load(&path) {
            Ok(settings) => settings,
            Err(err) => {
                log::error!("{}", err);
                std::process::exit(1);
            }
        },
        None => GeneratorSettings::default(),
    };

    if let Err(err) = run(settings) {
        log::error!("{}", err);
        std::process::exit(1);
    }
}

#[cfg(target_arch = "wasm32")]
fn main() {
    // No browser host yet; the library is driven by an embedding engine
}

/// Counters gathered from generator events
#[cfg(not(target_arch = "wasm32"))]
#[derive(Debug, Default)]
struct RunStats {
    spawned: u32,
    turns: u32,
    obstacles: u32,
    retired: u32,
    window_resets: u32,
}

#[cfg(not(target_arch = "wasm32"))]
impl RunStats {
    fn record(&mut self, events: &[endless_bridge::track::TrackEvent]) {
        use endless_bridge::track::TrackEvent;

        for event in events {
            match event {
                TrackEvent::SegmentSpawned { kind, .. } => {
                    self.spawned += 1;
                    if kind.is_turn() {
                        self.turns += 1;
                    }
                }
                TrackEvent::ObstaclePlaced { .. } => self.obstacles += 1,
                TrackEvent::SegmentRetired { .. } => self.retired += 1,
                TrackEvent::WindowReset => self.window_resets += 1,
                TrackEvent::GenerationStalled { attempts } => {
                    log::warn!("Generation stalled after {} attempts", attempts);
                }
            }
        }
    }
}

#[cfg(not(target_arch = "wasm32"))]
fn run(settings: GeneratorSettings) -> Result<(), TrackError> {
    use endless_bridge::sandbox::{DemoKit, demo_world};
    use endless_bridge::track::{
        ObstacleCatalog, Observer, SegmentCatalog, TrackState, start, tick,
    };
    use glam::Vec3;

    let DemoKit {
        mut world,
        segments,
        obstacles,
    } = demo_world();
    let segments = SegmentCatalog::from_prefabs(&segments)?;
    let obstacles = ObstacleCatalog::from_prefabs(&obstacles);
    let mut state = TrackState::new(settings, segments, obstacles);
    let mut stats = RunStats::default();

    start(&mut state, &mut world)?;
    stats.record(&state.drain_events());

    // The observer walks from segment entry to segment entry
    let mut observer = Observer::new(Vec3::ZERO, Vec3::Z);
    let mut next_id = 2;
    let mut walked = 0.0;

    for _ in 0..TICKS {
        if let Some(target) = state.segment(next_id).map(|s| s.entry()) {
            let to_target = target - observer.position;
            let step = WALK_SPEED * SIM_DT;
            if to_target.length() <= step {
                observer.position = target;
                next_id += 1;
            } else {
                observer = Observer::new(observer.position + to_target.normalize() * step, to_target);
            }
            walked += step;
        }

        let result = tick(&mut state, &mut world, &observer);
        stats.record(&state.drain_events());
        if let Err(err) = result {
            log::error!("Stopping walk: {}", err);
            break;
        }
    }

    log::info!(
        "Walked {:.0} units: {} segments spawned ({} turns), {} obstacles, {} retired, {} window resets",
        walked,
        stats.spawned,
        stats.turns,
        stats.obstacles,
        stats.retired,
        stats.window_resets
    );
    println!(
        "✓ {} active segments, {} live instances, {} occupied positions",
        state.active.len(),
        world.live_count(),
        state.occupancy.len()
    );
    Ok(())
}
