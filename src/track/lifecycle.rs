//! Active queue maintenance
//!
//! Keeps the queue at its target length ahead of the observer and retires
//! segments that are both behind the observer and far from it. Driven by
//! an explicit `tick` from the host loop.

use glam::Vec3;
use serde::{Deserialize, Serialize};

use super::error::{Rejection, TrackError};
use super::events::TrackEvent;
use super::extender::{Candidate, commit, extend_once};
use super::state::TrackState;
use super::world::World;
use crate::consts::EXIT_ANCHOR;

/// Read-only view of whoever the track is generated for
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Observer {
    pub position: Vec3,
    /// Unit forward axis
    pub forward: Vec3,
}

impl Observer {
    pub fn new(position: Vec3, forward: Vec3) -> Self {
        Self {
            position,
            forward: forward.normalize_or(Vec3::Z),
        }
    }
}

/// Lay the warmup run, then fill the queue
pub fn start<W: World>(state: &mut TrackState, world: &mut W) -> Result<(), TrackError> {
    let warmup = state.settings.warmup_segments.min(state.settings.max_segments);
    let mut placed = 0;
    for _ in 0..warmup {
        if place_warmup(state, world).is_ok() {
            placed += 1;
        }
    }
    log::info!("Warmup placed {}/{} segments", placed, warmup);

    let added = top_up(state, world)?;
    log::info!("Track started with {} segments ({} generated)", state.active.len(), added);
    Ok(())
}

/// Place the catalog's first template at the frontier without validation
///
/// Warmup segments record occupancy and get obstacles but do not count
/// toward the turn window; the frontier follows the exit anchor's facing.
fn place_warmup<W: World>(state: &mut TrackState, world: &mut W) -> Result<u64, Rejection> {
    let Some(template) = state.segments.first() else {
        return Err(Rejection::NoTemplates);
    };
    let prefab = template.prefab;
    let kind = template.kind;
    let name = template.name.clone();

    let pose = state.frontier.spawn_pose();
    let instance = world.instantiate(prefab, pose, None);
    let Some(exit) = world.find_child(instance, EXIT_ANCHOR) else {
        log::warn!("Missing {} on: {}", EXIT_ANCHOR, name);
        world.destroy(instance);
        return Err(Rejection::MissingExit);
    };

    let id = commit(
        state,
        world,
        Candidate {
            prefab,
            kind,
            instance,
            pose,
            exit: exit.position,
            direction: exit.forward(),
            windowed: false,
        },
    );
    log::debug!("Warmup segment {}: {}", id, name);
    Ok(id)
}

/// Extend until the queue reaches its target length
///
/// A stall latches the generator; callers should stop topping up until
/// `resume` is called.
pub fn top_up<W: World>(state: &mut TrackState, world: &mut W) -> Result<usize, TrackError> {
    let mut added = 0;
    while state.active.len() < state.settings.max_segments {
        match extend_once(state, world) {
            Ok(_) => added += 1,
            Err(err) => {
                if let TrackError::GenerationStalled { attempts } = err {
                    state.stalled = true;
                    state.events.push(TrackEvent::GenerationStalled { attempts });
                }
                return Err(err);
            }
        }
    }
    Ok(added)
}

/// Remove segments that are substantially behind and beyond the despawn distance
///
/// Scans back to front so removal keeps the remaining indices valid.
pub fn retire_stale<W: World>(state: &mut TrackState, world: &mut W, observer: &Observer) -> usize {
    let threshold = state.settings.behind_dot_threshold;
    let despawn = state.settings.despawn_distance;
    let mut retired = 0;

    for i in (0..state.active.len()).rev() {
        let to_segment = state.active[i].pose.position - observer.position;
        let dot = to_segment.normalize_or_zero().dot(observer.forward);
        if dot < threshold && to_segment.length() > despawn {
            let segment = state.active.remove(i);
            world.destroy(segment.instance);
            state.occupancy.release(segment.entry());
            state.occupancy.release(segment.exit);
            state.events.push(TrackEvent::SegmentRetired {
                id: segment.id,
                instance: segment.instance,
            });
            retired += 1;
        }
    }

    if retired > 0 {
        log::debug!("Retired {} segments, {} active", retired, state.active.len());
    }
    retired
}

/// One simulation step: top up (unless stalled), then retire stale segments
///
/// A stall is reported once as an error; later ticks keep retiring and
/// return `Ok` until `resume` clears the latch.
pub fn tick<W: World>(
    state: &mut TrackState,
    world: &mut W,
    observer: &Observer,
) -> Result<(), TrackError> {
    let result = if state.stalled {
        Ok(0)
    } else {
        top_up(state, world)
    };
    retire_stale(state, world, observer);
    result.map(|_| ())
}

/// Clear a stall so the next tick tries to extend again
pub fn resume(state: &mut TrackState) {
    if state.stalled {
        log::info!("Resuming generation at segment {}", state.committed() + 1);
        state.stalled = false;
    }
}
