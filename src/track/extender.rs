//! Path extension
//!
//! Grows the frontier by one committed segment per call. Each attempt
//! orders the three segment kinds by a randomized preference and tries
//! them in turn; only when every kind fails on every attempt is the path
//! declared blocked.

use glam::Vec3;
use rand::Rng;

use super::catalog::SegmentKind;
use super::error::{Rejection, TrackError};
use super::events::TrackEvent;
use super::obstacles::place_obstacle;
use super::state::{PlacedSegment, TrackState};
use super::world::{InstanceHandle, Layer, PrefabId, World};
use crate::Pose;
use crate::consts::EXIT_ANCHOR;

/// Commit exactly one segment, retrying the whole preference pass up to
/// `max_attempts` times
pub fn extend_once<W: World>(state: &mut TrackState, world: &mut W) -> Result<u64, TrackError> {
    let attempts = state.settings.max_attempts;

    for attempt in 1..=attempts {
        let order = if state.rng.random::<f32>() < state.settings.turn_preference_chance {
            SegmentKind::TURN_FIRST
        } else {
            SegmentKind::STRAIGHT_FIRST
        };

        for kind in order {
            match try_kind(state, world, kind) {
                Ok(id) => return Ok(id),
                Err(rejection) => {
                    log::trace!(
                        "Attempt {}: {} rejected ({})",
                        attempt,
                        kind.as_str(),
                        rejection.as_str()
                    );
                }
            }
        }
    }

    log::error!("Extension failed after {} attempts: path completely blocked", attempts);
    Err(TrackError::GenerationStalled { attempts })
}

/// Try to commit one segment of `kind` at the frontier
pub fn try_kind<W: World>(
    state: &mut TrackState,
    world: &mut W,
    kind: SegmentKind,
) -> Result<u64, Rejection> {
    if kind.is_turn() && !state.frontier.turn_allowed(state.settings.turn_limit) {
        log::debug!(
            "Turn limit reached ({}/{}), skipping {} turns",
            state.frontier.turn_counter,
            state.settings.turn_limit,
            kind.as_str()
        );
        return Err(Rejection::TurnLimit);
    }

    let candidates = state.segments.of_kind(kind);
    if candidates.is_empty() {
        return Err(Rejection::NoTemplates);
    }
    let chosen = candidates[state.rng.random_range(0..candidates.len())];
    let prefab = chosen.prefab;
    let name = chosen.name.clone();

    let pose = state.frontier.spawn_pose();
    let instance = world.instantiate(prefab, pose, None);

    let Some(exit) = world.find_child(instance, EXIT_ANCHOR) else {
        log::warn!("Missing {} on: {}", EXIT_ANCHOR, name);
        world.destroy(instance);
        return Err(Rejection::MissingExit);
    };

    let predicted_exit = exit.position;
    let predicted_direction = kind.exit_direction(state.frontier.direction);
    let lookahead = predicted_exit + predicted_direction * state.settings.segment_length;

    // Anchor-granularity loop check before any geometry query
    if state.occupancy.contains(predicted_exit) || state.occupancy.contains(lookahead) {
        world.destroy(instance);
        return Err(Rejection::Occupied);
    }

    if let Some(volume) = world.collider(instance) {
        let blocked = world
            .overlap_box(volume.center, volume.half_extents, volume.rotation, Layer::BRIDGE)
            .into_iter()
            .any(|hit| hit != instance);
        if blocked {
            world.destroy(instance);
            return Err(Rejection::Overlap);
        }
    }

    let id = commit(
        state,
        world,
        Candidate {
            prefab,
            kind,
            instance,
            pose,
            exit: predicted_exit,
            direction: predicted_direction,
            windowed: true,
        },
    );
    log::debug!("Spawned {}: {} (segment {})", kind.as_str(), name, id);
    Ok(id)
}

/// A materialized segment that passed validation
pub(crate) struct Candidate {
    pub prefab: PrefabId,
    pub kind: SegmentKind,
    pub instance: InstanceHandle,
    pub pose: Pose,
    pub exit: Vec3,
    pub direction: Vec3,
    /// Whether the commit counts toward the turn window
    pub windowed: bool,
}

/// Integrate a validated candidate into the path
pub(crate) fn commit<W: World>(state: &mut TrackState, world: &mut W, candidate: Candidate) -> u64 {
    state.occupancy.insert(candidate.pose.position);
    state.occupancy.insert(candidate.exit);
    state.frontier.advance(candidate.exit, candidate.direction);

    let id = state.next_segment_id();
    state.active.push(PlacedSegment {
        id,
        prefab: candidate.prefab,
        kind: candidate.kind,
        instance: candidate.instance,
        pose: candidate.pose,
        exit: candidate.exit,
        obstacles: Vec::new(),
    });
    state.events.push(TrackEvent::SegmentSpawned {
        id,
        kind: candidate.kind,
        prefab: candidate.prefab,
        instance: candidate.instance,
        pose: candidate.pose,
    });

    if candidate.windowed
        && state
            .frontier
            .record_commit(candidate.kind.is_turn(), state.settings.segment_window)
    {
        log::debug!("Turn counter reset after segment window completed");
        state.events.push(TrackEvent::WindowReset);
    }

    let index = state.active.len() - 1;
    place_obstacle(state, world, index);
    state.cooldowns.tick();

    id
}
