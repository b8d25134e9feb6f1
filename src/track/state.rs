//! Generator state
//!
//! Everything the generator owns lives here and is mutated only by the
//! functions in `extender`, `obstacles` and `lifecycle`, one commit at a time.

use glam::Vec3;
use rand::SeedableRng;
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use super::catalog::{AnchorKind, ObstacleCatalog, SegmentCatalog, SegmentKind};
use super::cooldown::CooldownMap;
use super::events::TrackEvent;
use super::frontier::Frontier;
use super::occupancy::OccupancySet;
use super::world::{InstanceHandle, PrefabId};
use crate::{GeneratorSettings, Pose};

/// An obstacle attached to a segment
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlacedObstacle {
    pub prefab: PrefabId,
    pub instance: InstanceHandle,
    pub anchor: AnchorKind,
    pub pose: Pose,
}

/// A committed segment
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlacedSegment {
    /// Commit sequence number
    pub id: u64,
    pub prefab: PrefabId,
    pub kind: SegmentKind,
    pub instance: InstanceHandle,
    /// Placement pose (entry)
    pub pose: Pose,
    /// Exit position recorded in the occupancy set
    pub exit: Vec3,
    /// Zero or one obstacle
    pub obstacles: Vec<PlacedObstacle>,
}

impl PlacedSegment {
    #[inline]
    pub fn entry(&self) -> Vec3 {
        self.pose.position
    }
}

/// Complete generator state
#[derive(Debug, Clone)]
pub struct TrackState {
    pub settings: GeneratorSettings,
    pub segments: SegmentCatalog,
    pub obstacles: ObstacleCatalog,
    pub rng: Pcg32,
    pub frontier: Frontier,
    pub occupancy: OccupancySet,
    pub cooldowns: CooldownMap,
    /// Active segments, oldest first
    pub active: Vec<PlacedSegment>,
    /// Set when extension ran out of attempts; top-up is suspended until `resume`
    pub stalled: bool,
    /// Events since the last drain
    pub events: Vec<TrackEvent>,
    /// Next commit sequence number
    next_id: u64,
}

impl TrackState {
    /// Create generator state starting at the origin facing +Z
    pub fn new(settings: GeneratorSettings, segments: SegmentCatalog, obstacles: ObstacleCatalog) -> Self {
        Self::with_frontier(settings, segments, obstacles, Frontier::default())
    }

    pub fn with_frontier(
        settings: GeneratorSettings,
        segments: SegmentCatalog,
        obstacles: ObstacleCatalog,
        frontier: Frontier,
    ) -> Self {
        let mut settings = settings;
        settings.validate();
        Self {
            rng: Pcg32::seed_from_u64(settings.seed),
            occupancy: OccupancySet::new(settings.occupancy_cell, settings.occupancy_policy),
            settings,
            segments,
            obstacles,
            frontier,
            cooldowns: CooldownMap::new(),
            active: Vec::new(),
            stalled: false,
            events: Vec::new(),
            next_id: 1,
        }
    }

    /// Allocate a commit sequence number
    pub fn next_segment_id(&mut self) -> u64 {
        let id = self.next_id;
        self.next_id += 1;
        id
    }

    /// Total segments ever committed
    pub fn committed(&self) -> u64 {
        self.next_id - 1
    }

    pub fn is_stalled(&self) -> bool {
        self.stalled
    }

    pub fn segment(&self, id: u64) -> Option<&PlacedSegment> {
        self.active.iter().find(|s| s.id == id)
    }

    /// Take the events accumulated since the last call
    pub fn drain_events(&mut self) -> Vec<TrackEvent> {
        std::mem::take(&mut self.events)
    }
}
