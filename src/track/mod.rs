//! Deterministic track generation
//!
//! All placement logic lives here. This module must stay pure and deterministic:
//! - One seeded RNG, drawn in a fixed order
//! - Commits applied strictly in order (occupancy and turn windows depend on it)
//! - No rendering or physics; materialization goes through the `World` trait

pub mod catalog;
pub mod cooldown;
pub mod error;
pub mod events;
pub mod extender;
pub mod frontier;
pub mod lifecycle;
pub mod obstacles;
pub mod occupancy;
pub mod state;
#[cfg(test)]
mod properties;
pub mod world;

pub use catalog::{
    AnchorKind, ObstacleCatalog, ObstacleRules, ObstacleTemplate, PrefabInfo, SegmentCatalog,
    SegmentKind, SegmentTemplate, SpawnAnchor,
};
pub use cooldown::CooldownMap;
pub use error::{Rejection, TrackError};
pub use events::TrackEvent;
pub use extender::{extend_once, try_kind};
pub use frontier::Frontier;
pub use lifecycle::{Observer, resume, retire_stale, start, tick, top_up};
pub use obstacles::place_obstacle;
pub use occupancy::OccupancySet;
pub use state::{PlacedObstacle, PlacedSegment, TrackState};
pub use world::{BoxVolume, InstanceHandle, Layer, PrefabId, World};
