//! Side effects reported to the driver

use serde::{Deserialize, Serialize};

use super::catalog::{AnchorKind, SegmentKind};
use super::world::{InstanceHandle, PrefabId};
use crate::Pose;

/// Something the generator did this tick
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum TrackEvent {
    /// A segment was committed to the active queue
    SegmentSpawned {
        id: u64,
        kind: SegmentKind,
        prefab: PrefabId,
        instance: InstanceHandle,
        pose: Pose,
    },
    /// An obstacle was attached to a committed segment
    ObstaclePlaced {
        segment: u64,
        prefab: PrefabId,
        instance: InstanceHandle,
        anchor: AnchorKind,
        pose: Pose,
    },
    /// The turn window completed and its counters were cleared
    WindowReset,
    /// A segment fell far enough behind the observer and was destroyed
    SegmentRetired { id: u64, instance: InstanceHandle },
    /// No valid continuation was found within the retry budget
    GenerationStalled { attempts: u32 },
}
