//! Materialization interface
//!
//! The generator decides what exists where; a `World` makes it exist.
//! Implementations own instancing, destruction, anchor lookup and
//! broad-phase overlap queries.

use glam::{Quat, Vec3};
use serde::{Deserialize, Serialize};

use crate::Pose;

/// Identity of a template known to the world
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct PrefabId(pub u32);

/// Handle to a live instance in the world
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct InstanceHandle(pub u64);

/// Collision layer bitmask
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Layer(pub u32);

impl Layer {
    pub const NONE: Layer = Layer(0);
    /// Bridge segment colliders
    pub const BRIDGE: Layer = Layer(1 << 0);
    /// Obstacle colliders
    pub const OBSTACLE: Layer = Layer(1 << 1);

    #[inline]
    pub fn intersects(self, mask: Layer) -> bool {
        self.0 & mask.0 != 0
    }
}

/// An oriented box in world space
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BoxVolume {
    pub center: Vec3,
    pub half_extents: Vec3,
    pub rotation: Quat,
}

pub trait World {
    /// Create an instance of `prefab` at a world pose, optionally parented
    fn instantiate(
        &mut self,
        prefab: PrefabId,
        pose: Pose,
        parent: Option<InstanceHandle>,
    ) -> InstanceHandle;

    /// Destroy an instance and everything parented to it
    fn destroy(&mut self, instance: InstanceHandle);

    /// World pose of the first child anchor called `name`
    fn find_child(&self, instance: InstanceHandle, name: &str) -> Option<Pose> {
        self.find_child_nth(instance, name, 0)
    }

    /// World pose of the `n`th child anchor called `name`, in declaration order
    fn find_child_nth(&self, instance: InstanceHandle, name: &str, n: usize) -> Option<Pose>;

    /// World-space collider of an instance, if it has one
    fn collider(&self, instance: InstanceHandle) -> Option<BoxVolume>;

    /// Instances on `mask` whose colliders intersect the given box
    fn overlap_box(
        &self,
        center: Vec3,
        half_extents: Vec3,
        rotation: Quat,
        mask: Layer,
    ) -> Vec<InstanceHandle>;
}
