//! In-memory world
//!
//! Stands in for the engine: keeps live instances with their poses,
//! resolves named anchors and answers oriented-box overlap queries.
//! Used by the native driver and by tests.

pub mod obb;
pub mod presets;

use std::collections::BTreeMap;

use glam::{Quat, Vec3};
use serde::{Deserialize, Serialize};

use crate::Pose;
use crate::track::{
    BoxVolume, InstanceHandle, Layer, ObstacleRules, PrefabId, PrefabInfo, SegmentKind, World,
};

pub use obb::{CONTACT_TOLERANCE, boxes_overlap};
pub use presets::{DemoKit, demo_world, left_turn, obstacle, right_turn, straight};

/// Box collider in a blueprint's local space
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BoxShape {
    pub center: Vec3,
    pub half_extents: Vec3,
}

/// Everything the sandbox needs to materialize a template
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Blueprint {
    pub name: String,
    pub layer: Layer,
    pub collider: Option<BoxShape>,
    /// Named child anchors with local poses
    pub anchors: Vec<(String, Pose)>,
    pub kind: Option<SegmentKind>,
    pub obstacle_rules: Option<ObstacleRules>,
}

impl Blueprint {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            layer: Layer::NONE,
            collider: None,
            anchors: Vec::new(),
            kind: None,
            obstacle_rules: None,
        }
    }

    pub fn with_layer(mut self, layer: Layer) -> Self {
        self.layer = layer;
        self
    }

    pub fn with_collider(mut self, center: Vec3, half_extents: Vec3) -> Self {
        self.collider = Some(BoxShape {
            center,
            half_extents,
        });
        self
    }

    /// Add an anchor at a local position facing a local direction
    pub fn with_anchor(mut self, name: impl Into<String>, position: Vec3, facing: Vec3) -> Self {
        self.anchors.push((name.into(), Pose::looking(position, facing)));
        self
    }

    pub fn with_kind(mut self, kind: SegmentKind) -> Self {
        self.kind = Some(kind);
        self
    }

    pub fn with_rules(mut self, rules: ObstacleRules) -> Self {
        self.obstacle_rules = Some(rules);
        self
    }
}

/// A live instance
#[derive(Debug, Clone)]
struct Instance {
    prefab: PrefabId,
    pose: Pose,
    parent: Option<InstanceHandle>,
}

#[derive(Debug, Clone, Default)]
pub struct SandboxWorld {
    blueprints: Vec<Blueprint>,
    /// Live instances, ordered by handle for stable query results
    instances: BTreeMap<InstanceHandle, Instance>,
    next_handle: u64,
    /// Instances ever created
    spawned: u64,
}

impl SandboxWorld {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a blueprint and get its prefab id
    pub fn register(&mut self, blueprint: Blueprint) -> PrefabId {
        let id = PrefabId(self.blueprints.len() as u32);
        self.blueprints.push(blueprint);
        id
    }

    pub fn blueprint(&self, prefab: PrefabId) -> Option<&Blueprint> {
        self.blueprints.get(prefab.0 as usize)
    }

    /// Catalog metadata for a registered blueprint
    pub fn prefab_info(&self, prefab: PrefabId) -> Option<PrefabInfo> {
        self.blueprint(prefab).map(|bp| PrefabInfo {
            id: prefab,
            name: bp.name.clone(),
            kind: bp.kind,
            children: bp.anchors.iter().map(|(name, _)| name.clone()).collect(),
            obstacle_rules: bp.obstacle_rules.clone(),
        })
    }

    pub fn is_alive(&self, instance: InstanceHandle) -> bool {
        self.instances.contains_key(&instance)
    }

    pub fn live_count(&self) -> usize {
        self.instances.len()
    }

    pub fn spawned(&self) -> u64 {
        self.spawned
    }

    pub fn pose_of(&self, instance: InstanceHandle) -> Option<Pose> {
        self.instances.get(&instance).map(|i| i.pose)
    }

    pub fn prefab_of(&self, instance: InstanceHandle) -> Option<PrefabId> {
        self.instances.get(&instance).map(|i| i.prefab)
    }

    /// Direct children of an instance
    pub fn children_of(&self, parent: InstanceHandle) -> Vec<InstanceHandle> {
        self.instances
            .iter()
            .filter(|(_, inst)| inst.parent == Some(parent))
            .map(|(handle, _)| *handle)
            .collect()
    }

    fn volume_of(&self, inst: &Instance) -> Option<(Layer, BoxVolume)> {
        let bp = self.blueprint(inst.prefab)?;
        let shape = bp.collider?;
        Some((
            bp.layer,
            BoxVolume {
                center: inst.pose.transform_point(shape.center),
                half_extents: shape.half_extents,
                rotation: inst.pose.rotation,
            },
        ))
    }
}

impl World for SandboxWorld {
    fn instantiate(
        &mut self,
        prefab: PrefabId,
        pose: Pose,
        parent: Option<InstanceHandle>,
    ) -> InstanceHandle {
        self.next_handle += 1;
        self.spawned += 1;
        let handle = InstanceHandle(self.next_handle);
        self.instances.insert(
            handle,
            Instance {
                prefab,
                pose,
                parent,
            },
        );
        handle
    }

    fn destroy(&mut self, instance: InstanceHandle) {
        let mut doomed = vec![instance];
        while let Some(handle) = doomed.pop() {
            if self.instances.remove(&handle).is_some() {
                doomed.extend(self.children_of(handle));
            }
        }
    }

    fn find_child_nth(&self, instance: InstanceHandle, name: &str, n: usize) -> Option<Pose> {
        let inst = self.instances.get(&instance)?;
        let bp = self.blueprint(inst.prefab)?;
        bp.anchors
            .iter()
            .filter(|(anchor, _)| anchor == name)
            .nth(n)
            .map(|(_, local)| inst.pose.then(local))
    }

    fn collider(&self, instance: InstanceHandle) -> Option<BoxVolume> {
        let inst = self.instances.get(&instance)?;
        self.volume_of(inst).map(|(_, volume)| volume)
    }

    fn overlap_box(
        &self,
        center: Vec3,
        half_extents: Vec3,
        rotation: Quat,
        mask: Layer,
    ) -> Vec<InstanceHandle> {
        let query = BoxVolume {
            center,
            half_extents,
            rotation,
        };
        self.instances
            .iter()
            .filter_map(|(handle, inst)| {
                let (layer, volume) = self.volume_of(inst)?;
                (layer.intersects(mask) && boxes_overlap(&query, &volume, CONTACT_TOLERANCE))
                    .then_some(*handle)
            })
            .collect()
    }
}
