//! Ready-made blueprints
//!
//! Segments are flat decks entered at their local origin heading +Z.

use glam::Vec3;

use super::{Blueprint, SandboxWorld};
use crate::consts::{EXIT_ANCHOR, SEGMENT_LENGTH};
use crate::track::{AnchorKind, Layer, ObstacleRules, PrefabInfo};

/// Deck thickness (half)
const DECK_HALF_HEIGHT: f32 = 0.25;

/// Straight deck with three lane anchors
pub fn straight(name: &str, length: f32, width: f32) -> Blueprint {
    let mid = length / 2.0;
    Blueprint::new(name)
        .with_layer(Layer::BRIDGE)
        .with_collider(
            Vec3::new(0.0, 0.0, mid),
            Vec3::new(width / 2.0, DECK_HALF_HEIGHT, mid),
        )
        .with_anchor(EXIT_ANCHOR, Vec3::new(0.0, 0.0, length), Vec3::Z)
        .with_anchor("SpawnPoint_Left", Vec3::new(-width / 4.0, DECK_HALF_HEIGHT, mid), Vec3::Z)
        .with_anchor("SpawnPoint_Center", Vec3::new(0.0, DECK_HALF_HEIGHT, mid), Vec3::Z)
        .with_anchor("SpawnPoint_Right", Vec3::new(width / 4.0, DECK_HALF_HEIGHT, mid), Vec3::Z)
}

/// Square corner deck; `side` is -1 for left, +1 for right
fn corner(name: &str, size: f32, side: f32) -> Blueprint {
    let half = size / 2.0;
    let out = Vec3::X * side;
    Blueprint::new(name)
        .with_layer(Layer::BRIDGE)
        .with_collider(
            Vec3::new(0.0, 0.0, half),
            Vec3::new(half, DECK_HALF_HEIGHT, half),
        )
        .with_anchor(EXIT_ANCHOR, Vec3::new(side * half, 0.0, half), out)
        .with_anchor("SpawnPoint", Vec3::new(0.0, DECK_HALF_HEIGHT, half), Vec3::Z)
}

pub fn left_turn(name: &str, size: f32) -> Blueprint {
    corner(name, size, -1.0)
}

pub fn right_turn(name: &str, size: f32) -> Blueprint {
    corner(name, size, 1.0)
}

/// Unit-sized obstacle on the obstacle layer
pub fn obstacle(name: &str, rules: ObstacleRules) -> Blueprint {
    Blueprint::new(name)
        .with_layer(Layer::OBSTACLE)
        .with_collider(Vec3::new(0.0, 0.5, 0.0), Vec3::splat(0.5))
        .with_rules(rules)
}

/// A world with a small bridge kit registered, plus its catalog metadata
pub struct DemoKit {
    pub world: SandboxWorld,
    pub segments: Vec<PrefabInfo>,
    pub obstacles: Vec<PrefabInfo>,
}

pub fn demo_world() -> DemoKit {
    let mut world = SandboxWorld::new();
    let size = SEGMENT_LENGTH;

    let segment_ids = [
        world.register(straight("Bridge_Straight_A", size, size)),
        world.register(straight("Bridge_Straight_B", size, size)),
        world.register(left_turn("Bridge_L_Turn", size)),
        world.register(right_turn("Bridge_R_Turn", size)),
    ];

    let mut obstacle_ids = vec![
        world.register(obstacle(
            "Barrier",
            ObstacleRules {
                allowed: AnchorKind::Center,
                min_segments_between_spawns: 2,
                ..Default::default()
            },
        )),
        world.register(obstacle(
            "Crate",
            ObstacleRules {
                height_offset: 0.5,
                ..Default::default()
            },
        )),
        world.register(obstacle(
            "Rock_Left",
            ObstacleRules {
                allowed: AnchorKind::Left,
                rotation_offset: Vec3::new(0.0, 45.0, 0.0),
                ..Default::default()
            },
        )),
        world.register(obstacle(
            "Spikes",
            ObstacleRules {
                min_segments_between_spawns: 5,
                ..Default::default()
            },
        )),
    ];
    // No rules: loads unconstrained
    let mut lantern = obstacle("Lantern", ObstacleRules::default());
    lantern.obstacle_rules = None;
    obstacle_ids.push(world.register(lantern));

    let segments = segment_ids
        .iter()
        .filter_map(|id| world.prefab_info(*id))
        .collect();
    let obstacles = obstacle_ids
        .iter()
        .filter_map(|id| world.prefab_info(*id))
        .collect();

    DemoKit {
        world,
        segments,
        obstacles,
    }
}
