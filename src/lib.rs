//! Endless Bridge - procedural track generation for an endless runner
//!
//! Core modules:
//! - `track`: Deterministic generator (path extension, obstacles, retirement)
//! - `sandbox`: In-memory world used to materialize and overlap-test pieces
//! - `settings`: Data-driven generator tuning

pub mod sandbox;
pub mod settings;
pub mod track;

pub use settings::{GeneratorSettings, OccupancyPolicy};

use glam::{EulerRot, Mat3, Quat, Vec3};
use serde::{Deserialize, Serialize};

/// Generator defaults
pub mod consts {
    /// Active segments kept alive ahead of (and around) the observer
    pub const MAX_SEGMENTS: usize = 30;
    /// Nominal length of one segment, used for the lookahead step
    pub const SEGMENT_LENGTH: f32 = 6.0;
    /// Segments further than this behind the observer are retired
    pub const DESPAWN_DISTANCE: f32 = 30.0;
    /// Dot product below which a segment counts as "behind"
    pub const BEHIND_DOT_THRESHOLD: f32 = -0.5;

    /// Turns allowed per window
    pub const TURN_LIMIT: u32 = 1;
    /// Segment commits per turn window
    pub const SEGMENT_WINDOW: u32 = 20;
    /// Chance to try turn kinds before straight
    pub const TURN_PREFERENCE_CHANCE: f32 = 0.1;
    /// Whole-procedure retries before the path is declared blocked
    pub const MAX_ATTEMPTS: u32 = 10;

    /// Chance that a committed segment receives an obstacle
    pub const OBSTACLE_SPAWN_CHANCE: f32 = 0.3;

    /// Copies of the first catalog template laid down unconditionally at startup
    pub const WARMUP_SEGMENTS: usize = 4;

    /// Grid size used to compare occupancy positions
    pub const OCCUPANCY_CELL: f32 = 0.01;

    /// Child anchor that marks where the next segment attaches
    pub const EXIT_ANCHOR: &str = "ExitPoint";
    /// Prefix of child anchors that may hold an obstacle
    pub const SPAWN_ANCHOR_PREFIX: &str = "SpawnPoint";
}

/// A world-space position plus orientation
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Pose {
    pub position: Vec3,
    pub rotation: Quat,
}

impl Default for Pose {
    fn default() -> Self {
        Self::IDENTITY
    }
}

impl Pose {
    pub const IDENTITY: Self = Self {
        position: Vec3::ZERO,
        rotation: Quat::IDENTITY,
    };

    pub fn new(position: Vec3, rotation: Quat) -> Self {
        Self { position, rotation }
    }

    /// Pose at `position` facing along `forward`
    pub fn looking(position: Vec3, forward: Vec3) -> Self {
        Self::new(position, look_rotation(forward))
    }

    /// Local +Z axis in world space
    #[inline]
    pub fn forward(&self) -> Vec3 {
        self.rotation * Vec3::Z
    }

    /// Transform a point from this pose's local space to world space
    #[inline]
    pub fn transform_point(&self, local: Vec3) -> Vec3 {
        self.position + self.rotation * local
    }

    /// Compose a child pose expressed in this pose's local space
    pub fn then(&self, local: &Pose) -> Pose {
        Pose {
            position: self.transform_point(local.position),
            rotation: (self.rotation * local.rotation).normalize(),
        }
    }
}

/// Rotation whose +Z axis points along `forward` with +Y kept as close to up as possible
pub fn look_rotation(forward: Vec3) -> Quat {
    let z = forward.normalize_or_zero();
    if z == Vec3::ZERO {
        return Quat::IDENTITY;
    }
    let x = Vec3::Y.cross(z);
    if x.length_squared() < 1e-8 {
        // Looking straight up or down: yaw is undefined
        return Quat::from_rotation_arc(Vec3::Z, z);
    }
    let x = x.normalize();
    let y = z.cross(x);
    Quat::from_mat3(&Mat3::from_cols(x, y, z)).normalize()
}

/// Rotate a direction about the vertical axis (positive degrees turn right)
#[inline]
pub fn yaw_by_degrees(direction: Vec3, degrees: f32) -> Vec3 {
    Quat::from_rotation_y(degrees.to_radians()) * direction
}

/// Rotation from euler degrees, applied Z first, then X, then Y
pub fn euler_degrees(angles: Vec3) -> Quat {
    Quat::from_euler(
        EulerRot::YXZ,
        angles.y.to_radians(),
        angles.x.to_radians(),
        angles.z.to_radians(),
    )
}
