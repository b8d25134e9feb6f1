//! Oriented box intersection
//!
//! Separating axis test over the 15 candidate axes of two boxes: three
//! face normals each plus the nine edge cross products.

use glam::Vec3;

use crate::track::BoxVolume;

/// Separation (world units) below which touching boxes are not overlapping
pub const CONTACT_TOLERANCE: f32 = 1e-3;

/// The three local axes of a box in world space
#[inline]
fn axes(b: &BoxVolume) -> [Vec3; 3] {
    [b.rotation * Vec3::X, b.rotation * Vec3::Y, b.rotation * Vec3::Z]
}

/// Half-length of a box's projection onto `axis`
#[inline]
fn projected_radius(b: &BoxVolume, b_axes: &[Vec3; 3], axis: Vec3) -> f32 {
    b_axes[0].dot(axis).abs() * b.half_extents.x
        + b_axes[1].dot(axis).abs() * b.half_extents.y
        + b_axes[2].dot(axis).abs() * b.half_extents.z
}

/// Check whether two boxes interpenetrate by more than `tolerance`
///
/// Boxes that merely share a face (chained segments) are reported as
/// separate.
pub fn boxes_overlap(a: &BoxVolume, b: &BoxVolume, tolerance: f32) -> bool {
    let a_axes = axes(a);
    let b_axes = axes(b);
    let offset = b.center - a.center;

    let separated_on = |axis: Vec3| -> bool {
        let ra = projected_radius(a, &a_axes, axis);
        let rb = projected_radius(b, &b_axes, axis);
        offset.dot(axis).abs() >= ra + rb - tolerance
    };

    for axis in a_axes.iter().chain(b_axes.iter()) {
        if separated_on(*axis) {
            return false;
        }
    }

    for ea in &a_axes {
        for eb in &b_axes {
            let cross = ea.cross(*eb);
            // Parallel edges: already covered by the face axes
            if cross.length_squared() < 1e-6 {
                continue;
            }
            if separated_on(cross.normalize()) {
                return false;
            }
        }
    }

    true
}
