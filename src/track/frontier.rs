//! Open end of the path and the turn-frequency window

use glam::Vec3;
use serde::{Deserialize, Serialize};

use crate::Pose;

/// Where the next segment attaches, plus turn bookkeeping
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Frontier {
    /// Current spawn position
    pub position: Vec3,
    /// Current spawn direction (unit)
    pub direction: Vec3,
    /// Turns committed in the current window
    pub turn_counter: u32,
    /// Commits since the window started
    pub segments_since_window_start: u32,
}

impl Default for Frontier {
    fn default() -> Self {
        Self::new(Vec3::ZERO, Vec3::Z)
    }
}

impl Frontier {
    pub fn new(position: Vec3, direction: Vec3) -> Self {
        Self {
            position,
            direction: direction.normalize_or(Vec3::Z),
            turn_counter: 0,
            segments_since_window_start: 0,
        }
    }

    /// Pose a new segment is materialized at
    pub fn spawn_pose(&self) -> Pose {
        Pose::looking(self.position, self.direction)
    }

    #[inline]
    pub fn turn_allowed(&self, turn_limit: u32) -> bool {
        self.turn_counter < turn_limit
    }

    /// Move the open end
    pub fn advance(&mut self, position: Vec3, direction: Vec3) {
        self.position = position;
        self.direction = direction.normalize_or(self.direction);
    }

    /// Count one commit against the window; returns true when the window resets
    pub fn record_commit(&mut self, was_turn: bool, window: u32) -> bool {
        if was_turn {
            self.turn_counter += 1;
        }
        self.segments_since_window_start += 1;
        if self.segments_since_window_start >= window {
            self.segments_since_window_start = 0;
            self.turn_counter = 0;
            return true;
        }
        false
    }
}
