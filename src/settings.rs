//! Generator settings
//!
//! Loaded once at startup from JSON; every field falls back to the
//! built-in default when missing.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::consts::*;
use crate::track::TrackError;

/// What happens to occupancy entries when their segment is retired
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum OccupancyPolicy {
    /// Entries accumulate for the lifetime of the generator
    #[default]
    Retain,
    /// A retired segment releases its entry and exit positions
    EvictOnRetire,
}

impl OccupancyPolicy {
    pub fn as_str(&self) -> &'static str {
        match self {
            OccupancyPolicy::Retain => "Retain",
            OccupancyPolicy::EvictOnRetire => "EvictOnRetire",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "retain" => Some(OccupancyPolicy::Retain),
            "evict" | "evictonretire" | "evict_on_retire" => Some(OccupancyPolicy::EvictOnRetire),
            _ => None,
        }
    }
}

/// Tuning for the track generator
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneratorSettings {
    /// RNG seed; the same seed and catalogs reproduce the same track
    pub seed: u64,

    // === Queue ===
    /// Target number of active segments
    pub max_segments: usize,
    /// Copies of the first catalog template placed unconditionally at startup
    pub warmup_segments: usize,

    // === Geometry ===
    /// Lookahead step past a predicted exit
    pub segment_length: f32,
    /// Minimum distance before a segment behind the observer is retired
    pub despawn_distance: f32,
    /// Normalized dot product below which a segment counts as behind
    pub behind_dot_threshold: f32,

    // === Path extension ===
    /// Turns allowed inside one window
    pub turn_limit: u32,
    /// Commits per turn window
    pub segment_window: u32,
    /// Chance to try turns before straight on each attempt
    pub turn_preference_chance: f32,
    /// Attempts before generation is declared stalled
    pub max_attempts: u32,

    // === Obstacles ===
    /// Chance that a committed segment gets an obstacle
    pub obstacle_spawn_chance: f32,

    // === Occupancy ===
    /// Occupancy grid size; positions within one cell per axis compare equal
    pub occupancy_cell: f32,
    /// Whether retirement releases occupancy entries
    pub occupancy_policy: OccupancyPolicy,
}

impl Default for GeneratorSettings {
    fn default() -> Self {
        Self {
            seed: 0,

            max_segments: MAX_SEGMENTS,
            warmup_segments: WARMUP_SEGMENTS,

            segment_length: SEGMENT_LENGTH,
            despawn_distance: DESPAWN_DISTANCE,
            behind_dot_threshold: BEHIND_DOT_THRESHOLD,

            turn_limit: TURN_LIMIT,
            segment_window: SEGMENT_WINDOW,
            turn_preference_chance: TURN_PREFERENCE_CHANCE,
            max_attempts: MAX_ATTEMPTS,

            obstacle_spawn_chance: OBSTACLE_SPAWN_CHANCE,

            occupancy_cell: OCCUPANCY_CELL,
            occupancy_policy: OccupancyPolicy::Retain,
        }
    }
}

impl GeneratorSettings {
    /// Default settings with a specific seed
    pub fn with_seed(seed: u64) -> Self {
        Self {
            seed,
            ..Self::default()
        }
    }

    /// Parse settings from JSON and validate them
    pub fn from_json(json: &str) -> Result<Self, TrackError> {
        let mut settings: Self = serde_json::from_str(json)?;
        settings.validate();
        Ok(settings)
    }

    /// Load settings from a JSON file
    pub fn load(path: impl AsRef<Path>) -> Result<Self, TrackError> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path)?;
        let settings = Self::from_json(&json)?;
        log::info!("Loaded generator settings from {}", path.display());
        Ok(settings)
    }

    pub fn to_json(&self) -> Result<String, TrackError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Clamp out-of-range values, warning about each correction
    pub fn validate(&mut self) {
        if self.segment_window == 0 {
            log::warn!("segment_window must be at least 1, using 1");
            self.segment_window = 1;
        }
        if self.max_attempts == 0 {
            log::warn!("max_attempts must be at least 1, using 1");
            self.max_attempts = 1;
        }
        if !(0.0..=1.0).contains(&self.turn_preference_chance) {
            log::warn!("turn_preference_chance {} out of range", self.turn_preference_chance);
            self.turn_preference_chance = self.turn_preference_chance.clamp(0.0, 1.0);
        }
        if !(0.0..=1.0).contains(&self.obstacle_spawn_chance) {
            log::warn!("obstacle_spawn_chance {} out of range", self.obstacle_spawn_chance);
            self.obstacle_spawn_chance = self.obstacle_spawn_chance.clamp(0.0, 1.0);
        }
        if self.occupancy_cell.is_nan() || self.occupancy_cell <= 0.0 {
            log::warn!("occupancy_cell must be positive, using {}", OCCUPANCY_CELL);
            self.occupancy_cell = OCCUPANCY_CELL;
        }
        if self.warmup_segments > self.max_segments {
            log::warn!(
                "warmup_segments {} exceeds max_segments {}",
                self.warmup_segments,
                self.max_segments
            );
            self.warmup_segments = self.max_segments;
        }
    }
}
