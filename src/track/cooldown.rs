//! Per-template obstacle cooldowns

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::world::PrefabId;

/// Segments remaining before each obstacle template may spawn again
///
/// A cooldown armed on a segment is not decremented by that same
/// segment's tick, so a template armed with `n` is skipped on exactly the
/// next `n` segments.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CooldownMap {
    remaining: BTreeMap<PrefabId, u32>,
    /// Armed since the last tick
    fresh: Vec<PrefabId>,
}

impl CooldownMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Remaining segments for a template (0 = eligible)
    pub fn remaining(&self, prefab: PrefabId) -> u32 {
        self.remaining.get(&prefab).copied().unwrap_or(0)
    }

    #[inline]
    pub fn is_ready(&self, prefab: PrefabId) -> bool {
        self.remaining(prefab) == 0
    }

    /// Start a cooldown after a placement; zero-length cooldowns are ignored
    pub fn arm(&mut self, prefab: PrefabId, segments: u32) {
        if segments == 0 {
            return;
        }
        self.remaining.insert(prefab, segments);
        if !self.fresh.contains(&prefab) {
            self.fresh.push(prefab);
        }
    }

    /// Advance by one committed segment, flooring at zero
    pub fn tick(&mut self) {
        for (prefab, left) in self.remaining.iter_mut() {
            if !self.fresh.contains(prefab) {
                *left = left.saturating_sub(1);
            }
        }
        self.fresh.clear();
    }

    /// Templates currently cooling down
    pub fn active(&self) -> impl Iterator<Item = (PrefabId, u32)> + '_ {
        self.remaining
            .iter()
            .filter(|(_, left)| **left > 0)
            .map(|(id, left)| (*id, *left))
    }
}
