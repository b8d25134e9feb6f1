//! Coarse self-intersection index
//!
//! Positions are snapped to a small grid so that anchors computed through
//! different rotation chains still compare equal.

use std::collections::HashMap;

use glam::Vec3;

use crate::OccupancyPolicy;

/// Snapped grid coordinate
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
struct Cell([i64; 3]);

/// Multiset of used anchor positions
#[derive(Debug, Clone)]
pub struct OccupancySet {
    cell: f32,
    policy: OccupancyPolicy,
    /// Cell -> number of committed segments referencing it
    counts: HashMap<Cell, u32>,
    /// Total insert operations over the generator's lifetime
    insertions: u64,
}

impl OccupancySet {
    pub fn new(cell: f32, policy: OccupancyPolicy) -> Self {
        Self {
            cell,
            policy,
            counts: HashMap::new(),
            insertions: 0,
        }
    }

    fn key(&self, pos: Vec3) -> Cell {
        let snapped = (pos / self.cell).round();
        Cell([snapped.x as i64, snapped.y as i64, snapped.z as i64])
    }

    pub fn insert(&mut self, pos: Vec3) {
        let key = self.key(pos);
        *self.counts.entry(key).or_insert(0) += 1;
        self.insertions += 1;
    }

    /// Whether a stored position lies within one cell of `pos` on every axis
    ///
    /// Neighbouring cells are checked too, so two positions straddling a
    /// half-cell boundary still match.
    pub fn contains(&self, pos: Vec3) -> bool {
        let Cell([x, y, z]) = self.key(pos);
        for dx in -1..=1 {
            for dy in -1..=1 {
                for dz in -1..=1 {
                    let cell = [x + dx, y + dy, z + dz];
                    if !self.counts.contains_key(&Cell(cell)) {
                        continue;
                    }
                    let centre =
                        Vec3::new(cell[0] as f32, cell[1] as f32, cell[2] as f32) * self.cell;
                    if (centre - pos).abs().max_element() <= self.cell {
                        return true;
                    }
                }
            }
        }
        false
    }

    /// Drop one reference to a position; only honored under `EvictOnRetire`
    pub fn release(&mut self, pos: Vec3) -> bool {
        if self.policy != OccupancyPolicy::EvictOnRetire {
            return false;
        }
        let key = self.key(pos);
        match self.counts.get_mut(&key) {
            Some(count) if *count > 1 => {
                *count -= 1;
                false
            }
            Some(_) => {
                self.counts.remove(&key);
                true
            }
            None => false,
        }
    }

    /// Distinct occupied positions
    pub fn len(&self) -> usize {
        self.counts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.counts.is_empty()
    }

    pub fn insertions(&self) -> u64 {
        self.insertions
    }

    pub fn policy(&self) -> OccupancyPolicy {
        self.policy
    }
}
