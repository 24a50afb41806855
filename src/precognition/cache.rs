//! Per-unit cache of enumerated paths with dirty tracking

use std::collections::BTreeSet;
use std::sync::Arc;

use ahash::AHashMap;

use crate::board::HexCoord;
use crate::core::types::{Round, UnitId};
use crate::movement::{EnumerationResult, MovePath};
use crate::units::Battlefield;

/// Candidates for one unit, plus every hex they pass through
#[derive(Debug, Clone)]
pub struct CachedPaths {
    pub paths: Arc<Vec<MovePath>>,
    pub reachable: BTreeSet<HexCoord>,
    pub truncated: bool,
    pub round: Round,
}

impl CachedPaths {
    pub fn new(result: EnumerationResult, round: Round) -> Self {
        let reachable = result.paths.iter().flat_map(|p| p.hexes()).collect();
        Self {
            paths: Arc::new(result.paths),
            reachable,
            truncated: result.truncated,
            round,
        }
    }
}

#[derive(Debug, Default)]
pub struct PathCache {
    entries: AHashMap<UnitId, CachedPaths>,
    /// Ordered so refreshes happen in unit id order
    dirty: BTreeSet<UnitId>,
}

impl PathCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, unit: UnitId) -> Option<&CachedPaths> {
        self.entries.get(&unit)
    }

    /// Cached candidates that are not dirty
    pub fn fresh(&self, unit: UnitId) -> Option<Arc<Vec<MovePath>>> {
        if self.dirty.contains(&unit) {
            return None;
        }
        self.entries.get(&unit).map(|c| Arc::clone(&c.paths))
    }

    pub fn insert(&mut self, unit: UnitId, cached: CachedPaths) {
        self.entries.insert(unit, cached);
        self.dirty.remove(&unit);
    }

    pub fn remove(&mut self, unit: UnitId) -> Option<CachedPaths> {
        self.dirty.remove(&unit);
        self.entries.remove(&unit)
    }

    pub fn mark_dirty(&mut self, unit: UnitId) {
        self.dirty.insert(unit);
    }

    pub fn is_dirty(&self, unit: UnitId) -> bool {
        self.dirty.contains(&unit)
    }

    /// Lowest dirty unit id
    pub fn next_dirty(&self) -> Option<UnitId> {
        self.dirty.iter().next().copied()
    }

    pub fn dirty_count(&self) -> usize {
        self.dirty.len()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Dirty a moved unit and every cached unit that could have passed
    /// through its old or new hex
    ///
    /// Units that can no longer act this turn are left alone.
    pub fn unit_moved(&mut self, battlefield: &Battlefield, unit: UnitId, from: HexCoord, to: HexCoord) {
        self.dirty.insert(unit);
        let affected: Vec<UnitId> = self
            .entries
            .iter()
            .filter(|(id, cached)| {
                **id != unit && (cached.reachable.contains(&from) || cached.reachable.contains(&to))
            })
            .map(|(id, _)| *id)
            .filter(|id| {
                battlefield
                    .unit(*id)
                    .is_some_and(|u| u.selectable && u.is_active())
            })
            .collect();
        for id in affected {
            tracing::trace!(unit = %id, moved = %unit, "path cache invalidated");
            self.dirty.insert(id);
        }
    }

    /// Drop entries for units missing from the battlefield
    pub fn retain_present(&mut self, battlefield: &Battlefield) {
        self.entries.retain(|id, _| battlefield.unit(*id).is_some());
        self.dirty.retain(|id| battlefield.unit(*id).is_some());
    }
}
