//! Per-unit decision phases within one turn
//!
//! Idle → Enumerating → Cached → Ranking → Committed. A cached unit goes
//! back to Enumerating when its candidates turn stale. Committed holds
//! until the next turn starts.

use ahash::AHashMap;
use serde::Serialize;

use crate::core::types::{Round, UnitId};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize)]
pub enum UnitPhase {
    #[default]
    Idle,
    Enumerating,
    Cached,
    Ranking,
    Committed,
}

impl UnitPhase {
    /// Phases this one may move to
    fn successors(&self) -> &'static [UnitPhase] {
        match self {
            UnitPhase::Idle => &[UnitPhase::Enumerating],
            UnitPhase::Enumerating => &[UnitPhase::Cached],
            UnitPhase::Cached => &[UnitPhase::Ranking, UnitPhase::Enumerating],
            UnitPhase::Ranking => &[UnitPhase::Committed],
            UnitPhase::Committed => &[],
        }
    }

    pub fn can_advance_to(&self, next: UnitPhase) -> bool {
        self.successors().contains(&next)
    }
}

#[derive(Debug, Default)]
pub struct TurnTracker {
    round: Round,
    phases: AHashMap<UnitId, UnitPhase>,
}

impl TurnTracker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn round(&self) -> Round {
        self.round
    }

    pub fn phase(&self, unit: UnitId) -> UnitPhase {
        self.phases.get(&unit).copied().unwrap_or_default()
    }

    /// Move a unit to `next`; returns false (and leaves it) if not allowed
    pub fn advance(&mut self, unit: UnitId, next: UnitPhase) -> bool {
        let current = self.phase(unit);
        if !current.can_advance_to(next) {
            tracing::debug!(unit = %unit, from = ?current, to = ?next, "phase change refused");
            return false;
        }
        self.phases.insert(unit, next);
        true
    }

    /// Candidates turned stale; only meaningful while cached
    pub fn invalidate(&mut self, unit: UnitId) -> bool {
        self.phase(unit) == UnitPhase::Cached && self.advance(unit, UnitPhase::Enumerating)
    }

    pub fn is_committed(&self, unit: UnitId) -> bool {
        self.phase(unit) == UnitPhase::Committed
    }

    /// Units that have committed a move this turn, by id
    pub fn committed_units(&self) -> Vec<UnitId> {
        let mut units: Vec<UnitId> = self
            .phases
            .iter()
            .filter(|(_, phase)| **phase == UnitPhase::Committed)
            .map(|(id, _)| *id)
            .collect();
        units.sort();
        units
    }

    /// Every unit back to Idle
    pub fn new_turn(&mut self, round: Round) {
        self.round = round;
        self.phases.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_full_cycle() {
        let mut turns = TurnTracker::new();
        let unit = UnitId(1);
        assert_eq!(turns.phase(unit), UnitPhase::Idle);
        assert!(turns.advance(unit, UnitPhase::Enumerating));
        assert!(turns.advance(unit, UnitPhase::Cached));
        assert!(turns.advance(unit, UnitPhase::Ranking));
        assert!(turns.advance(unit, UnitPhase::Committed));
        assert!(turns.is_committed(unit));
        assert_eq!(turns.committed_units(), vec![unit]);
    }

    #[test]
    fn test_committed_is_terminal_until_new_turn() {
        let mut turns = TurnTracker::new();
        let unit = UnitId(2);
        for phase in [
            UnitPhase::Enumerating,
            UnitPhase::Cached,
            UnitPhase::Ranking,
            UnitPhase::Committed,
        ] {
            turns.advance(unit, phase);
        }
        assert!(!turns.advance(unit, UnitPhase::Enumerating));
        assert!(!turns.invalidate(unit));

        turns.new_turn(4);
        assert_eq!(turns.round(), 4);
        assert_eq!(turns.phase(unit), UnitPhase::Idle);
    }

    #[test]
    fn test_dirty_cache_goes_back_to_enumerating() {
        let mut turns = TurnTracker::new();
        let unit = UnitId(3);
        turns.advance(unit, UnitPhase::Enumerating);
        assert!(!turns.invalidate(unit));
        turns.advance(unit, UnitPhase::Cached);
        assert!(turns.invalidate(unit));
        assert_eq!(turns.phase(unit), UnitPhase::Enumerating);
    }

    #[test]
    fn test_skipping_phases_refused() {
        let mut turns = TurnTracker::new();
        assert!(!turns.advance(UnitId(1), UnitPhase::Ranking));
        assert!(!turns.advance(UnitId(1), UnitPhase::Committed));
        assert_eq!(turns.phase(UnitId(1)), UnitPhase::Idle);
    }
}
