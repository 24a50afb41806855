//! Breadth-first enumeration of every path a unit can take this turn
//!
//! Search states are pruned by [`SearchKey`]: a new path reaching a known
//! key replaces the retained one only when it is strictly cheaper, and the
//! replaced path's queue entry is skipped when it comes up. The result holds
//! one path per retained key that ends legally, stay-put first.

use std::collections::VecDeque;
use std::sync::Arc;
use std::time::Instant;

use ahash::AHashMap;

use crate::core::config::EnumerationConfig;
use crate::movement::path::{MovePath, SearchKey, StepContext};
use crate::movement::step::{StepType, AIRBORNE_STEPS, GROUND_STEPS};
use crate::rules::RulesEngine;
use crate::units::{Battlefield, Domain, Unit};

/// How often (in expanded nodes) the clock is consulted
const CLOCK_CHECK_INTERVAL: usize = 64;

#[derive(Debug, Clone)]
pub struct EnumerationResult {
    /// Candidate paths; the first is always the stay-put path
    pub paths: Vec<MovePath>,
    /// A node or time budget ran out before the search finished
    pub truncated: bool,
    pub nodes_expanded: usize,
}

pub struct PathEnumerator {
    config: EnumerationConfig,
    rules: Arc<dyn RulesEngine>,
}

impl PathEnumerator {
    pub fn new(config: EnumerationConfig, rules: Arc<dyn RulesEngine>) -> Self {
        Self { config, rules }
    }

    pub fn rules(&self) -> &dyn RulesEngine {
        self.rules.as_ref()
    }

    pub fn config(&self) -> &EnumerationConfig {
        &self.config
    }

    /// All candidate paths for `unit` on `battlefield`
    pub fn enumerate(&self, unit: &Unit, battlefield: &Battlefield) -> EnumerationResult {
        let started = Instant::now();
        let budget = self.config.time_budget();
        let ctx = StepContext {
            unit,
            battlefield,
            rules: self.rules.as_ref(),
        };
        let step_types: &[StepType] = if unit.posture.airborne {
            &AIRBORNE_STEPS
        } else {
            &GROUND_STEPS
        };

        let mut retained: Vec<MovePath> = Vec::new();
        let mut index: AHashMap<SearchKey, usize> = AHashMap::new();
        let mut queue: VecDeque<MovePath> = VecDeque::new();

        let root = MovePath::new(unit);
        index.insert(root.key(), 0);
        retained.push(root.clone());
        queue.push_back(root.clone());

        if unit.jump_mp > 0 && unit.domain == Domain::Ground {
            if let Some(jump) = root.extended(StepType::StartJump, &ctx) {
                index.insert(jump.key(), retained.len());
                retained.push(jump.clone());
                queue.push_back(jump);
            }
        }

        let mut truncated = false;
        let mut nodes_expanded = 0usize;

        while let Some(path) = queue.pop_front() {
            let key = path.key();
            let current = index.get(&key).map(|i| retained[*i].mp_used());
            if current.is_some_and(|mp| mp < path.mp_used()) {
                continue;
            }

            if nodes_expanded >= self.config.max_nodes {
                truncated = true;
                break;
            }
            if nodes_expanded % CLOCK_CHECK_INTERVAL == 0 && started.elapsed() > budget {
                truncated = true;
                break;
            }
            nodes_expanded += 1;

            for step_type in step_types {
                let Some(next) = path.extended(*step_type, &ctx) else {
                    continue;
                };
                let next_key = next.key();
                match index.get(&next_key) {
                    Some(&i) => {
                        if next.mp_used() < retained[i].mp_used() {
                            retained[i] = next.clone();
                            queue.push_back(next);
                        }
                    }
                    None => {
                        index.insert(next_key, retained.len());
                        retained.push(next.clone());
                        queue.push_back(next);
                    }
                }
            }
        }

        let mut paths: Vec<MovePath> = retained
            .into_iter()
            .enumerate()
            .filter(|(i, path)| *i == 0 || path.is_legal_end(&ctx))
            .map(|(_, path)| path)
            .collect();

        if paths.len() > self.config.max_cached_paths {
            paths.truncate(self.config.max_cached_paths.max(1));
            truncated = true;
        }

        if truncated {
            tracing::warn!(
                unit = %unit.id,
                candidates = paths.len(),
                nodes_expanded,
                "path enumeration truncated"
            );
        } else {
            tracing::debug!(
                unit = %unit.id,
                candidates = paths.len(),
                nodes_expanded,
                elapsed_us = started.elapsed().as_micros() as u64,
                "paths enumerated"
            );
        }

        EnumerationResult {
            paths,
            truncated,
            nodes_expanded,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::board::{Board, Facing, HexCoord};
    use crate::rules::StandardRules;

    fn enumerator() -> PathEnumerator {
        PathEnumerator::new(EnumerationConfig::default(), Arc::new(StandardRules::new()))
    }

    #[test]
    fn test_stay_put_is_first() {
        let unit = Unit::new(1, "Mech", 0, 50, 4).at(HexCoord::new(5, 5), Facing::NORTH);
        let field = Battlefield::new(Board::new(12, 12)).with_unit(unit.clone());
        let result = enumerator().enumerate(&unit, &field);
        assert!(result.paths[0].is_stay_put());
        assert!(!result.truncated);
        assert!(result.paths.len() > 1);
    }

    #[test]
    fn test_reachable_hexes_within_run_range() {
        let unit = Unit::new(1, "Mech", 0, 50, 4).at(HexCoord::new(6, 6), Facing::NORTH);
        let field = Battlefield::new(Board::new(14, 14)).with_unit(unit.clone());
        let result = enumerator().enumerate(&unit, &field);
        for path in &result.paths {
            assert!(path.mp_used() <= unit.run_mp());
            assert!(path.end_position().distance(&unit.position) <= unit.run_mp());
        }
        // Straight ahead at full run
        assert!(result
            .paths
            .iter()
            .any(|p| p.end_position() == HexCoord::new(6, 0)));
    }

    #[test]
    fn test_immobile_unit_only_stays() {
        let mut unit = Unit::new(1, "Mech", 0, 50, 4).at(HexCoord::new(5, 5), Facing::NORTH);
        unit.posture.immobile = true;
        let field = Battlefield::new(Board::new(12, 12)).with_unit(unit.clone());
        let result = enumerator().enumerate(&unit, &field);
        assert_eq!(result.paths.len(), 1);
        assert!(result.paths[0].is_stay_put());
    }

    #[test]
    fn test_zero_mp_unit_only_stays() {
        let unit = Unit::new(1, "Turret", 0, 50, 0).at(HexCoord::new(5, 5), Facing::NORTH);
        let field = Battlefield::new(Board::new(12, 12)).with_unit(unit.clone());
        let result = enumerator().enumerate(&unit, &field);
        assert_eq!(result.paths.len(), 1);
    }

    #[test]
    fn test_node_budget_truncates() {
        let unit = Unit::new(1, "Mech", 0, 50, 6).at(HexCoord::new(8, 8), Facing::NORTH);
        let field = Battlefield::new(Board::new(16, 16)).with_unit(unit.clone());
        let config = EnumerationConfig {
            max_nodes: 10,
            ..EnumerationConfig::default()
        };
        let enumerator = PathEnumerator::new(config, Arc::new(StandardRules::new()));
        let result = enumerator.enumerate(&unit, &field);
        assert!(result.truncated);
        assert_eq!(result.nodes_expanded, 10);
        assert!(result.paths[0].is_stay_put());
    }

    #[test]
    fn test_jump_paths_included() {
        let mut unit = Unit::new(1, "Jumper", 0, 45, 4).at(HexCoord::new(6, 6), Facing::NORTH);
        unit.jump_mp = 4;
        let field = Battlefield::new(Board::new(14, 14)).with_unit(unit.clone());
        let result = enumerator().enumerate(&unit, &field);
        let jumps: Vec<_> = result
            .paths
            .iter()
            .filter(|p| p.final_state().posture.jumping)
            .collect();
        assert!(!jumps.is_empty());
        assert!(jumps.iter().all(|p| p.hexes_moved() >= 1));
    }
}
