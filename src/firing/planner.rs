//! Firing planner: estimator plus optimizer, per target and per twist

use std::sync::Arc;

use rand::Rng;

use crate::board::Twist;
use crate::combat::{CombatEstimator, EstimateOptions, WeaponShot};
use crate::core::config::FiringConfig;
use crate::core::types::UnitId;
use crate::firing::optimizer::{optimize, optimize_arcs};
use crate::firing::plan::FiringPlan;
use crate::rules::ShotContext;
use crate::units::{Battlefield, Unit, UnitState, WeaponArc};

/// Targets the owning player wants favored or spared
#[derive(Debug, Clone, Copy, Default)]
pub struct TargetPreferences<'a> {
    pub priority: &'a [UnitId],
    pub ignored: &'a [UnitId],
}

impl TargetPreferences<'_> {
    pub fn is_ignored(&self, target: UnitId) -> bool {
        self.ignored.contains(&target)
    }

    pub fn is_priority(&self, target: UnitId) -> bool {
        self.priority.contains(&target)
    }
}

/// A possible target with the state it is assumed to be in
#[derive(Debug, Clone, Copy)]
pub struct TargetState<'a> {
    pub unit: &'a Unit,
    pub state: UnitState,
}

impl<'a> TargetState<'a> {
    pub fn current(unit: &'a Unit) -> Self {
        Self {
            unit,
            state: UnitState::from_unit(unit),
        }
    }
}

pub struct FiringPlanner {
    estimator: Arc<CombatEstimator>,
    config: FiringConfig,
}

impl FiringPlanner {
    pub fn new(config: FiringConfig, estimator: Arc<CombatEstimator>) -> Self {
        Self { estimator, config }
    }

    pub fn estimator(&self) -> &CombatEstimator {
        &self.estimator
    }

    /// Heat the unit may still generate: capacity - heat + tolerance, at least 0
    pub fn heat_ceiling(&self, unit: &Unit, state: &UnitState) -> i32 {
        (unit.heat_capacity - state.heat + self.config.overheat_tolerance).max(0)
    }

    fn twists(attacker: &Unit) -> &'static [Twist] {
        const NO_TWIST: [Twist; 1] = [Twist::None];
        const ALL_TWISTS: [Twist; 3] = [Twist::None, Twist::Left, Twist::Right];
        if attacker.can_twist {
            &ALL_TWISTS
        } else {
            &NO_TWIST
        }
    }

    /// Every weapon of the attacker estimated against one target
    fn shots_against(
        &self,
        battlefield: &Battlefield,
        attacker: &Unit,
        attacker_state: &UnitState,
        target: &TargetState<'_>,
        options: EstimateOptions,
    ) -> Vec<WeaponShot> {
        attacker
            .weapons
            .iter()
            .map(|weapon| {
                let ctx = ShotContext {
                    battlefield,
                    attacker,
                    attacker_state,
                    target: target.unit,
                    target_state: &target.state,
                    weapon,
                    secondary_target: false,
                    assume_any_facing: false,
                };
                self.estimator.estimate(ctx, options)
            })
            .collect()
    }

    /// Apply utility weights to a plan
    pub fn score(&self, plan: &mut FiringPlan, attacker: &Unit, state: &UnitState, prefs: &TargetPreferences<'_>) {
        let overheat = (state.heat + plan.heat_used - attacker.heat_capacity).max(0);
        let mut utility = plan.expected_damage * self.config.damage_utility
            + plan.kill_probability * self.config.kill_utility
            - overheat as f64 * self.config.overheat_value;
        if !plan.is_empty() && plan.targets.iter().any(|t| prefs.is_priority(*t)) {
            utility += self.config.priority_target_bonus;
        }
        plan.utility = utility;
    }

    /// Best plan against a single target, trying every available twist
    pub fn plan_against(
        &self,
        battlefield: &Battlefield,
        attacker: &Unit,
        attacker_state: &UnitState,
        target: &TargetState<'_>,
        options: EstimateOptions,
        prefs: &TargetPreferences<'_>,
    ) -> FiringPlan {
        let ceiling = self.heat_ceiling(attacker, attacker_state);
        if prefs.is_ignored(target.unit.id) || !target.unit.is_active() {
            return FiringPlan::empty(ceiling);
        }

        let mut best: Option<FiringPlan> = None;
        for twist in Self::twists(attacker) {
            let state = attacker_state.with_twist(*twist);
            let shots = self.shots_against(battlefield, attacker, &state, target, options);
            let mut plan = select(attacker, shots, ceiling).with_twist(*twist);
            self.score(&mut plan, attacker, &state, prefs);
            if best.as_ref().map_or(true, |b| plan.utility > b.utility) {
                best = Some(plan);
            }
        }
        best.unwrap_or_else(|| FiringPlan::empty(ceiling))
    }

    /// Best plan over several targets
    ///
    /// Compares the best single-target plan with a split plan where every
    /// weapon shoots at whichever target it does most damage to (secondary
    /// targets take their modifier). Exact utility ties between single-target
    /// plans are broken with `rng`.
    pub fn best_plan<R: Rng + ?Sized>(
        &self,
        battlefield: &Battlefield,
        attacker: &Unit,
        attacker_state: &UnitState,
        targets: &[TargetState<'_>],
        options: EstimateOptions,
        prefs: &TargetPreferences<'_>,
        rng: &mut R,
    ) -> FiringPlan {
        let ceiling = self.heat_ceiling(attacker, attacker_state);
        let candidates: Vec<&TargetState<'_>> = targets
            .iter()
            .filter(|t| !prefs.is_ignored(t.unit.id) && t.unit.is_active())
            .collect();
        if candidates.is_empty() {
            return FiringPlan::empty(ceiling);
        }

        let singles: Vec<FiringPlan> = candidates
            .iter()
            .map(|t| self.plan_against(battlefield, attacker, attacker_state, t, options, prefs))
            .collect();
        let top = singles
            .iter()
            .map(|p| p.utility)
            .fold(f64::NEG_INFINITY, f64::max);
        let tied: Vec<usize> = singles
            .iter()
            .enumerate()
            .filter(|(_, p)| p.utility == top)
            .map(|(i, _)| i)
            .collect();
        let pick = if tied.len() > 1 {
            tied[rng.gen_range(0..tied.len())]
        } else {
            tied[0]
        };
        let primary = candidates[pick].unit.id;
        let mut best = singles[pick].clone();

        if candidates.len() > 1 {
            for twist in Self::twists(attacker) {
                let state = attacker_state.with_twist(*twist);
                let shots =
                    self.split_shots(battlefield, attacker, &state, &candidates, primary, options);
                let mut plan = select(attacker, shots, ceiling).with_twist(*twist);
                self.score(&mut plan, attacker, &state, prefs);
                if plan.utility > best.utility {
                    best = plan;
                }
            }
        }

        tracing::debug!(
            attacker = %attacker.id,
            shots = best.shots.len(),
            targets = best.targets.len(),
            expected_damage = best.expected_damage,
            heat = best.heat_used,
            "firing plan chosen"
        );
        best
    }

    /// Each weapon aimed at the target it expects to damage most
    fn split_shots(
        &self,
        battlefield: &Battlefield,
        attacker: &Unit,
        attacker_state: &UnitState,
        candidates: &[&TargetState<'_>],
        primary: UnitId,
        options: EstimateOptions,
    ) -> Vec<WeaponShot> {
        attacker
            .weapons
            .iter()
            .filter_map(|weapon| {
                candidates
                    .iter()
                    .map(|target| {
                        let ctx = ShotContext {
                            battlefield,
                            attacker,
                            attacker_state,
                            target: target.unit,
                            target_state: &target.state,
                            weapon,
                            secondary_target: false,
                            assume_any_facing: false,
                        };
                        let secondary = target.unit.id != primary;
                        self.estimator.estimate(ctx, options.secondary(secondary))
                    })
                    .fold(None, |best: Option<WeaponShot>, shot| match best {
                        Some(b) if b.expected_damage >= shot.expected_damage => Some(b),
                        _ => Some(shot),
                    })
            })
            .collect()
    }
}

/// Run the arc knapsack for arc-fire platforms, the flat one otherwise
fn select(attacker: &Unit, shots: Vec<WeaponShot>, ceiling: i32) -> FiringPlan {
    match attacker.arc_heat_cap {
        Some(cap) => optimize_arcs(group_by_arc(attacker, shots), cap, ceiling),
        None => optimize(shots, ceiling),
    }
}

/// Shots grouped by the arc of the weapon that fires them
fn group_by_arc(attacker: &Unit, shots: Vec<WeaponShot>) -> Vec<Vec<WeaponShot>> {
    const ARCS: [WeaponArc; 5] = [
        WeaponArc::Forward,
        WeaponArc::LeftArm,
        WeaponArc::RightArm,
        WeaponArc::Rear,
        WeaponArc::Turret,
    ];
    let mut groups: Vec<Vec<WeaponShot>> = vec![Vec::new(); ARCS.len()];
    for shot in shots {
        let arc = attacker
            .weapon(shot.weapon_id)
            .map(|w| w.arc)
            .unwrap_or_default();
        let slot = ARCS.iter().position(|a| *a == arc).unwrap_or(0);
        groups[slot].push(shot);
    }
    groups.retain(|g| !g.is_empty());
    groups
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::board::{Board, Facing, HexCoord};
    use crate::core::config::EstimationConfig;
    use crate::rules::StandardRules;
    use crate::units::Weapon;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    fn planner(config: FiringConfig) -> FiringPlanner {
        let estimator = CombatEstimator::new(
            EstimationConfig::default(),
            Arc::new(StandardRules::new()),
        );
        FiringPlanner::new(config, Arc::new(estimator))
    }

    fn attacker() -> Unit {
        let mut unit = Unit::new(1, "Attacker", 0, 60, 4)
            .at(HexCoord::new(5, 9), Facing::NORTH)
            .with_weapon(Weapon::medium_laser(1))
            .with_weapon(Weapon::medium_laser(2))
            .with_weapon(Weapon::large_laser(3))
            .with_weapon(Weapon::machine_gun(4));
        unit.heat_capacity = 10;
        unit
    }

    #[test]
    fn test_heat_ceiling() {
        let planner = planner(FiringConfig::default());
        let mut unit = attacker();
        unit.heat = 4;
        let state = UnitState::from_unit(&unit);
        assert_eq!(planner.heat_ceiling(&unit, &state), 6);
        unit.heat = 14;
        let state = UnitState::from_unit(&unit);
        assert_eq!(planner.heat_ceiling(&unit, &state), 0);
    }

    #[test]
    fn test_plan_respects_ceiling() {
        let planner = planner(FiringConfig::default());
        let unit = attacker();
        let target = Unit::new(2, "Target", 1, 50, 4).at(HexCoord::new(5, 7), Facing::SOUTH);
        let field = Battlefield::new(Board::new(12, 12))
            .with_unit(unit.clone())
            .with_unit(target.clone());
        let state = UnitState::from_unit(&unit);
        let plan = planner.plan_against(
            &field,
            &unit,
            &state,
            &TargetState::current(&target),
            EstimateOptions::guess(),
            &TargetPreferences::default(),
        );
        assert!(plan.heat_used <= plan.heat_ceiling);
        assert!(plan.expected_damage > 0.0);
        // Machine gun costs no heat but reaches 2 hexes, so it is always in
        assert!(plan.shots.iter().any(|s| s.weapon_id.0 == 4));
    }

    #[test]
    fn test_ignored_target_gets_nothing() {
        let planner = planner(FiringConfig::default());
        let unit = attacker();
        let target = Unit::new(2, "Target", 1, 50, 4).at(HexCoord::new(5, 7), Facing::SOUTH);
        let field = Battlefield::new(Board::new(12, 12))
            .with_unit(unit.clone())
            .with_unit(target.clone());
        let state = UnitState::from_unit(&unit);
        let ignored = [UnitId(2)];
        let prefs = TargetPreferences {
            priority: &[],
            ignored: &ignored,
        };
        let plan = planner.plan_against(
            &field,
            &unit,
            &state,
            &TargetState::current(&target),
            EstimateOptions::guess(),
            &prefs,
        );
        assert!(plan.is_empty());
    }

    #[test]
    fn test_arc_platform_fires_within_arc_budget() {
        let planner = planner(FiringConfig::default());
        let mut unit = attacker();
        let target = Unit::new(2, "Target", 1, 50, 4).at(HexCoord::new(5, 7), Facing::SOUTH);
        let field = Battlefield::new(Board::new(12, 12))
            .with_unit(unit.clone())
            .with_unit(target.clone());
        let state = UnitState::from_unit(&unit);
        let flat = planner.plan_against(
            &field,
            &unit,
            &state,
            &TargetState::current(&target),
            EstimateOptions::exact(),
            &TargetPreferences::default(),
        );

        unit.arc_heat_cap = Some(3);
        let by_arc = planner.plan_against(
            &field,
            &unit,
            &state,
            &TargetState::current(&target),
            EstimateOptions::exact(),
            &TargetPreferences::default(),
        );
        assert!(flat.heat_used > 3);
        assert_eq!(by_arc.heat_used, 3);
        assert!(by_arc.expected_damage < flat.expected_damage);
    }

    #[test]
    fn test_twist_finds_target_outside_forward_arc() {
        let planner = planner(FiringConfig::default());
        let mut unit = attacker();
        unit.can_twist = true;
        // Target sits south-east: relative direction 2 from north
        let target = Unit::new(2, "Target", 1, 50, 4).at(HexCoord::new(7, 10), Facing::NORTH);
        let field = Battlefield::new(Board::new(12, 14))
            .with_unit(unit.clone())
            .with_unit(target.clone());
        let state = UnitState::from_unit(&unit);
        let plan = planner.plan_against(
            &field,
            &unit,
            &state,
            &TargetState::current(&target),
            EstimateOptions::guess(),
            &TargetPreferences::default(),
        );
        assert_eq!(plan.twist, Twist::Right);
        assert!(plan.expected_damage > 0.0);
    }

    #[test]
    fn test_priority_bonus_applied() {
        let config = FiringConfig::default();
        let bonus = config.priority_target_bonus;
        let planner = planner(config);
        let unit = attacker();
        let target = Unit::new(2, "Target", 1, 50, 4).at(HexCoord::new(5, 7), Facing::SOUTH);
        let field = Battlefield::new(Board::new(12, 12))
            .with_unit(unit.clone())
            .with_unit(target.clone());
        let state = UnitState::from_unit(&unit);
        let target_state = TargetState::current(&target);
        let plain = planner.plan_against(
            &field,
            &unit,
            &state,
            &target_state,
            EstimateOptions::guess(),
            &TargetPreferences::default(),
        );
        let priority = [UnitId(2)];
        let prefs = TargetPreferences {
            priority: &priority,
            ignored: &[],
        };
        let favored = planner.plan_against(
            &field,
            &unit,
            &state,
            &target_state,
            EstimateOptions::guess(),
            &prefs,
        );
        assert!((favored.utility - plain.utility - bonus).abs() < 1e-9);
    }

    #[test]
    fn test_best_plan_is_deterministic_for_seed() {
        let planner = planner(FiringConfig::default());
        let unit = attacker();
        // Two identical targets at the same range
        let a = Unit::new(2, "A", 1, 50, 4).at(HexCoord::new(4, 7), Facing::SOUTH);
        let b = Unit::new(3, "B", 1, 50, 4).at(HexCoord::new(6, 7), Facing::SOUTH);
        let field = Battlefield::new(Board::new(12, 12))
            .with_unit(unit.clone())
            .with_unit(a.clone())
            .with_unit(b.clone());
        let state = UnitState::from_unit(&unit);
        let targets = [TargetState::current(&a), TargetState::current(&b)];

        let mut first = ChaCha8Rng::seed_from_u64(7);
        let mut second = ChaCha8Rng::seed_from_u64(7);
        let one = planner.best_plan(
            &field,
            &unit,
            &state,
            &targets,
            EstimateOptions::guess(),
            &TargetPreferences::default(),
            &mut first,
        );
        let two = planner.best_plan(
            &field,
            &unit,
            &state,
            &targets,
            EstimateOptions::guess(),
            &TargetPreferences::default(),
            &mut second,
        );
        assert_eq!(one, two);
        assert!(one.heat_used <= one.heat_ceiling);
    }
}
