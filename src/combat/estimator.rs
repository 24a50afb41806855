//! Combat estimation
//!
//! Guess mode rebuilds the to-hit number from the hypothetical states alone
//! and is what path ranking uses for every candidate. Exact mode goes through
//! the rules engine (line of sight, spotters) and is used for the final
//! firing plan.

use std::sync::Arc;

use crate::combat::divergence::DivergenceTracker;
use crate::combat::shot::WeaponShot;
use crate::core::config::EstimationConfig;
use crate::rules::{base_to_hit, dice, RulesEngine, ShotContext, ToHitData};
use crate::units::{Unit, UnitState};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum EstimateMode {
    #[default]
    Guess,
    Exact,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct EstimateOptions {
    pub mode: EstimateMode,
    pub secondary_target: bool,
    pub assume_any_facing: bool,
}

impl EstimateOptions {
    pub fn guess() -> Self {
        Self::default()
    }

    pub fn exact() -> Self {
        Self {
            mode: EstimateMode::Exact,
            ..Self::default()
        }
    }

    pub fn secondary(mut self, secondary_target: bool) -> Self {
        self.secondary_target = secondary_target;
        self
    }

    pub fn any_facing(mut self, assume_any_facing: bool) -> Self {
        self.assume_any_facing = assume_any_facing;
        self
    }
}

pub struct CombatEstimator {
    rules: Arc<dyn RulesEngine>,
    config: EstimationConfig,
    divergence: DivergenceTracker,
}

impl CombatEstimator {
    pub fn new(config: EstimationConfig, rules: Arc<dyn RulesEngine>) -> Self {
        let divergence = DivergenceTracker::new(config.divergence_warn_threshold);
        Self {
            rules,
            config,
            divergence,
        }
    }

    pub fn rules(&self) -> &dyn RulesEngine {
        self.rules.as_ref()
    }

    pub fn divergence(&self) -> &DivergenceTracker {
        &self.divergence
    }

    /// Estimate one weapon's attack
    pub fn estimate(&self, ctx: ShotContext<'_>, options: EstimateOptions) -> WeaponShot {
        let ctx = ShotContext {
            secondary_target: options.secondary_target,
            assume_any_facing: options.assume_any_facing,
            ..ctx
        };
        let to_hit = self.to_hit(&ctx, options.mode);
        if to_hit.is_impossible() {
            return WeaponShot::impossible(ctx.weapon, ctx.target, to_hit);
        }

        let probability = if ctx.weapon.homing {
            self.homing_probability(&ctx, options.mode)
        } else {
            to_hit.probability()
        };
        WeaponShot::build(ctx.weapon, ctx.target, to_hit, probability)
    }

    /// Exact estimate, with the guess computed alongside and the
    /// difference recorded
    pub fn estimate_tracked(&self, ctx: ShotContext<'_>, options: EstimateOptions) -> WeaponShot {
        let guess = self.estimate(
            ctx,
            EstimateOptions {
                mode: EstimateMode::Guess,
                ..options
            },
        );
        let exact = self.estimate(
            ctx,
            EstimateOptions {
                mode: EstimateMode::Exact,
                ..options
            },
        );
        self.divergence.record(
            exact.weapon_id,
            exact.target_id,
            guess.hit_probability,
            exact.hit_probability,
        );
        exact
    }

    pub fn to_hit(&self, ctx: &ShotContext<'_>, mode: EstimateMode) -> ToHitData {
        match mode {
            EstimateMode::Guess => base_to_hit(ctx),
            EstimateMode::Exact => self.rules.to_hit(ctx),
        }
    }

    /// Hit chance of a homing weapon: the homing roll times the best
    /// designator's chance to paint the target
    fn homing_probability(&self, ctx: &ShotContext<'_>, mode: EstimateMode) -> f64 {
        let paint = self.best_designation(ctx, mode);
        if paint <= 0.0 {
            return 0.0;
        }
        dice::odds(self.config.homing_target_number) * paint
    }

    fn best_designation(&self, ctx: &ShotContext<'_>, mode: EstimateMode) -> f64 {
        let battlefield = ctx.battlefield;
        let spotters = std::iter::once(ctx.attacker).chain(battlefield.friends_of(ctx.attacker));

        let mut best: f64 = 0.0;
        for spotter in spotters {
            let spotter_state = if spotter.id == ctx.attacker.id {
                *ctx.attacker_state
            } else {
                UnitState::from_unit(spotter)
            };
            for designator in spotter.weapons.iter().filter(|w| w.designator) {
                let paint_ctx = ShotContext {
                    battlefield,
                    attacker: spotter,
                    attacker_state: &spotter_state,
                    target: ctx.target,
                    target_state: ctx.target_state,
                    weapon: designator,
                    secondary_target: false,
                    assume_any_facing: mode == EstimateMode::Guess,
                };
                best = best.max(self.to_hit(&paint_ctx, mode).probability());
            }
        }
        best
    }

    /// Can any weapon of `attacker` reach `target` at all from these states?
    pub fn in_weapon_range(attacker: &Unit, attacker_state: &UnitState, target_state: &UnitState) -> bool {
        let distance = attacker_state.position.distance(&target_state.position);
        distance > 0 && distance <= attacker.max_weapon_range()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::board::{Board, Facing, HexCoord, Terrain};
    use crate::rules::StandardRules;
    use crate::units::{Battlefield, Weapon};

    fn estimator() -> CombatEstimator {
        CombatEstimator::new(EstimationConfig::default(), Arc::new(StandardRules::new()))
    }

    fn duel(weapon: Weapon) -> (Battlefield, Unit, Unit) {
        let attacker = Unit::new(1, "Attacker", 0, 50, 4)
            .at(HexCoord::new(4, 9), Facing::NORTH)
            .with_weapon(weapon);
        let target = Unit::new(2, "Target", 1, 50, 4).at(HexCoord::new(4, 5), Facing::SOUTH);
        let field = Battlefield::new(Board::new(10, 12))
            .with_unit(attacker.clone())
            .with_unit(target.clone());
        (field, attacker, target)
    }

    fn shot(
        estimator: &CombatEstimator,
        field: &Battlefield,
        attacker: &Unit,
        target: &Unit,
        options: EstimateOptions,
    ) -> WeaponShot {
        let a_state = UnitState::from_unit(attacker);
        let t_state = UnitState::from_unit(target);
        estimator.estimate(
            ShotContext {
                battlefield: field,
                attacker,
                attacker_state: &a_state,
                target,
                target_state: &t_state,
                weapon: &attacker.weapons[0],
                secondary_target: false,
                assume_any_facing: false,
            },
            options,
        )
    }

    #[test]
    fn test_guess_and_exact_agree_in_the_open() {
        let (field, attacker, target) = duel(Weapon::medium_laser(1));
        let estimator = estimator();
        let guess = shot(&estimator, &field, &attacker, &target, EstimateOptions::guess());
        let exact = shot(&estimator, &field, &attacker, &target, EstimateOptions::exact());
        assert_eq!(guess.hit_probability, exact.hit_probability);
        // gunnery 4 + medium range 2
        assert!((guess.hit_probability - 26.0 / 36.0).abs() < 1e-12);
    }

    #[test]
    fn test_exact_sees_blocked_line() {
        let (mut field, attacker, target) = duel(Weapon::medium_laser(1));
        field.board.set_terrain(HexCoord::new(4, 7), Terrain::Building);
        let estimator = estimator();
        let guess = shot(&estimator, &field, &attacker, &target, EstimateOptions::guess());
        let exact = shot(&estimator, &field, &attacker, &target, EstimateOptions::exact());
        assert!(guess.hit_probability > 0.0);
        assert_eq!(exact.hit_probability, 0.0);
        assert_eq!(exact.expected_damage, 0.0);
    }

    #[test]
    fn test_tracked_estimate_records_divergence() {
        let (mut field, attacker, target) = duel(Weapon::medium_laser(1));
        field.board.set_terrain(HexCoord::new(4, 7), Terrain::Building);
        let estimator = estimator();
        let a_state = UnitState::from_unit(&attacker);
        let t_state = UnitState::from_unit(&target);
        let ctx = ShotContext {
            battlefield: &field,
            attacker: &attacker,
            attacker_state: &a_state,
            target: &target,
            target_state: &t_state,
            weapon: &attacker.weapons[0],
            secondary_target: false,
            assume_any_facing: false,
        };
        let exact = estimator.estimate_tracked(ctx, EstimateOptions::exact());
        assert_eq!(exact.hit_probability, 0.0);
        let stats = estimator.divergence().stats();
        assert_eq!(stats.samples, 1);
        assert_eq!(stats.warnings, 1);
    }

    #[test]
    fn test_homing_without_designator_is_zero() {
        let (field, attacker, target) = duel(Weapon::homing_artillery(1));
        let estimator = estimator();
        let result = shot(&estimator, &field, &attacker, &target, EstimateOptions::guess());
        assert_eq!(result.hit_probability, 0.0);
    }

    #[test]
    fn test_homing_with_friendly_designator() {
        let (mut field, attacker, target) = duel(Weapon::homing_artillery(1));
        let spotter = Unit::new(3, "Spotter", 0, 20, 6)
            .at(HexCoord::new(5, 7), Facing::NORTH)
            .with_weapon(Weapon::tag(10));
        field.add_unit(spotter);
        let estimator = estimator();
        let result = shot(&estimator, &field, &attacker, &target, EstimateOptions::guess());
        // Homing roll (4+) times the spotter's short-range paint (4+)
        let expected = (33.0 / 36.0) * (33.0 / 36.0);
        assert!((result.hit_probability - expected).abs() < 1e-12);
    }

    #[test]
    fn test_any_facing_ignores_arc() {
        let (field, mut attacker, target) = duel(Weapon::medium_laser(1));
        attacker.facing = Facing::SOUTH;
        let estimator = estimator();
        let blocked = shot(&estimator, &field, &attacker, &target, EstimateOptions::guess());
        assert_eq!(blocked.hit_probability, 0.0);
        let open = shot(
            &estimator,
            &field,
            &attacker,
            &target,
            EstimateOptions::guess().any_facing(true),
        );
        assert!(open.hit_probability > 0.0);
    }
}
