//! Path ranking
//!
//! Scores each candidate end state by what the unit can shoot from there,
//! what can shoot back, the odds of getting there without falling, and
//! where it leaves the unit relative to enemies, friends and the board.
//! Candidates are scored in parallel chunks with the turn deadline checked
//! between chunks.

use std::cmp::Ordering;
use std::sync::Arc;
use std::time::Instant;

use ordered_float::OrderedFloat;
use rayon::prelude::*;

use crate::combat::{CombatEstimator, EstimateOptions};
use crate::core::config::RankingConfig;
use crate::firing::{FiringPlanner, TargetPreferences, TargetState};
use crate::movement::MovePath;
use crate::ranking::behavior::BehaviorProfile;
use crate::ranking::domain::{DomainContext, DomainScoring, DomainStrategies};
use crate::ranking::ranked::{RankedPath, ScoreBreakdown};
use crate::units::{Battlefield, Domain, Unit, UnitState};

/// Everything fixed for one unit's ranking pass
#[derive(Clone, Copy)]
pub struct RankingContext<'a> {
    pub battlefield: &'a Battlefield,
    pub unit: &'a Unit,
    pub behavior: &'a BehaviorProfile,
    pub deadline: Option<Instant>,
}

impl<'a> RankingContext<'a> {
    pub fn new(battlefield: &'a Battlefield, unit: &'a Unit, behavior: &'a BehaviorProfile) -> Self {
        Self {
            battlefield,
            unit,
            behavior,
            deadline: None,
        }
    }

    pub fn with_deadline(mut self, deadline: Instant) -> Self {
        self.deadline = Some(deadline);
        self
    }

    fn expired(&self) -> bool {
        self.deadline.is_some_and(|d| Instant::now() >= d)
    }
}

pub struct PathRanker {
    planner: Arc<FiringPlanner>,
    config: RankingConfig,
    strategies: DomainStrategies,
}

impl PathRanker {
    pub fn new(config: RankingConfig, planner: Arc<FiringPlanner>) -> Self {
        Self {
            planner,
            config,
            strategies: DomainStrategies::default(),
        }
    }

    /// Replace the scoring strategy for one domain
    pub fn with_strategy(mut self, domain: Domain, strategy: Box<dyn DomainScoring>) -> Self {
        self.strategies.set(domain, strategy);
        self
    }

    pub fn config(&self) -> &RankingConfig {
        &self.config
    }

    pub fn planner(&self) -> &FiringPlanner {
        &self.planner
    }

    fn estimator(&self) -> &CombatEstimator {
        self.planner.estimator()
    }

    /// Should the unit be heading for its home edge?
    pub fn is_withdrawing(&self, unit: &Unit, behavior: &BehaviorProfile) -> bool {
        behavior.auto_flee
            || (behavior.forced_withdrawal
                && unit.is_crippled(self.config.crippled_structure_fraction))
    }

    /// Share of the enemy's attention we can expect: 1 when no friend of
    /// ours is closer to it, falling off as friends are closer than we are
    fn targeting_likelihood(my_distance: u32, friends: &[&Unit], enemy: &Unit) -> f64 {
        let nearest_friend = friends
            .iter()
            .map(|f| f.position.distance(&enemy.position))
            .min();
        match nearest_friend {
            Some(friend_distance) if my_distance > friend_distance => {
                friend_distance as f64 / my_distance as f64
            }
            _ => 1.0,
        }
    }

    /// Score one candidate
    pub fn score(&self, ctx: &RankingContext<'_>, path: &MovePath, order: usize) -> RankedPath {
        let unit = ctx.unit;
        let behavior = ctx.behavior;
        let battlefield = ctx.battlefield;
        let strategy = self.strategies.for_domain(unit.domain);
        let withdrawing = self.is_withdrawing(unit, behavior);
        let my_state = path.final_state();
        let end = my_state.position;

        let enemies: Vec<&Unit> = battlefield.enemies_of(unit.owner).collect();
        let friends: Vec<&Unit> = battlefield.friends_of(unit).collect();
        let prefs = behavior.target_preferences();

        let mut breakdown = ScoreBreakdown {
            success_probability: path.success_probability(unit, self.estimator().rules()),
            bravery: behavior.bravery_value(),
            withdrawing,
            ..Default::default()
        };

        if strategy.applies_fall_terms() {
            let fail = 1.0 - breakdown.success_probability;
            breakdown.expected_fall_damage = fail * unit.fall_damage() as f64;
            breakdown.fall_shame = fail * behavior.fall_shame_value();
        }

        let mut incoming = 0.0;
        if !path.flew_off() {
            for enemy in &enemies {
                let enemy_state = UnitState::from_unit(enemy);
                let unmoved = !enemy.moved_this_turn;

                if !prefs.is_ignored(enemy.id)
                    && CombatEstimator::in_weapon_range(unit, &my_state, &enemy_state)
                {
                    let target = TargetState {
                        unit: enemy,
                        state: enemy_state,
                    };
                    let plan = self.planner.plan_against(
                        battlefield,
                        unit,
                        &my_state,
                        &target,
                        EstimateOptions::guess(),
                        &prefs,
                    );
                    let mut damage = plan.expected_damage;
                    if unmoved {
                        damage *= self.config.unmoved_enemy_discount;
                    }
                    if damage > breakdown.my_damage {
                        breakdown.my_damage = damage;
                        breakdown.target = Some(enemy.id);
                    }
                }

                let distance = end.distance(&enemy.position);
                let likelihood = Self::targeting_likelihood(distance, &friends, enemy);
                if likelihood >= self.config.threat_likelihood_baseline
                    && CombatEstimator::in_weapon_range(enemy, &enemy_state, &my_state)
                {
                    let me = TargetState {
                        unit,
                        state: my_state,
                    };
                    let plan = self.planner.plan_against(
                        battlefield,
                        enemy,
                        &enemy_state,
                        &me,
                        EstimateOptions::guess().any_facing(unmoved),
                        &TargetPreferences::default(),
                    );
                    incoming += plan.expected_damage;
                }
            }
        }

        let nearest_enemy = enemies
            .iter()
            .min_by_key(|e| (e.position.distance(&end), e.id));

        breakdown.distance_penalty = if withdrawing {
            if path.flew_off() {
                0.0
            } else {
                behavior.self_preservation_value()
                    * battlefield.board.distance_to_edge(end, behavior.home_edge) as f64
            }
        } else {
            nearest_enemy
                .map(|e| behavior.aggression_value() * e.position.distance(&end) as f64)
                .unwrap_or(0.0)
        };

        breakdown.herd_penalty = friends
            .iter()
            .map(|f| f.position.distance(&end))
            .min()
            .map(|d| behavior.herd_value() * d as f64)
            .unwrap_or(0.0);

        if strategy.applies_facing_penalty() {
            if let Some(enemy) = nearest_enemy {
                if enemy.position != end {
                    let steps = my_state.facing.steps_to(end.direction_to(&enemy.position));
                    breakdown.facing_penalty =
                        self.config.facing_penalty_per_step * steps.saturating_sub(1) as f64;
                }
            }
        }

        if self.config.desired_cover > 0 && !enemies.is_empty() {
            let covering = friends
                .iter()
                .filter(|f| f.position.distance(&end) <= self.config.cover_radius)
                .count() as f64;
            let uncovered = (1.0 - covering / self.config.desired_cover as f64).max(0.0);
            breakdown.exposure_penalty = behavior.self_preservation_value() * uncovered;
        }

        let domain_ctx = DomainContext {
            battlefield,
            unit,
            path,
            config: &self.config,
            withdrawing,
        };
        breakdown.incoming_damage = incoming * strategy.incoming_multiplier(&domain_ctx);
        breakdown.domain_bonus = strategy.bonus(&domain_ctx);

        let reaches_waypoint = behavior.waypoint_for(unit.id) == Some(end);
        RankedPath::new(path.clone(), breakdown, reaches_waypoint, order)
    }

    /// True when `a` should be preferred over `b`
    fn better(a: &RankedPath, b: &RankedPath) -> bool {
        Self::compare(a, b) == Ordering::Greater
    }

    /// Ordering of scored paths, greater is better
    ///
    /// Utility first, then fewer hexes moved, then reaching the waypoint,
    /// then more expected damage, then earlier enumeration order.
    pub fn compare(a: &RankedPath, b: &RankedPath) -> Ordering {
        OrderedFloat(a.utility)
            .cmp(&OrderedFloat(b.utility))
            .then_with(|| b.path.hexes_moved().cmp(&a.path.hexes_moved()))
            .then_with(|| a.reaches_waypoint.cmp(&b.reaches_waypoint))
            .then_with(|| OrderedFloat(a.expected_damage).cmp(&OrderedFloat(b.expected_damage)))
            .then_with(|| b.order.cmp(&a.order))
    }

    fn score_chunk(&self, ctx: &RankingContext<'_>, chunk: &[MovePath], offset: usize) -> Vec<RankedPath> {
        if chunk.len() >= self.config.parallel_threshold {
            chunk
                .par_iter()
                .enumerate()
                .map(|(i, path)| self.score(ctx, path, offset + i))
                .collect()
        } else {
            chunk
                .iter()
                .enumerate()
                .map(|(i, path)| self.score(ctx, path, offset + i))
                .collect()
        }
    }

    /// Best candidate, or `None` when there are no candidates
    ///
    /// The first chunk is always scored; later chunks are skipped once the
    /// deadline has passed and the best so far is returned.
    pub fn rank(&self, ctx: &RankingContext<'_>, candidates: &[MovePath]) -> Option<RankedPath> {
        let chunk_size = self.config.parallel_threshold.max(1);
        let mut best: Option<RankedPath> = None;
        let mut scored = 0;

        for (index, chunk) in candidates.chunks(chunk_size).enumerate() {
            if index > 0 && ctx.expired() {
                tracing::warn!(
                    unit = %ctx.unit.id,
                    scored,
                    candidates = candidates.len(),
                    "ranking deadline reached, using best so far"
                );
                break;
            }
            for ranked in self.score_chunk(ctx, chunk, index * chunk_size) {
                if best.as_ref().map_or(true, |b| Self::better(&ranked, b)) {
                    best = Some(ranked);
                }
            }
            scored += chunk.len();
        }

        if let Some(best) = &best {
            tracing::debug!(
                unit = %ctx.unit.id,
                scored,
                utility = best.utility,
                path = %best.path,
                "best path ranked"
            );
        }
        best
    }

    /// Every candidate scored, best first
    pub fn rank_all(&self, ctx: &RankingContext<'_>, candidates: &[MovePath]) -> Vec<RankedPath> {
        let chunk_size = self.config.parallel_threshold.max(1);
        let mut ranked: Vec<RankedPath> = candidates
            .chunks(chunk_size)
            .enumerate()
            .flat_map(|(index, chunk)| self.score_chunk(ctx, chunk, index * chunk_size))
            .collect();
        ranked.sort_by(|a, b| Self::compare(b, a));
        ranked
    }
}
