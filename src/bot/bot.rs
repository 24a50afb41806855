//! The bot: picks a path and a firing plan for each unit it controls

use std::sync::Arc;
use std::time::Instant;

use ahash::AHashMap;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

use crate::bot::turn::{TurnTracker, UnitPhase};
use crate::combat::{CombatEstimator, EstimateOptions};
use crate::core::config::BotConfig;
use crate::core::error::{Result, TacticsError};
use crate::core::types::UnitId;
use crate::firing::{FiringPlan, FiringPlanner, TargetState};
use crate::movement::{MovePath, PathEnumerator};
use crate::precognition::PrecognitionHandle;
use crate::ranking::{BehaviorProfile, PathRanker, RankedPath, RankingContext};
use crate::rules::{RulesEngine, ShotContext, StandardRules};
use crate::units::{Battlefield, Unit, UnitState};

pub struct TacticalBot {
    config: BotConfig,
    behavior: BehaviorProfile,
    enumerator: Arc<PathEnumerator>,
    planner: Arc<FiringPlanner>,
    ranker: PathRanker,
    turns: TurnTracker,
    /// Candidates taken from precognition for units in Cached
    prefetched: AHashMap<UnitId, Arc<Vec<MovePath>>>,
    rng: ChaCha8Rng,
}

impl TacticalBot {
    /// Bot playing by the built-in rules
    pub fn new(config: BotConfig, behavior: BehaviorProfile) -> Result<Self> {
        Self::with_rules(config, behavior, Arc::new(StandardRules::new()))
    }

    pub fn with_rules(
        config: BotConfig,
        behavior: BehaviorProfile,
        rules: Arc<dyn RulesEngine>,
    ) -> Result<Self> {
        config.validate()?;
        behavior.validate()?;

        let enumerator = Arc::new(PathEnumerator::new(
            config.enumeration.clone(),
            Arc::clone(&rules),
        ));
        let estimator = Arc::new(CombatEstimator::new(config.estimation.clone(), rules));
        let planner = Arc::new(FiringPlanner::new(config.firing.clone(), estimator));
        let ranker = PathRanker::new(config.ranking.clone(), Arc::clone(&planner));
        let rng = ChaCha8Rng::seed_from_u64(config.seed);

        tracing::info!(behavior = %behavior.name, seed = config.seed, "tactical bot ready");
        Ok(Self {
            config,
            behavior,
            enumerator,
            planner,
            ranker,
            turns: TurnTracker::new(),
            prefetched: AHashMap::new(),
            rng,
        })
    }

    pub fn config(&self) -> &BotConfig {
        &self.config
    }

    pub fn behavior(&self) -> &BehaviorProfile {
        &self.behavior
    }

    pub fn set_behavior(&mut self, behavior: BehaviorProfile) -> Result<()> {
        behavior.validate()?;
        self.behavior = behavior;
        Ok(())
    }

    /// Shared enumerator, for spawning a precognition worker
    pub fn enumerator(&self) -> Arc<PathEnumerator> {
        Arc::clone(&self.enumerator)
    }

    pub fn planner(&self) -> &FiringPlanner {
        &self.planner
    }

    pub fn ranker(&self) -> &PathRanker {
        &self.ranker
    }

    pub fn turns(&self) -> &TurnTracker {
        &self.turns
    }

    fn deciding_unit(battlefield: &Battlefield, id: UnitId) -> Result<&Unit> {
        battlefield
            .unit(id)
            .filter(|u| u.is_active())
            .ok_or(TacticsError::UnitNotFound(id))
    }

    /// Start a new turn when the battlefield's round moved on
    fn sync_round(&mut self, battlefield: &Battlefield) {
        if battlefield.round != self.turns.round() {
            self.turns.new_turn(battlefield.round);
            self.prefetched.clear();
        }
    }

    fn transition(&mut self, id: UnitId, to: UnitPhase) -> Result<()> {
        let from = self.turns.phase(id);
        if self.turns.advance(id, to) {
            Ok(())
        } else {
            Err(TacticsError::PhaseChange { unit: id, from, to })
        }
    }

    /// Move the unit into Enumerating
    fn begin_enumeration(&mut self, battlefield: &Battlefield, id: UnitId) -> Result<()> {
        self.sync_round(battlefield);
        self.prefetched.remove(&id);
        match self.turns.phase(id) {
            UnitPhase::Committed => Err(TacticsError::AlreadyCommitted(id)),
            // an earlier attempt failed while enumerating
            UnitPhase::Enumerating => Ok(()),
            _ => self.transition(id, UnitPhase::Enumerating),
        }
    }

    fn ranking_context<'a>(&'a self, battlefield: &'a Battlefield, unit: &'a Unit) -> RankingContext<'a> {
        RankingContext::new(battlefield, unit, &self.behavior)
            .with_deadline(Instant::now() + self.config.ranking.turn_time_budget())
    }

    /// Rank candidates and commit the winner
    fn commit_best(
        &mut self,
        battlefield: &Battlefield,
        unit: &Unit,
        candidates: &[MovePath],
    ) -> Result<RankedPath> {
        if self.turns.phase(unit.id) == UnitPhase::Enumerating {
            self.transition(unit.id, UnitPhase::Cached)?;
        }
        self.transition(unit.id, UnitPhase::Ranking)?;

        let ctx = self.ranking_context(battlefield, unit);
        let best = self.ranker.rank(&ctx, candidates).unwrap_or_else(|| {
            let stay = MovePath::new(unit);
            self.ranker.score(&ctx, &stay, 0)
        });

        self.transition(unit.id, UnitPhase::Committed)?;
        tracing::info!(
            unit = %unit.id,
            candidates = candidates.len(),
            utility = best.utility,
            path = %best.path,
            "move chosen"
        );
        Ok(best)
    }

    /// Best path for the unit with its score
    pub fn rank_moves(&mut self, battlefield: &Battlefield, id: UnitId) -> Result<RankedPath> {
        let unit = Self::deciding_unit(battlefield, id)?;
        self.begin_enumeration(battlefield, id)?;
        let result = self.enumerator.enumerate(unit, battlefield);
        self.commit_best(battlefield, unit, &result.paths)
    }

    /// Best path for the unit
    pub fn decide_move(&mut self, battlefield: &Battlefield, id: UnitId) -> Result<MovePath> {
        Ok(self.rank_moves(battlefield, id)?.path)
    }

    /// Take the unit's candidates from the precognition worker and hold
    /// them until the unit decides; returns how many there are
    pub async fn prefetch_moves(
        &mut self,
        battlefield: &Battlefield,
        id: UnitId,
        precognition: &PrecognitionHandle,
    ) -> Result<usize> {
        Self::deciding_unit(battlefield, id)?;
        self.begin_enumeration(battlefield, id)?;
        let candidates = precognition.ensure_fresh(id).await?;
        self.transition(id, UnitPhase::Cached)?;
        let count = candidates.len();
        self.prefetched.insert(id, candidates);
        Ok(count)
    }

    /// Send held candidates the worker has since dirtied back to
    /// Enumerating; returns the affected units by id
    pub async fn refresh_stale(&mut self, precognition: &PrecognitionHandle) -> Result<Vec<UnitId>> {
        let mut stale = Vec::new();
        for (id, held) in &self.prefetched {
            if !precognition.is_current(*id, held).await? {
                stale.push(*id);
            }
        }
        stale.sort();
        for id in &stale {
            self.prefetched.remove(id);
            if self.turns.invalidate(*id) {
                tracing::debug!(unit = %id, "held candidates went stale");
            }
        }
        Ok(stale)
    }

    /// Best path, taking the candidates from the precognition worker
    ///
    /// Candidates held by [`Self::prefetch_moves`] are used when still
    /// current; otherwise the unit enumerates again through the worker.
    pub async fn decide_move_with_precognition(
        &mut self,
        battlefield: &Battlefield,
        id: UnitId,
        precognition: &PrecognitionHandle,
    ) -> Result<MovePath> {
        let unit = Self::deciding_unit(battlefield, id)?;
        self.sync_round(battlefield);
        self.refresh_stale(precognition).await?;
        if self.turns.phase(id) != UnitPhase::Cached {
            self.prefetch_moves(battlefield, id, precognition).await?;
        }
        let candidates = self.prefetched.remove(&id).unwrap_or_default();
        Ok(self.commit_best(battlefield, unit, &candidates)?.path)
    }

    /// The `count` best candidates, best first, without committing anything
    pub fn top_moves(&self, battlefield: &Battlefield, id: UnitId, count: usize) -> Result<Vec<RankedPath>> {
        let unit = Self::deciding_unit(battlefield, id)?;
        let result = self.enumerator.enumerate(unit, battlefield);
        let ctx = self.ranking_context(battlefield, unit);
        let mut ranked = self.ranker.rank_all(&ctx, &result.paths);
        ranked.truncate(count);
        Ok(ranked)
    }

    /// Firing plan for a unit that has finished moving
    ///
    /// Uses exact estimation; unknown, friendly or inactive targets are
    /// dropped. Each chosen shot is also estimated in guess mode so the
    /// divergence tracker sees how far the ranking's guesses were off.
    pub fn decide_firing_plan(
        &mut self,
        battlefield: &Battlefield,
        id: UnitId,
        targets: &[UnitId],
    ) -> Result<FiringPlan> {
        let attacker = Self::deciding_unit(battlefield, id)?;
        let state = UnitState::from_unit(attacker);

        let candidates: Vec<TargetState<'_>> = targets
            .iter()
            .filter_map(|target| match battlefield.unit(*target) {
                Some(u) if u.is_active() && u.owner != attacker.owner => Some(TargetState::current(u)),
                _ => {
                    tracing::debug!(attacker = %id, target = %target, "target filtered out");
                    None
                }
            })
            .collect();

        let prefs = self.behavior.target_preferences();
        let plan = self.planner.best_plan(
            battlefield,
            attacker,
            &state,
            &candidates,
            EstimateOptions::exact(),
            &prefs,
            &mut self.rng,
        );

        let fired = state.with_twist(plan.twist);
        for shot in &plan.shots {
            let (Some(weapon), Some(target)) = (attacker.weapon(shot.weapon_id), battlefield.unit(shot.target_id)) else {
                continue;
            };
            let target_state = UnitState::from_unit(target);
            let ctx = ShotContext {
                battlefield,
                attacker,
                attacker_state: &fired,
                target,
                target_state: &target_state,
                weapon,
                secondary_target: false,
                assume_any_facing: false,
            };
            self.planner
                .estimator()
                .estimate_tracked(ctx, EstimateOptions::exact());
        }

        tracing::info!(
            unit = %id,
            shots = plan.shots.len(),
            expected_damage = plan.expected_damage,
            heat = plan.heat_used,
            "firing plan chosen"
        );
        Ok(plan)
    }

    pub fn explain(&self, ranked: &RankedPath) -> String {
        ranked.explain()
    }
}
