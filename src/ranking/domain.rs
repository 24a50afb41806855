//! Per-domain scoring strategies
//!
//! Ground units use the standard utility terms. Infantry and aerospace units
//! drop some of them and add their own; each strategy is a trait object the
//! ranker looks up by the unit's domain, so callers can swap one out.

use crate::core::config::RankingConfig;
use crate::movement::MovePath;
use crate::units::{Battlefield, Domain, Unit};

/// What a strategy may look at when scoring one candidate
pub struct DomainContext<'a> {
    pub battlefield: &'a Battlefield,
    pub unit: &'a Unit,
    pub path: &'a MovePath,
    pub config: &'a RankingConfig,
    pub withdrawing: bool,
}

pub trait DomainScoring: Send + Sync {
    fn name(&self) -> &'static str;

    /// Expected fall damage and fall shame count against the path
    fn applies_fall_terms(&self) -> bool {
        true
    }

    /// Facing away from the nearest threat is penalized
    fn applies_facing_penalty(&self) -> bool {
        true
    }

    /// Multiplier on the summed incoming damage
    fn incoming_multiplier(&self, _ctx: &DomainContext<'_>) -> f64 {
        1.0
    }

    /// Extra utility (positive) or penalty (negative) for this domain
    fn bonus(&self, _ctx: &DomainContext<'_>) -> f64 {
        0.0
    }
}

/// Mechs and vehicles: the standard terms only
#[derive(Debug, Clone, Copy, Default)]
pub struct GroundScoring;

impl DomainScoring for GroundScoring {
    fn name(&self) -> &'static str {
        "ground"
    }
}

/// Infantry hide in cover and suffer in the open
#[derive(Debug, Clone, Copy, Default)]
pub struct InfantryScoring;

impl InfantryScoring {
    fn in_cover(ctx: &DomainContext<'_>) -> bool {
        ctx.battlefield
            .board
            .terrain(ctx.path.end_position())
            .is_infantry_cover()
    }
}

impl DomainScoring for InfantryScoring {
    fn name(&self) -> &'static str {
        "infantry"
    }

    fn applies_fall_terms(&self) -> bool {
        false
    }

    fn applies_facing_penalty(&self) -> bool {
        false
    }

    fn incoming_multiplier(&self, ctx: &DomainContext<'_>) -> f64 {
        if Self::in_cover(ctx) {
            1.0
        } else {
            ctx.config.infantry_open_ground_multiplier
        }
    }

    fn bonus(&self, ctx: &DomainContext<'_>) -> f64 {
        if Self::in_cover(ctx) {
            ctx.config.infantry_cover_bonus
        } else {
            0.0
        }
    }
}

/// Aerospace units stay on the board, keep moving and strafe enemies
#[derive(Debug, Clone, Copy, Default)]
pub struct AerospaceScoring;

impl DomainScoring for AerospaceScoring {
    fn name(&self) -> &'static str {
        "aerospace"
    }

    fn applies_fall_terms(&self) -> bool {
        false
    }

    fn applies_facing_penalty(&self) -> bool {
        false
    }

    fn bonus(&self, ctx: &DomainContext<'_>) -> f64 {
        let config = ctx.config;
        if ctx.path.flew_off() {
            return if ctx.withdrawing {
                0.0
            } else {
                -config.aero_fly_off_penalty
            };
        }

        let mut bonus =
            ctx.path.overflown_enemy_hexes().len() as f64 * config.aero_flyover_bonus;

        let edge = ctx
            .battlefield
            .board
            .distance_to_nearest_edge(ctx.path.end_position());
        if edge < config.aero_border_push_distance {
            bonus -= (config.aero_border_push_distance - edge) as f64 * config.aero_border_penalty;
        }

        if ctx.path.final_state().velocity == 0 {
            bonus -= config.aero_stall_penalty;
        }
        bonus
    }
}

/// The strategy used for each domain
pub struct DomainStrategies {
    ground: Box<dyn DomainScoring>,
    infantry: Box<dyn DomainScoring>,
    aerospace: Box<dyn DomainScoring>,
}

impl Default for DomainStrategies {
    fn default() -> Self {
        Self {
            ground: Box::new(GroundScoring),
            infantry: Box::new(InfantryScoring),
            aerospace: Box::new(AerospaceScoring),
        }
    }
}

impl DomainStrategies {
    pub fn for_domain(&self, domain: Domain) -> &dyn DomainScoring {
        match domain {
            Domain::Ground => self.ground.as_ref(),
            Domain::Infantry => self.infantry.as_ref(),
            Domain::Aerospace => self.aerospace.as_ref(),
        }
    }

    pub fn set(&mut self, domain: Domain, strategy: Box<dyn DomainScoring>) {
        match domain {
            Domain::Ground => self.ground = strategy,
            Domain::Infantry => self.infantry = strategy,
            Domain::Aerospace => self.aerospace = strategy,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::board::{Board, Facing, HexCoord, Terrain};

    fn context<'a>(
        battlefield: &'a Battlefield,
        unit: &'a Unit,
        path: &'a MovePath,
        config: &'a RankingConfig,
    ) -> DomainContext<'a> {
        DomainContext {
            battlefield,
            unit,
            path,
            config,
            withdrawing: false,
        }
    }

    #[test]
    fn test_default_strategies_by_domain() {
        let strategies = DomainStrategies::default();
        assert_eq!(strategies.for_domain(Domain::Ground).name(), "ground");
        assert_eq!(strategies.for_domain(Domain::Infantry).name(), "infantry");
        assert_eq!(strategies.for_domain(Domain::Aerospace).name(), "aerospace");
    }

    #[test]
    fn test_infantry_cover_and_open_ground() {
        let mut board = Board::new(10, 10);
        board.set_terrain(HexCoord::new(3, 3), Terrain::HeavyWoods);
        let field = Battlefield::new(board);
        let config = RankingConfig::default();

        let hidden = Unit::new(1, "Squad", 0, 5, 1)
            .at(HexCoord::new(3, 3), Facing::NORTH)
            .with_domain(Domain::Infantry);
        let path = MovePath::new(&hidden);
        let ctx = context(&field, &hidden, &path, &config);
        assert_eq!(InfantryScoring.incoming_multiplier(&ctx), 1.0);
        assert_eq!(InfantryScoring.bonus(&ctx), config.infantry_cover_bonus);

        let exposed = hidden.clone().at(HexCoord::new(5, 5), Facing::NORTH);
        let path = MovePath::new(&exposed);
        let ctx = context(&field, &exposed, &path, &config);
        assert_eq!(
            InfantryScoring.incoming_multiplier(&ctx),
            config.infantry_open_ground_multiplier
        );
        assert_eq!(InfantryScoring.bonus(&ctx), 0.0);
    }

    #[test]
    fn test_aerospace_border_and_stall_penalties() {
        let field = Battlefield::new(Board::new(20, 20));
        let config = RankingConfig::default();
        let mut fighter = Unit::new(1, "Fighter", 0, 50, 6)
            .at(HexCoord::new(10, 1), Facing::NORTH)
            .with_domain(Domain::Aerospace);
        fighter.velocity = 0;
        let path = MovePath::new(&fighter);
        let ctx = context(&field, &fighter, &path, &config);

        // one hex from the north edge, four inside the push distance
        let expected = -4.0 * config.aero_border_penalty - config.aero_stall_penalty;
        assert!((AerospaceScoring.bonus(&ctx) - expected).abs() < 1e-9);
    }

    #[test]
    fn test_replace_strategy() {
        struct Flat;
        impl DomainScoring for Flat {
            fn name(&self) -> &'static str {
                "flat"
            }
        }

        let mut strategies = DomainStrategies::default();
        strategies.set(Domain::Infantry, Box::new(Flat));
        assert_eq!(strategies.for_domain(Domain::Infantry).name(), "flat");
        assert_eq!(strategies.for_domain(Domain::Ground).name(), "ground");
    }
}
