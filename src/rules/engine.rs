//! The rules seam
//!
//! Everything the decision engine needs to know about movement costs,
//! piloting rolls and attack resolution goes through [`RulesEngine`].
//! `StandardRules` is the built-in implementation.

use serde::Serialize;

use crate::board::{Board, HexCoord, LineOfSight, Terrain};
use crate::rules::dice;
use crate::rules::to_hit::{base_to_hit, ShotContext, ToHitData};
use crate::units::{Battlefield, Domain, MovementType, Unit, UnitState};

/// Elevation change a unit can climb or drop in one step
const MAX_ELEVATION_CHANGE: u32 = 2;
const MAX_BACKWARD_ELEVATION_CHANGE: u32 = 1;
const GET_UP_COST: u32 = 2;

/// A piloting skill roll a move forces
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct PilotingRoll {
    pub reason: &'static str,
    pub modifier: i32,
}

impl PilotingRoll {
    pub fn new(reason: &'static str, modifier: i32) -> Self {
        Self { reason, modifier }
    }
}

pub trait RulesEngine: Send + Sync {
    /// MP to turn one hex side
    fn turn_cost(&self, unit: &Unit, state: &UnitState) -> u32;

    /// MP to enter `to` from the current state, or `None` when illegal
    fn enter_cost(
        &self,
        board: &Board,
        unit: &Unit,
        state: &UnitState,
        to: HexCoord,
        backward: bool,
    ) -> Option<u32>;

    /// MP to stand up from prone
    fn get_up_cost(&self, _unit: &Unit) -> u32 {
        GET_UP_COST
    }

    /// Piloting roll forced by arriving in `state`, if any
    fn entry_piloting_roll(&self, board: &Board, unit: &Unit, state: &UnitState)
        -> Option<PilotingRoll>;

    /// Chance of passing a piloting roll with the given modifier
    fn piloting_odds(&self, unit: &Unit, modifier: i32) -> f64 {
        dice::odds(unit.piloting + modifier)
    }

    /// Straight hexes an aerospace unit must fly before it may turn
    fn aero_turn_threshold(&self, velocity: u32) -> u32;

    fn line_of_sight(&self, board: &Board, from: HexCoord, to: HexCoord) -> LineOfSight {
        board.line_of_sight(from, to)
    }

    /// Authoritative to-hit computation, including line of sight
    fn to_hit(&self, ctx: &ShotContext<'_>) -> ToHitData;
}

/// Built-in rules
#[derive(Debug, Clone, Copy, Default)]
pub struct StandardRules;

impl StandardRules {
    pub fn new() -> Self {
        Self
    }

    /// Friendly unit other than the attacker with a clear view of the target
    fn has_spotter(&self, battlefield: &Battlefield, attacker: &Unit, target: HexCoord) -> bool {
        battlefield.friends_of(attacker).any(|friend| {
            !self
                .line_of_sight(&battlefield.board, friend.position, target)
                .blocked
        })
    }
}

impl RulesEngine for StandardRules {
    fn turn_cost(&self, unit: &Unit, state: &UnitState) -> u32 {
        if state.posture.jumping || unit.domain == Domain::Infantry {
            0
        } else {
            1
        }
    }

    fn enter_cost(
        &self,
        board: &Board,
        unit: &Unit,
        state: &UnitState,
        to: HexCoord,
        backward: bool,
    ) -> Option<u32> {
        if !board.in_bounds(to) {
            return None;
        }
        if state.posture.jumping {
            return Some(1);
        }

        let terrain = board.terrain(to);
        let climb = (board.elevation(to) as i32 - board.elevation(state.position) as i32)
            .unsigned_abs();
        let limit = if backward {
            MAX_BACKWARD_ELEVATION_CHANGE
        } else {
            MAX_ELEVATION_CHANGE
        };
        if climb > limit {
            return None;
        }

        let terrain_cost = match unit.domain {
            Domain::Infantry => match terrain {
                Terrain::Water { depth } if depth > 0 => return None,
                Terrain::HeavyWoods => 2,
                _ => 1,
            },
            _ => terrain.movement_cost(),
        };
        Some(terrain_cost + climb)
    }

    fn entry_piloting_roll(
        &self,
        board: &Board,
        unit: &Unit,
        state: &UnitState,
    ) -> Option<PilotingRoll> {
        if unit.domain != Domain::Ground || state.posture.jumping {
            return None;
        }
        let terrain = board.terrain(state.position);
        if let Some(modifier) = terrain.entry_piloting_modifier() {
            return Some(PilotingRoll::new("entering water", modifier));
        }
        if terrain == Terrain::Rubble && state.movement == MovementType::Run {
            return Some(PilotingRoll::new("running through rubble", 0));
        }
        None
    }

    fn aero_turn_threshold(&self, velocity: u32) -> u32 {
        match velocity {
            0..=2 => 0,
            3..=5 => 1,
            6..=7 => 2,
            8..=9 => 3,
            _ => 4,
        }
    }

    fn to_hit(&self, ctx: &ShotContext<'_>) -> ToHitData {
        let mut data = base_to_hit(ctx);
        if data.is_impossible() {
            return data;
        }

        let board = &ctx.battlefield.board;
        let los = self.line_of_sight(board, ctx.attacker_state.position, ctx.target_position());
        if los.blocked {
            if ctx.weapon.indirect
                && self.has_spotter(ctx.battlefield, ctx.attacker, ctx.target_position())
            {
                data.add("indirect fire", 1);
            } else {
                data.fail("no line of sight");
            }
        } else {
            data.add("intervening woods", los.woods_modifier);
        }
        data
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::board::Facing;
    use crate::units::Weapon;

    fn mech() -> Unit {
        Unit::new(1, "Mech", 0, 50, 4).at(HexCoord::new(2, 2), Facing::NORTH)
    }

    #[test]
    fn test_enter_cost_terrain_and_climb() {
        let rules = StandardRules::new();
        let mut board = Board::new(6, 6);
        let unit = mech();
        let state = UnitState::from_unit(&unit);
        let north = HexCoord::new(2, 1);

        assert_eq!(rules.enter_cost(&board, &unit, &state, north, false), Some(1));
        board.set_terrain(north, Terrain::HeavyWoods);
        board.set_elevation(north, 2);
        assert_eq!(rules.enter_cost(&board, &unit, &state, north, false), Some(5));
        assert_eq!(rules.enter_cost(&board, &unit, &state, north, true), None);
        board.set_elevation(north, 3);
        assert_eq!(rules.enter_cost(&board, &unit, &state, north, false), None);
    }

    #[test]
    fn test_off_board_is_illegal() {
        let rules = StandardRules::new();
        let board = Board::new(6, 6);
        let unit = mech();
        let state = UnitState::from_unit(&unit);
        assert_eq!(
            rules.enter_cost(&board, &unit, &state, HexCoord::new(2, -1), false),
            None
        );
    }

    #[test]
    fn test_jumping_ignores_terrain() {
        let rules = StandardRules::new();
        let mut board = Board::new(6, 6);
        let unit = mech();
        let mut state = UnitState::from_unit(&unit);
        state.posture.jumping = true;
        let north = HexCoord::new(2, 1);
        board.set_terrain(north, Terrain::HeavyWoods);
        board.set_elevation(north, 4);
        assert_eq!(rules.enter_cost(&board, &unit, &state, north, false), Some(1));
        assert_eq!(rules.turn_cost(&unit, &state), 0);
    }

    #[test]
    fn test_water_forces_piloting_roll() {
        let rules = StandardRules::new();
        let mut board = Board::new(6, 6);
        let unit = mech();
        let mut state = UnitState::from_unit(&unit);
        state.position = HexCoord::new(2, 1);
        assert_eq!(rules.entry_piloting_roll(&board, &unit, &state), None);
        board.set_terrain(state.position, Terrain::Water { depth: 2 });
        let roll = rules.entry_piloting_roll(&board, &unit, &state).unwrap();
        assert_eq!(roll.modifier, 0);
    }

    #[test]
    fn test_blocked_los_without_spotter() {
        let rules = StandardRules::new();
        let attacker = mech().with_weapon(Weapon::lrm(1, 10));
        let target = Unit::new(2, "Target", 1, 50, 4).at(HexCoord::new(2, 10), Facing::SOUTH);
        let mut field = Battlefield::new(Board::new(6, 14))
            .with_unit(attacker.clone())
            .with_unit(target.clone());
        field.board.set_terrain(HexCoord::new(2, 6), Terrain::Building);

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
            assume_any_facing: true,
        };
        assert_eq!(rules.to_hit(&ctx).impossible, Some("no line of sight"));

        // A friendly spotter with a clear view enables indirect fire
        let spotter = Unit::new(3, "Spotter", 0, 20, 6).at(HexCoord::new(3, 9), Facing::SOUTH);
        field.add_unit(spotter);
        let ctx = ShotContext {
            battlefield: &field,
            attacker: &attacker,
            attacker_state: &a_state,
            target: &target,
            target_state: &t_state,
            weapon: &attacker.weapons[0],
            secondary_target: false,
            assume_any_facing: true,
        };
        let data = rules.to_hit(&ctx);
        assert!(!data.is_impossible());
        assert!(data.modifiers.iter().any(|m| m.description == "indirect fire"));
    }

    #[test]
    fn test_aero_turn_thresholds() {
        let rules = StandardRules::new();
        assert_eq!(rules.aero_turn_threshold(2), 0);
        assert_eq!(rules.aero_turn_threshold(4), 1);
        assert_eq!(rules.aero_turn_threshold(7), 2);
        assert_eq!(rules.aero_turn_threshold(9), 3);
        assert_eq!(rules.aero_turn_threshold(12), 4);
    }
}
