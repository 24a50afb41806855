//! Movement paths
//!
//! A `MovePath` is an ordered list of steps from a unit's starting state.
//! Every extension validates the new step against the rules and returns a
//! fresh path, so a path that exists is always legal step by step. The
//! projected end state is cached and kept current on every extension.

use std::fmt;

use serde::Serialize;

use crate::board::{Facing, HexCoord};
use crate::movement::step::{Maneuver, MoveStep, StepType};
use crate::rules::{PilotingRoll, RulesEngine};
use crate::units::{Battlefield, Domain, MovementType, Posture, Unit, UnitState};

/// What the enumerator needs to validate a step
#[derive(Clone, Copy)]
pub struct StepContext<'a> {
    pub unit: &'a Unit,
    pub battlefield: &'a Battlefield,
    pub rules: &'a dyn RulesEngine,
}

/// Identity of a search state; two paths with equal keys are interchangeable
/// except for their cost
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SearchKey {
    position: HexCoord,
    facing: Facing,
    posture: Posture,
    airborne: Option<AirborneKey>,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
struct AirborneKey {
    velocity: u32,
    hexes_moved: u32,
    straight_run: u32,
    overflown: Vec<HexCoord>,
    flew_off: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct MovePath {
    start: UnitState,
    steps: Vec<MoveStep>,
    /// Projected state after the last step
    state: UnitState,
    piloting_rolls: Vec<PilotingRoll>,
    /// Enemy-occupied hexes flown over, sorted
    overflown: Vec<HexCoord>,
    /// Hexes flown since the last turn or side-slip
    straight_run: u32,
    flew_off: bool,
}

impl MovePath {
    /// The empty path: the unit stays where it is
    pub fn new(unit: &Unit) -> Self {
        let mut start = UnitState::from_unit(unit);
        start.heat = unit.heat;
        start.hexes_moved = 0;
        start.mp_used = 0;
        start.movement = if start.posture.airborne {
            MovementType::Flight
        } else {
            MovementType::Stationary
        };
        Self {
            start,
            steps: Vec::new(),
            state: start,
            piloting_rolls: Vec::new(),
            overflown: Vec::new(),
            straight_run: 0,
            flew_off: false,
        }
    }

    /// This path plus one more step, or `None` if the step is illegal
    pub fn extended(&self, step_type: StepType, ctx: &StepContext<'_>) -> Option<MovePath> {
        if self.flew_off || self.state.posture.immobile {
            return None;
        }
        let mut next = self.clone();
        if self.state.posture.airborne {
            next.apply_airborne(step_type, ctx)?;
        } else {
            next.apply_ground(step_type, ctx)?;
        }
        next.state.heat = next.start.heat + next.state.movement.heat(next.state.hexes_moved);
        next.state.secondary_facing = next.state.facing;
        next.steps.push(MoveStep {
            step_type,
            position: next.state.position,
            facing: next.state.facing,
            mp_used: next.state.mp_used,
        });
        Some(next)
    }

    fn apply_ground(&mut self, step_type: StepType, ctx: &StepContext<'_>) -> Option<()> {
        let unit = ctx.unit;
        let rules = ctx.rules;
        let board = &ctx.battlefield.board;

        match step_type {
            StepType::StartJump => {
                if !self.steps.is_empty()
                    || unit.jump_mp == 0
                    || unit.domain != Domain::Ground
                    || self.state.posture.prone
                {
                    return None;
                }
                self.state.posture.jumping = true;
            }
            StepType::GetUp => {
                if !self.state.posture.prone {
                    return None;
                }
                self.state.mp_used += rules.get_up_cost(unit);
                self.state.posture.prone = false;
                self.piloting_rolls.push(PilotingRoll::new("getting up", 0));
            }
            StepType::TurnLeft | StepType::TurnRight => {
                if self.state.posture.prone {
                    return None;
                }
                self.state.mp_used += rules.turn_cost(unit, &self.state);
                self.state.facing = if step_type == StepType::TurnLeft {
                    self.state.facing.turned_left()
                } else {
                    self.state.facing.turned_right()
                };
            }
            StepType::Forward | StepType::Backward => {
                let backward = step_type == StepType::Backward;
                if self.state.posture.prone || (backward && self.state.posture.jumping) {
                    return None;
                }
                let direction = if backward {
                    self.state.facing.opposite()
                } else {
                    self.state.facing
                };
                let to = self.state.position.translated(direction);
                let cost = rules.enter_cost(board, unit, &self.state, to, backward)?;
                if ctx.battlefield.has_enemy_at(to, unit.owner) {
                    return None;
                }
                self.state.mp_used += cost;
                // no backing up at running speed
                if backward && self.state.mp_used > unit.walk_mp {
                    return None;
                }
                self.state.position = to;
                self.state.hexes_moved += 1;
            }
            _ => return None,
        }

        let budget = if self.state.posture.jumping {
            unit.jump_mp
        } else if unit.domain == Domain::Infantry {
            unit.walk_mp
        } else {
            unit.run_mp()
        };
        if self.state.mp_used > budget {
            return None;
        }

        self.state.movement = if self.state.posture.jumping {
            MovementType::Jump
        } else if self.state.mp_used == 0 && self.state.hexes_moved == 0 {
            MovementType::Stationary
        } else if self.state.mp_used <= unit.walk_mp {
            MovementType::Walk
        } else {
            MovementType::Run
        };

        if step_type.changes_hex() {
            if let Some(roll) = rules.entry_piloting_roll(board, unit, &self.state) {
                self.piloting_rolls.push(roll);
            }
        }
        Some(())
    }

    fn apply_airborne(&mut self, step_type: StepType, ctx: &StepContext<'_>) -> Option<()> {
        let unit = ctx.unit;
        let board = &ctx.battlefield.board;
        let state = &mut self.state;

        match step_type {
            StepType::Accelerate => {
                if state.hexes_moved > 0 || state.velocity >= unit.max_velocity {
                    return None;
                }
                state.velocity += 1;
                state.mp_used += 1;
            }
            StepType::Decelerate => {
                if state.hexes_moved > 0 || state.velocity == 0 {
                    return None;
                }
                state.velocity -= 1;
                state.mp_used += 1;
            }
            StepType::Forward => {
                if state.hexes_moved >= state.velocity {
                    return None;
                }
                let to = state.position.translated(state.facing);
                if !board.in_bounds(to) {
                    return None;
                }
                state.position = to;
                state.hexes_moved += 1;
                self.straight_run += 1;
            }
            StepType::TurnLeft | StepType::TurnRight => {
                if self.straight_run < ctx.rules.aero_turn_threshold(state.velocity) {
                    return None;
                }
                state.mp_used += 1;
                state.facing = if step_type == StepType::TurnLeft {
                    state.facing.turned_left()
                } else {
                    state.facing.turned_right()
                };
                self.straight_run = 0;
            }
            StepType::Maneuver(maneuver) => {
                if state.hexes_moved >= state.velocity {
                    return None;
                }
                let side = match maneuver {
                    Maneuver::SideSlipLeft => state.facing.turned_left(),
                    Maneuver::SideSlipRight => state.facing.turned_right(),
                };
                let to = state.position.translated(side);
                if !board.in_bounds(to) {
                    return None;
                }
                state.position = to;
                state.hexes_moved += 1;
                state.mp_used += 1;
                self.straight_run = 0;
            }
            StepType::FlyOff => {
                if board.in_bounds(state.position.translated(state.facing)) {
                    return None;
                }
                self.flew_off = true;
            }
            StepType::Backward | StepType::GetUp | StepType::StartJump => return None,
        }

        if state.mp_used > unit.walk_mp {
            return None;
        }
        state.movement = MovementType::Flight;

        let position = state.position;
        if step_type.changes_hex() && ctx.battlefield.has_enemy_at(position, unit.owner) {
            if let Err(i) = self.overflown.binary_search(&position) {
                self.overflown.insert(i, position);
            }
        }
        Some(())
    }

    /// Key used to prune equivalent search states
    pub fn key(&self) -> SearchKey {
        let airborne = self.state.posture.airborne.then(|| AirborneKey {
            velocity: self.state.velocity,
            hexes_moved: self.state.hexes_moved,
            straight_run: self.straight_run,
            overflown: self.overflown.clone(),
            flew_off: self.flew_off,
        });
        SearchKey {
            position: self.state.position,
            facing: self.state.facing,
            posture: self.state.posture,
            airborne,
        }
    }

    /// Can the unit legally stop at the end of this path?
    pub fn is_legal_end(&self, ctx: &StepContext<'_>) -> bool {
        if self.flew_off {
            return true;
        }
        if self.state.posture.airborne {
            return self.state.hexes_moved == self.state.velocity;
        }
        if self.state.posture.jumping && self.state.hexes_moved == 0 {
            return false;
        }
        !ctx
            .battlefield
            .has_friend_at(self.state.position, ctx.unit.owner, ctx.unit.id)
    }

    /// Chance of completing the path without failing a piloting roll
    pub fn success_probability(&self, unit: &Unit, rules: &dyn RulesEngine) -> f64 {
        self.piloting_rolls
            .iter()
            .map(|roll| rules.piloting_odds(unit, roll.modifier))
            .product()
    }

    pub fn start(&self) -> &UnitState {
        &self.start
    }

    pub fn steps(&self) -> &[MoveStep] {
        &self.steps
    }

    /// Projected state of the unit after the path
    pub fn final_state(&self) -> UnitState {
        self.state
    }

    pub fn end_position(&self) -> HexCoord {
        self.state.position
    }

    pub fn end_facing(&self) -> Facing {
        self.state.facing
    }

    pub fn mp_used(&self) -> u32 {
        self.state.mp_used
    }

    pub fn hexes_moved(&self) -> u32 {
        self.state.hexes_moved
    }

    pub fn movement_type(&self) -> MovementType {
        self.state.movement
    }

    pub fn piloting_rolls(&self) -> &[PilotingRoll] {
        &self.piloting_rolls
    }

    pub fn overflown_enemy_hexes(&self) -> &[HexCoord] {
        &self.overflown
    }

    pub fn flew_off(&self) -> bool {
        self.flew_off
    }

    pub fn is_stay_put(&self) -> bool {
        self.steps.is_empty()
    }

    /// Every hex the path passes through, starting hex included
    pub fn hexes(&self) -> impl Iterator<Item = HexCoord> + '_ {
        std::iter::once(self.start.position).chain(self.steps.iter().map(|s| s.position))
    }

    /// Compact step listing, e.g. "F F L F"
    pub fn describe(&self) -> String {
        if self.steps.is_empty() {
            return "stay".to_string();
        }
        self.steps
            .iter()
            .map(|s| s.step_type.short_name())
            .collect::<Vec<_>>()
            .join(" ")
    }
}

impl fmt::Display for MovePath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "[{}] to {} facing {} ({} MP, {:?})",
            self.describe(),
            self.state.position,
            self.state.facing.index(),
            self.state.mp_used,
            self.state.movement
        )
    }
}
