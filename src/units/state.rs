//! Unit state snapshots
//!
//! A `UnitState` is a value copy of everything the estimator needs about a
//! unit at one moment: either where it is now, or where a path would leave it.

use serde::{Deserialize, Serialize};

use crate::board::{Facing, HexCoord, Twist};
use crate::core::types::UnitId;
use crate::units::unit::Unit;

/// Posture flags; part of the path search key
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, Default)]
pub struct Posture {
    #[serde(default)]
    pub prone: bool,
    #[serde(default)]
    pub immobile: bool,
    #[serde(default)]
    pub jumping: bool,
    #[serde(default)]
    pub airborne: bool,
}

/// How a unit moved this turn
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum MovementType {
    #[default]
    Stationary,
    Walk,
    Run,
    Jump,
    Flight,
}

impl MovementType {
    /// To-hit penalty the attacker takes for having moved this way
    pub fn attacker_modifier(&self) -> i32 {
        match self {
            MovementType::Stationary | MovementType::Flight => 0,
            MovementType::Walk => 1,
            MovementType::Run => 2,
            MovementType::Jump => 3,
        }
    }

    /// Heat generated by this movement
    pub fn heat(&self, hexes_moved: u32) -> i32 {
        match self {
            MovementType::Stationary | MovementType::Flight => 0,
            MovementType::Walk => 1,
            MovementType::Run => 2,
            MovementType::Jump => (hexes_moved as i32).max(3),
        }
    }
}

/// Snapshot of a unit's position and condition
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct UnitState {
    pub unit_id: UnitId,
    pub position: HexCoord,
    pub facing: Facing,
    /// Torso or turret facing; equals `facing` unless twisted
    pub secondary_facing: Facing,
    /// Heat including the heat of this turn's movement
    pub heat: i32,
    pub hexes_moved: u32,
    pub mp_used: u32,
    pub posture: Posture,
    pub movement: MovementType,
    /// Aerospace velocity at the end of the movement
    pub velocity: u32,
}

impl UnitState {
    /// Snapshot the unit as it stands right now
    pub fn from_unit(unit: &Unit) -> Self {
        Self {
            unit_id: unit.id,
            position: unit.position,
            facing: unit.facing,
            secondary_facing: unit.facing,
            heat: unit.heat + unit.movement_this_turn.heat(unit.hexes_moved_this_turn),
            hexes_moved: unit.hexes_moved_this_turn,
            mp_used: 0,
            posture: unit.posture,
            movement: unit.movement_this_turn,
            velocity: unit.velocity,
        }
    }

    /// Same state with a torso twist / turret rotation applied
    pub fn with_twist(mut self, twist: Twist) -> Self {
        self.secondary_facing = twist.apply(self.facing);
        self
    }

    /// Same state rotated to face a different hex side (used when a unit may
    /// still turn before firing)
    pub fn facing_toward(mut self, target: HexCoord) -> Self {
        let facing = self.position.direction_to(&target);
        self.facing = facing;
        self.secondary_facing = facing;
        self
    }
}
