//! The battlefield: board plus every unit on it
//!
//! This is the read model handed to the enumerator, estimator and ranker.
//! The engine never mutates it during a decision.

use serde::{Deserialize, Serialize};

use crate::board::{Board, Facing, HexCoord};
use crate::core::types::{PlayerId, Round, UnitId};
use crate::units::unit::Unit;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Battlefield {
    pub board: Board,
    /// Units ordered by id
    units: Vec<Unit>,
    #[serde(default)]
    pub round: Round,
}

impl Battlefield {
    pub fn new(board: Board) -> Self {
        Self {
            board,
            units: Vec::new(),
            round: 1,
        }
    }

    /// Add or replace a unit, keeping id order
    pub fn add_unit(&mut self, unit: Unit) {
        match self.units.binary_search_by_key(&unit.id, |u| u.id) {
            Ok(i) => self.units[i] = unit,
            Err(i) => self.units.insert(i, unit),
        }
    }

    pub fn with_unit(mut self, unit: Unit) -> Self {
        self.add_unit(unit);
        self
    }

    pub fn remove_unit(&mut self, id: UnitId) -> Option<Unit> {
        let i = self.units.binary_search_by_key(&id, |u| u.id).ok()?;
        Some(self.units.remove(i))
    }

    pub fn unit(&self, id: UnitId) -> Option<&Unit> {
        self.units
            .binary_search_by_key(&id, |u| u.id)
            .ok()
            .map(|i| &self.units[i])
    }

    pub fn unit_mut(&mut self, id: UnitId) -> Option<&mut Unit> {
        self.units
            .binary_search_by_key(&id, |u| u.id)
            .ok()
            .map(move |i| &mut self.units[i])
    }

    pub fn units(&self) -> &[Unit] {
        &self.units
    }

    /// Active units of other players
    pub fn enemies_of(&self, owner: PlayerId) -> impl Iterator<Item = &Unit> {
        self.units
            .iter()
            .filter(move |u| u.owner != owner && u.is_active())
    }

    /// Active units of the same player, excluding the unit itself
    pub fn friends_of(&self, unit: &Unit) -> impl Iterator<Item = &Unit> {
        let (owner, id) = (unit.owner, unit.id);
        self.units
            .iter()
            .filter(move |u| u.owner == owner && u.id != id && u.is_active())
    }

    /// Active units standing in a hex
    pub fn units_at(&self, coord: HexCoord) -> impl Iterator<Item = &Unit> {
        self.units
            .iter()
            .filter(move |u| u.position == coord && u.is_active())
    }

    /// Is there an active ground unit of another player in this hex?
    pub fn has_enemy_at(&self, coord: HexCoord, owner: PlayerId) -> bool {
        self.units_at(coord)
            .any(|u| u.owner != owner && !u.posture.airborne)
    }

    /// Is there an active ground unit of the same player (other than `id`) in this hex?
    pub fn has_friend_at(&self, coord: HexCoord, owner: PlayerId, id: UnitId) -> bool {
        self.units_at(coord)
            .any(|u| u.owner == owner && u.id != id && !u.posture.airborne)
    }

    /// Move a unit and mark it as having moved; returns the old position
    pub fn move_unit(
        &mut self,
        id: UnitId,
        to: HexCoord,
        facing: Facing,
        hexes_moved: u32,
    ) -> Option<HexCoord> {
        let unit = self.unit_mut(id)?;
        let from = unit.position;
        unit.position = to;
        unit.facing = facing;
        unit.moved_this_turn = true;
        unit.hexes_moved_this_turn = hexes_moved;
        Some(from)
    }

    /// Reset per-turn movement bookkeeping for all units
    pub fn start_round(&mut self) {
        self.round += 1;
        for unit in &mut self.units {
            unit.moved_this_turn = false;
            unit.hexes_moved_this_turn = 0;
            unit.movement_this_turn = Default::default();
            unit.selectable = unit.is_active();
        }
    }
}
