//! To-hit numbers and their modifier breakdown
//!
//! `base_to_hit` builds every modifier that can be derived from the two
//! unit states and the weapon alone. It is what guess-mode estimation
//! uses; the rules engine adds line of sight on top of it.

use std::fmt;

use serde::Serialize;

use crate::board::HexCoord;
use crate::rules::dice;
use crate::units::{Battlefield, MovementType, Unit, UnitState, Weapon};

/// One named modifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ToHitModifier {
    pub description: &'static str,
    pub value: i32,
}

/// Target number and its modifiers, or the reason the shot is impossible
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
pub struct ToHitData {
    pub modifiers: Vec<ToHitModifier>,
    pub impossible: Option<&'static str>,
}

impl ToHitData {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn impossible(reason: &'static str) -> Self {
        Self {
            modifiers: Vec::new(),
            impossible: Some(reason),
        }
    }

    pub fn add(&mut self, description: &'static str, value: i32) {
        if value != 0 {
            self.modifiers.push(ToHitModifier { description, value });
        }
    }

    /// Mark impossible, keeping the modifiers gathered so far
    pub fn fail(&mut self, reason: &'static str) {
        if self.impossible.is_none() {
            self.impossible = Some(reason);
        }
    }

    pub fn is_impossible(&self) -> bool {
        self.impossible.is_some()
    }

    /// The 2d6 target number
    pub fn value(&self) -> i32 {
        self.modifiers.iter().map(|m| m.value).sum()
    }

    /// Chance to hit; zero when impossible
    pub fn probability(&self) -> f64 {
        if self.is_impossible() {
            0.0
        } else {
            dice::odds(self.value())
        }
    }
}

impl fmt::Display for ToHitData {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(reason) = self.impossible {
            return write!(f, "impossible ({})", reason);
        }
        write!(f, "{}", self.value())?;
        let parts: Vec<String> = self
            .modifiers
            .iter()
            .map(|m| format!("{} {:+}", m.description, m.value))
            .collect();
        if !parts.is_empty() {
            write!(f, " [{}]", parts.join(", "))?;
        }
        Ok(())
    }
}

/// Everything a single weapon attack is evaluated against
///
/// The states are hypothetical: the attacker's is usually the end state of a
/// candidate path and never the live unit's.
#[derive(Debug, Clone, Copy)]
pub struct ShotContext<'a> {
    pub battlefield: &'a Battlefield,
    pub attacker: &'a Unit,
    pub attacker_state: &'a UnitState,
    pub target: &'a Unit,
    pub target_state: &'a UnitState,
    pub weapon: &'a Weapon,
    /// Attacker already shoots at another primary target
    pub secondary_target: bool,
    /// Skip the arc check (target may still turn before firing)
    pub assume_any_facing: bool,
}

impl ShotContext<'_> {
    pub fn distance(&self) -> u32 {
        self.attacker_state
            .position
            .distance(&self.target_state.position)
    }

    /// Clockwise hex-side offset of the target from the attacker's torso facing
    pub fn relative_direction(&self) -> u8 {
        let direction = self
            .attacker_state
            .position
            .direction_to(&self.target_state.position);
        self.attacker_state.secondary_facing.relative(direction)
    }

    pub fn target_position(&self) -> HexCoord {
        self.target_state.position
    }
}

/// Target movement modifier for hexes moved this turn
pub fn target_movement_modifier(hexes_moved: u32, jumped: bool) -> i32 {
    let base = match hexes_moved {
        0..=2 => 0,
        3..=4 => 1,
        5..=6 => 2,
        7..=9 => 3,
        10..=17 => 4,
        18..=24 => 5,
        _ => 6,
    };
    base + if jumped { 1 } else { 0 }
}

/// Penalty for the attacker's own heat level
pub fn heat_modifier(heat: i32) -> i32 {
    match heat {
        i32::MIN..=7 => 0,
        8..=12 => 1,
        13..=16 => 2,
        17..=23 => 3,
        _ => 4,
    }
}

/// Modifiers that need nothing but the two states and the weapon
pub fn base_to_hit(ctx: &ShotContext<'_>) -> ToHitData {
    let weapon = ctx.weapon;
    let mut data = ToHitData::new();

    if weapon.is_out_of_ammo() {
        return ToHitData::impossible("out of ammo");
    }
    if ctx.target.id == ctx.attacker.id {
        return ToHitData::impossible("cannot target self");
    }

    data.add("gunnery skill", ctx.attacker.gunnery);

    let distance = ctx.distance();
    match weapon.ranges.bracket(distance).modifier() {
        Some(modifier) => data.add("range", modifier),
        None => {
            data.fail("out of range");
            return data;
        }
    }
    data.add("minimum range", weapon.ranges.minimum_range_penalty(distance));

    let attacker_state = ctx.attacker_state;
    data.add("attacker movement", attacker_state.movement.attacker_modifier());
    if attacker_state.posture.prone {
        data.add("attacker prone", 2);
    }

    let target_state = ctx.target_state;
    data.add(
        "target movement",
        target_movement_modifier(
            target_state.hexes_moved,
            target_state.movement == MovementType::Jump,
        ),
    );
    if target_state.posture.prone {
        data.add("target prone", if distance <= 1 { -2 } else { 1 });
    }
    if target_state.posture.immobile {
        data.add("target immobile", -4);
    }

    let terrain = ctx.battlefield.board.terrain(target_state.position);
    data.add("target in woods", terrain.woods_modifier());
    if terrain.partial_cover() {
        data.add("partial cover", 1);
    }

    if !ctx.assume_any_facing && !weapon.arc.covers(ctx.relative_direction()) {
        data.fail("not in arc");
        return data;
    }

    data.add("heat", heat_modifier(attacker_state.heat));
    data.add("weapon", weapon.to_hit_modifier);
    if ctx.attacker.has_targeting_computer && !weapon.is_cluster() && !weapon.indirect {
        data.add("targeting computer", -1);
    }

    if ctx.secondary_target {
        let front = matches!(ctx.relative_direction(), 5 | 0 | 1);
        data.add("secondary target", if front { 1 } else { 2 });
    }

    data
}
