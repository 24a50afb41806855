//! Live unit data: static stats plus current battlefield state

use serde::{Deserialize, Serialize};

use crate::board::{Facing, HexCoord};
use crate::core::types::{PlayerId, UnitId, WeaponId};
use crate::units::state::{MovementType, Posture};
use crate::units::weapon::Weapon;

/// Hit location weights for a biped, in 2d6 outcomes out of 36
const BIPED_LAYOUT: [(&str, u32, bool); 8] = [
    ("head", 1, true),
    ("center torso", 7, true),
    ("left torso", 5, false),
    ("right torso", 5, false),
    ("left arm", 5, false),
    ("right arm", 5, false),
    ("left leg", 4, false),
    ("right leg", 4, false),
];

/// Head armor and structure are fixed small values on every biped
const HEAD_ARMOR_CAP: u32 = 9;
const HEAD_INTERNAL: u32 = 3;

/// Capability set that selects movement rules and scoring terms
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum Domain {
    #[default]
    Ground,
    Aerospace,
    Infantry,
}

/// Whether a unit still takes part in the fight
///
/// Broken and withdrawn units are no longer valid targets and do not
/// threaten anyone.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum UnitStatus {
    #[default]
    Active,
    Broken,
    Withdrawn,
    Destroyed,
}

impl UnitStatus {
    pub fn is_active(&self) -> bool {
        matches!(self, UnitStatus::Active)
    }
}

/// One hit location with its remaining protection
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HitLocation {
    pub name: String,
    pub armor: u32,
    pub internal: u32,
    /// Original internal structure, for damage fractions
    pub max_internal: u32,
    /// Destroying this location destroys the unit
    pub vital: bool,
    /// Chance of being hit, in 2d6 outcomes out of 36
    pub weight: u32,
}

impl HitLocation {
    /// Damage needed to destroy the location from its current state
    pub fn durability(&self) -> u32 {
        self.armor + self.internal
    }
}

/// Armor and structure of a unit, by hit location
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct Armor {
    pub locations: Vec<HitLocation>,
}

impl Armor {
    /// Standard biped layout with the same armor and structure everywhere but the head
    pub fn biped(armor: u32, internal: u32) -> Self {
        let locations = BIPED_LAYOUT
            .iter()
            .map(|(name, weight, vital)| {
                let is_head = *name == "head";
                let internal = if is_head { HEAD_INTERNAL } else { internal };
                HitLocation {
                    name: name.to_string(),
                    armor: if is_head { armor.min(HEAD_ARMOR_CAP) } else { armor },
                    internal,
                    max_internal: internal,
                    vital: *vital,
                    weight: *weight,
                }
            })
            .collect();
        Self { locations }
    }

    /// A single vital location (vehicles, infantry platoons, fighters)
    pub fn single(armor: u32, internal: u32) -> Self {
        Self {
            locations: vec![HitLocation {
                name: "body".to_string(),
                armor,
                internal,
                max_internal: internal,
                vital: true,
                weight: 36,
            }],
        }
    }

    pub fn total_armor(&self) -> u32 {
        self.locations.iter().map(|l| l.armor).sum()
    }

    pub fn total_internal(&self) -> u32 {
        self.locations.iter().map(|l| l.internal).sum()
    }

    /// Remaining fraction of internal structure (1.0 = undamaged)
    pub fn structure_fraction(&self) -> f64 {
        let max: u32 = self.locations.iter().map(|l| l.max_internal).sum();
        if max == 0 {
            return 0.0;
        }
        self.total_internal() as f64 / max as f64
    }

    /// Chance that a single hit of `damage` lands on a vital location and destroys it
    pub fn kill_chance(&self, damage: u32) -> f64 {
        let total_weight: u32 = self.locations.iter().map(|l| l.weight).sum();
        if total_weight == 0 || damage == 0 {
            return 0.0;
        }
        let lethal: u32 = self
            .locations
            .iter()
            .filter(|l| l.vital && damage >= l.durability())
            .map(|l| l.weight)
            .sum();
        lethal as f64 / total_weight as f64
    }

    /// Add armor to every location (used by tests and scenario tweaks)
    pub fn reinforced(mut self, extra: u32) -> Self {
        for location in &mut self.locations {
            location.armor += extra;
        }
        self
    }
}

/// A unit on the battlefield
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Unit {
    pub id: UnitId,
    pub name: String,
    pub owner: PlayerId,
    #[serde(default)]
    pub domain: Domain,

    // Static data
    /// Mass in tons
    pub mass: u32,
    pub walk_mp: u32,
    #[serde(default)]
    pub jump_mp: u32,
    /// Heat dissipated per turn
    pub heat_capacity: i32,
    #[serde(default = "default_gunnery")]
    pub gunnery: i32,
    #[serde(default = "default_piloting")]
    pub piloting: i32,
    #[serde(default)]
    pub weapons: Vec<Weapon>,
    pub armor: Armor,
    /// Torso twist or turret
    #[serde(default)]
    pub can_twist: bool,
    #[serde(default)]
    pub has_targeting_computer: bool,
    /// Heat budget shared by the weapons of each firing arc; set for
    /// platforms that fire whole arcs at once
    #[serde(default)]
    pub arc_heat_cap: Option<i32>,
    /// Top speed for aerospace units
    #[serde(default)]
    pub max_velocity: u32,

    // Current state
    pub position: HexCoord,
    #[serde(default)]
    pub facing: Facing,
    #[serde(default)]
    pub heat: i32,
    #[serde(default)]
    pub posture: Posture,
    /// Current velocity for aerospace units
    #[serde(default)]
    pub velocity: u32,
    #[serde(default)]
    pub status: UnitStatus,
    /// Has the unit already moved this turn?
    #[serde(default)]
    pub moved_this_turn: bool,
    #[serde(default)]
    pub hexes_moved_this_turn: u32,
    #[serde(default)]
    pub movement_this_turn: MovementType,
    /// Can the unit still be given orders this turn?
    #[serde(default = "default_selectable")]
    pub selectable: bool,
}

fn default_gunnery() -> i32 {
    4
}

fn default_piloting() -> i32 {
    5
}

fn default_selectable() -> bool {
    true
}

impl Unit {
    /// Create a ground unit with default skills and no weapons
    pub fn new(id: u32, name: &str, owner: u32, mass: u32, walk_mp: u32) -> Self {
        Self {
            id: UnitId(id),
            name: name.to_string(),
            owner: PlayerId(owner),
            domain: Domain::Ground,
            mass,
            walk_mp,
            jump_mp: 0,
            heat_capacity: 10,
            gunnery: default_gunnery(),
            piloting: default_piloting(),
            weapons: Vec::new(),
            armor: Armor::biped(mass / 5, mass / 10),
            can_twist: false,
            has_targeting_computer: false,
            arc_heat_cap: None,
            max_velocity: 0,
            position: HexCoord::default(),
            facing: Facing::NORTH,
            heat: 0,
            posture: Posture::default(),
            velocity: 0,
            status: UnitStatus::Active,
            moved_this_turn: false,
            hexes_moved_this_turn: 0,
            movement_this_turn: MovementType::Stationary,
            selectable: true,
        }
    }

    pub fn at(mut self, position: HexCoord, facing: Facing) -> Self {
        self.position = position;
        self.facing = facing;
        self
    }

    pub fn with_weapon(mut self, weapon: Weapon) -> Self {
        self.weapons.push(weapon);
        self
    }

    pub fn with_domain(mut self, domain: Domain) -> Self {
        self.domain = domain;
        if domain == Domain::Aerospace {
            self.posture.airborne = true;
        }
        self
    }

    /// Running movement points: walk × 1.5, rounded up
    pub fn run_mp(&self) -> u32 {
        (self.walk_mp * 3).div_ceil(2)
    }

    pub fn weapon(&self, id: WeaponId) -> Option<&Weapon> {
        self.weapons.iter().find(|w| w.id == id)
    }

    /// Longest range of any damaging weapon
    pub fn max_weapon_range(&self) -> u32 {
        self.weapons
            .iter()
            .filter(|w| !w.is_out_of_ammo())
            .map(|w| w.ranges.long)
            .max()
            .unwrap_or(0)
    }

    /// Has a target designator that can still fire
    pub fn has_designator(&self) -> bool {
        self.weapons.iter().any(|w| w.designator)
    }

    /// Fall damage for one fall from standing height
    pub fn fall_damage(&self) -> u32 {
        self.mass.div_ceil(10)
    }

    /// Badly damaged enough that withdrawal rules kick in
    pub fn is_crippled(&self, structure_fraction: f64) -> bool {
        self.posture.immobile || self.armor.structure_fraction() < structure_fraction
    }

    pub fn is_active(&self) -> bool {
        self.status.is_active()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_biped_weights_sum_to_36() {
        let armor = Armor::biped(20, 10);
        let total: u32 = armor.locations.iter().map(|l| l.weight).sum();
        assert_eq!(total, 36);
    }

    #[test]
    fn test_head_is_capped() {
        let armor = Armor::biped(30, 15);
        let head = &armor.locations[0];
        assert_eq!(head.armor, 9);
        assert_eq!(head.internal, 3);
    }

    #[test]
    fn test_kill_chance_single_location() {
        let armor = Armor::single(5, 5);
        assert_eq!(armor.kill_chance(9), 0.0);
        assert_eq!(armor.kill_chance(10), 1.0);
    }

    #[test]
    fn test_kill_chance_biped_head_only() {
        // Heavy torso armor, weak head: only the head (1/36) is lethal
        let armor = Armor::biped(40, 20);
        let chance = armor.kill_chance(12);
        assert!((chance - 1.0 / 36.0).abs() < 1e-9);
    }

    #[test]
    fn test_reinforced_armor_never_raises_kill_chance() {
        let armor = Armor::biped(4, 3);
        let before = armor.kill_chance(10);
        let after = armor.clone().reinforced(5).kill_chance(10);
        assert!(after <= before);
    }

    #[test]
    fn test_run_mp_rounds_up() {
        let unit = Unit::new(1, "Test", 0, 50, 5);
        assert_eq!(unit.run_mp(), 8);
        let unit = Unit::new(2, "Test", 0, 50, 4);
        assert_eq!(unit.run_mp(), 6);
    }

    #[test]
    fn test_fall_damage_scales_with_mass() {
        assert_eq!(Unit::new(1, "Light", 0, 25, 6).fall_damage(), 3);
        assert_eq!(Unit::new(2, "Assault", 0, 100, 3).fall_damage(), 10);
    }

    #[test]
    fn test_structure_fraction_and_crippled() {
        let mut unit = Unit::new(1, "Test", 0, 50, 5);
        assert_eq!(unit.armor.structure_fraction(), 1.0);
        assert!(!unit.is_crippled(0.5));
        for location in &mut unit.armor.locations {
            location.internal /= 3;
        }
        assert!(unit.is_crippled(0.5));
    }

    #[test]
    fn test_aerospace_domain_is_airborne() {
        let unit = Unit::new(1, "Fighter", 0, 50, 6).with_domain(Domain::Aerospace);
        assert!(unit.posture.airborne);
    }
}
