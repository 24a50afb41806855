//! Load battlefields from TOML scenario files
//!
//! A scenario lists the board size, terrain patches and units. Weapons are
//! given by preset name ("medium_laser", "lrm10", "srm6", ...) and numbered
//! in listing order.

use std::collections::BTreeSet;
use std::fs;
use std::path::Path;

use serde::Deserialize;

use crate::board::{Board, Facing, HexCoord, Terrain};
use crate::core::error::{Result, TacticsError};
use crate::core::types::{PlayerId, Round};
use crate::units::{
    Armor, Battlefield, Domain, MovementType, Posture, Unit, UnitStatus, UtilityMunition, Weapon,
    WeaponArc,
};

fn first_round() -> Round {
    1
}

#[derive(Debug, Deserialize)]
struct ScenarioFile {
    name: String,
    #[serde(default = "first_round")]
    round: Round,
    /// Player the bot plays for
    #[serde(default)]
    bot_owner: u32,
    board: BoardSpec,
    #[serde(default)]
    units: Vec<UnitSpec>,
}

#[derive(Debug, Deserialize)]
struct BoardSpec {
    width: u32,
    height: u32,
    #[serde(default)]
    hexes: Vec<HexSpec>,
}

/// Terrain and elevation for a hex, or every hex within `radius` of it
#[derive(Debug, Deserialize)]
struct HexSpec {
    hex: HexCoord,
    #[serde(default)]
    radius: u32,
    #[serde(default)]
    terrain: Terrain,
    #[serde(default)]
    elevation: i8,
}

#[derive(Debug, Deserialize)]
struct WeaponSpec {
    preset: String,
    #[serde(default)]
    arc: Option<WeaponArc>,
    #[serde(default)]
    ammo: Option<u32>,
}

/// Weapons are either a bare preset name or a table with overrides
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum WeaponEntry {
    Preset(String),
    Detailed(WeaponSpec),
}

#[derive(Debug, Deserialize)]
struct UnitSpec {
    id: u32,
    name: String,
    owner: u32,
    mass: u32,
    walk_mp: u32,
    #[serde(default)]
    jump_mp: u32,
    #[serde(default)]
    domain: Domain,
    position: HexCoord,
    #[serde(default)]
    facing: Facing,
    #[serde(default)]
    heat: i32,
    heat_capacity: Option<i32>,
    gunnery: Option<i32>,
    piloting: Option<i32>,
    #[serde(default)]
    weapons: Vec<WeaponEntry>,
    armor: Option<u32>,
    internal: Option<u32>,
    #[serde(default)]
    can_twist: bool,
    #[serde(default)]
    targeting_computer: bool,
    arc_heat_cap: Option<i32>,
    #[serde(default)]
    velocity: u32,
    #[serde(default)]
    max_velocity: u32,
    #[serde(default)]
    posture: Posture,
    #[serde(default)]
    status: UnitStatus,
    /// Already moved this turn, with this many hexes
    #[serde(default)]
    moved: Option<u32>,
}

/// A loaded scenario
#[derive(Debug, Clone)]
pub struct Scenario {
    pub name: String,
    pub battlefield: Battlefield,
    pub bot_owner: PlayerId,
}

impl Scenario {
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let file: ScenarioFile = toml::from_str(content)?;
        build(file)
    }

    /// Units the bot plays, by id
    pub fn bot_units(&self) -> impl Iterator<Item = &Unit> {
        let owner = self.bot_owner;
        self.battlefield
            .units()
            .iter()
            .filter(move |u| u.owner == owner && u.is_active())
    }
}

/// Load a scenario from a TOML file
pub fn load_scenario(path: impl AsRef<Path>) -> Result<Scenario> {
    let path = path.as_ref();
    let contents = fs::read_to_string(path)?;
    let scenario = Scenario::from_toml_str(&contents)?;
    tracing::debug!(
        name = %scenario.name,
        units = scenario.battlefield.units().len(),
        path = %path.display(),
        "scenario loaded"
    );
    Ok(scenario)
}

/// Weapon preset by name
pub fn weapon_preset(name: &str, id: u32) -> Option<Weapon> {
    let name = name.to_ascii_lowercase();
    let weapon = match name.as_str() {
        "small_laser" => Weapon::small_laser(id),
        "medium_laser" => Weapon::medium_laser(id),
        "large_laser" => Weapon::large_laser(id),
        "ppc" => Weapon::ppc(id),
        "ac20" => Weapon::ac20(id),
        "machine_gun" => Weapon::machine_gun(id),
        "tag" => Weapon::tag(id),
        "homing_artillery" => Weapon::homing_artillery(id),
        "smoke" => Weapon::utility(id, UtilityMunition::Smoke),
        "flare" => Weapon::utility(id, UtilityMunition::Flare),
        "mine" => Weapon::utility(id, UtilityMunition::Mine),
        other => {
            if let Some(size) = other.strip_prefix("lrm") {
                Weapon::lrm(id, size.parse().ok().filter(|s| *s > 0)?)
            } else if let Some(size) = other.strip_prefix("srm") {
                Weapon::srm(id, size.parse().ok().filter(|s| *s > 0)?)
            } else {
                return None;
            }
        }
    };
    Some(weapon)
}

fn build(file: ScenarioFile) -> Result<Scenario> {
    if file.board.width == 0 || file.board.height == 0 {
        return Err(TacticsError::Scenario(format!(
            "{}: board must not be empty",
            file.name
        )));
    }

    let mut board = Board::new(file.board.width, file.board.height);
    for spec in &file.board.hexes {
        for coord in spec.hex.hexes_in_range(spec.radius) {
            board.set_terrain(coord, spec.terrain);
            board.set_elevation(coord, spec.elevation);
        }
    }

    let mut battlefield = Battlefield::new(board);
    battlefield.round = file.round;

    let mut seen = BTreeSet::new();
    for spec in file.units {
        if !seen.insert(spec.id) {
            return Err(TacticsError::Scenario(format!(
                "{}: duplicate unit id {}",
                file.name, spec.id
            )));
        }
        if !battlefield.board.in_bounds(spec.position) {
            return Err(TacticsError::Scenario(format!(
                "{}: unit {} placed off the board at {}",
                file.name, spec.id, spec.position
            )));
        }
        battlefield.add_unit(build_unit(spec)?);
    }

    Ok(Scenario {
        name: file.name,
        battlefield,
        bot_owner: PlayerId(file.bot_owner),
    })
}

fn build_unit(spec: UnitSpec) -> Result<Unit> {
    let mut unit = Unit::new(spec.id, &spec.name, spec.owner, spec.mass, spec.walk_mp)
        .at(spec.position, spec.facing)
        .with_domain(spec.domain);

    unit.jump_mp = spec.jump_mp;
    unit.heat = spec.heat;
    unit.can_twist = spec.can_twist;
    unit.has_targeting_computer = spec.targeting_computer;
    unit.arc_heat_cap = spec.arc_heat_cap;
    unit.velocity = spec.velocity;
    unit.max_velocity = spec.max_velocity;
    unit.status = spec.status;
    unit.posture = Posture {
        airborne: unit.posture.airborne || spec.posture.airborne,
        ..spec.posture
    };
    if let Some(capacity) = spec.heat_capacity {
        unit.heat_capacity = capacity;
    }
    if let Some(gunnery) = spec.gunnery {
        unit.gunnery = gunnery;
    }
    if let Some(piloting) = spec.piloting {
        unit.piloting = piloting;
    }
    if spec.armor.is_some() || spec.internal.is_some() {
        let armor = spec.armor.unwrap_or(spec.mass / 5);
        let internal = spec.internal.unwrap_or(spec.mass / 10);
        unit.armor = match spec.domain {
            Domain::Ground => Armor::biped(armor, internal),
            Domain::Infantry | Domain::Aerospace => Armor::single(armor, internal),
        };
    }
    if let Some(hexes) = spec.moved {
        unit.moved_this_turn = true;
        unit.hexes_moved_this_turn = hexes;
        unit.movement_this_turn = if hexes > 0 {
            MovementType::Walk
        } else {
            MovementType::Stationary
        };
        unit.selectable = false;
    }

    for (index, entry) in spec.weapons.iter().enumerate() {
        let id = index as u32 + 1;
        let (preset, arc, ammo) = match entry {
            WeaponEntry::Preset(name) => (name.as_str(), None, None),
            WeaponEntry::Detailed(w) => (w.preset.as_str(), w.arc, w.ammo),
        };
        let mut weapon = weapon_preset(preset, id).ok_or_else(|| {
            TacticsError::Scenario(format!("unit {}: unknown weapon '{}'", spec.id, preset))
        })?;
        if let Some(arc) = arc {
            weapon = weapon.with_arc(arc);
        }
        if let Some(ammo) = ammo {
            weapon = weapon.with_ammo(ammo);
        }
        unit.weapons.push(weapon);
    }

    Ok(unit)
}
