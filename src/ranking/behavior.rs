//! Behavior profiles loaded from TOML
//!
//! A profile stores each weight as an ordinal index 0..=10. The index is
//! mapped onto the value used in the utility through a fixed scale, so
//! profiles stay readable ("aggression = 7") while the scales carry the
//! tuning.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::board::{BoardEdge, HexCoord};
use crate::core::error::{Result, TacticsError};
use crate::core::types::UnitId;
use crate::firing::TargetPreferences;

/// Highest valid behavior index
pub const MAX_INDEX: u8 = 10;

/// Multiplier on the damage a path lets us deal
pub const BRAVERY_SCALE: [f64; 11] = [0.1, 0.3, 0.6, 0.9, 1.2, 1.5, 1.8, 2.1, 2.4, 2.7, 3.0];

/// Penalty per hex of distance to the nearest enemy
pub const AGGRESSION_SCALE: [f64; 11] = [0.0, 0.05, 0.1, 0.2, 0.35, 0.5, 0.75, 1.0, 1.5, 2.0, 3.0];

/// Penalty per hex of distance to the nearest friend
pub const HERD_SCALE: [f64; 11] = [0.0, 0.025, 0.05, 0.1, 0.15, 0.2, 0.3, 0.4, 0.5, 0.75, 1.0];

/// Penalty per expected fall
pub const FALL_SHAME_SCALE: [f64; 11] = [0.0, 1.0, 2.0, 3.0, 4.0, 5.0, 6.0, 8.0, 10.0, 15.0, 20.0];

/// Weight on exposure and, when withdrawing, on distance to the home edge
pub const SELF_PRESERVATION_SCALE: [f64; 11] =
    [0.0, 0.5, 1.0, 1.5, 2.0, 2.5, 3.0, 3.5, 4.0, 4.5, 5.0];

fn scale(table: &[f64; 11], index: u8) -> f64 {
    table[index.min(MAX_INDEX) as usize]
}

/// Player-set destination for one unit
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Waypoint {
    pub unit: UnitId,
    pub hex: HexCoord,
}

/// How a bot weighs damage, safety and formation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BehaviorProfile {
    /// Name of this profile (set from the file name when missing)
    pub name: String,
    pub bravery: u8,
    pub self_preservation: u8,
    pub aggression: u8,
    pub herd_mentality: u8,
    pub fall_shame: u8,
    /// Crippled units head for the home edge
    pub forced_withdrawal: bool,
    /// Every unit heads for the home edge
    pub auto_flee: bool,
    pub home_edge: BoardEdge,
    pub priority_targets: Vec<UnitId>,
    pub ignored_targets: Vec<UnitId>,
    pub waypoints: Vec<Waypoint>,
}

impl Default for BehaviorProfile {
    fn default() -> Self {
        Self {
            name: "balanced".to_string(),
            bravery: 5,
            self_preservation: 5,
            aggression: 5,
            herd_mentality: 5,
            fall_shame: 5,
            forced_withdrawal: true,
            auto_flee: false,
            home_edge: BoardEdge::South,
            priority_targets: Vec::new(),
            ignored_targets: Vec::new(),
            waypoints: Vec::new(),
        }
    }
}

impl BehaviorProfile {
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let profile: BehaviorProfile = toml::from_str(content)?;
        profile.validate()?;
        Ok(profile)
    }

    pub fn validate(&self) -> Result<()> {
        let indices = [
            ("bravery", self.bravery),
            ("self_preservation", self.self_preservation),
            ("aggression", self.aggression),
            ("herd_mentality", self.herd_mentality),
            ("fall_shame", self.fall_shame),
        ];
        for (name, value) in indices {
            if value > MAX_INDEX {
                return Err(TacticsError::InvalidConfig(format!(
                    "behavior {} index {} exceeds {}",
                    name, value, MAX_INDEX
                )));
            }
        }
        Ok(())
    }

    pub fn bravery_value(&self) -> f64 {
        scale(&BRAVERY_SCALE, self.bravery)
    }

    pub fn aggression_value(&self) -> f64 {
        scale(&AGGRESSION_SCALE, self.aggression)
    }

    pub fn herd_value(&self) -> f64 {
        scale(&HERD_SCALE, self.herd_mentality)
    }

    pub fn fall_shame_value(&self) -> f64 {
        scale(&FALL_SHAME_SCALE, self.fall_shame)
    }

    pub fn self_preservation_value(&self) -> f64 {
        scale(&SELF_PRESERVATION_SCALE, self.self_preservation)
    }

    pub fn waypoint_for(&self, unit: UnitId) -> Option<HexCoord> {
        self.waypoints
            .iter()
            .find(|w| w.unit == unit)
            .map(|w| w.hex)
    }

    pub fn target_preferences(&self) -> TargetPreferences<'_> {
        TargetPreferences {
            priority: &self.priority_targets,
            ignored: &self.ignored_targets,
        }
    }
}

/// Load a behavior profile from a TOML file
pub fn load_behavior(path: impl AsRef<Path>) -> Result<BehaviorProfile> {
    let path = path.as_ref();
    let contents = fs::read_to_string(path)?;
    let mut profile = BehaviorProfile::from_toml_str(&contents)?;
    if profile.name.is_empty() {
        profile.name = path
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_default();
    }
    tracing::debug!(name = %profile.name, path = %path.display(), "behavior profile loaded");
    Ok(profile)
}
