//! Bot configuration with documented constants
//!
//! All tuned numbers are collected here with a note on what they affect.
//! Several of them (the unmoved-enemy discount, border push distance, facing
//! penalty) were found by playtesting and have no derivation; they are kept
//! configurable rather than baked into the scoring code.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::core::error::{Result, TacticsError};

/// Limits on a single path enumeration pass
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EnumerationConfig {
    /// Maximum number of search nodes expanded for one unit
    ///
    /// When reached, the enumerator stops and returns the candidates found
    /// so far (flagged as truncated).
    pub max_nodes: usize,

    /// Wall-clock budget for one unit's enumeration, in milliseconds
    pub time_budget_ms: u64,

    /// Maximum number of candidates kept per unit in the path cache
    ///
    /// Candidates beyond this are dropped, cheapest paths first kept.
    pub max_cached_paths: usize,
}

impl Default for EnumerationConfig {
    fn default() -> Self {
        Self {
            max_nodes: 200_000,
            time_budget_ms: 2_000,
            max_cached_paths: 5_000,
        }
    }
}

impl EnumerationConfig {
    pub fn time_budget(&self) -> Duration {
        Duration::from_millis(self.time_budget_ms)
    }
}

/// Combat estimation settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EstimationConfig {
    /// Absolute hit-probability difference above which a guess/exact
    /// disagreement is logged as a warning
    pub divergence_warn_threshold: f64,

    /// Target number of the homing roll once the target is painted
    pub homing_target_number: i32,
}

impl Default for EstimationConfig {
    fn default() -> Self {
        Self {
            divergence_warn_threshold: 0.15,
            homing_target_number: 4,
        }
    }
}

/// Firing plan utility weights
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FiringConfig {
    /// Heat the bot is willing to build above its dissipation per turn
    ///
    /// Added to (capacity - current heat) to form the knapsack ceiling.
    pub overheat_tolerance: i32,

    /// Utility per point of expected damage
    pub damage_utility: f64,

    /// Utility of a certain kill
    pub kill_utility: f64,

    /// Penalty per point of heat above dissipation
    pub overheat_value: f64,

    /// Flat bonus for plans against a priority target
    pub priority_target_bonus: f64,
}

impl Default for FiringConfig {
    fn default() -> Self {
        Self {
            overheat_tolerance: 0,
            damage_utility: 1.0,
            kill_utility: 2.0,
            overheat_value: 0.5,
            priority_target_bonus: 5.0,
        }
    }
}

/// Path ranking constants
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RankingConfig {
    /// Multiplier on damage we expect to deal to enemies that have not
    /// moved yet this turn (they may still reposition)
    pub unmoved_enemy_discount: f64,

    /// Enemies whose likelihood of targeting us is below this are left out
    /// of the incoming-damage sum
    pub threat_likelihood_baseline: f64,

    /// Penalty per hex-side of facing error beyond the first
    pub facing_penalty_per_step: f64,

    /// Number of friendly units covering a hex at which exposure is zero
    pub desired_cover: u32,

    /// A friendly unit within this many hexes of the end hex covers it
    pub cover_radius: u32,

    /// Incoming damage multiplier for infantry ending in the open
    pub infantry_open_ground_multiplier: f64,

    /// Infantry bonus for ending in woods or buildings
    pub infantry_cover_bonus: f64,

    /// Aerospace units ending closer than this to an edge are penalized
    pub aero_border_push_distance: u32,

    /// Penalty per hex inside the border push distance
    pub aero_border_penalty: f64,

    /// Penalty for leaving the board when not withdrawing
    pub aero_fly_off_penalty: f64,

    /// Bonus per enemy unit overflown
    pub aero_flyover_bonus: f64,

    /// Penalty for ending a turn at velocity zero
    pub aero_stall_penalty: f64,

    /// Fraction of remaining internal structure below which a unit counts
    /// as crippled for forced withdrawal
    pub crippled_structure_fraction: f64,

    /// Candidates per parallel scoring chunk; also the minimum count before
    /// scoring goes parallel
    pub parallel_threshold: usize,

    /// Wall-clock budget for ranking one unit, in milliseconds
    pub turn_time_budget_ms: u64,
}

impl Default for RankingConfig {
    fn default() -> Self {
        Self {
            unmoved_enemy_discount: 0.5,
            threat_likelihood_baseline: 0.5,
            facing_penalty_per_step: 50.0,
            desired_cover: 2,
            cover_radius: 3,
            infantry_open_ground_multiplier: 2.0,
            infantry_cover_bonus: 5.0,
            aero_border_push_distance: 5,
            aero_border_penalty: 10.0,
            aero_fly_off_penalty: 200.0,
            aero_flyover_bonus: 3.0,
            aero_stall_penalty: 100.0,
            crippled_structure_fraction: 0.5,
            parallel_threshold: 64,
            turn_time_budget_ms: 5_000,
        }
    }
}

impl RankingConfig {
    pub fn turn_time_budget(&self) -> Duration {
        Duration::from_millis(self.turn_time_budget_ms)
    }
}

/// Complete bot configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct BotConfig {
    /// Seed for the tie-breaking RNG (same seed, same decisions)
    pub seed: u64,
    pub enumeration: EnumerationConfig,
    pub estimation: EstimationConfig,
    pub firing: FiringConfig,
    pub ranking: RankingConfig,
}

impl BotConfig {
    /// Create a new config with default values
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse a config from TOML, filling missing fields with defaults
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let config: BotConfig = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Validate configuration for internal consistency
    pub fn validate(&self) -> Result<()> {
        if self.enumeration.max_nodes == 0 {
            return Err(TacticsError::InvalidConfig(
                "enumeration.max_nodes must be positive".into(),
            ));
        }

        if self.enumeration.max_cached_paths == 0 {
            return Err(TacticsError::InvalidConfig(
                "enumeration.max_cached_paths must be positive".into(),
            ));
        }

        if !(0.0..=1.0).contains(&self.ranking.unmoved_enemy_discount) {
            return Err(TacticsError::InvalidConfig(format!(
                "ranking.unmoved_enemy_discount ({}) must be within 0..=1",
                self.ranking.unmoved_enemy_discount
            )));
        }

        if !(0.0..=1.0).contains(&self.ranking.threat_likelihood_baseline) {
            return Err(TacticsError::InvalidConfig(format!(
                "ranking.threat_likelihood_baseline ({}) must be within 0..=1",
                self.ranking.threat_likelihood_baseline
            )));
        }

        if self.ranking.parallel_threshold == 0 {
            return Err(TacticsError::InvalidConfig(
                "ranking.parallel_threshold must be positive".into(),
            ));
        }

        if self.firing.overheat_tolerance < 0 {
            return Err(TacticsError::InvalidConfig(
                "firing.overheat_tolerance must not be negative".into(),
            ));
        }

        Ok(())
    }
}
