//! Scored candidate paths and their explanation

use std::fmt::Write as _;

use serde::Serialize;

use crate::core::types::UnitId;
use crate::movement::MovePath;

/// Every term that went into a path's utility
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ScoreBreakdown {
    pub success_probability: f64,
    pub bravery: f64,
    /// Best expected damage against any single enemy
    pub my_damage: f64,
    /// Enemy the damage term was computed against
    pub target: Option<UnitId>,
    /// Summed damage of enemies likely to shoot at us
    pub incoming_damage: f64,
    pub expected_fall_damage: f64,
    pub fall_shame: f64,
    /// Aggression term, or the home-edge term when withdrawing
    pub distance_penalty: f64,
    pub herd_penalty: f64,
    pub facing_penalty: f64,
    pub exposure_penalty: f64,
    pub domain_bonus: f64,
    pub withdrawing: bool,
}

impl ScoreBreakdown {
    pub fn utility(&self) -> f64 {
        self.success_probability * (self.bravery * self.my_damage - self.incoming_damage)
            - self.expected_fall_damage
            - self.fall_shame
            - self.distance_penalty
            - self.herd_penalty
            - self.facing_penalty
            - self.exposure_penalty
            + self.domain_bonus
    }
}

/// A candidate path with its score
#[derive(Debug, Clone, Serialize)]
pub struct RankedPath {
    pub path: MovePath,
    pub utility: f64,
    pub expected_damage: f64,
    pub breakdown: ScoreBreakdown,
    /// Ends on the unit's player-set waypoint
    pub reaches_waypoint: bool,
    /// Position among the enumerated candidates
    pub order: usize,
}

impl RankedPath {
    pub fn new(path: MovePath, breakdown: ScoreBreakdown, reaches_waypoint: bool, order: usize) -> Self {
        Self {
            utility: breakdown.utility(),
            expected_damage: breakdown.my_damage,
            path,
            breakdown,
            reaches_waypoint,
            order,
        }
    }

    /// Human readable breakdown of the score
    pub fn explain(&self) -> String {
        let b = &self.breakdown;
        let mut out = String::new();
        let _ = writeln!(out, "path {}", self.path);
        let _ = writeln!(out, "  utility          {:>9.2}", self.utility);
        let _ = writeln!(out, "  success chance   {:>9.3}", b.success_probability);
        match b.target {
            Some(target) => {
                let _ = writeln!(
                    out,
                    "  my damage        {:>9.2} x{:.1} vs {}",
                    b.my_damage, b.bravery, target
                );
            }
            None => {
                let _ = writeln!(out, "  my damage        {:>9.2}", b.my_damage);
            }
        }
        let _ = writeln!(out, "  incoming damage  {:>9.2}", -b.incoming_damage);
        let _ = writeln!(out, "  fall damage      {:>9.2}", -b.expected_fall_damage);
        let _ = writeln!(out, "  fall shame       {:>9.2}", -b.fall_shame);
        let label = if b.withdrawing {
            "home edge"
        } else {
            "enemy distance"
        };
        let _ = writeln!(out, "  {:<16} {:>9.2}", label, -b.distance_penalty);
        let _ = writeln!(out, "  herd             {:>9.2}", -b.herd_penalty);
        let _ = writeln!(out, "  facing           {:>9.2}", -b.facing_penalty);
        let _ = writeln!(out, "  exposure         {:>9.2}", -b.exposure_penalty);
        let _ = writeln!(out, "  domain           {:>9.2}", b.domain_bonus);
        if self.reaches_waypoint {
            let _ = writeln!(out, "  reaches waypoint");
        }
        out
    }
}
