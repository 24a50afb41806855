//! Firing plans

use std::fmt;

use serde::Serialize;

use crate::board::Twist;
use crate::combat::WeaponShot;
use crate::core::types::UnitId;

/// The weapons a unit fires this turn, with their combined outlook
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FiringPlan {
    /// Ordered by weapon id; no weapon appears twice
    pub shots: Vec<WeaponShot>,
    pub twist: Twist,
    /// Distinct targets, ordered by id
    pub targets: Vec<UnitId>,
    pub expected_damage: f64,
    pub heat_used: i32,
    pub heat_ceiling: i32,
    /// Expected number of targets destroyed
    pub kill_probability: f64,
    pub utility: f64,
}

impl FiringPlan {
    pub fn empty(heat_ceiling: i32) -> Self {
        Self {
            shots: Vec::new(),
            twist: Twist::None,
            targets: Vec::new(),
            expected_damage: 0.0,
            heat_used: 0,
            heat_ceiling,
            kill_probability: 0.0,
            utility: 0.0,
        }
    }

    /// Assemble a plan from already selected shots
    ///
    /// Utility starts as the expected damage; the planner rescores it.
    pub fn from_shots(mut shots: Vec<WeaponShot>, heat_ceiling: i32) -> Self {
        shots.sort_by_key(|s| s.weapon_id);
        shots.dedup_by_key(|s| s.weapon_id);

        let mut targets: Vec<UnitId> = shots.iter().map(|s| s.target_id).collect();
        targets.sort();
        targets.dedup();

        let expected_damage = shots.iter().map(|s| s.expected_damage).sum();
        let heat_used = shots.iter().map(|s| s.heat.max(0)).sum();

        let mut plan = Self {
            shots,
            twist: Twist::None,
            targets,
            expected_damage,
            heat_used,
            heat_ceiling,
            kill_probability: 0.0,
            utility: expected_damage,
        };
        plan.kill_probability = plan
            .targets
            .iter()
            .map(|t| plan.kill_probability_against(*t))
            .sum();
        plan
    }

    pub fn with_twist(mut self, twist: Twist) -> Self {
        self.twist = twist;
        self
    }

    pub fn is_empty(&self) -> bool {
        self.shots.is_empty()
    }

    pub fn damage_against(&self, target: UnitId) -> f64 {
        self.shots
            .iter()
            .filter(|s| s.target_id == target)
            .map(|s| s.expected_damage)
            .sum()
    }

    /// Chance at least one shot at `target` destroys it
    pub fn kill_probability_against(&self, target: UnitId) -> f64 {
        let survive: f64 = self
            .shots
            .iter()
            .filter(|s| s.target_id == target)
            .map(|s| 1.0 - s.kill_probability)
            .product();
        1.0 - survive
    }
}

impl fmt::Display for FiringPlan {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.shots.is_empty() {
            return write!(f, "hold fire (heat ceiling {})", self.heat_ceiling);
        }
        writeln!(
            f,
            "{} shots, twist {:?}, {:.2} expected damage, heat {}/{}, kill {:.3}, utility {:.2}",
            self.shots.len(),
            self.twist,
            self.expected_damage,
            self.heat_used,
            self.heat_ceiling,
            self.kill_probability,
            self.utility
        )?;
        for shot in &self.shots {
            writeln!(
                f,
                "  {} -> {}: p={:.3} dmg={:.2} heat={} tn={}",
                shot.weapon_id,
                shot.target_id,
                shot.hit_probability,
                shot.expected_damage,
                shot.heat,
                shot.to_hit
            )?;
        }
        Ok(())
    }
}
