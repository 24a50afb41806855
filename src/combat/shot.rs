//! Per-weapon attack estimates

use serde::Serialize;

use crate::core::types::{UnitId, WeaponId};
use crate::rules::dice;
use crate::rules::ToHitData;
use crate::units::{Armor, DamageProfile, Unit, Weapon};

/// Largest block of cluster damage applied to one location
const CLUSTER_GROUP: u32 = 5;

/// One weapon fired at one target from one hypothetical position
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WeaponShot {
    pub weapon_id: WeaponId,
    pub target_id: UnitId,
    pub hit_probability: f64,
    pub heat: i32,
    /// Average damage if the attack hits
    pub damage_on_hit: f64,
    pub expected_damage: f64,
    /// Chance this shot alone destroys the target
    pub kill_probability: f64,
    pub to_hit: ToHitData,
}

impl WeaponShot {
    /// Build the estimate for a weapon, target and resolved hit probability
    pub fn build(weapon: &Weapon, target: &Unit, to_hit: ToHitData, hit_probability: f64) -> Self {
        let hit_probability = hit_probability.clamp(0.0, 1.0);
        let damage_on_hit = damage_on_hit(weapon);
        let kill_probability = hit_probability * kill_on_hit(weapon, &target.armor);
        Self {
            weapon_id: weapon.id,
            target_id: target.id,
            hit_probability,
            heat: weapon.heat,
            damage_on_hit,
            expected_damage: hit_probability * damage_on_hit,
            kill_probability,
            to_hit,
        }
    }

    /// A shot that cannot happen
    pub fn impossible(weapon: &Weapon, target: &Unit, to_hit: ToHitData) -> Self {
        Self::build(weapon, target, to_hit, 0.0)
    }

    /// Worth spending heat on
    pub fn is_useful(&self) -> bool {
        self.expected_damage > 0.0
    }
}

/// Average damage of a hit
pub fn damage_on_hit(weapon: &Weapon) -> f64 {
    match weapon.damage {
        DamageProfile::Fixed { damage } => damage as f64,
        DamageProfile::Cluster {
            size,
            damage_per_missile,
        } => dice::expected_cluster_hits(size) * damage_per_missile as f64,
        DamageProfile::Utility { .. } => 0.0,
    }
}

/// Chance a hit destroys the target outright
///
/// Cluster hits land in groups; each group rolls its own location.
fn kill_on_hit(weapon: &Weapon, armor: &Armor) -> f64 {
    match weapon.damage {
        DamageProfile::Fixed { damage } => armor.kill_chance(damage),
        DamageProfile::Cluster {
            size,
            damage_per_missile,
        } => {
            let group = if damage_per_missile == 1 {
                size.min(CLUSTER_GROUP)
            } else {
                damage_per_missile
            };
            let total = damage_on_hit(weapon);
            if group == 0 || total <= 0.0 {
                return 0.0;
            }
            let groups = (total / group as f64).ceil() as i32;
            let survive = 1.0 - armor.kill_chance(group);
            1.0 - survive.powi(groups)
        }
        DamageProfile::Utility { .. } => 0.0,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::units::UtilityMunition;

    fn target() -> Unit {
        Unit::new(9, "Target", 1, 50, 4)
    }

    #[test]
    fn test_expected_damage_is_probability_times_damage() {
        let weapon = Weapon::ppc(1);
        let shot = WeaponShot::build(&weapon, &target(), ToHitData::new(), 0.7);
        assert!((shot.expected_damage - 7.0).abs() < 1e-12);
        assert_eq!(shot.heat, 10);
    }

    #[test]
    fn test_utility_munitions_deal_nothing() {
        let weapon = Weapon::utility(1, UtilityMunition::Smoke);
        let shot = WeaponShot::build(&weapon, &target(), ToHitData::new(), 1.0);
        assert_eq!(shot.expected_damage, 0.0);
        assert_eq!(shot.kill_probability, 0.0);
        assert!(!shot.is_useful());
    }

    #[test]
    fn test_cluster_damage_uses_table_average() {
        let weapon = Weapon::lrm(1, 10);
        assert!((damage_on_hit(&weapon) - 227.0 / 36.0).abs() < 1e-9);
        let srm = Weapon::srm(2, 4);
        assert!(damage_on_hit(&srm) > damage_on_hit(&Weapon::lrm(3, 5)));
    }

    #[test]
    fn test_impossible_shot_is_zero() {
        let weapon = Weapon::ac20(1);
        let shot = WeaponShot::impossible(&weapon, &target(), ToHitData::impossible("test"));
        assert_eq!(shot.hit_probability, 0.0);
        assert_eq!(shot.expected_damage, 0.0);
        assert_eq!(shot.kill_probability, 0.0);
    }

    #[test]
    fn test_ac20_can_kill_light_target() {
        let weapon = Weapon::ac20(1);
        let light = Unit::new(9, "Light", 1, 20, 6);
        let shot = WeaponShot::build(&weapon, &light, ToHitData::new(), 1.0);
        assert!(shot.kill_probability > 0.0);
    }
}
