//! Static weapon data
//!
//! Weapons carry only what the estimator needs: damage profile, heat,
//! range brackets, mounting arc and a few capability flags.

use serde::{Deserialize, Serialize};

use crate::core::types::WeaponId;

/// Zero-damage munitions fired for effect rather than damage
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UtilityMunition {
    Smoke,
    Flare,
    Mine,
}

/// How a weapon converts a hit into damage
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum DamageProfile {
    /// Always deals its nominal damage on a hit
    Fixed { damage: u32 },
    /// Fires a volley; the number of hits comes from the cluster table
    Cluster { size: u32, damage_per_missile: u32 },
    /// Never deals damage
    Utility { munition: UtilityMunition },
}

/// Arc a weapon can fire into, relative to the unit's secondary facing
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum WeaponArc {
    #[default]
    Forward,
    LeftArm,
    RightArm,
    Rear,
    Turret,
}

impl WeaponArc {
    /// Does the arc cover a target at this clockwise offset (0..=5) from the facing?
    pub fn covers(&self, relative_direction: u8) -> bool {
        match self {
            WeaponArc::Forward => matches!(relative_direction, 5 | 0 | 1),
            WeaponArc::LeftArm => matches!(relative_direction, 4 | 5 | 0 | 1),
            WeaponArc::RightArm => matches!(relative_direction, 5 | 0 | 1 | 2),
            WeaponArc::Rear => matches!(relative_direction, 2 | 3 | 4),
            WeaponArc::Turret => true,
        }
    }
}

/// Range brackets in hexes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct WeaponRanges {
    pub minimum: u32,
    pub short: u32,
    pub medium: u32,
    pub long: u32,
}

impl WeaponRanges {
    pub fn new(minimum: u32, short: u32, medium: u32, long: u32) -> Self {
        Self {
            minimum,
            short,
            medium,
            long,
        }
    }

    /// Bracket for a distance
    pub fn bracket(&self, distance: u32) -> RangeBracket {
        if distance == 0 || distance > self.long {
            RangeBracket::OutOfRange
        } else if distance <= self.short {
            RangeBracket::Short
        } else if distance <= self.medium {
            RangeBracket::Medium
        } else {
            RangeBracket::Long
        }
    }

    /// Extra to-hit penalty for firing inside minimum range
    pub fn minimum_range_penalty(&self, distance: u32) -> i32 {
        if self.minimum > 0 && distance <= self.minimum {
            (self.minimum - distance + 1) as i32
        } else {
            0
        }
    }
}

/// Range bracket of a shot
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RangeBracket {
    Short,
    Medium,
    Long,
    OutOfRange,
}

impl RangeBracket {
    /// To-hit modifier for the bracket (None when out of range)
    pub fn modifier(&self) -> Option<i32> {
        match self {
            RangeBracket::Short => Some(0),
            RangeBracket::Medium => Some(2),
            RangeBracket::Long => Some(4),
            RangeBracket::OutOfRange => None,
        }
    }
}

/// Complete static weapon data
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Weapon {
    pub id: WeaponId,
    pub name: String,
    pub damage: DamageProfile,
    pub heat: i32,
    pub ranges: WeaponRanges,
    #[serde(default)]
    pub arc: WeaponArc,
    /// Remaining shots; `None` for energy weapons
    #[serde(default)]
    pub ammo: Option<u32>,
    /// Built-in accuracy modifier (pulse lasers are negative)
    #[serde(default)]
    pub to_hit_modifier: i32,
    /// Can fire without line of sight when a friendly unit spots
    #[serde(default)]
    pub indirect: bool,
    /// Needs the target painted by a friendly designator
    #[serde(default)]
    pub homing: bool,
    /// Target designator (paints targets for homing weapons)
    #[serde(default)]
    pub designator: bool,
}

impl Weapon {
    pub fn new(
        id: u32,
        name: &str,
        damage: DamageProfile,
        heat: i32,
        ranges: WeaponRanges,
    ) -> Self {
        Self {
            id: WeaponId(id),
            name: name.to_string(),
            damage,
            heat,
            ranges,
            arc: WeaponArc::Forward,
            ammo: None,
            to_hit_modifier: 0,
            indirect: false,
            homing: false,
            designator: false,
        }
    }

    pub fn with_arc(mut self, arc: WeaponArc) -> Self {
        self.arc = arc;
        self
    }

    pub fn with_ammo(mut self, shots: u32) -> Self {
        self.ammo = Some(shots);
        self
    }

    /// Is the weapon out of ammunition?
    pub fn is_out_of_ammo(&self) -> bool {
        self.ammo == Some(0)
    }

    pub fn is_cluster(&self) -> bool {
        matches!(self.damage, DamageProfile::Cluster { .. })
    }

    /// Common weapon: Small Laser
    pub fn small_laser(id: u32) -> Self {
        Self::new(
            id,
            "Small Laser",
            DamageProfile::Fixed { damage: 3 },
            1,
            WeaponRanges::new(0, 1, 2, 3),
        )
    }

    /// Common weapon: Medium Laser
    pub fn medium_laser(id: u32) -> Self {
        Self::new(
            id,
            "Medium Laser",
            DamageProfile::Fixed { damage: 5 },
            3,
            WeaponRanges::new(0, 3, 6, 9),
        )
    }

    /// Common weapon: Large Laser
    pub fn large_laser(id: u32) -> Self {
        Self::new(
            id,
            "Large Laser",
            DamageProfile::Fixed { damage: 8 },
            8,
            WeaponRanges::new(0, 5, 10, 15),
        )
    }

    /// Common weapon: Particle Projection Cannon
    pub fn ppc(id: u32) -> Self {
        Self::new(
            id,
            "PPC",
            DamageProfile::Fixed { damage: 10 },
            10,
            WeaponRanges::new(3, 6, 12, 18),
        )
    }

    /// Common weapon: Autocannon/20
    pub fn ac20(id: u32) -> Self {
        Self::new(
            id,
            "AC/20",
            DamageProfile::Fixed { damage: 20 },
            7,
            WeaponRanges::new(0, 3, 6, 9),
        )
        .with_ammo(10)
    }

    /// Common weapon: Machine Gun (heatless)
    pub fn machine_gun(id: u32) -> Self {
        Self::new(
            id,
            "Machine Gun",
            DamageProfile::Fixed { damage: 2 },
            0,
            WeaponRanges::new(0, 1, 2, 3),
        )
        .with_ammo(200)
    }

    /// Long range missiles, 1 damage per missile, indirect capable
    pub fn lrm(id: u32, size: u32) -> Self {
        let mut weapon = Self::new(
            id,
            &format!("LRM {}", size),
            DamageProfile::Cluster {
                size,
                damage_per_missile: 1,
            },
            (size as i32 / 5).max(1) + if size >= 10 { 1 } else { 0 },
            WeaponRanges::new(6, 7, 14, 21),
        )
        .with_ammo(120 / size.max(1));
        weapon.indirect = true;
        weapon
    }

    /// Short range missiles, 2 damage per missile
    pub fn srm(id: u32, size: u32) -> Self {
        Self::new(
            id,
            &format!("SRM {}", size),
            DamageProfile::Cluster {
                size,
                damage_per_missile: 2,
            },
            (size as i32 / 2).max(1) + if size >= 4 { 1 } else { 0 },
            WeaponRanges::new(0, 3, 6, 9),
        )
        .with_ammo(100 / size.max(1))
    }

    /// Target designator
    pub fn tag(id: u32) -> Self {
        let mut weapon = Self::new(
            id,
            "TAG",
            DamageProfile::Fixed { damage: 0 },
            0,
            WeaponRanges::new(0, 5, 10, 15),
        );
        weapon.designator = true;
        weapon
    }

    /// Homing artillery round guided by a designator
    pub fn homing_artillery(id: u32) -> Self {
        let mut weapon = Self::new(
            id,
            "Arrow IV (Homing)",
            DamageProfile::Fixed { damage: 20 },
            10,
            WeaponRanges::new(0, 6, 12, 18),
        )
        .with_ammo(10);
        weapon.homing = true;
        weapon.indirect = true;
        weapon
    }

    /// Zero-damage utility round
    pub fn utility(id: u32, munition: UtilityMunition) -> Self {
        Self::new(
            id,
            "Utility Round",
            DamageProfile::Utility { munition },
            0,
            WeaponRanges::new(0, 7, 14, 21),
        )
        .with_ammo(10)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_range_brackets() {
        let ranges = WeaponRanges::new(0, 3, 6, 9);
        assert_eq!(ranges.bracket(1), RangeBracket::Short);
        assert_eq!(ranges.bracket(3), RangeBracket::Short);
        assert_eq!(ranges.bracket(4), RangeBracket::Medium);
        assert_eq!(ranges.bracket(9), RangeBracket::Long);
        assert_eq!(ranges.bracket(10), RangeBracket::OutOfRange);
        assert_eq!(ranges.bracket(0), RangeBracket::OutOfRange);
    }

    #[test]
    fn test_minimum_range_penalty() {
        let ppc = Weapon::ppc(1);
        assert_eq!(ppc.ranges.minimum_range_penalty(1), 3);
        assert_eq!(ppc.ranges.minimum_range_penalty(3), 1);
        assert_eq!(ppc.ranges.minimum_range_penalty(4), 0);
        assert_eq!(Weapon::medium_laser(1).ranges.minimum_range_penalty(1), 0);
    }

    #[test]
    fn test_forward_arc() {
        assert!(WeaponArc::Forward.covers(0));
        assert!(WeaponArc::Forward.covers(1));
        assert!(WeaponArc::Forward.covers(5));
        assert!(!WeaponArc::Forward.covers(3));
        assert!(WeaponArc::Rear.covers(3));
        assert!(WeaponArc::Turret.covers(3));
    }

    #[test]
    fn test_arm_arcs_extend_to_one_side() {
        assert!(WeaponArc::LeftArm.covers(4));
        assert!(!WeaponArc::LeftArm.covers(2));
        assert!(WeaponArc::RightArm.covers(2));
        assert!(!WeaponArc::RightArm.covers(4));
    }

    #[test]
    fn test_ammo_tracking() {
        let mut ac = Weapon::ac20(1);
        assert!(!ac.is_out_of_ammo());
        ac.ammo = Some(0);
        assert!(ac.is_out_of_ammo());
        assert!(!Weapon::medium_laser(2).is_out_of_ammo());
    }

    #[test]
    fn test_missile_presets() {
        let lrm = Weapon::lrm(1, 10);
        assert!(lrm.is_cluster());
        assert!(lrm.indirect);
        assert_eq!(lrm.heat, 3);
        assert_eq!(Weapon::srm(2, 4).heat, 3);
    }
}
