//! Units, weapons and battlefield snapshots

pub mod battlefield;
pub mod state;
pub mod unit;
pub mod weapon;

pub use battlefield::Battlefield;
pub use state::{MovementType, Posture, UnitState};
pub use unit::{Armor, Domain, HitLocation, Unit, UnitStatus};
pub use weapon::{
    DamageProfile, RangeBracket, UtilityMunition, Weapon, WeaponArc, WeaponRanges,
};
