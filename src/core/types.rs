//! Core type definitions used throughout the codebase

use derive_more::Display;
use serde::{Deserialize, Serialize};

/// Unique identifier for units on the battlefield
#[derive(
    Debug, Display, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[display(fmt = "unit#{}", _0)]
pub struct UnitId(pub u32);

impl UnitId {
    pub fn new(id: u32) -> Self {
        Self(id)
    }
}

/// Identifier of a weapon, unique within its unit
#[derive(
    Debug, Display, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[display(fmt = "weapon#{}", _0)]
pub struct WeaponId(pub u32);

impl WeaponId {
    pub fn new(id: u32) -> Self {
        Self(id)
    }
}

/// Identifier of the player (side) that owns a unit
#[derive(
    Debug, Display, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[display(fmt = "player#{}", _0)]
pub struct PlayerId(pub u32);

impl PlayerId {
    pub fn new(id: u32) -> Self {
        Self(id)
    }
}

/// Game round counter
pub type Round = u32;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unit_id_ordering() {
        assert!(UnitId(1) < UnitId(2));
        assert_eq!(UnitId::new(7), UnitId(7));
    }

    #[test]
    fn test_id_display() {
        assert_eq!(UnitId(3).to_string(), "unit#3");
        assert_eq!(WeaponId(12).to_string(), "weapon#12");
        assert_eq!(PlayerId(0).to_string(), "player#0");
    }

    #[test]
    fn test_unit_id_hash() {
        use std::collections::HashMap;
        let mut map: HashMap<UnitId, &str> = HashMap::new();
        map.insert(UnitId(1), "atlas");
        assert_eq!(map.get(&UnitId(1)), Some(&"atlas"));
    }
}
