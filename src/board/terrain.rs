//! Board terrain types and their effects
//!
//! Terrain feeds movement cost, line of sight and to-hit modifiers.

use serde::{Deserialize, Serialize};

/// Primary terrain type for a hex
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum Terrain {
    #[default]
    Clear,
    Pavement,
    Rough,
    Rubble,
    LightWoods,
    HeavyWoods,
    Water {
        depth: u8,
    },
    Building,
}

impl Terrain {
    /// Movement points to enter this terrain on foot or legs
    pub fn movement_cost(&self) -> u32 {
        match self {
            Terrain::Clear | Terrain::Pavement => 1,
            Terrain::Rough | Terrain::Rubble => 2,
            Terrain::LightWoods => 2,
            Terrain::HeavyWoods => 3,
            Terrain::Water { depth: 0 } => 1,
            Terrain::Water { depth: 1 } => 2,
            Terrain::Water { .. } => 4,
            Terrain::Building => 2,
        }
    }

    /// To-hit modifier for a target standing in (or a line passing through) this hex
    pub fn woods_modifier(&self) -> i32 {
        match self {
            Terrain::LightWoods => 1,
            Terrain::HeavyWoods => 2,
            _ => 0,
        }
    }

    /// Does this terrain block line of sight on its own?
    pub fn blocks_los(&self) -> bool {
        matches!(self, Terrain::Building)
    }

    /// Does a unit in this hex get partial cover?
    pub fn partial_cover(&self) -> bool {
        matches!(self, Terrain::Water { depth: 1 })
    }

    /// Cover that infantry can hide in
    pub fn is_infantry_cover(&self) -> bool {
        matches!(
            self,
            Terrain::LightWoods | Terrain::HeavyWoods | Terrain::Building | Terrain::Rubble
        )
    }

    /// Depth of water in this hex (0 for dry terrain)
    pub fn water_depth(&self) -> u8 {
        match self {
            Terrain::Water { depth } => *depth,
            _ => 0,
        }
    }

    /// Piloting roll modifier for entering this terrain, if it forces a roll
    pub fn entry_piloting_modifier(&self) -> Option<i32> {
        match self {
            Terrain::Water { depth: 0 } => None,
            Terrain::Water { depth: 1 } => Some(-1),
            Terrain::Water { depth: 2 } => Some(0),
            Terrain::Water { .. } => Some(1),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clear_terrain_no_penalty() {
        assert_eq!(Terrain::Clear.movement_cost(), 1);
        assert_eq!(Terrain::Clear.woods_modifier(), 0);
    }

    #[test]
    fn test_woods_costs_ordered() {
        assert!(Terrain::HeavyWoods.movement_cost() > Terrain::LightWoods.movement_cost());
        assert!(Terrain::HeavyWoods.woods_modifier() > Terrain::LightWoods.woods_modifier());
    }

    #[test]
    fn test_water_depth_costs() {
        assert_eq!(Terrain::Water { depth: 1 }.movement_cost(), 2);
        assert_eq!(Terrain::Water { depth: 3 }.movement_cost(), 4);
        assert!(Terrain::Water { depth: 1 }.partial_cover());
        assert!(!Terrain::Water { depth: 2 }.partial_cover());
    }

    #[test]
    fn test_water_forces_piloting_roll() {
        assert_eq!(Terrain::Water { depth: 1 }.entry_piloting_modifier(), Some(-1));
        assert_eq!(Terrain::Clear.entry_piloting_modifier(), None);
    }

    #[test]
    fn test_building_blocks_los() {
        assert!(Terrain::Building.blocks_los());
        assert!(!Terrain::HeavyWoods.blocks_los());
    }
}
