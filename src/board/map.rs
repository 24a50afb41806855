//! Game board with hex grid, terrain, elevation and line of sight

use serde::{Deserialize, Serialize};

use crate::board::hex::HexCoord;
use crate::board::terrain::Terrain;

/// Intervening woods at or above this total block line of sight
pub const WOODS_LOS_LIMIT: i32 = 3;

/// A single hex on the board
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct Hex {
    pub terrain: Terrain,
    pub elevation: i8,
}

/// Board edges, used for withdrawal and aerospace border handling
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum BoardEdge {
    North,
    #[default]
    South,
    East,
    West,
}

/// Result of a line of sight query
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct LineOfSight {
    pub blocked: bool,
    /// Sum of intervening woods modifiers
    pub woods_modifier: i32,
}

/// The full board
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Board {
    width: u32,
    height: u32,
    hexes: Vec<Hex>,
}

impl Board {
    /// Create a new board with clear terrain
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            hexes: vec![Hex::default(); (width * height) as usize],
        }
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    fn index(&self, coord: HexCoord) -> Option<usize> {
        if self.in_bounds(coord) {
            Some(coord.row as usize * self.width as usize + coord.col as usize)
        } else {
            None
        }
    }

    /// Check if coordinate is within board bounds
    pub fn in_bounds(&self, coord: HexCoord) -> bool {
        coord.col >= 0
            && coord.row >= 0
            && coord.col < self.width as i32
            && coord.row < self.height as i32
    }

    /// Get a hex at the given coordinate
    pub fn hex(&self, coord: HexCoord) -> Option<&Hex> {
        self.index(coord).map(|i| &self.hexes[i])
    }

    /// Terrain at a coordinate (clear when off-board)
    pub fn terrain(&self, coord: HexCoord) -> Terrain {
        self.hex(coord).map(|h| h.terrain).unwrap_or_default()
    }

    /// Elevation at a coordinate (0 when off-board)
    pub fn elevation(&self, coord: HexCoord) -> i8 {
        self.hex(coord).map(|h| h.elevation).unwrap_or(0)
    }

    /// Set terrain at a coordinate; ignored when off-board
    pub fn set_terrain(&mut self, coord: HexCoord, terrain: Terrain) {
        if let Some(i) = self.index(coord) {
            self.hexes[i].terrain = terrain;
        }
    }

    /// Set elevation at a coordinate; ignored when off-board
    pub fn set_elevation(&mut self, coord: HexCoord, elevation: i8) {
        if let Some(i) = self.index(coord) {
            self.hexes[i].elevation = elevation;
        }
    }

    /// Number of hexes between a coordinate and a board edge
    pub fn distance_to_edge(&self, coord: HexCoord, edge: BoardEdge) -> u32 {
        let d = match edge {
            BoardEdge::North => coord.row,
            BoardEdge::South => self.height as i32 - 1 - coord.row,
            BoardEdge::West => coord.col,
            BoardEdge::East => self.width as i32 - 1 - coord.col,
        };
        d.max(0) as u32
    }

    /// Distance to whichever edge is closest
    pub fn distance_to_nearest_edge(&self, coord: HexCoord) -> u32 {
        [
            BoardEdge::North,
            BoardEdge::South,
            BoardEdge::East,
            BoardEdge::West,
        ]
        .iter()
        .map(|edge| self.distance_to_edge(coord, *edge))
        .min()
        .unwrap_or(0)
    }

    /// Check line of sight between two hexes
    ///
    /// Only intervening hexes count: the attacker's and target's own hexes
    /// never block. A hex blocks when it holds a building or rises above both
    /// endpoints; woods accumulate and block at [`WOODS_LOS_LIMIT`].
    pub fn line_of_sight(&self, from: HexCoord, to: HexCoord) -> LineOfSight {
        let line = from.line_to(&to);
        let top = self.elevation(from).max(self.elevation(to));
        let mut los = LineOfSight::default();

        for coord in line.iter().skip(1).take(line.len().saturating_sub(2)) {
            let Some(hex) = self.hex(*coord) else {
                continue;
            };
            if hex.terrain.blocks_los() || hex.elevation > top {
                los.blocked = true;
                return los;
            }
            los.woods_modifier += hex.terrain.woods_modifier();
        }

        if los.woods_modifier >= WOODS_LOS_LIMIT {
            los.blocked = true;
        }
        los
    }
}
