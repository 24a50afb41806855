//! Hex coordinate system for the game board (offset coordinates)
//!
//! Boards are addressed by (column, row). Odd columns sit half a hex lower
//! than even ones. Distances and lines are computed by converting to cube
//! coordinates. Directions run clockwise from north: 0 = N, 1 = NE, 2 = SE,
//! 3 = S, 4 = SW, 5 = NW.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Cube direction vectors (x, z), indexed by hex direction
const CUBE_DIRECTIONS: [(i32, i32); 6] = [(0, -1), (1, -1), (1, 0), (0, 1), (-1, 1), (-1, 0)];

/// Offset hex coordinate on the board
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, Default,
)]
pub struct HexCoord {
    pub col: i32,
    pub row: i32,
}

impl HexCoord {
    pub fn new(col: i32, row: i32) -> Self {
        Self { col, row }
    }

    /// Cube (x, z) for this coordinate; y is implied as -x - z
    fn to_cube(self) -> (i32, i32) {
        let x = self.col;
        let z = self.row - (self.col - (self.col & 1)) / 2;
        (x, z)
    }

    fn from_cube(x: i32, z: i32) -> Self {
        let row = z + (x - (x & 1)) / 2;
        Self::new(x, row)
    }

    /// Number of hexes between the two coordinates
    pub fn distance(&self, other: &Self) -> u32 {
        let (ax, az) = self.to_cube();
        let (bx, bz) = other.to_cube();
        let dx = ax - bx;
        let dz = az - bz;
        let dy = -dx - dz;
        ((dx.abs() + dy.abs() + dz.abs()) / 2) as u32
    }

    /// Adjacent coordinate in the given direction
    pub fn translated(&self, facing: Facing) -> Self {
        let (x, z) = self.to_cube();
        let (dx, dz) = CUBE_DIRECTIONS[facing.index()];
        Self::from_cube(x + dx, z + dz)
    }

    /// Get all 6 neighboring hex coordinates, indexed by direction
    pub fn neighbors(&self) -> [HexCoord; 6] {
        let mut out = [*self; 6];
        for (i, slot) in out.iter_mut().enumerate() {
            *slot = self.translated(Facing::new(i as u8));
        }
        out
    }

    /// Direction from this hex toward another, rounded to the nearest hex side
    ///
    /// Returns north for identical coordinates.
    pub fn direction_to(&self, other: &Self) -> Facing {
        let (ax, az) = self.to_cube();
        let (bx, bz) = other.to_cube();
        let dx = (bx - ax) as f64;
        let dz = (bz - az) as f64;
        if dx == 0.0 && dz == 0.0 {
            return Facing::NORTH;
        }

        // Flat-topped pixel layout: +x east, +y south
        let px = 1.5 * dx;
        let py = 3f64.sqrt() * (dz + dx / 2.0);
        let degrees = px.atan2(-py).to_degrees().rem_euclid(360.0);
        Facing::new(((degrees / 60.0).round() as u8) % 6)
    }

    /// Get hex coordinates in a line from self to other (inclusive)
    pub fn line_to(&self, other: &Self) -> Vec<HexCoord> {
        let n = self.distance(other);
        if n == 0 {
            return vec![*self];
        }

        let (ax, az) = self.to_cube();
        let (bx, bz) = other.to_cube();
        // Nudge so lines along hex edges break ties consistently
        let (ax, az) = (ax as f64 + 1e-6, az as f64 + 1e-6);
        let (bx, bz) = (bx as f64 + 1e-6, bz as f64 + 1e-6);

        let mut results = Vec::with_capacity(n as usize + 1);
        for i in 0..=n {
            let t = i as f64 / n as f64;
            let x = ax + (bx - ax) * t;
            let z = az + (bz - az) * t;
            let (rx, rz) = cube_round(x, z);
            results.push(Self::from_cube(rx, rz));
        }
        results
    }

    /// Get all hexes within range (inclusive)
    pub fn hexes_in_range(&self, range: u32) -> Vec<HexCoord> {
        let (cx, cz) = self.to_cube();
        let range = range as i32;
        let mut results = Vec::new();
        for dx in -range..=range {
            for dz in (-range).max(-dx - range)..=range.min(-dx + range) {
                results.push(Self::from_cube(cx + dx, cz + dz));
            }
        }
        results
    }
}

impl fmt::Display for HexCoord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.col, self.row)
    }
}

/// Round fractional cube coordinates to the nearest hex
fn cube_round(x: f64, z: f64) -> (i32, i32) {
    let y = -x - z;
    let mut rx = x.round();
    let ry = y.round();
    let mut rz = z.round();

    let x_diff = (rx - x).abs();
    let y_diff = (ry - y).abs();
    let z_diff = (rz - z).abs();

    if x_diff > y_diff && x_diff > z_diff {
        rx = -ry - rz;
    } else if y_diff <= z_diff {
        rz = -rx - ry;
    }

    (rx as i32, rz as i32)
}

/// Hex-side orientation, 0..=5 clockwise from north
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, Default,
)]
#[serde(from = "u8", into = "u8")]
pub struct Facing(u8);

impl From<u8> for Facing {
    fn from(value: u8) -> Self {
        Facing::new(value)
    }
}

impl From<Facing> for u8 {
    fn from(value: Facing) -> Self {
        value.0
    }
}

impl Facing {
    pub const NORTH: Facing = Facing(0);
    pub const NORTH_EAST: Facing = Facing(1);
    pub const SOUTH_EAST: Facing = Facing(2);
    pub const SOUTH: Facing = Facing(3);
    pub const SOUTH_WEST: Facing = Facing(4);
    pub const NORTH_WEST: Facing = Facing(5);

    /// Wraps any value onto 0..=5
    pub fn new(value: u8) -> Self {
        Self(value % 6)
    }

    pub fn index(&self) -> usize {
        self.0 as usize
    }

    /// Rotate by a signed number of hex sides (positive = clockwise)
    pub fn rotated(&self, sides: i32) -> Self {
        Self((self.0 as i32 + sides).rem_euclid(6) as u8)
    }

    pub fn turned_left(&self) -> Self {
        self.rotated(-1)
    }

    pub fn turned_right(&self) -> Self {
        self.rotated(1)
    }

    pub fn opposite(&self) -> Self {
        self.rotated(3)
    }

    /// Minimum number of hex-side turns between two facings (0..=3)
    pub fn steps_to(&self, other: Facing) -> u8 {
        let diff = (other.0 as i32 - self.0 as i32).rem_euclid(6) as u8;
        diff.min(6 - diff)
    }

    /// Clockwise offset from self to other (0..=5)
    pub fn relative(&self, other: Facing) -> u8 {
        (other.0 as i32 - self.0 as i32).rem_euclid(6) as u8
    }

    /// All six facings in order
    pub fn all() -> [Facing; 6] {
        [
            Facing(0),
            Facing(1),
            Facing(2),
            Facing(3),
            Facing(4),
            Facing(5),
        ]
    }
}

/// Secondary rotation (torso twist / turret) layered on top of a facing
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum Twist {
    #[default]
    None,
    Left,
    Right,
}

impl Twist {
    /// Secondary facing produced by applying this twist to a primary facing
    pub fn apply(&self, facing: Facing) -> Facing {
        match self {
            Twist::None => facing,
            Twist::Left => facing.turned_left(),
            Twist::Right => facing.turned_right(),
        }
    }

    pub fn all() -> [Twist; 3] {
        [Twist::None, Twist::Left, Twist::Right]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hex_coord_creation() {
        let coord = HexCoord::new(5, 10);
        assert_eq!(coord.col, 5);
        assert_eq!(coord.row, 10);
    }

    #[test]
    fn test_hex_distance_same() {
        let a = HexCoord::new(3, 3);
        assert_eq!(a.distance(&a), 0);
    }

    #[test]
    fn test_hex_distance_adjacent() {
        let a = HexCoord::new(4, 4);
        for neighbor in a.neighbors() {
            assert_eq!(a.distance(&neighbor), 1);
        }
    }

    #[test]
    fn test_hex_distance_along_column() {
        let a = HexCoord::new(2, 0);
        let b = HexCoord::new(2, 7);
        assert_eq!(a.distance(&b), 7);
    }

    #[test]
    fn test_odd_column_offset() {
        // Even column: NE neighbor is one row up
        assert_eq!(
            HexCoord::new(0, 5).translated(Facing::NORTH_EAST),
            HexCoord::new(1, 4)
        );
        // Odd column: NE neighbor stays on the same row
        assert_eq!(
            HexCoord::new(1, 5).translated(Facing::NORTH_EAST),
            HexCoord::new(2, 5)
        );
        assert_eq!(
            HexCoord::new(1, 5).translated(Facing::SOUTH_EAST),
            HexCoord::new(2, 6)
        );
    }

    #[test]
    fn test_translate_round_trip() {
        let start = HexCoord::new(6, 6);
        for facing in Facing::all() {
            let there = start.translated(facing);
            assert_eq!(there.translated(facing.opposite()), start);
        }
    }

    #[test]
    fn test_direction_to_neighbors() {
        for col in 3..5 {
            let center = HexCoord::new(col, 4);
            for facing in Facing::all() {
                assert_eq!(center.direction_to(&center.translated(facing)), facing);
            }
        }
    }

    #[test]
    fn test_hex_line() {
        let a = HexCoord::new(0, 0);
        let b = HexCoord::new(0, 3);
        let line = a.line_to(&b);
        assert_eq!(line.len(), 4);
        assert_eq!(line.first(), Some(&a));
        assert_eq!(line.last(), Some(&b));
    }

    #[test]
    fn test_hexes_in_range() {
        let center = HexCoord::new(5, 5);
        assert_eq!(center.hexes_in_range(1).len(), 7);
        assert_eq!(center.hexes_in_range(2).len(), 19);
    }

    #[test]
    fn test_facing_steps() {
        assert_eq!(Facing::NORTH.steps_to(Facing::SOUTH), 3);
        assert_eq!(Facing::NORTH.steps_to(Facing::NORTH_WEST), 1);
        assert_eq!(Facing::NORTH.turned_left(), Facing::NORTH_WEST);
        assert_eq!(Facing::new(7), Facing::NORTH_EAST);
    }

    #[test]
    fn test_twist_does_not_move_primary() {
        let facing = Facing::SOUTH;
        assert_eq!(Twist::Left.apply(facing), Facing::SOUTH_EAST);
        assert_eq!(Twist::Right.apply(facing), Facing::SOUTH_WEST);
        assert_eq!(Twist::None.apply(facing), facing);
    }
}
