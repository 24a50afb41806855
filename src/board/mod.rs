//! Hex board: coordinates, facings, terrain and line of sight

pub mod hex;
pub mod map;
pub mod terrain;

pub use hex::{Facing, HexCoord, Twist};
pub use map::{Board, BoardEdge, Hex, LineOfSight};
pub use terrain::Terrain;
