//! Bot façade and per-unit turn phases

#[allow(clippy::module_inception)]
pub mod bot;
pub mod turn;

pub use bot::TacticalBot;
pub use turn::{TurnTracker, UnitPhase};
