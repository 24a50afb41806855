//! Tactician - tactical decision engine for hex-grid combat bots
//!
//! For each unit it controls, the bot enumerates the paths the unit can
//! take this turn, estimates the fire it could deal and receive at each end
//! state, and picks the path with the best tactical utility. Firing plans
//! are chosen by a heat-constrained knapsack over the unit's weapons.

pub mod board;
pub mod bot;
pub mod combat;
pub mod core;
pub mod firing;
pub mod movement;
pub mod precognition;
pub mod ranking;
pub mod rules;
pub mod scenario;
pub mod units;

pub use crate::bot::TacticalBot;
pub use crate::core::config::BotConfig;
pub use crate::core::error::{Result, TacticsError};
