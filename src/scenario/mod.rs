//! Scenario files for the command line runner and tests

pub mod loader;

pub use loader::{load_scenario, weapon_preset, Scenario};
