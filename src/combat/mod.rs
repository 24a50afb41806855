//! Combat estimation: hit probability, expected damage, kill chance

pub mod divergence;
pub mod estimator;
pub mod shot;

pub use divergence::{DivergenceStats, DivergenceTracker};
pub use estimator::{CombatEstimator, EstimateMode, EstimateOptions};
pub use shot::{damage_on_hit, WeaponShot};
