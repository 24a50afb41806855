//! Game rules consumed by the decision engine

pub mod dice;
pub mod engine;
pub mod to_hit;

pub use engine::{PilotingRoll, RulesEngine, StandardRules};
pub use to_hit::{base_to_hit, ShotContext, ToHitData, ToHitModifier};
