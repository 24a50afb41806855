//! Path ranking: behavior profiles, domain strategies and the ranker

pub mod behavior;
pub mod domain;
pub mod ranked;
pub mod ranker;

pub use behavior::{load_behavior, BehaviorProfile, Waypoint};
pub use domain::{AerospaceScoring, DomainContext, DomainScoring, DomainStrategies, GroundScoring, InfantryScoring};
pub use ranked::{RankedPath, ScoreBreakdown};
pub use ranker::{PathRanker, RankingContext};
