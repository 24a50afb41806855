//! Heat-constrained firing plans

pub mod optimizer;
pub mod plan;
pub mod planner;

pub use optimizer::{optimize, optimize_arcs};
pub use plan::FiringPlan;
pub use planner::{FiringPlanner, TargetPreferences, TargetState};
