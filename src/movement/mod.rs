//! Movement: steps, paths and path enumeration

pub mod enumerator;
pub mod path;
pub mod step;

pub use enumerator::{EnumerationResult, PathEnumerator};
pub use path::{MovePath, SearchKey, StepContext};
pub use step::{Maneuver, MoveStep, StepType, AIRBORNE_STEPS, GROUND_STEPS};
