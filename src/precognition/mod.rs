//! Background path enumeration between decisions

pub mod cache;
pub mod handle;
pub mod worker;

pub use cache::{CachedPaths, PathCache};
pub use handle::PrecognitionHandle;
pub use worker::{Command, Precognition, PrecognitionStatus};
