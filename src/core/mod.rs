pub mod config;
pub mod error;
pub mod types;

pub use config::BotConfig;
pub use error::{Result, TacticsError};
pub use types::{PlayerId, Round, UnitId, WeaponId};
