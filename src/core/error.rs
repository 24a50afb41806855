use thiserror::Error;

use crate::bot::UnitPhase;
use crate::core::types::UnitId;

/// Errors surfaced at the edges of the engine.
///
/// Nothing inside a decision fails the turn: impossible attacks become zero
/// probabilities and exhausted budgets become best-so-far results. These
/// variants cover what the caller handed us or the plumbing around it.
#[derive(Error, Debug)]
pub enum TacticsError {
    #[error("Unit not found: {0}")]
    UnitNotFound(UnitId),

    #[error("Unit already committed its move this turn: {0}")]
    AlreadyCommitted(UnitId),

    #[error("Unit {unit} cannot go from {from:?} to {to:?}")]
    PhaseChange {
        unit: UnitId,
        from: UnitPhase,
        to: UnitPhase,
    },

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Scenario error: {0}")]
    Scenario(String),

    #[error("Precognition worker is no longer running")]
    PrecognitionClosed,

    #[error("Precognition reply dropped: {0}")]
    PrecognitionReply(#[from] tokio::sync::oneshot::error::RecvError),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("TOML error: {0}")]
    TomlError(#[from] toml::de::Error),

    #[error("Serialization error: {0}")]
    SerdeError(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, TacticsError>;
