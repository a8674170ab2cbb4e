use crate::types::{Cents, RoundIndex};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum SimError {
    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error(
        "Invariant violation: path '{path}' produced payout {actual} \
         at round index {round}, but was first recorded with {expected}"
    )]
    InvariantViolation {
        path: String,
        expected: Cents,
        actual: Cents,
        round: RoundIndex,
    },

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

pub type SimResult<T> = Result<T, SimError>;
