use thiserror::Error;

use crate::common::ParticipantId;

/// Participant store errors
#[derive(Error, Debug)]
pub enum ParticipantError {
    /// Opt-in without a saved profile
    #[error("Participant {0} has not registered a profile")]
    NotRegistered(ParticipantId),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Non-SQL backends (in-memory stores, tests)
    #[error("Storage error: {0}")]
    Storage(String),
}
