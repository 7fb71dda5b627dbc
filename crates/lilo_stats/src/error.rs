//! Error types for the statistics service.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum StatsError {
    #[error("fetch failed: {0}")]
    Fetch(#[from] lilo_client::LiloError),

    #[error("validation error: {0}")]
    Validation(String),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl StatsError {
    /// Whether the failure came from the backend rather than the request.
    pub fn is_upstream(&self) -> bool {
        match self {
            StatsError::Fetch(e) => !matches!(e, lilo_client::LiloError::InvalidInput(_)),
            _ => false,
        }
    }
}

/// Result type alias for statistics operations.
pub type StatsResult<T> = Result<T, StatsError>;
