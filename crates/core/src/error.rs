use hms_types::{RangeError, TextError};

/// Errors raised by the hospital use cases and their repositories.
///
/// The first four variants carry a message that is safe to hand back to a caller. `Database`
/// wraps the driver error and should only ever be logged.
#[derive(Debug, thiserror::Error)]
pub enum ServiceError {
    #[error("{0}")]
    NotFound(String),
    #[error("{0}")]
    InvalidInput(String),
    #[error("{0}")]
    Conflict(String),
    #[error("{0}")]
    Unavailable(String),
    #[error("{0}")]
    Internal(String),
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
    #[error("invalid text: {0}")]
    Text(#[from] TextError),
    #[error("invalid time range: {0}")]
    Range(#[from] RangeError),
}

impl ServiceError {
    /// True for errors caused by the caller rather than by this service.
    pub fn is_client_error(&self) -> bool {
        matches!(
            self,
            ServiceError::NotFound(_)
                | ServiceError::InvalidInput(_)
                | ServiceError::Conflict(_)
                | ServiceError::Text(_)
                | ServiceError::Range(_)
        )
    }
}

pub type ServiceResult<T> = std::result::Result<T, ServiceError>;
