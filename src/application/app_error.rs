use thiserror::Error;

#[derive(Error, Debug)]
pub enum AppError {
    #[error("{0}")]
    Conflict(String),

    #[error("{0}")]
    NotFound(String),

    #[error("{0}")]
    Forbidden(String),

    #[error("{0}")]
    Unauthorized(String),

    #[error("{0}")]
    Validation(String),

    #[error("Service temporarily unavailable")]
    Unavailable,

    #[error("Too many requests. Please slow down.")]
    RateLimited,

    #[error("Database error: {0}")]
    Database(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl AppError {
    /// The canonical rejection for missing/invalid/expired/revoked sessions.
    pub fn unauthorized() -> Self {
        AppError::Unauthorized("Session expired or unauthorized. Please sign in again.".into())
    }
}

pub type AppResult<T> = Result<T, AppError>;
