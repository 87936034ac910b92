// Defines the application error type and a result type alias using the thiserror crate.
use thiserror::Error;

// Make the response module public
pub mod response;
pub mod notify;

// Re-export commonly used types
pub use notify::{NotifyError, NotifyResult};

#[derive(Error, Debug)]
pub enum AppError {
    #[error("{0}")]
    Validation(String),

    #[error("{0}")]
    NotFound(String),

    #[error("{0}")]
    Unauthorized(String),

    // Eligibility gate on taking a new task
    #[error("{0}")]
    Cooldown(String),

    #[error("{0}")]
    Conflict(String),

    #[error("Upload error: {0}")]
    Upload(String),

    #[error("{0}")]
    Internal(String),

    // The #[from] attribute automatically converts a redis::RedisError into an AppError::Redis using the From trait.
    #[error("Redis error: {0}")]
    Redis(#[from] redis::RedisError),

    #[error("File error: {0}")]
    File(#[from] std::io::Error),
}

// Custom result type
pub type AppResult<T> = Result<T, AppError>;
