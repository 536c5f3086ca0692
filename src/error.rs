//! Error types for filehost.

use thiserror::Error;

/// Common error type for filehost.
#[derive(Error, Debug)]
pub enum FilehostError {
    /// Database error.
    ///
    /// Database errors from sqlx are automatically converted.
    #[error("database error: {0}")]
    Database(String),

    /// Database connection error.
    #[error("database connection error: {0}")]
    DatabaseConnection(String),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Authentication error.
    #[error("authentication error: {0}")]
    Auth(String),

    /// Permission denied error.
    #[error("permission denied: {0}")]
    Permission(String),

    /// Validation error for user input.
    #[error("validation error: {0}")]
    Validation(String),

    /// Resource not found.
    #[error("{0} not found")]
    NotFound(String),

    /// Page template error.
    #[error("template error: {0}")]
    Template(String),

    /// Configuration error.
    #[error("configuration error: {0}")]
    Config(String),
}

impl From<sqlx::Error> for FilehostError {
    fn from(e: sqlx::Error) -> Self {
        FilehostError::Database(e.to_string())
    }
}

impl From<minijinja::Error> for FilehostError {
    fn from(e: minijinja::Error) -> Self {
        FilehostError::Template(e.to_string())
    }
}

/// Result type alias for filehost operations.
pub type Result<T> = std::result::Result<T, FilehostError>;
