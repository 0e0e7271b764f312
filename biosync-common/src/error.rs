//! Common error types for BioSync
//!
//! The taxonomy mirrors how failures surface to API clients: `InvalidInput`
//! covers the "bad request" class (missing required fields, unverifiable
//! participant references), `NotFound` covers point updates addressing an
//! rlims id that does not exist. Everything else is infrastructure.

use thiserror::Error;

/// Common result type for BioSync operations
pub type Result<T> = std::result::Result<T, Error>;

/// Common error types across BioSync services
#[derive(Error, Debug)]
pub enum Error {
    /// Database operation error (wraps sqlx::Error)
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// I/O operation error (wraps std::io::Error)
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Configuration loading or validation error
    #[error("Configuration error: {0}")]
    Config(String),

    /// No specimen or aliquot behind the addressed rlims id
    #[error("Not found: {0}")]
    NotFound(String),

    /// Client-side validation failure, reported with a reason string
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Internal error
    #[error("Internal error: {0}")]
    Internal(String),
}

impl Error {
    /// Validation failure naming every missing required field in one
    /// message, in contract field order
    pub fn missing_fields(fields: &[&str]) -> Self {
        Error::InvalidInput(format!("Missing fields: {}", fields.join(", ")))
    }
}
