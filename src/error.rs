//! Error types for the boxguard library.
//!
//! This module provides custom error types using `thiserror` for better error handling
//! and more specific error messages throughout the application.

use thiserror::Error;

/// Errors that can occur in the boxguard application.
#[derive(Error, Debug)]
pub enum BoxguardError {
    /// Role or ownership check failed
    #[error("Access denied: {0}")]
    AccessDenied(String),

    /// Move, box, item, or user does not resolve
    #[error("Not found: {0}")]
    NotFound(String),

    /// Move status change not allowed by the transition table
    #[error("Invalid status transition: {from} -> {to}")]
    InvalidTransition { from: String, to: String },

    /// Invalid or out-of-range input
    #[error("Validation error: {0}")]
    Validation(String),

    /// Storage slot errors
    #[error("Storage error: {0}")]
    Storage(#[from] sled::Error),

    /// Serialization/deserialization errors
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Binary serialization errors
    #[error("Binary serialization error: {0}")]
    Bincode(#[from] bincode::Error),

    /// CSV writer errors
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// File I/O errors
    #[error("File I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// General error with context
    #[error("{0}")]
    Other(String),
}

/// Convenience type alias for Result with BoxguardError
pub type Result<T> = std::result::Result<T, BoxguardError>;

impl From<anyhow::Error> for BoxguardError {
    fn from(err: anyhow::Error) -> Self {
        BoxguardError::Other(err.to_string())
    }
}
