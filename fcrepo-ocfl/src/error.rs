//! Error types for fcrepo-ocfl

use thiserror::Error;

/// Result type alias using our Error
pub type Result<T> = std::result::Result<T, OcflError>;

/// OCFL storage error type
#[derive(Error, Debug)]
pub enum OcflError {
    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON (de)serialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Inventory could not be read or failed internal checks
    #[error("Corrupt inventory: {0}")]
    CorruptInventory(String),

    /// Resource or version not found
    #[error("Not found: {0}")]
    NotFound(String),

    /// Invalid argument or object state
    #[error("Validation error: {0}")]
    Validation(String),
}

impl OcflError {
    /// Create a corrupt-inventory error
    pub fn corrupt_inventory(msg: impl Into<String>) -> Self {
        OcflError::CorruptInventory(msg.into())
    }

    /// Create a not-found error
    pub fn not_found(msg: impl Into<String>) -> Self {
        OcflError::NotFound(msg.into())
    }

    /// Create a validation error
    pub fn validation(msg: impl Into<String>) -> Self {
        OcflError::Validation(msg.into())
    }
}
