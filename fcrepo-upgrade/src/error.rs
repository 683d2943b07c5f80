//! Error types for the migration engine

use thiserror::Error;

/// Result type alias using our Error
pub type Result<T> = std::result::Result<T, UpgradeError>;

/// Migration error type
#[derive(Error, Debug)]
pub enum UpgradeError {
    /// Unparseable RDF document or sidecar JSON in the export
    #[error("Source corrupt: {0}")]
    SourceCorrupt(String),

    /// A required predicate is absent from a resource's RDF
    #[error("Missing required field {field} on resource {id}")]
    MissingField { id: String, field: String },

    /// A resource of a kind the migration does not handle; logged and
    /// skipped, never fatal
    #[error("Unsupported resource: {0}")]
    UnsupportedResource(String),

    /// OCFL write or commit failure
    #[error("Storage error: {0}")]
    Storage(#[from] fcrepo_ocfl::OcflError),

    /// Generic filesystem error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Invalid migration configuration
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// The task manager is no longer accepting work
    #[error("Task manager is shutting down")]
    Cancelled,
}

impl UpgradeError {
    /// Create a source-corrupt error
    pub fn source_corrupt(msg: impl Into<String>) -> Self {
        UpgradeError::SourceCorrupt(msg.into())
    }

    /// Create a missing-field error
    pub fn missing_field(id: impl Into<String>, field: impl Into<String>) -> Self {
        UpgradeError::MissingField {
            id: id.into(),
            field: field.into(),
        }
    }

    /// Create an unsupported-resource error
    pub fn unsupported(msg: impl Into<String>) -> Self {
        UpgradeError::UnsupportedResource(msg.into())
    }

    /// Create an invalid-configuration error
    pub fn invalid_config(msg: impl Into<String>) -> Self {
        UpgradeError::InvalidConfig(msg.into())
    }
}
