//! Error types for hit parsing, filtering and selection.
//!
//! None of these are transient: they either point at malformed upstream data
//! (a corrupt alignment table or an incompatible reference database) or at a
//! caller breaking a contract, so nothing here is retried.

use thiserror::Error;

/// Errors raised by the hit selection engine and its adapters
#[derive(Debug, Error)]
pub enum HitError {
    /// A raw alignment record lacks a required field
    #[error("Key '{field}' missing from alignment record")]
    MalformedRecord { field: String },

    /// A field is present but its value cannot be parsed
    #[error("Invalid value '{value}' for field '{field}'")]
    InvalidField { field: String, value: String },

    /// Statistics rejected at construction time
    #[error("Invalid alignment statistics: {0}")]
    InvalidStatistics(String),

    /// Subject id without the `{index}__{name}__{allele}` structure
    #[error("Subject id '{subject_id}' is not in '{{index}}__{{cluster}}__{{allele}}__{{id}}' format")]
    MalformedSubjectId { subject_id: String },

    /// Best hit selection invoked on an empty group
    #[error("Input list is empty")]
    EmptyInput,

    /// Caller supplied an inconsistent configuration
    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),

    /// Sequence id not present in the database mapping
    #[error("No sequence with id '{0}' in mapping")]
    UnknownSequence(String),

    /// Metadata key absent for a mapped sequence
    #[error("Key '{key}' not found in metadata of '{seq_id}'")]
    MissingMetadata { seq_id: String, key: String },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl HitError {
    pub(crate) fn missing(field: &str) -> Self {
        HitError::MalformedRecord {
            field: field.to_string(),
        }
    }

    pub(crate) fn invalid(field: &str, value: &str) -> Self {
        HitError::InvalidField {
            field: field.to_string(),
            value: value.to_string(),
        }
    }
}

/// Result type alias for engine operations
pub type Result<T> = std::result::Result<T, HitError>;
