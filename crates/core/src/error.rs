//! Error types for the core crate.

use thiserror::Error;

/// Failures of the natural-language query interpreter.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum QueryError {
    /// No rule recognized anything in the input text.
    #[error("Unable to parse natural language query")]
    Unparseable,

    /// The text was understood but the resulting length bounds contradict each other.
    #[error("Parsed filters are conflicting: min_length ({min_length}) > max_length ({max_length})")]
    Conflicting { min_length: i64, max_length: i64 },
}

/// Failures while coercing raw query parameters into a filter set.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FilterError {
    /// A parameter value could not be converted to its semantic type.
    #[error("invalid value '{value}' for parameter '{field}'")]
    InvalidParameter { field: &'static str, value: String },
}

/// Failures of record store mutations.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StoreError {
    /// A record with the same content hash is already stored.
    #[error("String already exists in the system")]
    AlreadyExists(String),

    /// No record matches the given hash or value.
    #[error("String does not exist in the system")]
    NotFound(String),
}
