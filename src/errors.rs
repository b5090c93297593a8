use std::io;

use thiserror::Error;

use crate::types::ColumnName;

/// Error type for storage access, dataset shape, and feature derivation failures.
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("unable to connect to the database at '{location}': {reason}")]
    Connection { location: String, reason: String },
    #[error("query failed: {0}")]
    Query(#[from] rusqlite::Error),
    #[error("required column '{column}' is missing from the dataset")]
    MissingColumn { column: ColumnName },
    #[error("column '{column}' already exists in the dataset")]
    DuplicateColumn { column: ColumnName },
    #[error("column '{column}' has {got} rows, expected {expected}")]
    LengthMismatch {
        column: ColumnName,
        expected: usize,
        got: usize,
    },
    #[error("invalid target '{0}': expected 'severity_final' or 'priority_final'")]
    InvalidTarget(String),
    #[error("column '{column}' row {row}: expected {expected}, found {found}")]
    TypeMismatch {
        column: ColumnName,
        row: usize,
        expected: &'static str,
        found: &'static str,
    },
    #[error("invalid vocabulary: {0}")]
    InvalidVocabulary(String),
    #[error("configuration error: {0}")]
    Configuration(String),
    #[error(transparent)]
    Io(#[from] io::Error),
    #[error("serialization failed: {0}")]
    Serialization(#[from] serde_json::Error),
}
