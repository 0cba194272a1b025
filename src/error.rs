// Error kinds for the registry and the bulk ingestion source

use crate::schema::ValidationError;
use std::path::PathBuf;
use thiserror::Error;

/// Outcome of a registry operation that did not succeed.
///
/// `NotFound` and `Conflict` are expected lookup/write outcomes, not faults.
#[derive(Debug, Error)]
pub enum RegistryError {
    #[error("{}", join_validation(.0))]
    Validation(Vec<ValidationError>),

    #[error("{0}")]
    NotFound(String),

    #[error("{0}")]
    Conflict(String),

    /// The store failed for a reason other than a uniqueness conflict.
    #[error("{0}")]
    Storage(String),
}

impl From<rusqlite::Error> for RegistryError {
    fn from(err: rusqlite::Error) -> Self {
        RegistryError::Storage(format!("database error: {err}"))
    }
}

impl From<Vec<ValidationError>> for RegistryError {
    fn from(errors: Vec<ValidationError>) -> Self {
        RegistryError::Validation(errors)
    }
}

fn join_validation(errors: &[ValidationError]) -> String {
    errors
        .iter()
        .map(|e| e.to_string())
        .collect::<Vec<_>>()
        .join("; ")
}

pub type RegistryResult<T> = Result<T, RegistryError>;

/// Errors raised while reading a bulk source file.
#[derive(Debug, Error)]
pub enum IngestError {
    #[error("source file not found at: {}", .0.display())]
    FileNotFound(PathBuf),

    #[error("unsupported source format: {0}")]
    UnsupportedFormat(String),

    #[error("missing required columns: {}", .0.join(", "))]
    MissingColumns(Vec<String>),

    #[error("failed to read source: {0}")]
    Read(String),
}

impl From<csv::Error> for IngestError {
    fn from(err: csv::Error) -> Self {
        IngestError::Read(err.to_string())
    }
}

impl From<calamine::Error> for IngestError {
    fn from(err: calamine::Error) -> Self {
        IngestError::Read(err.to_string())
    }
}
