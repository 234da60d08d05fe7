//! Error types for multimodel
//!
//! `StoreError` covers the global store itself, `DriverError` is what a
//! connection reports to its caller.

use thiserror::Error;
use crate::core::path::{GlobalRef, Path, PathError};

/// Errors that can occur during store operations
#[derive(Error, Debug)]
pub enum StoreError {
    #[error("Path error: {0}")]
    PathError(#[from] PathError),

    #[error("Value not found at path: {0}")]
    NotFound(Path),

    #[error("Invalid operation: {0}")]
    InvalidOperation(String),

    #[error("Serialization error: {0}")]
    SerializationError(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

/// Result type for store operations
pub type Result<T> = std::result::Result<T, StoreError>;

/// Errors reported by a database connection
#[derive(Error, Debug)]
pub enum DriverError {
    #[error("Connection error: {0}")]
    Connection(String),

    #[error("Schema error: {0}")]
    Schema(String),

    #[error("Persistence error: {0}")]
    Persistence(String),

    #[error("Query error: {0}")]
    Query(String),

    #[error("Undefined: {0}")]
    NotFound(GlobalRef),

    #[error("Store error: {0}")]
    Store(#[from] StoreError),
}

impl From<PathError> for DriverError {
    fn from(e: PathError) -> Self {
        DriverError::Store(StoreError::PathError(e))
    }
}

/// Result type for connection operations
pub type DriverResult<T> = std::result::Result<T, DriverError>;
