//! Vector store error types.

use thiserror::Error;

/// Errors that can occur during store and index operations.
#[derive(Debug, Error)]
pub enum VectorError {
    /// Group was never created in this store
    #[error("Group not found: {0}")]
    GroupNotFound(String),

    /// Group name cannot be used as a file stem
    #[error("Invalid group name for persistence: {0:?}")]
    InvalidGroupName(String),

    /// Dimension mismatch
    #[error("Dimension mismatch: expected {expected}, got {actual}")]
    DimensionMismatch { expected: usize, actual: usize },

    /// Batch ids and vector rows differ in count
    #[error("Batch length mismatch: {ids} ids for {rows} vectors")]
    BatchLengthMismatch { ids: usize, rows: usize },

    /// Vector not found
    #[error("Vector not found: {0}")]
    NotFound(u64),

    /// Batch retrieval where some ids are absent
    #[error("Batch lookup incomplete: {missing} of {requested} ids not found")]
    PartialHit { missing: usize, requested: usize },

    /// usearch index error
    #[error("Index error: {0}")]
    Index(String),

    /// Index file is not in the expected format
    #[error("Invalid index file: {0}")]
    InvalidIndexFile(String),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialization(String),
}
