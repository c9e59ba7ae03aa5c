//! Error types for lineage graph construction.

use strata_catalog_core::CatalogError;
use thiserror::Error;

/// Errors that can occur while building lineage.
///
/// Data inconsistencies never surface here; they degrade to orphan or
/// partial graphs instead.
#[derive(Debug, Error)]
pub enum LineageError {
    /// The node id is neither a job nor a dataset
    #[error("Node '{0}' must be of type dataset or job")]
    InvalidNodeKind(String),

    /// Invalid lineage configuration
    #[error("Configuration error: {0}")]
    Config(String),

    /// The storage collaborator failed
    #[error("Storage error: {0}")]
    Storage(#[from] CatalogError),
}

impl LineageError {
    /// Returns true if the caller sent a request that can never succeed.
    pub fn is_caller_error(&self) -> bool {
        matches!(self, LineageError::InvalidNodeKind(_))
    }
}

/// A specialized Result type for lineage operations.
pub type Result<T> = std::result::Result<T, LineageError>;
