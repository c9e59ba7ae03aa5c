//! Strata Catalog Core
//!
//! Identifiers, row types, storage collaborator traits and errors shared by
//! the Strata lineage engine and its storage backends.

pub mod dao;
pub mod ids;
pub mod models;
pub mod validation;

pub use dao::{JobDao, LineageDao};
pub use ids::{DatasetFieldId, DatasetId, JobId, NodeId, NodeType, RunId};
pub use models::{
    DatasetData, DatasetField, DatasetSummary, JobData, JobRow, JobSummary, JobType, Run,
    RunState, RunSummary, UpstreamRunRow,
};

/// Errors that can occur in catalog operations
#[derive(Debug, thiserror::Error)]
pub enum CatalogError {
    #[error("Dataset not found: {0}")]
    DatasetNotFound(String),

    #[error("Job not found: {0}")]
    JobNotFound(String),

    #[error("Serialization error: {0}")]
    SerializationError(String),

    #[error("Validation error: {0}")]
    ValidationError(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Other error: {0}")]
    Other(String),
}

impl From<serde_json::Error> for CatalogError {
    fn from(err: serde_json::Error) -> Self {
        CatalogError::SerializationError(err.to_string())
    }
}

/// Result type for catalog operations
pub type Result<T> = std::result::Result<T, CatalogError>;
