//! JSON snapshots used to seed an [`InMemoryCatalog`](crate::InMemoryCatalog).
//!
//! A snapshot is the storage-side view of the catalog, so unlike the lineage
//! output it carries entity uuids and job input/output uuids:
//!
//! ```json
//! {
//!   "datasets": [{ "uuid": "…", "id": { "namespace": "warehouse", "name": "orders" },
//!                  "created_at": "2024-01-01T00:00:00Z", "updated_at": "2024-01-01T00:00:00Z" }],
//!   "jobs": [{ "uuid": "…", "id": { "namespace": "etl", "name": "load_orders" },
//!              "created_at": "…", "updated_at": "…", "output_uuids": ["…"] }],
//!   "runs": [{ "job_uuid": "…", "input_versions": [], "run": { … } }],
//!   "dataset_versions": [{ "uuid": "…", "dataset_uuid": "…", "produced_by": "…" }]
//! }
//! ```

use serde::{Deserialize, Serialize};
use std::path::Path;
use strata_catalog_core::{DatasetData, JobData, Result, Run, RunId};
use uuid::Uuid;

/// A run plus the storage relations the lineage queries need.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunRecord {
    pub run: Run,
    /// Job that owns the run
    pub job_uuid: Uuid,
    /// Version of the job the run executed, if tracked
    #[serde(default)]
    pub job_version: Option<Uuid>,
    /// Dataset versions the run read, in read order
    #[serde(default)]
    pub input_versions: Vec<Uuid>,
}

impl RunRecord {
    pub fn new(run: Run, job_uuid: Uuid) -> Self {
        Self {
            run,
            job_uuid,
            job_version: None,
            input_versions: Vec::new(),
        }
    }

    pub fn with_input_versions(mut self, versions: impl IntoIterator<Item = Uuid>) -> Self {
        self.input_versions = versions.into_iter().collect();
        self
    }
}

/// A version of a dataset and the run that wrote it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DatasetVersion {
    pub uuid: Uuid,
    pub dataset_uuid: Uuid,
    #[serde(default)]
    pub produced_by: Option<RunId>,
}

/// Full contents of an in-memory catalog.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CatalogSnapshot {
    #[serde(default)]
    pub datasets: Vec<DatasetData>,
    #[serde(default)]
    pub jobs: Vec<JobData>,
    #[serde(default)]
    pub runs: Vec<RunRecord>,
    #[serde(default)]
    pub dataset_versions: Vec<DatasetVersion>,
}

impl CatalogSnapshot {
    /// Parse a snapshot from a JSON string.
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Read and parse a snapshot file.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let contents = std::fs::read_to_string(path.as_ref())?;
        Self::from_json(&contents)
    }
}
