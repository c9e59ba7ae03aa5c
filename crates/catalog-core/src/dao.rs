//! Storage collaborator traits consumed by the lineage engine.
//!
//! The engine never builds queries itself. Implementations own the closure
//! computations (bounded job closure, recursive upstream runs) and return
//! plain rows; the engine performs enrichment and assembly in memory.
//!
//! Calls are ordinary blocking calls. Implementations must be safe to share
//! between threads; callers impose deadlines at this boundary.

use crate::ids::RunId;
use crate::models::{DatasetData, JobData, JobRow, Run, UpstreamRunRow};
use crate::Result;
use std::collections::BTreeSet;
use uuid::Uuid;

/// Job lookups.
pub trait JobDao: Send + Sync {
    /// Find a job by namespace and name.
    fn find_job_by_name(&self, namespace: &str, name: &str) -> Result<Option<JobRow>>;
}

/// Lineage queries.
pub trait LineageDao: Send + Sync {
    /// Find a job that reads or writes the given dataset.
    ///
    /// When several jobs qualify, the implementation decides which one wins.
    fn find_job_uuid_for_dataset(&self, name: &str, namespace: &str) -> Result<Option<Uuid>>;

    /// Jobs reachable from `job_uuids` over shared input/output datasets,
    /// at most `depth` hops away.
    fn get_lineage(&self, job_uuids: &BTreeSet<Uuid>, depth: u32) -> Result<Vec<JobData>>;

    /// Current run of each job, without facets.
    fn get_current_runs(&self, job_uuids: &BTreeSet<Uuid>) -> Result<Vec<Run>>;

    /// Current run of each job, including run facets.
    fn get_current_runs_with_facets(&self, job_uuids: &BTreeSet<Uuid>) -> Result<Vec<Run>>;

    /// Datasets for the given uuids; unknown uuids are skipped.
    fn get_dataset_data(&self, dataset_uuids: &BTreeSet<Uuid>) -> Result<Vec<DatasetData>>;

    /// A single dataset by namespace and name.
    fn get_dataset_data_by_name(&self, namespace: &str, name: &str)
        -> Result<Option<DatasetData>>;

    /// Flat rows of the recursive run → input version → producing run closure
    /// starting at `run_id`, at most `depth` levels above it.
    fn get_upstream_runs(&self, run_id: &RunId, depth: u32) -> Result<Vec<UpstreamRunRow>>;
}
