//! Row types exchanged between the lineage engine and its storage collaborator.

use crate::ids::{DatasetId, JobId, RunId};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::hash::{Hash, Hasher};
use uuid::Uuid;

/// Kind of job as reported by the integration that registered it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "UPPERCASE")]
pub enum JobType {
    #[default]
    Batch,
    Stream,
    Service,
}

/// Lifecycle state of a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "UPPERCASE")]
pub enum RunState {
    #[default]
    New,
    Running,
    Completed,
    Aborted,
    Failed,
}

impl RunState {
    /// Returns true once the run can no longer change state.
    pub fn is_done(&self) -> bool {
        matches!(
            self,
            RunState::Completed | RunState::Aborted | RunState::Failed
        )
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            RunState::New => "NEW",
            RunState::Running => "RUNNING",
            RunState::Completed => "COMPLETED",
            RunState::Aborted => "ABORTED",
            RunState::Failed => "FAILED",
        }
    }
}

impl std::fmt::Display for RunState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A run of a job.
///
/// The owning job is referenced by `(job_namespace, job_name)` so that runs
/// can be correlated with jobs when no id-based join is available.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Run {
    pub id: RunId,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    #[serde(default)]
    pub state: RunState,
    pub started_at: Option<DateTime<Utc>>,
    pub ended_at: Option<DateTime<Utc>>,
    pub job_namespace: String,
    pub job_name: String,
    /// Run facets; only present when fetched with facets.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub facets: Option<serde_json::Value>,
}

impl Run {
    /// Returns true if this run belongs to the given job.
    ///
    /// Namespace and name are compared exactly.
    pub fn belongs_to(&self, job: &JobId) -> bool {
        self.job_namespace == job.namespace && self.job_name == job.name
    }

    pub fn without_facets(mut self) -> Self {
        self.facets = None;
        self
    }
}

/// A job together with the dataset uuids it currently reads and writes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JobData {
    #[serde(default, skip_serializing)]
    pub uuid: Uuid,
    pub id: JobId,
    #[serde(rename = "type", default)]
    pub job_type: JobType,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub location: Option<String>,
    #[serde(default, skip_serializing)]
    pub input_uuids: BTreeSet<Uuid>,
    #[serde(default, skip_serializing)]
    pub output_uuids: BTreeSet<Uuid>,
    /// Input datasets resolved during graph assembly.
    #[serde(default)]
    pub inputs: BTreeSet<DatasetId>,
    /// Output datasets resolved during graph assembly.
    #[serde(default)]
    pub outputs: BTreeSet<DatasetId>,
    #[serde(default)]
    pub latest_run: Option<Run>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent_job_uuid: Option<Uuid>,
}

impl JobData {
    pub fn new(uuid: Uuid, id: JobId, created_at: DateTime<Utc>) -> Self {
        Self {
            uuid,
            id,
            job_type: JobType::default(),
            created_at,
            updated_at: created_at,
            description: None,
            location: None,
            input_uuids: BTreeSet::new(),
            output_uuids: BTreeSet::new(),
            inputs: BTreeSet::new(),
            outputs: BTreeSet::new(),
            latest_run: None,
            parent_job_uuid: None,
        }
    }

    pub fn with_input_uuids(mut self, uuids: impl IntoIterator<Item = Uuid>) -> Self {
        self.input_uuids = uuids.into_iter().collect();
        self
    }

    pub fn with_output_uuids(mut self, uuids: impl IntoIterator<Item = Uuid>) -> Self {
        self.output_uuids = uuids.into_iter().collect();
        self
    }

    /// Copy of this job with `latest_run` set.
    pub fn with_latest_run(self, run: Run) -> Self {
        Self {
            latest_run: Some(run),
            ..self
        }
    }

    /// Copy of this job with its resolved input and output datasets set.
    pub fn with_dataset_ids(
        self,
        inputs: BTreeSet<DatasetId>,
        outputs: BTreeSet<DatasetId>,
    ) -> Self {
        Self {
            inputs,
            outputs,
            ..self
        }
    }

    /// All dataset uuids this job reads or writes.
    pub fn dataset_uuids(&self) -> impl Iterator<Item = &Uuid> {
        self.input_uuids.iter().chain(self.output_uuids.iter())
    }
}

/// A field of a dataset schema.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DatasetField {
    pub name: String,
    #[serde(rename = "type")]
    pub field_type: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
}

/// A dataset as presented on lineage graph nodes.
///
/// Equality and hashing use `id` only, so two values describing the same
/// dataset collapse to one map key regardless of their other fields.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatasetData {
    #[serde(default, skip_serializing)]
    pub uuid: Uuid,
    pub id: DatasetId,
    #[serde(rename = "type", default = "default_dataset_type")]
    pub dataset_type: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    #[serde(default)]
    pub source_name: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub fields: Vec<DatasetField>,
    #[serde(default)]
    pub last_modified_at: Option<DateTime<Utc>>,
}

fn default_dataset_type() -> String {
    "DB_TABLE".to_string()
}

impl DatasetData {
    pub fn new(uuid: Uuid, id: DatasetId, created_at: DateTime<Utc>) -> Self {
        Self {
            uuid,
            id,
            dataset_type: default_dataset_type(),
            created_at,
            updated_at: created_at,
            source_name: None,
            description: None,
            fields: Vec::new(),
            last_modified_at: None,
        }
    }
}

impl PartialEq for DatasetData {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for DatasetData {}

impl Hash for DatasetData {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}

/// Minimal job row returned by job lookups.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JobRow {
    pub uuid: Uuid,
    pub id: JobId,
}

/// Job columns of an upstream run row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JobSummary {
    pub namespace: String,
    pub name: String,
    pub version: Option<Uuid>,
}

/// Run columns of an upstream run row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunSummary {
    pub id: RunId,
    pub started_at: Option<DateTime<Utc>>,
    pub ended_at: Option<DateTime<Utc>>,
    pub status: RunState,
}

/// Dataset version columns of an upstream run row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DatasetSummary {
    pub namespace: String,
    pub name: String,
    pub version: Uuid,
    pub produced_by_run_id: Option<RunId>,
}

/// One row of the recursive upstream closure: a run and one of its inputs.
///
/// A run that read nothing yields a single row with `input` set to `None`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UpstreamRunRow {
    pub job: JobSummary,
    pub run: RunSummary,
    pub input: Option<DatasetSummary>,
}
