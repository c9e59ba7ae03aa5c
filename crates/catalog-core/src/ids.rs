//! Identifier types for catalog entities.
//!
//! Jobs and datasets are identified by a `(namespace, name)` pair, runs by a
//! UUID. [`NodeId`] is the discriminated identifier used by lineage graphs and
//! has a stable string form:
//!
//! | Variant | String form |
//! |---------|-------------|
//! | Dataset | `dataset:<namespace>:<name>` |
//! | Dataset field | `datasetField:<namespace>:<name>:<field>` |
//! | Job | `job:<namespace>:<name>` |
//! | Run | `run:<uuid>` |
//!
//! Namespaces frequently contain colons (`postgres://localhost:5432`), so the
//! name is always taken from the text after the *last* colon. Names therefore
//! cannot contain a colon: [`validation::validate_name`](crate::validation::validate_name)
//! rejects them, and an id built in code with such a name does not survive a
//! string round trip.

use crate::validation;
use crate::{CatalogError, Result};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

const DATASET_PREFIX: &str = "dataset";
const DATASET_FIELD_PREFIX: &str = "datasetField";
const JOB_PREFIX: &str = "job";
const RUN_PREFIX: &str = "run";

/// Identity of a job: namespace plus job name.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct JobId {
    pub namespace: String,
    pub name: String,
}

impl JobId {
    pub fn new(namespace: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            namespace: namespace.into(),
            name: name.into(),
        }
    }
}

impl fmt::Display for JobId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.namespace, self.name)
    }
}

/// Identity of a dataset: namespace plus dataset name.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct DatasetId {
    pub namespace: String,
    pub name: String,
}

impl DatasetId {
    pub fn new(namespace: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            namespace: namespace.into(),
            name: name.into(),
        }
    }
}

impl fmt::Display for DatasetId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.namespace, self.name)
    }
}

/// A single field (column) of a dataset.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct DatasetFieldId {
    pub dataset: DatasetId,
    pub field: String,
}

impl DatasetFieldId {
    pub fn new(dataset: DatasetId, field: impl Into<String>) -> Self {
        Self {
            dataset,
            field: field.into(),
        }
    }
}

/// Identity of a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RunId(pub Uuid);

impl RunId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl Default for RunId {
    fn default() -> Self {
        Self::new()
    }
}

impl From<Uuid> for RunId {
    fn from(uuid: Uuid) -> Self {
        Self(uuid)
    }
}

impl fmt::Display for RunId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for RunId {
    type Err = CatalogError;

    fn from_str(s: &str) -> Result<Self> {
        Uuid::parse_str(s.trim())
            .map(RunId)
            .map_err(|e| CatalogError::ValidationError(format!("Invalid run id '{}': {}", s, e)))
    }
}

/// Graph node kind exposed on lineage nodes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum NodeType {
    Dataset,
    Job,
}

impl fmt::Display for NodeType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NodeType::Dataset => write!(f, "DATASET"),
            NodeType::Job => write!(f, "JOB"),
        }
    }
}

/// Discriminated identifier for any node the catalog can address.
///
/// Variant order is the sort order of lineage graphs; it matches the lexical
/// order of the string prefixes.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum NodeId {
    Dataset(DatasetId),
    DatasetField(DatasetFieldId),
    Job(JobId),
    Run(RunId),
}

impl NodeId {
    pub fn job(namespace: impl Into<String>, name: impl Into<String>) -> Self {
        NodeId::Job(JobId::new(namespace, name))
    }

    pub fn dataset(namespace: impl Into<String>, name: impl Into<String>) -> Self {
        NodeId::Dataset(DatasetId::new(namespace, name))
    }

    pub fn is_job(&self) -> bool {
        matches!(self, NodeId::Job(_))
    }

    pub fn is_dataset(&self) -> bool {
        matches!(self, NodeId::Dataset(_))
    }

    pub fn as_job_id(&self) -> Option<&JobId> {
        match self {
            NodeId::Job(id) => Some(id),
            _ => None,
        }
    }

    pub fn as_dataset_id(&self) -> Option<&DatasetId> {
        match self {
            NodeId::Dataset(id) => Some(id),
            _ => None,
        }
    }

    /// The node type for job and dataset ids; `None` for other variants.
    pub fn node_type(&self) -> Option<NodeType> {
        match self {
            NodeId::Dataset(_) => Some(NodeType::Dataset),
            NodeId::Job(_) => Some(NodeType::Job),
            NodeId::DatasetField(_) | NodeId::Run(_) => None,
        }
    }
}

impl From<JobId> for NodeId {
    fn from(id: JobId) -> Self {
        NodeId::Job(id)
    }
}

impl From<DatasetId> for NodeId {
    fn from(id: DatasetId) -> Self {
        NodeId::Dataset(id)
    }
}

impl From<RunId> for NodeId {
    fn from(id: RunId) -> Self {
        NodeId::Run(id)
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NodeId::Dataset(id) => write!(f, "{}:{}", DATASET_PREFIX, id),
            NodeId::DatasetField(id) => {
                write!(f, "{}:{}:{}", DATASET_FIELD_PREFIX, id.dataset, id.field)
            }
            NodeId::Job(id) => write!(f, "{}:{}", JOB_PREFIX, id),
            NodeId::Run(id) => write!(f, "{}:{}", RUN_PREFIX, id),
        }
    }
}

/// Split `namespace:name` at the last colon and validate both halves.
fn split_namespace_and_name(value: &str, original: &str) -> Result<(String, String)> {
    let (namespace, name) = value.rsplit_once(':').ok_or_else(|| {
        CatalogError::ValidationError(format!(
            "Node id '{}' must be of the form <type>:<namespace>:<name>",
            original
        ))
    })?;
    validation::validate_namespace(namespace)?;
    validation::validate_name(name)?;
    Ok((namespace.to_string(), name.to_string()))
}

impl FromStr for NodeId {
    type Err = CatalogError;

    fn from_str(s: &str) -> Result<Self> {
        let (prefix, rest) = s.split_once(':').ok_or_else(|| {
            CatalogError::ValidationError(format!("Node id '{}' is missing a type prefix", s))
        })?;

        match prefix {
            DATASET_PREFIX => {
                let (namespace, name) = split_namespace_and_name(rest, s)?;
                Ok(NodeId::Dataset(DatasetId { namespace, name }))
            }
            JOB_PREFIX => {
                let (namespace, name) = split_namespace_and_name(rest, s)?;
                Ok(NodeId::Job(JobId { namespace, name }))
            }
            DATASET_FIELD_PREFIX => {
                let (dataset, field) = rest.rsplit_once(':').ok_or_else(|| {
                    CatalogError::ValidationError(format!(
                        "Node id '{}' must be of the form datasetField:<namespace>:<name>:<field>",
                        s
                    ))
                })?;
                validation::validate_name(field)?;
                let (namespace, name) = split_namespace_and_name(dataset, s)?;
                Ok(NodeId::DatasetField(DatasetFieldId::new(
                    DatasetId { namespace, name },
                    field,
                )))
            }
            RUN_PREFIX => Ok(NodeId::Run(rest.parse()?)),
            other => Err(CatalogError::ValidationError(format!(
                "Unknown node type '{}' in node id '{}'",
                other, s
            ))),
        }
    }
}

impl Serialize for NodeId {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for NodeId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let value = String::deserialize(deserializer)?;
        value.parse().map_err(serde::de::Error::custom)
    }
}
