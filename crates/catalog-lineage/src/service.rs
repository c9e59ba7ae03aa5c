//! Lineage graph builder and upstream run tracer.

use crate::config::LineageConfig;
use crate::error::{LineageError, Result};
use crate::graph;
use crate::types::{Lineage, UpstreamRun, UpstreamRunLineage};
use indexmap::IndexMap;
use std::collections::BTreeSet;
use std::sync::Arc;
use strata_catalog_core::{DatasetId, JobDao, LineageDao, NodeId, RunId, UpstreamRunRow};
use uuid::Uuid;

/// Builds lineage graphs and upstream run chains from a storage collaborator.
///
/// The service holds no mutable state; clones share the same collaborators
/// and calls may run concurrently.
#[derive(Clone)]
pub struct LineageService {
    lineage_dao: Arc<dyn LineageDao>,
    job_dao: Arc<dyn JobDao>,
    config: LineageConfig,
}

impl std::fmt::Debug for LineageService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LineageService")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl LineageService {
    /// Create a service with the default configuration.
    pub fn new(lineage_dao: Arc<dyn LineageDao>, job_dao: Arc<dyn JobDao>) -> Self {
        Self::with_config(lineage_dao, job_dao, LineageConfig::default())
    }

    pub fn with_config(
        lineage_dao: Arc<dyn LineageDao>,
        job_dao: Arc<dyn JobDao>,
        config: LineageConfig,
    ) -> Self {
        Self {
            lineage_dao,
            job_dao,
            config,
        }
    }

    /// Create a service from a single collaborator implementing both traits.
    pub fn from_backend<B>(backend: Arc<B>) -> Self
    where
        B: LineageDao + JobDao + 'static,
    {
        Self::new(backend.clone(), backend)
    }

    pub fn config(&self) -> &LineageConfig {
        &self.config
    }

    /// Lineage graph around `node_id` using the configured defaults.
    pub fn lineage_with_defaults(&self, node_id: &NodeId) -> Result<Lineage> {
        self.lineage(
            node_id,
            self.config.default_depth,
            self.config.with_run_facets,
        )
    }

    /// Build the lineage graph around a job or dataset.
    ///
    /// Returns [`LineageError::InvalidNodeKind`] for any other node id. Every
    /// data inconsistency degrades to the orphan graph of the requested
    /// dataset (or an empty graph when there is no dataset to show).
    pub fn lineage(&self, node_id: &NodeId, depth: u32, with_run_facets: bool) -> Result<Lineage> {
        let depth = self.config.clamp_depth(depth, 0);
        tracing::debug!(node = %node_id, depth, "Attempting to get lineage");

        let Some(job_uuid) = self.job_uuid(node_id)? else {
            tracing::warn!(
                node = %node_id,
                "Failed to get job associated with node, returning orphan graph"
            );
            return self.orphan_lineage(node_id);
        };

        tracing::debug!(job = %job_uuid, "Attempting to get lineage for job");
        let jobs = self
            .lineage_dao
            .get_lineage(&BTreeSet::from([job_uuid]), depth)?;
        let jobs = graph::dedup_jobs(jobs);

        // runs cannot be fetched for an empty job set
        if jobs.is_empty() {
            tracing::warn!(
                job = %job_uuid,
                node = %node_id,
                "Failed to get lineage for job associated with node, returning orphan graph"
            );
            return self.orphan_lineage(node_id);
        }

        let job_uuids: BTreeSet<Uuid> = jobs.iter().map(|job| job.uuid).collect();
        let runs = if with_run_facets {
            self.lineage_dao.get_current_runs_with_facets(&job_uuids)?
        } else {
            self.lineage_dao.get_current_runs(&job_uuids)?
        };
        let jobs = graph::enrich_with_runs(jobs, &runs);

        let dataset_uuids = graph::dataset_uuids(&jobs);
        let datasets = if dataset_uuids.is_empty() {
            Vec::new()
        } else {
            self.lineage_dao.get_dataset_data(&dataset_uuids)?
        };

        if let Some(requested) = node_id.as_dataset_id() {
            if !datasets.iter().any(|dataset| &dataset.id == requested) {
                let job_ids: Vec<String> = jobs.iter().map(|job| job.id.to_string()).collect();
                tracing::warn!(
                    jobs = ?job_ids,
                    node = %node_id,
                    "Found jobs which no longer share lineage with dataset, discarding"
                );
                return self.orphan_dataset(requested);
            }
        }

        let lineage = graph::to_lineage(jobs, datasets);
        tracing::debug!(node = %node_id, nodes = lineage.len(), "Built lineage graph");
        Ok(lineage)
    }

    /// Resolve a node id to the uuid of the job lineage is traversed from.
    ///
    /// Jobs resolve by name; datasets resolve to a job that reads or writes
    /// them, chosen by the collaborator.
    pub fn job_uuid(&self, node_id: &NodeId) -> Result<Option<Uuid>> {
        match node_id {
            NodeId::Job(job) => Ok(self
                .job_dao
                .find_job_by_name(&job.namespace, &job.name)?
                .map(|row| row.uuid)),
            NodeId::Dataset(dataset) => Ok(self
                .lineage_dao
                .find_job_uuid_for_dataset(&dataset.name, &dataset.namespace)?),
            NodeId::DatasetField(_) | NodeId::Run(_) => {
                Err(LineageError::InvalidNodeKind(node_id.to_string()))
            }
        }
    }

    fn orphan_lineage(&self, node_id: &NodeId) -> Result<Lineage> {
        match node_id.as_dataset_id() {
            Some(dataset) => self.orphan_dataset(dataset),
            None => {
                tracing::warn!(
                    node = %node_id,
                    "No dataset to fall back on, returning empty graph"
                );
                Ok(Lineage::empty())
            }
        }
    }

    fn orphan_dataset(&self, dataset_id: &DatasetId) -> Result<Lineage> {
        match self
            .lineage_dao
            .get_dataset_data_by_name(&dataset_id.namespace, &dataset_id.name)?
        {
            Some(dataset) => Ok(graph::orphan_lineage(dataset)),
            None => {
                tracing::warn!(dataset = %dataset_id, "Dataset not found, returning empty graph");
                Ok(Lineage::empty())
            }
        }
    }

    /// Trace the runs upstream of `run_id`: run, the dataset versions it
    /// read, the runs that produced them, and so on up to `depth` levels.
    ///
    /// An unknown run yields an empty lineage.
    pub fn upstream(&self, run_id: &RunId, depth: u32) -> Result<UpstreamRunLineage> {
        let depth = self.config.clamp_depth(depth, 0);
        tracing::debug!(run_id = %run_id, depth, "Attempting to get upstream runs");
        let rows = self.lineage_dao.get_upstream_runs(run_id, depth)?;
        Ok(group_upstream_rows(rows))
    }
}

/// Group flat upstream rows by run, keeping first-seen run order.
pub fn group_upstream_rows(rows: Vec<UpstreamRunRow>) -> UpstreamRunLineage {
    let mut grouped: IndexMap<RunId, Vec<UpstreamRunRow>> = IndexMap::new();
    for row in rows {
        grouped.entry(row.run.id).or_default().push(row);
    }

    let runs = grouped
        .into_values()
        .filter_map(|rows| {
            let mut rows = rows.into_iter();
            let first = rows.next()?;
            let mut inputs: Vec<_> = first.input.into_iter().collect();
            inputs.extend(rows.filter_map(|row| row.input));
            Some(UpstreamRun {
                job: first.job,
                run: first.run,
                inputs,
            })
        })
        .collect();

    UpstreamRunLineage { runs }
}
