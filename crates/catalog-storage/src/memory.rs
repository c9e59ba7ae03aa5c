//! In-memory implementation of the lineage storage traits.

use crate::snapshot::{CatalogSnapshot, DatasetVersion, RunRecord};
use parking_lot::RwLock;
use std::cmp::Reverse;
use std::collections::{BTreeMap, BTreeSet, HashSet};
use std::path::Path;
use strata_catalog_core::{
    DatasetData, DatasetSummary, JobDao, JobData, JobRow, JobSummary, LineageDao, Result, Run,
    RunId, RunSummary, UpstreamRunRow,
};
use uuid::Uuid;

#[derive(Debug, Default)]
struct Tables {
    datasets: BTreeMap<Uuid, DatasetData>,
    jobs: BTreeMap<Uuid, JobData>,
    runs: BTreeMap<RunId, RunRecord>,
    versions: BTreeMap<Uuid, DatasetVersion>,
}

impl Tables {
    fn current_run(&self, job_uuid: &Uuid) -> Option<&Run> {
        self.runs
            .values()
            .filter(|record| &record.job_uuid == job_uuid)
            .map(|record| &record.run)
            .max_by(|a, b| a.created_at.cmp(&b.created_at).then(a.id.cmp(&b.id)))
    }

    fn current_runs(&self, job_uuids: &BTreeSet<Uuid>) -> Vec<Run> {
        job_uuids
            .iter()
            .filter_map(|uuid| self.current_run(uuid))
            .cloned()
            .collect()
    }

    fn dataset_summary(&self, version_uuid: &Uuid) -> Option<DatasetSummary> {
        let version = self.versions.get(version_uuid)?;
        let dataset = self.datasets.get(&version.dataset_uuid)?;
        Some(DatasetSummary {
            namespace: dataset.id.namespace.clone(),
            name: dataset.id.name.clone(),
            version: version.uuid,
            produced_by_run_id: version.produced_by,
        })
    }
}

/// Thread-safe in-memory catalog.
///
/// Every fetch takes a read lock for its whole duration, so a fetch never
/// observes a half-applied insert.
#[derive(Debug, Default)]
pub struct InMemoryCatalog {
    tables: RwLock<Tables>,
}

impl InMemoryCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a catalog from a parsed snapshot.
    pub fn from_snapshot(snapshot: CatalogSnapshot) -> Self {
        let catalog = Self::new();
        for dataset in snapshot.datasets {
            catalog.insert_dataset(dataset);
        }
        for job in snapshot.jobs {
            catalog.insert_job(job);
        }
        for version in snapshot.dataset_versions {
            catalog.insert_dataset_version(version);
        }
        for run in snapshot.runs {
            catalog.insert_run(run);
        }
        catalog
    }

    /// Load a catalog from a JSON snapshot file.
    pub fn load_snapshot(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let snapshot = CatalogSnapshot::from_path(path)?;
        tracing::debug!(
            path = %path.display(),
            datasets = snapshot.datasets.len(),
            jobs = snapshot.jobs.len(),
            runs = snapshot.runs.len(),
            "Loaded catalog snapshot"
        );
        Ok(Self::from_snapshot(snapshot))
    }

    /// Insert or replace a dataset.
    pub fn insert_dataset(&self, dataset: DatasetData) {
        self.tables.write().datasets.insert(dataset.uuid, dataset);
    }

    /// Insert or replace a job.
    pub fn insert_job(&self, job: JobData) {
        self.tables.write().jobs.insert(job.uuid, job);
    }

    /// Insert or replace a run.
    pub fn insert_run(&self, record: RunRecord) {
        self.tables.write().runs.insert(record.run.id, record);
    }

    /// Insert or replace a dataset version.
    pub fn insert_dataset_version(&self, version: DatasetVersion) {
        self.tables.write().versions.insert(version.uuid, version);
    }

    /// Remove a job, returning it if it existed.
    pub fn remove_job(&self, job_uuid: &Uuid) -> Option<JobData> {
        self.tables.write().jobs.remove(job_uuid)
    }

    /// Replace what a job reads and writes.
    pub fn set_job_io(
        &self,
        job_uuid: &Uuid,
        inputs: impl IntoIterator<Item = Uuid>,
        outputs: impl IntoIterator<Item = Uuid>,
    ) -> bool {
        let mut tables = self.tables.write();
        match tables.jobs.get_mut(job_uuid) {
            Some(job) => {
                job.input_uuids = inputs.into_iter().collect();
                job.output_uuids = outputs.into_iter().collect();
                true
            }
            None => false,
        }
    }

    pub fn dataset_count(&self) -> usize {
        self.tables.read().datasets.len()
    }

    pub fn job_count(&self) -> usize {
        self.tables.read().jobs.len()
    }
}

impl JobDao for InMemoryCatalog {
    fn find_job_by_name(&self, namespace: &str, name: &str) -> Result<Option<JobRow>> {
        let tables = self.tables.read();
        Ok(tables
            .jobs
            .values()
            .find(|job| job.id.namespace == namespace && job.id.name == name)
            .map(|job| JobRow {
                uuid: job.uuid,
                id: job.id.clone(),
            }))
    }
}

impl LineageDao for InMemoryCatalog {
    /// Producers of the dataset win over consumers, then the most recently
    /// updated job, then `(namespace, name)`.
    fn find_job_uuid_for_dataset(&self, name: &str, namespace: &str) -> Result<Option<Uuid>> {
        let tables = self.tables.read();
        let Some(dataset_uuid) = tables
            .datasets
            .values()
            .find(|ds| ds.id.namespace == namespace && ds.id.name == name)
            .map(|ds| ds.uuid)
        else {
            return Ok(None);
        };

        let candidate = tables
            .jobs
            .values()
            .filter_map(|job| {
                let produces = job.output_uuids.contains(&dataset_uuid);
                let consumes = job.input_uuids.contains(&dataset_uuid);
                (produces || consumes).then_some((!produces, Reverse(job.updated_at), job))
            })
            .min_by(|a, b| (a.0, a.1).cmp(&(b.0, b.1)).then_with(|| a.2.id.cmp(&b.2.id)))
            .map(|(_, _, job)| job.uuid);

        Ok(candidate)
    }

    fn get_lineage(&self, job_uuids: &BTreeSet<Uuid>, depth: u32) -> Result<Vec<JobData>> {
        let tables = self.tables.read();

        let mut visited: BTreeSet<Uuid> = job_uuids
            .iter()
            .filter(|uuid| tables.jobs.contains_key(uuid))
            .copied()
            .collect();
        let mut frontier: Vec<Uuid> = visited.iter().copied().collect();
        let mut closure: Vec<JobData> = frontier
            .iter()
            .filter_map(|uuid| tables.jobs.get(uuid))
            .cloned()
            .collect();

        for _ in 0..depth {
            if frontier.is_empty() {
                break;
            }
            let frontier_datasets: HashSet<Uuid> = frontier
                .iter()
                .filter_map(|uuid| tables.jobs.get(uuid))
                .flat_map(|job| job.dataset_uuids().copied())
                .collect();

            let next: Vec<Uuid> = tables
                .jobs
                .values()
                .filter(|job| !visited.contains(&job.uuid))
                .filter(|job| job.dataset_uuids().any(|ds| frontier_datasets.contains(ds)))
                .map(|job| job.uuid)
                .collect();

            for uuid in &next {
                visited.insert(*uuid);
                if let Some(job) = tables.jobs.get(uuid) {
                    closure.push(job.clone());
                }
            }
            frontier = next;
        }

        tracing::debug!(
            seeds = job_uuids.len(),
            depth,
            jobs = closure.len(),
            "Computed job closure"
        );
        Ok(closure)
    }

    fn get_current_runs(&self, job_uuids: &BTreeSet<Uuid>) -> Result<Vec<Run>> {
        let tables = self.tables.read();
        Ok(tables
            .current_runs(job_uuids)
            .into_iter()
            .map(Run::without_facets)
            .collect())
    }

    fn get_current_runs_with_facets(&self, job_uuids: &BTreeSet<Uuid>) -> Result<Vec<Run>> {
        Ok(self.tables.read().current_runs(job_uuids))
    }

    fn get_dataset_data(&self, dataset_uuids: &BTreeSet<Uuid>) -> Result<Vec<DatasetData>> {
        let tables = self.tables.read();
        Ok(dataset_uuids
            .iter()
            .filter_map(|uuid| tables.datasets.get(uuid))
            .cloned()
            .collect())
    }

    fn get_dataset_data_by_name(
        &self,
        namespace: &str,
        name: &str,
    ) -> Result<Option<DatasetData>> {
        let tables = self.tables.read();
        Ok(tables
            .datasets
            .values()
            .find(|ds| ds.id.namespace == namespace && ds.id.name == name)
            .cloned())
    }

    /// Breadth-first over runs. Each run is emitted once, at the level it is
    /// first reached; rows within a level are ordered by job then run id.
    fn get_upstream_runs(&self, run_id: &RunId, depth: u32) -> Result<Vec<UpstreamRunRow>> {
        let tables = self.tables.read();
        if !tables.runs.contains_key(run_id) {
            return Ok(Vec::new());
        }

        let mut rows = Vec::new();
        let mut seen: HashSet<RunId> = HashSet::from([*run_id]);
        let mut level = vec![*run_id];
        let mut current_depth = 0;

        while !level.is_empty() {
            let mut records: Vec<&RunRecord> =
                level.iter().filter_map(|id| tables.runs.get(id)).collect();
            records.sort_by(|a, b| {
                (&a.run.job_namespace, &a.run.job_name, a.run.id).cmp(&(
                    &b.run.job_namespace,
                    &b.run.job_name,
                    b.run.id,
                ))
            });

            let mut next = Vec::new();
            for record in records {
                let job = JobSummary {
                    namespace: record.run.job_namespace.clone(),
                    name: record.run.job_name.clone(),
                    version: record.job_version,
                };
                let run = RunSummary {
                    id: record.run.id,
                    started_at: record.run.started_at,
                    ended_at: record.run.ended_at,
                    status: record.run.state,
                };

                let inputs: Vec<DatasetSummary> = record
                    .input_versions
                    .iter()
                    .filter_map(|version| tables.dataset_summary(version))
                    .collect();

                if inputs.is_empty() {
                    rows.push(UpstreamRunRow {
                        job,
                        run,
                        input: None,
                    });
                    continue;
                }

                for input in inputs {
                    if current_depth < depth {
                        if let Some(producer) = input.produced_by_run_id {
                            if seen.insert(producer) {
                                next.push(producer);
                            }
                        }
                    }
                    rows.push(UpstreamRunRow {
                        job: job.clone(),
                        run: run.clone(),
                        input: Some(input),
                    });
                }
            }

            level = next;
            current_depth += 1;
        }

        tracing::debug!(run_id = %run_id, depth, rows = rows.len(), "Computed upstream runs");
        Ok(rows)
    }
}
