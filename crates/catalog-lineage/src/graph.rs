//! In-memory graph assembly.
//!
//! Every function here is pure: inputs are the rows fetched from the storage
//! collaborator, outputs are new values.

use crate::types::{Edge, Lineage, Node};
use std::collections::{BTreeMap, BTreeSet, HashMap, HashSet};
use strata_catalog_core::{DatasetData, DatasetId, JobData, NodeId, Run};
use uuid::Uuid;

/// Collapse closure rows that repeat a job uuid; the first row wins.
pub(crate) fn dedup_jobs(jobs: Vec<JobData>) -> Vec<JobData> {
    let mut seen = HashSet::with_capacity(jobs.len());
    jobs.into_iter()
        .filter(|job| {
            let fresh = seen.insert(job.uuid);
            if !fresh {
                tracing::debug!(job = %job.id, "Dropping duplicate job from closure");
            }
            fresh
        })
        .collect()
}

/// Attach the first matching run to every job that has no latest run.
///
/// Jobs that already carry a latest run are returned untouched.
pub(crate) fn enrich_with_runs(jobs: Vec<JobData>, runs: &[Run]) -> Vec<JobData> {
    jobs.into_iter()
        .map(|job| {
            if job.latest_run.is_some() {
                return job;
            }
            match runs.iter().find(|run| run.belongs_to(&job.id)) {
                Some(run) => job.with_latest_run(run.clone()),
                None => job,
            }
        })
        .collect()
}

/// Union of every input and output dataset uuid across the closure.
pub(crate) fn dataset_uuids(jobs: &[JobData]) -> BTreeSet<Uuid> {
    jobs.iter()
        .flat_map(|job| job.dataset_uuids().copied())
        .collect()
}

/// A single-node graph holding just the dataset.
pub(crate) fn orphan_lineage(dataset: DatasetData) -> Lineage {
    Lineage::new(vec![Node::dataset(
        dataset,
        BTreeSet::new(),
        BTreeSet::new(),
    )])
}

/// Assemble the bipartite graph.
///
/// Each job/dataset relation produces one [`Edge`] value that is placed on
/// both endpoints, so job and dataset edge sets always agree. Dataset uuids
/// without a fetched dataset are dropped.
pub(crate) fn to_lineage(jobs: Vec<JobData>, datasets: Vec<DatasetData>) -> Lineage {
    let mut dataset_by_uuid: HashMap<Uuid, DatasetId> = HashMap::with_capacity(datasets.len());
    let mut unique_datasets: BTreeMap<DatasetId, DatasetData> = BTreeMap::new();
    for dataset in datasets {
        dataset_by_uuid.insert(dataset.uuid, dataset.id.clone());
        unique_datasets.entry(dataset.id.clone()).or_insert(dataset);
    }

    let resolve = |uuids: &BTreeSet<Uuid>| -> BTreeSet<DatasetId> {
        uuids
            .iter()
            .filter_map(|uuid| dataset_by_uuid.get(uuid))
            .cloned()
            .collect()
    };

    // edges landing on / leaving each dataset, mirrored from the job side
    let mut dataset_in_edges: HashMap<DatasetId, BTreeSet<Edge>> = HashMap::new();
    let mut dataset_out_edges: HashMap<DatasetId, BTreeSet<Edge>> = HashMap::new();
    let mut nodes = Vec::with_capacity(jobs.len() + unique_datasets.len());

    for job in jobs {
        let inputs = resolve(&job.input_uuids);
        let outputs = resolve(&job.output_uuids);
        let job_node_id = NodeId::Job(job.id.clone());

        let mut in_edges = BTreeSet::new();
        for dataset in &inputs {
            let edge = Edge::new(NodeId::Dataset(dataset.clone()), job_node_id.clone());
            dataset_out_edges
                .entry(dataset.clone())
                .or_default()
                .insert(edge.clone());
            in_edges.insert(edge);
        }

        let mut out_edges = BTreeSet::new();
        for dataset in &outputs {
            let edge = Edge::new(job_node_id.clone(), NodeId::Dataset(dataset.clone()));
            dataset_in_edges
                .entry(dataset.clone())
                .or_default()
                .insert(edge.clone());
            out_edges.insert(edge);
        }

        nodes.push(Node::job(
            job.with_dataset_ids(inputs, outputs),
            in_edges,
            out_edges,
        ));
    }

    for (id, dataset) in unique_datasets {
        let in_edges = dataset_in_edges.remove(&id).unwrap_or_default();
        let out_edges = dataset_out_edges.remove(&id).unwrap_or_default();
        nodes.push(Node::dataset(dataset, in_edges, out_edges));
    }

    Lineage::new(nodes)
}
