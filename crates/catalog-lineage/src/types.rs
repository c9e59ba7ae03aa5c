//! Graph types returned by the lineage service.
//!
//! A [`Lineage`] is a bipartite directed graph: every [`Edge`] connects a job
//! node to a dataset node or a dataset node to a job node. Nodes are
//! snapshots built once per call; they are never persisted.

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use strata_catalog_core::{
    DatasetData, DatasetSummary, JobData, JobSummary, NodeId, NodeType, RunSummary,
};

/// A directed edge between two nodes.
///
/// Edges are derived from job inputs and outputs, never stored.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Edge {
    pub origin: NodeId,
    pub destination: NodeId,
}

impl Edge {
    pub fn new(origin: NodeId, destination: NodeId) -> Self {
        Self {
            origin,
            destination,
        }
    }

    /// Returns true if the edge joins a job and a dataset.
    pub fn is_bipartite(&self) -> bool {
        matches!(
            (&self.origin, &self.destination),
            (NodeId::Job(_), NodeId::Dataset(_)) | (NodeId::Dataset(_), NodeId::Job(_))
        )
    }
}

/// Node payload.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum NodeData {
    Job(JobData),
    Dataset(DatasetData),
}

/// A node of a lineage graph.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Node {
    pub id: NodeId,
    #[serde(rename = "type")]
    pub node_type: NodeType,
    pub data: NodeData,
    pub in_edges: BTreeSet<Edge>,
    pub out_edges: BTreeSet<Edge>,
}

impl Node {
    /// A job node; its id is derived from the job identity.
    pub fn job(data: JobData, in_edges: BTreeSet<Edge>, out_edges: BTreeSet<Edge>) -> Self {
        Self {
            id: NodeId::Job(data.id.clone()),
            node_type: NodeType::Job,
            data: NodeData::Job(data),
            in_edges,
            out_edges,
        }
    }

    /// A dataset node; its id is derived from the dataset identity.
    pub fn dataset(data: DatasetData, in_edges: BTreeSet<Edge>, out_edges: BTreeSet<Edge>) -> Self {
        Self {
            id: NodeId::Dataset(data.id.clone()),
            node_type: NodeType::Dataset,
            data: NodeData::Dataset(data),
            in_edges,
            out_edges,
        }
    }

    pub fn as_job(&self) -> Option<&JobData> {
        match &self.data {
            NodeData::Job(job) => Some(job),
            NodeData::Dataset(_) => None,
        }
    }

    pub fn as_dataset(&self) -> Option<&DatasetData> {
        match &self.data {
            NodeData::Dataset(dataset) => Some(dataset),
            NodeData::Job(_) => None,
        }
    }

    pub fn edges(&self) -> impl Iterator<Item = &Edge> {
        self.in_edges.iter().chain(self.out_edges.iter())
    }
}

/// A lineage graph. Nodes are sorted by [`NodeId`] and unique by id.
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct Lineage {
    pub graph: Vec<Node>,
}

impl Lineage {
    /// Build a graph from nodes in any order.
    ///
    /// When two nodes share an id the first one wins.
    pub fn new(mut nodes: Vec<Node>) -> Self {
        // stable sort keeps the first of equal ids in front for dedup
        nodes.sort_by(|a, b| a.id.cmp(&b.id));
        nodes.dedup_by(|later, earlier| later.id == earlier.id);
        Self { graph: nodes }
    }

    pub fn empty() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.graph.is_empty()
    }

    pub fn len(&self) -> usize {
        self.graph.len()
    }

    pub fn nodes(&self) -> &[Node] {
        &self.graph
    }

    /// Look up a node by id.
    pub fn node(&self, id: &NodeId) -> Option<&Node> {
        self.graph
            .binary_search_by(|node| node.id.cmp(id))
            .ok()
            .map(|idx| &self.graph[idx])
    }

    /// Every edge of the graph, each reported once.
    pub fn edges(&self) -> BTreeSet<&Edge> {
        self.graph.iter().flat_map(Node::edges).collect()
    }
}

/// One run of the upstream chain with every input it read.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UpstreamRun {
    pub job: JobSummary,
    pub run: RunSummary,
    pub inputs: Vec<DatasetSummary>,
}

/// Runs upstream of a run, in discovery order.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct UpstreamRunLineage {
    pub runs: Vec<UpstreamRun>,
}

impl UpstreamRunLineage {
    pub fn is_empty(&self) -> bool {
        self.runs.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use strata_catalog_core::{DatasetId, JobId};
    use uuid::Uuid;

    fn dataset_node(name: &str) -> Node {
        Node::dataset(
            DatasetData::new(Uuid::new_v4(), DatasetId::new("warehouse", name), Utc::now()),
            BTreeSet::new(),
            BTreeSet::new(),
        )
    }

    fn job_node(name: &str) -> Node {
        Node::job(
            JobData::new(Uuid::new_v4(), JobId::new("etl", name), Utc::now()),
            BTreeSet::new(),
            BTreeSet::new(),
        )
    }

    #[test]
    fn test_lineage_sorts_and_dedups() {
        let mut first_orders = dataset_node("orders");
        first_orders.in_edges.insert(Edge::new(
            NodeId::job("etl", "load"),
            NodeId::dataset("warehouse", "orders"),
        ));

        let lineage = Lineage::new(vec![
            job_node("load"),
            first_orders.clone(),
            dataset_node("customers"),
            dataset_node("orders"),
        ]);

        let ids: Vec<String> = lineage.nodes().iter().map(|n| n.id.to_string()).collect();
        assert_eq!(
            ids,
            vec![
                "dataset:warehouse:customers",
                "dataset:warehouse:orders",
                "job:etl:load",
            ]
        );
        let orders = lineage
            .node(&NodeId::dataset("warehouse", "orders"))
            .unwrap();
        assert_eq!(orders, &first_orders);
    }

    #[test]
    fn test_edge_bipartite() {
        assert!(Edge::new(NodeId::job("a", "j"), NodeId::dataset("a", "d")).is_bipartite());
        assert!(Edge::new(NodeId::dataset("a", "d"), NodeId::job("a", "j")).is_bipartite());
        assert!(!Edge::new(NodeId::job("a", "j"), NodeId::job("a", "k")).is_bipartite());
    }

    #[test]
    fn test_node_serialization_shape() {
        let node = job_node("load");
        let json = serde_json::to_value(&node).unwrap();
        assert_eq!(json["id"], "job:etl:load");
        assert_eq!(json["type"], "JOB");
        assert_eq!(json["data"]["id"]["name"], "load");
        assert!(json["in_edges"].as_array().unwrap().is_empty());
    }
}
