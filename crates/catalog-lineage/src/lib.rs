//! Job and dataset lineage for the Strata catalog.
//!
//! This crate turns the raw rows returned by a storage collaborator into the
//! two provenance views the catalog exposes:
//!
//! - **Lineage graphs**: given a job or dataset and a depth, a deduplicated,
//!   deterministically ordered, bipartite graph of job and dataset nodes with
//!   edges in both directions
//! - **Upstream run chains**: given a run, every run that produced a dataset
//!   version it read, recursively, each listed once with all of its inputs
//!
//! The closures themselves (which jobs are reachable, which runs are
//! upstream) are computed by the collaborator behind
//! [`LineageDao`](strata_catalog_core::LineageDao); this crate performs
//! run enrichment, consistency checks and graph assembly in memory.
//!
//! # Degradation
//!
//! Only a node id that is neither a job nor a dataset is rejected
//! ([`LineageError::InvalidNodeKind`]). A dataset whose jobs vanished, or
//! whose jobs no longer reference it, yields an *orphan graph* holding just
//! that dataset.
//!
//! # Example
//!
//! ```
//! use std::sync::Arc;
//! use strata_catalog_core::NodeId;
//! use strata_catalog_lineage::LineageService;
//! use strata_catalog_storage::InMemoryCatalog;
//!
//! let service = LineageService::from_backend(Arc::new(InMemoryCatalog::new()));
//!
//! let lineage = service
//!     .lineage(&NodeId::dataset("warehouse", "orders"), 10, false)
//!     .unwrap();
//! assert!(lineage.is_empty());
//!
//! let run: NodeId = "run:6f1c1a9e-0f0e-4b8e-9a57-2f4c8d3b1a10".parse().unwrap();
//! assert!(service.lineage(&run, 10, false).is_err());
//! ```

mod config;
mod error;
mod graph;
mod service;
mod types;

pub use config::{
    LineageConfig, LineageConfigBuilder, ENV_DEFAULT_DEPTH, ENV_MAX_DEPTH, ENV_RUN_FACETS,
};
pub use error::{LineageError, Result};
pub use service::{group_upstream_rows, LineageService};
pub use types::{Edge, Lineage, Node, NodeData, UpstreamRun, UpstreamRunLineage};
