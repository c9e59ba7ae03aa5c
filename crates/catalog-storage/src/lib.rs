//! Strata Catalog Storage
//!
//! Storage collaborators for the Strata lineage engine.
//!
//! [`InMemoryCatalog`] implements [`JobDao`](strata_catalog_core::JobDao) and
//! [`LineageDao`](strata_catalog_core::LineageDao) over in-process tables. It
//! computes the two closures the engine delegates:
//!
//! - **Job closure**: breadth-first over jobs, where two jobs are adjacent
//!   when their input/output dataset sets intersect; `depth` bounds the hops.
//! - **Upstream runs**: breadth-first from a run through the dataset versions
//!   it read to the runs that produced them, up to `depth` levels.
//!
//! Catalogs can be seeded programmatically or from a JSON [`CatalogSnapshot`].
//!
//! Name comparisons are exact (case-sensitive) throughout.

mod memory;
mod snapshot;

pub use memory::InMemoryCatalog;
pub use snapshot::{CatalogSnapshot, DatasetVersion, RunRecord};
