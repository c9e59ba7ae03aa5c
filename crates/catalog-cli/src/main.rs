//! Strata Catalog CLI
//!
//! Command-line interface for exploring lineage in a Strata catalog snapshot.

use clap::{Parser, Subcommand};
use serde::Serialize;
use std::sync::Arc;
use strata_catalog_core::{NodeId, RunId};
use strata_catalog_lineage::{LineageConfig, LineageService};
use strata_catalog_storage::InMemoryCatalog;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "strata")]
#[command(version, about = "Strata catalog lineage CLI", long_about = None)]
struct Cli {
    /// Path to the catalog snapshot (JSON)
    #[arg(short, long, default_value = "strata_catalog.json", global = true)]
    catalog: String,

    /// Pretty-print JSON output
    #[arg(long, global = true)]
    pretty: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Show the lineage graph around a job or dataset
    Lineage {
        /// Node id, e.g. `dataset:warehouse:orders` or `job:etl:load_orders`
        node: String,

        /// Traversal depth (defaults to STRATA_LINEAGE_DEFAULT_DEPTH or 20)
        #[arg(short, long)]
        depth: Option<u32>,

        /// Include run facets on the latest runs
        #[arg(long)]
        with_run_facets: bool,
    },

    /// Trace the runs upstream of a run
    Upstream {
        /// Run uuid
        run: String,

        /// Number of producer levels to follow
        #[arg(short, long)]
        depth: Option<u32>,
    },

    /// Show catalog statistics
    Stats,
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Lineage {
            ref node,
            depth,
            with_run_facets,
        } => show_lineage(&cli.catalog, node, depth, with_run_facets, cli.pretty),
        Commands::Upstream { ref run, depth } => {
            show_upstream(&cli.catalog, run, depth, cli.pretty)
        }
        Commands::Stats => show_stats(&cli.catalog),
    };

    if let Err(e) = result {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

type CliResult<T> = Result<T, Box<dyn std::error::Error>>;

fn open_service(path: &str) -> CliResult<(Arc<InMemoryCatalog>, LineageService)> {
    let catalog = Arc::new(InMemoryCatalog::load_snapshot(path)?);
    let config = LineageConfig::from_env()?;
    let service = LineageService::with_config(catalog.clone(), catalog.clone(), config);
    Ok((catalog, service))
}

fn show_lineage(
    path: &str,
    node: &str,
    depth: Option<u32>,
    with_run_facets: bool,
    pretty: bool,
) -> CliResult<()> {
    let node_id: NodeId = node.parse()?;
    let (_, service) = open_service(path)?;

    let depth = depth.unwrap_or(service.config().default_depth);
    let with_run_facets = with_run_facets || service.config().with_run_facets;
    let lineage = service.lineage(&node_id, depth, with_run_facets)?;

    println!("{}", render(&lineage, pretty)?);
    Ok(())
}

fn show_upstream(path: &str, run: &str, depth: Option<u32>, pretty: bool) -> CliResult<()> {
    let run_id: RunId = run.parse()?;
    let (_, service) = open_service(path)?;

    let depth = depth.unwrap_or(service.config().default_depth);
    let upstream = service.upstream(&run_id, depth)?;

    println!("{}", render(&upstream, pretty)?);
    Ok(())
}

fn show_stats(path: &str) -> CliResult<()> {
    let (catalog, _) = open_service(path)?;

    println!("Catalog Statistics");
    println!("{}", "=".repeat(50));
    println!("Datasets: {}", catalog.dataset_count());
    println!("Jobs: {}", catalog.job_count());

    Ok(())
}

fn render<T: Serialize>(value: &T, pretty: bool) -> serde_json::Result<String> {
    if pretty {
        serde_json::to_string_pretty(value)
    } else {
        serde_json::to_string(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;
    use std::io::Write;

    const SNAPSHOT: &str = r#"{
        "datasets": [
            {
                "uuid": "8c2f4a5e-3b1d-4c8e-9f6a-1d2e3f4a5b6c",
                "id": { "namespace": "warehouse", "name": "orders" },
                "created_at": "2024-01-01T00:00:00Z",
                "updated_at": "2024-01-01T00:00:00Z"
            }
        ],
        "jobs": [
            {
                "uuid": "1a2b3c4d-5e6f-4a7b-8c9d-0e1f2a3b4c5d",
                "id": { "namespace": "etl", "name": "load_orders" },
                "created_at": "2024-01-01T00:00:00Z",
                "updated_at": "2024-01-01T00:00:00Z",
                "output_uuids": ["8c2f4a5e-3b1d-4c8e-9f6a-1d2e3f4a5b6c"]
            }
        ]
    }"#;

    fn snapshot_file() -> tempfile::NamedTempFile {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(SNAPSHOT.as_bytes()).unwrap();
        file
    }

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_lineage_args() {
        let cli = Cli::parse_from([
            "strata",
            "--catalog",
            "snap.json",
            "lineage",
            "dataset:warehouse:orders",
            "--depth",
            "3",
            "--with-run-facets",
        ]);
        assert_eq!(cli.catalog, "snap.json");
        match cli.command {
            Commands::Lineage {
                node,
                depth,
                with_run_facets,
            } => {
                assert_eq!(node, "dataset:warehouse:orders");
                assert_eq!(depth, Some(3));
                assert!(with_run_facets);
            }
            _ => panic!("expected lineage command"),
        }
    }

    #[test]
    fn test_show_lineage_from_snapshot() {
        let file = snapshot_file();
        let path = file.path().to_str().unwrap();

        assert!(show_lineage(path, "dataset:warehouse:orders", Some(2), false, true).is_ok());
        assert!(show_lineage(path, "not-a-node", None, false, false).is_err());
        let field = "datasetField:warehouse:orders:id";
        assert!(show_lineage(path, field, None, false, false).is_err());
    }

    #[test]
    fn test_show_upstream_rejects_bad_run_id() {
        let file = snapshot_file();
        let path = file.path().to_str().unwrap();

        assert!(show_upstream(path, "not-a-uuid", None, false).is_err());
        let unknown_run = "6f1c1a9e-0f0e-4b8e-9a57-2f4c8d3b1a10";
        assert!(show_upstream(path, unknown_run, Some(1), false).is_ok());
    }

    #[test]
    fn test_missing_snapshot_fails() {
        assert!(show_stats("/nonexistent/strata_catalog.json").is_err());
    }

    #[test]
    fn test_render_compact_and_pretty() {
        let value = serde_json::json!({ "graph": [] });
        assert_eq!(render(&value, false).unwrap(), r#"{"graph":[]}"#);
        assert!(render(&value, true).unwrap().contains('\n'));
    }
}
