//! process-addons - run a batch task over marketplace add-ons.

use std::path::PathBuf;
use std::sync::Arc;

use addons_storage::{shared, JsonStorage};
use addons_work::{
    DispatchOptions, InlineBackend, ProcessAddons, TaskBackend, TaskCatalog, TokioBackend,
    WorkerContext,
};
use anyhow::Result;
use clap::{Parser, ValueEnum};
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "process-addons")]
#[command(about = "Process add-ons in batches", long_about = None)]
struct Cli {
    /// Task to run
    #[arg(long)]
    task: Option<String>,

    /// Only process the first N selected add-ons
    #[arg(long)]
    limit: Option<usize>,

    /// Add-ons per chunk (defaults to the task's own)
    #[arg(long, alias = "batch_size")]
    batch_size: Option<usize>,

    /// Include soft-deleted and disabled add-ons
    #[arg(long, alias = "with_deleted")]
    with_deleted: bool,

    /// Data directory
    #[arg(long, default_value = ".addons")]
    storage: PathBuf,

    /// Where chunks run
    #[arg(long, value_enum, default_value_t = BackendKind::Tokio)]
    backend: BackendKind,

    /// Print the run report as JSON
    #[arg(long)]
    json: bool,

    /// List available tasks and exit
    #[arg(long)]
    list_tasks: bool,
}

#[derive(Clone, Copy, PartialEq, Eq, ValueEnum)]
enum BackendKind {
    /// Spawn chunks on the runtime and wait for them before exiting
    Tokio,
    /// Run each chunk as it is submitted
    Inline,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();
    let catalog = TaskCatalog::builtin();

    if cli.list_tasks {
        for descriptor in catalog.iter() {
            println!(
                "  {} | {} | batch size {}",
                descriptor.name, descriptor.worker, descriptor.batch_size
            );
        }
        return Ok(());
    }

    let storage = shared(JsonStorage::new(&cli.storage).await?);
    let ctx = WorkerContext::new(storage.clone());

    let tokio_backend = Arc::new(TokioBackend::new(ctx.clone()));
    let backend: Arc<dyn TaskBackend> = match cli.backend {
        BackendKind::Tokio => tokio_backend.clone(),
        BackendKind::Inline => Arc::new(InlineBackend::new(ctx)),
    };

    let options = DispatchOptions {
        task: cli.task,
        limit: cli.limit,
        batch_size: cli.batch_size,
        with_deleted: cli.with_deleted,
    };
    let result = ProcessAddons::new(&catalog, storage, backend).run(&options).await;

    // Spawned chunks die with the runtime.
    tokio_backend.drain().await;
    let report = result?;

    if cli.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        println!(
            "{}: {} add-ons in {} chunks of up to {}",
            report.task,
            report.selected,
            report.chunks(),
            report.batch_size
        );
    }
    info!("Done");

    Ok(())
}
