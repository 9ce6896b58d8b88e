//! CLI entry point for arbor-sync maintenance operations.

use std::sync::Arc;

use clap::{Parser, Subcommand};
use tracing_subscriber::{fmt, EnvFilter};

use arbor_object::TypeRegistry;
use arbor_store::MemoryStore;
use arbor_sync::{MaintenanceRequest, SyncEngine};

#[derive(Parser)]
#[command(name = "arbor-sync")]
#[command(about = "Export/import maintenance operations for the Arbor graph")]
struct Cli {
    #[command(subcommand)]
    command: Command,

    /// Config file prefix (default: arbor).
    #[arg(short, long, default_value = "arbor")]
    config: String,
}

#[derive(Subcommand)]
enum Command {
    /// Export the graph closure to a bundle file.
    Export {
        /// Target bundle path.
        file: Option<String>,
    },
    /// Import a bundle file and run post-import repair.
    Import {
        /// Source bundle path.
        file: Option<String>,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    fmt().with_env_filter(filter).json().init();

    let cli = Cli::parse();
    let config = arbor_core::config::load(&cli.config)?;

    let store = Arc::new(MemoryStore::with_config(&config.store));
    let registry = Arc::new(TypeRegistry::new());
    let engine = SyncEngine::new(store, registry, config.sync);

    // The maintenance surface validates the raw parameters before any
    // graph access, so missing arguments fail as bad requests.
    let mut params = serde_json::Map::new();
    match &cli.command {
        Command::Export { file } => {
            params.insert("mode".to_string(), "export".into());
            if let Some(file) = file {
                params.insert("file".to_string(), file.clone().into());
            }
        }
        Command::Import { file } => {
            params.insert("mode".to_string(), "import".into());
            if let Some(file) = file {
                params.insert("file".to_string(), file.clone().into());
            }
        }
    }

    let request = MaintenanceRequest::from_params(&params)?;
    let report = request.execute(&engine).await?;

    tracing::info!(
        nodes = report.nodes,
        relationships = report.relationships,
        files = report.files,
        "Maintenance operation complete"
    );
    Ok(())
}
