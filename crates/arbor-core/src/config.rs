//! Configuration for Arbor services.
//!
//! Loaded from `arbor.toml` plus `ARBOR_`-prefixed environment
//! variables (double-underscore separator), environment winning.

use serde::Deserialize;

use crate::error::ArborError;

/// Top-level Arbor configuration.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ArborConfig {
    #[serde(default)]
    pub store: StoreConfig,

    #[serde(default)]
    pub sync: SyncConfig,
}

/// Tuning for the in-process graph store.
#[derive(Debug, Clone, Deserialize)]
pub struct StoreConfig {
    /// Initial node-table capacity (avoids early reallocations).
    #[serde(default = "default_node_capacity")]
    pub initial_node_capacity: usize,

    /// Initial edge-table capacity.
    #[serde(default = "default_edge_capacity")]
    pub initial_edge_capacity: usize,
}

/// Settings for graph export/import.
#[derive(Debug, Clone, Deserialize)]
pub struct SyncConfig {
    /// Directory for export bundles when a relative file name is given.
    #[serde(default = "default_bundle_dir")]
    pub bundle_dir: String,

    /// Pretty-print exported bundles.
    #[serde(default = "default_true")]
    pub pretty: bool,
}

fn default_node_capacity() -> usize {
    1024
}

fn default_edge_capacity() -> usize {
    4096
}

fn default_bundle_dir() -> String {
    "./bundles".to_string()
}

fn default_true() -> bool {
    true
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            initial_node_capacity: default_node_capacity(),
            initial_edge_capacity: default_edge_capacity(),
        }
    }
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            bundle_dir: default_bundle_dir(),
            pretty: default_true(),
        }
    }
}

/// Load configuration from `<file_prefix>.toml` and the environment.
pub fn load(file_prefix: &str) -> Result<ArborConfig, ArborError> {
    let cfg = config::Config::builder()
        .add_source(config::File::with_name(file_prefix).required(false))
        .add_source(
            config::Environment::with_prefix("ARBOR")
                .separator("__")
                .try_parsing(true),
        )
        .build()?;

    match cfg.try_deserialize::<ArborConfig>() {
        Ok(c) => Ok(c),
        Err(_) => Ok(ArborConfig::default()),
    }
}
