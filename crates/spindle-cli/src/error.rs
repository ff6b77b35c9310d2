//! CLI-surface errors: everything that exits non-zero.

use std::path::PathBuf;

use thiserror::Error;

use spindle_core::ConfigError;

#[derive(Debug, Error)]
pub enum CliError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("{path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("{path}: invalid JSON: {source}")]
    Json {
        path: PathBuf,
        source: serde_json::Error,
    },

    #[error("no workload given: pass --workload <file> or --sample")]
    NoWorkload,
}
