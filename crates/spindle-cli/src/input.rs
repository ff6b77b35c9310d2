//! Configuration and workload file loading.

use std::fs;
use std::path::Path;

use spindle_core::{SimConfig, Workload};

use crate::error::CliError;

/// Load a configuration JSON, or the defaults when no path is given.
/// Missing keys fall back to their defaults.
pub fn load_config(path: Option<&Path>) -> Result<SimConfig, CliError> {
    let Some(path) = path else {
        return Ok(SimConfig::default());
    };
    let text = fs::read_to_string(path).map_err(|source| CliError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    serde_json::from_str(&text).map_err(|source| CliError::Json {
        path: path.to_path_buf(),
        source,
    })
}

/// Load a workload JSON.
pub fn load_workload(path: &Path) -> Result<Workload, CliError> {
    let text = fs::read_to_string(path).map_err(|source| CliError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    serde_json::from_str(&text).map_err(|source| CliError::Json {
        path: path.to_path_buf(),
        source,
    })
}

/// Pick the workload: an explicit file wins, otherwise `--sample`.
pub fn resolve_workload(
    path: Option<&Path>,
    sample: bool,
    seed: u64,
    config: &SimConfig,
) -> Result<Workload, CliError> {
    match (path, sample) {
        (Some(path), _) => load_workload(path),
        (None, true) => Ok(crate::sample::sample_workload(config.total_sectors(), seed)),
        (None, false) => Err(CliError::NoWorkload),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_missing_config_path_yields_defaults() {
        let config = load_config(None).unwrap();
        assert_eq!(config.buffer_count, 5);
    }

    #[test]
    fn test_partial_config_file_merges_defaults() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{"buffer_count": 8, "time_quantum_ms": 5.0}}"#).unwrap();
        let config = load_config(Some(file.path())).unwrap();
        assert_eq!(config.buffer_count, 8);
        assert_eq!(config.time_quantum_ms, 5.0);
        // Untouched keys keep their defaults.
        assert_eq!(config.disk_tracks, 10_000);
    }

    #[test]
    fn test_workload_file_round_trip() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(
            file,
            r#"{{"processes": [{{"name": "p1", "steps": [{{"sector": 100, "write": false}}]}}]}}"#
        )
        .unwrap();
        let workload = load_workload(file.path()).unwrap();
        assert_eq!(workload.processes.len(), 1);
        assert_eq!(workload.processes[0].steps[0].sector, 100);
    }

    #[test]
    fn test_invalid_json_reports_path() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "not json").unwrap();
        let err = load_workload(file.path()).unwrap_err();
        assert!(matches!(err, CliError::Json { .. }));
    }

    #[test]
    fn test_resolve_requires_some_workload() {
        let config = SimConfig::default();
        assert!(matches!(
            resolve_workload(None, false, 42, &config),
            Err(CliError::NoWorkload)
        ));
        let sampled = resolve_workload(None, true, 42, &config).unwrap();
        assert!(!sampled.is_empty());
    }
}
