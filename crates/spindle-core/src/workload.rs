//! Workload input records: the list of processes the kernel consumes.

use serde::{Deserialize, Serialize};

use crate::config::SimConfig;
use crate::error::ConfigError;

/// One program step: a sector plus the operation direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Step {
    pub sector: u64,
    pub write: bool,
}

impl Step {
    pub fn read(sector: u64) -> Self {
        Self {
            sector,
            write: false,
        }
    }

    pub fn write(sector: u64) -> Self {
        Self {
            sector,
            write: true,
        }
    }
}

/// Blueprint for one process: a name and its finite program.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProcessSpec {
    pub name: String,
    pub steps: Vec<Step>,
}

impl ProcessSpec {
    pub fn new(name: impl Into<String>, steps: Vec<Step>) -> Self {
        Self {
            name: name.into(),
            steps,
        }
    }
}

/// The full workload record handed to a simulation.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Workload {
    pub processes: Vec<ProcessSpec>,
}

impl Workload {
    pub fn new(processes: Vec<ProcessSpec>) -> Self {
        Self { processes }
    }

    pub fn is_empty(&self) -> bool {
        self.processes.is_empty()
    }

    /// Reject steps that address sectors outside the configured disk.
    pub fn validate(&self, config: &SimConfig) -> Result<(), ConfigError> {
        let total_sectors = config.total_sectors();
        for spec in &self.processes {
            for (index, step) in spec.steps.iter().enumerate() {
                if step.sector >= total_sectors {
                    return Err(ConfigError::SectorOutOfRange {
                        process: spec.name.clone(),
                        index,
                        sector: step.sector,
                        total_sectors,
                    });
                }
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_valid_workload_passes() {
        let workload = Workload::new(vec![ProcessSpec::new(
            "reader",
            vec![Step::read(0), Step::write(4_999_999)],
        )]);
        assert_eq!(workload.validate(&SimConfig::default()), Ok(()));
    }

    #[test]
    fn test_out_of_range_sector_rejected() {
        let workload = Workload::new(vec![ProcessSpec::new(
            "stray",
            vec![Step::read(100), Step::read(5_000_000)],
        )]);
        let err = workload.validate(&SimConfig::default()).unwrap_err();
        assert_eq!(
            err,
            ConfigError::SectorOutOfRange {
                process: "stray".to_string(),
                index: 1,
                sector: 5_000_000,
                total_sectors: 5_000_000,
            }
        );
    }

    #[test]
    fn test_empty_workload_is_valid() {
        assert_eq!(Workload::default().validate(&SimConfig::default()), Ok(()));
    }
}
