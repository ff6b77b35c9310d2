//! Simulation configuration record.
//!
//! All times are virtual milliseconds. Rotation latency and sector transfer
//! time are not stored; they derive from `rpm` and the disk geometry.

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Every tunable the simulator consumes. The defaults model a 7500 RPM
/// single-platter drive with a five-buffer cache and a 20 ms quantum.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SimConfig {
    /// Number of concentric tracks on the platter.
    pub disk_tracks: u32,
    /// Sectors per track; `disk_tracks * sectors_per_track` sectors total.
    pub sectors_per_track: u32,
    /// Cost of moving the head by one track (ms).
    pub track_seek_time_ms: f64,
    /// Fixed cost of rewinding the head to either platter edge (ms).
    pub edge_seek_time_ms: f64,
    /// Spindle speed; derives rotation latency and sector transfer time.
    pub rpm: u32,

    /// Buffers in the cache.
    pub buffer_count: usize,
    /// Capacity of the hot (Left) segment.
    pub lfu_left_max: usize,
    /// Capacity of the warm (Middle) segment.
    pub lfu_middle_max: usize,

    /// LOOK: consecutive serves of one track before the candidate is dropped.
    pub look_max_same_track: u32,
    /// FLOOK: initial sweep direction.
    pub flook_process_forward: bool,

    /// Kernel-mode charge for a read syscall (ms).
    pub syscall_read_ms: f64,
    /// Kernel-mode charge for a write syscall (ms).
    pub syscall_write_ms: f64,
    /// Charge per disk-completion interrupt (ms).
    pub interrupt_handler_ms: f64,
    /// Round-robin quantum (ms).
    pub time_quantum_ms: f64,
    /// User-mode processing after a satisfied read (ms).
    pub process_read_ms: f64,
    /// User-mode preparation before a write hit (ms).
    pub process_write_ms: f64,

    /// Safety cap on kernel loop iterations.
    pub max_iterations: u64,

    /// Emit the detailed per-iteration trace.
    pub detailed_trace: bool,
    /// Render trace times in integer microseconds instead of milliseconds.
    pub time_unit_microseconds: bool,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            disk_tracks: 10_000,
            sectors_per_track: 500,
            track_seek_time_ms: 0.5,
            edge_seek_time_ms: 10.0,
            rpm: 7500,
            buffer_count: 5,
            lfu_left_max: 4,
            lfu_middle_max: 3,
            look_max_same_track: 5,
            flook_process_forward: true,
            syscall_read_ms: 0.15,
            syscall_write_ms: 0.15,
            interrupt_handler_ms: 0.05,
            time_quantum_ms: 20.0,
            process_read_ms: 7.0,
            process_write_ms: 7.0,
            max_iterations: 1_000_000,
            detailed_trace: false,
            time_unit_microseconds: false,
        }
    }
}

impl SimConfig {
    /// Average rotational latency in ms: half a revolution.
    pub fn rotation_latency_ms(&self) -> f64 {
        30_000.0 / self.rpm as f64
    }

    /// Time to transfer one sector in ms: one revolution split across the track.
    pub fn sector_rw_ms(&self) -> f64 {
        60_000.0 / (self.rpm as f64 * self.sectors_per_track as f64)
    }

    /// Total addressable sectors.
    pub fn total_sectors(&self) -> u64 {
        self.disk_tracks as u64 * self.sectors_per_track as u64
    }

    /// Reject impossible geometries, sizes and charges.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let positive_counts: [(&'static str, f64); 6] = [
            ("disk_tracks", self.disk_tracks as f64),
            ("sectors_per_track", self.sectors_per_track as f64),
            ("rpm", self.rpm as f64),
            ("buffer_count", self.buffer_count as f64),
            ("lfu_left_max", self.lfu_left_max as f64),
            ("lfu_middle_max", self.lfu_middle_max as f64),
        ];
        for (field, value) in positive_counts {
            if value <= 0.0 {
                return Err(ConfigError::NotPositive { field, value });
            }
        }

        let positive_times: [(&'static str, f64); 2] = [
            ("track_seek_time_ms", self.track_seek_time_ms),
            ("time_quantum_ms", self.time_quantum_ms),
        ];
        for (field, value) in positive_times {
            if value <= 0.0 {
                return Err(ConfigError::NotPositive { field, value });
            }
        }

        let non_negative: [(&'static str, f64); 6] = [
            ("edge_seek_time_ms", self.edge_seek_time_ms),
            ("syscall_read_ms", self.syscall_read_ms),
            ("syscall_write_ms", self.syscall_write_ms),
            ("interrupt_handler_ms", self.interrupt_handler_ms),
            ("process_read_ms", self.process_read_ms),
            ("process_write_ms", self.process_write_ms),
        ];
        for (field, value) in non_negative {
            if value < 0.0 {
                return Err(ConfigError::Negative { field, value });
            }
        }

        if self.max_iterations == 0 {
            return Err(ConfigError::NotPositive {
                field: "max_iterations",
                value: 0.0,
            });
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_validate() {
        assert_eq!(SimConfig::default().validate(), Ok(()));
    }

    #[test]
    fn test_derived_values_at_defaults() {
        let config = SimConfig::default();
        assert!((config.rotation_latency_ms() - 4.0).abs() < 1e-9);
        assert!((config.sector_rw_ms() - 0.016).abs() < 1e-9);
        assert_eq!(config.total_sectors(), 5_000_000);
    }

    #[test]
    fn test_zero_buffers_rejected() {
        let config = SimConfig {
            buffer_count: 0,
            ..SimConfig::default()
        };
        assert_eq!(
            config.validate(),
            Err(ConfigError::NotPositive {
                field: "buffer_count",
                value: 0.0
            })
        );
    }

    #[test]
    fn test_negative_time_rejected() {
        let config = SimConfig {
            syscall_read_ms: -0.1,
            ..SimConfig::default()
        };
        assert!(matches!(
            config.validate(),
            Err(ConfigError::Negative {
                field: "syscall_read_ms",
                ..
            })
        ));
    }

    #[test]
    fn test_zero_quantum_rejected() {
        let config = SimConfig {
            time_quantum_ms: 0.0,
            ..SimConfig::default()
        };
        assert!(matches!(
            config.validate(),
            Err(ConfigError::NotPositive {
                field: "time_quantum_ms",
                ..
            })
        ));
    }
}
