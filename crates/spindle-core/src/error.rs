//! Construction-time error taxonomy.
//!
//! Everything here is surfaced before a [`crate::kernel::Simulation`] exists;
//! a simulation that constructed successfully does not return errors while it
//! runs. Broken internal invariants (a cache with no evictable buffer) are
//! programmer errors and panic instead.

use thiserror::Error;

/// Rejected configuration or workload.
#[derive(Debug, Error, PartialEq)]
pub enum ConfigError {
    /// Policy name did not match FIFO, LOOK or FLOOK.
    #[error("unknown scheduling policy `{0}` (expected fifo, look or flook)")]
    UnknownPolicy(String),

    /// A size or count parameter that must be strictly positive.
    #[error("{field} must be positive, got {value}")]
    NotPositive { field: &'static str, value: f64 },

    /// A time parameter that must not be negative.
    #[error("{field} must not be negative, got {value}")]
    Negative { field: &'static str, value: f64 },

    /// A workload step addresses a sector outside the disk.
    #[error(
        "process `{process}` step {index}: sector {sector} outside disk (0..{total_sectors})"
    )]
    SectorOutOfRange {
        process: String,
        index: usize,
        sector: u64,
        total_sectors: u64,
    },
}
