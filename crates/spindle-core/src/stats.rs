//! Aggregate statistics records produced by a finished (or capped) run.

use serde::Serialize;

/// Disk service aggregates.
#[derive(Debug, Clone, Default, Serialize)]
pub struct DiskStats {
    pub completed_requests: u64,
    pub avg_seek_ms: f64,
    pub avg_rotation_ms: f64,
    pub avg_transfer_ms: f64,
    pub total_disk_ms: f64,
}

/// Cache hit/miss aggregates.
#[derive(Debug, Clone, Default, Serialize)]
pub struct CacheStats {
    pub hits: u64,
    pub misses: u64,
    /// Hits over total accesses; 0 when nothing was accessed.
    pub hit_rate: f64,
}

/// Whole-system aggregates.
#[derive(Debug, Clone, Default, Serialize)]
pub struct SystemStats {
    /// Final virtual time (ms).
    pub total_ms: f64,
    /// Cumulative kernel-mode syscall charge (ms).
    pub syscall_ms: f64,
    /// Cumulative interrupt handler charge (ms).
    pub interrupt_ms: f64,
    /// Cumulative user-mode compute charge (ms).
    pub compute_ms: f64,
    /// Kernel loop iterations executed.
    pub iterations: u64,
    /// True when the run halted at the iteration cap with partial results.
    pub cap_hit: bool,
}

/// Per-process accounting.
#[derive(Debug, Clone, Serialize)]
pub struct ProcessStats {
    pub pid: u32,
    pub name: String,
    /// Finish minus start, when the process finished (ms).
    pub total_ms: Option<f64>,
    pub cpu_ms: f64,
    pub io_ms: f64,
    pub wait_ms: f64,
    /// Completed fraction of the program, percent.
    pub progress: f64,
}

/// Everything a run reports.
#[derive(Debug, Clone, Serialize)]
pub struct SimReport {
    /// Scheduling policy that drove the disk.
    pub policy: String,
    pub disk: DiskStats,
    pub cache: CacheStats,
    pub system: SystemStats,
    pub processes: Vec<ProcessStats>,
}
