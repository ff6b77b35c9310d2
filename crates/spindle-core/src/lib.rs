//! # spindle-core
//!
//! **A discrete-event simulator of an operating-system storage stack.**
//!
//! `spindle-core` advances virtual time over three cooperating subsystems: a
//! round-robin CPU scheduler running user processes that issue block I/O, a
//! frequency-aware buffer cache with three segments, and a disk-request
//! scheduler (FIFO, LOOK or FLOOK) driving a single-spindle rotational disk
//! model. The output is a structured trace stream plus aggregate statistics
//! (throughput, seek time, hit rate, per-process CPU/IO/wait time).
//!
//! ## Quick Start
//!
//! ```
//! use spindle_core::{PolicyKind, SimConfig, Simulation, Step, ProcessSpec, Workload};
//!
//! let workload = Workload::new(vec![ProcessSpec::new(
//!     "reader",
//!     vec![Step::read(100), Step::write(200), Step::read(100)],
//! )]);
//!
//! let mut sim = Simulation::new(SimConfig::default(), &workload, PolicyKind::Look)
//!     .expect("valid configuration");
//! let report = sim.run();
//!
//! assert_eq!(report.cache.hits, 1);
//! println!("simulated {:.2} ms", report.system.total_ms);
//! ```
//!
//! ## Architecture
//!
//! Processes → syscall charge → cache access → (hit: compute on CPU |
//! miss: disk request → blocked) → policy orders the queue → disk service →
//! completion interrupt → process ready again.
//!
//! The whole machine is single-threaded over virtual time; the kernel owns
//! every collaborator and no real I/O happens anywhere. Determinism: a fixed
//! configuration, workload and policy always produce an identical trace and
//! report.

pub mod cache;
pub mod clock;
pub mod config;
pub mod disk;
pub mod error;
pub mod kernel;
pub mod policy;
pub mod process;
pub mod stats;
pub mod trace;
pub mod workload;

pub use cache::{
    Access, AcquireSource, Buffer, BufferBrief, BufferCache, BufferId, CacheSnapshot, Segment,
};
pub use clock::{Calendar, Clock, TIME_EPSILON_MS, approx_eq};
pub use config::SimConfig;
pub use disk::{Disk, DiskRequest, SeekOptions, ServiceTime};
pub use error::ConfigError;
pub use kernel::Simulation;
pub use policy::{DiskScheduler, PolicyKind, QueueSnapshot, RequestBrief, create_scheduler};
pub use process::{Process, ProcessState};
pub use stats::{CacheStats, DiskStats, ProcessStats, SimReport, SystemStats};
pub use trace::{NullSink, RecordingSink, TraceEvent, TraceSink};
pub use workload::{ProcessSpec, Step, Workload};

/// Library version (from Cargo.toml).
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
