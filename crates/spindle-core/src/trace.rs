//! Structured trace stream.
//!
//! The kernel never formats text. It emits [`TraceEvent`] values through a
//! [`TraceSink`] capability; renderers (the CLI's text trace) and tests (the
//! [`RecordingSink`]) decide what to do with them. Every event is keyed on
//! the virtual time it was emitted at.

use std::cell::RefCell;
use std::rc::Rc;

use crate::cache::{AcquireSource, BufferId, CacheSnapshot, Segment};
use crate::policy::{QueueSnapshot, RequestBrief};
use crate::workload::Step;

/// One simulation event.
#[derive(Debug, Clone, PartialEq)]
pub enum TraceEvent {
    /// A process joined the ready queue at startup.
    ProcessAdded {
        pid: u32,
        name: String,
        steps: Vec<Step>,
    },
    /// Top of one kernel loop iteration.
    Iteration,
    /// The CPU was handed to a process.
    Dispatch { pid: u32 },
    /// A process entered kernel mode for a sector operation.
    SyscallEnter { pid: u32, sector: u64, write: bool },
    /// Kernel-mode charge actually applied (may be cut short by preemption).
    SyscallWorked { pid: u32, actual_ms: f64 },
    /// Sector found in cache.
    CacheHit {
        buffer: BufferId,
        sector: u64,
        segment: Segment,
    },
    /// Sector absent from cache.
    CacheMiss { sector: u64 },
    /// A buffer was obtained for a missed sector.
    CacheAcquire {
        buffer: BufferId,
        source: AcquireSource,
    },
    /// The acquired buffer displaced an older sector.
    CacheEvict {
        buffer: BufferId,
        old_sector: u64,
        dirty: bool,
    },
    /// The missed sector was bound to its buffer.
    CacheLoad { buffer: BufferId, sector: u64 },
    /// Segment contents after a cache mutation.
    CacheState(CacheSnapshot),
    /// A disk request was handed to the scheduling policy.
    RequestQueued {
        request: RequestBrief,
        buffer: BufferId,
    },
    /// Scheduler queue contents after an enqueue.
    DriverQueue {
        policy: &'static str,
        snapshot: QueueSnapshot,
    },
    /// Head-movement alternatives for the queued request.
    SeekDecision {
        from_track: u32,
        to_track: u32,
        direct_ms: f64,
        via_edge_ms: f64,
    },
    /// The running process blocked on disk I/O.
    ProcessBlocked {
        pid: u32,
        predicted_completion_ms: f64,
    },
    /// The running process exhausted its quantum.
    QuantumExhausted { pid: u32, during_syscall: bool },
    /// User-mode processing started after a satisfied access.
    ComputeStart { pid: u32, duration_ms: f64 },
    /// A request entered service on the spindle.
    DiskStart {
        request: RequestBrief,
        seek_ms: f64,
        rotation_ms: f64,
        transfer_ms: f64,
        completion_at_ms: f64,
    },
    /// A disk completion interrupt fired.
    Interrupt { request_id: u64 },
    /// A completed write left its cached buffer clean.
    BufferCleaned { buffer: BufferId, sector: u64 },
    /// A blocked process returned to the ready queue.
    ProcessUnblocked { pid: u32, io_ms: f64 },
    /// A process ran out of program.
    ProcessFinished { pid: u32 },
    /// End-of-run flush started.
    FlushBegin { dirty: usize },
    /// A dirty buffer was scheduled for its flush write.
    FlushQueued {
        request: RequestBrief,
        buffer: BufferId,
    },
    /// A flushed buffer returned to the free pool.
    BufferFreed { buffer: BufferId },
    /// Nothing runnable: the clock jumped forward.
    IdleAdvance { to_ms: f64 },
}

/// Capability the kernel emits events through.
pub trait TraceSink {
    fn emit(&mut self, time_ms: f64, event: &TraceEvent);
}

/// Discards every event.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullSink;

impl TraceSink for NullSink {
    fn emit(&mut self, _time_ms: f64, _event: &TraceEvent) {}
}

/// Captures `(time, event)` pairs for inspection; clones share one buffer,
/// so tests can keep a handle while the kernel owns the boxed sink.
#[derive(Debug, Default, Clone)]
pub struct RecordingSink {
    events: Rc<RefCell<Vec<(f64, TraceEvent)>>>,
}

impl RecordingSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of everything recorded so far.
    pub fn events(&self) -> Vec<(f64, TraceEvent)> {
        self.events.borrow().clone()
    }

    pub fn len(&self) -> usize {
        self.events.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.borrow().is_empty()
    }
}

impl TraceSink for RecordingSink {
    fn emit(&mut self, time_ms: f64, event: &TraceEvent) {
        self.events.borrow_mut().push((time_ms, event.clone()));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_recording_sink_shares_buffer_across_clones() {
        let sink = RecordingSink::new();
        let mut writer = sink.clone();
        writer.emit(1.0, &TraceEvent::Iteration);
        writer.emit(2.0, &TraceEvent::Dispatch { pid: 1 });
        assert_eq!(sink.len(), 2);
        assert_eq!(sink.events()[1].1, TraceEvent::Dispatch { pid: 1 });
    }

    #[test]
    fn test_null_sink_ignores_events() {
        let mut sink = NullSink;
        sink.emit(0.0, &TraceEvent::Iteration);
    }
}
