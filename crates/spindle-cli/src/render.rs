//! Text rendering: the detailed trace, the settings block, the final
//! statistics and the policy comparison table.

use std::collections::HashMap;

use spindle_core::{
    BufferBrief, PolicyKind, RequestBrief, SimConfig, SimReport, TraceEvent, TraceSink,
};

/// Format a virtual time for display. Microsecond mode prints integers with
/// apostrophe thousands grouping, as in `1'234'567 us`.
pub fn fmt_time(ms: f64, microseconds: bool) -> String {
    if microseconds {
        let us = (ms * 1_000.0).round() as i64;
        format!("{} us", group_thousands(us))
    } else if ms >= 1_000.0 {
        format!("{} ms", group_thousands(ms.round() as i64))
    } else {
        format!("{ms:.2} ms")
    }
}

fn group_thousands(value: i64) -> String {
    let digits = value.unsigned_abs().to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push('\'');
        }
        out.push(ch);
    }
    if value < 0 { format!("-{out}") } else { out }
}

fn request_str(r: &RequestBrief) -> String {
    let op = if r.write { "WRITE" } else { "READ" };
    match r.pid {
        Some(pid) => format!(
            "Request#{}({op}, sector={}, track={}, proc={pid})",
            r.id, r.sector, r.track
        ),
        None => format!(
            "Request#{}({op}, sector={}, track={}, flush)",
            r.id, r.sector, r.track
        ),
    }
}

fn buffer_str(b: &BufferBrief) -> String {
    let status = if b.dirty { "DIRTY" } else { "CLEAN" };
    format!("({}:{},{status})", b.id, b.sector)
}

fn segment_str(buffers: &[BufferBrief]) -> String {
    let entries: Vec<String> = buffers.iter().map(buffer_str).collect();
    format!("[{}]", entries.join(", "))
}

fn queue_str(requests: &[RequestBrief]) -> String {
    let entries: Vec<String> = requests.iter().map(request_str).collect();
    format!("[{}]", entries.join(", "))
}

/// Trace sink that renders events as the instructor-style text trace.
pub struct TextTrace {
    microseconds: bool,
    names: HashMap<u32, String>,
}

impl TextTrace {
    pub fn new(microseconds: bool) -> Self {
        Self {
            microseconds,
            names: HashMap::new(),
        }
    }

    fn name(&self, pid: u32) -> String {
        self.names
            .get(&pid)
            .cloned()
            .unwrap_or_else(|| format!("P{pid}"))
    }

    fn t(&self, ms: f64) -> String {
        fmt_time(ms, self.microseconds)
    }
}

impl TraceSink for TextTrace {
    fn emit(&mut self, time_ms: f64, event: &TraceEvent) {
        match event {
            TraceEvent::ProcessAdded { pid, name, steps } => {
                self.names.insert(*pid, name.clone());
                println!("SCHEDULER: Process `{name}` was added");
                let ops: Vec<String> = steps
                    .iter()
                    .map(|s| format!("{{'{}',{}}}", if s.write { 'w' } else { 'r' }, s.sector))
                    .collect();
                println!("    {{{}, }}", ops.join(", "));
            }
            TraceEvent::Iteration => {
                println!("SCHEDULER: {} (NEXT ITERATION)", self.t(time_ms));
            }
            TraceEvent::Dispatch { pid } => {
                println!("SCHEDULER: User mode for process `{}`", self.name(*pid));
            }
            TraceEvent::SyscallEnter { pid, sector, write } => {
                let call = if *write { "write" } else { "read" };
                let name = self.name(*pid);
                println!("SCHEDULER: Process `{name}` invoked {call}() for sector {sector}");
                println!("SCHEDULER: Kernel mode (syscall) for process `{name}`");
            }
            TraceEvent::SyscallWorked { actual_ms, .. } => {
                println!(
                    "... worked for {} in system call, request buffer cache",
                    self.t(*actual_ms)
                );
            }
            TraceEvent::CacheHit {
                buffer,
                sector,
                segment,
            } => {
                println!("CACHE: Buffer ({buffer}:{sector}) found in cache (segment={segment})");
            }
            TraceEvent::CacheMiss { sector } => {
                println!("CACHE: Buffer for sector {sector} not found in cache");
            }
            TraceEvent::CacheAcquire { buffer, source } => {
                use spindle_core::AcquireSource::*;
                match source {
                    FreePool => println!("CACHE: Using free buffer {buffer}"),
                    RightClean => println!("CACHE: Evicting clean buffer {buffer} from right segment"),
                    RightDirty => {
                        println!("CACHE: Evicting dirty buffer {buffer} (no clean available)")
                    }
                    MiddleTail => println!("CACHE: Evicting buffer {buffer} from middle segment"),
                    LeftTail => println!("CACHE: Evicting buffer {buffer} from left segment"),
                }
            }
            TraceEvent::CacheEvict {
                buffer, old_sector, ..
            } => {
                println!("CACHE: Buffer {buffer} evicted (old sector {old_sector})");
            }
            TraceEvent::CacheLoad { buffer, sector } => {
                println!("CACHE: MISS: sector {sector}, loading to buffer {buffer}");
            }
            TraceEvent::CacheState(snapshot) => {
                println!("CACHE: Buffer cache LFU (three segments):");
                println!("    Left segment {}", segment_str(&snapshot.left));
                println!("    Middle segment {}", segment_str(&snapshot.middle));
                println!("    Right segment {}", segment_str(&snapshot.right));
            }
            TraceEvent::RequestQueued { request, buffer } => {
                let op = if request.write { "WRITE" } else { "READ" };
                println!(
                    "DRIVER: Buffer ({buffer}:{}) scheduled for I/O ({op})",
                    request.sector
                );
            }
            TraceEvent::DriverQueue { policy, snapshot } => {
                println!("DRIVER: Device strategy {policy}:");
                if *policy == "FLOOK" {
                    println!("    Active queue {}", queue_str(&snapshot.active));
                    println!("    Incoming queue {}", queue_str(&snapshot.incoming));
                } else {
                    println!("    Schedule queue {}", queue_str(&snapshot.active));
                }
            }
            TraceEvent::SeekDecision {
                from_track,
                to_track,
                direct_ms,
                via_edge_ms,
            } => {
                println!("DRIVER: Best move decision for tracks {from_track} => {to_track}");
                if from_track == to_track {
                    println!("    not to move, that is 0 us");
                } else {
                    println!(
                        "    direct move time {}, move time with rewind {}",
                        self.t(*direct_ms),
                        self.t(*via_edge_ms)
                    );
                }
            }
            TraceEvent::ProcessBlocked {
                pid,
                predicted_completion_ms,
            } => {
                println!("SCHEDULER: Block process `{}`", self.name(*pid));
                println!(
                    "SCHEDULER: Next interrupt from disk will be at {}",
                    self.t(*predicted_completion_ms)
                );
            }
            TraceEvent::QuantumExhausted {
                pid,
                during_syscall,
            } => {
                let suffix = if *during_syscall { " (during syscall)" } else { "" };
                println!(
                    "SCHEDULER: Time quantum exhausted for process `{}`{suffix}",
                    self.name(*pid)
                );
            }
            TraceEvent::ComputeStart { duration_ms, .. } => {
                println!(
                    "... data in cache, processing for {}",
                    self.t(*duration_ms)
                );
            }
            TraceEvent::DiskStart {
                request,
                seek_ms,
                rotation_ms,
                transfer_ms,
                completion_at_ms,
            } => {
                println!("\nSCHEDULER: {} (STARTING DISK I/O)", self.t(time_ms));
                println!("  [DISK] Starting {}", request_str(request));
                println!(
                    "         Seek time: {seek_ms:.2} ms, Rotation latency: {rotation_ms:.2} ms, Transfer: {transfer_ms:.2} ms"
                );
                println!(
                    "         Total time: {:.2} ms, Interrupt will occur at {}",
                    seek_ms + rotation_ms + transfer_ms,
                    self.t(*completion_at_ms)
                );
            }
            TraceEvent::Interrupt { request_id } => {
                println!("\n>>> DISK INTERRUPT at {} <<<", self.t(time_ms));
                println!("SCHEDULER: Disk interrupt handler was invoked for request {request_id}");
            }
            TraceEvent::BufferCleaned { buffer, sector } => {
                println!("  [CACHE] Buffer {buffer} (sector {sector}) marked CLEAN after write");
            }
            TraceEvent::ProcessUnblocked { pid, io_ms } => {
                println!(
                    "         Process {} UNBLOCKED, I/O time: {}",
                    self.name(*pid),
                    self.t(*io_ms)
                );
            }
            TraceEvent::ProcessFinished { pid } => {
                println!("SCHEDULER: Process {} COMPLETED", self.name(*pid));
            }
            TraceEvent::FlushBegin { dirty } => {
                println!("SCHEDULER: Flushing buffer cache");
                if *dirty == 0 {
                    println!("CACHE: No dirty buffers to flush");
                } else {
                    println!("CACHE: Flushing {dirty} dirty buffers");
                }
            }
            TraceEvent::FlushQueued { request, buffer } => {
                println!(
                    "CACHE: Buffer ({buffer}:{}) scheduled for I/O (WRITE)",
                    request.sector
                );
            }
            TraceEvent::BufferFreed { buffer } => {
                println!("CACHE: Buffer ({buffer}) removed from cache and freed");
            }
            TraceEvent::IdleAdvance { to_ms } => {
                println!("SCHEDULER: CPU idle, sleeping until {}", self.t(*to_ms));
            }
        }
    }
}

/// The settings block printed ahead of a detailed trace.
pub fn print_settings(config: &SimConfig) {
    let us = config.time_unit_microseconds;
    let t = |v_ms: f64| -> String {
        if us {
            format!("{}", (v_ms * 1_000.0).round() as i64)
        } else {
            format!("{v_ms:.2}")
        }
    };
    println!();
    println!("Settings:");
    println!("    syscall_read_time   {}", t(config.syscall_read_ms));
    println!("    syscall_write_time  {}", t(config.syscall_write_ms));
    println!("    disk_intr_time      {}", t(config.interrupt_handler_ms));
    println!("    quantum_time        {}", t(config.time_quantum_ms));
    println!("    before_writing_time {}", t(config.process_write_ms));
    println!("    after_reading_time  {}", t(config.process_read_ms));
    println!();
    println!("    buffers_num         {}", config.buffer_count);
    println!("    lfu_left_max        {}", config.lfu_left_max);
    println!("    lfu_middle_max      {}", config.lfu_middle_max);
    println!();
    println!("    tracks_num          {}", config.disk_tracks);
    println!("    sectors_per_track   {}", config.sectors_per_track);
    println!("    track_seek_time     {}", t(config.track_seek_time_ms));
    println!("    rewind_seek_time    {}", t(config.edge_seek_time_ms));
    println!();
    println!("    rotation_delay_time {}", t(config.rotation_latency_ms()));
    println!("    sector_access_time  {}", t(config.sector_rw_ms()));
    println!();
}

/// Banner printed when a run starts.
pub fn print_run_banner(policy: PolicyKind, process_count: usize) {
    println!("\n{}", "=".repeat(80));
    println!("SIMULATION START");
    println!("Scheduling algorithm: {policy}");
    println!("Buffer cache algorithm: LFU with three segments");
    println!("Number of processes: {process_count}");
    println!("{}\n", "=".repeat(80));
}

/// Final statistics block.
pub fn print_report(report: &SimReport) {
    println!("\n{}", "=".repeat(80));
    println!("SIMULATION COMPLETED");
    println!("{}", "=".repeat(80));
    if report.system.cap_hit {
        println!("\n[WARNING] Iteration cap reached; statistics are partial");
    }

    println!("\n[DISK STATISTICS]");
    println!("  Completed requests: {}", report.disk.completed_requests);
    println!("  Average seek time: {:.2} ms", report.disk.avg_seek_ms);
    println!(
        "  Average rotational latency: {:.2} ms",
        report.disk.avg_rotation_ms
    );
    println!(
        "  Average transfer time: {:.2} ms",
        report.disk.avg_transfer_ms
    );
    println!("  Total disk time: {:.2} ms", report.disk.total_disk_ms);

    println!("\n[CACHE STATISTICS]");
    println!("  Hits: {}", report.cache.hits);
    println!("  Misses: {}", report.cache.misses);
    println!("  Hit rate: {:.2}%", report.cache.hit_rate * 100.0);

    println!("\n[SYSTEM STATISTICS]");
    println!(
        "  Total simulation time: {:.2} ms",
        report.system.total_ms
    );
    println!(
        "  Total system call time: {:.2} ms",
        report.system.syscall_ms
    );
    println!(
        "  Total interrupt handler time: {:.2} ms",
        report.system.interrupt_ms
    );
    println!(
        "  Total process execution time: {:.2} ms",
        report.system.compute_ms
    );

    println!("\n[PROCESS STATISTICS]");
    for p in &report.processes {
        let Some(total) = p.total_ms else {
            println!("  {}: did not finish ({:.1}% done)", p.name, p.progress);
            continue;
        };
        if total <= 0.0 {
            continue;
        }
        println!("  {}:", p.name);
        println!("    Total time: {total:.2} ms");
        println!(
            "    CPU time: {:.2} ms ({:.1}%)",
            p.cpu_ms,
            p.cpu_ms / total * 100.0
        );
        println!(
            "    I/O time: {:.2} ms ({:.1}%)",
            p.io_ms,
            p.io_ms / total * 100.0
        );
        println!(
            "    Wait time: {:.2} ms ({:.1}%)",
            p.wait_ms,
            p.wait_ms / total * 100.0
        );
        println!("    Progress: {:.1}%", p.progress);
    }
}

/// Side-by-side table plus the best-in-class analysis.
pub fn print_comparison(reports: &[SimReport]) {
    println!("\n{}", "=".repeat(80));
    println!("ALGORITHM COMPARISON RESULTS");
    println!("{}", "=".repeat(80));

    println!(
        "\n{:<10} {:<14} {:<14} {:<12} {:<10} {:<10}",
        "Algorithm", "Total Time", "Disk Time", "Avg Seek", "Hit Rate", "Requests"
    );
    println!("{}", "-".repeat(80));
    for r in reports {
        println!(
            "{:<10} {:<14.2} {:<14.2} {:<12.2} {:<10.2} {:<10}",
            r.policy,
            r.system.total_ms,
            r.disk.total_disk_ms,
            r.disk.avg_seek_ms,
            r.cache.hit_rate * 100.0,
            r.disk.completed_requests
        );
    }

    let best = |key: fn(&SimReport) -> f64, invert: bool| -> Option<&SimReport> {
        reports.iter().min_by(|a, b| {
            let (ka, kb) = (key(a), key(b));
            if invert {
                kb.total_cmp(&ka)
            } else {
                ka.total_cmp(&kb)
            }
        })
    };

    println!("\n{}", "=".repeat(80));
    println!("PERFORMANCE ANALYSIS");
    println!("{}", "=".repeat(80));
    if let Some(r) = best(|r| r.system.total_ms, false) {
        println!(
            "\nBest overall performance: {} ({:.2} ms)",
            r.policy, r.system.total_ms
        );
    }
    if let Some(r) = best(|r| r.disk.avg_seek_ms, false) {
        println!(
            "Best seek performance: {} ({:.2} ms average seek time)",
            r.policy, r.disk.avg_seek_ms
        );
    }
    if let Some(r) = best(|r| r.cache.hit_rate, true) {
        println!(
            "Best cache performance: {} ({:.2}% hit rate)",
            r.policy,
            r.cache.hit_rate * 100.0
        );
    }
}
