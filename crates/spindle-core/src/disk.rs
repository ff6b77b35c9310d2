//! Single-spindle rotational disk model.
//!
//! The model is stateless beyond the current head track and the running
//! totals. Service time of a request is seek + rotational latency + sector
//! transfer; the seek may go direct or rewind over either platter edge,
//! whichever is cheapest.

use crate::config::SimConfig;
use crate::stats::DiskStats;

/// One outstanding block I/O operation.
#[derive(Debug, Clone, PartialEq)]
pub struct DiskRequest {
    /// Monotonic id minted by the kernel.
    pub id: u64,
    /// Target sector.
    pub sector: u64,
    /// Track holding the sector (`sector / sectors_per_track`).
    pub track: u32,
    /// True for writes.
    pub write: bool,
    /// Originating process, or `None` for an end-of-run flush write.
    pub pid: Option<u32>,
    /// Virtual time the request was minted (ms).
    pub created_at: f64,
    /// Set by the interrupt handler when service finishes (ms).
    pub completed_at: Option<f64>,
}

impl DiskRequest {
    pub fn new(
        id: u64,
        sector: u64,
        sectors_per_track: u32,
        write: bool,
        pid: Option<u32>,
        created_at: f64,
    ) -> Self {
        Self {
            id,
            sector,
            track: (sector / sectors_per_track as u64) as u32,
            write,
            pid,
            created_at,
            completed_at: None,
        }
    }
}

impl std::fmt::Display for DiskRequest {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let op = if self.write { "WRITE" } else { "READ" };
        match self.pid {
            Some(pid) => write!(
                f,
                "Request#{}({op}, sector={}, track={}, proc={pid})",
                self.id, self.sector, self.track
            ),
            None => write!(
                f,
                "Request#{}({op}, sector={}, track={}, flush)",
                self.id, self.sector, self.track
            ),
        }
    }
}

/// The seek alternatives for one target track, in ms.
#[derive(Debug, Clone, Copy)]
pub struct SeekOptions {
    /// Straight head movement.
    pub direct_ms: f64,
    /// Rewind to track 0, then out to the target.
    pub via_edge_zero_ms: f64,
    /// Rewind to the last track, then back to the target.
    pub via_edge_last_ms: f64,
}

impl SeekOptions {
    /// Cheapest of the three moves.
    pub fn best(&self) -> f64 {
        self.direct_ms
            .min(self.via_edge_zero_ms)
            .min(self.via_edge_last_ms)
    }

    /// Cheaper of the two edge rewinds.
    pub fn best_edge(&self) -> f64 {
        self.via_edge_zero_ms.min(self.via_edge_last_ms)
    }
}

/// Per-request service time breakdown, in ms.
#[derive(Debug, Clone, Copy)]
pub struct ServiceTime {
    pub seek_ms: f64,
    pub rotation_ms: f64,
    pub transfer_ms: f64,
}

impl ServiceTime {
    pub fn total(&self) -> f64 {
        self.seek_ms + self.rotation_ms + self.transfer_ms
    }
}

/// Rotational disk with a movable head and cumulative service totals.
#[derive(Debug, Clone)]
pub struct Disk {
    tracks: u32,
    track_seek_ms: f64,
    edge_seek_ms: f64,
    rotation_latency_ms: f64,
    sector_rw_ms: f64,

    /// Track the head currently sits on.
    pub current_track: u32,
    pub total_seek_ms: f64,
    pub total_rotation_ms: f64,
    pub total_transfer_ms: f64,
    pub completed_requests: u64,
}

impl Disk {
    pub fn new(config: &SimConfig) -> Self {
        Self {
            tracks: config.disk_tracks,
            track_seek_ms: config.track_seek_time_ms,
            edge_seek_ms: config.edge_seek_time_ms,
            rotation_latency_ms: config.rotation_latency_ms(),
            sector_rw_ms: config.sector_rw_ms(),
            current_track: 0,
            total_seek_ms: 0.0,
            total_rotation_ms: 0.0,
            total_transfer_ms: 0.0,
            completed_requests: 0,
        }
    }

    /// Cost of every way to reach `target_track` from the current position.
    pub fn seek_options(&self, target_track: u32) -> SeekOptions {
        let distance = target_track.abs_diff(self.current_track) as f64;
        SeekOptions {
            direct_ms: distance * self.track_seek_ms,
            via_edge_zero_ms: self.edge_seek_ms + target_track as f64 * self.track_seek_ms,
            via_edge_last_ms: self.edge_seek_ms
                + (self.tracks - 1 - target_track) as f64 * self.track_seek_ms,
        }
    }

    /// Cheapest seek cost to `target_track`.
    pub fn seek_time_ms(&self, target_track: u32) -> f64 {
        self.seek_options(target_track).best()
    }

    /// Book a request into service: move the head, accumulate the totals and
    /// return the time the spindle will be busy.
    pub fn begin_service(&mut self, request: &DiskRequest) -> ServiceTime {
        let service = ServiceTime {
            seek_ms: self.seek_time_ms(request.track),
            rotation_ms: self.rotation_latency_ms,
            transfer_ms: self.sector_rw_ms,
        };
        self.total_seek_ms += service.seek_ms;
        self.total_rotation_ms += service.rotation_ms;
        self.total_transfer_ms += service.transfer_ms;
        self.current_track = request.track;
        self.completed_requests += 1;
        service
    }

    /// Aggregate statistics over everything serviced so far.
    pub fn statistics(&self) -> DiskStats {
        if self.completed_requests == 0 {
            return DiskStats::default();
        }
        let n = self.completed_requests as f64;
        DiskStats {
            completed_requests: self.completed_requests,
            avg_seek_ms: self.total_seek_ms / n,
            avg_rotation_ms: self.total_rotation_ms / n,
            avg_transfer_ms: self.total_transfer_ms / n,
            total_disk_ms: self.total_seek_ms + self.total_rotation_ms + self.total_transfer_ms,
        }
    }
}
