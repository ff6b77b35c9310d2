//! LOOK: elevator sweep with direction reversal.
//!
//! Forward serves the smallest track at or beyond the head; when the sweep is
//! exhausted the direction reverses and the smallest track overall is served
//! (symmetric going backward). Equal tracks are served first-enqueued-first.
//!
//! Anti-starvation: once the same track has been served `max_same_track`
//! consecutive times, the current candidate is dropped from the queue without
//! being serviced and selection runs again. The dropped request never
//! completes — a modelling artifact carried over from the system this
//! simulator reproduces.

use crate::disk::DiskRequest;

use super::{DiskScheduler, QueueSnapshot, briefs};

#[derive(Debug)]
pub struct LookScheduler {
    queue: Vec<DiskRequest>,
    forward: bool,
    max_same_track: u32,
    same_track_count: u32,
    last_track: Option<u32>,
}

impl LookScheduler {
    pub fn new(max_same_track: u32) -> Self {
        Self {
            queue: Vec::new(),
            forward: true,
            max_same_track,
            same_track_count: 0,
            last_track: None,
        }
    }
}

/// Index of the smallest-track request satisfying `keep`; ties keep the
/// earliest-enqueued entry.
fn first_min_track(queue: &[DiskRequest], keep: impl Fn(u32) -> bool) -> Option<usize> {
    let mut best: Option<usize> = None;
    for (i, request) in queue.iter().enumerate() {
        if !keep(request.track) {
            continue;
        }
        if best.is_none_or(|b| request.track < queue[b].track) {
            best = Some(i);
        }
    }
    best
}

/// Index of the largest-track request satisfying `keep`; ties keep the
/// earliest-enqueued entry.
fn first_max_track(queue: &[DiskRequest], keep: impl Fn(u32) -> bool) -> Option<usize> {
    let mut best: Option<usize> = None;
    for (i, request) in queue.iter().enumerate() {
        if !keep(request.track) {
            continue;
        }
        if best.is_none_or(|b| request.track > queue[b].track) {
            best = Some(i);
        }
    }
    best
}

impl DiskScheduler for LookScheduler {
    fn name(&self) -> &'static str {
        "LOOK"
    }

    fn enqueue(&mut self, request: DiskRequest) {
        self.queue.push(request);
    }

    fn pop_next(&mut self, current_track: u32) -> Option<DiskRequest> {
        loop {
            if self.queue.is_empty() {
                return None;
            }

            let idx = if self.forward {
                match first_min_track(&self.queue, |t| t >= current_track) {
                    Some(i) => i,
                    None => {
                        self.forward = false;
                        first_min_track(&self.queue, |_| true).expect("queue is non-empty")
                    }
                }
            } else {
                match first_max_track(&self.queue, |t| t <= current_track) {
                    Some(i) => i,
                    None => {
                        self.forward = true;
                        first_max_track(&self.queue, |_| true).expect("queue is non-empty")
                    }
                }
            };

            let track = self.queue[idx].track;
            if self.last_track == Some(track) {
                self.same_track_count += 1;
                if self.same_track_count >= self.max_same_track {
                    self.queue.remove(idx);
                    self.same_track_count = 0;
                    continue;
                }
            } else {
                self.same_track_count = 1;
                self.last_track = Some(track);
            }

            return Some(self.queue.remove(idx));
        }
    }

    fn has_pending(&self) -> bool {
        !self.queue.is_empty()
    }

    fn snapshot(&self) -> QueueSnapshot {
        QueueSnapshot {
            active: briefs(&self.queue),
            incoming: Vec::new(),
        }
    }
}
