//! FLOOK: LOOK over a frozen batch.
//!
//! Arrivals land in `incoming` and stay frozen there while the `active`
//! batch is serviced. When `active` drains, the queues swap and the new
//! batch is sorted by track. The sweep direction persists across swaps.
//! There is no anti-starvation counter; freezing bounds how long any batch
//! can be deferred.

use crate::disk::DiskRequest;

use super::{DiskScheduler, QueueSnapshot, briefs};

#[derive(Debug)]
pub struct FlookScheduler {
    active: Vec<DiskRequest>,
    incoming: Vec<DiskRequest>,
    forward: bool,
}

impl FlookScheduler {
    pub fn new(forward: bool) -> Self {
        Self {
            active: Vec::new(),
            incoming: Vec::new(),
            forward,
        }
    }

    /// Sweep selection over the active batch. The batch is sorted by track
    /// (stably, so equal tracks stay first-enqueued-first); scanning keeps
    /// the earliest entry of the chosen track.
    fn select(&mut self, current_track: u32) -> Option<usize> {
        if self.active.is_empty() {
            return None;
        }

        if self.forward {
            let ahead = self
                .active
                .iter()
                .position(|r| r.track >= current_track);
            match ahead {
                Some(i) => Some(i),
                None => {
                    self.forward = false;
                    // Sorted ascending: index 0 is the smallest track.
                    Some(0)
                }
            }
        } else {
            let behind = self
                .active
                .iter()
                .rposition(|r| r.track <= current_track);
            match behind {
                // rposition lands on the last entry of the chosen track;
                // walk back to its first-enqueued entry.
                Some(i) => Some(first_of_track(&self.active, i)),
                None => {
                    self.forward = true;
                    Some(first_of_track(&self.active, self.active.len() - 1))
                }
            }
        }
    }
}

/// First index sharing the track of `active[i]`, scanning left in the
/// track-sorted batch.
fn first_of_track(active: &[DiskRequest], i: usize) -> usize {
    let track = active[i].track;
    let mut first = i;
    while first > 0 && active[first - 1].track == track {
        first -= 1;
    }
    first
}

impl DiskScheduler for FlookScheduler {
    fn name(&self) -> &'static str {
        "FLOOK"
    }

    fn enqueue(&mut self, request: DiskRequest) {
        self.incoming.push(request);
    }

    fn pop_next(&mut self, current_track: u32) -> Option<DiskRequest> {
        if self.active.is_empty() {
            if self.incoming.is_empty() {
                return None;
            }
            self.active = std::mem::take(&mut self.incoming);
            self.active.sort_by_key(|r| r.track);
        }

        let idx = self.select(current_track)?;
        Some(self.active.remove(idx))
    }

    fn has_pending(&self) -> bool {
        !self.active.is_empty() || !self.incoming.is_empty()
    }

    fn snapshot(&self) -> QueueSnapshot {
        QueueSnapshot {
            active: briefs(&self.active),
            incoming: briefs(&self.incoming),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request(id: u64, track: u32) -> DiskRequest {
        DiskRequest::new(id, track as u64 * 500, 500, false, Some(1), 0.0)
    }

    #[test]
    fn test_swap_sorts_incoming_by_track() {
        let mut s = FlookScheduler::new(true);
        s.enqueue(request(1, 300));
        s.enqueue(request(2, 100));
        s.enqueue(request(3, 200));
        assert_eq!(s.pop_next(0).unwrap().track, 100);
        assert_eq!(s.pop_next(100).unwrap().track, 200);
        assert_eq!(s.pop_next(200).unwrap().track, 300);
    }

    #[test]
    fn test_arrivals_freeze_until_active_drains() {
        let mut s = FlookScheduler::new(true);
        s.enqueue(request(1, 100));
        s.enqueue(request(2, 400));
        // First pop swaps the batch in.
        assert_eq!(s.pop_next(0).unwrap().id, 1);
        // A closer request arriving mid-batch must not jump ahead.
        s.enqueue(request(3, 150));
        assert_eq!(s.pop_next(100).unwrap().id, 2);
        // Active drained; the frozen batch swaps in.
        assert_eq!(s.pop_next(400).unwrap().id, 3);
    }

    #[test]
    fn test_direction_reverses_when_batch_is_all_behind() {
        let mut s = FlookScheduler::new(true);
        s.enqueue(request(1, 50));
        s.enqueue(request(2, 30));
        // Forward from track 100: nothing ahead, flip backward and serve the
        // smallest track, then sweep down.
        assert_eq!(s.pop_next(100).unwrap().track, 30);
        assert_eq!(s.pop_next(30).unwrap().track, 50);
    }

    #[test]
    fn test_backward_initial_direction() {
        let mut s = FlookScheduler::new(false);
        s.enqueue(request(1, 80));
        s.enqueue(request(2, 40));
        assert_eq!(s.pop_next(100).unwrap().track, 80);
        assert_eq!(s.pop_next(80).unwrap().track, 40);
    }

    #[test]
    fn test_same_track_first_enqueued_wins_backward() {
        let mut s = FlookScheduler::new(false);
        s.enqueue(request(1, 60));
        s.enqueue(request(2, 60));
        assert_eq!(s.pop_next(100).unwrap().id, 1);
        assert_eq!(s.pop_next(60).unwrap().id, 2);
    }

    #[test]
    fn test_snapshot_separates_active_and_incoming() {
        let mut s = FlookScheduler::new(true);
        s.enqueue(request(1, 10));
        s.enqueue(request(2, 20));
        let _ = s.pop_next(0);
        s.enqueue(request(3, 30));
        let snapshot = s.snapshot();
        assert_eq!(snapshot.active.len(), 1);
        assert_eq!(snapshot.incoming.len(), 1);
        assert_eq!(snapshot.incoming[0].id, 3);
    }

    #[test]
    fn test_empty_pops_none() {
        let mut s = FlookScheduler::new(true);
        assert!(s.pop_next(0).is_none());
        assert!(!s.has_pending());
    }
}
