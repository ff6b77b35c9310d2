//! FIFO: strict insertion order, head position ignored.

use std::collections::VecDeque;

use crate::disk::DiskRequest;

use super::{DiskScheduler, QueueSnapshot, RequestBrief};

#[derive(Debug, Default)]
pub struct FifoScheduler {
    queue: VecDeque<DiskRequest>,
}

impl FifoScheduler {
    pub fn new() -> Self {
        Self::default()
    }
}

impl DiskScheduler for FifoScheduler {
    fn name(&self) -> &'static str {
        "FIFO"
    }

    fn enqueue(&mut self, request: DiskRequest) {
        self.queue.push_back(request);
    }

    fn pop_next(&mut self, _current_track: u32) -> Option<DiskRequest> {
        self.queue.pop_front()
    }

    fn has_pending(&self) -> bool {
        !self.queue.is_empty()
    }

    fn snapshot(&self) -> QueueSnapshot {
        QueueSnapshot {
            active: self.queue.iter().map(RequestBrief::from).collect(),
            incoming: Vec::new(),
        }
    }
}
