//! Segmented LFU buffer cache.
//!
//! Three most-recent-first segments: Left (hot), Middle (warm), Right
//! (cold). Every access lands the buffer at the front of Left; the access
//! counter is bumped only when the buffer re-enters Left from Middle or
//! Right. Overflow demotes Left tails into Middle and Middle tails into
//! Right, leaving counters untouched. Eviction prefers the free pool, then
//! clean Right buffers with the smallest counter, then dirty Right buffers,
//! then the Middle tail, then the Left tail.
//!
//! A dirty buffer evicted here is dropped without write-back; the kernel
//! flushes surviving dirty buffers at end of run.

use std::collections::{HashMap, VecDeque};

use crate::config::SimConfig;
use crate::stats::CacheStats;

/// Index into the cache's buffer arena.
pub type BufferId = usize;

/// Frequency band a cached buffer currently sits in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Segment {
    Left,
    Middle,
    Right,
}

impl std::fmt::Display for Segment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Left => write!(f, "left"),
            Self::Middle => write!(f, "middle"),
            Self::Right => write!(f, "right"),
        }
    }
}

/// One cache buffer. Lives for the whole simulation; its sector binding is
/// created on a miss, replaced on eviction and cleared by the final flush.
#[derive(Debug, Clone)]
pub struct Buffer {
    pub id: BufferId,
    pub sector: Option<u64>,
    pub dirty: bool,
    /// LFU counter; non-decreasing while the sector binding lasts.
    pub counter: u64,
    pub segment: Option<Segment>,
}

impl Buffer {
    fn new(id: BufferId) -> Self {
        Self {
            id,
            sector: None,
            dirty: false,
            counter: 0,
            segment: None,
        }
    }
}

/// Where a miss obtained its buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AcquireSource {
    FreePool,
    RightClean,
    RightDirty,
    MiddleTail,
    LeftTail,
}

/// Result of one [`BufferCache::access`] call.
#[derive(Debug, Clone)]
pub struct Access {
    pub buffer: BufferId,
    pub hit: bool,
    /// True when the kernel must read the sector from disk (read miss).
    pub needs_disk_read: bool,
    /// Segment the buffer occupied before promotion (hits only).
    pub prior_segment: Option<Segment>,
    /// Sector displaced from the acquired buffer (misses that evicted).
    pub evicted_sector: Option<u64>,
    /// Whether the displaced sector was dirty when dropped.
    pub evicted_dirty: bool,
    /// Acquisition path (misses only).
    pub acquired_from: Option<AcquireSource>,
}

/// Condensed per-buffer view for trace output.
#[derive(Debug, Clone, PartialEq)]
pub struct BufferBrief {
    pub id: BufferId,
    pub sector: u64,
    pub dirty: bool,
    pub counter: u64,
}

/// The three segment lists at one instant, most recent first.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CacheSnapshot {
    pub left: Vec<BufferBrief>,
    pub middle: Vec<BufferBrief>,
    pub right: Vec<BufferBrief>,
}

/// Sector-indexed buffer cache with three LFU segments.
#[derive(Debug)]
pub struct BufferCache {
    buffers: Vec<Buffer>,
    left: VecDeque<BufferId>,
    middle: VecDeque<BufferId>,
    right: VecDeque<BufferId>,
    free: VecDeque<BufferId>,
    index: HashMap<u64, BufferId>,
    left_max: usize,
    middle_max: usize,
    pub hits: u64,
    pub misses: u64,
}

impl BufferCache {
    pub fn new(config: &SimConfig) -> Self {
        Self::with_sizes(config.buffer_count, config.lfu_left_max, config.lfu_middle_max)
    }

    pub fn with_sizes(buffer_count: usize, left_max: usize, middle_max: usize) -> Self {
        Self {
            buffers: (0..buffer_count).map(Buffer::new).collect(),
            left: VecDeque::new(),
            middle: VecDeque::new(),
            right: VecDeque::new(),
            free: (0..buffer_count).collect(),
            index: HashMap::new(),
            left_max,
            middle_max,
            hits: 0,
            misses: 0,
        }
    }

    pub fn buffer(&self, id: BufferId) -> &Buffer {
        &self.buffers[id]
    }

    /// Constant-time sector lookup.
    pub fn lookup(&self, sector: u64) -> Option<BufferId> {
        self.index.get(&sector).copied()
    }

    /// Access `sector`, promoting on a hit or binding a buffer on a miss.
    pub fn access(&mut self, sector: u64, write: bool) -> Access {
        if let Some(id) = self.lookup(sector) {
            self.hits += 1;
            let prior_segment = self.buffers[id].segment;
            self.promote(id);
            if write {
                self.buffers[id].dirty = true;
            }
            return Access {
                buffer: id,
                hit: true,
                needs_disk_read: false,
                prior_segment,
                evicted_sector: None,
                evicted_dirty: false,
                acquired_from: None,
            };
        }

        self.misses += 1;
        let (id, acquired_from) = self.acquire();

        let evicted_sector = self.buffers[id].sector;
        let evicted_dirty = evicted_sector.is_some() && self.buffers[id].dirty;
        if let Some(old) = evicted_sector {
            self.index.remove(&old);
        }

        let buffer = &mut self.buffers[id];
        buffer.sector = Some(sector);
        buffer.counter = 1;
        buffer.dirty = write;
        buffer.segment = Some(Segment::Left);
        self.index.insert(sector, id);
        self.left.push_front(id);
        self.rebalance();

        Access {
            buffer: id,
            hit: false,
            needs_disk_read: !write,
            prior_segment: None,
            evicted_sector,
            evicted_dirty,
            acquired_from: Some(acquired_from),
        }
    }

    /// Move a cached buffer to the front of Left. The counter is bumped only
    /// on re-entry from the colder segments.
    fn promote(&mut self, id: BufferId) {
        let prior = self.buffers[id].segment;
        match prior {
            Some(Segment::Left) => detach(&mut self.left, id),
            Some(Segment::Middle) => detach(&mut self.middle, id),
            Some(Segment::Right) => detach(&mut self.right, id),
            None => unreachable!("promoted buffer {id} is not in any segment"),
        }
        if matches!(prior, Some(Segment::Middle) | Some(Segment::Right)) {
            self.buffers[id].counter += 1;
        }
        self.buffers[id].segment = Some(Segment::Left);
        self.left.push_front(id);
        self.rebalance();
    }

    /// Demote overflow: Left tail into Middle, then Middle tail into Right.
    /// Counters are untouched.
    fn rebalance(&mut self) {
        while self.left.len() > self.left_max {
            let id = self.left.pop_back().expect("left overflow implies a tail");
            self.buffers[id].segment = Some(Segment::Middle);
            self.middle.push_front(id);
        }
        while self.middle.len() > self.middle_max {
            let id = self
                .middle
                .pop_back()
                .expect("middle overflow implies a tail");
            self.buffers[id].segment = Some(Segment::Right);
            self.right.push_front(id);
        }
    }

    /// Obtain a detached buffer for a miss, evicting if the pool is dry.
    ///
    /// Panics when every list is empty; that cannot happen with at least one
    /// buffer configured and indicates a broken partition invariant.
    fn acquire(&mut self) -> (BufferId, AcquireSource) {
        if let Some(id) = self.free.pop_front() {
            self.buffers[id].segment = None;
            return (id, AcquireSource::FreePool);
        }

        if !self.right.is_empty() {
            // Clean buffers first, smallest counter; ties keep the first
            // encountered scanning from the most recently demoted end.
            let clean = self.scan_right(|b| !b.dirty);
            if let Some(pos) = clean {
                let id = self.right.remove(pos).expect("scanned position exists");
                self.buffers[id].segment = None;
                return (id, AcquireSource::RightClean);
            }
            let pos = self
                .scan_right(|_| true)
                .expect("right segment is non-empty");
            let id = self.right.remove(pos).expect("scanned position exists");
            self.buffers[id].segment = None;
            return (id, AcquireSource::RightDirty);
        }

        if let Some(id) = self.middle.pop_back() {
            self.buffers[id].segment = None;
            return (id, AcquireSource::MiddleTail);
        }

        if let Some(id) = self.left.pop_back() {
            self.buffers[id].segment = None;
            return (id, AcquireSource::LeftTail);
        }

        panic!("buffer cache exhausted: no free, cached or evictable buffer");
    }

    /// Position in Right of the smallest-counter buffer passing `keep`;
    /// ties keep the first encountered.
    fn scan_right(&self, keep: impl Fn(&Buffer) -> bool) -> Option<usize> {
        let mut best: Option<(usize, u64)> = None;
        for (pos, &id) in self.right.iter().enumerate() {
            let buffer = &self.buffers[id];
            if !keep(buffer) {
                continue;
            }
            if best.is_none_or(|(_, c)| buffer.counter < c) {
                best = Some((pos, buffer.counter));
            }
        }
        best.map(|(pos, _)| pos)
    }

    /// All dirty buffers, in buffer-id order (the order the flush walks).
    pub fn dirty_buffers(&self) -> Vec<BufferId> {
        self.buffers
            .iter()
            .filter(|b| b.dirty)
            .map(|b| b.id)
            .collect()
    }

    /// Mark the buffer holding `sector` clean, if still cached.
    pub fn mark_clean(&mut self, sector: u64) -> Option<BufferId> {
        let id = self.lookup(sector)?;
        self.buffers[id].dirty = false;
        Some(id)
    }

    /// Detach a buffer from its segment and the sector index, clear its
    /// fields and return it to the free pool.
    pub fn remove(&mut self, id: BufferId) {
        if let Some(sector) = self.buffers[id].sector {
            self.index.remove(&sector);
        }
        detach(&mut self.left, id);
        detach(&mut self.middle, id);
        detach(&mut self.right, id);
        let buffer = &mut self.buffers[id];
        buffer.sector = None;
        buffer.counter = 0;
        buffer.dirty = false;
        buffer.segment = None;
        self.free.push_back(id);
    }

    pub fn hit_rate(&self) -> f64 {
        let total = self.hits + self.misses;
        if total == 0 {
            0.0
        } else {
            self.hits as f64 / total as f64
        }
    }

    pub fn statistics(&self) -> CacheStats {
        CacheStats {
            hits: self.hits,
            misses: self.misses,
            hit_rate: self.hit_rate(),
        }
    }

    /// Segment contents for the trace, most recent first.
    pub fn snapshot(&self) -> CacheSnapshot {
        let brief = |ids: &VecDeque<BufferId>| {
            ids.iter()
                .map(|&id| {
                    let b = &self.buffers[id];
                    BufferBrief {
                        id,
                        sector: b.sector.expect("cached buffer has a sector"),
                        dirty: b.dirty,
                        counter: b.counter,
                    }
                })
                .collect()
        };
        CacheSnapshot {
            left: brief(&self.left),
            middle: brief(&self.middle),
            right: brief(&self.right),
        }
    }

    pub fn len_left(&self) -> usize {
        self.left.len()
    }

    pub fn len_middle(&self) -> usize {
        self.middle.len()
    }

    pub fn len_right(&self) -> usize {
        self.right.len()
    }

    pub fn len_free(&self) -> usize {
        self.free.len()
    }

    /// Structural invariants: the partition over {segments, free}, the
    /// segment caps, and the sector-index consistency. Cheap enough for a
    /// `debug_assert!` after every kernel step.
    pub fn invariants_hold(&self) -> bool {
        let partitioned = self.left.len() + self.middle.len() + self.right.len() + self.free.len()
            == self.buffers.len();
        let caps = self.left.len() <= self.left_max && self.middle.len() <= self.middle_max;
        let indexed = self
            .buffers
            .iter()
            .all(|b| match b.sector {
                Some(sector) => {
                    self.index.get(&sector) == Some(&b.id) && b.segment.is_some()
                }
                None => b.segment.is_none(),
            })
            && self.index.len() == self.buffers.iter().filter(|b| b.sector.is_some()).count();
        partitioned && caps && indexed
    }
}

fn detach(list: &mut VecDeque<BufferId>, id: BufferId) {
    if let Some(pos) = list.iter().position(|&x| x == id) {
        list.remove(pos);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cache(buffers: usize, left_max: usize, middle_max: usize) -> BufferCache {
        BufferCache::with_sizes(buffers, left_max, middle_max)
    }

    fn default_cache() -> BufferCache {
        // The stock geometry: 5 buffers, Left <= 4, Middle <= 3.
        cache(5, 4, 3)
    }

    // -----------------------------------------------------------------------
    // Hit / miss basics
    // -----------------------------------------------------------------------

    #[test]
    fn test_warmup_misses_fill_segments() {
        let mut c = default_cache();
        for sector in [100, 200, 300, 400, 500] {
            let access = c.access(sector, false);
            assert!(!access.hit);
            assert!(access.needs_disk_read);
        }
        assert_eq!(c.misses, 5);
        assert_eq!(c.hits, 0);
        // Left overflows at the fifth insert; one buffer demotes to Middle.
        assert_eq!(c.len_left(), 4);
        assert_eq!(c.len_middle(), 1);
        assert_eq!(c.len_free(), 0);
        assert!(c.invariants_hold());
    }

    #[test]
    fn test_hit_promotes_to_front_without_counter_bump() {
        let mut c = default_cache();
        c.access(100, false);
        c.access(200, false);
        let access = c.access(100, false);
        assert!(access.hit);
        assert_eq!(access.prior_segment, Some(Segment::Left));
        let snapshot = c.snapshot();
        assert_eq!(snapshot.left[0].sector, 100);
        // No cold-to-hot traversal happened, so the counter stays at 1.
        assert_eq!(snapshot.left[0].counter, 1);
    }

    #[test]
    fn test_promotion_idempotent_in_left() {
        let mut c = default_cache();
        c.access(100, false);
        c.access(100, false);
        c.access(100, false);
        let id = c.lookup(100).unwrap();
        assert_eq!(c.buffer(id).counter, 1);
        assert_eq!(c.hits, 2);
    }

    #[test]
    fn test_counter_increments_on_cold_reentry() {
        // Tight segments force 100 down to Right quickly.
        let mut c = cache(3, 1, 1);
        c.access(100, false);
        c.access(200, false);
        c.access(300, false);
        let id = c.lookup(100).unwrap();
        assert_eq!(c.buffer(id).segment, Some(Segment::Right));
        assert_eq!(c.buffer(id).counter, 1);

        let access = c.access(100, false);
        assert!(access.hit);
        assert_eq!(access.prior_segment, Some(Segment::Right));
        assert_eq!(c.buffer(id).counter, 2);
        assert_eq!(c.buffer(id).segment, Some(Segment::Left));
    }

    #[test]
    fn test_demotion_preserves_counter() {
        let mut c = cache(3, 1, 1);
        c.access(100, false);
        let id = c.lookup(100).unwrap();
        c.access(200, false); // demotes 100 to middle
        assert_eq!(c.buffer(id).segment, Some(Segment::Middle));
        assert_eq!(c.buffer(id).counter, 1);
        c.access(300, false); // demotes 100 to right
        assert_eq!(c.buffer(id).segment, Some(Segment::Right));
        assert_eq!(c.buffer(id).counter, 1);
    }

    #[test]
    fn test_write_hit_dirties_in_place() {
        let mut c = default_cache();
        c.access(100, false);
        let access = c.access(100, true);
        assert!(access.hit);
        assert!(!access.needs_disk_read);
        assert!(c.buffer(access.buffer).dirty);
    }

    #[test]
    fn test_write_miss_binds_dirty_without_disk_read() {
        let mut c = default_cache();
        let access = c.access(100, true);
        assert!(!access.hit);
        assert!(!access.needs_disk_read);
        assert!(c.buffer(access.buffer).dirty);
    }

    // -----------------------------------------------------------------------
    // Eviction ladder
    // -----------------------------------------------------------------------

    #[test]
    fn test_free_pool_drains_in_id_order() {
        let mut c = default_cache();
        for (i, sector) in [10u64, 20, 30].iter().enumerate() {
            let access = c.access(*sector, false);
            assert_eq!(access.acquired_from, Some(AcquireSource::FreePool));
            assert_eq!(access.buffer, i);
        }
    }

    #[test]
    fn test_eviction_prefers_clean_right_with_smallest_counter() {
        let mut c = cache(3, 1, 1);
        // 100 dirty, then 200 and 300 push it down; 200 lands in Right too.
        c.access(100, true);
        c.access(200, false);
        c.access(300, false);
        c.access(200, false); // promote 200: counter 2, back to left
        c.access(300, false); // promote 300 as well
        // Right now holds only dirty 100; middle holds one of the others.
        // Access a new sector: right has no clean buffer, so the dirty one
        // with the smallest counter goes.
        let access = c.access(400, false);
        assert_eq!(access.acquired_from, Some(AcquireSource::RightDirty));
        assert_eq!(access.evicted_sector, Some(100));
        assert!(access.evicted_dirty);
        assert!(c.lookup(100).is_none());
        assert!(c.invariants_hold());
    }

    #[test]
    fn test_eviction_clean_beats_dirty_despite_counter() {
        let mut c = cache(4, 1, 1);
        // Build Right = [dirty(100, counter 1), clean(200, counter 1), ...].
        c.access(100, true);
        c.access(200, false);
        c.access(300, false);
        c.access(400, false);
        // Segments now: left=[400], middle=[300], right=[200(clean), 100(dirty)].
        let id_100 = c.lookup(100).unwrap();
        let id_200 = c.lookup(200).unwrap();
        assert_eq!(c.buffer(id_100).segment, Some(Segment::Right));
        assert_eq!(c.buffer(id_200).segment, Some(Segment::Right));

        let access = c.access(500, false);
        assert_eq!(access.acquired_from, Some(AcquireSource::RightClean));
        assert_eq!(access.evicted_sector, Some(200));
        assert!(!access.evicted_dirty);
        assert!(c.lookup(100).is_some(), "dirty buffer survives");
    }

    #[test]
    fn test_eviction_tie_break_first_encountered() {
        let mut c = cache(4, 1, 1);
        c.access(100, false);
        c.access(200, false);
        c.access(300, false);
        c.access(400, false);
        // Right (front to back) = [200, 100], both clean with counter 1; the
        // most recently demoted (200) is encountered first.
        let access = c.access(500, false);
        assert_eq!(access.evicted_sector, Some(200));
    }

    #[test]
    fn test_eviction_falls_back_to_middle_then_left() {
        let mut c = cache(2, 1, 1);
        c.access(100, false); // left=[100]
        c.access(200, false); // left=[200], middle=[100]
        // No free, no right: the middle tail goes first.
        let access = c.access(300, false);
        assert_eq!(access.acquired_from, Some(AcquireSource::MiddleTail));
        assert_eq!(access.evicted_sector, Some(100));

        // Shrink to a single buffer: only Left remains to steal from.
        let mut c = cache(1, 1, 1);
        c.access(100, false);
        let access = c.access(200, false);
        assert_eq!(access.acquired_from, Some(AcquireSource::LeftTail));
        assert_eq!(access.evicted_sector, Some(100));
        assert!(c.invariants_hold());
    }

    #[test]
    fn test_single_buffer_every_miss_evicts() {
        let mut c = cache(1, 1, 1);
        for sector in [1u64, 2, 3, 4] {
            c.access(sector, false);
        }
        assert_eq!(c.misses, 4);
        assert_eq!(c.lookup(4), Some(0));
        assert!(c.lookup(3).is_none());
    }

    #[test]
    fn test_counter_resets_on_reassignment() {
        let mut c = cache(1, 1, 1);
        c.access(100, false);
        c.access(100, false);
        c.access(200, false);
        assert_eq!(c.buffer(0).counter, 1);
        assert_eq!(c.buffer(0).sector, Some(200));
    }

    // -----------------------------------------------------------------------
    // Dirty enumeration and removal
    // -----------------------------------------------------------------------

    #[test]
    fn test_dirty_buffers_in_id_order() {
        let mut c = default_cache();
        c.access(300, true);
        c.access(100, false);
        c.access(200, true);
        assert_eq!(c.dirty_buffers(), vec![0, 2]);
    }

    #[test]
    fn test_mark_clean() {
        let mut c = default_cache();
        c.access(100, true);
        let id = c.mark_clean(100).unwrap();
        assert!(!c.buffer(id).dirty);
        assert!(c.mark_clean(999).is_none());
    }

    #[test]
    fn test_remove_returns_buffer_to_free_pool() {
        let mut c = default_cache();
        let access = c.access(100, true);
        c.remove(access.buffer);
        assert!(c.lookup(100).is_none());
        assert_eq!(c.len_free(), 5);
        let buffer = c.buffer(access.buffer);
        assert_eq!(buffer.sector, None);
        assert_eq!(buffer.counter, 0);
        assert!(!buffer.dirty);
        assert!(c.invariants_hold());
    }

    #[test]
    fn test_hit_rate() {
        let mut c = default_cache();
        assert_eq!(c.hit_rate(), 0.0);
        c.access(100, false);
        c.access(100, false);
        c.access(200, false);
        assert!((c.hit_rate() - 1.0 / 3.0).abs() < 1e-9);
    }
}
