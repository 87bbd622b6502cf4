// Copyright (c) 2024-present, fjall-rs
// This source code is licensed under both the Apache 2.0 and MIT License
// (found in the LICENSE-* files in the repository)

use crate::run::RunIteratorFactory;
use std::sync::{atomic::AtomicUsize, atomic::Ordering::Acquire, atomic::Ordering::Release, Arc};

/// A disk slice: a keyrange window over a run, referenced by a
/// [`Range`]. Supports pin/unpin, a refcount preventing compaction from
/// reclaiming the underlying run files while a scan is in flight.
///
/// Built as an `Arc<...>` plus a `Drop`-releases guard, generalized from a
/// single boolean "in use" flag to a counter, since multiple concurrent
/// lookups may pin the same slice at once.
pub struct RunSlice {
    run: Arc<dyn RunIteratorFactory>,
    pins: AtomicUsize,
}

impl RunSlice {
    /// Builds a slice backed by `run`.
    #[must_use]
    pub fn new(run: Arc<dyn RunIteratorFactory>) -> Self {
        Self {
            run,
            pins: AtomicUsize::new(0),
        }
    }

    /// Current pin count. Exposed for the cleanup-law tests.
    #[must_use]
    pub fn pin_count(&self) -> usize {
        self.pins.load(Acquire)
    }

    fn pin(&self) {
        self.pins.fetch_add(1, Release);
    }

    fn unpin(&self) {
        self.pins.fetch_sub(1, Release);
    }

    /// Opens a fresh equal-key iterator against this slice's run.
    #[must_use]
    pub fn open_iterator(&self) -> Box<dyn crate::run::RunIterator> {
        self.run.open()
    }
}

/// RAII pin guard: unpins on drop, pairing every [`RunSlice`] pin with an
/// unpin on every exit path (including a mid-scan error).
pub struct PinGuard<'a> {
    slice: &'a RunSlice,
}

impl<'a> PinGuard<'a> {
    /// Pins `slice` and returns a guard that unpins it on drop.
    #[must_use]
    pub fn new(slice: &'a RunSlice) -> Self {
        slice.pin();
        Self { slice }
    }

    /// The pinned slice.
    #[must_use]
    pub fn slice(&self) -> &RunSlice {
        self.slice
    }
}

impl Drop for PinGuard<'_> {
    fn drop(&mut self) {
        self.slice.unpin();
    }
}

/// A contiguous keyspace partition: an ordered list of disk slices and a
/// slice count.
#[derive(Default)]
pub struct Range {
    slices: Vec<Arc<RunSlice>>,
}

impl Range {
    /// Builds a range owning `slices`, in scan order.
    #[must_use]
    pub fn new(slices: Vec<Arc<RunSlice>>) -> Self {
        Self { slices }
    }

    /// Number of slices owned by this range.
    #[must_use]
    pub fn slice_count(&self) -> usize {
        self.slices.len()
    }

    /// The slices, in scan order.
    #[must_use]
    pub fn slices(&self) -> &[Arc<RunSlice>] {
        &self.slices
    }
}

/// Maps keys to the range owning them. Every key in the index's keyspace
/// is covered by exactly one range; [`RangeTree::find_by_key`] must always
/// succeed for a key the index actually owns.
pub trait RangeTree: Send + Sync {
    /// Returns the unique range whose keyspace contains `key`.
    fn find_by_key(&self, key: &crate::slice::Slice) -> Option<Arc<Range>>;
}

/// A single-range tree: every key maps to the same range. Sufficient as a
/// test double and as the reference [`crate::index::Index`]'s default,
/// since this core never needs to model keyspace partitioning or range
/// scans itself.
pub struct SingleRange {
    range: Arc<Range>,
}

impl SingleRange {
    /// Builds a tree that maps every key to `range`.
    #[must_use]
    pub fn new(range: Arc<Range>) -> Self {
        Self { range }
    }
}

impl RangeTree for SingleRange {
    fn find_by_key(&self, _key: &crate::slice::Slice) -> Option<Arc<Range>> {
        Some(self.range.clone())
    }
}
