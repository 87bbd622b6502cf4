// Copyright (c) 2024-present, fjall-rs
// This source code is licensed under both the Apache 2.0 and MIT License
// (found in the LICENSE-* files in the repository)

use std::sync::atomic::AtomicUsize;
use std::sync::atomic::Ordering::Relaxed;

/// Per-index statistics counters, backed by `AtomicUsize` with `Relaxed`
/// ordering and plain accessor methods.
#[derive(Debug, Default)]
pub struct Metrics {
    /// Number of lookups started.
    pub(crate) lookups: AtomicUsize,

    /// Number of lookups that restarted after a mem-list version change.
    pub(crate) restarts: AtomicUsize,

    /// Number of TxW write-set probes performed.
    pub(crate) txw_probes: AtomicUsize,

    /// Number of TxW probes that produced a hit.
    pub(crate) txw_hits: AtomicUsize,

    /// Number of cache probes performed.
    pub(crate) cache_probes: AtomicUsize,

    /// Number of cache probes that produced a hit (present or absent).
    pub(crate) cache_hits: AtomicUsize,

    /// Number of mem-tree scans performed.
    pub(crate) mem_scans: AtomicUsize,

    /// Lookups that produced a present tuple.
    pub(crate) gets: AtomicUsize,

    /// Run statement references currently held across all in-flight
    /// lookups. Used by the cleanup-law test to assert balance: it must
    /// return to zero after every call.
    pub(crate) run_refs_held: AtomicUsize,

    /// Slice pins currently held across all in-flight lookups. Same
    /// balance contract as `run_refs_held`.
    pub(crate) slice_pins_held: AtomicUsize,
}

impl Metrics {
    pub(crate) fn bump_lookup(&self) {
        self.lookups.fetch_add(1, Relaxed);
    }

    pub(crate) fn bump_restart(&self) {
        self.restarts.fetch_add(1, Relaxed);
    }

    pub(crate) fn bump_txw_probe(&self) {
        self.txw_probes.fetch_add(1, Relaxed);
    }

    pub(crate) fn bump_txw_hit(&self) {
        self.txw_hits.fetch_add(1, Relaxed);
    }

    pub(crate) fn bump_cache_probe(&self) {
        self.cache_probes.fetch_add(1, Relaxed);
    }

    pub(crate) fn bump_cache_hit(&self) {
        self.cache_hits.fetch_add(1, Relaxed);
    }

    pub(crate) fn bump_mem_scan(&self) {
        self.mem_scans.fetch_add(1, Relaxed);
    }

    pub(crate) fn bump_get(&self) {
        self.gets.fetch_add(1, Relaxed);
    }

    pub(crate) fn run_ref_acquired(&self) {
        self.run_refs_held.fetch_add(1, Relaxed);
    }

    pub(crate) fn run_ref_released(&self) {
        self.run_refs_held.fetch_sub(1, Relaxed);
    }

    pub(crate) fn slice_pinned(&self) {
        self.slice_pins_held.fetch_add(1, Relaxed);
    }

    pub(crate) fn slice_unpinned(&self) {
        self.slice_pins_held.fetch_sub(1, Relaxed);
    }

    /// Number of lookups started so far.
    #[must_use]
    pub fn lookup_count(&self) -> usize {
        self.lookups.load(Relaxed)
    }

    /// Number of restarts triggered by a mem-list version change.
    #[must_use]
    pub fn restart_count(&self) -> usize {
        self.restarts.load(Relaxed)
    }

    /// Run-statement references outstanding right now. Should be zero
    /// between calls — a nonzero count after a lookup returns is a leak.
    #[must_use]
    pub fn outstanding_run_refs(&self) -> usize {
        self.run_refs_held.load(Relaxed)
    }

    /// Slice pins outstanding right now. Zero between calls is the same
    /// cleanup-law invariant, applied to pins instead of refs.
    #[must_use]
    pub fn outstanding_slice_pins(&self) -> usize {
        self.slice_pins_held.load(Relaxed)
    }
}
