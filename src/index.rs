// Copyright (c) 2024-present, fjall-rs
// This source code is licensed under both the Apache 2.0 and MIT License
// (found in the LICENSE-* files in the repository)

use crate::{
    applier::{CounterApplier, UpsertApplier}, cache::ResultCache, config::IndexEnv, key::KeyComparator, mems::MemList, metrics::Metrics,
    range::RangeTree,
};
use std::sync::Arc;

/// The mutable index handle, as the lookup core sees it: a mem-tree list,
/// a range tree, a result cache, comparators, statistics, and an
/// environment.
///
/// Specified only at this interface; the mutable index handle's internals
/// (compaction, dumping, range splitting) are owned entirely outside this
/// core's scope. This crate still supplements a concrete, minimal
/// implementation of the interface, assembled from
/// `MemList`/`ResultCache`/`RangeTree`/`Metrics`, so the lookup core is
/// runnable and testable end-to-end.
pub struct Index {
    /// A name identifying this index in log output and tracking calls.
    pub name: String,

    /// The active + sealed mem-trees, and the restart-protocol version
    /// counter.
    ///
    /// Held behind an `Arc` (rather than owned directly) so that test
    /// doubles for other collaborators — e.g. a run iterator standing in
    /// for a concurrent dump — can hold a handle to the very same mem list
    /// the lookup orchestrator watches for a `mem_list_version` change.
    pub mems: Arc<MemList>,

    /// Maps keys to the disk range owning them.
    pub range_tree: Arc<dyn RangeTree>,

    /// The shared result cache.
    pub cache: ResultCache,

    /// Full key comparator / exact-lookup arity.
    pub cmp_def: KeyComparator,

    /// Per-index statistics counters.
    pub metrics: Metrics,

    /// Tunables (latency threshold, arena budget).
    pub env: IndexEnv,

    /// Composes an `Upsert` delta with its base tuple at materialization
    /// time. Schema-specific, so owned by the index rather than passed
    /// per-call.
    pub applier: Arc<dyn UpsertApplier>,
}

impl Index {
    /// Builds an index over `range_tree`, with `part_count` fields per
    /// exact-lookup key and the default [`CounterApplier`].
    #[must_use]
    pub fn new(name: impl Into<String>, range_tree: Arc<dyn RangeTree>, part_count: usize) -> Self {
        Self::with_applier(name, range_tree, part_count, Arc::new(CounterApplier))
    }

    /// Builds an index with an explicit, schema-specific applier.
    #[must_use]
    pub fn with_applier(name: impl Into<String>, range_tree: Arc<dyn RangeTree>, part_count: usize, applier: Arc<dyn UpsertApplier>) -> Self {
        Self {
            name: name.into(),
            mems: Arc::new(MemList::new()),
            range_tree,
            cache: ResultCache::with_capacity_bytes(16 * 1024 * 1024),
            cmp_def: KeyComparator::new(part_count),
            metrics: Metrics::default(),
            env: IndexEnv::new(),
            applier,
        }
    }

    /// Builds an index with a custom environment (e.g. a tiny arena budget
    /// to exercise `OutOfMemory`, or a near-zero too-long threshold to
    /// exercise the latency warning).
    #[must_use]
    pub fn with_env(mut self, env: IndexEnv) -> Self {
        self.env = env;
        self
    }
}
