// Copyright (c) 2024-present, fjall-rs
// This source code is licensed under both the Apache 2.0 and MIT License
// (found in the LICENSE-* files in the repository)

use crate::{
    slice::Slice,
    value::StatementRef,
};
use quick_cache::{sync::Cache as QuickCache, Weighter};

#[derive(Clone)]
struct EntryWeighter;

impl Weighter<Slice, StatementRef> for EntryWeighter {
    fn weight(&self, key: &Slice, item: &StatementRef) -> u64 {
        let value_len = item.value.as_ref().map_or(0, |v| v.len());
        (key.len() + value_len + 1) as u64
    }
}

/// The shared result cache, queried by key and populated only under the
/// latest-state view.
///
/// Stores terminal statements only (never bare upserts). A proven-absent
/// key is cached as a `Delete` statement carrying the LSN of the tombstone
/// that proved the absence (or LSN 0 if the key has no history at all — a
/// key with zero writes is absent under every view, so an always-visible
/// marker is sound). This distinguishes "not cached" from "cached as
/// missing" without a tri-state wrapper: "not cached" is a plain cache
/// miss, "cached as missing" is a hit whose statement happens to be a
/// `Delete` — and crucially, it carries a real LSN, so the cache scanner's
/// normal `lsn <= vlsn` visibility filter also governs whether a cached
/// absence applies under an older snapshot, exactly as it does for a
/// cached presence. See `DESIGN.md` for the alternative this replaced.
pub struct ResultCache {
    data: QuickCache<Slice, StatementRef, EntryWeighter, rustc_hash::FxBuildHasher>,
}

impl ResultCache {
    /// Creates a cache with roughly `capacity_bytes` of weight capacity.
    #[must_use]
    #[expect(clippy::expect_used, reason = "cache options are statically valid here")]
    pub fn with_capacity_bytes(capacity_bytes: u64) -> Self {
        let opts = quick_cache::OptionsBuilder::new()
            .weight_capacity(capacity_bytes)
            .estimated_items_capacity(10_000)
            .build()
            .expect("cache options should be valid");

        #[allow(clippy::default_trait_access)]
        let data = QuickCache::with_options(
            opts,
            EntryWeighter,
            Default::default(),
            quick_cache::sync::DefaultLifecycle::default(),
        );

        Self { data }
    }

    /// Probes the cache for `key`. `None` means "not cached" — the scanner
    /// must fall through to lower sources.
    #[must_use]
    pub fn get(&self, key: &Slice) -> Option<StatementRef> {
        self.data.get(key)
    }

    /// Installs `stmt` (a terminal statement — `Replace`/`Insert`, or a
    /// `Delete` standing in for a proven-absent key) as the cached result
    /// for `key`. Callers (see `crate::apply`) must only call this under
    /// the latest-state view.
    pub fn add(&self, key: Slice, stmt: StatementRef) {
        self.data.insert(key, stmt);
    }

    /// Number of entries currently cached.
    #[must_use]
    pub fn len(&self) -> usize {
        self.data.len()
    }

    /// Whether the cache holds no entries.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }
}
