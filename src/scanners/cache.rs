// Copyright (c) 2024-present, fjall-rs
// This source code is licensed under both the Apache 2.0 and MIT License
// (found in the LICENSE-* files in the repository)

use crate::{
    arena::Arena,
    cache::ResultCache,
    error::Result,
    history::{History, SourceTag},
    metrics::Metrics,
    seqno::ReadView,
    slice::Slice,
};

/// Queries the cache by key. If a statement is returned and its LSN is
/// visible under `view`, appends one node tagged `Cache`.
///
/// The cache stores only full tuples and delete markers (never bare
/// upserts), so the appended node is always terminal.
pub fn scan(history: &mut History, arena: &Arena, metrics: &Metrics, cache: &ResultCache, key: &Slice, view: ReadView) -> Result<()> {
    metrics.bump_cache_probe();

    let Some(stmt) = cache.get(key) else {
        return Ok(());
    };

    if !view.sees(stmt.lsn) {
        return Ok(());
    }

    metrics.bump_cache_hit();
    log::debug!("cache hit for key");
    history.append(arena, metrics, SourceTag::Cache, stmt)
}
