// Copyright (c) 2024-present, fjall-rs
// This source code is licensed under both the Apache 2.0 and MIT License
// (found in the LICENSE-* files in the repository)

use crate::{
    arena::Arena,
    error::Result,
    history::{History, SourceTag},
    key::KeyComparator,
    memtable::MemTable,
    metrics::Metrics,
    seqno::ReadView,
    slice::Slice,
};

/// Scans a single mem-tree for `key`'s version chain.
///
/// Seeks to the lower bound of `(key, vlsn)`. If the positioned element's
/// key doesn't match `key` under `cmp_def`, contributes nothing. Otherwise
/// walks the chain newest-visible-downward, appending a `Mem` node per
/// statement, until the history becomes terminal, the iterator runs out,
/// the LSN fails to strictly decrease, or the key changes — whichever
/// comes first.
pub fn scan(
    history: &mut History,
    arena: &Arena,
    metrics: &Metrics,
    mem: &MemTable,
    key: &Slice,
    view: ReadView,
    cmp_def: KeyComparator,
) -> Result<()> {
    metrics.bump_mem_scan();

    let mut iter = mem.seek_raw(key, view.vlsn());

    let Some(mut current) = iter.next() else {
        return Ok(());
    };

    if !cmp_def.keys_equal(&current.key, key) {
        return Ok(());
    }

    loop {
        history.append(arena, metrics, SourceTag::Mem, current.clone())?;

        if history.is_terminal() {
            return Ok(());
        }

        let Some(next) = iter.next() else {
            return Ok(());
        };

        if next.lsn >= current.lsn {
            return Ok(());
        }

        if !cmp_def.keys_equal(&next.key, key) {
            return Ok(());
        }

        current = next;
    }
}
