// Copyright (c) 2024-present, fjall-rs
// This source code is licensed under both the Apache 2.0 and MIT License
// (found in the LICENSE-* files in the repository)

use crate::{apply, arena::Arena, error::Result, history::History, index::Index, scanners, seqno::ReadView, slice::Slice, tx::Tx, value::OwnedTuple};
use std::time::Instant;

/// Returns at most one reconstructed tuple visible at `view` for `key`
/// against `index`, merging TxW, cache, mem, and run sources in strict
/// precedence order.
///
/// `key_field_count` is the number of fields the caller's `key` carries —
/// this crate models keys as opaque byte [`Slice`]s, with no built-in
/// comparator/key decomposition, so the arity precondition is expressed
/// against a caller-supplied count rather than one derived by splitting
/// `key` apart.
///
/// # Panics
///
/// Panics if `key_field_count` is less than `index.cmp_def.part_count` —
/// the exact-lookup arity precondition is a programming-error assertion,
/// not a recoverable condition.
pub fn point_lookup(index: &Index, tx: Option<&dyn Tx>, view: ReadView, key: &Slice, key_field_count: usize) -> Result<Option<OwnedTuple>> {
    assert!(
        key_field_count >= index.cmp_def.part_count,
        "search key has {key_field_count} fields, index requires at least {}",
        index.cmp_def.part_count
    );

    let arena = Arena::new(index.env.arena_budget);
    let saved_cursor = arena.save_cursor();
    let start = Instant::now();

    index.metrics.bump_lookup();

    if let Some(tx) = tx {
        tx.track_point(&index.name, key)?;
    }

    let result = loop {
        let mut history = History::new();

        scanners::txw::scan(&mut history, &arena, &index.metrics, tx, &index.name, key)?;

        if !history.is_terminal() {
            scanners::cache::scan(&mut history, &arena, &index.metrics, &index.cache, key, view)?;
        }

        if !history.is_terminal() {
            scanners::mems::scan(&mut history, &arena, &index.metrics, &index.mems, key, view, index.cmp_def)?;
        }

        if history.is_terminal() {
            let result = apply::materialize(&history, view, key, &index.cache, index.applier.as_ref(), &index.metrics);
            history.cleanup(&arena, &index.metrics, saved_cursor);
            break result;
        }

        // Only the slice scan performs I/O and may yield; snapshot the
        // mem-list version immediately before it so a concurrent dump
        // during the scan is detectable on return.
        let version_before = index.mems.version();

        let slices_result = scanners::run_slices::scan(&mut history, &arena, &index.metrics, index.range_tree.as_ref(), key, view);

        if let Err(err) = slices_result {
            history.cleanup(&arena, &index.metrics, saved_cursor);
            break Err(err);
        }

        if index.mems.version() != version_before {
            log::debug!("mem list changed during slice scan for index {}, restarting lookup", index.name);
            history.cleanup(&arena, &index.metrics, saved_cursor);
            index.metrics.bump_restart();
            continue;
        }

        let result = apply::materialize(&history, view, key, &index.cache, index.applier.as_ref(), &index.metrics);
        history.cleanup(&arena, &index.metrics, saved_cursor);
        break result;
    };

    let elapsed = start.elapsed();

    if result.is_ok() && elapsed > index.env.too_long_threshold {
        log::warn!(
            "point lookup on index {} took {:.3}s (key={key:?}, result={result:?})",
            index.name,
            elapsed.as_secs_f64(),
        );
    }

    result
}

// Scenario and invariant tests live in `tests/point_lookup.rs`, exercised
// through this function's public signature.
