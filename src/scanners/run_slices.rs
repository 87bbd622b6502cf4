// Copyright (c) 2024-present, fjall-rs
// This source code is licensed under both the Apache 2.0 and MIT License
// (found in the LICENSE-* files in the repository)

use crate::{
    arena::Arena,
    error::{Error, Result},
    history::History,
    metrics::Metrics,
    range::{PinGuard, RangeTree},
    scanners::run_slice,
    seqno::ReadView,
    slice::Slice,
};

/// Locates the range owning `key`, pins all of its slices up front (freezing
/// the set against concurrent compaction), then scans each in order until a
/// terminal is found.
///
/// The universal pin-before-scan step is what lets the scan itself yield
/// (run iterators perform disk I/O) without risking a slice's underlying
/// run files being reclaimed mid-scan.
pub fn scan(history: &mut History, arena: &Arena, metrics: &Metrics, range_tree: &dyn RangeTree, key: &Slice, view: ReadView) -> Result<()> {
    let range = range_tree.find_by_key(key).ok_or(Error::Unrecoverable)?;

    arena.try_reserve(range.slice_count())?;

    let pins: Vec<PinGuard<'_>> = range
        .slices()
        .iter()
        .map(|slice| {
            metrics.slice_pinned();
            PinGuard::new(slice.as_ref())
        })
        .collect();

    let mut terminal_found = false;
    let mut first_error = None;

    for guard in &pins {
        if first_error.is_none() && !terminal_found {
            if let Err(err) = run_slice::scan(history, arena, metrics, guard.slice(), key, view, &mut terminal_found) {
                first_error = Some(err);
            }
        }
    }

    for _ in &pins {
        metrics.slice_unpinned();
    }
    drop(pins);

    match first_error {
        Some(err) => Err(err),
        None => Ok(()),
    }
}
