// Copyright (c) 2024-present, fjall-rs
// This source code is licensed under both the Apache 2.0 and MIT License
// (found in the LICENSE-* files in the repository)

use crate::{
    arena::Arena, error::Result, history::History, key::KeyComparator, mems::MemList, metrics::Metrics, scanners::mem,
    seqno::ReadView, slice::Slice,
};

/// Scans the active mem, then (if history is not yet terminal) the sealed
/// mems in newest-to-oldest order, stopping at the first terminal.
pub fn scan(history: &mut History, arena: &Arena, metrics: &Metrics, mems: &MemList, key: &Slice, view: ReadView, cmp_def: KeyComparator) -> Result<()> {
    mem::scan(history, arena, metrics, &mems.active(), key, view, cmp_def)?;

    if history.is_terminal() {
        return Ok(());
    }

    for sealed in mems.sealed() {
        mem::scan(history, arena, metrics, &sealed, key, view, cmp_def)?;
        if history.is_terminal() {
            break;
        }
    }

    Ok(())
}
