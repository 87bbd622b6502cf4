// Copyright (c) 2024-present, fjall-rs
// This source code is licensed under both the Apache 2.0 and MIT License
// (found in the LICENSE-* files in the repository)

use crate::{
    arena::Arena,
    error::Result,
    history::{History, SourceTag},
    metrics::Metrics,
    range::RunSlice,
    seqno::ReadView,
    slice::Slice,
    value::StatementType,
};

/// Scans a single pinned slice via its run iterator.
///
/// Opens an equal-key run iterator bound to `view`. Advances key-then-LSN,
/// appending one `Run` node per statement, until a terminal statement is
/// found (setting `terminal_found` to true) or the chain runs out. Closes
/// the iterator on every exit path — this is the only scanner that may
/// yield, since it performs disk I/O.
pub fn scan(history: &mut History, arena: &Arena, metrics: &Metrics, slice: &RunSlice, key: &Slice, view: ReadView, terminal_found: &mut bool) -> Result<()> {
    let mut iter = slice.open_iterator();

    let result = (|| -> Result<()> {
        let Some(mut stmt) = iter.next_key(key, view)? else {
            return Ok(());
        };

        loop {
            history.append(arena, metrics, SourceTag::Run, stmt.clone())?;

            if stmt.kind != StatementType::Upsert {
                *terminal_found = true;
                return Ok(());
            }

            let Some(next) = iter.next_lsn()? else {
                return Ok(());
            };
            stmt = next;
        }
    })();

    iter.close();
    result
}
