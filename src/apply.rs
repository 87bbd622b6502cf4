// Copyright (c) 2024-present, fjall-rs
// This source code is licensed under both the Apache 2.0 and MIT License
// (found in the LICENSE-* files in the repository)

use crate::{
    applier::UpsertApplier,
    cache::ResultCache,
    error::{Error, Result},
    history::{History, SourceTag},
    metrics::Metrics,
    seqno::{ReadView, SeqNo},
    slice::Slice,
    value::{OwnedTuple, Statement, StatementType},
};

/// Materializes the completed history into at most one owned tuple,
/// folding tail-to-head (oldest first).
///
/// Returns the result and, as a side effect, publishes it to `cache` when
/// `view` is the latest-state sentinel — the only view under which cache
/// publication is permitted.
pub fn materialize(history: &History, view: ReadView, key: &Slice, cache: &ResultCache, applier: &dyn UpsertApplier, metrics: &Metrics) -> Result<Option<OwnedTuple>> {
    let nodes = history.nodes();

    let Some((tail, rest)) = nodes.split_last() else {
        return Ok(None);
    };

    let mut accumulator = match tail.stmt.kind {
        StatementType::Delete => None,
        _ if tail.tag == SourceTag::Mem => OwnedTuple::duplicate_from_statement(&tail.stmt),
        _ => OwnedTuple::from_statement_ref(&tail.stmt),
    };

    // `rest` holds the history from head (newest) down to just-after-tail;
    // folding proceeds oldest-first, i.e. iterate it in reverse.
    for node in rest.iter().rev() {
        debug_assert_eq!(node.stmt.kind, StatementType::Upsert, "every non-tail node must be an upsert");

        let visible = view.sees(node.stmt.lsn) || node.tag == SourceTag::TxW;
        debug_assert!(visible, "non-TxW upsert above the terminal must be visible under the read view");

        let Some(base) = accumulator.as_ref() else {
            return Err(Error::UpsertFailure);
        };

        accumulator = Some(applier.apply(&node.stmt, base)?);
    }

    if accumulator.is_some() {
        metrics.bump_get();
    }

    // The cache entry must be keyed by the newest statement that
    // contributed to the result — the head of the history, `nodes[0]` —
    // not the terminal it was folded onto. When the result is an upsert
    // fold, the composite value reflects every statement between the head
    // and the tail, so publishing at the tail's (older) LSN would let a
    // snapshot predating the head's write read a value it must not see.
    let newest_contributing_lsn = nodes.first().map_or(tail.stmt.lsn, |node| node.stmt.lsn);

    // A TxW node anywhere in the history is this transaction's own
    // uncommitted write: it has no durable LSN yet, so publishing a result
    // derived from it would let an aborted (or not-yet-visible-to-others)
    // write poison a cache every other reader consults.
    let has_txw = nodes.iter().any(|node| node.tag == SourceTag::TxW);

    if view.is_latest() && !has_txw {
        publish(cache, key, &accumulator, newest_contributing_lsn);
    }

    Ok(accumulator)
}

fn publish(cache: &ResultCache, key: &Slice, result: &Option<OwnedTuple>, lsn: SeqNo) {
    let cached = match result {
        Some(tuple) => Statement::new(StatementType::Replace, tuple.key.clone(), Some(tuple.value.clone()), lsn),
        None => Statement::new(StatementType::Delete, key.clone(), None, lsn),
    };
    cache.add(key.clone(), cached);
}
