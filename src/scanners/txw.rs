// Copyright (c) 2024-present, fjall-rs
// This source code is licensed under both the Apache 2.0 and MIT License
// (found in the LICENSE-* files in the repository)

use crate::{
    arena::Arena,
    error::Result,
    history::{History, SourceTag},
    metrics::Metrics,
    slice::Slice,
    tx::Tx,
};

/// Probes the caller's write set for an entry whose `(index, key)` matches
/// exactly. No LSN filtering — a transaction sees its own writes regardless
/// of snapshot. At most one node produced.
pub fn scan(
    history: &mut History,
    arena: &Arena,
    metrics: &Metrics,
    tx: Option<&dyn Tx>,
    index_name: &str,
    key: &Slice,
) -> Result<()> {
    let Some(tx) = tx else {
        return Ok(());
    };

    metrics.bump_txw_probe();

    if let Some(stmt) = tx.search_write_set(index_name, key) {
        metrics.bump_txw_hit();
        log::debug!("TxW hit for key in index {index_name}");
        history.append(arena, metrics, SourceTag::TxW, stmt)?;
    }

    Ok(())
}
