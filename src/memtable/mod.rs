// Copyright (c) 2024-present, fjall-rs
// This source code is licensed under both the Apache 2.0 and MIT License
// (found in the LICENSE-* files in the repository)

use crate::{key::InternalKey, seqno::SeqNo, slice::Slice, value::StatementRef};
use crossbeam_skiplist::SkipMap;

/// An in-memory write-accumulating ordered tree: one mem, active or sealed.
///
/// Backed by a lock-free skiplist, keyed by `(user_key asc, lsn desc)` so
/// that seeking the lower bound of `(key, vlsn)` lands on the newest
/// version of `key` visible at `vlsn`.
#[derive(Default)]
pub struct MemTable {
    items: SkipMap<InternalKey, StatementRef>,
}

impl MemTable {
    /// An empty mem.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts a statement.
    pub fn insert(&self, stmt: StatementRef) {
        let key = InternalKey::new(stmt.key.clone(), stmt.lsn);
        self.items.insert(key, stmt);
    }

    /// Number of statements in this mem.
    #[must_use]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Whether this mem holds no statements.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Seeks to the lower bound of `(key, vlsn)` without filtering by key,
    /// so the caller can inspect each candidate's key and LSN explicitly
    /// instead of relying on this type to decide the stop condition.
    /// Mirrors the raw skiplist seek a plain `get` would perform before
    /// filtering.
    pub fn seek_raw(&self, key: &Slice, vlsn: SeqNo) -> impl Iterator<Item = StatementRef> + '_ {
        let lower_bound = InternalKey::new(key.clone(), vlsn);
        self.items.range(lower_bound..).map(|entry| entry.value().clone())
    }
}
