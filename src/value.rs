// Copyright (c) 2024-present, fjall-rs
// This source code is licensed under both the Apache 2.0 and MIT License
// (found in the LICENSE-* files in the repository)

use crate::{seqno::SeqNo, slice::Slice};
use std::sync::Arc;

/// The kind of a statement.
///
/// `Replace`, `Insert`, and `Delete` are **terminal**: they fully determine
/// the tuple (or its absence) at their LSN. `Upsert` is a **delta**: it must
/// be composed with a lower-LSN predecessor to yield a concrete tuple.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatementType {
    /// Full-tuple replace.
    Replace,

    /// Full-tuple insert (no pre-existing tuple assumed).
    Insert,

    /// Tombstone.
    Delete,

    /// Partial-update delta.
    Upsert,
}

impl StatementType {
    /// Whether this kind fully determines the tuple (or its absence) on its
    /// own, without needing to be composed with a predecessor.
    #[must_use]
    pub fn is_terminal(self) -> bool {
        !matches!(self, Self::Upsert)
    }
}

/// An opaque, reference-countable record: one write against a single key.
#[derive(Debug)]
pub struct Statement {
    /// The kind of write this statement represents.
    pub kind: StatementType,

    /// The key image.
    pub key: Slice,

    /// The value image. `None` for `Delete`; for `Upsert` this is the delta
    /// payload the [`crate::applier::UpsertApplier`] interprets.
    pub value: Option<Slice>,

    /// The LSN this statement was assigned at write time.
    pub lsn: SeqNo,
}

impl Statement {
    /// Builds a new reference-counted statement.
    #[must_use]
    pub fn new(kind: StatementType, key: impl Into<Slice>, value: Option<Slice>, lsn: SeqNo) -> StatementRef {
        Arc::new(Self {
            kind,
            key: key.into(),
            value,
            lsn,
        })
    }
}

/// The reference-counted handle every source of a lookup hands around.
///
/// Every source is refcounted uniformly through `Arc`; see `DESIGN.md`'s
/// entry for this module for the rationale.
pub type StatementRef = Arc<Statement>;

/// A materialized, caller-owned tuple: the result of folding a history down
/// to a single value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OwnedTuple {
    /// The tuple's key.
    pub key: Slice,

    /// The tuple's value.
    pub value: Slice,
}

impl OwnedTuple {
    /// Builds an owned tuple by taking a fresh reference on `stmt`'s images
    /// (no new allocation; the statement is not mem-sourced, so its memory
    /// is not at risk of reclamation across a yield).
    #[must_use]
    pub fn from_statement_ref(stmt: &Statement) -> Option<Self> {
        stmt.value.clone().map(|value| Self {
            key: stmt.key.clone(),
            value,
        })
    }

    /// Builds an owned tuple by deep-copying `stmt`'s images into freshly
    /// allocated buffers.
    ///
    /// Used for `Mem`-tagged terminals: mem-tree storage may be reclaimed
    /// across a yield the caller takes after this call returns, so the
    /// returned tuple must not alias it.
    #[must_use]
    pub fn duplicate_from_statement(stmt: &Statement) -> Option<Self> {
        stmt.value.as_deref().map(|value| Self {
            key: Slice::new(&stmt.key),
            value: Slice::new(value),
        })
    }
}
