// Copyright (c) 2024-present, fjall-rs
// This source code is licensed under both the Apache 2.0 and MIT License
// (found in the LICENSE-* files in the repository)

use crate::{arena::Arena, error::Result, metrics::Metrics, value::StatementRef};

/// Which source contributed a history node.
///
/// Governs two policies: whether the statement is explicitly refcounted
/// while in the history (only `Run`, tracked via [`Metrics::run_ref_acquired`]
/// for the cleanup-law test — see `DESIGN.md` for why this crate also keeps
/// every source alive via `Arc` regardless), and whether, when adopted as
/// the terminal, the statement must be duplicated into a fresh buffer
/// (only `Mem`, see [`crate::value::OwnedTuple::duplicate_from_statement`]).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceTag {
    /// The transaction's own write set.
    TxW,

    /// The shared result cache.
    Cache,

    /// An in-memory write-accumulating tree.
    Mem,

    /// An immutable on-disk run.
    Run,
}

/// One entry in a lookup's history: a statement plus the source it came
/// from.
#[derive(Debug, Clone)]
pub struct HistoryNode {
    /// The source this statement was scanned from.
    pub tag: SourceTag,

    /// The statement itself.
    pub stmt: StatementRef,
}

/// The ordered delta chain built during one lookup call.
///
/// Appended in scan order (source-precedence first, then descending LSN
/// within each source); folded tail-to-head (oldest first) at
/// materialization time. See `crate::apply` for the fold.
#[derive(Debug, Default)]
pub struct History {
    nodes: Vec<HistoryNode>,
}

impl History {
    /// An empty history, ready to be appended to.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a node to the tail, charging one unit against `arena`.
    pub fn append(&mut self, arena: &Arena, metrics: &Metrics, tag: SourceTag, stmt: StatementRef) -> Result<()> {
        arena.try_reserve(1)?;
        if tag == SourceTag::Run {
            metrics.run_ref_acquired();
        }
        self.nodes.push(HistoryNode { tag, stmt });
        Ok(())
    }

    /// True iff the list is non-empty and the tail statement is terminal.
    #[must_use]
    pub fn is_terminal(&self) -> bool {
        self.nodes.last().is_some_and(|node| node.stmt.kind.is_terminal())
    }

    /// Whether any node has been appended yet.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// The nodes in scan (head-to-tail) order.
    #[must_use]
    pub fn nodes(&self) -> &[HistoryNode] {
        &self.nodes
    }

    /// Releases every `Run`-tagged reference held in this history and
    /// rewinds `arena` back to `saved_cursor`. Called on every exit path,
    /// including restart.
    pub fn cleanup(&mut self, arena: &Arena, metrics: &Metrics, saved_cursor: usize) {
        for node in self.nodes.drain(..) {
            if node.tag == SourceTag::Run {
                metrics.run_ref_released();
            }
        }
        arena.rewind(saved_cursor);
    }
}
