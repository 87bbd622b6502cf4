// Copyright (c) 2024-present, fjall-rs
// This source code is licensed under both the Apache 2.0 and MIT License
// (found in the LICENSE-* files in the repository)

use crate::{error::Result, seqno::ReadView, slice::Slice, value::StatementRef};

/// An equal-key iterator bound to a single immutable on-disk run.
///
/// The only collaborator whose operations may yield — it performs disk
/// I/O. `next_key` positions at the search key's newest visible version
/// (the first hop); `next_lsn` walks older versions of the *same* key
/// (subsequent hops). Specified only at this interface: this crate carries
/// no run file format of its own.
pub trait RunIterator {
    /// Positions at the newest version of `key` visible under `view`, if
    /// any.
    fn next_key(&mut self, key: &Slice, view: ReadView) -> Result<Option<StatementRef>>;

    /// Advances to the next-older version of the key last returned by
    /// `next_key`/`next_lsn`, if any.
    fn next_lsn(&mut self) -> Result<Option<StatementRef>>;

    /// Releases any resources (file handles, read-ahead buffers) held by
    /// this iterator. Called on every exit path of the Slice scanner.
    fn close(&mut self);
}

/// Opens [`RunIterator`]s against a single run. A [`crate::range::RunSlice`]
/// holds one of these.
pub trait RunIteratorFactory: Send + Sync {
    /// Opens a fresh equal-key iterator.
    fn open(&self) -> Box<dyn RunIterator>;
}

/// An in-memory stand-in for a real on-disk run, used by tests. Holds a
/// fixed, newest-to-oldest version chain for a single key (real runs are
/// per-slice partitions of a whole keyspace, but the Slice scanner only
/// ever asks one run about one key, so this is a faithful enough double).
#[derive(Clone, Default)]
pub struct InMemoryRun {
    chain: Vec<StatementRef>,
}

impl InMemoryRun {
    /// Builds a run holding `chain`, newest-version-first.
    #[must_use]
    pub fn new(chain: Vec<StatementRef>) -> Self {
        Self { chain }
    }
}

impl RunIteratorFactory for InMemoryRun {
    fn open(&self) -> Box<dyn RunIterator> {
        Box::new(InMemoryRunIterator {
            chain: self.chain.clone(),
            position: None,
        })
    }
}

struct InMemoryRunIterator {
    chain: Vec<StatementRef>,
    position: Option<usize>,
}

impl RunIterator for InMemoryRunIterator {
    fn next_key(&mut self, key: &Slice, view: ReadView) -> Result<Option<StatementRef>> {
        for (idx, stmt) in self.chain.iter().enumerate() {
            if stmt.key.as_ref() == key.as_ref() && view.sees(stmt.lsn) {
                self.position = Some(idx);
                return Ok(Some(stmt.clone()));
            }
        }
        self.position = None;
        Ok(None)
    }

    fn next_lsn(&mut self) -> Result<Option<StatementRef>> {
        let Some(idx) = self.position else {
            return Ok(None);
        };
        let Some(current_key) = self.chain.get(idx).map(|stmt| stmt.key.clone()) else {
            self.position = None;
            return Ok(None);
        };
        let next_idx = idx + 1;
        match self.chain.get(next_idx) {
            Some(stmt) if stmt.key.as_ref() == current_key.as_ref() => {
                self.position = Some(next_idx);
                Ok(Some(stmt.clone()))
            }
            _ => {
                self.position = None;
                Ok(None)
            }
        }
    }

    fn close(&mut self) {
        self.position = None;
    }
}
