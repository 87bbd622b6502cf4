// Copyright (c) 2024-present, fjall-rs
// This source code is licensed under both the Apache 2.0 and MIT License
// (found in the LICENSE-* files in the repository)

use crate::{error::Result, slice::Slice, value::StatementRef};

/// The transaction manager's surface, as consumed by the point-lookup core.
///
/// Specified only at this interface; no concrete production implementation
/// lives in this crate, since the transaction manager owns concerns
/// (isolation, commit protocol, conflict detection) entirely outside this
/// core's scope.
pub trait Tx: Send + Sync {
    /// Registers read-intent for `key` against `index`, so that a
    /// concurrent committed overwrite of `key` after this instant forces
    /// this transaction into a read view, preventing stale cache
    /// publication. Fails with [`crate::error::Error::TxTrackFailure`] if
    /// the transaction manager cannot register the intent (e.g. resource
    /// exhaustion).
    fn track_point(&self, index: &str, key: &Slice) -> Result<()>;

    /// Probes this transaction's uncommitted write set for an entry whose
    /// `(index, key)` matches exactly. At most one entry can match.
    fn search_write_set(&self, index: &str, key: &Slice) -> Option<StatementRef>;
}

/// An in-memory write set and read-intent log, standing in for a real
/// transaction manager in tests.
///
/// Kept purely as a test double, since the transaction manager is
/// explicitly out of scope for this crate.
#[derive(Default)]
pub struct TestTx {
    writes: std::sync::Mutex<Vec<(String, StatementRef)>>,
    tracked: std::sync::Mutex<Vec<(String, Slice)>>,
    fail_tracking: std::sync::atomic::AtomicBool,
}

impl TestTx {
    /// A transaction with an empty write set.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Records `stmt` as this transaction's own write against `key` under
    /// `index`.
    #[expect(clippy::expect_used, reason = "lock poisoning is unrecoverable")]
    pub fn write(&self, index: &str, stmt: StatementRef) {
        self.writes
            .lock()
            .expect("lock poisoned")
            .push((index.to_owned(), stmt));
    }

    /// Forces subsequent [`Tx::track_point`] calls to fail, to exercise the
    /// `TxTrackFailure` error path.
    pub fn poison_tracking(&self) {
        self.fail_tracking.store(true, std::sync::atomic::Ordering::Release);
    }

    /// Keys tracked so far, for assertions.
    #[must_use]
    #[expect(clippy::expect_used, reason = "lock poisoning is unrecoverable")]
    pub fn tracked_keys(&self) -> Vec<(String, Slice)> {
        self.tracked.lock().expect("lock poisoned").clone()
    }
}

impl Tx for TestTx {
    #[expect(clippy::expect_used, reason = "lock poisoning is unrecoverable")]
    fn track_point(&self, index: &str, key: &Slice) -> Result<()> {
        if self.fail_tracking.load(std::sync::atomic::Ordering::Acquire) {
            return Err(crate::error::Error::TxTrackFailure);
        }
        self.tracked
            .lock()
            .expect("lock poisoned")
            .push((index.to_owned(), key.clone()));
        Ok(())
    }

    #[expect(clippy::expect_used, reason = "lock poisoning is unrecoverable")]
    fn search_write_set(&self, index: &str, key: &Slice) -> Option<StatementRef> {
        self.writes
            .lock()
            .expect("lock poisoned")
            .iter()
            .find(|(idx, stmt)| idx == index && stmt.key.as_ref() == key.as_ref())
            .map(|(_, stmt)| stmt.clone())
    }
}
