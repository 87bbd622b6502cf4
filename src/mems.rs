// Copyright (c) 2024-present, fjall-rs
// This source code is licensed under both the Apache 2.0 and MIT License
// (found in the LICENSE-* files in the repository)

use crate::memtable::MemTable;
use std::sync::{atomic::AtomicU32, atomic::Ordering::Acquire, atomic::Ordering::Release, Arc, RwLock};

/// The active mem plus the ordered list of sealed mems awaiting dump, and
/// the monotonic version counter the restart protocol watches.
///
/// Holds an `RwLock<Arc<Memtable>>` for the active mem plus an ordered
/// sealed collection, simplified down to exactly what the mems scanner and
/// the lookup orchestrator's restart check need.
pub struct MemList {
    active: RwLock<Arc<MemTable>>,
    /// Newest-sealed-first.
    sealed: RwLock<Vec<Arc<MemTable>>>,
    version: AtomicU32,
}

impl Default for MemList {
    fn default() -> Self {
        Self {
            active: RwLock::new(Arc::new(MemTable::new())),
            sealed: RwLock::new(Vec::new()),
            version: AtomicU32::new(0),
        }
    }
}

impl MemList {
    /// An empty mem list with a fresh active mem.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// The current mem-list version. Any change invalidates mem-sourced
    /// references taken before the change was observed.
    #[must_use]
    pub fn version(&self) -> u32 {
        self.version.load(Acquire)
    }

    /// The currently active mem.
    #[must_use]
    #[expect(clippy::expect_used, reason = "lock poisoning is unrecoverable")]
    pub fn active(&self) -> Arc<MemTable> {
        self.active.read().expect("lock poisoned").clone()
    }

    /// The sealed mems, newest-sealed-first.
    #[must_use]
    #[expect(clippy::expect_used, reason = "lock poisoning is unrecoverable")]
    pub fn sealed(&self) -> Vec<Arc<MemTable>> {
        self.sealed.read().expect("lock poisoned").clone()
    }

    /// Rotates the active mem into sealed (newest-first) and installs a
    /// fresh active mem. Bumps the version.
    #[expect(clippy::expect_used, reason = "lock poisoning is unrecoverable")]
    pub fn rotate(&self) {
        let old_active = {
            let mut active = self.active.write().expect("lock poisoned");
            std::mem::replace(&mut *active, Arc::new(MemTable::new()))
        };
        self.sealed.write().expect("lock poisoned").insert(0, old_active);
        self.version.fetch_add(1, Release);
    }

    /// Removes `count` oldest sealed mems (as if they had just been dumped
    /// to disk). Bumps the version: any history built against the removed
    /// mems is no longer sound, per the restart protocol.
    #[expect(clippy::expect_used, reason = "lock poisoning is unrecoverable")]
    pub fn drop_sealed_tail(&self, count: usize) {
        let mut sealed = self.sealed.write().expect("lock poisoned");
        let len = sealed.len();
        sealed.truncate(len.saturating_sub(count));
        drop(sealed);
        self.version.fetch_add(1, Release);
    }
}
