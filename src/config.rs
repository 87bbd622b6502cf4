// Copyright (c) 2024-present, fjall-rs
// This source code is licensed under both the Apache 2.0 and MIT License
// (found in the LICENSE-* files in the repository)

use std::time::Duration;

const DEFAULT_TOO_LONG_THRESHOLD: Duration = Duration::from_millis(100);
const DEFAULT_ARENA_BUDGET: usize = 256;

/// Tunables belonging to the [`crate::index::Index`] collaborator: an
/// environment holding a "too-long" latency threshold and a scratch-arena
/// budget.
///
/// Built with the usual public-fields-plus-`with_*`-setters pattern,
/// consumed at construction time.
#[derive(Clone, Debug)]
pub struct IndexEnv {
    /// Above this latency, a completed lookup emits a `log::warn!`.
    pub too_long_threshold: Duration,

    /// The scratch arena's bump-allocation budget, in allocation units (one
    /// history node or one slice-array entry each).
    pub arena_budget: usize,
}

impl Default for IndexEnv {
    fn default() -> Self {
        Self {
            too_long_threshold: DEFAULT_TOO_LONG_THRESHOLD,
            arena_budget: DEFAULT_ARENA_BUDGET,
        }
    }
}

impl IndexEnv {
    /// The default environment: a 100ms too-long threshold and an
    /// arena budget of 256 allocation units.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the too-long latency threshold.
    #[must_use]
    pub fn with_too_long_threshold(mut self, threshold: Duration) -> Self {
        self.too_long_threshold = threshold;
        self
    }

    /// Sets the scratch arena's budget.
    #[must_use]
    pub fn with_arena_budget(mut self, budget: usize) -> Self {
        self.arena_budget = budget;
        self
    }
}
