// Copyright (c) 2024-present, fjall-rs
// This source code is licensed under both the Apache 2.0 and MIT License
// (found in the LICENSE-* files in the repository)

/// Represents errors that can occur during a point lookup
#[derive(Debug)]
pub enum Error {
    /// The scratch arena (or a tuple allocation) ran out of budget
    OutOfMemory,

    /// The transaction manager refused to register read-intent for the key
    TxTrackFailure,

    /// I/O error surfaced by a run iterator
    Io(std::io::Error),

    /// The upsert applier could not produce a tuple from a delta and its base
    UpsertFailure,

    /// An invariant the lookup relies on (e.g. the range tree's total-cover
    /// guarantee) did not hold
    Unrecoverable,
}

impl std::fmt::Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "PointLookupError: {self:?}")
    }
}

impl std::error::Error for Error {}

impl From<std::io::Error> for Error {
    fn from(value: std::io::Error) -> Self {
        Self::Io(value)
    }
}

/// Point lookup result
pub type Result<T> = std::result::Result<T, Error>;
