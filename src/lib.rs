// Copyright (c) 2024-present, fjall-rs
// This source code is licensed under both the Apache 2.0 and MIT License
// (found in the LICENSE-* files in the repository)

//! The point-lookup path of an LSM-style secondary-storage engine.
//!
//! Given an index, a snapshot (read view), an optional in-flight
//! transaction, and an exact search key, [`point_lookup`] returns at most
//! one reconstructed tuple visible at that snapshot, merging statements
//! from four heterogeneous sources — a per-transaction write set, a shared
//! result cache, one or more in-memory write-accumulating trees, and a set
//! of immutable on-disk runs — in strict precedence order, then folds the
//! resulting delta chain down to a single tuple.
//!
//! ##### NOTE
//!
//! > This crate implements only the read path described above. It carries
//! > no write path, no run/segment file format, and no range-scan support;
//! > the transaction manager, mutable index handle's internals, run
//! > iterator, upsert algebra, and cache eviction policy are all
//! > collaborator interfaces this crate consumes rather than owns. See
//! > `DESIGN.md` for how each module is grounded.
//!
//! # Example
//!
//! ```
//! use lsm_point_lookup::{
//!     index::Index,
//!     lookup::point_lookup,
//!     range::{Range, SingleRange},
//!     seqno::ReadView,
//!     value::{Statement, StatementType},
//! };
//! use std::sync::Arc;
//!
//! let range_tree = SingleRange::new(Arc::new(Range::new(vec![])));
//! let index = Index::new("my_table", Arc::new(range_tree), /* key field count */ 1);
//!
//! index
//!     .mems
//!     .active()
//!     .insert(Statement::new(StatementType::Replace, "my_key", Some("my_value".into()), 0));
//!
//! let result = point_lookup(&index, None, ReadView::latest(), &"my_key".into(), 1)?;
//! assert_eq!(result.expect("present").value.as_ref(), b"my_value");
//! # Ok::<(), lsm_point_lookup::error::Error>(())
//! ```

#![forbid(unsafe_code)]
#![deny(clippy::all, missing_docs, clippy::cargo)]
#![deny(clippy::unwrap_used)]
#![deny(clippy::indexing_slicing)]
#![warn(clippy::pedantic, clippy::nursery)]
#![warn(clippy::expect_used)]
#![allow(clippy::missing_const_for_fn)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::option_if_let_else)]

/// History materialization/fold and cache publication.
pub mod apply;

/// The upsert-composition collaborator interface.
pub mod applier;

/// The per-worker scratch budget accountant.
pub mod arena;

/// The shared result cache.
pub mod cache;

/// Tunables belonging to the `Index` collaborator.
pub mod config;

/// Crate error kinds and `Result` alias.
pub mod error;

/// The ordered delta chain built during one lookup call.
pub mod history;

/// A concrete reference implementation of the `Index` collaborator.
pub mod index;

/// Internal-key ordering and the full-key comparator.
pub mod key;

/// The lookup orchestrator.
pub mod lookup;

/// A single in-memory write-accumulating ordered tree.
pub mod memtable;

/// The active + sealed mem-tree list and restart-protocol version counter.
pub mod mems;

/// Per-index statistics counters.
pub mod metrics;

/// Disk slices, ranges, and the range-tree collaborator interface.
pub mod range;

/// The run-iterator collaborator interface.
pub mod run;

/// Per-source history scanners.
pub mod scanners;

/// Sequence numbers and read views.
pub mod seqno;

/// An immutable, cheaply-cloneable byte buffer.
pub mod slice;

/// The transaction-manager collaborator interface.
pub mod tx;

/// Statements, statement kinds, and materialized owned tuples.
pub mod value;

pub use error::{Error, Result};
pub use lookup::point_lookup;
pub use seqno::{ReadView, SeqNo};
pub use slice::Slice;
pub use value::{OwnedTuple, Statement, StatementRef, StatementType};
