// Copyright (c) 2024-present, fjall-rs
// This source code is licensed under both the Apache 2.0 and MIT License
// (found in the LICENSE-* files in the repository)

//! End-to-end scenarios and testable invariants covering the point-lookup
//! precedence order, snapshot visibility, upsert folding, and the restart
//! protocol, exercised against the public `point_lookup` entry point with
//! the crate's own test doubles (`TestTx`, `InMemoryRun`, `SingleRange`,
//! `CounterApplier`).
//!
//! - `s1_cache_hit` — scenario S1
//! - `s2_snapshot_hides_latest` — scenario S2
//! - `s3_upsert_fold_across_mem_and_run` — scenario S3
//! - `s4_tombstone` — scenario S4
//! - `s5_final_answer_correct_and_no_leaks`,
//!   `restarts_once_on_mem_version_change_during_slice_scan` — scenario S5
//! - `s6_txw_wins_and_does_not_pollute_cache` — scenario S6
//! - the remaining tests cover invariants 1-7 that aren't pinned to a single
//!   lettered scenario (arity precondition, tx-track failure, cleanup law,
//!   the too-long warning's side-effect-freedom).
//! - `bulk_point_reads_hit_every_inserted_key` and
//!   `random_snapshot_sees_newest_version_at_or_below_vlsn` are broader
//!   randomized coverage, not tied to a single scenario letter.

use lsm_point_lookup::{
    applier::{counter_delta, CounterApplier},
    cache::ResultCache,
    config::IndexEnv,
    error,
    index::Index,
    key::KeyComparator,
    mems::MemList,
    metrics::Metrics,
    point_lookup,
    range::{Range, RunSlice, SingleRange},
    run::{InMemoryRun, RunIterator, RunIteratorFactory},
    slice::Slice,
    tx::TestTx,
    value::{Statement, StatementRef, StatementType},
    ReadView,
};
use rand::seq::SliceRandom;
use std::sync::{
    atomic::{AtomicBool, Ordering},
    Arc,
};
use test_log::test;

const ITEM_COUNT: usize = 1_000;

fn empty_index() -> Index {
    let tree = SingleRange::new(Arc::new(Range::new(vec![])));
    Index::new("t", Arc::new(tree), 1)
}

/// S1 — Cache hit: no mem or slice scan occurs.
#[test]
fn s1_cache_hit() {
    let index = empty_index();
    index
        .cache
        .add("K".into(), Statement::new(StatementType::Replace, "K", Some("v".into()), 50));

    let result = point_lookup(&index, None, ReadView::at(100), &"K".into(), 1).expect("ok").expect("present");

    assert_eq!(&*result.value, b"v");
    assert_eq!(index.metrics.outstanding_run_refs(), 0);
}

/// S2 — Snapshot hides the latest mem version.
#[test]
fn s2_snapshot_hides_latest() {
    let index = empty_index();
    index
        .mems
        .active()
        .insert(Statement::new(StatementType::Replace, "K", Some("new".into()), 200));
    index
        .mems
        .active()
        .insert(Statement::new(StatementType::Replace, "K", Some("old".into()), 100));

    let result = point_lookup(&index, None, ReadView::at(150), &"K".into(), 1).expect("ok").expect("present");

    assert_eq!(&*result.value, b"old");
}

/// S3 — Upsert fold across mem + run, published to cache under latest view.
#[test]
fn s3_upsert_fold_across_mem_and_run() {
    let slice = Arc::new(RunSlice::new(Arc::new(InMemoryRun::new(vec![Statement::new(
        StatementType::Replace,
        "K",
        Some(10u64.to_le_bytes().to_vec().into()),
        20,
    )]))));
    let tree = SingleRange::new(Arc::new(Range::new(vec![slice])));
    let index = Index::new("t", Arc::new(tree), 1);
    index
        .mems
        .active()
        .insert(Statement::new(StatementType::Upsert, "K", Some(counter_delta(1).into()), 50));

    let result = point_lookup(&index, None, ReadView::latest(), &"K".into(), 1).expect("ok").expect("present");

    let counter = u64::from_le_bytes(result.value.as_ref().try_into().expect("8 bytes"));
    assert_eq!(counter, 11);

    let cached = index.cache.get(&"K".into()).expect("published");
    assert_eq!(cached.kind, StatementType::Replace);
}

/// S4 — Tombstone: absent result, cache receives an absent marker.
#[test]
fn s4_tombstone() {
    let index = empty_index();
    index
        .mems
        .active()
        .insert(Statement::new(StatementType::Delete, "K", None, 80));
    index
        .mems
        .active()
        .insert(Statement::new(StatementType::Replace, "K", Some("x".into()), 40));

    let result = point_lookup(&index, None, ReadView::latest(), &"K".into(), 1).expect("ok");
    assert!(result.is_none());

    let cached = index.cache.get(&"K".into()).expect("published");
    assert_eq!(cached.kind, StatementType::Delete);
}

/// S5 — Restart soundness: the final answer is correct and no run ref or
/// slice pin is leaked, whether or not a dump interleaves.
#[test]
fn s5_final_answer_correct_and_no_leaks() {
    let slice = Arc::new(RunSlice::new(Arc::new(InMemoryRun::new(vec![Statement::new(
        StatementType::Replace,
        "K",
        Some(0u64.to_le_bytes().to_vec().into()),
        10,
    )]))));
    let tree = SingleRange::new(Arc::new(Range::new(vec![slice])));
    let index = Index::new("t", Arc::new(tree), 1);
    index
        .mems
        .active()
        .insert(Statement::new(StatementType::Upsert, "K", Some(counter_delta(5).into()), 30));

    let result = point_lookup(&index, None, ReadView::latest(), &"K".into(), 1).expect("ok").expect("present");

    let counter = u64::from_le_bytes(result.value.as_ref().try_into().expect("8 bytes"));
    assert_eq!(counter, 5);
    assert_eq!(index.metrics.outstanding_run_refs(), 0);
    assert_eq!(index.metrics.outstanding_slice_pins(), 0);
}

/// A run factory whose first `next_key` call rotates the mem list it holds
/// a handle to — standing in for a concurrent dump landing mid-slice-scan —
/// then delegates every call (including that first one) to an inner
/// in-memory run. The rotation fires exactly once across the factory's
/// lifetime, however many times the orchestrator re-opens an iterator
/// against it, so a correct restart protocol converges after one restart
/// instead of looping forever.
struct RestartOnceRun {
    inner: InMemoryRun,
    mems: Arc<MemList>,
    bumped: Arc<AtomicBool>,
}

impl RestartOnceRun {
    fn new(inner: InMemoryRun, mems: Arc<MemList>) -> Self {
        Self {
            inner,
            mems,
            bumped: Arc::new(AtomicBool::new(false)),
        }
    }
}

impl RunIteratorFactory for RestartOnceRun {
    fn open(&self) -> Box<dyn RunIterator> {
        Box::new(RestartOnceIterator {
            inner: self.inner.open(),
            mems: Arc::clone(&self.mems),
            bumped: Arc::clone(&self.bumped),
        })
    }
}

struct RestartOnceIterator {
    inner: Box<dyn RunIterator>,
    mems: Arc<MemList>,
    bumped: Arc<AtomicBool>,
}

impl RunIterator for RestartOnceIterator {
    fn next_key(&mut self, key: &Slice, view: ReadView) -> error::Result<Option<StatementRef>> {
        if self.bumped.compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire).is_ok() {
            self.mems.rotate();
        }
        self.inner.next_key(key, view)
    }

    fn next_lsn(&mut self) -> error::Result<Option<StatementRef>> {
        self.inner.next_lsn()
    }

    fn close(&mut self) {
        self.inner.close();
    }
}

/// S5 (restart path) — a `mem_list_version` bump injected inside the slice
/// scan's run iterator forces exactly one restart; the final answer matches
/// what a non-yielding lookup against the post-bump state would produce,
/// and no run ref or slice pin is left outstanding.
#[test]
fn restarts_once_on_mem_version_change_during_slice_scan() {
    let mems = Arc::new(MemList::new());
    mems.active()
        .insert(Statement::new(StatementType::Upsert, "K", Some(counter_delta(5).into()), 30));

    let run = Arc::new(RestartOnceRun::new(
        InMemoryRun::new(vec![Statement::new(StatementType::Replace, "K", Some(0u64.to_le_bytes().to_vec().into()), 10)]),
        Arc::clone(&mems),
    ));
    let slice = Arc::new(RunSlice::new(run));
    let tree = SingleRange::new(Arc::new(Range::new(vec![slice])));

    let index = Index {
        name: "t".to_string(),
        mems,
        range_tree: Arc::new(tree),
        cache: ResultCache::with_capacity_bytes(16 * 1024 * 1024),
        cmp_def: KeyComparator::new(1),
        metrics: Metrics::default(),
        env: IndexEnv::new(),
        applier: Arc::new(CounterApplier),
    };

    let result = point_lookup(&index, None, ReadView::latest(), &"K".into(), 1).expect("ok").expect("present");

    let counter = u64::from_le_bytes(result.value.as_ref().try_into().expect("8 bytes"));
    assert_eq!(counter, 5, "post-restart scan must still fold the mem upsert onto the run base");
    assert_eq!(index.metrics.restart_count(), 1);
    assert_eq!(index.metrics.outstanding_run_refs(), 0);
    assert_eq!(index.metrics.outstanding_slice_pins(), 0);
}

/// S6 — Transaction's own write wins over cache/mem/run; cache is not
/// updated by an uncommitted write.
#[test]
fn s6_txw_wins_and_does_not_pollute_cache() {
    let index = empty_index();
    index
        .cache
        .add("K".into(), Statement::new(StatementType::Replace, "K", Some("cached".into()), 5));
    index
        .mems
        .active()
        .insert(Statement::new(StatementType::Replace, "K", Some("mem".into()), 5));

    let tx = TestTx::new();
    tx.write("t", Statement::new(StatementType::Replace, "K", Some("t".into()), 0));

    let result = point_lookup(&index, Some(&tx), ReadView::latest(), &"K".into(), 1).expect("ok").expect("present");

    assert_eq!(&*result.value, b"t");
    let cached = index.cache.get(&"K".into()).expect("still has the old entry");
    assert_eq!(&*cached.value.as_ref().expect("value"), b"cached");
}

#[test]
fn tx_track_failure_aborts_before_scanning() {
    let index = empty_index();
    let tx = TestTx::new();
    tx.poison_tracking();

    let result = point_lookup(&index, Some(&tx), ReadView::latest(), &"K".into(), 1);
    assert!(result.is_err());
    assert_eq!(index.metrics.outstanding_run_refs(), 0);
}

#[test]
fn cleanup_law_holds_on_miss() {
    let index = empty_index();
    let result = point_lookup(&index, None, ReadView::latest(), &"missing".into(), 1).expect("ok");
    assert!(result.is_none());
    assert_eq!(index.metrics.outstanding_run_refs(), 0);
    assert_eq!(index.metrics.outstanding_slice_pins(), 0);
}

#[test]
fn too_long_warning_does_not_affect_result() {
    let index = empty_index().with_env(IndexEnv::new().with_too_long_threshold(std::time::Duration::from_nanos(0)));
    index
        .mems
        .active()
        .insert(Statement::new(StatementType::Replace, "K", Some("v".into()), 1));

    let result = point_lookup(&index, None, ReadView::latest(), &"K".into(), 1).expect("ok").expect("present");
    assert_eq!(&*result.value, b"v");
}

#[test]
#[should_panic(expected = "search key has")]
fn arity_precondition_is_asserted() {
    let index = empty_index();
    let _ = point_lookup(&index, None, ReadView::latest(), &"K".into(), 0);
}

/// Every key inserted into the active mem is found again by key, each with
/// the value it was inserted with.
#[test]
fn bulk_point_reads_hit_every_inserted_key() {
    let index = empty_index();
    let mut values = Vec::with_capacity(ITEM_COUNT);

    for x in 0..ITEM_COUNT as u64 {
        let key = x.to_be_bytes().to_vec();
        let value = nanoid::nanoid!();
        index
            .mems
            .active()
            .insert(Statement::new(StatementType::Replace, key, Some(value.clone().into_bytes()), x));
        values.push(value);
    }

    for x in 0..ITEM_COUNT as u64 {
        let key = x.to_be_bytes().to_vec();
        let result = point_lookup(&index, None, ReadView::latest(), &key.into(), 1)
            .expect("ok")
            .unwrap_or_else(|| panic!("key {x} not found"));
        assert_eq!(result.value.as_ref(), values[x as usize].as_bytes());
    }
}

/// For a key with a long chain of terminal replaces at distinct LSNs,
/// a randomly chosen snapshot sees exactly the newest version whose LSN is
/// at or below the snapshot's `vlsn`, matching a reference computed by
/// linear scan over the same chain.
#[test]
fn random_snapshot_sees_newest_version_at_or_below_vlsn() {
    let mut rng = rand::rng();

    let mut lsns: Vec<u64> = (1..=200).collect();
    lsns.shuffle(&mut rng);
    // Insertion order into the mem doesn't matter; what matters is that
    // every version of "K" carries a distinct LSN so the expected winner
    // under any vlsn is unambiguous.

    let index = empty_index();
    for lsn in &lsns {
        index.mems.active().insert(Statement::new(
            StatementType::Replace,
            "K",
            Some(lsn.to_le_bytes().to_vec()),
            *lsn,
        ));
    }

    for vlsn in [1u64, 37, 100, 150, 200, 250] {
        let expected = lsns.iter().copied().filter(|lsn| *lsn <= vlsn).max();

        let result = point_lookup(&index, None, ReadView::at(vlsn), &"K".into(), 1).expect("ok");

        match expected {
            Some(want) => {
                let got = u64::from_le_bytes(result.expect("present").value.as_ref().try_into().expect("8 bytes"));
                assert_eq!(got, want);
            }
            None => assert!(result.is_none()),
        }
    }
}
