//! End-to-end batch runs: synthetic prices in, rows and checkpoint out.
//!
//! Covers idempotent reruns, resuming from the checkpoint after a stop, a
//! store that drops a chunk, runs that start past the checkpoint or fail
//! below it, and weekly alignment of the stored rows.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use chrono::NaiveDate;
use screenlab_core::config::ComputeConfig;
use screenlab_core::context::ComputationContext;
use screenlab_core::domain::{IndicatorRow, RsRow};
use screenlab_runner::{
    run_batch, synthetic_prices, BatchOptions, BatchProgress, Checkpoint, JsonlStore, MemoryStore,
    Phase, RetryPolicy, RowChunk, RowStore, StoreError,
};

const SYMBOLS: [&str; 4] = ["1010", "1120", "2222", "7010"];

fn d(s: &str) -> NaiveDate {
    NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
}

fn context() -> ComputationContext {
    let prices = synthetic_prices(&SYMBOLS, d("2022-06-01"), d("2023-12-31"));
    ComputationContext::new(Arc::new(prices), ComputeConfig::default())
}

fn options(dates_per_chunk: usize) -> BatchOptions {
    BatchOptions {
        start: Some(d("2023-09-01")),
        dates_per_chunk,
        threads: Some(2),
        retry: RetryPolicy::immediate(1),
        ..Default::default()
    }
}

/// Fails every commit of the chunk containing `bad_date` while `broken` is set.
struct FlakyStore {
    inner: MemoryStore,
    bad_date: NaiveDate,
    broken: AtomicBool,
}

impl RowStore for FlakyStore {
    fn name(&self) -> &str {
        "flaky"
    }

    fn commit_chunk(&self, chunk: &RowChunk) -> Result<(), StoreError> {
        if self.broken.load(Ordering::SeqCst) && chunk.dates.contains(&self.bad_date) {
            return Err(StoreError::Transient("connection reset".into()));
        }
        self.inner.commit_chunk(chunk)
    }

    fn load_checkpoint(&self) -> Result<Option<Checkpoint>, StoreError> {
        self.inner.load_checkpoint()
    }

    fn save_checkpoint(&self, checkpoint: &Checkpoint) -> Result<(), StoreError> {
        self.inner.save_checkpoint(checkpoint)
    }

    fn indicator_symbols(&self) -> Result<Vec<String>, StoreError> {
        self.inner.indicator_symbols()
    }

    fn indicator_rows(&self, symbol: &str) -> Result<Vec<IndicatorRow>, StoreError> {
        self.inner.indicator_rows(symbol)
    }

    fn rs_dates(&self) -> Result<Vec<NaiveDate>, StoreError> {
        self.inner.rs_dates()
    }

    fn rs_rows(&self, date: NaiveDate) -> Result<Vec<RsRow>, StoreError> {
        self.inner.rs_rows(date)
    }
}

#[test]
fn reruns_and_chunk_sizes_converge_to_one_table() {
    let ctx = context();
    let dir = tempfile::tempdir().unwrap();

    let small = JsonlStore::open(dir.path().join("small")).unwrap();
    let large = JsonlStore::open(dir.path().join("large")).unwrap();
    run_batch(&ctx, &small, &options(7), None, None).unwrap();
    run_batch(&ctx, &large, &options(40), None, None).unwrap();
    let digest = small.digest().unwrap();
    assert_eq!(digest, large.digest().unwrap());

    // A full rerun upserts the same rows over themselves.
    let counts = small.row_counts().unwrap();
    let rerun = BatchOptions {
        full: true,
        ..options(7)
    };
    let report = run_batch(&ctx, &small, &rerun, None, None).unwrap();
    assert!(report.is_complete());
    assert_eq!(small.digest().unwrap(), digest);
    assert_eq!(small.row_counts().unwrap(), counts);
}

#[test]
fn stopped_run_resumes_from_checkpoint() {
    let ctx = context();
    let reference = MemoryStore::new();
    let full = run_batch(&ctx, &reference, &options(10), None, None).unwrap();

    let store = MemoryStore::new();
    let stop = AtomicBool::new(false);
    let stop_after_two = |p: &BatchProgress| {
        if p.phase == Phase::Writing && p.chunks_committed == 2 {
            stop.store(true, Ordering::SeqCst);
        }
    };
    let first = run_batch(&ctx, &store, &options(10), Some(&stop_after_two), Some(&stop)).unwrap();
    assert!(first.stopped);
    assert_eq!(first.chunks_committed, 2);
    let checkpoint = first.checkpoint.unwrap();
    assert!(checkpoint < full.last_date.unwrap());

    let second = run_batch(&ctx, &store, &options(10), None, None).unwrap();
    assert!(second.is_complete());
    assert!(second.first_date.unwrap() > checkpoint);
    assert_eq!(second.checkpoint, full.last_date);
    assert_eq!(store.digest().unwrap(), reference.digest().unwrap());
}

#[test]
fn failed_chunk_holds_checkpoint_until_healed() {
    let ctx = context();
    let reference = MemoryStore::new();
    run_batch(&ctx, &reference, &options(10), None, None).unwrap();
    let all_dates = reference.rs_dates().unwrap();
    let bad_date = all_dates[25];

    let store = FlakyStore {
        inner: MemoryStore::new(),
        bad_date,
        broken: AtomicBool::new(true),
    };
    let report = run_batch(&ctx, &store, &options(10), None, None).unwrap();
    assert!(!report.is_complete());
    assert_eq!(report.chunks_failed.len(), 1);
    assert!(report.chunks_failed[0].first_date <= bad_date);
    assert!(report.chunks_failed[0].last_date >= bad_date);
    // Chunks after the failure were written, the checkpoint stayed before it.
    assert!(report.chunks_committed > 2);
    let held = store.load_checkpoint().unwrap().unwrap().last_computed_date;
    assert!(held < bad_date);
    assert_ne!(store.digest().unwrap(), reference.digest().unwrap());

    store.broken.store(false, Ordering::SeqCst);
    let healed = run_batch(&ctx, &store, &options(10), None, None).unwrap();
    assert!(healed.is_complete());
    assert!(healed.first_date.unwrap() > held);
    assert_eq!(store.digest().unwrap(), reference.digest().unwrap());
}

#[test]
fn later_start_leaves_checkpoint_before_the_gap() {
    let ctx = context();
    let ranged = |start: Option<&str>, end: &str| BatchOptions {
        start: start.map(d),
        end: Some(d(end)),
        ..options(10)
    };
    let reference = MemoryStore::new();
    run_batch(&ctx, &reference, &ranged(Some("2023-09-01"), "2023-10-31"), None, None).unwrap();

    let store = MemoryStore::new();
    let september = run_batch(&ctx, &store, &ranged(Some("2023-09-01"), "2023-09-30"), None, None)
        .unwrap();
    let held = september.checkpoint.unwrap();

    let late = run_batch(&ctx, &store, &ranged(Some("2023-10-15"), "2023-10-31"), None, None)
        .unwrap();
    assert!(late.chunks_committed > 0);
    assert_eq!(late.checkpoint, Some(held));
    assert_eq!(
        store.load_checkpoint().unwrap().map(|c| c.last_computed_date),
        Some(held)
    );

    let resumed = run_batch(&ctx, &store, &ranged(None, "2023-10-31"), None, None).unwrap();
    assert!(resumed.first_date.unwrap() <= d("2023-10-02"));
    assert_eq!(resumed.checkpoint, resumed.last_date);
    assert_eq!(store.digest().unwrap(), reference.digest().unwrap());
}

#[test]
fn full_rerun_failure_pulls_checkpoint_back() {
    let ctx = context();
    let reference = MemoryStore::new();
    let clean = run_batch(&ctx, &reference, &options(10), None, None).unwrap();
    let all_dates = reference.rs_dates().unwrap();
    let bad_date = all_dates[15];

    let store = FlakyStore {
        inner: MemoryStore::new(),
        bad_date,
        broken: AtomicBool::new(false),
    };
    run_batch(&ctx, &store, &options(10), None, None).unwrap();
    assert_eq!(
        store.load_checkpoint().unwrap().map(|c| c.last_computed_date),
        clean.last_date
    );

    store.broken.store(true, Ordering::SeqCst);
    let rerun = BatchOptions {
        full: true,
        ..options(10)
    };
    let report = run_batch(&ctx, &store, &rerun, None, None).unwrap();
    assert_eq!(report.chunks_failed.len(), 1);
    let held = store.load_checkpoint().unwrap().unwrap().last_computed_date;
    assert!(held < report.chunks_failed[0].first_date);
    assert!(held >= all_dates[9]);
    assert_eq!(report.checkpoint, Some(held));

    store.broken.store(false, Ordering::SeqCst);
    let healed = run_batch(&ctx, &store, &options(10), None, None).unwrap();
    assert!(healed.is_complete());
    assert!(healed.first_date.unwrap() <= bad_date);
    assert_eq!(healed.checkpoint, clean.last_date);
    assert_eq!(store.digest().unwrap(), reference.digest().unwrap());
}

#[test]
fn stored_rows_use_only_closed_weeks() {
    let ctx = context();
    let dir = tempfile::tempdir().unwrap();
    let store = JsonlStore::open(dir.path()).unwrap();
    run_batch(&ctx, &store, &options(15), None, None).unwrap();

    for symbol in SYMBOLS {
        let rows = store.indicator_rows(symbol).unwrap();
        assert!(!rows.is_empty());
        let mut previous: Option<NaiveDate> = None;
        for row in &rows {
            let as_of = row.weekly_as_of.expect("a year of history has closed weeks");
            assert!(as_of <= row.date, "{symbol} {}: week {as_of}", row.date);
            assert!(previous.map_or(true, |p| p <= as_of));
            previous = Some(as_of);
        }
    }
}

#[test]
fn each_stored_date_ranks_every_trading_symbol() {
    let ctx = context();
    let store = MemoryStore::new();
    let report = run_batch(&ctx, &store, &options(20), None, None).unwrap();

    let dates = store.rs_dates().unwrap();
    assert_eq!(dates.len(), report.dates);
    for date in dates {
        let rows = store.rs_rows(date).unwrap();
        assert_eq!(rows.len(), SYMBOLS.len());
        for row in rows {
            if let Some(rating) = row.rs_rating {
                assert!((1..=99).contains(&rating));
            }
        }
    }
}
