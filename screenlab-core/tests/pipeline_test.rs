//! End-to-end tests of per-symbol computation through a price source.
//!
//! Look-ahead check: rows computed on a truncated history must equal the same
//! rows computed on the full history. Any difference means a value at date t
//! depends on bars after t (including an in-progress week).

use chrono::{Datelike, Duration, NaiveDate, Weekday};
use screenlab_core::config::ComputeConfig;
use screenlab_core::context::ComputationContext;
use screenlab_core::data::{DataError, InMemoryPrices, ParquetPriceStore, PriceSource};
use screenlab_core::domain::{DailySeries, PriceBar, Warning};
use screenlab_core::pipeline::{compute_for, compute_symbol, rank_frames};
use std::path::PathBuf;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

static TEST_COUNTER: AtomicU64 = AtomicU64::new(0);

fn temp_dir() -> PathBuf {
    let id = TEST_COUNTER.fetch_add(1, Ordering::SeqCst);
    let dir = std::env::temp_dir().join(format!("screenlab_pipeline_{}_{id}", std::process::id()));
    let _ = std::fs::remove_dir_all(&dir);
    dir
}

/// Deterministic walk on Sun-Thu trading days with the odd holiday.
fn make_bars(symbol: &str, n: usize, seed: u64) -> Vec<PriceBar> {
    let mut date = NaiveDate::from_ymd_opt(2022, 1, 2).unwrap();
    let mut price = 100.0;
    let mut bars = Vec::with_capacity(n);
    let mut i = 0u64;
    while bars.len() < n {
        i += 1;
        let weekend = matches!(date.weekday(), Weekday::Fri | Weekday::Sat);
        let holiday = i % 37 == 0;
        if !weekend && !holiday {
            let step = (i.wrapping_mul(6364136223846793005).wrapping_add(seed) >> 33) % 200;
            let change = (step as f64 - 98.0) * 0.02;
            let open = price;
            price = (price + change).max(5.0);
            bars.push(PriceBar {
                symbol: symbol.into(),
                date,
                open,
                high: open.max(price) + 0.8,
                low: open.min(price) - 0.8,
                close: price,
                volume: 10_000 + i * 3,
            });
        }
        date += Duration::days(1);
    }
    bars
}

fn series(symbol: &str, n: usize, seed: u64) -> DailySeries {
    DailySeries::new(symbol, make_bars(symbol, n, seed)).unwrap()
}

#[test]
fn truncated_history_gives_identical_rows() {
    let config = ComputeConfig::default();
    let full_bars = make_bars("2222", 400, 7);
    let full = compute_symbol(&DailySeries::new("2222", full_bars.clone()).unwrap(), &config).value;

    for cut in [120, 201, 202, 203, 204, 205, 333] {
        let truncated = DailySeries::new("2222", full_bars[..cut].to_vec()).unwrap();
        let partial = compute_symbol(&truncated, &config).value;
        assert_eq!(partial.rows.len(), cut);
        for (i, (a, b)) in partial.rows.iter().zip(full.rows.iter()).enumerate() {
            assert_eq!(a, b, "row {i} differs when history is cut at {cut}");
        }
        assert_eq!(&partial.returns[..], &full.returns[..cut]);
    }
}

#[test]
fn weekly_values_only_change_on_closing_days() {
    let config = ComputeConfig::default();
    let frame = compute_symbol(&series("2222", 300, 3), &config).value;

    for pair in frame.rows.windows(2) {
        if pair[1].weekly_as_of != pair[0].weekly_as_of {
            let as_of = pair[1].weekly_as_of.unwrap();
            assert!(as_of <= pair[1].date);
            assert!(as_of > pair[0].weekly_as_of.unwrap_or(NaiveDate::MIN));
        } else {
            assert_eq!(pair[1].weekly, pair[0].weekly);
        }
    }
}

#[test]
fn compute_for_loads_through_context() {
    let mut prices = InMemoryPrices::new();
    prices.insert("1010", make_bars("1010", 150, 1));
    prices.insert("1020", make_bars("1020", 150, 2));
    let ctx = ComputationContext::new(Arc::new(prices), ComputeConfig::default());

    let computed = compute_for(&ctx, "1010").unwrap();
    assert_eq!(computed.value.symbol, "1010");
    assert_eq!(computed.value.rows.len(), 150);
    // 150 bars cannot cover the 252-day lookback
    assert!(computed.value.returns.iter().all(|r| r[3].is_none()));

    let missing = compute_for(&ctx, "9999");
    assert!(matches!(missing, Err(DataError::NoData { .. })));
}

#[test]
fn long_history_clears_warmup_warnings() {
    let computed = compute_symbol(&series("4321", 700, 11), &ComputeConfig::default());
    assert!(
        !computed
            .warnings
            .iter()
            .any(|w| matches!(w, Warning::InsufficientHistory { .. })),
        "unexpected warnings: {:?}",
        computed.warnings
    );
    let last = computed.value.rows.last().unwrap();
    assert!(last.daily.cfg_ema45.is_some());
    assert!(last.weekly.rsi_wma45.is_some());
    assert!(last.daily.the_number.is_some());
    assert!(last.weekly.the_number.is_some());
    assert!(last.score <= 15);
}

#[test]
fn parquet_store_feeds_the_pipeline() {
    let dir = temp_dir();
    let store = ParquetPriceStore::new(&dir);
    let original = series("7010", 320, 5);
    store.write(&original, "test").unwrap();

    let loaded = store.load("7010").unwrap();
    assert_eq!(loaded.bars(), original.bars());

    let config = ComputeConfig::default();
    let ctx = ComputationContext::new(Arc::new(ParquetPriceStore::new(&dir)), config.clone());
    let from_store = compute_for(&ctx, "7010").unwrap().value;
    let direct = compute_symbol(&original, &config).value;
    assert_eq!(from_store.rows, direct.rows);

    let _ = std::fs::remove_dir_all(&dir);
}

#[test]
fn ranking_uses_only_symbols_trading_that_day() {
    let config = ComputeConfig::default();
    let a = compute_symbol(&series("A", 300, 1), &config).value;
    let b = compute_symbol(&series("B", 300, 2), &config).value;
    // C stops trading early
    let c = compute_symbol(&series("C", 120, 3), &config).value;
    let date = a.rows[250].date;

    let rows = rank_frames(&[a, b, c], date, &config);
    let symbols: Vec<&str> = rows.iter().map(|r| r.symbol.as_str()).collect();
    assert_eq!(symbols, vec!["A", "B"]);
    assert!(rows.iter().all(|r| matches!(r.rs_rating, Some(1..=99))));
}
