//! Synthetic price data for demos and tests.
//!
//! A random walk from 100.0 on Sunday-Thursday sessions. The RNG is seeded
//! from the BLAKE3 hash of the symbol, so the same symbol always gets the same
//! bars and runs over synthetic data are reproducible.

use chrono::{Datelike, Duration, NaiveDate, Weekday};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use screenlab_core::data::InMemoryPrices;
use screenlab_core::domain::PriceBar;

/// Generate bars for every trading day in `[start, end]`.
pub fn synthetic_bars(symbol: &str, start: NaiveDate, end: NaiveDate) -> Vec<PriceBar> {
    let seed: [u8; 32] = *blake3::hash(symbol.as_bytes()).as_bytes();
    let mut rng = StdRng::from_seed(seed);

    let mut bars = Vec::new();
    let mut price = 100.0_f64;
    let mut current = start;

    while current <= end {
        if matches!(current.weekday(), Weekday::Fri | Weekday::Sat) {
            current += Duration::days(1);
            continue;
        }

        let daily_return: f64 = rng.gen_range(-0.03..0.03);
        let open = price;
        let close = price * (1.0 + daily_return);
        let high = open.max(close) * (1.0 + rng.gen_range(0.0..0.01));
        let low = open.min(close) * (1.0 - rng.gen_range(0.0..0.01));
        let volume = rng.gen_range(500_000..5_000_000u64);

        bars.push(PriceBar {
            symbol: symbol.to_string(),
            date: current,
            open,
            high,
            low,
            close,
            volume,
        });

        price = close;
        current += Duration::days(1);
    }

    bars
}

/// An in-memory price source holding synthetic history for each symbol.
pub fn synthetic_prices(symbols: &[&str], start: NaiveDate, end: NaiveDate) -> InMemoryPrices {
    let mut prices = InMemoryPrices::new();
    for symbol in symbols {
        prices.insert(*symbol, synthetic_bars(symbol, start, end));
    }
    prices
}

#[cfg(test)]
mod tests {
    use super::*;
    use screenlab_core::data::PriceSource;

    fn d(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    #[test]
    fn deterministic_per_symbol() {
        let a = synthetic_bars("2222", d("2024-01-01"), d("2024-03-31"));
        let b = synthetic_bars("2222", d("2024-01-01"), d("2024-03-31"));
        assert_eq!(a, b);
    }

    #[test]
    fn symbols_get_different_walks() {
        let a = synthetic_bars("2222", d("2024-01-01"), d("2024-03-31"));
        let b = synthetic_bars("1120", d("2024-01-01"), d("2024-03-31"));
        assert_eq!(a.len(), b.len());
        assert_ne!(
            a.iter().map(|x| x.close).collect::<Vec<_>>(),
            b.iter().map(|x| x.close).collect::<Vec<_>>()
        );
    }

    #[test]
    fn trades_sunday_to_thursday_with_sane_bars() {
        let bars = synthetic_bars("2222", d("2024-01-01"), d("2024-12-31"));
        assert!(bars
            .iter()
            .all(|b| !matches!(b.date.weekday(), Weekday::Fri | Weekday::Sat)));
        assert!(bars.iter().all(|b| b.is_sane()));
    }

    #[test]
    fn prices_source_loads_each_symbol() {
        let prices = synthetic_prices(&["A", "B"], d("2024-01-01"), d("2024-02-01"));
        assert_eq!(prices.symbols().unwrap(), vec!["A", "B"]);
        assert!(prices.load("A").unwrap().len() > 15);
    }
}
