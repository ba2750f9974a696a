//! Indicator library: smoothing and oscillators over ordered numeric series.
//!
//! Every function is pure and returns a series of the same length as its
//! input. Undefined values (warm-up, gaps in the input) are `None`; there is no
//! NaN sentinel in any output.
//!
//! Smoothing: [`sma`], [`wma`], [`ema`], [`rsi_wilder`].
//! Oscillators: [`cci`], [`aroon`].

pub mod aroon;
pub mod cci;
pub mod ema;
pub mod rsi;
pub mod sma;
pub mod wma;

pub use aroon::{aroon, AroonSeries};
pub use cci::cci;
pub use ema::ema;
pub use rsi::rsi_wilder;
pub use sma::sma;
pub use wma::wma;

/// A numeric series with undefined entries.
pub type Series = Vec<Option<f64>>;

/// Lift raw prices into a series; non-finite values become `None`.
pub fn lift(values: &[f64]) -> Series {
    values
        .iter()
        .map(|&v| if v.is_finite() { Some(v) } else { None })
        .collect()
}

/// Shift a series back by `lag` bars (`out[i] = values[i - lag]`).
pub fn shift(values: &[Option<f64>], lag: usize) -> Series {
    (0..values.len())
        .map(|i| if i >= lag { values[i - lag] } else { None })
        .collect()
}

/// Combine two series element-wise; `None` on either side yields `None`.
pub fn zip_with(a: &[Option<f64>], b: &[Option<f64>], f: impl Fn(f64, f64) -> f64) -> Series {
    a.iter()
        .zip(b.iter())
        .map(|(x, y)| match (x, y) {
            (Some(x), Some(y)) => Some(f(*x, *y)),
            _ => None,
        })
        .collect()
}

/// Closes in a window where every entry is defined, or `None`.
pub(crate) fn full_window(window: &[Option<f64>]) -> Option<Vec<f64>> {
    window.iter().copied().collect()
}

/// Create synthetic bars from close prices for testing.
///
/// Generates plausible OHLV: open = prev_close (or close for first bar),
/// high = max(open,close) + 1.0, low = min(open,close) - 1.0, volume = 1000.
#[cfg(test)]
pub fn make_bars(closes: &[f64]) -> Vec<crate::domain::PriceBar> {
    use crate::domain::PriceBar;
    let base_date = chrono::NaiveDate::from_ymd_opt(2024, 1, 2).unwrap();
    closes
        .iter()
        .enumerate()
        .map(|(i, &close)| {
            let open = if i == 0 { close } else { closes[i - 1] };
            let high = open.max(close) + 1.0;
            let low = open.min(close) - 1.0;
            PriceBar {
                symbol: "TEST".to_string(),
                date: base_date + chrono::Duration::days(i as i64),
                open,
                high,
                low,
                close,
                volume: 1000,
            }
        })
        .collect()
}

/// Assert two f64 values are approximately equal (within epsilon).
#[cfg(test)]
pub fn assert_approx(actual: f64, expected: f64, epsilon: f64) {
    assert!(
        (actual - expected).abs() < epsilon,
        "assert_approx failed: actual={actual}, expected={expected}, diff={}, epsilon={epsilon}",
        (actual - expected).abs()
    );
}

/// Unwrap a defined series value in tests with a readable failure.
#[cfg(test)]
pub fn defined(series: &[Option<f64>], i: usize) -> f64 {
    series[i].unwrap_or_else(|| panic!("expected a defined value at index {i}"))
}

/// Default epsilon for indicator tests.
#[cfg(test)]
pub const DEFAULT_EPSILON: f64 = 1e-10;
