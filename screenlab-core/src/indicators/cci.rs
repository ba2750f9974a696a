//! Commodity Channel Index (CCI).
//!
//! tp = (high + low + close) / 3
//! CCI = (tp - SMA(tp, period)) / (0.015 * mean_abs_deviation(tp, period))
//! Lookback: period - 1.
//!
//! When the mean deviation is exactly zero the CCI is 0, not undefined.

use super::{full_window, Series};

const LAMBERT: f64 = 0.015;

pub fn cci(
    highs: &[Option<f64>],
    lows: &[Option<f64>],
    closes: &[Option<f64>],
    period: usize,
) -> Series {
    let n = closes.len().min(highs.len()).min(lows.len());
    let mut result = vec![None; closes.len()];

    if period == 0 || n < period {
        return result;
    }

    let tp: Series = (0..n)
        .map(|i| match (highs[i], lows[i], closes[i]) {
            (Some(h), Some(l), Some(c)) => Some((h + l + c) / 3.0),
            _ => None,
        })
        .collect();

    for i in (period - 1)..n {
        let Some(window) = full_window(&tp[(i + 1 - period)..=i]) else {
            continue;
        };
        let mean = window.iter().sum::<f64>() / period as f64;
        let dev = window.iter().map(|v| (v - mean).abs()).sum::<f64>() / period as f64;
        let current = window[period - 1];

        result[i] = Some(if dev == 0.0 {
            0.0
        } else {
            (current - mean) / (LAMBERT * dev)
        });
    }

    result
}
