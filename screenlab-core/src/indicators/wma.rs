//! Weighted Moving Average (WMA).
//!
//! Linear weights over the trailing window: the k-th oldest value gets weight
//! k+1, so the newest value is weighted `period`. Normalized by
//! period*(period+1)/2. Lookback: period - 1.

use super::{full_window, Series};

pub fn wma(values: &[Option<f64>], period: usize) -> Series {
    let n = values.len();
    let mut result = vec![None; n];

    if period == 0 || n < period {
        return result;
    }

    let norm = (period * (period + 1)) as f64 / 2.0;

    for i in (period - 1)..n {
        if let Some(window) = full_window(&values[(i + 1 - period)..=i]) {
            let sum: f64 = window
                .iter()
                .enumerate()
                .map(|(k, v)| v * (k + 1) as f64)
                .sum();
            result[i] = Some(sum / norm);
        }
    }

    result
}
