//! Simple Moving Average (SMA).
//!
//! Mean of the trailing `period` values. No partial windows: the first defined
//! value is at index period-1, and any `None` inside the window makes the
//! output `None`.
//!
//! Each window is summed oldest to newest instead of rolling a running sum, so
//! the result for a bar never depends on how far back the series starts.

use super::{full_window, Series};

pub fn sma(values: &[Option<f64>], period: usize) -> Series {
    let n = values.len();
    let mut result = vec![None; n];

    if period == 0 || n < period {
        return result;
    }

    for i in (period - 1)..n {
        if let Some(window) = full_window(&values[(i + 1 - period)..=i]) {
            let sum: f64 = window.iter().sum();
            result[i] = Some(sum / period as f64);
        }
    }

    result
}
