//! Exponential Moving Average (EMA).
//!
//! Recursive: EMA[t] = alpha * x[t] + (1 - alpha) * EMA[t-1], alpha = 2/(period+1).
//! Seed: EMA at the end of the first run of `period` defined values is the SMA
//! of that run (non-adjusted EMA).
//! Lookback: period - 1.
//!
//! A `None` input yields `None` and resets the recursion; the EMA re-seeds once
//! another `period` consecutive values are defined. Series such as RSI that
//! start with a warm-up gap therefore get their seed at the first full window.

use super::Series;

pub fn ema(values: &[Option<f64>], period: usize) -> Series {
    let n = values.len();
    let mut result = vec![None; n];

    if period == 0 || n < period {
        return result;
    }

    let alpha = 2.0 / (period as f64 + 1.0);
    let mut prev: Option<f64> = None;
    let mut run = 0usize;

    for i in 0..n {
        let Some(v) = values[i] else {
            prev = None;
            run = 0;
            continue;
        };
        run += 1;

        let next = match prev {
            Some(p) => alpha * v + (1.0 - alpha) * p,
            None if run >= period => {
                let window = &values[(i + 1 - period)..=i];
                window.iter().flatten().sum::<f64>() / period as f64
            }
            None => continue,
        };
        result[i] = Some(next);
        prev = Some(next);
    }

    result
}
