//! Aroon: time since the highest high and lowest low as a percentage.
//!
//! The trailing window spans period+1 bars, [i - period, i].
//! Aroon Up = 100 * (period - bars_since_highest_high) / period
//! Aroon Down = 100 * (period - bars_since_lowest_low) / period
//! Lookback: period.
//!
//! Ties resolve to the first occurrence scanning oldest to newest, so a high
//! repeated later in the window does not reset the count.

use super::{full_window, Series};

/// Both Aroon bands over the same window.
#[derive(Debug, Clone, PartialEq)]
pub struct AroonSeries {
    pub up: Series,
    pub down: Series,
}

pub fn aroon(highs: &[Option<f64>], lows: &[Option<f64>], period: usize) -> AroonSeries {
    let n = highs.len().min(lows.len());
    let mut up = vec![None; highs.len()];
    let mut down = vec![None; lows.len()];

    if period == 0 || n <= period {
        return AroonSeries { up, down };
    }

    for i in period..n {
        let start = i - period;

        if let Some(window) = full_window(&highs[start..=i]) {
            let offset = first_extreme(&window, |candidate, best| candidate > best);
            up[i] = Some(score(period, offset));
        }

        if let Some(window) = full_window(&lows[start..=i]) {
            let offset = first_extreme(&window, |candidate, best| candidate < best);
            down[i] = Some(score(period, offset));
        }
    }

    AroonSeries { up, down }
}

/// Offset of the first value that `beats` every earlier value.
fn first_extreme(window: &[f64], beats: impl Fn(f64, f64) -> bool) -> usize {
    let mut best = window[0];
    let mut best_offset = 0;
    for (j, &v) in window.iter().enumerate().skip(1) {
        if beats(v, best) {
            best = v;
            best_offset = j;
        }
    }
    best_offset
}

fn score(period: usize, offset: usize) -> f64 {
    let bars_since = period - offset;
    100.0 * (period - bars_since) as f64 / period as f64
}
