//! Relative Strength Index (RSI), Wilder's formulation.
//!
//! Seed: simple mean of gains and of losses over the first `period` deltas.
//! Recurrence: avg[t] = avg[t-1] * (1 - 1/period) + x[t] * (1/period).
//! RSI = 100 - 100 / (1 + avg_gain / avg_loss)
//! Lookback: period (output undefined for indices < period).
//!
//! Edge cases: avg_loss == 0 → RSI = 100; avg_gain == 0 → RSI = 0; both zero
//! (a flat series) → RSI = 50. A missing delta resets the recursion, which
//! re-seeds after another `period` defined deltas.

use super::Series;

pub fn rsi_wilder(values: &[Option<f64>], period: usize) -> Series {
    let n = values.len();
    let mut result = vec![None; n];

    if period == 0 || n < period + 1 {
        return result;
    }

    let alpha = 1.0 / period as f64;
    let mut avg: Option<(f64, f64)> = None;
    let mut seed_gain = 0.0;
    let mut seed_loss = 0.0;
    let mut run = 0usize;

    for i in 1..n {
        let delta = match (values[i], values[i - 1]) {
            (Some(curr), Some(prev)) => curr - prev,
            _ => {
                avg = None;
                seed_gain = 0.0;
                seed_loss = 0.0;
                run = 0;
                continue;
            }
        };

        let gain = if delta > 0.0 { delta } else { 0.0 };
        let loss = if delta < 0.0 { -delta } else { 0.0 };

        let (avg_gain, avg_loss) = match avg {
            Some((g, l)) => (g * (1.0 - alpha) + gain * alpha, l * (1.0 - alpha) + loss * alpha),
            None => {
                seed_gain += gain;
                seed_loss += loss;
                run += 1;
                if run < period {
                    continue;
                }
                (seed_gain / period as f64, seed_loss / period as f64)
            }
        };

        avg = Some((avg_gain, avg_loss));
        result[i] = Some(compute_rsi(avg_gain, avg_loss));
    }

    result
}

fn compute_rsi(avg_gain: f64, avg_loss: f64) -> f64 {
    if avg_loss == 0.0 && avg_gain == 0.0 {
        50.0 // no movement
    } else if avg_loss == 0.0 {
        100.0
    } else if avg_gain == 0.0 {
        0.0
    } else {
        100.0 - 100.0 / (1.0 + avg_gain / avg_loss)
    }
}
