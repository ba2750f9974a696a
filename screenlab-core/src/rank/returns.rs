//! Trailing returns at fixed trading-day offsets.
//!
//! Offsets count the symbol's own bars, not calendar days, so a symbol with
//! trading gaps still looks back N of its own sessions.

/// 3m, 6m, 9m, 12m.
pub const PERIOD_COUNT: usize = 4;

/// Returns of one symbol on one date, in period order.
pub type PeriodReturns = [Option<f64>; PERIOD_COUNT];

/// `close[i] / close[i - offset] - 1`.
///
/// Undefined when the history is too short or either price is not positive
/// and finite.
pub fn trailing_return(closes: &[f64], i: usize, offset: usize) -> Option<f64> {
    if offset == 0 || i < offset || i >= closes.len() {
        return None;
    }
    let now = closes[i];
    let base = closes[i - offset];
    if !(base.is_finite() && base > 0.0 && now.is_finite()) {
        return None;
    }
    Some(now / base - 1.0)
}

/// All period returns for every bar of a close series.
pub fn period_returns(closes: &[f64], lookbacks: &[usize; PERIOD_COUNT]) -> Vec<PeriodReturns> {
    (0..closes.len())
        .map(|i| lookbacks.map(|offset| trailing_return(closes, i, offset)))
        .collect()
}
