//! Daily-only trend gates: Aroon thresholds, ETF/index exclusion and the
//! overnight gap filter.

use crate::domain::{FrameValues, TrendConditions};

pub const AROON_UP_MIN: f64 = 70.0;
pub const AROON_DOWN_MAX: f64 = 30.0;

/// Overnight gap `|open - prev_close| / prev_close` for each bar.
///
/// Undefined on the first bar and when the previous close is not positive.
pub fn gap_pct(opens: &[f64], closes: &[f64]) -> Vec<Option<f64>> {
    (0..opens.len())
        .map(|i| {
            if i == 0 {
                return None;
            }
            let prev = closes[i - 1];
            let open = opens[i];
            if !(prev.is_finite() && prev > 0.0 && open.is_finite()) {
                return None;
            }
            Some((open - prev).abs() / prev)
        })
        .collect()
}

pub fn trend_conditions(
    daily: &FrameValues,
    is_etf_index: bool,
    gap: Option<f64>,
    gap_threshold: f64,
) -> TrendConditions {
    TrendConditions {
        aroon_up_above_70: daily.aroon_up.is_some_and(|a| a > AROON_UP_MIN),
        aroon_down_below_30: daily.aroon_down.is_some_and(|a| a < AROON_DOWN_MAX),
        not_etf_index: !is_etf_index,
        no_large_gap: gap.is_some_and(|g| g <= gap_threshold),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::indicators::assert_approx;

    #[test]
    fn gap_is_relative_to_previous_close() {
        let gaps = gap_pct(&[10.0, 10.5, 9.0], &[10.0, 10.0, 10.0]);
        assert!(gaps[0].is_none());
        assert_approx(gaps[1].unwrap(), 0.05, 1e-12);
        assert_approx(gaps[2].unwrap(), 0.10, 1e-12);
    }

    #[test]
    fn gap_undefined_on_bad_previous_close() {
        let gaps = gap_pct(&[1.0, 1.0], &[0.0, 1.0]);
        assert!(gaps[1].is_none());
    }

    #[test]
    fn thresholds() {
        let v = FrameValues {
            aroon_up: Some(76.0),
            aroon_down: Some(8.0),
            ..Default::default()
        };
        let t = trend_conditions(&v, false, Some(0.03), 0.03);
        assert!(t.all());

        assert!(!trend_conditions(&v, true, Some(0.01), 0.03).not_etf_index);
        assert!(!trend_conditions(&v, false, Some(0.031), 0.03).no_large_gap);
        assert!(!trend_conditions(&v, false, None, 0.03).no_large_gap);

        let edge = FrameValues {
            aroon_up: Some(70.0),
            aroon_down: Some(30.0),
            ..Default::default()
        };
        let t = trend_conditions(&edge, false, Some(0.0), 0.03);
        assert!(!t.aroon_up_above_70);
        assert!(!t.aroon_down_below_30);
    }
}
