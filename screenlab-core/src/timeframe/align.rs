//! Weekly → daily alignment.
//!
//! A date-keyed "last known value" join: each daily date takes the latest
//! closed week whose `active_from` is on or before it. Days before the first
//! closed week get no weekly value. Open weeks never match.

use super::weekly::WeeklyBar;
use chrono::NaiveDate;

/// For each daily date, the index of the active closed week in `weeks`.
///
/// Both `daily_dates` and `weeks` must be sorted ascending.
pub fn align_closed_weeks(daily_dates: &[NaiveDate], weeks: &[WeeklyBar]) -> Vec<Option<usize>> {
    let mut active = None;
    let mut next = 0;

    daily_dates
        .iter()
        .map(|&date| {
            while let Some(from) = weeks.get(next).and_then(|w| w.active_from) {
                if from > date {
                    break;
                }
                active = Some(next);
                next += 1;
            }
            active
        })
        .collect()
}

/// Forward-fill per-week values onto the daily index produced by
/// [`align_closed_weeks`].
pub fn forward_fill<T: Clone>(weekly_values: &[T], index: &[Option<usize>]) -> Vec<Option<T>> {
    index
        .iter()
        .map(|slot| slot.and_then(|w| weekly_values.get(w).cloned()))
        .collect()
}
