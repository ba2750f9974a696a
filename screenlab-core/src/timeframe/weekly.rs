//! Weekly resampling.
//!
//! Daily bars are bucketed by the most recent week-start day on or before their
//! date. Bars dated after the close weekday (Friday and Saturday for Sun-Thu)
//! roll into the following week, so the close weekday is always a bucket's last
//! day. Weekly OHLC = first open, max high, min low, last close; volume is
//! summed. A bucket is closed once a bar on the close weekday exists, or once a
//! later bucket has started. Only the trailing bucket can be open.
//!
//! A week's values become active on its closing bar when that bar falls on or
//! after the close weekday. A week cut short (holidays) only becomes active on
//! the first bar of the next week, which is the first day anyone could know it
//! had ended. Rows therefore come out the same whether a date is computed
//! incrementally or in a full recomputation.

use crate::config::WeeklyBoundary;
use crate::domain::DailySeries;
use chrono::{Datelike, Duration, NaiveDate, Weekday};

#[derive(Debug, Clone, PartialEq)]
pub struct WeeklyBar {
    /// Week-start day of the bucket (may have no trading bar itself).
    pub week_start: NaiveDate,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: u64,
    /// Index of the first daily bar in the bucket.
    pub first_index: usize,
    /// Index of the last daily bar in the bucket.
    pub last_index: usize,
    /// Date of the last daily bar.
    pub close_date: NaiveDate,
    /// First daily date that may see this week's values; `None` while open.
    pub active_from: Option<NaiveDate>,
}

impl WeeklyBar {
    pub fn is_closed(&self) -> bool {
        self.active_from.is_some()
    }
}

/// Weekly aggregate of one symbol's daily series.
#[derive(Debug, Clone)]
pub struct WeeklySeries {
    pub symbol: String,
    pub bars: Vec<WeeklyBar>,
}

impl WeeklySeries {
    /// Bars of all closed weeks, in order.
    pub fn closed_bars(&self) -> &[WeeklyBar] {
        let n = self.bars.len();
        match self.bars.last() {
            Some(last) if !last.is_closed() => &self.bars[..n - 1],
            _ => &self.bars,
        }
    }

    pub fn highs(&self) -> Vec<f64> {
        self.closed_bars().iter().map(|b| b.high).collect()
    }

    pub fn lows(&self) -> Vec<f64> {
        self.closed_bars().iter().map(|b| b.low).collect()
    }

    pub fn closes(&self) -> Vec<f64> {
        self.closed_bars().iter().map(|b| b.close).collect()
    }
}

fn days_after(day: Weekday, start: Weekday) -> u32 {
    (day.num_days_from_sunday() + 7 - start.num_days_from_sunday()) % 7
}

/// Week-start day on or before `date`.
pub fn week_start(date: NaiveDate, start: Weekday) -> NaiveDate {
    date - Duration::days(days_after(date.weekday(), start) as i64)
}

/// Bucket key of `date`: its week start, or the next one past the close day.
pub fn bucket_start(date: NaiveDate, boundary: WeeklyBoundary) -> NaiveDate {
    let start = week_start(date, boundary.start);
    if days_after(date.weekday(), boundary.start) > days_after(boundary.close, boundary.start) {
        start + Duration::days(7)
    } else {
        start
    }
}

/// Resample a daily series into weekly bars.
pub fn resample_weekly(series: &DailySeries, boundary: WeeklyBoundary) -> WeeklySeries {
    let close_offset = days_after(boundary.close, boundary.start);
    let reached_close = |d: NaiveDate| days_after(d.weekday(), boundary.start) >= close_offset;
    let mut bars: Vec<WeeklyBar> = Vec::new();

    for (i, bar) in series.bars().iter().enumerate() {
        let start = bucket_start(bar.date, boundary);
        if let Some(week) = bars.last_mut().filter(|w| w.week_start == start) {
            week.high = week.high.max(bar.high);
            week.low = week.low.min(bar.low);
            week.close = bar.close;
            week.volume = week.volume.saturating_add(bar.volume);
            week.last_index = i;
            week.close_date = bar.date;
            continue;
        }

        if let Some(prev) = bars.last_mut() {
            prev.active_from = Some(if reached_close(prev.close_date) {
                prev.close_date
            } else {
                bar.date
            });
        }
        bars.push(WeeklyBar {
            week_start: start,
            open: bar.open,
            high: bar.high,
            low: bar.low,
            close: bar.close,
            volume: bar.volume,
            first_index: i,
            last_index: i,
            close_date: bar.date,
            active_from: None,
        });
    }

    if let Some(last) = bars.last_mut() {
        if reached_close(last.close_date) {
            last.active_from = Some(last.close_date);
        }
    }

    WeeklySeries {
        symbol: series.symbol().to_string(),
        bars,
    }
}
