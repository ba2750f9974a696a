//! Timeframe resampler and aligner: daily bars → weekly bars → daily rows.

pub mod align;
pub mod weekly;

pub use align::{align_closed_weeks, forward_fill};
pub use weekly::{bucket_start, resample_weekly, week_start, WeeklyBar, WeeklySeries};
