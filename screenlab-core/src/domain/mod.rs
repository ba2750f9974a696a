//! Domain types for ScreenLab

pub mod bar;
pub mod diagnostics;
pub mod rows;
pub mod series;

pub use bar::PriceBar;
pub use diagnostics::{Computed, Timeframe, Warning};
pub use rows::{FrameConditions, FrameValues, IndicatorRow, RsRow, TrendConditions};
pub use series::{DailySeries, SeriesError};
