//! Daily OHLCV price bar as read from the price store.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Daily OHLCV bar for a single symbol.
///
/// Owned by the external price store; the engine only reads it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PriceBar {
    pub symbol: String,
    pub date: NaiveDate,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: u64,
}

impl PriceBar {
    /// Returns true if any OHLC field is NaN or infinite (void bar).
    pub fn is_void(&self) -> bool {
        ![self.open, self.high, self.low, self.close]
            .iter()
            .all(|v| v.is_finite())
    }

    /// OHLC consistency: the body lies inside `[low, high]` and prices are
    /// positive. Void bars are never sane.
    pub fn is_sane(&self) -> bool {
        if self.is_void() {
            return false;
        }
        let body_low = self.open.min(self.close);
        let body_high = self.open.max(self.close);
        self.low <= body_low && body_high <= self.high && body_low > 0.0
    }
}
