//! Output rows written to the storage collaborator.
//!
//! Both row types are keyed by `(symbol, date)` and are upserted, so reruns over
//! the same history converge to the same table.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Indicator values for one bar of one timeframe (daily or weekly).
///
/// Every field is `None` until enough history exists for its period.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FrameValues {
    pub close: Option<f64>,
    pub sma4: Option<f64>,
    pub sma9: Option<f64>,
    pub sma18: Option<f64>,
    pub cci: Option<f64>,
    pub cci_ema20: Option<f64>,
    pub aroon_up: Option<f64>,
    pub aroon_down: Option<f64>,
    pub rsi: Option<f64>,
    pub rsi3: Option<f64>,
    pub rsi3_sma3: Option<f64>,
    pub rsi_sma9: Option<f64>,
    pub rsi_ema45: Option<f64>,
    pub rsi_wma45: Option<f64>,
    pub the_number: Option<f64>,
    pub the_number_upper: Option<f64>,
    pub the_number_lower: Option<f64>,
    pub stamp_a: Option<f64>,
    pub cfg_sma4: Option<f64>,
    pub cfg_sma9: Option<f64>,
    pub cfg_sma20: Option<f64>,
    pub cfg_ema20: Option<f64>,
    pub cfg_ema45: Option<f64>,
    pub cfg_wma45: Option<f64>,
}

/// Boolean gates evaluated independently on one timeframe.
///
/// An undefined input always yields `false`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FrameConditions {
    // RSI screener
    pub sma9_above_number: bool,
    pub rsi_below_80: bool,
    pub rsi_sma9_at_most_75: bool,
    pub rsi_ema45_at_most_70: bool,
    pub rsi_in_55_70: bool,
    pub rsi_above_wma45: bool,
    pub rsi_sma9_above_wma45: bool,
    // STAMP
    pub stamp: bool,
    // Trend screener (timeframe part)
    pub close_above_trend_sma: bool,
    pub sma_stacked: bool,
    pub cci_above_100: bool,
    pub cci_ema_positive: bool,
}

impl FrameConditions {
    /// The seven RSI-screener gates in a fixed order.
    pub fn screener_gates(&self) -> [bool; 7] {
        [
            self.sma9_above_number,
            self.rsi_below_80,
            self.rsi_sma9_at_most_75,
            self.rsi_ema45_at_most_70,
            self.rsi_in_55_70,
            self.rsi_above_wma45,
            self.rsi_sma9_above_wma45,
        ]
    }

    pub fn screener_count(&self) -> u8 {
        self.screener_gates().iter().filter(|&&g| g).count() as u8
    }

    pub fn screener_all(&self) -> bool {
        self.screener_gates().iter().all(|&g| g)
    }

    /// The timeframe half of the trend screener.
    pub fn trend_all(&self) -> bool {
        self.close_above_trend_sma && self.sma_stacked && self.cci_above_100 && self.cci_ema_positive
    }
}

/// Daily-only trend screener gates.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrendConditions {
    pub aroon_up_above_70: bool,
    pub aroon_down_below_30: bool,
    pub not_etf_index: bool,
    pub no_large_gap: bool,
}

impl TrendConditions {
    pub fn all(&self) -> bool {
        self.aroon_up_above_70 && self.aroon_down_below_30 && self.not_etf_index && self.no_large_gap
    }
}

/// One fully computed indicator row per (symbol, date).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IndicatorRow {
    pub symbol: String,
    pub date: NaiveDate,
    pub close: f64,
    pub volume: u64,
    /// `|open - prev_close| / prev_close`; `None` on the first bar.
    pub gap_pct: Option<f64>,
    pub is_etf_index: bool,
    pub daily: FrameValues,
    /// Values of the latest closed week, forward-filled.
    pub weekly: FrameValues,
    /// Closing date of the week that `weekly` was computed from.
    pub weekly_as_of: Option<NaiveDate>,
    pub daily_conditions: FrameConditions,
    pub weekly_conditions: FrameConditions,
    pub trend: TrendConditions,
    pub trend_screener: bool,
    /// Count of true screener gates (14) plus one for STAMP on both timeframes.
    pub score: u8,
    pub final_signal: bool,
}

/// Cross-sectional relative strength row per (symbol, date).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RsRow {
    pub symbol: String,
    pub date: NaiveDate,
    pub return_3m: Option<f64>,
    pub return_6m: Option<f64>,
    pub return_9m: Option<f64>,
    pub return_12m: Option<f64>,
    pub rank_3m: Option<u8>,
    pub rank_6m: Option<u8>,
    pub rank_9m: Option<u8>,
    pub rank_12m: Option<u8>,
    pub rs_raw: Option<f64>,
    pub rs_rating: Option<u8>,
}
