//! RSI screener, STAMP gate and trend-screener gates per timeframe, plus the
//! cross-timeframe aggregates (score, final signal, trend screener).
//!
//! Every comparison treats an undefined operand as a failed gate.

use crate::domain::{FrameConditions, FrameValues, Timeframe, TrendConditions};

fn gt(a: Option<f64>, b: Option<f64>) -> bool {
    matches!((a, b), (Some(a), Some(b)) if a > b)
}

fn holds(v: Option<f64>, pred: impl Fn(f64) -> bool) -> bool {
    v.is_some_and(pred)
}

/// STAMP: A above its SMA9 while the fast CFG EMA leads the slow one.
pub fn stamp_holds(v: &FrameValues) -> bool {
    gt(v.stamp_a, v.cfg_sma9) && gt(v.cfg_ema20, v.cfg_ema45)
}

/// Evaluate one bar of one timeframe.
///
/// The trend SMA is SMA18 on daily bars and SMA9 on weekly bars.
pub fn evaluate_frame(v: &FrameValues, timeframe: Timeframe) -> FrameConditions {
    let trend_sma = match timeframe {
        Timeframe::Daily => v.sma18,
        Timeframe::Weekly => v.sma9,
    };

    FrameConditions {
        sma9_above_number: gt(v.sma9, v.the_number),
        rsi_below_80: holds(v.rsi, |r| r < 80.0),
        rsi_sma9_at_most_75: holds(v.rsi_sma9, |r| r <= 75.0),
        rsi_ema45_at_most_70: holds(v.rsi_ema45, |r| r <= 70.0),
        rsi_in_55_70: holds(v.rsi, |r| (55.0..=70.0).contains(&r)),
        rsi_above_wma45: gt(v.rsi, v.rsi_wma45),
        rsi_sma9_above_wma45: gt(v.rsi_sma9, v.rsi_wma45),
        stamp: stamp_holds(v),
        close_above_trend_sma: gt(v.close, trend_sma),
        sma_stacked: gt(v.sma4, v.sma9) && gt(v.sma9, v.sma18),
        cci_above_100: holds(v.cci, |c| c > 100.0),
        cci_ema_positive: holds(v.cci_ema20, |c| c > 0.0),
    }
}

/// True screener gates on both timeframes, plus one when STAMP holds on both.
pub fn score(daily: &FrameConditions, weekly: &FrameConditions) -> u8 {
    daily.screener_count() + weekly.screener_count() + u8::from(daily.stamp && weekly.stamp)
}

pub fn final_signal(daily: &FrameConditions, weekly: &FrameConditions) -> bool {
    daily.stamp && weekly.stamp && daily.screener_all() && weekly.screener_all()
}

pub fn trend_screener(
    daily: &FrameConditions,
    weekly: &FrameConditions,
    trend: &TrendConditions,
) -> bool {
    daily.trend_all() && weekly.trend_all() && trend.all()
}
