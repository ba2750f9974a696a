//! Per-timeframe indicator frame.
//!
//! The same set of indicators is computed for daily bars and for weekly bars.
//! `compute_frame` takes plain OHLC columns so it has no notion of which
//! timeframe it is looking at; the caller tags the warnings.

use super::stamp::{stamp, RSI_LAG};
use super::the_number::{the_number, LONG_PERIOD};
use crate::domain::{Computed, FrameValues, Timeframe, Warning};
use crate::indicators::{aroon, cci, ema, lift, rsi_wilder, sma, wma};

pub const CCI_PERIOD: usize = 14;
pub const CCI_EMA_PERIOD: usize = 20;
pub const AROON_PERIOD: usize = 25;
pub const FAST_RSI_PERIOD: usize = 3;

/// Column view of a bar series.
#[derive(Debug, Clone, Copy)]
pub struct FrameInput<'a> {
    pub highs: &'a [f64],
    pub lows: &'a [f64],
    pub closes: &'a [f64],
}

/// Bars needed before each long-lookback field is first defined.
pub fn requirements(rsi_period: usize) -> Vec<(&'static str, usize)> {
    let stamp_start = rsi_period + RSI_LAG + 1;
    vec![
        ("sma18", 18),
        ("aroon", AROON_PERIOD + 1),
        ("cci_ema20", CCI_PERIOD + CCI_EMA_PERIOD - 1),
        ("rsi_wma45", rsi_period + 45),
        ("the_number", LONG_PERIOD),
        ("cfg_ema45", stamp_start + 44),
    ]
}

/// Compute every frame field for each bar.
pub fn compute_frame(
    input: FrameInput<'_>,
    rsi_period: usize,
    timeframe: Timeframe,
) -> Computed<Vec<FrameValues>> {
    let closes = lift(input.closes);
    let highs = lift(input.highs);
    let lows = lift(input.lows);
    let n = closes.len();

    let sma4 = sma(&closes, 4);
    let sma9 = sma(&closes, 9);
    let sma18 = sma(&closes, 18);

    let cci_line = cci(&highs, &lows, &closes, CCI_PERIOD);
    let cci_ema20 = ema(&cci_line, CCI_EMA_PERIOD);
    let aroon_lines = aroon(&highs, &lows, AROON_PERIOD);

    let rsi = rsi_wilder(&closes, rsi_period);
    let rsi3 = rsi_wilder(&closes, FAST_RSI_PERIOD);
    let rsi3_sma3 = sma(&rsi3, 3);
    let rsi_sma9 = sma(&rsi, 9);
    let rsi_ema45 = ema(&rsi, 45);
    let rsi_wma45 = wma(&rsi, 45);

    let number = the_number(&highs, &lows);
    let stamp_lines = stamp(&rsi, &rsi3_sma3);

    let values = (0..n)
        .map(|i| FrameValues {
            close: closes[i],
            sma4: sma4[i],
            sma9: sma9[i],
            sma18: sma18[i],
            cci: cci_line[i],
            cci_ema20: cci_ema20[i],
            aroon_up: aroon_lines.up[i],
            aroon_down: aroon_lines.down[i],
            rsi: rsi[i],
            rsi3: rsi3[i],
            rsi3_sma3: rsi3_sma3[i],
            rsi_sma9: rsi_sma9[i],
            rsi_ema45: rsi_ema45[i],
            rsi_wma45: rsi_wma45[i],
            the_number: number.value[i],
            the_number_upper: number.upper[i],
            the_number_lower: number.lower[i],
            stamp_a: stamp_lines.a[i],
            cfg_sma4: stamp_lines.cfg_sma4[i],
            cfg_sma9: stamp_lines.cfg_sma9[i],
            cfg_sma20: stamp_lines.cfg_sma20[i],
            cfg_ema20: stamp_lines.cfg_ema20[i],
            cfg_ema45: stamp_lines.cfg_ema45[i],
            cfg_wma45: stamp_lines.cfg_wma45[i],
        })
        .collect();

    let warnings = requirements(rsi_period)
        .into_iter()
        .filter(|&(_, required)| n < required)
        .map(|(indicator, required)| Warning::InsufficientHistory {
            timeframe,
            bars: n,
            required,
            indicator: indicator.to_string(),
        })
        .collect();

    Computed::with_warnings(values, warnings)
}
