//! STAMP/CFG composite oscillator.
//!
//! A[i] = RSI[i] - RSI[i-9] + SMA3(RSI3)[i]
//!
//! The CFG lines are the smoothing library applied to A itself, not to price
//! or RSI: cfg_sma4/9/20, cfg_ema20/45, cfg_wma45.

use crate::indicators::{ema, shift, sma, wma, zip_with, Series};

/// Bars between the two RSI readings in A.
pub const RSI_LAG: usize = 9;

#[derive(Debug, Clone, PartialEq)]
pub struct StampSeries {
    pub a: Series,
    pub cfg_sma4: Series,
    pub cfg_sma9: Series,
    pub cfg_sma20: Series,
    pub cfg_ema20: Series,
    pub cfg_ema45: Series,
    pub cfg_wma45: Series,
}

/// The A series. Undefined until both the lagged RSI and SMA3(RSI3) exist.
pub fn stamp_a(rsi: &[Option<f64>], rsi3_sma3: &[Option<f64>]) -> Series {
    let momentum = zip_with(rsi, &shift(rsi, RSI_LAG), |now, then| now - then);
    zip_with(&momentum, rsi3_sma3, |m, s| m + s)
}

pub fn stamp(rsi: &[Option<f64>], rsi3_sma3: &[Option<f64>]) -> StampSeries {
    let a = stamp_a(rsi, rsi3_sma3);
    StampSeries {
        cfg_sma4: sma(&a, 4),
        cfg_sma9: sma(&a, 9),
        cfg_sma20: sma(&a, 20),
        cfg_ema20: ema(&a, 20),
        cfg_ema45: ema(&a, 45),
        cfg_wma45: wma(&a, 45),
        a,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::indicators::{assert_approx, defined};

    #[test]
    fn a_combines_lagged_rsi_and_rsi3_smoothing() {
        let rsi: Series = (0..12).map(|i| if i < 2 { None } else { Some(40.0 + i as f64) }).collect();
        let rsi3_sma3: Series = vec![Some(5.0); 12];
        let a = stamp_a(&rsi, &rsi3_sma3);

        // RSI[i-9] first defined at i = 11
        assert!(a[..11].iter().all(|v| v.is_none()));
        // (40+11) - (40+2) + 5
        assert_approx(defined(&a, 11), 14.0, 1e-12);
    }

    #[test]
    fn a_needs_rsi3_smoothing() {
        let rsi: Series = vec![Some(50.0); 12];
        let mut rsi3_sma3: Series = vec![Some(1.0); 12];
        rsi3_sma3[10] = None;
        let a = stamp_a(&rsi, &rsi3_sma3);
        assert!(a[10].is_none());
        assert_approx(defined(&a, 11), 1.0, 1e-12);
    }

    #[test]
    fn cfg_lines_smooth_a_not_rsi() {
        let rsi: Series = (0..80).map(|i| Some(50.0 + (i % 7) as f64)).collect();
        let rsi3_sma3: Series = vec![Some(2.0); 80];
        let s = stamp(&rsi, &rsi3_sma3);

        let expected = crate::indicators::sma(&s.a, 9);
        assert_eq!(s.cfg_sma9, expected);
        // A defined from 9, so EMA45 seeds at 9 + 44
        assert!(s.cfg_ema45[52].is_none());
        assert!(s.cfg_ema45[53].is_some());
        assert!(s.cfg_wma45[53].is_some());
    }
}
