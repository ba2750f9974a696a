//! "The Number": a high/low channel averaged over a short and a long window.
//!
//! value = (SMA13(high) + SMA13(low) + SMA65(high) + SMA65(low)) / 4
//! upper = (SMA13(high) + SMA65(high)) / 2
//! lower = (SMA13(low) + SMA65(low)) / 2
//! Lookback: 64.

use crate::indicators::{sma, zip_with, Series};

pub const SHORT_PERIOD: usize = 13;
pub const LONG_PERIOD: usize = 65;

#[derive(Debug, Clone, PartialEq)]
pub struct TheNumber {
    pub value: Series,
    pub upper: Series,
    pub lower: Series,
}

pub fn the_number(highs: &[Option<f64>], lows: &[Option<f64>]) -> TheNumber {
    let high_short = sma(highs, SHORT_PERIOD);
    let high_long = sma(highs, LONG_PERIOD);
    let low_short = sma(lows, SHORT_PERIOD);
    let low_long = sma(lows, LONG_PERIOD);

    let upper = zip_with(&high_short, &high_long, |s, l| (s + l) / 2.0);
    let lower = zip_with(&low_short, &low_long, |s, l| (s + l) / 2.0);
    let value = (0..highs.len().min(lows.len()))
        .map(|i| match (high_short[i], low_short[i], high_long[i], low_long[i]) {
            (Some(hs), Some(ls), Some(hl), Some(ll)) => Some((hs + ls + hl + ll) / 4.0),
            _ => None,
        })
        .collect();

    TheNumber {
        value,
        upper,
        lower,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::indicators::{assert_approx, defined, lift};

    #[test]
    fn undefined_until_long_window() {
        let highs = lift(&[11.0; 70]);
        let lows = lift(&[9.0; 70]);
        let n = the_number(&highs, &lows);
        assert!(n.value[63].is_none());
        assert!(n.upper[63].is_none());
        assert_approx(defined(&n.value, 64), 10.0, 1e-12);
        assert_approx(defined(&n.upper, 64), 11.0, 1e-12);
        assert_approx(defined(&n.lower, 64), 9.0, 1e-12);
    }

    #[test]
    fn value_sums_four_averages_before_dividing() {
        // Uneven walk so the two groupings round differently somewhere.
        let mut price = 100.0_f64;
        let mut h = Vec::new();
        let mut l = Vec::new();
        for i in 0..400u64 {
            let step = ((i.wrapping_mul(2654435761) >> 7) % 97) as f64 / 97.0 - 0.49;
            price = (price + step * 1.7).max(5.0);
            h.push(price + 0.3 + (i % 7) as f64 * 0.013);
            l.push(price - 0.2 - (i % 5) as f64 * 0.011);
        }
        let (hs, hl) = (sma(&lift(&h), 13), sma(&lift(&h), 65));
        let (ls, ll) = (sma(&lift(&l), 13), sma(&lift(&l), 65));
        let n = the_number(&lift(&h), &lift(&l));

        for i in 64..400 {
            let expected = (hs[i].unwrap() + ls[i].unwrap() + hl[i].unwrap() + ll[i].unwrap()) / 4.0;
            assert_eq!(n.value[i].unwrap().to_bits(), expected.to_bits(), "index {i}");
        }
    }

    #[test]
    fn mixes_short_and_long_windows() {
        // Highs 100 for 65 bars then 113 for 13 bars; lows 10 lower
        let mut h = vec![100.0; 65];
        h.extend(vec![113.0; 13]);
        let l: Vec<f64> = h.iter().map(|v| v - 10.0).collect();
        let n = the_number(&lift(&h), &lift(&l));

        let i = 77;
        let sma13_h = 113.0;
        let sma65_h = (52.0 * 100.0 + 13.0 * 113.0) / 65.0;
        let upper = (sma13_h + sma65_h) / 2.0;
        let lower = upper - 10.0;
        assert_approx(defined(&n.upper, i), upper, 1e-9);
        assert_approx(defined(&n.lower, i), lower, 1e-9);
        assert_approx(
            defined(&n.value, i),
            (sma13_h + (sma13_h - 10.0) + sma65_h + (sma65_h - 10.0)) / 4.0,
            1e-9,
        );
    }
}
