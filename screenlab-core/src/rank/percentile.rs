//! Cross-sectional percentile ratings.
//!
//! Average rank for ties (1-based), as a fraction of the population:
//! pct = avg_rank / n, rating = ceil(pct * 99) clamped to [1, 99].
//! Undefined entries take no part. With fewer than 2 defined values every
//! rating is undefined.

use std::cmp::Ordering;

pub const MIN_PARTICIPANTS: usize = 2;

/// Average 1-based rank of each value; ties share the mean of their ranks.
pub fn average_ranks(values: &[f64]) -> Vec<f64> {
    let n = values.len();
    let mut indexed: Vec<(usize, f64)> = values.iter().copied().enumerate().collect();
    indexed.sort_by(|a, b| a.1.partial_cmp(&b.1).unwrap_or(Ordering::Equal));

    let mut ranks = vec![0.0_f64; n];
    let mut i = 0;
    while i < n {
        let mut j = i;
        // End of the tied group (exact equality)
        while j < n && indexed[j].1 == indexed[i].1 {
            j += 1;
        }
        let avg_rank = (i + 1 + j) as f64 / 2.0;
        for idx in &indexed[i..j] {
            ranks[idx.0] = avg_rank;
        }
        i = j;
    }
    ranks
}

/// Map an average rank in a population of `n` to a 1–99 rating.
pub fn rating_from_rank(avg_rank: f64, n: usize) -> u8 {
    let scaled = (avg_rank * 99.0 / n as f64).ceil();
    scaled.clamp(1.0, 99.0) as u8
}

/// Rate every defined value against the other defined values.
pub fn percentile_ratings(values: &[Option<f64>]) -> Vec<Option<u8>> {
    let defined: Vec<(usize, f64)> = values
        .iter()
        .enumerate()
        .filter_map(|(i, v)| v.filter(|x| x.is_finite()).map(|x| (i, x)))
        .collect();

    let mut ratings = vec![None; values.len()];
    if defined.len() < MIN_PARTICIPANTS {
        return ratings;
    }

    let just_values: Vec<f64> = defined.iter().map(|&(_, v)| v).collect();
    let ranks = average_ranks(&just_values);
    let n = defined.len();
    for (&(slot, _), rank) in defined.iter().zip(ranks) {
        ratings[slot] = Some(rating_from_rank(rank, n));
    }
    ratings
}
