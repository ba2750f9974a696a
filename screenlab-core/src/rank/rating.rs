//! Composite RS rating and the per-date cross-sectional ranking.
//!
//! rs_raw = Σ w_p * rank_p / Σ w_p over the periods with a rank, so a symbol
//! missing its longer periods is scored from the ones it has.
//! rs_rating = ceil(rs_raw) clamped to [1, 99].

use super::percentile::percentile_ratings;
use super::returns::{PeriodReturns, PERIOD_COUNT};
use crate::config::PeriodWeights;
use crate::domain::RsRow;
use chrono::NaiveDate;

/// One participant on a ranking date.
#[derive(Debug, Clone, PartialEq)]
pub struct RankEntry {
    pub symbol: String,
    pub returns: PeriodReturns,
}

pub fn rs_raw(ranks: &[Option<u8>; PERIOD_COUNT], weights: &PeriodWeights) -> Option<f64> {
    let mut weighted = 0.0;
    let mut total = 0.0;
    for (rank, weight) in ranks.iter().zip(weights.as_array()) {
        if let Some(r) = rank {
            weighted += weight * f64::from(*r);
            total += weight;
        }
    }
    (total > 0.0).then(|| weighted / total)
}

pub fn rs_rating(raw: Option<f64>) -> Option<u8> {
    raw.filter(|r| r.is_finite())
        .map(|r| r.ceil().clamp(1.0, 99.0) as u8)
}

/// Rank every participant of one date.
///
/// Entries without a 3m return do not participate and get no row. Each period
/// is ranked only among the entries that have that period's return.
pub fn rank_date(date: NaiveDate, entries: &[RankEntry], weights: &PeriodWeights) -> Vec<RsRow> {
    let participants: Vec<&RankEntry> = entries.iter().filter(|e| e.returns[0].is_some()).collect();

    let per_period: Vec<Vec<Option<u8>>> = (0..PERIOD_COUNT)
        .map(|p| {
            let values: Vec<Option<f64>> = participants.iter().map(|e| e.returns[p]).collect();
            percentile_ratings(&values)
        })
        .collect();

    participants
        .iter()
        .enumerate()
        .map(|(i, entry)| {
            let ranks: [Option<u8>; PERIOD_COUNT] = std::array::from_fn(|p| per_period[p][i]);
            let raw = rs_raw(&ranks, weights);
            RsRow {
                symbol: entry.symbol.clone(),
                date,
                return_3m: entry.returns[0],
                return_6m: entry.returns[1],
                return_9m: entry.returns[2],
                return_12m: entry.returns[3],
                rank_3m: ranks[0],
                rank_6m: ranks[1],
                rank_9m: ranks[2],
                rank_12m: ranks[3],
                rs_raw: raw,
                rs_rating: rs_rating(raw),
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::indicators::assert_approx;

    fn date() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 6, 30).unwrap()
    }

    fn entry(symbol: &str, returns: PeriodReturns) -> RankEntry {
        RankEntry {
            symbol: symbol.into(),
            returns,
        }
    }

    #[test]
    fn weights_renormalize_over_available_periods() {
        let w = PeriodWeights::default();
        assert_approx(rs_raw(&[Some(80), None, None, None], &w).unwrap(), 80.0, 1e-12);
        // (0.4*90 + 0.2*60) / 0.6 = 80
        assert_approx(rs_raw(&[Some(90), Some(60), None, None], &w).unwrap(), 80.0, 1e-9);
        assert!(rs_raw(&[None; 4], &w).is_none());
    }

    #[test]
    fn rating_is_ceiled_and_clamped() {
        assert_eq!(rs_rating(Some(80.2)), Some(81));
        assert_eq!(rs_rating(Some(0.3)), Some(1));
        assert_eq!(rs_rating(Some(99.0)), Some(99));
        assert_eq!(rs_rating(None), None);
    }

    #[test]
    fn stronger_return_ranks_higher() {
        let rows = rank_date(
            date(),
            &[
                entry("A", [Some(0.10), None, None, None]),
                entry("B", [Some(-0.05), None, None, None]),
            ],
            &PeriodWeights::default(),
        );
        assert_eq!(rows.len(), 2);
        assert!(rows[0].rank_3m > rows[1].rank_3m);
        assert_eq!(rows[0].rs_rating, Some(99));
        assert_eq!(rows[1].rs_rating, Some(50));
    }

    #[test]
    fn non_participants_get_no_row() {
        let rows = rank_date(
            date(),
            &[
                entry("A", [Some(0.10), Some(0.2), None, None]),
                entry("B", [None, Some(0.3), None, None]),
                entry("C", [Some(0.05), Some(0.1), None, None]),
            ],
            &PeriodWeights::default(),
        );
        let symbols: Vec<&str> = rows.iter().map(|r| r.symbol.as_str()).collect();
        assert_eq!(symbols, vec!["A", "C"]);
    }

    #[test]
    fn sparse_period_is_undefined_market_wide() {
        let rows = rank_date(
            date(),
            &[
                entry("A", [Some(0.10), None, None, Some(0.5)]),
                entry("B", [Some(0.20), None, None, None]),
            ],
            &PeriodWeights::default(),
        );
        // Only one 12m value: no 12m ranks
        assert!(rows.iter().all(|r| r.rank_12m.is_none()));
        assert_eq!(rows[0].return_12m, Some(0.5));
        assert_eq!(rows[1].rs_rating, Some(99));
    }

    #[test]
    fn lone_participant_has_no_rating() {
        let rows = rank_date(
            date(),
            &[entry("A", [Some(0.10), Some(0.2), Some(0.3), Some(0.4)])],
            &PeriodWeights::default(),
        );
        assert_eq!(rows.len(), 1);
        assert!(rows[0].rank_3m.is_none());
        assert!(rows[0].rs_raw.is_none());
        assert!(rows[0].rs_rating.is_none());
    }
}
