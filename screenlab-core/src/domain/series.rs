//! DailySeries: the per-symbol unit of computation.
//!
//! Wraps the ordered bar history of one symbol and enforces the ordering
//! invariant at construction, so every downstream recurrence can index by
//! position without re-checking dates.

use super::bar::PriceBar;
use chrono::NaiveDate;
use thiserror::Error;

#[derive(Debug, Error, PartialEq)]
pub enum SeriesError {
    #[error("series for '{expected}' contains a bar for '{found}' on {date}")]
    MixedSymbols {
        expected: String,
        found: String,
        date: NaiveDate,
    },

    #[error("dates for '{symbol}' are not strictly increasing: {previous} then {next}")]
    NotIncreasing {
        symbol: String,
        previous: NaiveDate,
        next: NaiveDate,
    },
}

/// Ordered daily bars for one symbol, dates strictly increasing and unique.
#[derive(Debug, Clone)]
pub struct DailySeries {
    symbol: String,
    bars: Vec<PriceBar>,
}

impl DailySeries {
    /// Build a series from bars already sorted ascending by date.
    pub fn new(symbol: impl Into<String>, bars: Vec<PriceBar>) -> Result<Self, SeriesError> {
        let symbol = symbol.into();
        for bar in &bars {
            if bar.symbol != symbol {
                return Err(SeriesError::MixedSymbols {
                    expected: symbol,
                    found: bar.symbol.clone(),
                    date: bar.date,
                });
            }
        }
        for pair in bars.windows(2) {
            if pair[1].date <= pair[0].date {
                return Err(SeriesError::NotIncreasing {
                    symbol,
                    previous: pair[0].date,
                    next: pair[1].date,
                });
            }
        }
        Ok(Self { symbol, bars })
    }

    pub fn symbol(&self) -> &str {
        &self.symbol
    }

    pub fn bars(&self) -> &[PriceBar] {
        &self.bars
    }

    pub fn len(&self) -> usize {
        self.bars.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bars.is_empty()
    }

    pub fn dates(&self) -> Vec<NaiveDate> {
        self.bars.iter().map(|b| b.date).collect()
    }

    pub fn opens(&self) -> Vec<f64> {
        self.bars.iter().map(|b| b.open).collect()
    }

    pub fn highs(&self) -> Vec<f64> {
        self.bars.iter().map(|b| b.high).collect()
    }

    pub fn lows(&self) -> Vec<f64> {
        self.bars.iter().map(|b| b.low).collect()
    }

    pub fn closes(&self) -> Vec<f64> {
        self.bars.iter().map(|b| b.close).collect()
    }

    /// Position of the bar dated `date`, if the symbol traded that day.
    pub fn index_of(&self, date: NaiveDate) -> Option<usize> {
        self.bars.binary_search_by_key(&date, |b| b.date).ok()
    }

    pub fn first_date(&self) -> Option<NaiveDate> {
        self.bars.first().map(|b| b.date)
    }

    pub fn last_date(&self) -> Option<NaiveDate> {
        self.bars.last().map(|b| b.date)
    }

    /// The same series without void bars. Order and symbol are unchanged, so
    /// the invariants still hold.
    pub fn without_void_bars(&self) -> DailySeries {
        Self {
            symbol: self.symbol.clone(),
            bars: self.bars.iter().filter(|b| !b.is_void()).cloned().collect(),
        }
    }
}
