//! Price source trait and structured error types.
//!
//! The PriceSource trait abstracts over where daily bars live (the Parquet
//! price store, an in-memory table in tests) so the engine never depends on a
//! concrete storage backend.

use crate::domain::{DailySeries, SeriesError};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum DataError {
    #[error("no price data for symbol '{symbol}'")]
    NoData { symbol: String },

    #[error("price data for '{symbol}' is incomplete: metadata lists {expected} bars, found {found}")]
    Incomplete {
        symbol: String,
        expected: usize,
        found: usize,
    },

    #[error("quarantined corrupt file {path}: {reason}")]
    Quarantined { path: String, reason: String },

    #[error("invalid series: {0}")]
    Series(#[from] SeriesError),

    #[error("validation error: {0}")]
    Validation(String),

    #[error("parquet I/O error: {0}")]
    Parquet(String),

    #[error("storage I/O error: {0}")]
    Io(String),
}

/// Read-only access to per-symbol daily price history.
///
/// Implementations must return bars sorted ascending by date; the returned
/// [`DailySeries`] enforces that invariant.
pub trait PriceSource: Send + Sync {
    /// Human-readable name of this source.
    fn name(&self) -> &str;

    /// All symbols with stored history, sorted.
    fn symbols(&self) -> Result<Vec<String>, DataError>;

    /// Full daily history of one symbol.
    fn load(&self, symbol: &str) -> Result<DailySeries, DataError>;
}
