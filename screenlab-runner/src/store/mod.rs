//! Row persistence: the storage collaborator the batch writes into.
//!
//! Both row types are upserted by `(symbol, date)`, so committing the same
//! chunk twice leaves the store unchanged. The checkpoint is stored next to
//! the rows but is not part of the digest.

pub mod jsonl;
pub mod memory;

use chrono::NaiveDate;
use screenlab_core::domain::{IndicatorRow, RsRow};
use thiserror::Error;

use crate::checkpoint::Checkpoint;

pub use jsonl::JsonlStore;
pub use memory::MemoryStore;

#[derive(Debug, Error)]
pub enum StoreError {
    /// Worth retrying: the store may accept the same write shortly.
    #[error("transient storage failure: {0}")]
    Transient(String),

    /// The store cannot be reached at all; the run cannot continue.
    #[error("storage unavailable: {0}")]
    Unavailable(String),

    #[error("I/O error on {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("serialization: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("corrupt row in {path} line {line}: {reason}")]
    Corrupt {
        path: String,
        line: usize,
        reason: String,
    },
}

impl StoreError {
    pub fn is_transient(&self) -> bool {
        match self {
            StoreError::Transient(_) => true,
            StoreError::Io { source, .. } => matches!(
                source.kind(),
                std::io::ErrorKind::Interrupted
                    | std::io::ErrorKind::TimedOut
                    | std::io::ErrorKind::WouldBlock
            ),
            _ => false,
        }
    }

    /// Errors after which no further chunk can succeed.
    pub fn is_fatal(&self) -> bool {
        matches!(self, StoreError::Unavailable(_))
    }

    pub(crate) fn io(path: &std::path::Path, source: std::io::Error) -> Self {
        StoreError::Io {
            path: path.display().to_string(),
            source,
        }
    }
}

/// Rows of a contiguous run of trading dates, committed as one unit.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RowChunk {
    /// Trading dates covered, ascending.
    pub dates: Vec<NaiveDate>,
    pub indicators: Vec<IndicatorRow>,
    pub rs: Vec<RsRow>,
}

impl RowChunk {
    pub fn first_date(&self) -> Option<NaiveDate> {
        self.dates.first().copied()
    }

    pub fn last_date(&self) -> Option<NaiveDate> {
        self.dates.last().copied()
    }

    pub fn row_count(&self) -> usize {
        self.indicators.len() + self.rs.len()
    }
}

pub trait RowStore: Send + Sync {
    fn name(&self) -> &str;

    /// Upsert every row of the chunk. A failed commit may leave part of the
    /// chunk written; committing it again converges.
    fn commit_chunk(&self, chunk: &RowChunk) -> Result<(), StoreError>;

    fn load_checkpoint(&self) -> Result<Option<Checkpoint>, StoreError>;

    fn save_checkpoint(&self, checkpoint: &Checkpoint) -> Result<(), StoreError>;

    /// Symbols with at least one indicator row, ascending.
    fn indicator_symbols(&self) -> Result<Vec<String>, StoreError>;

    /// Indicator rows of one symbol, ascending by date.
    fn indicator_rows(&self, symbol: &str) -> Result<Vec<IndicatorRow>, StoreError>;

    /// Dates with at least one RS row, ascending.
    fn rs_dates(&self) -> Result<Vec<NaiveDate>, StoreError>;

    /// RS rows of one date, ascending by symbol.
    fn rs_rows(&self, date: NaiveDate) -> Result<Vec<RsRow>, StoreError>;

    /// BLAKE3 digest of every stored row in key order.
    ///
    /// Two stores holding the same rows have the same digest regardless of how
    /// many times or in which chunks the rows were written.
    fn digest(&self) -> Result<String, StoreError> {
        let mut hasher = blake3::Hasher::new();
        for symbol in self.indicator_symbols()? {
            for row in self.indicator_rows(&symbol)? {
                hasher.update(&serde_json::to_vec(&row)?);
                hasher.update(b"\n");
            }
        }
        hasher.update(b"--rs--\n");
        for date in self.rs_dates()? {
            for row in self.rs_rows(date)? {
                hasher.update(&serde_json::to_vec(&row)?);
                hasher.update(b"\n");
            }
        }
        Ok(hasher.finalize().to_hex().to_string())
    }

    /// Row counts `(indicator rows, rs rows)`.
    fn row_counts(&self) -> Result<(usize, usize), StoreError> {
        let mut indicators = 0;
        for symbol in self.indicator_symbols()? {
            indicators += self.indicator_rows(&symbol)?.len();
        }
        let mut rs = 0;
        for date in self.rs_dates()? {
            rs += self.rs_rows(date)?.len();
        }
        Ok((indicators, rs))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn transient_classification() {
        assert!(StoreError::Transient("lock".into()).is_transient());
        assert!(!StoreError::Unavailable("gone".into()).is_transient());
        assert!(StoreError::Unavailable("gone".into()).is_fatal());

        let timed_out = StoreError::Io {
            path: "x".into(),
            source: std::io::Error::new(std::io::ErrorKind::TimedOut, "slow disk"),
        };
        assert!(timed_out.is_transient());

        let denied = StoreError::Io {
            path: "x".into(),
            source: std::io::Error::new(std::io::ErrorKind::PermissionDenied, "ro"),
        };
        assert!(!denied.is_transient());
        assert!(!denied.is_fatal());
    }
}
