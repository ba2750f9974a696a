//! In-memory row store for tests and dry runs.

use std::collections::BTreeMap;
use std::sync::{Mutex, MutexGuard};

use chrono::NaiveDate;
use screenlab_core::domain::{IndicatorRow, RsRow};

use super::{RowChunk, RowStore, StoreError};
use crate::checkpoint::Checkpoint;

#[derive(Debug, Default)]
struct Tables {
    indicators: BTreeMap<(String, NaiveDate), IndicatorRow>,
    rs: BTreeMap<(NaiveDate, String), RsRow>,
    checkpoint: Option<Checkpoint>,
    commits: usize,
}

#[derive(Debug, Default)]
pub struct MemoryStore {
    tables: Mutex<Tables>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of successful `commit_chunk` calls.
    pub fn commits(&self) -> usize {
        self.lock().map(|t| t.commits).unwrap_or(0)
    }

    fn lock(&self) -> Result<MutexGuard<'_, Tables>, StoreError> {
        self.tables
            .lock()
            .map_err(|_| StoreError::Unavailable("memory store lock poisoned".into()))
    }
}

impl RowStore for MemoryStore {
    fn name(&self) -> &str {
        "memory"
    }

    fn commit_chunk(&self, chunk: &RowChunk) -> Result<(), StoreError> {
        let mut tables = self.lock()?;
        for row in &chunk.indicators {
            tables
                .indicators
                .insert((row.symbol.clone(), row.date), row.clone());
        }
        for row in &chunk.rs {
            tables.rs.insert((row.date, row.symbol.clone()), row.clone());
        }
        tables.commits += 1;
        Ok(())
    }

    fn load_checkpoint(&self) -> Result<Option<Checkpoint>, StoreError> {
        Ok(self.lock()?.checkpoint.clone())
    }

    fn save_checkpoint(&self, checkpoint: &Checkpoint) -> Result<(), StoreError> {
        self.lock()?.checkpoint = Some(checkpoint.clone());
        Ok(())
    }

    fn indicator_symbols(&self) -> Result<Vec<String>, StoreError> {
        let tables = self.lock()?;
        let mut symbols: Vec<String> = tables.indicators.keys().map(|(s, _)| s.clone()).collect();
        symbols.dedup();
        Ok(symbols)
    }

    fn indicator_rows(&self, symbol: &str) -> Result<Vec<IndicatorRow>, StoreError> {
        let tables = self.lock()?;
        Ok(tables
            .indicators
            .iter()
            .filter(|((s, _), _)| s == symbol)
            .map(|(_, row)| row.clone())
            .collect())
    }

    fn rs_dates(&self) -> Result<Vec<NaiveDate>, StoreError> {
        let tables = self.lock()?;
        let mut dates: Vec<NaiveDate> = tables.rs.keys().map(|(d, _)| *d).collect();
        dates.dedup();
        Ok(dates)
    }

    fn rs_rows(&self, date: NaiveDate) -> Result<Vec<RsRow>, StoreError> {
        let tables = self.lock()?;
        Ok(tables
            .rs
            .range((date, String::new())..)
            .take_while(|((d, _), _)| *d == date)
            .map(|(_, row)| row.clone())
            .collect())
    }
}
