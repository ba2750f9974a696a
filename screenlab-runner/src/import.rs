//! CSV import into the Parquet price store.
//!
//! Input columns: `symbol,date,open,high,low,close,volume` with ISO dates.
//! Rows may be in any order and mix symbols. Each symbol is validated as a
//! whole before anything is written for it.

use std::collections::BTreeMap;
use std::io::Read;
use std::path::Path;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use screenlab_core::data::{DataError, ParquetPriceStore, PriceSource};
use screenlab_core::domain::{DailySeries, PriceBar};

#[derive(Debug, Error)]
pub enum ImportError {
    #[error("read CSV {path}: {source}")]
    Csv {
        path: String,
        #[source]
        source: csv::Error,
    },

    #[error("'{symbol}' has two rows for {date}")]
    DuplicateDate { symbol: String, date: NaiveDate },

    #[error("'{symbol}' on {date}: non-finite price")]
    NonFinite { symbol: String, date: NaiveDate },

    #[error("empty symbol on row {row}")]
    EmptySymbol { row: usize },

    #[error(transparent)]
    Data(#[from] DataError),
}

#[derive(Debug, Deserialize)]
struct CsvBar {
    symbol: String,
    date: NaiveDate,
    open: f64,
    high: f64,
    low: f64,
    close: f64,
    volume: u64,
}

#[derive(Debug, Clone, Serialize)]
pub struct SymbolImport {
    pub symbol: String,
    /// Bars stored after the import (including merged history).
    pub bars: usize,
    pub start: NaiveDate,
    pub end: NaiveDate,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct ImportReport {
    pub rows_read: usize,
    pub symbols: Vec<SymbolImport>,
}

/// Parse bars grouped by symbol, each group sorted by date.
pub fn read_bars_csv<R: Read>(
    reader: R,
    source_name: &str,
) -> Result<BTreeMap<String, Vec<PriceBar>>, ImportError> {
    let mut rdr = csv::ReaderBuilder::new().trim(csv::Trim::All).from_reader(reader);
    let mut grouped: BTreeMap<String, Vec<PriceBar>> = BTreeMap::new();

    for (i, record) in rdr.deserialize::<CsvBar>().enumerate() {
        let row = record.map_err(|source| ImportError::Csv {
            path: source_name.to_string(),
            source,
        })?;
        if row.symbol.is_empty() {
            return Err(ImportError::EmptySymbol { row: i + 1 });
        }
        let bar = PriceBar {
            symbol: row.symbol,
            date: row.date,
            open: row.open,
            high: row.high,
            low: row.low,
            close: row.close,
            volume: row.volume,
        };
        if bar.is_void() {
            return Err(ImportError::NonFinite {
                symbol: bar.symbol,
                date: bar.date,
            });
        }
        grouped.entry(bar.symbol.clone()).or_default().push(bar);
    }

    for (symbol, bars) in grouped.iter_mut() {
        bars.sort_by_key(|b| b.date);
        if let Some(pair) = bars.windows(2).find(|w| w[0].date == w[1].date) {
            return Err(ImportError::DuplicateDate {
                symbol: symbol.clone(),
                date: pair[0].date,
            });
        }
    }
    Ok(grouped)
}

/// Import a CSV file into the store.
///
/// With `merge`, imported bars are laid over the stored history (an imported
/// bar replaces a stored bar of the same date). If the stored history of a
/// symbol cannot be read, the merge fails and nothing is written for that
/// symbol. Without `merge`, each imported symbol's history is replaced.
pub fn import_csv(
    path: &Path,
    store: &ParquetPriceStore,
    merge: bool,
) -> Result<ImportReport, ImportError> {
    let source_name = path.display().to_string();
    let file = std::fs::File::open(path).map_err(|e| ImportError::Csv {
        path: source_name.clone(),
        source: csv::Error::from(e),
    })?;
    let grouped = read_bars_csv(file, &source_name)?;

    let mut report = ImportReport {
        rows_read: grouped.values().map(Vec::len).sum(),
        ..Default::default()
    };

    for (symbol, bars) in grouped {
        let bars = if merge {
            merge_with_stored(store, &symbol, bars)?
        } else {
            bars
        };
        let series = DailySeries::new(symbol.as_str(), bars).map_err(DataError::from)?;
        let meta = store.write(&series, &format!("csv:{source_name}"))?;
        tracing::info!(
            %symbol,
            bars = meta.bar_count,
            start = %meta.start_date,
            end = %meta.end_date,
            "imported"
        );
        report.symbols.push(SymbolImport {
            symbol,
            bars: meta.bar_count,
            start: meta.start_date,
            end: meta.end_date,
        });
    }
    Ok(report)
}

fn merge_with_stored(
    store: &ParquetPriceStore,
    symbol: &str,
    bars: Vec<PriceBar>,
) -> Result<Vec<PriceBar>, ImportError> {
    let stored = match store.load(symbol) {
        Ok(series) => series.bars().to_vec(),
        Err(DataError::NoData { .. }) => Vec::new(),
        Err(e) => {
            tracing::error!(%symbol, error = %e, "stored history unreadable, merge aborted");
            return Err(e.into());
        }
    };
    let mut by_date: BTreeMap<NaiveDate, PriceBar> =
        stored.into_iter().map(|b| (b.date, b)).collect();
    for bar in bars {
        by_date.insert(bar.date, bar);
    }
    Ok(by_date.into_values().collect())
}
