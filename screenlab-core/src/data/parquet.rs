//! Parquet price store with Hive-style partitioning.
//!
//! Layout: `{root}/symbol={SYMBOL}/{year}.parquet` plus `meta.json`
//!
//! - Atomic writes (write to .tmp, rename into place)
//! - Integrity validation on load (schema check, row count > 0, bar count
//!   matches the metadata sidecar)
//! - Quarantine for corrupt files ({filename}.quarantined)
//! - Metadata sidecar per symbol (BLAKE3 data hash, date range, source)

use super::provider::{DataError, PriceSource};
use crate::domain::{DailySeries, PriceBar};
use chrono::{Datelike, NaiveDate};
use polars::prelude::*;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

const PARTITION_PREFIX: &str = "symbol=";
const EXPECTED_COLUMNS: [&str; 6] = ["date", "open", "high", "low", "close", "volume"];

/// Metadata sidecar for a stored symbol.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PriceMeta {
    pub symbol: String,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub bar_count: usize,
    pub data_hash: String,
    pub source: String,
    pub stored_at: chrono::NaiveDateTime,
}

/// Storage summary for a single symbol.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PriceStatus {
    pub symbol: String,
    pub stored: bool,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    pub bar_count: Option<usize>,
}

pub struct ParquetPriceStore {
    root: PathBuf,
}

impl ParquetPriceStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn symbol_dir(&self, symbol: &str) -> PathBuf {
        self.root.join(format!("{PARTITION_PREFIX}{symbol}"))
    }

    fn year_path(&self, symbol: &str, year: i32) -> PathBuf {
        self.symbol_dir(symbol).join(format!("{year}.parquet"))
    }

    fn meta_path(&self, symbol: &str) -> PathBuf {
        self.symbol_dir(symbol).join("meta.json")
    }

    /// Replace the stored history of one symbol.
    ///
    /// The series is written one Parquet file per calendar year. Year files
    /// from an earlier write that the new series does not cover are removed.
    pub fn write(&self, series: &DailySeries, source: &str) -> Result<PriceMeta, DataError> {
        let symbol = series.symbol();
        let bars = series.bars();
        let (Some(first), Some(last)) = (bars.first(), bars.last()) else {
            return Err(DataError::Validation(format!("no bars to store for '{symbol}'")));
        };

        let sym_dir = self.symbol_dir(symbol);
        fs::create_dir_all(&sym_dir)
            .map_err(|e| DataError::Io(format!("create {}: {e}", sym_dir.display())))?;

        let mut by_year: BTreeMap<i32, Vec<&PriceBar>> = BTreeMap::new();
        for bar in bars {
            by_year.entry(bar.date.year()).or_default().push(bar);
        }

        for (year, year_bars) in &by_year {
            let mut df = bars_to_dataframe(year_bars)?;
            let path = self.year_path(symbol, *year);
            let tmp_path = path.with_extension("parquet.tmp");

            write_parquet(&mut df, &tmp_path)?;

            fs::rename(&tmp_path, &path).map_err(|e| {
                let _ = fs::remove_file(&tmp_path);
                DataError::Io(format!("atomic rename failed: {e}"))
            })?;
        }

        for path in self.parquet_files(symbol)? {
            let stale = year_of(&path).is_some_and(|y| !by_year.contains_key(&y));
            if stale {
                fs::remove_file(&path)
                    .map_err(|e| DataError::Io(format!("remove {}: {e}", path.display())))?;
            }
        }

        let meta = PriceMeta {
            symbol: symbol.to_string(),
            start_date: first.date,
            end_date: last.date,
            bar_count: bars.len(),
            data_hash: hash_bars(bars)?,
            source: source.to_string(),
            stored_at: chrono::Local::now().naive_local(),
        };
        let meta_json = serde_json::to_string_pretty(&meta)
            .map_err(|e| DataError::Io(format!("meta serialization: {e}")))?;
        let meta_path = self.meta_path(symbol);
        let tmp_meta = meta_path.with_extension("json.tmp");
        fs::write(&tmp_meta, meta_json).map_err(|e| DataError::Io(format!("meta write: {e}")))?;
        fs::rename(&tmp_meta, &meta_path)
            .map_err(|e| DataError::Io(format!("meta rename: {e}")))?;

        Ok(meta)
    }

    /// Metadata sidecar of a symbol, if present and readable.
    pub fn get_meta(&self, symbol: &str) -> Option<PriceMeta> {
        let content = fs::read_to_string(self.meta_path(symbol)).ok()?;
        serde_json::from_str(&content).ok()
    }

    /// Storage summary for the given symbols.
    pub fn status(&self, symbols: &[&str]) -> Vec<PriceStatus> {
        symbols
            .iter()
            .map(|sym| {
                let meta = self.get_meta(sym);
                PriceStatus {
                    symbol: sym.to_string(),
                    stored: meta.is_some(),
                    start_date: meta.as_ref().map(|m| m.start_date),
                    end_date: meta.as_ref().map(|m| m.end_date),
                    bar_count: meta.as_ref().map(|m| m.bar_count),
                }
            })
            .collect()
    }

    fn parquet_files(&self, symbol: &str) -> Result<Vec<PathBuf>, DataError> {
        let sym_dir = self.symbol_dir(symbol);
        let entries =
            fs::read_dir(&sym_dir).map_err(|e| DataError::Io(format!("read dir: {e}")))?;
        let mut files = Vec::new();
        for entry in entries {
            let path = entry
                .map_err(|e| DataError::Io(format!("dir entry: {e}")))?
                .path();
            if path.extension().and_then(|e| e.to_str()) == Some("parquet") {
                files.push(path);
            }
        }
        files.sort();
        Ok(files)
    }
}

impl PriceSource for ParquetPriceStore {
    fn name(&self) -> &str {
        "parquet"
    }

    fn symbols(&self) -> Result<Vec<String>, DataError> {
        if !self.root.exists() {
            return Ok(Vec::new());
        }
        let entries =
            fs::read_dir(&self.root).map_err(|e| DataError::Io(format!("read dir: {e}")))?;
        let mut symbols = Vec::new();
        for entry in entries {
            let entry = entry.map_err(|e| DataError::Io(format!("dir entry: {e}")))?;
            if !entry.path().is_dir() {
                continue;
            }
            if let Some(sym) = entry
                .file_name()
                .to_str()
                .and_then(|n| n.strip_prefix(PARTITION_PREFIX))
            {
                symbols.push(sym.to_string());
            }
        }
        symbols.sort();
        Ok(symbols)
    }

    /// Load the full history of a symbol.
    ///
    /// A file that fails validation is renamed to `.quarantined` and the load
    /// fails with [`DataError::Quarantined`]. Once quarantined, the symbol fails
    /// with [`DataError::Incomplete`] until it is re-imported, because its bar
    /// count no longer matches the metadata.
    fn load(&self, symbol: &str) -> Result<DailySeries, DataError> {
        if !self.symbol_dir(symbol).exists() {
            return Err(DataError::NoData {
                symbol: symbol.to_string(),
            });
        }

        let mut all_bars = Vec::new();
        for path in self.parquet_files(symbol)? {
            match load_and_validate_parquet(&path, symbol) {
                Ok(bars) => all_bars.extend(bars),
                Err(e) => {
                    let quarantine = path.with_extension("parquet.quarantined");
                    let _ = fs::rename(&path, &quarantine);
                    return Err(DataError::Quarantined {
                        path: path.display().to_string(),
                        reason: e.to_string(),
                    });
                }
            }
        }

        if all_bars.is_empty() {
            return Err(DataError::NoData {
                symbol: symbol.to_string(),
            });
        }

        if let Some(meta) = self.get_meta(symbol) {
            if meta.bar_count != all_bars.len() {
                return Err(DataError::Incomplete {
                    symbol: symbol.to_string(),
                    expected: meta.bar_count,
                    found: all_bars.len(),
                });
            }
        }

        all_bars.sort_by_key(|b| b.date);
        Ok(DailySeries::new(symbol, all_bars)?)
    }
}

/// BLAKE3 hash of the JSON encoding of a bar sequence.
pub fn hash_bars(bars: &[PriceBar]) -> Result<String, DataError> {
    let bytes =
        serde_json::to_vec(bars).map_err(|e| DataError::Io(format!("hash serialization: {e}")))?;
    Ok(blake3::hash(&bytes).to_hex().to_string())
}

fn year_of(path: &Path) -> Option<i32> {
    path.file_stem()?.to_str()?.parse().ok()
}

// ── Parquet I/O helpers ─────────────────────────────────────────────

fn epoch() -> NaiveDate {
    NaiveDate::default()
}

fn bars_to_dataframe(bars: &[&PriceBar]) -> Result<DataFrame, DataError> {
    let dates: Vec<i32> = bars
        .iter()
        .map(|b| (b.date - epoch()).num_days() as i32)
        .collect();
    let opens: Vec<f64> = bars.iter().map(|b| b.open).collect();
    let highs: Vec<f64> = bars.iter().map(|b| b.high).collect();
    let lows: Vec<f64> = bars.iter().map(|b| b.low).collect();
    let closes: Vec<f64> = bars.iter().map(|b| b.close).collect();
    let volumes: Vec<u64> = bars.iter().map(|b| b.volume).collect();

    DataFrame::new(vec![
        Column::new("date".into(), dates)
            .cast(&DataType::Date)
            .map_err(|e| DataError::Parquet(format!("date cast: {e}")))?,
        Column::new("open".into(), opens),
        Column::new("high".into(), highs),
        Column::new("low".into(), lows),
        Column::new("close".into(), closes),
        Column::new("volume".into(), volumes),
    ])
    .map_err(|e| DataError::Parquet(format!("dataframe creation: {e}")))
}

fn write_parquet(df: &mut DataFrame, path: &Path) -> Result<(), DataError> {
    let file =
        fs::File::create(path).map_err(|e| DataError::Parquet(format!("create file: {e}")))?;
    ParquetWriter::new(file)
        .finish(df)
        .map_err(|e| DataError::Parquet(format!("write parquet: {e}")))?;
    Ok(())
}

fn load_and_validate_parquet(path: &Path, symbol: &str) -> Result<Vec<PriceBar>, DataError> {
    let file = fs::File::open(path).map_err(|e| DataError::Parquet(format!("open: {e}")))?;
    let df = ParquetReader::new(file)
        .finish()
        .map_err(|e| DataError::Parquet(format!("read: {e}")))?;

    if df.height() == 0 {
        return Err(DataError::Validation("empty parquet file".into()));
    }

    for col_name in &EXPECTED_COLUMNS {
        if df.column(col_name).is_err() {
            return Err(DataError::Validation(format!("missing column '{col_name}'")));
        }
    }

    dataframe_to_bars(&df, symbol)
}

fn dataframe_to_bars(df: &DataFrame, symbol: &str) -> Result<Vec<PriceBar>, DataError> {
    let column = |name: &str| {
        df.column(name)
            .map_err(|e| DataError::Parquet(format!("column read: {e}")))
    };
    let type_err = |name: &str, e: PolarsError| DataError::Parquet(format!("{name} column type: {e}"));

    let date_ca = column("date")?.date().map_err(|e| type_err("date", e))?;
    let open_ca = column("open")?.f64().map_err(|e| type_err("open", e))?;
    let high_ca = column("high")?.f64().map_err(|e| type_err("high", e))?;
    let low_ca = column("low")?.f64().map_err(|e| type_err("low", e))?;
    let close_ca = column("close")?.f64().map_err(|e| type_err("close", e))?;
    let vol_ca = column("volume")?.u64().map_err(|e| type_err("volume", e))?;

    let n = df.height();
    let mut bars = Vec::with_capacity(n);

    for i in 0..n {
        let date_days = date_ca
            .get(i)
            .ok_or_else(|| DataError::Parquet(format!("null date at row {i}")))?;

        bars.push(PriceBar {
            symbol: symbol.to_string(),
            date: epoch() + chrono::Duration::days(date_days as i64),
            open: open_ca.get(i).unwrap_or(f64::NAN),
            high: high_ca.get(i).unwrap_or(f64::NAN),
            low: low_ca.get(i).unwrap_or(f64::NAN),
            close: close_ca.get(i).unwrap_or(f64::NAN),
            volume: vol_ca.get(i).unwrap_or(0),
        });
    }

    Ok(bars)
}
