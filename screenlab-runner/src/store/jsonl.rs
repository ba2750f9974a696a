//! JSONL file store.
//!
//! Layout under the root directory:
//!
//! ```text
//! indicators/{SYMBOL}.jsonl   one IndicatorRow per line, ascending by date
//! rs/{YYYY-MM-DD}.jsonl       one RsRow per line, ascending by symbol
//! checkpoint.json
//! ```
//!
//! A commit merges the chunk into each touched file and rewrites it through a
//! temp file and rename, so a file is always either the old or the new
//! version.

use std::collections::{BTreeMap, BTreeSet};
use std::fs;
use std::io::{BufRead, BufReader, Write};
use std::path::{Path, PathBuf};

use chrono::NaiveDate;
use serde::de::DeserializeOwned;
use serde::Serialize;
use screenlab_core::domain::{IndicatorRow, RsRow};

use super::{RowChunk, RowStore, StoreError};
use crate::checkpoint::Checkpoint;

const INDICATOR_DIR: &str = "indicators";
const RS_DIR: &str = "rs";
const CHECKPOINT_FILE: &str = "checkpoint.json";
const EXTENSION: &str = "jsonl";

pub struct JsonlStore {
    root: PathBuf,
}

impl JsonlStore {
    /// Open (and create if needed) a store rooted at `root`.
    pub fn open(root: impl Into<PathBuf>) -> Result<Self, StoreError> {
        let root = root.into();
        for dir in [root.join(INDICATOR_DIR), root.join(RS_DIR)] {
            fs::create_dir_all(&dir).map_err(|e| match e.kind() {
                std::io::ErrorKind::PermissionDenied | std::io::ErrorKind::NotFound => {
                    StoreError::Unavailable(format!("{}: {e}", dir.display()))
                }
                _ => StoreError::io(&dir, e),
            })?;
        }
        Ok(Self { root })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn indicator_path(&self, symbol: &str) -> PathBuf {
        self.root
            .join(INDICATOR_DIR)
            .join(format!("{symbol}.{EXTENSION}"))
    }

    fn rs_path(&self, date: NaiveDate) -> PathBuf {
        self.root.join(RS_DIR).join(format!("{date}.{EXTENSION}"))
    }

    fn checkpoint_path(&self) -> PathBuf {
        self.root.join(CHECKPOINT_FILE)
    }

    /// File stems in a subdirectory, ascending.
    fn stems(&self, dir: &str) -> Result<Vec<String>, StoreError> {
        let dir = self.root.join(dir);
        let entries = match fs::read_dir(&dir) {
            Ok(entries) => entries,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(StoreError::io(&dir, e)),
        };
        let mut stems = BTreeSet::new();
        for entry in entries {
            let path = entry.map_err(|e| StoreError::io(&dir, e))?.path();
            if path.extension().is_some_and(|ext| ext == EXTENSION) {
                if let Some(stem) = path.file_stem().and_then(|s| s.to_str()) {
                    stems.insert(stem.to_string());
                }
            }
        }
        Ok(stems.into_iter().collect())
    }
}

fn read_lines<T: DeserializeOwned>(path: &Path) -> Result<Vec<T>, StoreError> {
    let file = match fs::File::open(path) {
        Ok(f) => f,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
        Err(e) => return Err(StoreError::io(path, e)),
    };
    let mut rows = Vec::new();
    for (i, line) in BufReader::new(file).lines().enumerate() {
        let line = line.map_err(|e| StoreError::io(path, e))?;
        if line.trim().is_empty() {
            continue;
        }
        let row = serde_json::from_str(&line).map_err(|e| StoreError::Corrupt {
            path: path.display().to_string(),
            line: i + 1,
            reason: e.to_string(),
        })?;
        rows.push(row);
    }
    Ok(rows)
}

fn write_atomic(path: &Path, content: &[u8]) -> Result<(), StoreError> {
    let tmp = path.with_extension(format!("{EXTENSION}.tmp"));
    let write = || -> std::io::Result<()> {
        let mut file = fs::File::create(&tmp)?;
        file.write_all(content)?;
        file.sync_all()
    };
    write().map_err(|e| StoreError::io(&tmp, e))?;
    fs::rename(&tmp, path).map_err(|e| {
        let _ = fs::remove_file(&tmp);
        StoreError::io(path, e)
    })
}

fn write_lines<'a, T: Serialize + 'a>(
    path: &Path,
    rows: impl IntoIterator<Item = &'a T>,
) -> Result<(), StoreError> {
    let mut buf = Vec::new();
    for row in rows {
        serde_json::to_writer(&mut buf, row)?;
        buf.push(b'\n');
    }
    write_atomic(path, &buf)
}

impl RowStore for JsonlStore {
    fn name(&self) -> &str {
        "jsonl"
    }

    fn commit_chunk(&self, chunk: &RowChunk) -> Result<(), StoreError> {
        let mut by_symbol: BTreeMap<&str, Vec<&IndicatorRow>> = BTreeMap::new();
        for row in &chunk.indicators {
            by_symbol.entry(row.symbol.as_str()).or_default().push(row);
        }
        for (symbol, rows) in by_symbol {
            let path = self.indicator_path(symbol);
            let mut merged: BTreeMap<NaiveDate, IndicatorRow> = read_lines::<IndicatorRow>(&path)?
                .into_iter()
                .map(|r| (r.date, r))
                .collect();
            for row in rows {
                merged.insert(row.date, row.clone());
            }
            write_lines(&path, merged.values())?;
        }

        let mut by_date: BTreeMap<NaiveDate, Vec<&RsRow>> = BTreeMap::new();
        for row in &chunk.rs {
            by_date.entry(row.date).or_default().push(row);
        }
        for (date, rows) in by_date {
            let path = self.rs_path(date);
            let mut merged: BTreeMap<String, RsRow> = read_lines::<RsRow>(&path)?
                .into_iter()
                .map(|r| (r.symbol.clone(), r))
                .collect();
            for row in rows {
                merged.insert(row.symbol.clone(), row.clone());
            }
            write_lines(&path, merged.values())?;
        }
        Ok(())
    }

    fn load_checkpoint(&self) -> Result<Option<Checkpoint>, StoreError> {
        let path = self.checkpoint_path();
        match fs::read_to_string(&path) {
            Ok(content) => Ok(Some(serde_json::from_str(&content)?)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(StoreError::io(&path, e)),
        }
    }

    fn save_checkpoint(&self, checkpoint: &Checkpoint) -> Result<(), StoreError> {
        let json = serde_json::to_vec_pretty(checkpoint)?;
        write_atomic(&self.checkpoint_path(), &json)
    }

    fn indicator_symbols(&self) -> Result<Vec<String>, StoreError> {
        self.stems(INDICATOR_DIR)
    }

    fn indicator_rows(&self, symbol: &str) -> Result<Vec<IndicatorRow>, StoreError> {
        read_lines(&self.indicator_path(symbol))
    }

    fn rs_dates(&self) -> Result<Vec<NaiveDate>, StoreError> {
        Ok(self
            .stems(RS_DIR)?
            .iter()
            .filter_map(|s| NaiveDate::parse_from_str(s, "%Y-%m-%d").ok())
            .collect())
    }

    fn rs_rows(&self, date: NaiveDate) -> Result<Vec<RsRow>, StoreError> {
        read_lines(&self.rs_path(date))
    }
}
