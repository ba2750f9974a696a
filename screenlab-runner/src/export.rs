//! RS row export to CSV for external analysis tools.

use std::path::Path;

use anyhow::{Context, Result};
use chrono::NaiveDate;
use screenlab_core::domain::RsRow;

use crate::store::RowStore;

const HEADER: [&str; 12] = [
    "symbol",
    "date",
    "return_3m",
    "return_6m",
    "return_9m",
    "return_12m",
    "rank_3m",
    "rank_6m",
    "rank_9m",
    "rank_12m",
    "rs_raw",
    "rs_rating",
];

fn opt_f64(v: Option<f64>, precision: usize) -> String {
    v.map(|x| format!("{x:.precision$}")).unwrap_or_default()
}

fn opt_u8(v: Option<u8>) -> String {
    v.map(|x| x.to_string()).unwrap_or_default()
}

/// Render RS rows as CSV. Undefined values are empty cells.
pub fn rs_rows_csv(rows: &[RsRow]) -> Result<String> {
    let mut wtr = csv::Writer::from_writer(vec![]);
    wtr.write_record(HEADER)?;
    for r in rows {
        wtr.write_record([
            r.symbol.clone(),
            r.date.to_string(),
            opt_f64(r.return_3m, 6),
            opt_f64(r.return_6m, 6),
            opt_f64(r.return_9m, 6),
            opt_f64(r.return_12m, 6),
            opt_u8(r.rank_3m),
            opt_u8(r.rank_6m),
            opt_u8(r.rank_9m),
            opt_u8(r.rank_12m),
            opt_f64(r.rs_raw, 4),
            opt_u8(r.rs_rating),
        ])?;
    }
    let data = wtr.into_inner().context("failed to flush CSV writer")?;
    String::from_utf8(data).context("CSV output is not valid UTF-8")
}

/// Stored RS rows dated within `[start, end]`, by date then symbol.
pub fn collect_rs_rows(
    store: &dyn RowStore,
    start: Option<NaiveDate>,
    end: Option<NaiveDate>,
) -> Result<Vec<RsRow>> {
    let mut rows = Vec::new();
    for date in store.rs_dates()? {
        if start.is_some_and(|s| date < s) || end.is_some_and(|e| date > e) {
            continue;
        }
        rows.extend(
            store
                .rs_rows(date)
                .with_context(|| format!("failed to read RS rows for {date}"))?,
        );
    }
    Ok(rows)
}

/// Write the RS rows of a date range to `path`. Returns the row count.
pub fn export_rs_csv(
    store: &dyn RowStore,
    path: &Path,
    start: Option<NaiveDate>,
    end: Option<NaiveDate>,
) -> Result<usize> {
    let rows = collect_rs_rows(store, start, end)?;
    let csv = rs_rows_csv(&rows)?;
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("failed to create {}", parent.display()))?;
    }
    std::fs::write(path, csv).with_context(|| format!("failed to write {}", path.display()))?;
    Ok(rows.len())
}
