//! ScreenLab CLI: batch computation, price import and store inspection.
//!
//! Commands:
//! - `compute`: compute indicator and RS rows for a date range, resuming from
//!   the checkpoint
//! - `import`: load daily bars from CSV into the Parquet price store
//! - `status`: price store coverage, checkpoint and row counts
//! - `export-rs`: write stored RS rows of a date range to CSV
//! - `digest`: BLAKE3 digest of every stored row

use anyhow::{bail, Context, Result};
use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use screenlab_core::context::ComputationContext;
use screenlab_core::data::{ParquetPriceStore, PriceSource};
use screenlab_runner::{
    export_rs_csv, import_csv, init_logging, log_progress, run_batch, synthetic_prices,
    BatchOptions, BatchProgress, BatchReport, JsonlStore, LoggingConfig, RowStore, RunnerConfig,
};

/// Symbols used by `--synthetic` when none are given.
const DEMO_SYMBOLS: [&str; 6] = ["1010", "1120", "1180", "2010", "2222", "7010"];

/// Last synthetic session when `--end` is not given.
const SYNTHETIC_END: (i32, u32, u32) = (2024, 12, 31);

/// Calendar days of synthetic history generated before the last session.
const SYNTHETIC_DAYS: i64 = 1200;

#[derive(Parser)]
#[command(
    name = "screenlab",
    about = "ScreenLab CLI: daily/weekly screeners and relative strength ratings"
)]
struct Cli {
    /// Debug logging (overridden by RUST_LOG).
    #[arg(long, short, global = true, default_value_t = false)]
    verbose: bool,

    /// Runner config (TOML). Defaults apply when omitted.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Compute indicator and RS rows and upsert them into the row store.
    Compute {
        /// First date to write (YYYY-MM-DD). Defaults to the day after the checkpoint.
        #[arg(long)]
        start: Option<String>,

        /// Last date to write (YYYY-MM-DD). Defaults to the latest bar.
        #[arg(long)]
        end: Option<String>,

        /// Ignore the checkpoint and rewrite the whole range.
        #[arg(long, default_value_t = false)]
        full: bool,

        /// Restrict the universe (comma separated). Defaults to every stored symbol.
        #[arg(long, value_delimiter = ',')]
        symbols: Vec<String>,

        /// Use deterministic synthetic prices instead of the price store.
        #[arg(long, default_value_t = false)]
        synthetic: bool,

        /// Worker threads for the per-symbol fan-out.
        #[arg(long)]
        threads: Option<usize>,

        /// Stop after this many chunks; the next run resumes from the checkpoint.
        #[arg(long)]
        max_chunks: Option<usize>,
    },
    /// Import daily bars from a CSV file into the price store.
    Import {
        /// CSV with columns symbol,date,open,high,low,close,volume.
        file: PathBuf,

        /// Merge into stored history instead of replacing it.
        #[arg(long, default_value_t = false)]
        merge: bool,
    },
    /// Report price store coverage, checkpoint and row counts.
    Status,
    /// Export stored RS rows to CSV.
    ExportRs {
        /// Output CSV path.
        #[arg(long, default_value = "rs.csv")]
        out: PathBuf,

        /// First date (YYYY-MM-DD).
        #[arg(long)]
        start: Option<String>,

        /// Last date (YYYY-MM-DD).
        #[arg(long)]
        end: Option<String>,
    },
    /// Print the BLAKE3 digest of all stored rows.
    Digest,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(LoggingConfig::from_env().verbose(cli.verbose))?;

    let config = match &cli.config {
        Some(path) => RunnerConfig::from_file(path)
            .with_context(|| format!("failed to load config {}", path.display()))?,
        None => RunnerConfig::default(),
    };

    match cli.command {
        Commands::Compute {
            start,
            end,
            full,
            symbols,
            synthetic,
            threads,
            max_chunks,
        } => run_compute(
            &config, start, end, full, symbols, synthetic, threads, max_chunks,
        ),
        Commands::Import { file, merge } => run_import(&config, &file, merge),
        Commands::Status => run_status(&config),
        Commands::ExportRs { out, start, end } => run_export(&config, &out, start, end),
        Commands::Digest => run_digest(&config),
    }
}

fn parse_date(value: Option<&str>, flag: &str) -> Result<Option<NaiveDate>> {
    value
        .map(|s| {
            NaiveDate::parse_from_str(s, "%Y-%m-%d")
                .with_context(|| format!("--{flag} expects YYYY-MM-DD, got '{s}'"))
        })
        .transpose()
}

/// Synthetic history window. It depends on `end` alone so every run over the
/// same end date sees the same walk.
fn synthetic_window(end: Option<NaiveDate>) -> Result<(NaiveDate, NaiveDate)> {
    let last = match end {
        Some(end) => end,
        None => {
            let (y, m, d) = SYNTHETIC_END;
            NaiveDate::from_ymd_opt(y, m, d).context("invalid synthetic end date")?
        }
    };
    Ok((last - chrono::Duration::days(SYNTHETIC_DAYS), last))
}

#[allow(clippy::too_many_arguments)]
fn run_compute(
    config: &RunnerConfig,
    start: Option<String>,
    end: Option<String>,
    full: bool,
    symbols: Vec<String>,
    synthetic: bool,
    threads: Option<usize>,
    max_chunks: Option<usize>,
) -> Result<()> {
    let start = parse_date(start.as_deref(), "start")?;
    let end = parse_date(end.as_deref(), "end")?;
    if threads == Some(0) {
        bail!("--threads must be at least 1");
    }

    let prices: Arc<dyn PriceSource> = if synthetic {
        let names: Vec<&str> = if symbols.is_empty() {
            DEMO_SYMBOLS.to_vec()
        } else {
            symbols.iter().map(String::as_str).collect()
        };
        let (first, last) = synthetic_window(end)?;
        if start.is_some_and(|s| s < first + chrono::Duration::days(400)) {
            tracing::warn!(%first, "--start leaves under a year of synthetic history");
        }
        tracing::warn!(symbols = names.len(), %first, %last, "using SYNTHETIC prices");
        Arc::new(synthetic_prices(&names, first, last))
    } else {
        Arc::new(ParquetPriceStore::new(&config.price_dir))
    };
    let ctx = ComputationContext::new(prices, config.compute.clone());
    let store = JsonlStore::open(&config.output_dir)
        .with_context(|| format!("failed to open row store {}", config.output_dir.display()))?;

    let mut options = BatchOptions::from_config(config);
    options.start = start;
    options.end = end;
    options.full = full;
    options.symbols = (!symbols.is_empty()).then_some(symbols);
    if threads.is_some() {
        options.threads = threads;
    }

    let stop = AtomicBool::new(false);
    let on_progress = |p: &BatchProgress| {
        log_progress(p);
        if max_chunks.is_some_and(|max| p.chunks_done() >= max) {
            stop.store(true, Ordering::Relaxed);
        }
    };

    let report = run_batch(&ctx, &store, &options, Some(&on_progress), Some(&stop))?;
    print_report(&report);

    if !report.chunks_failed.is_empty() {
        std::process::exit(1);
    }
    Ok(())
}

fn run_import(config: &RunnerConfig, file: &Path, merge: bool) -> Result<()> {
    let store = ParquetPriceStore::new(&config.price_dir);
    let report = import_csv(file, &store, merge)
        .with_context(|| format!("failed to import {}", file.display()))?;

    println!(
        "Imported {} rows for {} symbol(s) into {}",
        report.rows_read,
        report.symbols.len(),
        config.price_dir.display()
    );
    println!("{:<10} {:<25} {:>8}", "Symbol", "Date Range", "Bars");
    println!("{}", "-".repeat(45));
    for s in &report.symbols {
        println!(
            "{:<10} {:<25} {:>8}",
            s.symbol,
            format!("{} to {}", s.start, s.end),
            s.bars
        );
    }
    Ok(())
}

fn run_status(config: &RunnerConfig) -> Result<()> {
    let prices = ParquetPriceStore::new(&config.price_dir);
    let symbols = prices.symbols()?;
    println!("Price store: {}", config.price_dir.display());
    if symbols.is_empty() {
        println!("  (empty)");
    } else {
        let names: Vec<&str> = symbols.iter().map(String::as_str).collect();
        println!("{:<10} {:<25} {:>8}", "Symbol", "Date Range", "Bars");
        println!("{}", "-".repeat(45));
        for s in prices.status(&names) {
            let range = match (s.start_date, s.end_date) {
                (Some(a), Some(b)) => format!("{a} to {b}"),
                _ => "(no meta)".to_string(),
            };
            let bars = s.bar_count.map(|n| n.to_string()).unwrap_or_else(|| "-".into());
            println!("{:<10} {:<25} {:>8}", s.symbol, range, bars);
        }
    }

    println!();
    if !config.output_dir.exists() {
        println!("Row store does not exist: {}", config.output_dir.display());
        return Ok(());
    }
    let store = JsonlStore::open(&config.output_dir)?;
    let (indicators, rs) = store.row_counts()?;
    println!("Row store:  {}", config.output_dir.display());
    match store.load_checkpoint()? {
        Some(c) => println!(
            "Checkpoint: {} (updated {})",
            c.last_computed_date, c.updated_at
        ),
        None => println!("Checkpoint: none"),
    }
    println!("Indicator rows: {indicators}");
    println!("RS rows:        {rs}");
    let dates = store.rs_dates()?;
    if let (Some(first), Some(last)) = (dates.first(), dates.last()) {
        println!("RS dates:       {} ({first} to {last})", dates.len());
    }
    Ok(())
}

fn run_export(
    config: &RunnerConfig,
    out: &Path,
    start: Option<String>,
    end: Option<String>,
) -> Result<()> {
    let start = parse_date(start.as_deref(), "start")?;
    let end = parse_date(end.as_deref(), "end")?;
    let store = JsonlStore::open(&config.output_dir)?;
    let n = export_rs_csv(&store, out, start, end)?;
    println!("Wrote {n} RS rows to {}", out.display());
    Ok(())
}

fn run_digest(config: &RunnerConfig) -> Result<()> {
    let store = JsonlStore::open(&config.output_dir)?;
    println!("{}", store.digest()?);
    Ok(())
}

fn print_report(report: &BatchReport) {
    println!();
    println!("=== Batch Result ===");
    match (report.first_date, report.last_date) {
        (Some(first), Some(last)) => {
            println!("Period:         {first} to {last} ({} dates)", report.dates)
        }
        _ => println!("Period:         nothing to compute"),
    }
    println!("Symbols:        {}", report.symbols_computed);
    println!("Warnings:       {}", report.warnings);
    println!("Indicator rows: {}", report.indicator_rows);
    println!("RS rows:        {}", report.rs_rows);
    println!(
        "Chunks:         {} committed, {} failed",
        report.chunks_committed,
        report.chunks_failed.len()
    );
    match report.checkpoint {
        Some(date) => println!("Checkpoint:     {date}"),
        None => println!("Checkpoint:     none"),
    }
    println!("Elapsed:        {:.1}s", report.elapsed_secs);
    for s in &report.skipped {
        println!("SKIPPED: {} ({})", s.symbol, s.reason);
    }
    for f in &report.chunks_failed {
        println!("FAILED:  {} to {}: {}", f.first_date, f.last_date, f.error);
    }
    if report.stopped {
        println!("Stopped early; rerun to resume from the checkpoint.");
    }
    println!();
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    #[test]
    fn synthetic_window_is_fixed_without_end() {
        let (first, last) = synthetic_window(None).unwrap();
        assert_eq!(last, d("2024-12-31"));
        assert_eq!((last - first).num_days(), SYNTHETIC_DAYS);
        assert_eq!(synthetic_window(None).unwrap(), (first, last));
    }

    #[test]
    fn synthetic_window_ends_at_requested_end() {
        let (first, last) = synthetic_window(Some(d("2023-06-30"))).unwrap();
        assert_eq!(last, d("2023-06-30"));
        assert_eq!(first, d("2023-06-30") - chrono::Duration::days(SYNTHETIC_DAYS));
    }
}
