//! Batch orchestrator.
//!
//! 1. Resolve the date range from the request and the stored checkpoint.
//! 2. Compute every symbol's full history on a rayon pool (no shared state).
//! 3. Barrier: ranking needs all symbol frames, so it only starts once the
//!    fan-out has finished.
//! 4. Walk the trading dates in chunks. Each chunk gets its indicator rows and
//!    the RS rows of its dates, is committed with retry, and moves the
//!    checkpoint if every earlier chunk committed too and the run picked up
//!    right after the stored checkpoint. A failed chunk at or before the
//!    stored checkpoint pulls it back in front of the chunk.
//!
//! Invalid symbols are skipped with a warning. Only an unreachable store or a
//! failed checkpoint write aborts the run.

use std::collections::BTreeSet;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Instant;

use chrono::NaiveDate;
use rayon::prelude::*;
use serde::Serialize;
use thiserror::Error;

use screenlab_core::context::ComputationContext;
use screenlab_core::data::DataError;
use screenlab_core::domain::{IndicatorRow, RsRow};
use screenlab_core::pipeline::{compute_for, rank_frames, SymbolFrame};

use crate::checkpoint::{resume_from, Checkpoint, CheckpointTracker};
use crate::config::RunnerConfig;
use crate::progress::{BatchProgress, Phase};
use crate::retry::RetryPolicy;
use crate::store::{RowChunk, RowStore, StoreError};
use crate::writer::{plan_chunks, ChunkOutcome, ChunkWriter};

#[derive(Debug, Error)]
pub enum RunError {
    #[error("invalid date range: start {start} is after end {end}")]
    InvalidRange { start: NaiveDate, end: NaiveDate },

    #[error("list symbols from price source: {0}")]
    Symbols(#[source] DataError),

    #[error("build worker pool: {0}")]
    ThreadPool(String),

    #[error("row store unavailable: {0}")]
    StoreUnavailable(#[source] StoreError),

    #[error("checkpoint: {0}")]
    Checkpoint(#[source] StoreError),
}

/// What to compute and how to write it.
#[derive(Debug, Clone)]
pub struct BatchOptions {
    /// First date to write (inclusive). Combined with the checkpoint unless
    /// `full` is set.
    pub start: Option<NaiveDate>,
    /// Last date to write (inclusive).
    pub end: Option<NaiveDate>,
    /// Ignore the checkpoint and rewrite the whole range.
    pub full: bool,
    /// Restrict the universe; `None` = every symbol of the price source.
    pub symbols: Option<Vec<String>>,
    pub dates_per_chunk: usize,
    pub threads: Option<usize>,
    pub retry: RetryPolicy,
}

impl Default for BatchOptions {
    fn default() -> Self {
        Self {
            start: None,
            end: None,
            full: false,
            symbols: None,
            dates_per_chunk: 20,
            threads: None,
            retry: RetryPolicy::default(),
        }
    }
}

impl BatchOptions {
    pub fn from_config(config: &RunnerConfig) -> Self {
        Self {
            dates_per_chunk: config.dates_per_chunk,
            threads: config.threads,
            retry: config.retry.clone(),
            ..Default::default()
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct SkippedSymbol {
    pub symbol: String,
    pub reason: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct ChunkFailure {
    pub first_date: NaiveDate,
    pub last_date: NaiveDate,
    pub error: String,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct BatchReport {
    pub symbols_computed: usize,
    pub skipped: Vec<SkippedSymbol>,
    /// Computation warnings across all symbols.
    pub warnings: usize,
    /// Trading dates in the resolved range.
    pub dates: usize,
    pub first_date: Option<NaiveDate>,
    pub last_date: Option<NaiveDate>,
    pub indicator_rows: usize,
    pub rs_rows: usize,
    pub chunks_committed: usize,
    pub chunks_failed: Vec<ChunkFailure>,
    /// Checkpoint after the run.
    pub checkpoint: Option<NaiveDate>,
    /// The stop flag was raised before every chunk was issued.
    pub stopped: bool,
    pub elapsed_secs: f64,
}

impl BatchReport {
    pub fn is_complete(&self) -> bool {
        !self.stopped && self.chunks_failed.is_empty()
    }
}

/// Run one batch.
///
/// # Arguments
/// - `ctx`: price source and computation options.
/// - `store`: where rows and the checkpoint go.
/// - `options`: date range, universe, chunking and retry.
/// - `progress_cb`: optional callback after each phase and chunk.
/// - `stop`: optional flag; once set, no new chunk is issued.
pub fn run_batch(
    ctx: &ComputationContext,
    store: &dyn RowStore,
    options: &BatchOptions,
    progress_cb: Option<&dyn Fn(&BatchProgress)>,
    stop: Option<&AtomicBool>,
) -> Result<BatchReport, RunError> {
    let started = Instant::now();
    if let (Some(start), Some(end)) = (options.start, options.end) {
        if start > end {
            return Err(RunError::InvalidRange { start, end });
        }
    }

    let checkpoint = store.load_checkpoint().map_err(RunError::Checkpoint)?;
    let start = resume_from(checkpoint.as_ref(), options.start, options.full);
    tracing::info!(
        store = store.name(),
        source = ctx.prices.name(),
        checkpoint = ?checkpoint.as_ref().map(|c| c.last_computed_date),
        start = ?start,
        end = ?options.end,
        full = options.full,
        "starting batch"
    );

    let symbols = match &options.symbols {
        Some(symbols) => symbols.clone(),
        None => ctx.prices.symbols().map_err(RunError::Symbols)?,
    };

    let pool = rayon::ThreadPoolBuilder::new()
        .num_threads(options.threads.unwrap_or(0))
        .build()
        .map_err(|e| RunError::ThreadPool(e.to_string()))?;

    let mut report = BatchReport::default();
    let mut progress = BatchProgress {
        phase: Phase::Computing,
        symbols_total: symbols.len(),
        symbols_computed: 0,
        chunks_total: 0,
        chunks_committed: 0,
        chunks_failed: 0,
        last_date: None,
        rows_written: 0,
        elapsed_secs: 0.0,
    };
    let emit = |p: &BatchProgress| {
        if let Some(cb) = progress_cb {
            cb(p);
        }
    };
    emit(&progress);

    // Fan-out
    let results: Vec<(String, Result<_, DataError>)> = pool.install(|| {
        symbols
            .par_iter()
            .map(|symbol| (symbol.clone(), compute_for(ctx, symbol)))
            .collect()
    });

    let mut frames: Vec<SymbolFrame> = Vec::with_capacity(results.len());
    for (symbol, result) in results {
        match result {
            Ok(computed) => {
                if computed.has_warnings() {
                    tracing::warn!(
                        %symbol,
                        count = computed.warnings.len(),
                        first = %computed.warnings[0],
                        "computed with warnings"
                    );
                    for w in &computed.warnings {
                        tracing::debug!(%symbol, warning = %w);
                    }
                }
                report.warnings += computed.warnings.len();
                frames.push(computed.value);
            }
            Err(e) => {
                tracing::warn!(%symbol, error = %e, "skipping symbol");
                report.skipped.push(SkippedSymbol {
                    symbol,
                    reason: e.to_string(),
                });
            }
        }
    }
    frames.sort_by(|a, b| a.symbol.cmp(&b.symbol));
    report.symbols_computed = frames.len();
    progress.symbols_computed = frames.len();
    tracing::info!(
        computed = frames.len(),
        skipped = report.skipped.len(),
        warnings = report.warnings,
        "symbols computed"
    );

    // Barrier passed: every frame exists from here on.
    let dates = trading_dates(&frames, start, options.end);
    report.dates = dates.len();
    report.first_date = dates.first().copied();
    report.last_date = dates.last().copied();

    let chunks = plan_chunks(&dates, options.dates_per_chunk);
    progress.phase = Phase::Writing;
    progress.chunks_total = chunks.len();
    emit(&progress);

    let writer = ChunkWriter::new(store, &options.retry);
    let stored = checkpoint.map(|c| c.last_computed_date);
    let follows_on = follows_checkpoint(&frames, stored, dates.first().copied());
    if !follows_on {
        tracing::warn!(
            checkpoint = ?stored,
            first = ?dates.first(),
            "range leaves dates after the checkpoint unwritten, checkpoint will not advance"
        );
    }
    let mut tracker = CheckpointTracker::new(stored, follows_on);

    for chunk_dates in chunks {
        if stop.is_some_and(|f| f.load(Ordering::Relaxed)) {
            tracing::info!("stop requested, no further chunks");
            report.stopped = true;
            break;
        }
        let (Some(&first), Some(&last)) = (chunk_dates.first(), chunk_dates.last()) else {
            continue;
        };

        let chunk = RowChunk {
            dates: chunk_dates.to_vec(),
            indicators: indicator_rows(&frames, first, last),
            rs: pool.install(|| rank_chunk(&frames, chunk_dates, ctx)),
        };

        match writer.write(&chunk).map_err(RunError::StoreUnavailable)? {
            ChunkOutcome::Committed => {
                report.chunks_committed += 1;
                report.indicator_rows += chunk.indicators.len();
                report.rs_rows += chunk.rs.len();
                progress.chunks_committed += 1;
                progress.rows_written += chunk.row_count();
                progress.last_date = Some(last);
                tracing::debug!(%first, %last, rows = chunk.row_count(), "chunk committed");

                if let Some(date) = tracker.committed(last) {
                    store
                        .save_checkpoint(&Checkpoint::at(date))
                        .map_err(RunError::Checkpoint)?;
                }
            }
            ChunkOutcome::Failed(e) => {
                tracing::warn!(%first, %last, error = %e, "chunk failed, checkpoint held");
                if let Some(date) = tracker.failed(first) {
                    tracing::warn!(checkpoint = %date, "checkpoint moved back before failed chunk");
                    store
                        .save_checkpoint(&Checkpoint::at(date))
                        .map_err(RunError::Checkpoint)?;
                }
                progress.chunks_failed += 1;
                report.chunks_failed.push(ChunkFailure {
                    first_date: first,
                    last_date: last,
                    error: e.to_string(),
                });
            }
        }
        progress.elapsed_secs = started.elapsed().as_secs_f64();
        emit(&progress);
    }

    report.checkpoint = tracker.position();
    report.elapsed_secs = started.elapsed().as_secs_f64();
    progress.phase = Phase::Done;
    progress.elapsed_secs = report.elapsed_secs;
    emit(&progress);
    Ok(report)
}

/// Union of all symbols' dates within `[start, end]`, ascending.
fn trading_dates(
    frames: &[SymbolFrame],
    start: Option<NaiveDate>,
    end: Option<NaiveDate>,
) -> Vec<NaiveDate> {
    let in_range = |d: &NaiveDate| start.map_or(true, |s| *d >= s) && end.map_or(true, |e| *d <= e);
    let dates: BTreeSet<NaiveDate> = frames
        .iter()
        .flat_map(|f| f.dates())
        .filter(in_range)
        .collect();
    dates.into_iter().collect()
}

/// True unless some symbol traded strictly between the checkpoint and the
/// run's first date, which this run would leave unwritten.
fn follows_checkpoint(
    frames: &[SymbolFrame],
    checkpoint: Option<NaiveDate>,
    first: Option<NaiveDate>,
) -> bool {
    match (checkpoint, first) {
        (Some(cp), Some(first)) => !frames
            .iter()
            .flat_map(|f| f.dates())
            .any(|d| d > cp && d < first),
        _ => true,
    }
}

/// Indicator rows of every symbol dated within `[first, last]`.
fn indicator_rows(frames: &[SymbolFrame], first: NaiveDate, last: NaiveDate) -> Vec<IndicatorRow> {
    frames
        .iter()
        .flat_map(|f| {
            let lo = f.rows.partition_point(|r| r.date < first);
            let hi = f.rows.partition_point(|r| r.date <= last);
            f.rows[lo..hi].iter().cloned()
        })
        .collect()
}

/// RS rows for each date of a chunk. Dates rank independently.
fn rank_chunk(frames: &[SymbolFrame], dates: &[NaiveDate], ctx: &ComputationContext) -> Vec<RsRow> {
    dates
        .par_iter()
        .map(|&date| rank_frames(frames, date, &ctx.config))
        .collect::<Vec<_>>()
        .into_iter()
        .flatten()
        .collect()
}
