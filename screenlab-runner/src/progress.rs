//! Progress updates emitted while a batch runs.

use chrono::NaiveDate;
use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Phase {
    Computing,
    Writing,
    Done,
}

/// Snapshot sent after each phase change and each chunk.
#[derive(Debug, Clone, Serialize)]
pub struct BatchProgress {
    pub phase: Phase,
    pub symbols_total: usize,
    pub symbols_computed: usize,
    pub chunks_total: usize,
    pub chunks_committed: usize,
    pub chunks_failed: usize,
    /// Last date of the most recently committed chunk.
    pub last_date: Option<NaiveDate>,
    pub rows_written: usize,
    pub elapsed_secs: f64,
}

impl BatchProgress {
    pub fn chunks_done(&self) -> usize {
        self.chunks_committed + self.chunks_failed
    }

    pub fn fraction(&self) -> f64 {
        if self.chunks_total == 0 {
            return if self.phase == Phase::Done { 1.0 } else { 0.0 };
        }
        self.chunks_done() as f64 / self.chunks_total as f64
    }
}

/// Progress callback that logs each update.
pub fn log_progress(p: &BatchProgress) {
    match p.phase {
        Phase::Computing => tracing::info!(
            symbols = p.symbols_computed,
            total = p.symbols_total,
            "computing symbols"
        ),
        Phase::Writing => tracing::info!(
            chunk = p.chunks_done(),
            total = p.chunks_total,
            failed = p.chunks_failed,
            last_date = ?p.last_date,
            rows = p.rows_written,
            "{:.0}% written",
            p.fraction() * 100.0
        ),
        Phase::Done => tracing::info!(
            committed = p.chunks_committed,
            failed = p.chunks_failed,
            rows = p.rows_written,
            elapsed_secs = p.elapsed_secs,
            "batch finished"
        ),
    }
}
