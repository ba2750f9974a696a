//! ScreenLab Runner: batch orchestration over `screenlab-core`.
//!
//! This crate provides:
//! - Parallel per-symbol computation with a ranking barrier per date
//! - Chunked, idempotent upserts into a row store
//! - Checkpointing and resume after interruption
//! - Retry with exponential backoff for transient storage failures
//! - CSV import into the price store and RS export
//! - Logging setup and deterministic synthetic price data

pub mod batch;
pub mod checkpoint;
pub mod config;
pub mod export;
pub mod import;
pub mod logging;
pub mod progress;
pub mod retry;
pub mod store;
pub mod synthetic;
pub mod writer;

pub use batch::{run_batch, BatchOptions, BatchReport, ChunkFailure, RunError, SkippedSymbol};
pub use checkpoint::{resume_from, Checkpoint, CheckpointTracker};
pub use config::RunnerConfig;
pub use export::{collect_rs_rows, export_rs_csv, rs_rows_csv};
pub use import::{import_csv, read_bars_csv, ImportError, ImportReport, SymbolImport};
pub use logging::{init_logging, LoggingConfig};
pub use progress::{log_progress, BatchProgress, Phase};
pub use retry::RetryPolicy;
pub use store::{JsonlStore, MemoryStore, RowChunk, RowStore, StoreError};
pub use synthetic::{synthetic_bars, synthetic_prices};
pub use writer::{plan_chunks, ChunkOutcome, ChunkWriter};

#[cfg(test)]
mod send_sync_checks {
    use super::*;

    fn assert_send<T: Send>() {}
    fn assert_sync<T: Sync>() {}

    #[test]
    fn stores_are_send_sync() {
        assert_send::<JsonlStore>();
        assert_sync::<JsonlStore>();
        assert_send::<MemoryStore>();
        assert_sync::<MemoryStore>();
    }

    #[test]
    fn reports_are_send_sync() {
        assert_send::<BatchReport>();
        assert_sync::<BatchReport>();
        assert_send::<BatchProgress>();
        assert_sync::<BatchProgress>();
        assert_send::<ImportReport>();
        assert_sync::<ImportReport>();
    }

    #[test]
    fn config_types_are_send_sync() {
        assert_send::<RunnerConfig>();
        assert_sync::<RunnerConfig>();
        assert_send::<BatchOptions>();
        assert_sync::<BatchOptions>();
        assert_send::<RetryPolicy>();
        assert_sync::<RetryPolicy>();
    }

    #[test]
    fn errors_are_send_sync() {
        assert_send::<RunError>();
        assert_sync::<RunError>();
        assert_send::<StoreError>();
        assert_sync::<StoreError>();
        assert_send::<ImportError>();
        assert_sync::<ImportError>();
    }
}
