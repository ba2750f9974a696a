//! Chunked persistence: splits the trading dates of a run into chunks and
//! commits each chunk with retry.

use chrono::NaiveDate;

use crate::retry::RetryPolicy;
use crate::store::{RowChunk, RowStore, StoreError};

/// Result of writing one chunk that did not abort the run.
#[derive(Debug)]
pub enum ChunkOutcome {
    Committed,
    /// Retries exhausted or a non-retryable row error; later chunks may still
    /// succeed.
    Failed(StoreError),
}

/// Split ascending dates into runs of at most `dates_per_chunk`.
pub fn plan_chunks(dates: &[NaiveDate], dates_per_chunk: usize) -> Vec<&[NaiveDate]> {
    dates.chunks(dates_per_chunk.max(1)).collect()
}

pub struct ChunkWriter<'a> {
    store: &'a dyn RowStore,
    retry: &'a RetryPolicy,
}

impl<'a> ChunkWriter<'a> {
    pub fn new(store: &'a dyn RowStore, retry: &'a RetryPolicy) -> Self {
        Self { store, retry }
    }

    /// Commit one chunk. `Err` means the store is gone and the run must stop.
    pub fn write(&self, chunk: &RowChunk) -> Result<ChunkOutcome, StoreError> {
        let label = match (chunk.first_date(), chunk.last_date()) {
            (Some(first), Some(last)) => format!("chunk {first}..{last}"),
            _ => "empty chunk".to_string(),
        };
        let result = self
            .retry
            .run(&label, StoreError::is_transient, || self.store.commit_chunk(chunk));
        match result {
            Ok(()) => Ok(ChunkOutcome::Committed),
            Err(e) if e.is_fatal() => Err(e),
            Err(e) => Ok(ChunkOutcome::Failed(e)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::checkpoint::Checkpoint;
    use crate::store::MemoryStore;
    use screenlab_core::domain::{IndicatorRow, RsRow};
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn dates(n: u32) -> Vec<NaiveDate> {
        (1..=n)
            .map(|d| NaiveDate::from_ymd_opt(2024, 3, d).unwrap())
            .collect()
    }

    /// Fails the first `failures` commits with the given error.
    struct Failing {
        inner: MemoryStore,
        failures: usize,
        calls: AtomicUsize,
        fatal: bool,
    }

    impl RowStore for Failing {
        fn name(&self) -> &str {
            "failing"
        }
        fn commit_chunk(&self, chunk: &RowChunk) -> Result<(), StoreError> {
            let n = self.calls.fetch_add(1, Ordering::SeqCst);
            if n < self.failures {
                return Err(if self.fatal {
                    StoreError::Unavailable("down".into())
                } else {
                    StoreError::Transient("busy".into())
                });
            }
            self.inner.commit_chunk(chunk)
        }
        fn load_checkpoint(&self) -> Result<Option<Checkpoint>, StoreError> {
            self.inner.load_checkpoint()
        }
        fn save_checkpoint(&self, c: &Checkpoint) -> Result<(), StoreError> {
            self.inner.save_checkpoint(c)
        }
        fn indicator_symbols(&self) -> Result<Vec<String>, StoreError> {
            self.inner.indicator_symbols()
        }
        fn indicator_rows(&self, s: &str) -> Result<Vec<IndicatorRow>, StoreError> {
            self.inner.indicator_rows(s)
        }
        fn rs_dates(&self) -> Result<Vec<NaiveDate>, StoreError> {
            self.inner.rs_dates()
        }
        fn rs_rows(&self, d: NaiveDate) -> Result<Vec<RsRow>, StoreError> {
            self.inner.rs_rows(d)
        }
    }

    fn failing(failures: usize, fatal: bool) -> Failing {
        Failing {
            inner: MemoryStore::new(),
            failures,
            calls: AtomicUsize::new(0),
            fatal,
        }
    }

    fn chunk() -> RowChunk {
        RowChunk {
            dates: dates(2),
            ..Default::default()
        }
    }

    #[test]
    fn chunks_cover_all_dates() {
        let all = dates(45);
        let chunks = plan_chunks(&all, 20);
        assert_eq!(chunks.iter().map(|c| c.len()).collect::<Vec<_>>(), vec![20, 20, 5]);
        assert!(plan_chunks(&[], 20).is_empty());
    }

    #[test]
    fn transient_failures_are_retried() {
        let store = failing(2, false);
        let retry = RetryPolicy::immediate(3);
        let outcome = ChunkWriter::new(&store, &retry).write(&chunk()).unwrap();
        assert!(matches!(outcome, ChunkOutcome::Committed));
        assert_eq!(store.calls.load(Ordering::SeqCst), 3);
    }

    #[test]
    fn exhausted_retries_fail_the_chunk_only() {
        let store = failing(10, false);
        let retry = RetryPolicy::immediate(2);
        let outcome = ChunkWriter::new(&store, &retry).write(&chunk()).unwrap();
        assert!(matches!(outcome, ChunkOutcome::Failed(StoreError::Transient(_))));
        assert_eq!(store.calls.load(Ordering::SeqCst), 3);
    }

    #[test]
    fn unavailable_store_aborts() {
        let store = failing(1, true);
        let retry = RetryPolicy::immediate(5);
        let err = ChunkWriter::new(&store, &retry).write(&chunk()).unwrap_err();
        assert!(err.is_fatal());
        assert_eq!(store.calls.load(Ordering::SeqCst), 1);
    }
}
