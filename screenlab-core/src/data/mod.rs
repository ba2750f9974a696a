//! Price sources: the Parquet price store and an in-memory table.

pub mod memory;
pub mod parquet;
pub mod provider;

pub use memory::InMemoryPrices;
pub use parquet::{hash_bars, ParquetPriceStore, PriceMeta, PriceStatus};
pub use provider::{DataError, PriceSource};
