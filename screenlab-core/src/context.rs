//! Explicit computation context.
//!
//! Everything the engine reads from outside a single series (the price source
//! and the options) is carried here and passed in. There is no global state, so
//! independent batches and tests can run concurrently against different
//! sources.

use crate::config::ComputeConfig;
use crate::data::PriceSource;
use std::sync::Arc;

#[derive(Clone)]
pub struct ComputationContext {
    pub prices: Arc<dyn PriceSource>,
    pub config: ComputeConfig,
}

impl ComputationContext {
    pub fn new(prices: Arc<dyn PriceSource>, config: ComputeConfig) -> Self {
        Self { prices, config }
    }
}

impl std::fmt::Debug for ComputationContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ComputationContext")
            .field("prices", &self.prices.name())
            .field("config", &self.config)
            .finish()
    }
}
