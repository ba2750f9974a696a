//! In-memory price source for tests, benchmarks and synthetic runs.

use super::provider::{DataError, PriceSource};
use crate::domain::{DailySeries, PriceBar};
use std::collections::BTreeMap;

#[derive(Debug, Clone, Default)]
pub struct InMemoryPrices {
    series: BTreeMap<String, Vec<PriceBar>>,
}

impl InMemoryPrices {
    pub fn new() -> Self {
        Self::default()
    }

    /// Group bars by symbol. Bars need not be sorted.
    pub fn from_bars(bars: impl IntoIterator<Item = PriceBar>) -> Self {
        let mut prices = Self::new();
        for bar in bars {
            prices.series.entry(bar.symbol.clone()).or_default().push(bar);
        }
        for bars in prices.series.values_mut() {
            bars.sort_by_key(|b| b.date);
        }
        prices
    }

    /// Replace the history of one symbol.
    pub fn insert(&mut self, symbol: impl Into<String>, mut bars: Vec<PriceBar>) {
        bars.sort_by_key(|b| b.date);
        self.series.insert(symbol.into(), bars);
    }

    pub fn len(&self) -> usize {
        self.series.len()
    }

    pub fn is_empty(&self) -> bool {
        self.series.is_empty()
    }
}

impl PriceSource for InMemoryPrices {
    fn name(&self) -> &str {
        "memory"
    }

    fn symbols(&self) -> Result<Vec<String>, DataError> {
        Ok(self.series.keys().cloned().collect())
    }

    fn load(&self, symbol: &str) -> Result<DailySeries, DataError> {
        let bars = self
            .series
            .get(symbol)
            .filter(|b| !b.is_empty())
            .ok_or_else(|| DataError::NoData {
                symbol: symbol.to_string(),
            })?;
        Ok(DailySeries::new(symbol, bars.clone())?)
    }
}
