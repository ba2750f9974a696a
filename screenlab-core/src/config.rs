//! Computation options for indicators, screeners and RS ratings.
//!
//! Stored as TOML. Every field has a default, so an empty document is a valid
//! configuration and partial files only override what they name.

use chrono::Weekday;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::path::Path;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("read config file {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("parse config TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("invalid config: {0}")]
    Invalid(String),
}

/// Weights of the four RS periods; renormalized over the periods available.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PeriodWeights {
    pub m3: f64,
    pub m6: f64,
    pub m9: f64,
    pub m12: f64,
}

impl Default for PeriodWeights {
    fn default() -> Self {
        Self {
            m3: 0.40,
            m6: 0.20,
            m9: 0.20,
            m12: 0.20,
        }
    }
}

impl PeriodWeights {
    /// Weights in period order (3m, 6m, 9m, 12m).
    pub fn as_array(&self) -> [f64; 4] {
        [self.m3, self.m6, self.m9, self.m12]
    }
}

/// First and last trading weekday of a week bucket.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WeeklyBoundary {
    pub start: Weekday,
    pub close: Weekday,
}

impl Default for WeeklyBoundary {
    fn default() -> Self {
        Self {
            start: Weekday::Sun,
            close: Weekday::Thu,
        }
    }
}

impl WeeklyBoundary {
    /// Parse a boundary written as `"Sun-Thu"`.
    pub fn parse(s: &str) -> Result<Self, ConfigError> {
        let (start, close) = s
            .split_once('-')
            .ok_or_else(|| ConfigError::Invalid(format!("weekly boundary '{s}' is not 'Start-Close'")))?;
        let day = |d: &str| {
            d.trim()
                .parse::<Weekday>()
                .map_err(|_| ConfigError::Invalid(format!("unknown weekday '{d}' in weekly boundary")))
        };
        let boundary = Self {
            start: day(start)?,
            close: day(close)?,
        };
        if boundary.start == boundary.close {
            return Err(ConfigError::Invalid(format!(
                "weekly boundary '{s}' starts and closes on the same day"
            )));
        }
        Ok(boundary)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ComputeConfig {
    pub rsi_period: usize,
    /// Week bucket as `"Start-Close"` weekday abbreviations.
    pub weekly_boundary: String,
    pub rs_period_weights: PeriodWeights,
    /// Trading-day offsets for the 3m/6m/9m/12m returns.
    pub rs_lookback_days: [usize; 4],
    /// Largest tolerated `|open - prev_close| / prev_close`.
    pub gap_threshold_pct: f64,
    pub etf_index_symbols: BTreeSet<String>,
    /// Symbols starting with any of these are treated as ETF/index.
    pub etf_index_prefixes: Vec<String>,
}

impl Default for ComputeConfig {
    fn default() -> Self {
        Self {
            rsi_period: 14,
            weekly_boundary: "Sun-Thu".to_string(),
            rs_period_weights: PeriodWeights::default(),
            rs_lookback_days: [63, 126, 189, 252],
            gap_threshold_pct: 0.03,
            etf_index_symbols: BTreeSet::new(),
            etf_index_prefixes: vec!["^".to_string()],
        }
    }
}

impl ComputeConfig {
    /// Load a configuration from a TOML file.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_toml(&content)
    }

    /// Parse and validate a configuration from a TOML string.
    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.rsi_period == 0 {
            return Err(ConfigError::Invalid("rsi_period must be >= 1".into()));
        }
        if self.rs_lookback_days.iter().any(|&d| d == 0) {
            return Err(ConfigError::Invalid("rs_lookback_days must all be >= 1".into()));
        }
        let weights = self.rs_period_weights.as_array();
        if weights.iter().any(|w| !w.is_finite() || *w < 0.0) {
            return Err(ConfigError::Invalid(
                "rs_period_weights must be finite and non-negative".into(),
            ));
        }
        if weights.iter().sum::<f64>() <= 0.0 {
            return Err(ConfigError::Invalid("rs_period_weights must not sum to 0".into()));
        }
        if !self.gap_threshold_pct.is_finite() || self.gap_threshold_pct < 0.0 {
            return Err(ConfigError::Invalid(
                "gap_threshold_pct must be finite and non-negative".into(),
            ));
        }
        WeeklyBoundary::parse(&self.weekly_boundary)?;
        Ok(())
    }

    /// The parsed week boundary; falls back to Sun-Thu if the string is invalid.
    ///
    /// `validate` rejects invalid boundaries, so the fallback only applies to
    /// configs constructed in code without validation.
    pub fn boundary(&self) -> WeeklyBoundary {
        WeeklyBoundary::parse(&self.weekly_boundary).unwrap_or_default()
    }

    /// ETF/index heuristic: explicit list first, then symbol prefixes.
    pub fn is_etf_index(&self, symbol: &str) -> bool {
        self.etf_index_symbols.contains(symbol)
            || self
                .etf_index_prefixes
                .iter()
                .any(|p| !p.is_empty() && symbol.starts_with(p.as_str()))
    }
}
