//! Structured computation results.
//!
//! The engine never logs. Conditions worth surfacing (short history, degenerate
//! prices) travel next to the value and the caller decides where they go.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;

/// A non-fatal diagnostic produced while computing a symbol.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Warning {
    /// Fewer bars than an indicator needs; its fields stay `None`.
    InsufficientHistory {
        timeframe: Timeframe,
        bars: usize,
        required: usize,
        indicator: String,
    },
    /// Every close in the series is identical.
    FlatSeries { bars: usize },
    /// A bar failed the OHLC sanity check. Void bars are dropped, the rest kept.
    InsaneBar { date: NaiveDate },
    /// No closed week exists yet, so weekly fields are `None`.
    NoClosedWeek,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Timeframe {
    Daily,
    Weekly,
}

impl fmt::Display for Timeframe {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Timeframe::Daily => write!(f, "daily"),
            Timeframe::Weekly => write!(f, "weekly"),
        }
    }
}

impl fmt::Display for Warning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Warning::InsufficientHistory {
                timeframe,
                bars,
                required,
                indicator,
            } => write!(
                f,
                "insufficient {timeframe} history for {indicator}: {bars} bars, {required} required"
            ),
            Warning::FlatSeries { bars } => write!(f, "flat close series over {bars} bars"),
            Warning::InsaneBar { date } => write!(f, "OHLC sanity check failed on {date}"),
            Warning::NoClosedWeek => write!(f, "no closed week yet"),
        }
    }
}

/// A computed value together with the warnings raised while producing it.
#[derive(Debug, Clone)]
pub struct Computed<T> {
    pub value: T,
    pub warnings: Vec<Warning>,
}

impl<T> Computed<T> {
    pub fn new(value: T) -> Self {
        Self {
            value,
            warnings: Vec::new(),
        }
    }

    pub fn with_warnings(value: T, warnings: Vec<Warning>) -> Self {
        Self { value, warnings }
    }

    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> Computed<U> {
        Computed {
            value: f(self.value),
            warnings: self.warnings,
        }
    }

    pub fn has_warnings(&self) -> bool {
        !self.warnings.is_empty()
    }
}
