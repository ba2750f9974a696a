//! ScreenLab Core: indicators, screeners, weekly alignment and RS ranking.
//!
//! This crate is the computation engine:
//! - Domain types (price bars, validated daily series, output rows)
//! - Smoothing and oscillator library over `Option<f64>` series
//! - Composite signals (The Number, STAMP/CFG, screener and trend gates)
//! - Weekly resampling and closed-week alignment onto daily rows
//! - Cross-sectional relative strength ranking
//! - Price sources (Parquet store, in-memory)
//!
//! Nothing in this crate logs. Diagnostics travel with results as
//! [`domain::Computed`] warnings.

pub mod config;
pub mod context;
pub mod data;
pub mod domain;
pub mod indicators;
pub mod pipeline;
pub mod rank;
pub mod signals;
pub mod timeframe;

pub use config::{ComputeConfig, ConfigError, PeriodWeights, WeeklyBoundary};
pub use context::ComputationContext;
pub use pipeline::{compute_for, compute_symbol, rank_entries, rank_frames, SymbolFrame};
