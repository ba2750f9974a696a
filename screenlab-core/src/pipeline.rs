//! Per-symbol computation: daily frame → weekly frame → aligned rows.
//!
//! Two explicit passes. The daily series is computed in full, the weekly
//! series is derived from it as a pure function, and the two meet only in a
//! date-keyed join. Nothing here mutates the daily data while computing weekly
//! values.
//!
//! The cross-sectional step lives in [`crate::rank`]; this module only
//! prepares each symbol's trailing returns for it.

use crate::config::ComputeConfig;
use crate::context::ComputationContext;
use crate::data::DataError;
use crate::domain::{
    Computed, DailySeries, FrameConditions, IndicatorRow, RsRow, Timeframe, Warning,
};
use crate::rank::{period_returns, rank_date, PeriodReturns, RankEntry};
use crate::signals::{
    compute_frame, evaluate_frame, final_signal, gap_pct, score, trend_conditions, trend_screener,
    FrameInput,
};
use crate::timeframe::{align_closed_weeks, forward_fill, resample_weekly};
use chrono::NaiveDate;

/// Everything computed for one symbol over its full history.
#[derive(Debug, Clone)]
pub struct SymbolFrame {
    pub symbol: String,
    /// One row per daily bar, ascending by date.
    pub rows: Vec<IndicatorRow>,
    /// Trailing returns per daily bar, aligned with `rows`.
    pub returns: Vec<PeriodReturns>,
}

impl SymbolFrame {
    pub fn dates(&self) -> impl Iterator<Item = NaiveDate> + '_ {
        self.rows.iter().map(|r| r.date)
    }

    /// Returns on `date`, if the symbol traded that day.
    pub fn returns_on(&self, date: NaiveDate) -> Option<PeriodReturns> {
        self.rows
            .binary_search_by_key(&date, |r| r.date)
            .ok()
            .map(|i| self.returns[i])
    }
}

/// Load a symbol through the context's price source and compute it.
pub fn compute_for(
    ctx: &ComputationContext,
    symbol: &str,
) -> Result<Computed<SymbolFrame>, DataError> {
    let series = ctx.prices.load(symbol)?;
    Ok(compute_symbol(&series, &ctx.config))
}

/// Compute indicator rows and trailing returns for one symbol.
///
/// Void bars (a non-finite price) are reported and dropped, so every emitted
/// row has a real close.
pub fn compute_symbol(series: &DailySeries, config: &ComputeConfig) -> Computed<SymbolFrame> {
    let mut warnings = input_warnings(series);
    let cleaned;
    let series = if series.bars().iter().any(|b| b.is_void()) {
        cleaned = series.without_void_bars();
        &cleaned
    } else {
        series
    };

    // Daily pass
    let highs = series.highs();
    let lows = series.lows();
    let closes = series.closes();
    let daily = compute_frame(
        FrameInput {
            highs: &highs,
            lows: &lows,
            closes: &closes,
        },
        config.rsi_period,
        Timeframe::Daily,
    );
    warnings.extend(daily.warnings);
    let daily_values = daily.value;

    // Weekly pass, closed weeks only
    let weekly_series = resample_weekly(series, config.boundary());
    let closed_weeks = weekly_series.closed_bars();
    let (w_highs, w_lows, w_closes) = (
        weekly_series.highs(),
        weekly_series.lows(),
        weekly_series.closes(),
    );
    let weekly = compute_frame(
        FrameInput {
            highs: &w_highs,
            lows: &w_lows,
            closes: &w_closes,
        },
        config.rsi_period,
        Timeframe::Weekly,
    );
    if closed_weeks.is_empty() && !series.is_empty() {
        warnings.push(Warning::NoClosedWeek);
    }
    warnings.extend(weekly.warnings);
    let weekly_conditions: Vec<FrameConditions> = weekly
        .value
        .iter()
        .map(|v| evaluate_frame(v, Timeframe::Weekly))
        .collect();

    // Date-keyed join
    let dates = series.dates();
    let week_index = align_closed_weeks(&dates, closed_weeks);
    let aligned_values = forward_fill(&weekly.value, &week_index);
    let aligned_conditions = forward_fill(&weekly_conditions, &week_index);

    let gaps = gap_pct(&series.opens(), &closes);
    let is_etf_index = config.is_etf_index(series.symbol());

    let rows = series
        .bars()
        .iter()
        .enumerate()
        .map(|(i, bar)| {
            let daily_conditions = evaluate_frame(&daily_values[i], Timeframe::Daily);
            let weekly_conditions = aligned_conditions[i].unwrap_or_default();
            let trend = trend_conditions(
                &daily_values[i],
                is_etf_index,
                gaps[i],
                config.gap_threshold_pct,
            );
            IndicatorRow {
                symbol: series.symbol().to_string(),
                date: bar.date,
                close: bar.close,
                volume: bar.volume,
                gap_pct: gaps[i],
                is_etf_index,
                daily: daily_values[i].clone(),
                weekly: aligned_values[i].clone().unwrap_or_default(),
                weekly_as_of: week_index[i].map(|w| closed_weeks[w].close_date),
                trend_screener: trend_screener(&daily_conditions, &weekly_conditions, &trend),
                score: score(&daily_conditions, &weekly_conditions),
                final_signal: final_signal(&daily_conditions, &weekly_conditions),
                daily_conditions,
                weekly_conditions,
                trend,
            }
        })
        .collect();

    let returns = period_returns(&closes, &config.rs_lookback_days);

    Computed::with_warnings(
        SymbolFrame {
            symbol: series.symbol().to_string(),
            rows,
            returns,
        },
        warnings,
    )
}

fn input_warnings(series: &DailySeries) -> Vec<Warning> {
    let mut warnings: Vec<Warning> = series
        .bars()
        .iter()
        .filter(|b| !b.is_sane())
        .map(|b| Warning::InsaneBar { date: b.date })
        .collect();

    let closes = series.closes();
    if closes.len() > 1 && closes.iter().all(|&c| c == closes[0]) {
        warnings.push(Warning::FlatSeries { bars: closes.len() });
    }
    warnings
}

/// Participants of one date across all computed symbols.
pub fn rank_entries(frames: &[SymbolFrame], date: NaiveDate) -> Vec<RankEntry> {
    frames
        .iter()
        .filter_map(|f| {
            f.returns_on(date).map(|returns| RankEntry {
                symbol: f.symbol.clone(),
                returns,
            })
        })
        .collect()
}

/// Rank one date over every computed symbol.
pub fn rank_frames(frames: &[SymbolFrame], date: NaiveDate, config: &ComputeConfig) -> Vec<RsRow> {
    rank_date(date, &rank_entries(frames, date), &config.rs_period_weights)
}
