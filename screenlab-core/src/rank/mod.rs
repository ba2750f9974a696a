//! Cross-sectional relative strength: trailing returns, per-period percentile
//! ratings and the weighted composite rating.
//!
//! Ranking a date is a barrier over the whole universe: every symbol's returns
//! for that date must exist before any rating can be assigned.

pub mod percentile;
pub mod rating;
pub mod returns;

pub use percentile::{average_ranks, percentile_ratings, rating_from_rank};
pub use rating::{rank_date, rs_raw, rs_rating, RankEntry};
pub use returns::{period_returns, trailing_return, PeriodReturns, PERIOD_COUNT};
