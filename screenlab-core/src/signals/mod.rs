//! Composite signal builder: The Number, STAMP/CFG, screener and trend gates.

pub mod frame;
pub mod screener;
pub mod stamp;
pub mod the_number;
pub mod trend;

pub use frame::{compute_frame, FrameInput};
pub use screener::{evaluate_frame, final_signal, score, stamp_holds, trend_screener};
pub use stamp::{stamp, stamp_a, StampSeries};
pub use the_number::{the_number, TheNumber};
pub use trend::{gap_pct, trend_conditions};
