//! Resumable "last computed date" checkpoint.
//!
//! The checkpoint only ever covers a contiguous prefix of committed chunks.
//! Once a chunk fails, later chunks are still written but the checkpoint stays
//! behind the failure, so a resumed run recomputes from the gap onwards. A run
//! that starts past the checkpoint with unwritten dates in between never moves
//! it forward, and a failure at or before the checkpoint moves it back.

use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Checkpoint {
    pub last_computed_date: NaiveDate,
    pub updated_at: NaiveDateTime,
}

impl Checkpoint {
    pub fn at(last_computed_date: NaiveDate) -> Self {
        Self {
            last_computed_date,
            updated_at: chrono::Utc::now().naive_utc(),
        }
    }
}

/// First date a run should compute.
///
/// A full run starts at the requested start. Otherwise the run starts the day
/// after the checkpoint, or at the requested start if that is later.
pub fn resume_from(
    checkpoint: Option<&Checkpoint>,
    requested_start: Option<NaiveDate>,
    full: bool,
) -> Option<NaiveDate> {
    let after_checkpoint = checkpoint
        .filter(|_| !full)
        .and_then(|c| c.last_computed_date.succ_opt());
    match (requested_start, after_checkpoint) {
        (Some(a), Some(b)) => Some(a.max(b)),
        (a, b) => a.or(b),
    }
}

/// Tracks how far the checkpoint may advance as chunks finish in order.
#[derive(Debug, Clone, Default)]
pub struct CheckpointTracker {
    position: Option<NaiveDate>,
    blocked: bool,
}

impl CheckpointTracker {
    /// `existing` is the stored checkpoint. `follows_on` is false when trading
    /// dates between the checkpoint and the run's first date are left
    /// unwritten; such a run keeps the checkpoint where it is.
    pub fn new(existing: Option<NaiveDate>, follows_on: bool) -> Self {
        Self {
            position: existing,
            blocked: !follows_on,
        }
    }

    /// Record a committed chunk ending at `last_date`. Returns the new
    /// checkpoint date if it advanced.
    pub fn committed(&mut self, last_date: NaiveDate) -> Option<NaiveDate> {
        if self.blocked || self.position.is_some_and(|p| p >= last_date) {
            return None;
        }
        self.position = Some(last_date);
        self.position
    }

    /// Record a failed chunk starting at `first_date`. No later chunk may move
    /// the checkpoint. If the checkpoint already covers the failed chunk it
    /// moves back to the day before it; the new date is returned to be saved.
    pub fn failed(&mut self, first_date: NaiveDate) -> Option<NaiveDate> {
        self.blocked = true;
        if self.position.is_some_and(|p| p >= first_date) {
            self.position = first_date.pred_opt();
            return self.position;
        }
        None
    }

    pub fn position(&self) -> Option<NaiveDate> {
        self.position
    }

    pub fn is_blocked(&self) -> bool {
        self.blocked
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 5, day).unwrap()
    }

    #[test]
    fn advances_over_contiguous_prefix() {
        let mut t = CheckpointTracker::new(None, true);
        assert_eq!(t.committed(d(5)), Some(d(5)));
        assert_eq!(t.committed(d(10)), Some(d(10)));
        assert_eq!(t.failed(d(11)), None);
        assert_eq!(t.committed(d(15)), None);
        assert_eq!(t.position(), Some(d(10)));
        assert!(t.is_blocked());
    }

    #[test]
    fn never_moves_backwards() {
        let mut t = CheckpointTracker::new(Some(d(20)), true);
        assert_eq!(t.committed(d(12)), None);
        assert_eq!(t.position(), Some(d(20)));
    }

    #[test]
    fn run_after_a_gap_keeps_checkpoint() {
        let mut t = CheckpointTracker::new(Some(d(10)), false);
        assert_eq!(t.committed(d(25)), None);
        assert_eq!(t.position(), Some(d(10)));
        assert!(t.is_blocked());
    }

    #[test]
    fn failure_under_checkpoint_moves_it_back() {
        let mut t = CheckpointTracker::new(Some(d(20)), true);
        assert_eq!(t.committed(d(7)), None);
        assert_eq!(t.failed(d(8)), Some(d(7)));
        assert_eq!(t.committed(d(25)), None);
        assert_eq!(t.position(), Some(d(7)));
    }

    #[test]
    fn resume_starts_after_checkpoint() {
        let cp = Checkpoint::at(d(10));
        assert_eq!(resume_from(Some(&cp), None, false), Some(d(11)));
        assert_eq!(resume_from(Some(&cp), Some(d(3)), false), Some(d(11)));
        assert_eq!(resume_from(Some(&cp), Some(d(15)), false), Some(d(15)));
    }

    #[test]
    fn full_run_ignores_checkpoint() {
        let cp = Checkpoint::at(d(10));
        assert_eq!(resume_from(Some(&cp), None, true), None);
        assert_eq!(resume_from(Some(&cp), Some(d(3)), true), Some(d(3)));
        assert_eq!(resume_from(None, None, false), None);
    }

    #[test]
    fn checkpoint_json_roundtrip() {
        let cp = Checkpoint::at(d(7));
        let json = serde_json::to_string(&cp).unwrap();
        let back: Checkpoint = serde_json::from_str(&json).unwrap();
        assert_eq!(back, cp);
    }
}
