//! Exam countdown anchor
//!
//! Remaining time is always derived from a fixed start timestamp so a reload
//! (or a backgrounded process that missed ticks) resumes where the wall clock
//! says it should.

use super::LocalStore;
use crate::error::AppResult;
use serde::{Deserialize, Serialize};

/// `{ startTime, initialTime }` under `exam_timer_<examId>`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TimerAnchor {
    /// Epoch milliseconds
    pub start_time: i64,
    /// Budget in seconds
    pub initial_time: u64,
}

impl TimerAnchor {
    pub fn new(start_time: i64, initial_time: u64) -> Self {
        Self {
            start_time,
            initial_time,
        }
    }

    /// Whole seconds elapsed since the anchor; never negative
    pub fn elapsed_secs(&self, now_millis: i64) -> u64 {
        let elapsed_ms = (now_millis - self.start_time).max(0);
        (elapsed_ms / 1000) as u64
    }

    /// `max(0, initialTime - (now - startTime))`
    pub fn remaining_at(&self, now_millis: i64) -> u64 {
        self.initial_time.saturating_sub(self.elapsed_secs(now_millis))
    }
}

pub fn timer_key(exam_id: &str) -> String {
    format!("exam_timer_{exam_id}")
}

#[derive(Clone, Debug)]
pub struct TimerStore {
    store: LocalStore,
}

impl TimerStore {
    pub fn new(store: LocalStore) -> Self {
        Self { store }
    }

    pub fn load(&self, exam_id: &str) -> AppResult<Option<TimerAnchor>> {
        self.store.get(&timer_key(exam_id))
    }

    pub fn save(&self, exam_id: &str, anchor: &TimerAnchor) -> AppResult<()> {
        self.store.set(&timer_key(exam_id), anchor)
    }

    pub fn clear(&self, exam_id: &str) -> AppResult<()> {
        self.store.remove(&timer_key(exam_id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn remaining_is_anchored_to_wall_clock() {
        let anchor = TimerAnchor::new(1_000_000, 9000);
        assert_eq!(anchor.remaining_at(1_000_000), 9000);
        assert_eq!(anchor.remaining_at(1_000_000 + 30_000), 8970);
        // missed ticks do not matter, only the instant
        assert_eq!(anchor.remaining_at(1_000_000 + 3_600_500), 5400);
        assert_eq!(anchor.remaining_at(1_000_000 + 10_000_000), 0);
    }

    #[test]
    fn clock_behind_anchor_counts_as_no_time_elapsed() {
        let anchor = TimerAnchor::new(5_000, 60);
        assert_eq!(anchor.remaining_at(1_000), 60);
    }

    #[test]
    fn anchor_is_stored_in_web_client_shape() {
        let store = LocalStore::in_memory();
        let timers = TimerStore::new(store.clone());
        timers.save("42", &TimerAnchor::new(1_700_000_000_000, 9000)).unwrap();

        let raw: serde_json::Value = store.get("exam_timer_42").unwrap().unwrap();
        assert_eq!(raw["startTime"], 1_700_000_000_000i64);
        assert_eq!(raw["initialTime"], 9000);

        timers.clear("42").unwrap();
        assert_eq!(timers.load("42").unwrap(), None);
    }
}
