//! Exam countdown
//!
//! Remaining time is decremented once per tick and corrected against the
//! persisted anchor whenever the two disagree by more than a second. It never
//! goes up. When it reaches zero a grace countdown starts, at most once.

use crate::error::AppResult;
use crate::storage::{TimerAnchor, TimerStore};
use tracing::{debug, info};

/// Result of one tick
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimerTick {
    Running { remaining: u64 },
    /// Time ran out on this tick; grace countdown begins
    CountdownStarted { seconds_left: u64 },
    CountingDown { seconds_left: u64 },
    /// Grace window over; fires exactly once
    CountdownElapsed,
    /// Countdown already fired
    Idle,
}

#[derive(Debug, Clone)]
pub struct ExamTimer {
    anchor: TimerAnchor,
    remaining: u64,
    grace_secs: u64,
    countdown_started_at: Option<i64>,
    countdown_fired: bool,
}

impl ExamTimer {
    /// Resumes from the stored anchor, or writes a fresh one
    pub fn resume_or_start(
        timers: &TimerStore,
        exam_id: &str,
        budget_secs: u64,
        grace_secs: u64,
        now_millis: i64,
    ) -> AppResult<Self> {
        let anchor = match timers.load(exam_id)? {
            Some(anchor) => {
                info!(
                    "⏱ Resuming timer for exam {}: {}s left of {}s",
                    exam_id,
                    anchor.remaining_at(now_millis),
                    anchor.initial_time
                );
                anchor
            }
            None => {
                let anchor = TimerAnchor::new(now_millis, budget_secs);
                timers.save(exam_id, &anchor)?;
                info!("⏱ Started timer for exam {}: {}s", exam_id, budget_secs);
                anchor
            }
        };
        Ok(Self::from_anchor(anchor, grace_secs, now_millis))
    }

    pub fn from_anchor(anchor: TimerAnchor, grace_secs: u64, now_millis: i64) -> Self {
        Self {
            remaining: anchor.remaining_at(now_millis),
            anchor,
            grace_secs,
            countdown_started_at: None,
            countdown_fired: false,
        }
    }

    pub fn anchor(&self) -> TimerAnchor {
        self.anchor
    }

    pub fn remaining(&self) -> u64 {
        self.remaining
    }

    pub fn countdown_started(&self) -> bool {
        self.countdown_started_at.is_some()
    }

    pub fn tick(&mut self, now_millis: i64) -> TimerTick {
        if let Some(started_at) = self.countdown_started_at {
            if self.countdown_fired {
                return TimerTick::Idle;
            }
            let waited = ((now_millis - started_at).max(0) / 1000) as u64;
            let seconds_left = self.grace_secs.saturating_sub(waited);
            if seconds_left == 0 {
                self.countdown_fired = true;
                return TimerTick::CountdownElapsed;
            }
            return TimerTick::CountingDown { seconds_left };
        }

        let decremented = self.remaining.saturating_sub(1);
        let anchored = self.anchor.remaining_at(now_millis);
        let corrected = if decremented.abs_diff(anchored) > 1 {
            debug!("Timer drift {}s corrected", decremented.abs_diff(anchored));
            anchored
        } else {
            decremented
        };
        self.remaining = self.remaining.min(corrected);

        if self.remaining == 0 {
            self.countdown_started_at = Some(now_millis);
            info!("⏰ Time is up, auto-submitting in {}s", self.grace_secs);
            return TimerTick::CountdownStarted {
                seconds_left: self.grace_secs,
            };
        }
        TimerTick::Running {
            remaining: self.remaining,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::LocalStore;

    const T0: i64 = 1_700_000_000_000;

    #[test]
    fn fresh_timer_persists_anchor_once() {
        let timers = TimerStore::new(LocalStore::in_memory());
        ExamTimer::resume_or_start(&timers, "e1", 9000, 10, T0).unwrap();
        let resumed = ExamTimer::resume_or_start(&timers, "e1", 1234, 10, T0 + 30_000).unwrap();

        assert_eq!(resumed.anchor(), TimerAnchor::new(T0, 9000));
        assert_eq!(resumed.remaining(), 8970);
    }

    #[test]
    fn missed_ticks_are_caught_up_from_anchor() {
        let mut timer = ExamTimer::from_anchor(TimerAnchor::new(T0, 100), 10, T0);
        // process was suspended for a minute
        assert_eq!(timer.tick(T0 + 60_000), TimerTick::Running { remaining: 40 });
        assert_eq!(timer.tick(T0 + 61_000), TimerTick::Running { remaining: 39 });
    }

    #[test]
    fn remaining_never_increases() {
        let mut timer = ExamTimer::from_anchor(TimerAnchor::new(T0, 100), 10, T0);
        timer.tick(T0 + 50_000);
        // clock jumped backwards: hold, do not climb back to the anchor's value
        let tick = timer.tick(T0 + 1_000);
        assert_eq!(tick, TimerTick::Running { remaining: 50 });
    }

    #[test]
    fn countdown_starts_once_and_fires_once() {
        let mut timer = ExamTimer::from_anchor(TimerAnchor::new(T0, 2), 10, T0);
        assert_eq!(timer.tick(T0 + 1_000), TimerTick::Running { remaining: 1 });
        assert_eq!(
            timer.tick(T0 + 2_000),
            TimerTick::CountdownStarted { seconds_left: 10 }
        );
        // drift correction would say zero again; countdown must not restart
        assert_eq!(
            timer.tick(T0 + 3_000),
            TimerTick::CountingDown { seconds_left: 9 }
        );
        assert_eq!(timer.tick(T0 + 12_000), TimerTick::CountdownElapsed);
        assert_eq!(timer.tick(T0 + 13_000), TimerTick::Idle);
    }

    #[test]
    fn reload_after_expiry_starts_countdown_on_first_tick() {
        let mut timer = ExamTimer::from_anchor(TimerAnchor::new(T0, 60), 10, T0 + 600_000);
        assert_eq!(timer.remaining(), 0);
        assert_eq!(
            timer.tick(T0 + 601_000),
            TimerTick::CountdownStarted { seconds_left: 10 }
        );
    }
}
