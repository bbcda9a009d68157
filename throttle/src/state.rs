//! Admission bookkeeping shared by every throttle wrapper.
//!
//! DESIGN
//! ======
//! A throttle is a two-state machine: *ready* or *cooling down*. The only
//! stored fact is the timestamp of the last admitted call; `None` means the
//! wrapper has never admitted anything, so the first call always passes.
//!
//! The comparison is `now - last >= interval`, inclusive, so a call landing
//! exactly one interval after the last admission is let through.
//!
//! CLOCK SKEW
//! ==========
//! If the clock moves backward, `now - last` goes negative and calls are
//! withheld until the clock catches up. No compensation is attempted. Since
//! an admission requires `now >= last + interval >= last`, the stored
//! timestamp never decreases.

use std::time::Duration;

use tracing::{trace, warn};

use crate::clock::saturating_millis;
use crate::error::ThrottleError;

/// Whether the next call would be admitted.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Phase {
    /// The next call runs the action.
    Ready,
    /// Calls are dropped for another `remaining_ms` milliseconds.
    CoolingDown { remaining_ms: i64 },
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ThrottleState {
    min_interval_ms: i64,
    last_invocation_ms: Option<i64>,
}

impl ThrottleState {
    /// Intervals are kept at millisecond resolution; a fractional
    /// millisecond rounds up so a non-zero interval never disables throttling.
    #[must_use]
    pub fn new(min_interval: Duration) -> Self {
        Self {
            min_interval_ms: interval_millis(min_interval),
            last_invocation_ms: None,
        }
    }

    /// Build from a signed millisecond count.
    ///
    /// # Errors
    ///
    /// Returns [`ThrottleError::NegativeInterval`] when `millis < 0`.
    pub fn from_millis(millis: i64) -> Result<Self, ThrottleError> {
        if millis < 0 {
            return Err(ThrottleError::NegativeInterval { millis });
        }
        Ok(Self {
            min_interval_ms: millis,
            last_invocation_ms: None,
        })
    }

    #[must_use]
    pub fn min_interval_ms(&self) -> i64 {
        self.min_interval_ms
    }

    #[must_use]
    pub fn min_interval(&self) -> Duration {
        Duration::from_millis(self.min_interval_ms.unsigned_abs())
    }

    /// Timestamp of the most recent admitted call, if any.
    #[must_use]
    pub fn last_invocation_ms(&self) -> Option<i64> {
        self.last_invocation_ms
    }

    #[must_use]
    pub fn phase_at(&self, now_ms: i64) -> Phase {
        let Some(last) = self.last_invocation_ms else {
            return Phase::Ready;
        };
        let elapsed = now_ms.saturating_sub(last);
        if elapsed >= self.min_interval_ms {
            Phase::Ready
        } else {
            Phase::CoolingDown {
                remaining_ms: self.min_interval_ms.saturating_sub(elapsed),
            }
        }
    }

    #[must_use]
    pub fn is_ready_at(&self, now_ms: i64) -> bool {
        self.phase_at(now_ms) == Phase::Ready
    }

    /// Decide whether a call at `now_ms` is admitted, recording it if so.
    pub fn admit_at(&mut self, now_ms: i64) -> bool {
        match self.phase_at(now_ms) {
            Phase::Ready => {
                trace!(now_ms, last_ms = ?self.last_invocation_ms, "throttle admitted call");
                self.last_invocation_ms = Some(now_ms);
                true
            }
            Phase::CoolingDown { remaining_ms } => {
                if let Some(last) = self.last_invocation_ms.filter(|&last| now_ms < last) {
                    warn!(now_ms, last_ms = last, "clock moved backward; holding calls until it catches up");
                }
                trace!(now_ms, remaining_ms, "throttle suppressed call");
                false
            }
        }
    }
}

fn interval_millis(interval: Duration) -> i64 {
    let whole = interval.as_millis();
    let partial = u128::from(interval.subsec_nanos() % 1_000_000 != 0);
    saturating_millis(whole.saturating_add(partial))
}

#[cfg(test)]
#[path = "state_test.rs"]
mod tests;
