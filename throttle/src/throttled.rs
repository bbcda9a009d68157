//! Single-owner throttle wrapper.
//!
//! DESIGN
//! ======
//! [`Throttled`] owns the action, the clock and one [`ThrottleState`]. Calls
//! take `&mut self`, so a wrapper is driven from one thread of control at a
//! time; hosts that need concurrent callers use
//! [`SharedThrottle`](crate::SharedThrottle).
//!
//! The action's argument list is a single tuple `A`. A suppressed call is
//! dropped: it returns `None` and the action never sees it. An admitted call
//! returns `Some` with whatever the action produced, so a `Result::Err` from
//! the action reaches the caller unchanged. The timestamp is recorded before
//! the action runs, so a failing or panicking call still counts.

use std::time::Duration;

use tracing::debug;

use crate::clock::{Clock, SystemClock};
use crate::error::ThrottleError;
use crate::state::{Phase, ThrottleState};

pub struct Throttled<F, C = SystemClock> {
    action: F,
    clock: C,
    state: ThrottleState,
}

impl<F> Throttled<F, SystemClock> {
    /// Wrap `action` so it runs at most once per `min_interval` of wall-clock time.
    #[must_use]
    pub fn new(action: F, min_interval: Duration) -> Self {
        Self::with_clock(action, min_interval, SystemClock)
    }

    /// Like [`Throttled::new`] with a signed millisecond interval.
    ///
    /// # Errors
    ///
    /// Returns [`ThrottleError::NegativeInterval`] when `millis < 0`.
    pub fn from_millis(action: F, millis: i64) -> Result<Self, ThrottleError> {
        Ok(Self::from_state(action, ThrottleState::from_millis(millis)?, SystemClock))
    }
}

impl<F, C: Clock> Throttled<F, C> {
    #[must_use]
    pub fn with_clock(action: F, min_interval: Duration, clock: C) -> Self {
        Self::from_state(action, ThrottleState::new(min_interval), clock)
    }

    pub(crate) fn from_state(action: F, state: ThrottleState, clock: C) -> Self {
        debug!(min_interval_ms = state.min_interval_ms(), "throttle created");
        Self { action, clock, state }
    }

    /// Run the action with `args` unless the last admitted call was less than
    /// one interval ago.
    ///
    /// Returns `None` when the call is suppressed.
    pub fn call<A, R>(&mut self, args: A) -> Option<R>
    where
        F: FnMut(A) -> R,
    {
        let now = self.clock.now_ms();
        self.call_at(now, args)
    }

    pub(crate) fn call_at<A, R>(&mut self, now_ms: i64, args: A) -> Option<R>
    where
        F: FnMut(A) -> R,
    {
        if self.state.admit_at(now_ms) {
            Some((self.action)(args))
        } else {
            None
        }
    }

    #[must_use]
    pub fn phase(&self) -> Phase {
        self.state.phase_at(self.clock.now_ms())
    }

    #[must_use]
    pub fn is_ready(&self) -> bool {
        self.phase() == Phase::Ready
    }

    #[must_use]
    pub fn state(&self) -> &ThrottleState {
        &self.state
    }

    #[must_use]
    pub fn clock(&self) -> &C {
        &self.clock
    }

    /// Give back the wrapped action.
    #[must_use]
    pub fn into_inner(self) -> F {
        self.action
    }
}

/// Wrap `action` in a closure that forwards its argument tuple at most once
/// per `min_interval`.
///
/// The returned closure owns its own timestamp; separate calls to this
/// function produce wrappers that do not affect each other.
///
/// The closure's argument type `A` is fixed once, including any lifetime in
/// it. An action taking `&str` therefore only accepts borrows that outlive
/// the closure. For arguments borrowed per event, such as a `String` built
/// inside a loop, use [`Throttled::call`], which is generic on each call, or
/// pass owned values.
#[must_use]
pub fn make_throttled<A, R, F>(action: F, min_interval: Duration) -> impl FnMut(A) -> Option<R>
where
    F: FnMut(A) -> R,
{
    make_throttled_with_clock(action, min_interval, SystemClock)
}

/// [`make_throttled`] reading time from `clock`.
///
/// Same argument restriction as [`make_throttled`]: borrowed arguments must
/// outlive the returned closure. Use [`Throttled::call`] for per-call borrows.
#[must_use]
pub fn make_throttled_with_clock<A, R, F, C>(
    action: F,
    min_interval: Duration,
    clock: C,
) -> impl FnMut(A) -> Option<R>
where
    F: FnMut(A) -> R,
    C: Clock,
{
    let mut throttled = Throttled::with_clock(action, min_interval, clock);
    move |args| throttled.call(args)
}

#[cfg(test)]
#[path = "throttled_test.rs"]
mod tests;
