//! Thread-safe throttle wrapper.
//!
//! DESIGN
//! ======
//! [`SharedThrottle`] is a cheap-to-clone handle around one action, one clock
//! and one [`ThrottleState`] behind a mutex. The lock covers only the
//! read-compare-write of the timestamp, so two threads racing for the same
//! window cannot both be admitted. The action runs after the lock is
//! released; a slow or panicking action never blocks or poisons other callers.

use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use tracing::debug;

use crate::clock::{Clock, SystemClock};
use crate::error::ThrottleError;
use crate::state::{Phase, ThrottleState};

pub struct SharedThrottle<F, C = SystemClock> {
    inner: Arc<SharedThrottleInner<F, C>>,
}

struct SharedThrottleInner<F, C> {
    action: F,
    clock: C,
    state: Mutex<ThrottleState>,
}

impl<F, C> Clone for SharedThrottle<F, C> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<F> SharedThrottle<F, SystemClock> {
    #[must_use]
    pub fn new(action: F, min_interval: Duration) -> Self {
        Self::with_clock(action, min_interval, SystemClock)
    }

    /// # Errors
    ///
    /// Returns [`ThrottleError::NegativeInterval`] when `millis < 0`.
    pub fn from_millis(action: F, millis: i64) -> Result<Self, ThrottleError> {
        Ok(Self::from_state(action, ThrottleState::from_millis(millis)?, SystemClock))
    }
}

impl<F, C: Clock> SharedThrottle<F, C> {
    #[must_use]
    pub fn with_clock(action: F, min_interval: Duration, clock: C) -> Self {
        Self::from_state(action, ThrottleState::new(min_interval), clock)
    }

    pub(crate) fn from_state(action: F, state: ThrottleState, clock: C) -> Self {
        debug!(min_interval_ms = state.min_interval_ms(), "shared throttle created");
        Self {
            inner: Arc::new(SharedThrottleInner {
                action,
                clock,
                state: Mutex::new(state),
            }),
        }
    }

    /// Run the action with `args` unless another call, from any clone of this
    /// handle, was admitted less than one interval ago.
    pub fn call<A, R>(&self, args: A) -> Option<R>
    where
        F: Fn(A) -> R,
    {
        let admitted = {
            let mut state = self.lock_state();
            // Read the clock under the lock so admissions are ordered by time.
            let now = self.inner.clock.now_ms();
            state.admit_at(now)
        };
        admitted.then(|| (self.inner.action)(args))
    }

    #[must_use]
    pub fn phase(&self) -> Phase {
        let state = self.lock_state();
        state.phase_at(self.inner.clock.now_ms())
    }

    #[must_use]
    pub fn is_ready(&self) -> bool {
        self.phase() == Phase::Ready
    }

    #[must_use]
    pub fn last_invocation_ms(&self) -> Option<i64> {
        self.lock_state().last_invocation_ms()
    }

    #[must_use]
    pub fn min_interval(&self) -> Duration {
        self.lock_state().min_interval()
    }

    fn lock_state(&self) -> std::sync::MutexGuard<'_, ThrottleState> {
        self.inner
            .state
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }
}

#[cfg(test)]
#[path = "shared_test.rs"]
mod tests;
