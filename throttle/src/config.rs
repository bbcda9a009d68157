//! Throttle configuration parsed from environment variables.

use std::env::VarError;
use std::time::Duration;

use crate::clock::{Clock, SystemClock};
use crate::error::ThrottleError;
use crate::shared::SharedThrottle;
use crate::state::ThrottleState;
use crate::throttled::Throttled;

pub const MIN_INTERVAL_ENV: &str = "THROTTLE_MIN_INTERVAL_MS";
pub const DEFAULT_MIN_INTERVAL_MS: u64 = 250;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ThrottleConfig {
    pub min_interval: Duration,
}

impl Default for ThrottleConfig {
    fn default() -> Self {
        Self {
            min_interval: Duration::from_millis(DEFAULT_MIN_INTERVAL_MS),
        }
    }
}

impl ThrottleConfig {
    /// Build config from environment variables.
    ///
    /// Optional:
    /// - `THROTTLE_MIN_INTERVAL_MS`: default 250
    ///
    /// # Errors
    ///
    /// [`ThrottleError::NegativeInterval`] for a negative value and
    /// [`ThrottleError::InvalidSetting`] for anything that is not an integer.
    pub fn from_env() -> Result<Self, ThrottleError> {
        Self::from_env_key(MIN_INTERVAL_ENV)
    }

    pub(crate) fn from_env_key(key: &str) -> Result<Self, ThrottleError> {
        match std::env::var(key) {
            Ok(raw) => Self::parse_millis(key, &raw),
            Err(VarError::NotPresent) => Ok(Self::default()),
            Err(VarError::NotUnicode(raw)) => Err(ThrottleError::InvalidSetting {
                key: key.to_owned(),
                value: raw.to_string_lossy().into_owned(),
            }),
        }
    }

    /// # Errors
    ///
    /// Returns [`ThrottleError::NegativeInterval`] when `millis < 0`.
    pub fn from_millis(millis: i64) -> Result<Self, ThrottleError> {
        let state = ThrottleState::from_millis(millis)?;
        Ok(Self {
            min_interval: state.min_interval(),
        })
    }

    fn parse_millis(key: &str, raw: &str) -> Result<Self, ThrottleError> {
        let millis = raw
            .trim()
            .parse::<i64>()
            .map_err(|_| ThrottleError::InvalidSetting {
                key: key.to_owned(),
                value: raw.to_owned(),
            })?;
        Self::from_millis(millis)
    }

    #[must_use]
    pub fn throttle<F>(&self, action: F) -> Throttled<F> {
        Throttled::new(action, self.min_interval)
    }

    #[must_use]
    pub fn throttle_with_clock<F, C: Clock>(&self, action: F, clock: C) -> Throttled<F, C> {
        Throttled::with_clock(action, self.min_interval, clock)
    }

    #[must_use]
    pub fn shared<F>(&self, action: F) -> SharedThrottle<F, SystemClock> {
        SharedThrottle::new(action, self.min_interval)
    }
}

#[cfg(test)]
#[path = "config_test.rs"]
mod tests;
