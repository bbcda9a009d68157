//! Drop-on-suppress throttling for event handlers.
//!
//! A throttled action runs at most once per minimum interval. Calls that
//! arrive sooner are discarded outright: they are not queued and nothing is
//! replayed when the window reopens.
//!
//! ```
//! use std::time::Duration;
//! use throttle::{ManualClock, Throttled};
//!
//! let clock = ManualClock::new(0);
//! let mut save = Throttled::with_clock(|draft: &str| draft.len(), Duration::from_millis(200), clock.clone());
//!
//! assert_eq!(save.call("a"), Some(1));
//! clock.set(150);
//! assert_eq!(save.call("ab"), None);
//! clock.set(200);
//! assert_eq!(save.call("abc"), Some(3));
//! ```

mod clock;
mod config;
mod error;
mod shared;
mod state;
mod throttled;

pub use clock::{Clock, ManualClock, MonotonicClock, SystemClock};
pub use config::{DEFAULT_MIN_INTERVAL_MS, MIN_INTERVAL_ENV, ThrottleConfig};
pub use error::ThrottleError;
pub use shared::SharedThrottle;
pub use state::{Phase, ThrottleState};
pub use throttled::{Throttled, make_throttled, make_throttled_with_clock};
