/// Error returned when a throttle cannot be configured.
///
/// Throttled calls themselves never fail; failures of the wrapped action are
/// handed back to the caller untouched.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ThrottleError {
    /// A minimum interval given in signed milliseconds was below zero.
    #[error("minimum interval must be non-negative, got {millis}ms")]
    NegativeInterval { millis: i64 },
    /// A configuration value could not be parsed.
    #[error("invalid value for {key}: {value:?}")]
    InvalidSetting { key: String, value: String },
}
