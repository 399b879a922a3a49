//! Simulation error types.

/// Result type for simulation operations.
pub type Result<T> = std::result::Result<T, SimError>;

/// Errors from building or starting simulation primitives.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SimError {
    /// Clock type is not supported.
    #[error("unknown clock type: {0} (supported: periodic)")]
    UnknownClockType(String),

    /// Clock interval is zero.
    #[error("clock interval must be positive")]
    InvalidInterval,

    /// Clock interval is too long to schedule.
    #[error("clock interval {0:?} is too long to schedule")]
    IntervalTooLong(std::time::Duration),

    /// Source type is not supported.
    #[error("unknown source type: {0} (supported: random_int)")]
    UnknownSourceType(String),

    /// Source bounds are inverted.
    #[error("invalid bounds: min {min} > max {max}")]
    InvalidBounds {
        /// Lower bound.
        min: i64,
        /// Upper bound.
        max: i64,
    },

    /// Transform type is not supported.
    #[error("unknown transform: {0} (supported: accumulate)")]
    UnknownTransform(String),

    /// Reset type is not supported.
    #[error("unknown reset type: {0} (supported: on_read)")]
    UnknownReset(String),

    /// A clock was started outside a tokio runtime.
    #[error("no tokio runtime available to drive the clock")]
    NoRuntime,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bounds_display() {
        let err = SimError::InvalidBounds { min: 10, max: 1 };
        assert_eq!(err.to_string(), "invalid bounds: min 10 > max 1");
    }
}
