//! Error types for metric computations.
//!
//! Data conditions (zero bases, missing periods) are reported through the
//! result values. These errors are reserved for caller mistakes.

use thiserror::Error;

/// Result type for metric computations.
pub type Result<T> = std::result::Result<T, MetricsError>;

/// Precondition violations.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MetricsError {
    /// End period not after start, non-positive period count, or periods of
    /// different kinds.
    #[error("Invalid period range: {0}")]
    InvalidPeriodRange(String),

    /// A group-by list that names the same field twice.
    #[error("Mismatched group keys: {0}")]
    MismatchedGroupKeys(String),

    /// A negative or non-finite value where units are expected.
    #[error("Invalid value: {0}")]
    InvalidValue(String),

    /// A ranking request for zero entries.
    #[error("Invalid count: n must be at least 1")]
    InvalidCount,
}
