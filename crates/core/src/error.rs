//! Typed configuration errors

use thiserror::Error;

/// Errors from delay and profile configuration
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Delay was negative, NaN, or infinite
    #[error("invalid delay: {0} (must be a finite, non-negative number of milliseconds)")]
    InvalidDelay(f64),

    /// Category not present in the delay profile
    #[error("unknown category: {0:?}")]
    UnknownCategory(String),
}
