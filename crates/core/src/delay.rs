//! Validated debounce delay
//!
//! A `Delay` is always finite and non-negative. Raw numeric input (CLI
//! flags, profile files) goes through `try_from_millis_f64`, which rejects
//! anything else with `ConfigError::InvalidDelay` before any scheduling
//! state is touched.

use crate::error::ConfigError;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::time::Duration;

/// Quiet period between the last attempt and the operation firing
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Delay(Duration);

impl Delay {
    /// Zero-length delay: fires on the next scheduling opportunity
    pub const ZERO: Self = Self(Duration::ZERO);

    /// Delay from whole milliseconds
    pub fn from_millis(ms: u64) -> Self {
        Self(Duration::from_millis(ms))
    }

    /// Delay from raw fractional milliseconds
    ///
    /// Returns `ConfigError::InvalidDelay` for negative, NaN, or infinite
    /// input.
    pub fn try_from_millis_f64(ms: f64) -> Result<Self, ConfigError> {
        if !ms.is_finite() || ms < 0.0 {
            return Err(ConfigError::InvalidDelay(ms));
        }
        Ok(Self(Duration::from_secs_f64(ms / 1000.0)))
    }

    /// The underlying duration
    pub fn as_duration(self) -> Duration {
        self.0
    }

    /// Fractional milliseconds
    pub fn as_millis_f64(self) -> f64 {
        self.0.as_secs_f64() * 1000.0
    }
}

impl From<Duration> for Delay {
    fn from(duration: Duration) -> Self {
        Self(duration)
    }
}

impl fmt::Display for Delay {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}ms", self.as_millis_f64())
    }
}

impl Serialize for Delay {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_f64(self.as_millis_f64())
    }
}

impl<'de> Deserialize<'de> for Delay {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let ms = f64::deserialize(deserializer)?;
        Self::try_from_millis_f64(ms).map_err(serde::de::Error::custom)
    }
}
