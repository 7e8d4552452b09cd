//! Category -> delay profile
//!
//! Maps named event categories (question types, in the demo CLI) to
//! debounce delays. The table is resolved by the calling layer; the
//! debouncer itself only ever receives a `Delay`.

use crate::delay::Delay;
use crate::error::ConfigError;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;

/// Category used before any explicit selection is made
pub const DEFAULT_CATEGORY: &str = "page load";

/// Delay table keyed by category name
///
/// Loadable from a TOML file:
///
/// ```toml
/// [delays]
/// "multiple choice" = 1
/// essay = 1000
/// math = 500
/// "page load" = 1
/// ```
///
/// Values are milliseconds (fractional allowed); negative or non-finite
/// values are rejected during parsing.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DelayProfile {
    delays: BTreeMap<String, Delay>,
}

impl DelayProfile {
    /// The built-in table
    ///
    /// Interactive categories save quickly; free-form ones wait for the
    /// user to pause. "page load" keeps the initial save near-instant.
    pub fn builtin() -> Self {
        let mut delays = BTreeMap::new();
        delays.insert("multiple choice".to_string(), Delay::from_millis(1));
        delays.insert("essay".to_string(), Delay::from_millis(1000));
        delays.insert("math".to_string(), Delay::from_millis(500));
        delays.insert("page load".to_string(), Delay::from_millis(1));
        Self { delays }
    }

    /// Build a profile from an existing table
    pub fn new(delays: BTreeMap<String, Delay>) -> Self {
        Self { delays }
    }

    /// Look up a category's delay
    pub fn resolve(&self, category: &str) -> Option<Delay> {
        self.delays.get(category).copied()
    }

    /// Look up a category's delay, erroring on a miss
    pub fn delay_for(&self, category: &str) -> Result<Delay, ConfigError> {
        self.resolve(category)
            .ok_or_else(|| ConfigError::UnknownCategory(category.to_string()))
    }

    /// Delay for [`DEFAULT_CATEGORY`], falling back to 1ms if a custom
    /// profile does not define it
    pub fn default_delay(&self) -> Delay {
        self.resolve(DEFAULT_CATEGORY)
            .unwrap_or_else(|| Delay::from_millis(1))
    }

    /// Iterate categories and their delays in name order
    pub fn categories(&self) -> impl Iterator<Item = (&str, Delay)> {
        self.delays.iter().map(|(name, delay)| (name.as_str(), *delay))
    }

    /// Parse a profile from TOML text
    pub fn from_toml_str(text: &str) -> Result<Self> {
        toml::from_str(text).context("Failed to parse delay profile")
    }

    /// Load a profile from a TOML file
    pub fn load(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read delay profile: {}", path.display()))?;
        Self::from_toml_str(&text)
    }
}

impl Default for DelayProfile {
    fn default() -> Self {
        Self::builtin()
    }
}
