//! Attribution configuration with sensible defaults.
//!
//! [`AttributionConfig`] controls whether the federated corpus is searched
//! and the limit used when callers do not pass one. It can be loaded from a
//! TOML file; missing fields fall back to their defaults.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{AttributionError, Result};

/// Configuration for the attribution service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AttributionConfig {
    /// Also search the federated corpus and merge its results after local ones.
    pub federate: bool,
    /// Limit used by [`crate::snippet_attribution_default`].
    pub default_limit: usize,
    /// Remote endpoint for the federated corpus. Used for diagnostics only.
    pub federated_endpoint: Option<String>,
}

impl Default for AttributionConfig {
    fn default() -> Self {
        Self {
            federate: false,
            default_limit: 10,
            federated_endpoint: None,
        }
    }
}

impl AttributionConfig {
    /// Validates this configuration, returning an error if any field is invalid.
    ///
    /// Checks:
    /// - `default_limit` must be greater than 0
    /// - `federated_endpoint`, when set, must not be blank
    pub fn validate(&self) -> Result<()> {
        if self.default_limit == 0 {
            return Err(AttributionError::Config(
                "default_limit must be greater than 0".into(),
            ));
        }
        if self
            .federated_endpoint
            .as_deref()
            .is_some_and(|e| e.trim().is_empty())
        {
            return Err(AttributionError::Config(
                "federated_endpoint must not be empty".into(),
            ));
        }
        Ok(())
    }

    /// Parse and validate configuration from a TOML string.
    ///
    /// # Errors
    ///
    /// Returns [`AttributionError::Config`] if the TOML is malformed or the
    /// resulting configuration is invalid.
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let config: Self =
            toml::from_str(content).map_err(|e| AttributionError::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from a TOML file.
    ///
    /// # Errors
    ///
    /// Returns [`AttributionError::Io`] if the file cannot be read, or
    /// [`AttributionError::Config`] if it cannot be parsed or is invalid.
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml_str(&content)
    }
}
