//! Provider configuration.
//!
//! Loaded from TOML:
//!
//! ```toml
//! # Fail reads that name unknown properties (default) or silently drop them.
//! reject_unknown_properties = true
//!
//! # Upper bound on resources returned by one read. Omit for no bound.
//! max_results = 500
//! ```

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Behaviour switches for [`TaskResourceProvider`](crate::provider::TaskResourceProvider).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProviderConfig {
    /// Fail a read that requests an unknown property id.
    ///
    /// When `false`, unknown ids are ignored.
    #[serde(default = "default_reject_unknown")]
    pub reject_unknown_properties: bool,

    /// Largest number of resources a single read may return.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_results: Option<usize>,
}

fn default_reject_unknown() -> bool {
    true
}

impl Default for ProviderConfig {
    fn default() -> Self {
        Self {
            reject_unknown_properties: default_reject_unknown(),
            max_results: None,
        }
    }
}

impl ProviderConfig {
    /// Load configuration from a TOML file.
    ///
    /// # Errors
    ///
    /// [`ConfigError::Io`] if the file cannot be read,
    /// [`ConfigError::Parse`] if its content is invalid.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml(&content)
    }

    /// Parse configuration from a TOML string.
    ///
    /// # Errors
    ///
    /// [`ConfigError::Parse`] if `content` is invalid.
    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        toml::from_str(content).map_err(Into::into)
    }

    /// Sets [`reject_unknown_properties`](Self::reject_unknown_properties).
    pub fn with_reject_unknown_properties(mut self, reject: bool) -> Self {
        self.reject_unknown_properties = reject;
        self
    }

    /// Sets [`max_results`](Self::max_results).
    pub fn with_max_results(mut self, max_results: usize) -> Self {
        self.max_results = Some(max_results);
        self
    }
}
