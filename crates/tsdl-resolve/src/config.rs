//! # Resolution Configuration
//!
//! Knobs for the resolution pipeline. Every field has a default, so an
//! empty configuration document is valid. Unknown keys are rejected so
//! that a misspelled option fails loudly instead of silently doing nothing.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Default limit on field class nesting depth.
pub const DEFAULT_MAX_DEPTH: usize = 64;

/// Configuration errors.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    /// `max_depth` must allow at least the scope root.
    #[error("max_depth must be at least 1")]
    ZeroMaxDepth,
}

/// Options for [`crate::Resolver`] and [`crate::prepare_trace_class`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ResolveConfig {
    /// Deepest field class nesting accepted below a scope root.
    pub max_depth: usize,
    /// Whether the pipeline marks byte arrays and sequences as text.
    pub update_text_arrays: bool,
}

impl Default for ResolveConfig {
    fn default() -> Self {
        Self {
            max_depth: DEFAULT_MAX_DEPTH,
            update_text_arrays: true,
        }
    }
}

impl ResolveConfig {
    /// Check the configuration.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::ZeroMaxDepth`] if `max_depth` is 0.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.max_depth == 0 {
            return Err(ConfigError::ZeroMaxDepth);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_document_yields_defaults() {
        let config: ResolveConfig = serde_json::from_str("{}").unwrap();
        assert_eq!(config, ResolveConfig::default());
        assert_eq!(config.max_depth, DEFAULT_MAX_DEPTH);
        assert!(config.update_text_arrays);
    }

    #[test]
    fn partial_document_overrides_one_field() {
        let config: ResolveConfig = serde_json::from_str(r#"{"max_depth": 8}"#).unwrap();
        assert_eq!(config.max_depth, 8);
        assert!(config.update_text_arrays);
    }

    #[test]
    fn unknown_key_rejected() {
        let result: Result<ResolveConfig, _> = serde_json::from_str(r#"{"max_dept": 8}"#);
        assert!(result.is_err());
    }

    #[test]
    fn zero_depth_invalid() {
        let config = ResolveConfig {
            max_depth: 0,
            ..ResolveConfig::default()
        };
        assert_eq!(config.validate(), Err(ConfigError::ZeroMaxDepth));
        assert!(ResolveConfig::default().validate().is_ok());
    }
}
