//! Parser configuration

use crate::error::ConfigError;
use serde::{Deserialize, Serialize};

/// Deepest expression/statement nesting accepted by default.
pub const DEFAULT_MAX_NESTING_DEPTH: usize = 100;

/// Settings for a parse session.
///
/// Loadable from TOML; missing keys fall back to [`ParserConfig::default`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ParserConfig {
    /// When false, `parse` never reads or writes the cache.
    pub cache_enabled: bool,
    /// Recursion limit for nested blocks and expressions.
    pub max_nesting_depth: usize,
}

impl Default for ParserConfig {
    fn default() -> Self {
        Self {
            cache_enabled: true,
            max_nesting_depth: DEFAULT_MAX_NESTING_DEPTH,
        }
    }
}

impl ParserConfig {
    /// Validate the configuration.
    ///
    /// - max_nesting_depth must be at least 1
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.max_nesting_depth == 0 {
            return Err(ConfigError::InvalidValue {
                field: "max_nesting_depth".to_string(),
                value: self.max_nesting_depth.to_string(),
                reason: "max_nesting_depth must be at least 1".to_string(),
            });
        }
        Ok(())
    }

    /// Deserialize and validate a TOML document.
    pub fn from_toml_str(source: &str) -> Result<Self, ConfigError> {
        let config: ParserConfig = toml::from_str(source).map_err(|e| ConfigError::Malformed {
            reason: e.to_string(),
        })?;
        config.validate()?;
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        let config = ParserConfig::default();
        assert!(config.cache_enabled);
        assert_eq!(config.max_nesting_depth, DEFAULT_MAX_NESTING_DEPTH);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_from_toml_partial() {
        let config = ParserConfig::from_toml_str("cache_enabled = false\n").unwrap();
        assert!(!config.cache_enabled);
        assert_eq!(config.max_nesting_depth, DEFAULT_MAX_NESTING_DEPTH);
    }

    #[test]
    fn test_zero_depth_rejected() {
        let err = ParserConfig::from_toml_str("max_nesting_depth = 0").unwrap_err();
        assert!(matches!(
            err,
            ConfigError::InvalidValue { ref field, .. } if field == "max_nesting_depth"
        ));
    }

    #[test]
    fn test_malformed_toml() {
        let err = ParserConfig::from_toml_str("cache_enabled = \"maybe\"").unwrap_err();
        assert!(matches!(err, ConfigError::Malformed { .. }));
    }
}
