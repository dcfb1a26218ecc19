//! Rules configuration.
//!
//! Optional rules vary between clubs and servers. They are collected in
//! `RulesConfig`, which can be built in code or loaded from TOML:
//!
//! ```
//! use rust_backgammon::core::RulesConfig;
//!
//! let config = RulesConfig::from_toml_str("jacoby = true\nmax_cube_value = 16").unwrap();
//! assert!(config.jacoby);
//! assert_eq!(config.max_cube_value, 16);
//! assert!(config.beavers);
//! ```

use serde::{Deserialize, Serialize};

use super::error::EngineError;

/// Match lengths offered when starting a match.
pub const MATCH_LENGTHS: [u32; 13] = [1, 3, 5, 7, 9, 11, 13, 15, 17, 19, 21, 23, 25];

/// True when `length` is on the match-length menu.
#[must_use]
pub fn is_valid_match_length(length: u32) -> bool {
    MATCH_LENGTHS.contains(&length)
}

/// Optional rules for the engine.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RulesConfig {
    /// Allow the taker to beaver (immediately redouble at value 2).
    pub beavers: bool,

    /// Allow the original doubler to answer a beaver with a raccoon.
    pub raccoons: bool,

    /// Jacoby rule for money play: gammons count single while the cube
    /// has never been turned.
    pub jacoby: bool,

    /// Highest value the cube may reach. Must be a power of two, at least 2.
    pub max_cube_value: u32,
}

impl Default for RulesConfig {
    fn default() -> Self {
        Self {
            beavers: true,
            raccoons: true,
            jacoby: false,
            max_cube_value: 64,
        }
    }
}

impl RulesConfig {
    /// Parse and validate a TOML rules file. Missing keys take defaults.
    pub fn from_toml_str(source: &str) -> Result<Self, EngineError> {
        let config: RulesConfig =
            toml::from_str(source).map_err(|e| EngineError::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Check internal consistency.
    pub fn validate(&self) -> Result<(), EngineError> {
        if self.max_cube_value < 2 || !self.max_cube_value.is_power_of_two() {
            return Err(EngineError::Config(format!(
                "max_cube_value must be a power of two of at least 2, got {}",
                self.max_cube_value
            )));
        }
        if self.raccoons && !self.beavers {
            return Err(EngineError::Config(
                "raccoons require beavers to be enabled".to_string(),
            ));
        }
        Ok(())
    }

    /// Enable or disable beavers (raccoons follow when disabling).
    #[must_use]
    pub fn with_beavers(mut self, enabled: bool) -> Self {
        self.beavers = enabled;
        if !enabled {
            self.raccoons = false;
        }
        self
    }

    /// Enable or disable raccoons.
    #[must_use]
    pub fn with_raccoons(mut self, enabled: bool) -> Self {
        self.raccoons = enabled;
        self
    }

    /// Enable or disable the Jacoby rule.
    #[must_use]
    pub fn with_jacoby(mut self, enabled: bool) -> Self {
        self.jacoby = enabled;
        self
    }

    /// Set the cube cap.
    #[must_use]
    pub fn with_max_cube_value(mut self, value: u32) -> Self {
        self.max_cube_value = value;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = RulesConfig::default();
        assert!(config.beavers);
        assert!(config.raccoons);
        assert!(!config.jacoby);
        assert_eq!(config.max_cube_value, 64);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_builder_pattern() {
        let config = RulesConfig::default()
            .with_beavers(false)
            .with_jacoby(true)
            .with_max_cube_value(8);

        assert!(!config.beavers);
        assert!(!config.raccoons);
        assert!(config.jacoby);
        assert_eq!(config.max_cube_value, 8);
    }

    #[test]
    fn test_from_toml_defaults() {
        let config = RulesConfig::from_toml_str("").unwrap();
        assert_eq!(config, RulesConfig::default());
    }

    #[test]
    fn test_from_toml_rejects_bad_cap() {
        let err = RulesConfig::from_toml_str("max_cube_value = 12").unwrap_err();
        assert!(matches!(err, EngineError::Config(_)));
    }

    #[test]
    fn test_from_toml_rejects_raccoons_without_beavers() {
        let err = RulesConfig::from_toml_str("beavers = false\nraccoons = true").unwrap_err();
        assert!(matches!(err, EngineError::Config(_)));
    }

    #[test]
    fn test_from_toml_rejects_syntax_error() {
        let err = RulesConfig::from_toml_str("jacoby = ").unwrap_err();
        assert!(matches!(err, EngineError::Config(_)));
    }

    #[test]
    fn test_match_length_menu() {
        assert!(is_valid_match_length(1));
        assert!(is_valid_match_length(3));
        assert!(is_valid_match_length(25));
        assert!(!is_valid_match_length(0));
        assert!(!is_valid_match_length(4));
        assert!(!is_valid_match_length(27));
    }

    #[test]
    fn test_serialization() {
        let config = RulesConfig::default().with_jacoby(true);
        let json = serde_json::to_string(&config).unwrap();
        let deserialized: RulesConfig = serde_json::from_str(&json).unwrap();
        assert_eq!(config, deserialized);
    }
}
