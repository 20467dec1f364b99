//! Configuration Module
//!
//! This module defines all configuration structures for the pin gateway.
//! Configuration is loaded from TOML files and parsed using serde.

use crate::registry::ValueRule;
use serde::Deserialize;
use std::collections::BTreeMap;
use std::fs;

/// Default location of the configuration file
pub const DEFAULT_CONFIG_PATH: &str = "config/default.toml";

/// Main configuration structure
///
/// Contains all configuration sections for the gateway.
/// Loaded from a TOML file (e.g., config/default.toml).
///
/// # Example TOML
/// ```toml
/// [api]
/// host = "0.0.0.0"
/// port = 3000
///
/// [aliases.red_pin]
/// pin = 17
/// allowed_operations = ["pwmWrite"]
/// validate = { kind = "dutyCycle" }
/// ```
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub api: ApiConfig,
    #[serde(default)]
    pub aliases: BTreeMap<String, AliasConfig>,
}

/// API server configuration
///
/// # Fields
/// - `host`: IP address to bind to (e.g., "127.0.0.1" or "0.0.0.0")
/// - `port`: TCP port to listen on (e.g., 3000)
#[derive(Debug, Clone, Deserialize)]
pub struct ApiConfig {
    pub host: String,
    pub port: u16,
}

/// One `[aliases.<name>]` table
///
/// Operation names are kept as strings here; they are checked when the
/// registry is built so that a bad entry is reported with its alias name.
#[derive(Debug, Clone, Deserialize)]
pub struct AliasConfig {
    pub pin: u32,
    pub allowed_operations: Vec<String>,
    #[serde(default)]
    pub validate: Option<ValueRule>,
}

impl Config {
    /// Load configuration from a TOML file
    ///
    /// # Arguments
    /// * `path` - Path to the TOML configuration file
    ///
    /// # Returns
    /// * `Ok(Config)` if the file was successfully loaded and parsed
    /// * `Err` if the file couldn't be read or the TOML is invalid
    ///
    /// # Example
    /// ```no_run
    /// let config = pin_gateway::Config::load("config/default.toml")?;
    /// # Ok::<(), anyhow::Error>(())
    /// ```
    pub fn load(path: &str) -> anyhow::Result<Self> {
        // Read the file contents as a string
        let content = fs::read_to_string(path)?;

        // Parse the TOML into our Config structure
        Self::parse(&content)
    }

    /// Parse configuration from TOML text
    pub fn parse(content: &str) -> anyhow::Result<Self> {
        // Alias tables are only deserialized here; they are checked when the
        // registry is built so errors can name the offending alias
        let config: Config = toml::from_str(content)?;

        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_full_config() {
        let config = Config::parse(
            r#"
            [api]
            host = "127.0.0.1"
            port = 3000

            [aliases.red_pin]
            pin = 17
            allowed_operations = ["pwmWrite"]
            validate = { kind = "dutyCycle" }

            [aliases.door_sensor]
            pin = 23
            allowed_operations = ["read"]
            "#,
        )
        .unwrap();

        assert_eq!(config.api.host, "127.0.0.1");
        assert_eq!(config.api.port, 3000);
        assert_eq!(config.aliases.len(), 2);

        let red = &config.aliases["red_pin"];
        assert_eq!(red.pin, 17);
        assert_eq!(red.allowed_operations, vec!["pwmWrite".to_string()]);
        assert_eq!(red.validate, Some(ValueRule::DutyCycle));
        assert_eq!(config.aliases["door_sensor"].validate, None);
    }

    #[test]
    fn test_aliases_default_to_empty() {
        let config = Config::parse("[api]\nhost = \"0.0.0.0\"\nport = 8080\n").unwrap();
        assert!(config.aliases.is_empty());
    }

    #[test]
    fn test_unknown_rule_kind_is_rejected() {
        let result = Config::parse(
            r#"
            [api]
            host = "0.0.0.0"
            port = 3000

            [aliases.red_pin]
            pin = 17
            allowed_operations = ["pwmWrite"]
            validate = { kind = "not a function" }
            "#,
        );
        assert!(result.is_err());
    }

    #[test]
    fn test_default_config_builds_registry() {
        let config = Config::load(DEFAULT_CONFIG_PATH).unwrap();
        let registry = crate::registry::AliasRegistry::from_config(&config.aliases).unwrap();

        assert_eq!(registry.names(), vec!["blue_pin", "green_pin", "power", "red_pin"]);
        assert_eq!(registry.get("red_pin").unwrap().pin(), 17);
    }

    #[test]
    fn test_load_missing_file_fails() {
        assert!(Config::load("does/not/exist.toml").is_err());
    }
}
