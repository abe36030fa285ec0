//! Configuration schema (quarry.toml)

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Raw setting value as parsed from TOML
pub use toml::Value as TomlValue;

/// SQL dialect a warehouse client speaks
///
/// The string form is stable: upstream SQL generation keys its
/// dialect-specific rules on it.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AdapterType {
    /// StarRocks (MySQL wire protocol)
    #[default]
    Starrocks,
}

impl AdapterType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Starrocks => "starrocks",
        }
    }
}

impl std::fmt::Display for AdapterType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for AdapterType {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "starrocks" => Ok(Self::Starrocks),
            other => Err(ConfigError::Invalid(format!(
                "Unsupported warehouse type '{}'. Supported: starrocks",
                other
            ))),
        }
    }
}

/// Warehouse connection configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct WarehouseConfig {
    /// Warehouse type
    #[serde(rename = "type", default)]
    pub warehouse_type: AdapterType,

    /// Connection settings (warehouse-specific)
    #[serde(flatten)]
    pub settings: HashMap<String, TomlValue>,
}

impl WarehouseConfig {
    /// String setting, `None` when absent or not a string
    pub fn get_str(&self, key: &str) -> Option<&str> {
        self.settings.get(key).and_then(|v| v.as_str())
    }

    /// Integer setting; integers written as strings are accepted
    pub fn get_int(&self, key: &str) -> Result<Option<i64>, ConfigError> {
        match self.settings.get(key) {
            None => Ok(None),
            Some(TomlValue::Integer(i)) => Ok(Some(*i)),
            Some(TomlValue::String(s)) => s.trim().parse().map(Some).map_err(|_| {
                ConfigError::Invalid(format!("'{}' must be an integer, got '{}'", key, s))
            }),
            Some(other) => Err(ConfigError::Invalid(format!(
                "'{}' must be an integer, got {}",
                key,
                other.type_str()
            ))),
        }
    }

    /// Set a string setting, replacing any previous value
    pub fn set_str(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.settings.insert(key.into(), TomlValue::String(value.into()));
    }
}

/// Main configuration structure
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Config {
    /// Warehouse connection configuration
    #[serde(default)]
    pub warehouse: Option<WarehouseConfig>,
}

impl Config {
    /// Load config from TOML file
    pub fn from_file(path: &std::path::Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)
            .map_err(|e| ConfigError::IoError(e.to_string()))?;

        Self::from_toml(&contents)
    }

    /// Load config from TOML string
    pub fn from_toml(toml: &str) -> Result<Self, ConfigError> {
        toml::from_str(toml)
            .map_err(|e| ConfigError::ParseError(e.to_string()))
    }

    /// Save config to TOML file
    pub fn save_to_file(&self, path: &std::path::Path) -> Result<(), ConfigError> {
        let toml = toml::to_string_pretty(self)
            .map_err(|e| ConfigError::SerializeError(e.to_string()))?;

        std::fs::write(path, toml)
            .map_err(|e| ConfigError::IoError(e.to_string()))?;

        Ok(())
    }
}

/// Config error types
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    IoError(String),

    #[error("Parse error: {0}")]
    ParseError(String),

    #[error("Serialize error: {0}")]
    SerializeError(String),

    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"
[warehouse]
type = "starrocks"
host = "fe.internal"
port = 9030
user = "analyst"
password = "secret"
catalog = "hive_catalog"
"#;

    #[test]
    fn default_config() {
        let config = Config::default();
        assert!(config.warehouse.is_none());
    }

    #[test]
    fn parse_warehouse_section() {
        let config = Config::from_toml(SAMPLE).unwrap();
        let warehouse = config.warehouse.unwrap();

        assert_eq!(warehouse.warehouse_type, AdapterType::Starrocks);
        assert_eq!(warehouse.get_str("host"), Some("fe.internal"));
        assert_eq!(warehouse.get_int("port").unwrap(), Some(9030));
        assert_eq!(warehouse.get_str("catalog"), Some("hive_catalog"));
        assert_eq!(warehouse.get_str("schema"), None);
    }

    #[test]
    fn port_as_string_is_accepted() {
        let mut warehouse = WarehouseConfig::default();
        warehouse.set_str("port", "9031");
        assert_eq!(warehouse.get_int("port").unwrap(), Some(9031));

        warehouse.set_str("port", "abc");
        assert!(matches!(warehouse.get_int("port"), Err(ConfigError::Invalid(_))));
    }

    #[test]
    fn unknown_warehouse_type_is_rejected() {
        let result = Config::from_toml("[warehouse]\ntype = \"oracle\"\n");
        assert!(matches!(result, Err(ConfigError::ParseError(_))));
        assert!("oracle".parse::<AdapterType>().is_err());
        assert_eq!("StarRocks".parse::<AdapterType>().unwrap(), AdapterType::Starrocks);
    }

    #[test]
    fn config_toml_roundtrip() {
        let config = Config::from_toml(SAMPLE).unwrap();
        let toml = toml::to_string(&config).unwrap();
        let parsed = Config::from_toml(&toml).unwrap();
        assert_eq!(config, parsed);
    }

    #[test]
    fn missing_type_defaults_to_starrocks() {
        assert_eq!(AdapterType::default(), AdapterType::Starrocks);

        let config = Config::from_toml("[warehouse]\nhost = \"fe\"\n").unwrap();
        let warehouse = config.warehouse.unwrap();
        assert_eq!(warehouse.warehouse_type, AdapterType::Starrocks);
        assert_eq!(WarehouseConfig::default().warehouse_type, AdapterType::Starrocks);
        assert!(WarehouseConfig::default().settings.is_empty());
    }

    #[test]
    fn adapter_type_string_is_stable() {
        assert_eq!(AdapterType::Starrocks.to_string(), "starrocks");
        assert_eq!(serde_json::to_string(&AdapterType::Starrocks).unwrap(), "\"starrocks\"");
    }
}
