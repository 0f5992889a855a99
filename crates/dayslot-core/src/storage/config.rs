//! TOML-based application configuration.
//!
//! Stores scheduler preferences:
//! - Reference timezone for naive input and local-day boundaries
//! - Default placement algorithm
//! - Whether reports echo the algorithm name
//!
//! Configuration is stored at `~/.config/dayslot/config.toml`. The
//! `DAYSLOT_TIMEZONE` and `DAYSLOT_ALGO` environment variables override the
//! file.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use super::data_dir;
use crate::error::ConfigError;
use crate::scheduler::PlacementStrategy;
use crate::time::ReferenceZone;

pub const TIMEZONE_ENV: &str = "DAYSLOT_TIMEZONE";
pub const ALGO_ENV: &str = "DAYSLOT_ALGO";

/// Application configuration.
///
/// Serialized to/from TOML at `~/.config/dayslot/config.toml`.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Config {
    /// Zone for naive timestamps and local midnight (`+09:00`, `UTC`, IANA name).
    #[serde(default)]
    pub timezone: ReferenceZone,
    /// Algorithm used when a request does not name one.
    #[serde(default)]
    pub default_algorithm: PlacementStrategy,
    /// Include the `algo` field in reports.
    #[serde(default)]
    pub echo_algo: bool,
}

impl Config {
    fn set_json_value(
        root: &mut serde_json::Value,
        key: &str,
        value: &str,
    ) -> Result<(), ConfigError> {
        let obj = root
            .as_object_mut()
            .ok_or_else(|| ConfigError::UnknownKey(key.to_string()))?;
        let existing = obj
            .get(key)
            .ok_or_else(|| ConfigError::UnknownKey(key.to_string()))?;

        let new_value = match existing {
            serde_json::Value::Bool(_) => {
                let parsed = value.parse::<bool>().map_err(|e| ConfigError::InvalidValue {
                    key: key.to_string(),
                    message: e.to_string(),
                })?;
                serde_json::Value::Bool(parsed)
            }
            _ => serde_json::Value::String(value.into()),
        };

        obj.insert(key.to_string(), new_value);
        Ok(())
    }

    /// Default config file location.
    ///
    /// # Errors
    ///
    /// Returns an error if the config directory cannot be resolved or created.
    pub fn path() -> Result<PathBuf, ConfigError> {
        Ok(data_dir()?.join("config.toml"))
    }

    /// Load from the default location, or defaults if no file exists yet.
    ///
    /// # Errors
    ///
    /// Returns an error if the config file exists but cannot be read or parsed.
    pub fn load() -> Result<Self, ConfigError> {
        let path = Self::path()?;
        if !path.exists() {
            return Ok(Self::default());
        }
        Self::load_from(&path)
    }

    /// Load from an explicit path.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        let load_failed = |message: String| ConfigError::LoadFailed {
            path: path.to_path_buf(),
            message,
        };
        let content = std::fs::read_to_string(path).map_err(|e| load_failed(e.to_string()))?;
        toml::from_str(&content).map_err(|e| load_failed(e.to_string()))
    }

    /// Persist to the default location.
    ///
    /// # Errors
    ///
    /// Returns an error if the config cannot be serialized or written to disk.
    pub fn save(&self) -> Result<(), ConfigError> {
        self.save_to(&Self::path()?)
    }

    /// Persist to an explicit path.
    ///
    /// # Errors
    ///
    /// Returns an error if the config cannot be serialized or written to disk.
    pub fn save_to(&self, path: &Path) -> Result<(), ConfigError> {
        let save_failed = |message: String| ConfigError::SaveFailed {
            path: path.to_path_buf(),
            message,
        };
        let content = toml::to_string_pretty(self).map_err(|e| save_failed(e.to_string()))?;
        std::fs::write(path, content).map_err(|e| save_failed(e.to_string()))
    }

    /// Get a config value as string.
    pub fn get(&self, key: &str) -> Option<String> {
        let json = serde_json::to_value(self).ok()?;
        match json.get(key)? {
            serde_json::Value::String(s) => Some(s.clone()),
            other => Some(other.to_string()),
        }
    }

    /// Set a config value by key. The value is validated by re-reading the
    /// whole config.
    ///
    /// # Errors
    ///
    /// Returns an error if the key is unknown or the value does not parse.
    pub fn set(&mut self, key: &str, value: &str) -> Result<(), ConfigError> {
        let invalid = |message: String| ConfigError::InvalidValue {
            key: key.to_string(),
            message,
        };
        let mut json = serde_json::to_value(&*self).map_err(|e| invalid(e.to_string()))?;
        Self::set_json_value(&mut json, key, value)?;
        *self = serde_json::from_value(json).map_err(|e| invalid(e.to_string()))?;
        Ok(())
    }

    /// Apply `DAYSLOT_TIMEZONE` / `DAYSLOT_ALGO` overrides.
    ///
    /// # Errors
    ///
    /// Returns an error if an override is set to an invalid value.
    pub fn apply_env(&mut self) -> Result<(), ConfigError> {
        self.apply_overrides(
            std::env::var(TIMEZONE_ENV).ok().as_deref(),
            std::env::var(ALGO_ENV).ok().as_deref(),
        )
    }

    fn apply_overrides(
        &mut self,
        timezone: Option<&str>,
        algo: Option<&str>,
    ) -> Result<(), ConfigError> {
        if let Some(tz) = timezone {
            self.timezone = tz.parse().map_err(|e: crate::error::ValidationError| {
                ConfigError::InvalidValue {
                    key: TIMEZONE_ENV.to_string(),
                    message: e.to_string(),
                }
            })?;
        }
        if let Some(algo) = algo {
            self.default_algorithm =
                algo.parse().map_err(|e: crate::error::ValidationError| {
                    ConfigError::InvalidValue {
                        key: ALGO_ENV.to_string(),
                        message: e.to_string(),
                    }
                })?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_roundtrip() {
        let cfg = Config::default();
        let toml_str = toml::to_string_pretty(&cfg).unwrap();
        let parsed: Config = toml::from_str(&toml_str).unwrap();
        assert_eq!(parsed, cfg);
        assert!(toml_str.contains("timezone = \"+09:00\""));
    }

    #[test]
    fn missing_fields_take_defaults() {
        let parsed: Config = toml::from_str("timezone = \"Asia/Tokyo\"").unwrap();
        assert_eq!(parsed.timezone, ReferenceZone::Named(chrono_tz::Asia::Tokyo));
        assert_eq!(parsed.default_algorithm, PlacementStrategy::Greedy);
        assert!(!parsed.echo_algo);
    }

    #[test]
    fn set_validates_values() {
        let mut cfg = Config::default();
        cfg.set("default_algorithm", "compact").unwrap();
        assert_eq!(cfg.default_algorithm, PlacementStrategy::Compact);
        cfg.set("echo_algo", "true").unwrap();
        assert!(cfg.echo_algo);
        cfg.set("timezone", "UTC").unwrap();
        assert_eq!(cfg.get("timezone").as_deref(), Some("UTC"));

        assert!(matches!(
            cfg.set("default_algorithm", "optimal"),
            Err(ConfigError::InvalidValue { .. })
        ));
        assert!(matches!(cfg.set("echo_algo", "maybe"), Err(ConfigError::InvalidValue { .. })));
        assert!(matches!(cfg.set("theme", "dark"), Err(ConfigError::UnknownKey(_))));
        // Failed sets leave the config untouched.
        assert_eq!(cfg.default_algorithm, PlacementStrategy::Compact);
    }

    #[test]
    fn get_returns_string_for_all_types() {
        let cfg = Config::default();
        assert_eq!(cfg.get("timezone").as_deref(), Some("+09:00"));
        assert_eq!(cfg.get("default_algorithm").as_deref(), Some("greedy"));
        assert_eq!(cfg.get("echo_algo").as_deref(), Some("false"));
        assert_eq!(cfg.get("nope"), None);
    }

    #[test]
    fn save_and_load_explicit_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        let mut cfg = Config::default();
        cfg.set("timezone", "America/New_York").unwrap();
        cfg.save_to(&path).unwrap();

        let loaded = Config::load_from(&path).unwrap();
        assert_eq!(loaded, cfg);
    }

    #[test]
    fn load_reports_parse_failures() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "timezone = \"Nowhere/Special\"").unwrap();
        assert!(matches!(
            Config::load_from(&path),
            Err(ConfigError::LoadFailed { .. })
        ));
    }

    #[test]
    fn overrides_replace_file_values() {
        let mut cfg = Config::default();
        cfg.apply_overrides(Some("UTC"), Some("compact")).unwrap();
        assert_eq!(cfg.timezone, ReferenceZone::utc());
        assert_eq!(cfg.default_algorithm, PlacementStrategy::Compact);

        assert!(cfg.apply_overrides(Some("+25:00"), None).is_err());
    }
}
