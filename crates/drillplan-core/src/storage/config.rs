//! TOML-based tuning configuration.
//!
//! Stores the knobs of the engine:
//! - Interval growth constants (`[scheduling]`)
//! - Daily capacity and `add` defaults (`[planning]`)
//! - Artifact timing limits (`[time_tracking]`)
//!
//! Configuration is stored at `<journey root>/drillplan.toml`. A missing
//! file means defaults.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::scheduler::SchedulingPolicy;
use crate::tracker::TimeLimits;

pub const CONFIG_FILE: &str = "drillplan.toml";

/// Daily plan configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlanningConfig {
    /// Maximum problems in a day's plan before `add`
    #[serde(default = "default_daily_cap")]
    pub daily_cap: usize,
    /// Extra problems pulled by `add` when no count is given
    #[serde(default = "default_extra_count")]
    pub default_extra_count: usize,
    /// Days ahead listed under "upcoming" on the dashboard
    #[serde(default = "default_upcoming_days")]
    pub upcoming_days: u32,
    /// Move workspace files to the archive when a new day's plan is built
    #[serde(default = "default_true")]
    pub clear_workspace_on_plan: bool,
}

fn default_daily_cap() -> usize {
    6
}
fn default_extra_count() -> usize {
    3
}
fn default_upcoming_days() -> u32 {
    7
}
fn default_true() -> bool {
    true
}

impl Default for PlanningConfig {
    fn default() -> Self {
        Self {
            daily_cap: default_daily_cap(),
            default_extra_count: default_extra_count(),
            upcoming_days: default_upcoming_days(),
            clear_workspace_on_plan: true,
        }
    }
}

/// Engine configuration.
///
/// Serialized to/from TOML at `<root>/drillplan.toml`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub scheduling: SchedulingPolicy,
    #[serde(default)]
    pub planning: PlanningConfig,
    #[serde(default)]
    pub time_tracking: TimeLimits,
}

impl Config {
    fn get_json_value_by_path<'a>(
        root: &'a serde_json::Value,
        key: &str,
    ) -> Option<&'a serde_json::Value> {
        if key.is_empty() {
            return None;
        }

        let mut current = root;
        for part in key.split('.') {
            current = current.get(part)?;
        }
        Some(current)
    }

    fn set_json_value_by_path(
        root: &mut serde_json::Value,
        key: &str,
        value: &str,
    ) -> Result<(), ConfigError> {
        let unknown = || ConfigError::UnknownKey(key.to_string());
        let invalid = |message: String| ConfigError::InvalidValue {
            key: key.to_string(),
            message,
        };

        let mut parts = key.split('.').peekable();
        if parts.peek().is_none() || key.is_empty() {
            return Err(unknown());
        }

        let mut current = root;
        while let Some(part) = parts.next() {
            let is_leaf = parts.peek().is_none();
            if is_leaf {
                let obj = current.as_object_mut().ok_or_else(unknown)?;
                let existing = obj.get(part).ok_or_else(unknown)?;

                let new_value = match existing {
                    serde_json::Value::Bool(_) => serde_json::Value::Bool(
                        value.parse::<bool>().map_err(|e| invalid(e.to_string()))?,
                    ),
                    serde_json::Value::Number(_) => {
                        if let Ok(n) = value.parse::<u64>() {
                            serde_json::Value::Number(n.into())
                        } else if let Ok(n) = value.parse::<f64>() {
                            serde_json::Number::from_f64(n)
                                .map(serde_json::Value::Number)
                                .ok_or_else(|| invalid(format!("cannot parse '{value}' as number")))?
                        } else {
                            return Err(invalid(format!("cannot parse '{value}' as number")));
                        }
                    }
                    serde_json::Value::Object(_) | serde_json::Value::Array(_) => {
                        serde_json::from_str(value).map_err(|e| invalid(e.to_string()))?
                    }
                    _ => serde_json::Value::String(value.into()),
                };

                obj.insert(part.to_string(), new_value);
                return Ok(());
            }

            current = current.get_mut(part).ok_or_else(unknown)?;
        }

        Err(unknown())
    }

    pub fn path(root: &Path) -> PathBuf {
        root.join(CONFIG_FILE)
    }

    /// Load from `<root>/drillplan.toml`, or defaults if the file is absent.
    ///
    /// # Errors
    ///
    /// Returns an error if the file exists but cannot be read or parsed, or
    /// if its values fail validation.
    pub fn load(root: &Path) -> Result<Self, ConfigError> {
        let path = Self::path(root);
        let content = match std::fs::read_to_string(&path) {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                log::debug!("no {} found, using defaults", path.display());
                return Ok(Self::default());
            }
            Err(e) => {
                return Err(ConfigError::LoadFailed {
                    path,
                    message: e.to_string(),
                })
            }
        };
        let cfg: Config = toml::from_str(&content).map_err(|e| ConfigError::LoadFailed {
            path: path.clone(),
            message: e.to_string(),
        })?;
        cfg.validate()?;
        Ok(cfg)
    }

    /// Persist to disk.
    ///
    /// # Errors
    ///
    /// Returns an error if the config cannot be serialized or written to disk.
    pub fn save(&self, root: &Path) -> Result<(), ConfigError> {
        let path = Self::path(root);
        let content = toml::to_string_pretty(self).map_err(|e| ConfigError::SaveFailed {
            path: path.clone(),
            message: e.to_string(),
        })?;
        std::fs::write(&path, content).map_err(|e| ConfigError::SaveFailed {
            path,
            message: e.to_string(),
        })
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        self.scheduling.validate()?;
        self.time_tracking.validate()?;
        if self.planning.daily_cap == 0 {
            return Err(ConfigError::InvalidValue {
                key: "planning.daily_cap".into(),
                message: "must be at least 1".into(),
            });
        }
        Ok(())
    }

    /// Get a config value as string by dot-separated key.
    pub fn get(&self, key: &str) -> Option<String> {
        let json = serde_json::to_value(self).ok()?;
        let val = Self::get_json_value_by_path(&json, key)?;
        match val {
            serde_json::Value::String(s) => Some(s.clone()),
            other => Some(other.to_string()),
        }
    }

    /// Set a config value by key and validate the result.
    ///
    /// The caller decides when to [`save`](Self::save).
    ///
    /// # Errors
    ///
    /// Returns an error if the key is unknown, the value cannot be parsed,
    /// or the resulting config is invalid.
    pub fn set(&mut self, key: &str, value: &str) -> Result<(), ConfigError> {
        let invalid = |message: String| ConfigError::InvalidValue {
            key: key.to_string(),
            message,
        };
        let mut json = serde_json::to_value(&*self).map_err(|e| invalid(e.to_string()))?;
        Self::set_json_value_by_path(&mut json, key, value)?;
        let updated: Config = serde_json::from_value(json).map_err(|e| invalid(e.to_string()))?;
        updated.validate()?;
        *self = updated;
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
        assert_eq!(parsed.scheduling.good_multiplier, 1.8);
        assert_eq!(parsed.planning.daily_cap, 6);
    }

    #[test]
    fn partial_file_fills_defaults() {
        let parsed: Config = toml::from_str("[scheduling]\nseed_interval_days = 2\n").unwrap();
        assert_eq!(parsed.scheduling.seed_interval_days, 2);
        assert_eq!(parsed.scheduling.easy_multiplier, 2.5);
        assert_eq!(parsed.time_tracking, TimeLimits::default());
    }

    #[test]
    fn get_supports_dot_path_keys() {
        let cfg = Config::default();
        assert_eq!(cfg.get("planning.daily_cap").as_deref(), Some("6"));
        assert_eq!(cfg.get("scheduling.good_multiplier").as_deref(), Some("1.8"));
        assert!(cfg.get("planning.missing_key").is_none());
    }

    #[test]
    fn set_updates_nested_number() {
        let mut cfg = Config::default();
        cfg.set("scheduling.seed_interval_days", "4").unwrap();
        assert_eq!(cfg.scheduling.seed_interval_days, 4);
        cfg.set("scheduling.easy_multiplier", "3.0").unwrap();
        assert_eq!(cfg.scheduling.easy_multiplier, 3.0);
    }

    #[test]
    fn set_updates_nested_bool() {
        let mut cfg = Config::default();
        cfg.set("planning.clear_workspace_on_plan", "false").unwrap();
        assert!(!cfg.planning.clear_workspace_on_plan);
    }

    #[test]
    fn set_rejects_unknown_key() {
        let mut cfg = Config::default();
        let result = cfg.set("planning.nonexistent_key", "1");
        assert!(matches!(result, Err(ConfigError::UnknownKey(_))));
    }

    #[test]
    fn set_rejects_invalid_type() {
        let mut cfg = Config::default();
        let result = cfg.set("planning.clear_workspace_on_plan", "sometimes");
        assert!(matches!(result, Err(ConfigError::InvalidValue { .. })));
    }

    #[test]
    fn set_rejects_values_that_break_validation() {
        let mut cfg = Config::default();
        let result = cfg.set("scheduling.hard_multiplier", "9.0");
        assert!(result.is_err());
        assert_eq!(cfg.scheduling.hard_multiplier, 1.2);
    }

    #[test]
    fn set_rejects_scheduling_values_past_the_ceiling() {
        let mut cfg = Config::default();
        assert!(cfg.set("scheduling.easy_multiplier", "1e300").is_err());
        assert!(cfg.set("scheduling.max_interval_days", "4000000000").is_err());
        assert_eq!(cfg, Config::default());
        cfg.set("scheduling.max_interval_days", "36500").unwrap();
        assert_eq!(cfg.scheduling.max_interval_days, 36_500);
    }

    #[test]
    fn load_missing_file_gives_defaults() {
        let temp = tempfile::TempDir::new().unwrap();
        let cfg = Config::load(temp.path()).unwrap();
        assert_eq!(cfg, Config::default());
    }

    #[test]
    fn save_then_load() {
        let temp = tempfile::TempDir::new().unwrap();
        let mut cfg = Config::default();
        cfg.planning.daily_cap = 4;
        cfg.save(temp.path()).unwrap();
        assert_eq!(Config::load(temp.path()).unwrap().planning.daily_cap, 4);
    }

    #[test]
    fn load_rejects_garbage() {
        let temp = tempfile::TempDir::new().unwrap();
        std::fs::write(Config::path(temp.path()), "[scheduling\nnope").unwrap();
        assert!(matches!(
            Config::load(temp.path()),
            Err(ConfigError::LoadFailed { .. })
        ));
    }
}
