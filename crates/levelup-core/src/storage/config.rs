//! TOML-based engine configuration.
//!
//! Stores tuning that product owners change without a release:
//! - Daily completion caps
//! - Daily content sizes and repeat avoidance
//! - The bonus schedule
//! - An optional custom level table
//!
//! Configuration is stored at `~/.config/levelup/config.toml`.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use super::data_dir;
use crate::content::DedupPolicy;
use crate::daily_cap::{CapKind, DailyCapGate, DEFAULT_CHALLENGE_CAP, DEFAULT_QUIZ_CAP};
use crate::error::ConfigError;
use crate::level::{BonusSchedule, LevelCalculator, LevelTable, MAX_BONUS_PERCENT};

/// Per-day completion caps.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CapsConfig {
    #[serde(default = "default_challenge_cap")]
    pub challenges: u32,
    #[serde(default = "default_quiz_cap")]
    pub quiz: u32,
}

/// Daily content selection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContentConfig {
    #[serde(default)]
    pub daily_challenges: DedupPolicy,
    #[serde(default = "default_quiz_policy")]
    pub quiz: DedupPolicy,
}

/// Engine configuration.
///
/// Serialized to/from TOML at `~/.config/levelup/config.toml`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EngineConfig {
    #[serde(default)]
    pub caps: CapsConfig,
    #[serde(default)]
    pub content: ContentConfig,
    /// Bonus steps; independent of `levels` (see [`BonusSchedule`]).
    #[serde(default)]
    pub bonus: BonusSchedule,
    /// Custom level table; the standard table is used when absent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub levels: Option<LevelTable>,
}

fn default_challenge_cap() -> u32 {
    DEFAULT_CHALLENGE_CAP
}
fn default_quiz_cap() -> u32 {
    DEFAULT_QUIZ_CAP
}
fn default_quiz_policy() -> DedupPolicy {
    DedupPolicy {
        picks_per_refresh: 5,
        recent_window: 15,
        retain_on_reset: 5,
    }
}

impl Default for CapsConfig {
    fn default() -> Self {
        Self {
            challenges: default_challenge_cap(),
            quiz: default_quiz_cap(),
        }
    }
}

impl Default for ContentConfig {
    fn default() -> Self {
        Self {
            daily_challenges: DedupPolicy::default(),
            quiz: default_quiz_policy(),
        }
    }
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            caps: CapsConfig::default(),
            content: ContentConfig::default(),
            bonus: BonusSchedule::standard(),
            levels: None,
        }
    }
}

impl EngineConfig {
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
        let invalid = |message: String| ConfigError::InvalidValue {
            key: key.to_string(),
            message,
        };

        let mut parts = key.split('.').peekable();
        if key.is_empty() {
            return Err(invalid("config key is empty".into()));
        }

        let mut current = root;
        while let Some(part) = parts.next() {
            if parts.peek().is_none() {
                let obj = current
                    .as_object_mut()
                    .ok_or_else(|| invalid("unknown config key".into()))?;
                let existing = obj
                    .get(part)
                    .ok_or_else(|| invalid("unknown config key".into()))?;

                let new_value = match existing {
                    serde_json::Value::Bool(_) => serde_json::Value::Bool(
                        value.parse::<bool>().map_err(|e| invalid(e.to_string()))?,
                    ),
                    serde_json::Value::Number(_) => {
                        let n = value
                            .parse::<u64>()
                            .map_err(|_| invalid(format!("cannot parse '{value}' as number")))?;
                        serde_json::Value::Number(n.into())
                    }
                    serde_json::Value::Object(_) | serde_json::Value::Array(_) => {
                        serde_json::from_str(value).map_err(|e| invalid(e.to_string()))?
                    }
                    _ => serde_json::Value::String(value.into()),
                };

                obj.insert(part.to_string(), new_value);
                return Ok(());
            }

            current = current
                .get_mut(part)
                .ok_or_else(|| invalid("unknown config key".into()))?;
        }

        Err(invalid("unknown config key".into()))
    }

    fn path() -> Result<PathBuf, ConfigError> {
        let dir = data_dir().map_err(|e| ConfigError::LoadFailed {
            path: PathBuf::from("config.toml"),
            message: e.to_string(),
        })?;
        Ok(dir.join("config.toml"))
    }

    /// Load from the data directory, writing defaults when absent.
    ///
    /// # Errors
    ///
    /// Returns an error if the config file exists but cannot be parsed or
    /// validated, or if the default config cannot be written to disk.
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_from(&Self::path()?)
    }

    /// Load from `path`, writing defaults there when the file is absent.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        match std::fs::read_to_string(path) {
            Ok(content) => {
                let cfg: EngineConfig =
                    toml::from_str(&content).map_err(|e| ConfigError::LoadFailed {
                        path: path.to_path_buf(),
                        message: e.to_string(),
                    })?;
                cfg.validate()?;
                Ok(cfg)
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                let cfg = Self::default();
                cfg.save_to(path)?;
                Ok(cfg)
            }
            Err(e) => Err(ConfigError::LoadFailed {
                path: path.to_path_buf(),
                message: e.to_string(),
            }),
        }
    }

    /// Persist to the data directory.
    pub fn save(&self) -> Result<(), ConfigError> {
        self.save_to(&Self::path()?)
    }

    pub fn save_to(&self, path: &Path) -> Result<(), ConfigError> {
        let save_failed = |message: String| ConfigError::SaveFailed {
            path: path.to_path_buf(),
            message,
        };
        let content = toml::to_string_pretty(self).map_err(|e| save_failed(e.to_string()))?;
        std::fs::write(path, content).map_err(|e| save_failed(e.to_string()))
    }

    /// Check values that deserialize fine but make no sense.
    pub fn validate(&self) -> Result<(), ConfigError> {
        for (key, cap) in [("caps.challenges", self.caps.challenges), ("caps.quiz", self.caps.quiz)] {
            if cap == 0 {
                return Err(ConfigError::InvalidValue {
                    key: key.to_string(),
                    message: "cap must be at least 1".to_string(),
                });
            }
        }
        for (key, policy) in [
            ("content.daily_challenges", &self.content.daily_challenges),
            ("content.quiz", &self.content.quiz),
        ] {
            if policy.picks_per_refresh == 0 {
                return Err(ConfigError::InvalidValue {
                    key: format!("{key}.picks_per_refresh"),
                    message: "must draw at least one item".to_string(),
                });
            }
            if policy.retain_on_reset > policy.recent_window {
                return Err(ConfigError::InvalidValue {
                    key: format!("{key}.retain_on_reset"),
                    message: "cannot exceed recent_window".to_string(),
                });
            }
        }
        if let Some(step) = self.bonus.out_of_range_step() {
            return Err(ConfigError::InvalidValue {
                key: "bonus".to_string(),
                message: format!(
                    "level {} grants {}%, above the {MAX_BONUS_PERCENT}% limit",
                    step.min_level, step.percent
                ),
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

    /// Set a config value by key without saving. Returns error if the key is
    /// unknown or the result does not validate.
    pub fn set(&mut self, key: &str, value: &str) -> Result<(), ConfigError> {
        let invalid = |message: String| ConfigError::InvalidValue {
            key: key.to_string(),
            message,
        };
        let mut json = serde_json::to_value(&*self).map_err(|e| invalid(e.to_string()))?;
        Self::set_json_value_by_path(&mut json, key, value)?;
        let updated: EngineConfig =
            serde_json::from_value(json).map_err(|e| invalid(e.to_string()))?;
        updated.validate()?;
        *self = updated;
        Ok(())
    }

    pub fn level_table(&self) -> LevelTable {
        self.levels.clone().unwrap_or_default()
    }

    pub fn level_calculator(&self) -> LevelCalculator {
        LevelCalculator::new(self.level_table(), self.bonus.clone())
    }

    pub fn cap_gate(&self, kind: CapKind) -> DailyCapGate {
        match kind {
            CapKind::Challenges => DailyCapGate::new(kind, self.caps.challenges),
            CapKind::Quiz => DailyCapGate::new(kind, self.caps.quiz),
        }
    }
}
