//! TOML-based application configuration.
//!
//! Stores the tunable tracker policy:
//! - Freeze quota per period and the streak grace window
//! - Week-start day and time zone for all calendar arithmetic
//! - Padding and cap of the historical calendar span
//!
//! Configuration is stored at `~/.config/learning-journey/config.toml`.

use std::path::{Path, PathBuf};

use chrono::{Duration, Weekday};
use serde::{Deserialize, Serialize};

use super::data_dir;
use crate::calendar::{parse_weekday, Calendar, SpanSettings, TimeZonePolicy, MAX_SPAN_MONTHS};
use crate::error::{ConfigError, Result};
use crate::tracker::{TrackerSettings, FREEZES_PER_WEEK};

/// Streak and quota configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrackerConfig {
    /// Freezes per week. The product rule is 2; raising it loosens streaks.
    #[serde(default = "default_freeze_limit")]
    pub freeze_limit: u32,
    #[serde(default = "default_streak_grace_hours")]
    pub streak_grace_hours: u32,
}

/// Calendar policy configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CalendarConfig {
    /// Weekday name, e.g. "sunday" or "monday".
    #[serde(default = "default_week_start")]
    pub week_start: String,
    /// "local", "utc", or a fixed offset like "+03:00".
    #[serde(default = "default_timezone")]
    pub timezone: String,
}

/// Application configuration.
///
/// Serialized to/from TOML at `~/.config/learning-journey/config.toml`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub tracker: TrackerConfig,
    #[serde(default)]
    pub calendar: CalendarConfig,
    #[serde(default)]
    pub span: SpanSettings,
}

// Default functions
fn default_freeze_limit() -> u32 {
    FREEZES_PER_WEEK
}
fn default_streak_grace_hours() -> u32 {
    32
}
fn default_week_start() -> String {
    "sunday".into()
}
fn default_timezone() -> String {
    "local".into()
}

impl Default for TrackerConfig {
    fn default() -> Self {
        Self {
            freeze_limit: default_freeze_limit(),
            streak_grace_hours: default_streak_grace_hours(),
        }
    }
}

impl Default for CalendarConfig {
    fn default() -> Self {
        Self {
            week_start: default_week_start(),
            timezone: default_timezone(),
        }
    }
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

            current = current.get_mut(part).ok_or_else(unknown)?;
        }

        Err(unknown())
    }

    fn path() -> Result<PathBuf> {
        Ok(data_dir()?.join("config.toml"))
    }

    /// Load from disk or return default.
    ///
    /// # Errors
    ///
    /// Returns an error if the config file exists but cannot be parsed,
    /// or if the default config cannot be written to disk.
    pub fn load() -> Result<Self> {
        Self::load_from(Self::path()?)
    }

    /// Load from an explicit path, writing the defaults there if the file
    /// does not exist yet.
    ///
    /// # Errors
    ///
    /// Returns an error if the file exists but cannot be parsed, or the
    /// defaults cannot be written.
    pub fn load_from(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        match std::fs::read_to_string(path) {
            Ok(content) => {
                let cfg: Config = toml::from_str(&content).map_err(|e| ConfigError::LoadFailed {
                    path: path.to_path_buf(),
                    message: e.to_string(),
                })?;
                Ok(cfg)
            }
            Err(_) => {
                let cfg = Self::default();
                cfg.save_to(path)?;
                Ok(cfg)
            }
        }
    }

    /// Persist to disk.
    ///
    /// # Errors
    ///
    /// Returns an error if the config cannot be serialized or written to disk.
    pub fn save(&self) -> Result<()> {
        self.save_to(Self::path()?)
    }

    /// Persist to an explicit path.
    ///
    /// # Errors
    ///
    /// Returns an error if the config cannot be serialized or written.
    pub fn save_to(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        let save_failed = |message: String| ConfigError::SaveFailed {
            path: path.to_path_buf(),
            message,
        };
        let content = toml::to_string_pretty(self).map_err(|e| save_failed(e.to_string()))?;
        std::fs::write(path, content).map_err(|e| save_failed(e.to_string()))?;
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

    /// Set a config value by key without saving.
    ///
    /// Calendar values are validated here so a typo never reaches the file.
    ///
    /// # Errors
    ///
    /// Returns an error if the key is unknown or the value cannot be parsed.
    pub fn apply(&mut self, key: &str, value: &str) -> Result<()> {
        match key {
            "calendar.week_start" if parse_weekday(value).is_none() => {
                return Err(ConfigError::InvalidValue {
                    key: key.into(),
                    message: format!("'{value}' is not a weekday"),
                }
                .into());
            }
            "calendar.timezone" if TimeZonePolicy::parse(value).is_none() => {
                return Err(ConfigError::InvalidValue {
                    key: key.into(),
                    message: format!("'{value}' is not 'local', 'utc' or an offset like +03:00"),
                }
                .into());
            }
            "span.months_before" | "span.months_after" | "span.max_months"
                if !matches!(value.parse::<u32>(), Ok(n) if n <= MAX_SPAN_MONTHS) =>
            {
                return Err(ConfigError::InvalidValue {
                    key: key.into(),
                    message: format!("'{value}' is not a month count up to {MAX_SPAN_MONTHS}"),
                }
                .into());
            }
            _ => {}
        }

        let mut json = serde_json::to_value(&*self)?;
        Self::set_json_value_by_path(&mut json, key, value)?;
        *self = serde_json::from_value(json)?;
        Ok(())
    }

    /// Set a config value by key and save. Returns error if key is unknown.
    ///
    /// # Errors
    ///
    /// Returns an error if the key is unknown, the value cannot be parsed,
    /// or the config cannot be saved.
    pub fn set(&mut self, key: &str, value: &str) -> Result<()> {
        self.apply(key, value)?;
        self.save()
    }

    /// Build the calendar policy. Unparseable values fall back to the
    /// defaults (Sunday, local time).
    pub fn calendar(&self) -> Calendar {
        let week_start = parse_weekday(&self.calendar.week_start).unwrap_or_else(|| {
            tracing::warn!(
                value = self.calendar.week_start.as_str(),
                "invalid calendar.week_start; using sunday"
            );
            Weekday::Sun
        });
        let timezone = TimeZonePolicy::parse(&self.calendar.timezone).unwrap_or_else(|| {
            tracing::warn!(
                value = self.calendar.timezone.as_str(),
                "invalid calendar.timezone; using local"
            );
            TimeZonePolicy::Local
        });
        Calendar::new(week_start, timezone)
    }

    /// Engine settings described by this config.
    pub fn tracker_settings(&self) -> TrackerSettings {
        TrackerSettings {
            freeze_limit: self.tracker.freeze_limit,
            streak_grace: Duration::hours(i64::from(self.tracker.streak_grace_hours)),
            calendar: self.calendar(),
            span: self.span,
        }
    }

    /// Load from disk, returning default on error.
    /// This is a convenience method that never fails.
    pub fn load_or_default() -> Self {
        Self::load().unwrap_or_default()
    }
}
