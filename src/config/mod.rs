use std::{
    env,
    fs::{self, File},
    io::Write,
    path::{Path, PathBuf},
};

use dirs::home_dir;
use serde::{Deserialize, Serialize};

use crate::currency::DateFormatStyle;
use crate::errors::ConfigError;
use crate::schedule::evaluator::{MAX_MATERIALIZED_OCCURRENCES, PENDING_WINDOW_DAYS};
use crate::schedule::MAX_REMINDER_DAYS;

const DEFAULT_DIR_NAME: &str = ".schedule_core";
const CONFIG_FILE: &str = "config.json";
const TMP_SUFFIX: &str = "tmp";

/// Returns the application data directory, defaulting to `~/.schedule_core`.
pub fn app_data_dir() -> PathBuf {
    if let Some(custom) = env::var_os("SCHEDULE_CORE_HOME") {
        return PathBuf::from(custom);
    }
    home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(DEFAULT_DIR_NAME)
}

/// User preferences for formatting and schedule evaluation.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Config {
    pub locale: String,
    pub currency: String,
    #[serde(default = "Config::default_date_format")]
    pub date_format: DateFormatStyle,
    /// Reminder lead time pre-filled for new schedules.
    #[serde(default)]
    pub default_reminder_days: u32,
    #[serde(default = "Config::default_pending_window_days")]
    pub pending_window_days: u32,
    #[serde(default = "Config::default_materialize_limit")]
    pub materialize_limit: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            locale: "en-US".into(),
            currency: "USD".into(),
            date_format: Self::default_date_format(),
            default_reminder_days: 0,
            pending_window_days: Self::default_pending_window_days(),
            materialize_limit: Self::default_materialize_limit(),
        }
    }
}

impl Config {
    fn default_date_format() -> DateFormatStyle {
        DateFormatStyle::Medium
    }

    fn default_pending_window_days() -> u32 {
        PENDING_WINDOW_DAYS
    }

    fn default_materialize_limit() -> usize {
        MAX_MATERIALIZED_OCCURRENCES
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.default_reminder_days > MAX_REMINDER_DAYS {
            return Err(ConfigError::Invalid(format!(
                "default_reminder_days must be at most {}, got {}",
                MAX_REMINDER_DAYS, self.default_reminder_days
            )));
        }
        if self.materialize_limit == 0 {
            return Err(ConfigError::Invalid(
                "materialize_limit must be at least 1".into(),
            ));
        }
        if self.currency.trim().is_empty() {
            return Err(ConfigError::Invalid("currency cannot be empty".into()));
        }
        Ok(())
    }
}

/// Handles persistence for [`Config`].
#[derive(Debug, Clone)]
pub struct ConfigManager {
    config_path: PathBuf,
}

impl ConfigManager {
    pub fn new(config_path: PathBuf) -> Self {
        Self { config_path }
    }

    /// Manager for the config file under [`app_data_dir`].
    pub fn from_default_location() -> Result<Self, ConfigError> {
        Self::with_base_dir(app_data_dir())
    }

    pub fn with_base_dir(base: PathBuf) -> Result<Self, ConfigError> {
        fs::create_dir_all(&base)?;
        Ok(Self::new(base.join(CONFIG_FILE)))
    }

    pub fn config_path(&self) -> &Path {
        &self.config_path
    }

    /// Loads the stored config, falling back to defaults when none exists.
    pub fn load(&self) -> Result<Config, ConfigError> {
        if !self.config_path.exists() {
            tracing::debug!(path = %self.config_path.display(), "no config file; using defaults");
            return Ok(Config::default());
        }
        let data = fs::read_to_string(&self.config_path)?;
        let config: Config = serde_json::from_str(&data)?;
        config.validate()?;
        Ok(config)
    }

    pub fn save(&self, config: &Config) -> Result<(), ConfigError> {
        config.validate()?;
        if let Some(parent) = self.config_path.parent() {
            fs::create_dir_all(parent)?;
        }
        let json = serde_json::to_string_pretty(config)?;
        let tmp = tmp_path(&self.config_path);
        write_atomic(&tmp, &json)?;
        fs::rename(&tmp, &self.config_path)?;
        tracing::debug!(path = %self.config_path.display(), "config saved");
        Ok(())
    }
}

fn tmp_path(path: &Path) -> PathBuf {
    let mut tmp = path.to_path_buf();
    let ext = match path.extension().and_then(|ext| ext.to_str()) {
        Some(existing) => format!("{}.{}", existing, TMP_SUFFIX),
        None => TMP_SUFFIX.to_string(),
    };
    tmp.set_extension(ext);
    tmp
}

fn write_atomic(path: &Path, data: &str) -> Result<(), ConfigError> {
    let mut file = File::create(path)?;
    file.write_all(data.as_bytes())?;
    file.flush()?;
    Ok(())
}
