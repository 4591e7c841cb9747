use std::{
    fs,
    path::{Path, PathBuf},
};

use serde::{Deserialize, Serialize};

use crate::backup::DEFAULT_RETENTION;
use crate::core::projection::DEFAULT_URGENT_WINDOW_DAYS;
use crate::currency::LocaleConfig;
use crate::errors::{FinanceError, Result};
use crate::notifications::DEFAULT_REMINDER_DAYS_BEFORE;
use crate::storage::json_backend::replace_file;
use crate::utils::paths::{app_data_dir, config_file_in, data_file_in, ensure_dir};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub locale: String,
    pub currency: String,
    pub urgent_window_days: u32,
    pub reminder_days_before: u32,
    pub backup_retention: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data_file: Option<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            locale: "pt-BR".into(),
            currency: "BRL".into(),
            urgent_window_days: DEFAULT_URGENT_WINDOW_DAYS,
            reminder_days_before: DEFAULT_REMINDER_DAYS_BEFORE,
            backup_retention: DEFAULT_RETENTION,
            data_file: None,
        }
    }
}

impl Config {
    pub fn locale_config(&self) -> LocaleConfig {
        LocaleConfig::for_tag(&self.locale, &self.currency)
    }
}

pub struct ConfigManager {
    base: PathBuf,
    path: PathBuf,
}

impl ConfigManager {
    pub fn new() -> Result<Self> {
        Self::with_base_dir(app_data_dir())
    }

    pub fn with_base_dir(base: impl Into<PathBuf>) -> Result<Self> {
        let base = base.into();
        ensure_dir(&base)?;
        Ok(Self {
            path: config_file_in(&base),
            base,
        })
    }

    pub fn load(&self) -> Result<Config> {
        if !self.path.exists() {
            return Ok(Config::default());
        }
        let data = fs::read_to_string(&self.path)
            .map_err(|err| FinanceError::Config(format!("reading {}: {err}", self.path.display())))?;
        serde_json::from_str(&data)
            .map_err(|err| FinanceError::Config(format!("parsing {}: {err}", self.path.display())))
    }

    pub fn save(&self, config: &Config) -> Result<()> {
        let json = serde_json::to_string_pretty(config)?;
        replace_file(&self.path, &json)
    }

    /// Data file named by the config, relative paths resolved against the base dir.
    pub fn data_file(&self, config: &Config) -> PathBuf {
        match &config.data_file {
            Some(path) if path.is_absolute() => path.clone(),
            Some(path) => self.base.join(path),
            None => data_file_in(&self.base),
        }
    }

    pub fn base_dir(&self) -> &Path {
        &self.base
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}
