use dirs::home_dir;
use std::{
    env, fs,
    path::{Path, PathBuf},
};

use crate::errors::{FinanceError, Result};

const DEFAULT_DIR_NAME: &str = ".fina";
const DATA_FILE: &str = "fina.json";
const BACKUP_DIR: &str = "backups";
const EXPORT_DIR: &str = "exports";
const CONFIG_FILE: &str = "config.json";

/// Returns the application-specific data directory, defaulting to `~/.fina`.
pub fn app_data_dir() -> PathBuf {
    if let Some(custom) = env::var_os("FINA_HOME") {
        return PathBuf::from(custom);
    }
    home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(DEFAULT_DIR_NAME)
}

/// Path of the key-value document holding transactions, bills and preferences.
pub fn data_file_in(base: &Path) -> PathBuf {
    base.join(DATA_FILE)
}

/// Base directory for backup snapshots.
pub fn backups_dir_in(base: &Path) -> PathBuf {
    base.join(BACKUP_DIR)
}

pub fn exports_dir_in(base: &Path) -> PathBuf {
    base.join(EXPORT_DIR)
}

pub fn config_file_in(base: &Path) -> PathBuf {
    base.join(CONFIG_FILE)
}

pub fn ensure_dir(path: &Path) -> Result<()> {
    fs::create_dir_all(path)
        .map_err(|err| FinanceError::storage(format!("creating {}", path.display()), err))
}
