//! Full-data snapshots: a versioned JSON document holding both collections,
//! plus a directory of timestamped snapshot files with retention.

use std::{
    collections::HashSet,
    fs,
    path::{Path, PathBuf},
    time::SystemTime,
};

use chrono::{DateTime, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::domain::{Bill, Transaction};
use crate::errors::{FinanceError, Result};
use crate::storage::json_backend::replace_file;
use crate::storage::{Collections, WriteOp, BILLS_KEY, TRANSACTIONS_KEY};
use crate::utils::paths::ensure_dir;

pub const BACKUP_VERSION: &str = "1.0";
pub const DEFAULT_RETENTION: usize = 5;

const BACKUP_PREFIX: &str = "fina_backup_";
const BACKUP_EXTENSION: &str = "json";
const BACKUP_TIMESTAMP_FORMAT: &str = "%Y%m%d_%H%M%S";
const TIMESTAMP_LEN: usize = 15;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BackupDocument {
    #[serde(default)]
    pub transactions: Vec<Transaction>,
    #[serde(default)]
    pub bills: Vec<Bill>,
    pub export_date: DateTime<Utc>,
    pub version: String,
}

impl BackupDocument {
    pub fn new(transactions: Vec<Transaction>, bills: Vec<Bill>, export_date: DateTime<Utc>) -> Self {
        Self {
            transactions,
            bills,
            export_date,
            version: BACKUP_VERSION.to_string(),
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.version != BACKUP_VERSION {
            return Err(FinanceError::validation(format!(
                "unsupported backup version `{}` (expected {BACKUP_VERSION})",
                self.version
            )));
        }
        let mut seen = HashSet::new();
        for bill in &self.bills {
            bill.validate()
                .map_err(|err| invalid_entry("bill", &bill.description, err))?;
            if !seen.insert(bill.id) {
                return Err(FinanceError::validation(format!(
                    "backup contains bill id {} more than once",
                    bill.id
                )));
            }
        }
        let mut seen = HashSet::new();
        for transaction in &self.transactions {
            transaction
                .validate()
                .map_err(|err| invalid_entry("transaction", &transaction.description, err))?;
            if !seen.insert(transaction.id) {
                return Err(FinanceError::validation(format!(
                    "backup contains transaction id {} more than once",
                    transaction.id
                )));
            }
        }
        Ok(())
    }

    pub fn to_json(&self) -> Result<String> {
        serde_json::to_string_pretty(self)
            .map_err(|err| FinanceError::storage("encoding backup", err))
    }

    /// Parses and validates a backup document.
    pub fn from_json(raw: &str) -> Result<Self> {
        let document: BackupDocument = serde_json::from_str(raw)
            .map_err(|err| FinanceError::validation(format!("invalid backup document: {err}")))?;
        document.validate()?;
        Ok(document)
    }
}

fn invalid_entry(kind: &str, description: &str, err: FinanceError) -> FinanceError {
    match err {
        FinanceError::Validation(reason) => {
            FinanceError::validation(format!("backup {kind} `{description}`: {reason}"))
        }
        other => other,
    }
}

/// Snapshots both collections.
pub fn export_backup(collections: &Collections, now: DateTime<Utc>) -> Result<BackupDocument> {
    let _guards = collections.lock_all()?;
    Ok(BackupDocument::new(
        collections.load_transactions()?,
        collections.load_bills()?,
        now,
    ))
}

/// Replaces both collections with the document's contents in one write.
/// Returns the bills that were replaced.
pub fn import_backup(collections: &Collections, document: &BackupDocument) -> Result<Vec<Bill>> {
    document.validate()?;
    let bills = serde_json::to_string(&document.bills)?;
    let transactions = serde_json::to_string(&document.transactions)?;
    let _guards = collections.lock_all()?;
    let replaced = collections.load_bills()?;
    collections.storage().apply(vec![
        WriteOp::put(BILLS_KEY, bills),
        WriteOp::put(TRANSACTIONS_KEY, transactions),
    ])?;
    info!(
        bills = document.bills.len(),
        transactions = document.transactions.len(),
        exported = %document.export_date,
        "backup imported"
    );
    Ok(replaced)
}

/// Directory of timestamped backup files, newest kept first.
#[derive(Debug, Clone)]
pub struct BackupManager {
    dir: PathBuf,
    retention: usize,
}

impl BackupManager {
    pub fn new(dir: impl Into<PathBuf>, retention: usize) -> Result<Self> {
        let dir = dir.into();
        ensure_dir(&dir)?;
        Ok(Self {
            dir,
            retention: retention.max(1),
        })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Writes `document` as a new backup file and prunes old ones. Returns the file name.
    pub fn create(&self, document: &BackupDocument, note: Option<&str>) -> Result<String> {
        let mut stem = format!(
            "{BACKUP_PREFIX}{}",
            document.export_date.format(BACKUP_TIMESTAMP_FORMAT)
        );
        if let Some(label) = sanitize_note(note) {
            stem.push('_');
            stem.push_str(&label);
        }
        let mut name = format!("{stem}.{BACKUP_EXTENSION}");
        let mut attempt = 1;
        while self.dir.join(&name).exists() {
            attempt += 1;
            name = format!("{stem}-{attempt}.{BACKUP_EXTENSION}");
        }

        replace_file(&self.dir.join(&name), &document.to_json()?)?;
        info!(backup = %name, "backup created");
        self.prune()?;
        Ok(name)
    }

    /// Backup file names, newest first.
    pub fn list(&self) -> Result<Vec<String>> {
        if !self.dir.exists() {
            return Ok(Vec::new());
        }
        let mut entries = Vec::new();
        for entry in fs::read_dir(&self.dir)? {
            let path = entry?.path();
            if path.extension().and_then(|ext| ext.to_str()) != Some(BACKUP_EXTENSION) {
                continue;
            }
            let Some(name) = path.file_name().and_then(|name| name.to_str()) else {
                continue;
            };
            if !name.starts_with(BACKUP_PREFIX) {
                continue;
            }
            let modified = fs::metadata(&path)
                .and_then(|meta| meta.modified())
                .unwrap_or(SystemTime::UNIX_EPOCH);
            entries.push((parse_timestamp(name), modified, name.to_string()));
        }
        entries.sort_by(|a, b| b.cmp(a));
        Ok(entries.into_iter().map(|(_, _, name)| name).collect())
    }

    pub fn load(&self, name: &str) -> Result<BackupDocument> {
        if name.contains(['/', '\\']) {
            return Err(FinanceError::validation(format!("invalid backup name `{name}`")));
        }
        let path = self.dir.join(name);
        if !path.exists() {
            return Err(FinanceError::NotFound(format!("backup `{name}`")));
        }
        read_from_path(&path)
    }

    fn prune(&self) -> Result<()> {
        for name in self.list()?.iter().skip(self.retention) {
            if let Err(err) = fs::remove_file(self.dir.join(name)) {
                warn!(backup = %name, error = %err, "failed to prune backup");
            }
        }
        Ok(())
    }
}

/// Writes a backup document to an arbitrary path.
pub fn write_to_path(document: &BackupDocument, path: &Path) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        ensure_dir(parent)?;
    }
    replace_file(path, &document.to_json()?)
}

/// Reads and validates a backup document from an arbitrary path.
pub fn read_from_path(path: &Path) -> Result<BackupDocument> {
    let raw = fs::read_to_string(path)
        .map_err(|err| FinanceError::storage(format!("reading {}", path.display()), err))?;
    BackupDocument::from_json(&raw)
}

fn sanitize_note(note: Option<&str>) -> Option<String> {
    let raw = note?.trim();
    let mut sanitized = String::new();
    let mut last_dash = false;
    for ch in raw.chars() {
        if ch.is_ascii_alphanumeric() {
            sanitized.push(ch.to_ascii_lowercase());
            last_dash = false;
        } else if (ch.is_whitespace() || matches!(ch, '-' | '.' | '_')) && !sanitized.is_empty() && !last_dash {
            sanitized.push('-');
            last_dash = true;
        }
    }
    let trimmed = sanitized.trim_matches('-');
    (!trimmed.is_empty()).then(|| trimmed.to_string())
}

fn parse_timestamp(name: &str) -> Option<DateTime<Utc>> {
    let raw = name.strip_prefix(BACKUP_PREFIX)?.get(..TIMESTAMP_LEN)?;
    NaiveDateTime::parse_from_str(raw, BACKUP_TIMESTAMP_FORMAT)
        .ok()
        .map(|naive| DateTime::from_naive_utc_and_offset(naive, Utc))
}
