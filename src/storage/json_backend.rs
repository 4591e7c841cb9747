use std::{
    collections::BTreeMap,
    fs::{self, File},
    io::Write,
    path::{Path, PathBuf},
    sync::Mutex,
};

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::errors::{FinanceError, Result};
use crate::utils::paths::ensure_dir;

use super::{KeyValueStore, WriteOp};

const TMP_SUFFIX: &str = "tmp";

pub const STORE_SCHEMA_VERSION: u32 = 1;

#[derive(Debug, Default, Serialize, Deserialize)]
struct StoreDocument {
    #[serde(default)]
    schema_version: u32,
    #[serde(default)]
    entries: BTreeMap<String, String>,
}

/// Keeps every key in a single JSON document, replaced atomically on each write.
#[derive(Debug)]
pub struct JsonFileStore {
    path: PathBuf,
    lock: Mutex<()>,
}

impl JsonFileStore {
    pub fn new(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        if let Some(parent) = path.parent() {
            ensure_dir(parent)?;
        }
        Ok(Self {
            path,
            lock: Mutex::new(()),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn read_document(&self) -> Result<StoreDocument> {
        if !self.path.exists() {
            return Ok(StoreDocument {
                schema_version: STORE_SCHEMA_VERSION,
                entries: BTreeMap::new(),
            });
        }
        let data = fs::read_to_string(&self.path)
            .map_err(|err| FinanceError::storage(format!("reading {}", self.path.display()), err))?;
        let document: StoreDocument = serde_json::from_str(&data)
            .map_err(|err| FinanceError::storage(format!("parsing {}", self.path.display()), err))?;
        if document.schema_version > STORE_SCHEMA_VERSION {
            return Err(FinanceError::Storage(format!(
                "store `{}` is from a newer schema version ({} > {})",
                self.path.display(),
                document.schema_version,
                STORE_SCHEMA_VERSION
            )));
        }
        Ok(document)
    }

    fn write_document(&self, document: &StoreDocument) -> Result<()> {
        let json = serde_json::to_string_pretty(document)?;
        let tmp = tmp_path(&self.path);
        write_atomic(&tmp, &json)
            .map_err(|err| FinanceError::storage(format!("writing {}", tmp.display()), err))?;
        fs::rename(&tmp, &self.path)
            .map_err(|err| FinanceError::storage(format!("replacing {}", self.path.display()), err))?;
        Ok(())
    }
}

impl KeyValueStore for JsonFileStore {
    fn get(&self, key: &str) -> Result<Option<String>> {
        let _guard = self
            .lock
            .lock()
            .map_err(|_| FinanceError::Storage("json store lock poisoned".into()))?;
        let mut document = self.read_document()?;
        Ok(document.entries.remove(key))
    }

    fn apply(&self, ops: Vec<WriteOp>) -> Result<()> {
        let _guard = self
            .lock
            .lock()
            .map_err(|_| FinanceError::Storage("json store lock poisoned".into()))?;
        let mut document = self.read_document()?;
        let count = ops.len();
        for op in ops {
            match op {
                WriteOp::Put { key, value } => {
                    document.entries.insert(key, value);
                }
                WriteOp::Delete { key } => {
                    document.entries.remove(&key);
                }
            }
        }
        document.schema_version = STORE_SCHEMA_VERSION;
        self.write_document(&document)?;
        debug!(path = %self.path.display(), ops = count, "store document written");
        Ok(())
    }
}

pub(crate) fn tmp_path(path: &Path) -> PathBuf {
    let mut tmp = path.to_path_buf();
    let ext = match path.extension().and_then(|ext| ext.to_str()) {
        Some(existing) => format!("{}.{}", existing, TMP_SUFFIX),
        None => TMP_SUFFIX.to_string(),
    };
    tmp.set_extension(ext);
    tmp
}

pub(crate) fn write_atomic(path: &Path, data: &str) -> Result<()> {
    if let Some(parent) = path.parent() {
        ensure_dir(parent)?;
    }
    let mut file = File::create(path)?;
    file.write_all(data.as_bytes())?;
    file.flush()?;
    file.sync_all()?;
    Ok(())
}

/// Writes `data` to `path` through a sibling temporary file and a rename.
pub(crate) fn replace_file(path: &Path, data: &str) -> Result<()> {
    let tmp = tmp_path(path);
    write_atomic(&tmp, data)?;
    fs::rename(&tmp, path)?;
    Ok(())
}
