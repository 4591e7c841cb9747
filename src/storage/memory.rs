use std::{
    collections::HashMap,
    sync::{
        atomic::{AtomicBool, Ordering},
        Mutex,
    },
};

use crate::errors::{FinanceError, Result};

use super::{KeyValueStore, WriteOp};

/// In-process store. Writes can be made to fail on demand to exercise error paths.
#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: Mutex<HashMap<String, String>>,
    fail_writes: AtomicBool,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// While enabled, every [`KeyValueStore::apply`] fails without touching the data.
    pub fn fail_writes(&self, enabled: bool) {
        self.fail_writes.store(enabled, Ordering::SeqCst);
    }

    pub fn keys(&self) -> Vec<String> {
        let mut keys: Vec<String> = match self.entries.lock() {
            Ok(entries) => entries.keys().cloned().collect(),
            Err(poisoned) => poisoned.into_inner().keys().cloned().collect(),
        };
        keys.sort();
        keys
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>> {
        let entries = self
            .entries
            .lock()
            .map_err(|_| FinanceError::Storage("memory store lock poisoned".into()))?;
        Ok(entries.get(key).cloned())
    }

    fn apply(&self, ops: Vec<WriteOp>) -> Result<()> {
        if self.fail_writes.load(Ordering::SeqCst) {
            let keys: Vec<&str> = ops.iter().map(WriteOp::key).collect();
            return Err(FinanceError::storage(
                format!("failed to write {}", keys.join(", ")),
                "injected write failure",
            ));
        }
        let mut entries = self
            .entries
            .lock()
            .map_err(|_| FinanceError::Storage("memory store lock poisoned".into()))?;
        for op in ops {
            match op {
                WriteOp::Put { key, value } => {
                    entries.insert(key, value);
                }
                WriteOp::Delete { key } => {
                    entries.remove(&key);
                }
            }
        }
        Ok(())
    }
}
