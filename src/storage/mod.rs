//! Key-value persistence. Values are opaque text blobs (JSON for the built-in
//! collections); backends only guarantee that one [`KeyValueStore::apply`]
//! call is observed entirely or not at all.

pub mod collections;
pub mod json_backend;
pub mod memory;

use crate::errors::Result;

pub use collections::Collections;
pub use json_backend::JsonFileStore;
pub use memory::MemoryStore;

pub const TRANSACTIONS_KEY: &str = "transactions";
pub const BILLS_KEY: &str = "bills";
pub const THEME_KEY: &str = "theme";

/// A single mutation inside an atomic batch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WriteOp {
    Put { key: String, value: String },
    Delete { key: String },
}

impl WriteOp {
    pub fn put(key: &str, value: impl Into<String>) -> Self {
        WriteOp::Put {
            key: key.to_string(),
            value: value.into(),
        }
    }

    pub fn delete(key: &str) -> Self {
        WriteOp::Delete {
            key: key.to_string(),
        }
    }

    pub fn key(&self) -> &str {
        match self {
            WriteOp::Put { key, .. } | WriteOp::Delete { key } => key,
        }
    }
}

/// Abstraction over key-value persistence backends.
pub trait KeyValueStore: Send + Sync {
    fn get(&self, key: &str) -> Result<Option<String>>;

    /// Applies every operation as one all-or-nothing unit.
    fn apply(&self, ops: Vec<WriteOp>) -> Result<()>;

    fn set(&self, key: &str, value: &str) -> Result<()> {
        self.apply(vec![WriteOp::put(key, value)])
    }

    fn remove(&self, key: &str) -> Result<()> {
        self.apply(vec![WriteOp::delete(key)])
    }

    fn set_many(&self, entries: &[(&str, String)]) -> Result<()> {
        self.apply(
            entries
                .iter()
                .map(|(key, value)| WriteOp::put(key, value.clone()))
                .collect(),
        )
    }
}
