use std::sync::{Arc, Mutex, MutexGuard};

use serde::{de::DeserializeOwned, Serialize};

use crate::domain::{Bill, Transaction};
use crate::errors::{FinanceError, Result};

use super::{KeyValueStore, WriteOp, BILLS_KEY, TRANSACTIONS_KEY};

/// Typed access to the persisted collections.
///
/// Each collection has its own mutex guarding its read-modify-write cycle.
/// Callers that need both take the bills lock first, then the transactions lock.
pub struct Collections {
    storage: Arc<dyn KeyValueStore>,
    bills_lock: Mutex<()>,
    transactions_lock: Mutex<()>,
}

pub type Guard<'a> = MutexGuard<'a, ()>;

impl Collections {
    pub fn new(storage: Arc<dyn KeyValueStore>) -> Self {
        Self {
            storage,
            bills_lock: Mutex::new(()),
            transactions_lock: Mutex::new(()),
        }
    }

    pub fn storage(&self) -> &dyn KeyValueStore {
        self.storage.as_ref()
    }

    pub fn lock_bills(&self) -> Result<Guard<'_>> {
        self.bills_lock
            .lock()
            .map_err(|_| FinanceError::Storage("bills lock poisoned".into()))
    }

    pub fn lock_transactions(&self) -> Result<Guard<'_>> {
        self.transactions_lock
            .lock()
            .map_err(|_| FinanceError::Storage("transactions lock poisoned".into()))
    }

    /// Takes both locks in the canonical order.
    pub fn lock_all(&self) -> Result<(Guard<'_>, Guard<'_>)> {
        let bills = self.lock_bills()?;
        let transactions = self.lock_transactions()?;
        Ok((bills, transactions))
    }

    pub fn load_transactions(&self) -> Result<Vec<Transaction>> {
        self.load(TRANSACTIONS_KEY)
    }

    pub fn load_bills(&self) -> Result<Vec<Bill>> {
        self.load(BILLS_KEY)
    }

    pub fn save_transactions(&self, transactions: &[Transaction]) -> Result<()> {
        self.storage
            .apply(vec![put(TRANSACTIONS_KEY, transactions)?])
    }

    pub fn save_bills(&self, bills: &[Bill]) -> Result<()> {
        self.storage.apply(vec![put(BILLS_KEY, bills)?])
    }

    /// Replaces both collections in a single atomic write.
    pub fn save_both(&self, bills: &[Bill], transactions: &[Transaction]) -> Result<()> {
        self.storage.apply(vec![
            put(BILLS_KEY, bills)?,
            put(TRANSACTIONS_KEY, transactions)?,
        ])
    }

    /// Removes both collections in a single atomic write.
    pub fn clear(&self) -> Result<()> {
        self.storage.apply(vec![
            WriteOp::delete(BILLS_KEY),
            WriteOp::delete(TRANSACTIONS_KEY),
        ])
    }

    fn load<T: DeserializeOwned>(&self, key: &str) -> Result<Vec<T>> {
        match self.storage.get(key)? {
            Some(raw) if !raw.trim().is_empty() => serde_json::from_str(&raw)
                .map_err(|err| FinanceError::storage(format!("decoding `{key}`"), err)),
            _ => Ok(Vec::new()),
        }
    }
}

fn put<T: Serialize>(key: &str, items: &[T]) -> Result<WriteOp> {
    let json = serde_json::to_string(items)
        .map_err(|err| FinanceError::storage(format!("encoding `{key}`"), err))?;
    Ok(WriteOp::put(key, json))
}
