//! Append-only record of income and expenses.

use std::sync::Arc;

use rust_decimal::Decimal;
use tracing::info;
use uuid::Uuid;

use crate::core::time::Clock;
use crate::domain::common::find_by_id;
use crate::domain::{Balance, Transaction, TransactionFilter, TransactionKind};
use crate::errors::Result;
use crate::storage::Collections;

#[derive(Clone)]
pub struct LedgerStore {
    collections: Arc<Collections>,
    clock: Arc<dyn Clock>,
}

impl LedgerStore {
    pub fn new(collections: Arc<Collections>, clock: Arc<dyn Clock>) -> Self {
        Self { collections, clock }
    }

    /// Validates and persists a new transaction at the head of the collection.
    pub fn record(
        &self,
        description: &str,
        amount: Decimal,
        kind: TransactionKind,
        category: Option<&str>,
    ) -> Result<Transaction> {
        let transaction = Transaction::new(description, amount, kind, category, self.clock.now())?;
        let _guard = self.collections.lock_transactions()?;
        let mut transactions = self.collections.load_transactions()?;
        transactions.insert(0, transaction.clone());
        self.collections.save_transactions(&transactions)?;
        info!(id = %transaction.id, kind = %transaction.kind, amount = %transaction.amount, "transaction recorded");
        Ok(transaction)
    }

    /// Most recent first.
    pub fn list(&self) -> Result<Vec<Transaction>> {
        self.collections.load_transactions()
    }

    pub fn list_filtered(&self, filter: TransactionFilter) -> Result<Vec<Transaction>> {
        let mut transactions = self.list()?;
        transactions.retain(|txn| filter.matches(txn));
        Ok(transactions)
    }

    pub fn get(&self, id: Uuid) -> Result<Option<Transaction>> {
        let transactions = self.list()?;
        Ok(find_by_id(&transactions, id).cloned())
    }

    pub fn aggregate_balance(&self) -> Result<Balance> {
        Ok(Balance::aggregate(&self.list()?))
    }
}
