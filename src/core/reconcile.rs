//! Load-time consistency check between bills and payment transactions.

use std::collections::{HashMap, HashSet};

use serde::Serialize;
use tracing::{info, warn};
use uuid::Uuid;

use crate::domain::{Bill, Transaction};
use crate::errors::Result;
use crate::storage::Collections;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReconcileReport {
    /// Unpaid bills that a payment transaction referenced; now marked paid.
    pub repaired_bills: Vec<Uuid>,
    /// Problems that are reported but not fixed automatically.
    pub warnings: Vec<String>,
}

impl ReconcileReport {
    pub fn is_clean(&self) -> bool {
        self.repaired_bills.is_empty() && self.warnings.is_empty()
    }
}

/// Marks bills paid when a linked payment exists and reports the remaining mismatches.
pub fn reconcile(collections: &Collections) -> Result<ReconcileReport> {
    let _guards = collections.lock_all()?;
    let mut bills = collections.load_bills()?;
    let transactions = collections.load_transactions()?;
    let report = repair(&mut bills, &transactions);
    if !report.repaired_bills.is_empty() {
        collections.save_bills(&bills)?;
        info!(repaired = report.repaired_bills.len(), "bills repaired from payment transactions");
    }
    for warning in &report.warnings {
        warn!("{warning}");
    }
    Ok(report)
}

/// Applies the repair to `bills` in place and returns what was found.
pub fn repair(bills: &mut [Bill], transactions: &[Transaction]) -> ReconcileReport {
    let mut payments: HashMap<Uuid, Vec<&Transaction>> = HashMap::new();
    for txn in transactions {
        if let Some(bill_id) = txn.bill_id {
            payments.entry(bill_id).or_default().push(txn);
        }
    }

    let mut report = ReconcileReport::default();
    let known: HashSet<Uuid> = bills.iter().map(|bill| bill.id).collect();
    for bill in bills.iter_mut() {
        match payments.get(&bill.id) {
            Some(linked) => {
                if !bill.is_paid {
                    // Transactions are newest first, so the last one is the original payment.
                    if let Some(first) = linked.last() {
                        bill.mark_paid(first.occurred_at);
                        report.repaired_bills.push(bill.id);
                    }
                }
                if linked.len() > 1 {
                    report.warnings.push(format!(
                        "bill {} ({}) has {} payment transactions",
                        bill.id,
                        bill.description,
                        linked.len()
                    ));
                }
            }
            None if bill.is_paid => report.warnings.push(format!(
                "bill {} ({}) is paid but has no payment transaction",
                bill.id, bill.description
            )),
            None => {}
        }
    }

    for txn in transactions {
        if let Some(bill_id) = txn.bill_id.filter(|id| !known.contains(id)) {
            report.warnings.push(format!(
                "transaction {} references unknown bill {}",
                txn.id, bill_id
            ));
        }
    }
    report
}
