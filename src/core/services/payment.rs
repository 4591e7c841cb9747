//! Paying a bill: the bill flips to paid and a linked expense is recorded
//! in the same write.

use std::sync::Arc;

use serde::Serialize;
use tracing::{debug, info};
use uuid::Uuid;

use crate::core::time::Clock;
use crate::domain::common::find_by_id_mut;
use crate::domain::{Bill, Transaction};
use crate::errors::Result;
use crate::notifications::{cancel_all, NotificationScheduler};
use crate::storage::Collections;

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "outcome", rename_all = "camelCase")]
pub enum PaymentOutcome {
    Paid { bill: Bill, transaction: Transaction },
    /// The bill was already paid; nothing changed.
    AlreadyPaid { bill: Bill },
    /// No bill with that id; nothing changed.
    UnknownBill { id: Uuid },
}

impl PaymentOutcome {
    pub fn bill(&self) -> Option<&Bill> {
        match self {
            PaymentOutcome::Paid { bill, .. } | PaymentOutcome::AlreadyPaid { bill } => Some(bill),
            PaymentOutcome::UnknownBill { .. } => None,
        }
    }

    pub fn transaction(&self) -> Option<&Transaction> {
        match self {
            PaymentOutcome::Paid { transaction, .. } => Some(transaction),
            _ => None,
        }
    }

    pub fn is_new_payment(&self) -> bool {
        matches!(self, PaymentOutcome::Paid { .. })
    }
}

#[derive(Clone)]
pub struct PaymentCoordinator {
    collections: Arc<Collections>,
    clock: Arc<dyn Clock>,
    scheduler: Arc<dyn NotificationScheduler>,
}

impl PaymentCoordinator {
    pub fn new(
        collections: Arc<Collections>,
        clock: Arc<dyn Clock>,
        scheduler: Arc<dyn NotificationScheduler>,
    ) -> Self {
        Self {
            collections,
            clock,
            scheduler,
        }
    }

    pub fn pay(&self, bill: &Bill) -> Result<PaymentOutcome> {
        self.pay_by_id(bill.id)
    }

    /// Marks the bill paid and records its expense atomically. Paying twice, or paying
    /// an id that does not exist, leaves both collections untouched.
    pub fn pay_by_id(&self, id: Uuid) -> Result<PaymentOutcome> {
        let now = self.clock.now();
        let (handles, outcome) = {
            let _guards = self.collections.lock_all()?;
            let mut bills = self.collections.load_bills()?;
            let Some(bill) = find_by_id_mut(&mut bills, id) else {
                debug!(bill = %id, "payment ignored for unknown bill");
                return Ok(PaymentOutcome::UnknownBill { id });
            };
            if bill.is_paid {
                debug!(bill = %id, "payment ignored for paid bill");
                return Ok(PaymentOutcome::AlreadyPaid { bill: bill.clone() });
            }

            let transaction = Transaction::for_bill_payment(bill, now);
            bill.mark_paid(now);
            let handles = std::mem::take(&mut bill.notifications);
            let paid = bill.clone();

            let mut transactions = self.collections.load_transactions()?;
            transactions.insert(0, transaction.clone());
            self.collections.save_both(&bills, &transactions)?;
            (
                handles,
                PaymentOutcome::Paid {
                    bill: paid,
                    transaction,
                },
            )
        };

        cancel_all(&handles, self.scheduler.as_ref());
        info!(bill = %id, cancelled = handles.ids().count(), "bill paid");
        Ok(outcome)
    }
}
