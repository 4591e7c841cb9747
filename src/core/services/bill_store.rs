//! Bill creation, including expansion of installment plans into one bill per month.

use std::sync::Arc;

use chrono::{Datelike, NaiveDate};
use rust_decimal::Decimal;
use tracing::{info, warn};
use uuid::Uuid;

use crate::core::services::payment::{PaymentCoordinator, PaymentOutcome};
use crate::core::time::Clock;
use crate::currency::validate_amount;
use crate::domain::bill::validate_due_day;
use crate::domain::common::{find_by_id, require_text};
use crate::domain::{Bill, BillKind, BillSchedule, NotificationHandles, MIN_INSTALLMENTS};
use crate::errors::{FinanceError, Result};
use crate::notifications::{
    cancel_all, schedule_for, NotificationScheduler, DEFAULT_REMINDER_DAYS_BEFORE,
};
use crate::storage::Collections;

/// Fields shared by every bill a creation call produces, already validated.
struct BillDraft {
    description: String,
    amount: Decimal,
    due_day: u8,
    category: String,
}

impl BillDraft {
    fn validate(description: &str, amount: Decimal, due_day: u8, category: &str) -> Result<Self> {
        Ok(Self {
            description: require_text("description", description)?,
            amount: validate_amount(amount)?,
            due_day: validate_due_day(due_day)?,
            category: require_text("category", category)?,
        })
    }
}

#[derive(Clone)]
pub struct BillStore {
    collections: Arc<Collections>,
    clock: Arc<dyn Clock>,
    scheduler: Arc<dyn NotificationScheduler>,
    payments: PaymentCoordinator,
    reminder_days_before: u32,
}

impl BillStore {
    pub fn new(
        collections: Arc<Collections>,
        clock: Arc<dyn Clock>,
        scheduler: Arc<dyn NotificationScheduler>,
    ) -> Self {
        let payments = PaymentCoordinator::new(collections.clone(), clock.clone(), scheduler.clone());
        Self {
            collections,
            clock,
            scheduler,
            payments,
            reminder_days_before: DEFAULT_REMINDER_DAYS_BEFORE,
        }
    }

    pub fn with_reminder_days_before(mut self, days: u32) -> Self {
        self.reminder_days_before = days;
        self
    }

    pub fn payments(&self) -> &PaymentCoordinator {
        &self.payments
    }

    /// Creates a fixed bill, or a one-time bill when `kind` is [`BillKind::OneTime`],
    /// in which case `due_date` is required and must fall on `due_day`. A fixed
    /// bill ignores `due_date`.
    pub fn create_fixed_or_one_time(
        &self,
        description: &str,
        amount: Decimal,
        due_day: u8,
        category: &str,
        kind: BillKind,
        due_date: Option<NaiveDate>,
    ) -> Result<Bill> {
        let draft = BillDraft::validate(description, amount, due_day, category)?;
        let schedule = match (kind, due_date) {
            (BillKind::Fixed, _) => BillSchedule::Fixed,
            (BillKind::OneTime, None) => {
                return Err(FinanceError::validation(
                    "one-time bills require a due date",
                ))
            }
            (BillKind::OneTime, Some(date)) => {
                if date.day() != u32::from(draft.due_day) {
                    return Err(FinanceError::validation(format!(
                        "due day {} does not match due date {date}",
                        draft.due_day
                    )));
                }
                BillSchedule::OneTime { due_date: date }
            }
            (BillKind::Installment, _) => {
                return Err(FinanceError::validation(
                    "installment bills are created as a plan",
                ))
            }
        };

        let bill = Bill {
            id: Uuid::new_v4(),
            description: draft.description,
            amount: draft.amount,
            due_day: draft.due_day,
            category: draft.category,
            created_at: self.clock.now(),
            is_paid: false,
            paid_at: None,
            schedule,
            notifications: NotificationHandles::default(),
        };
        let mut created = self.persist(vec![bill])?;
        created
            .pop()
            .ok_or_else(|| FinanceError::Storage("bill was not persisted".into()))
    }

    /// Expands a plan into `count` bills, one per consecutive month starting with
    /// the creation month. `amount` is charged per installment.
    pub fn create_installment_plan(
        &self,
        description: &str,
        amount: Decimal,
        due_day: u8,
        category: &str,
        count: u32,
    ) -> Result<Vec<Bill>> {
        let draft = BillDraft::validate(description, amount, due_day, category)?;
        if count < MIN_INSTALLMENTS {
            return Err(FinanceError::validation(format!(
                "an installment plan needs at least {MIN_INSTALLMENTS} installments, got {count}"
            )));
        }

        let created_at = self.clock.now();
        let plan_id = Uuid::new_v4();
        let bills = (1..=count)
            .map(|index| Bill {
                id: Uuid::new_v4(),
                description: format!("{} ({index}/{count})", draft.description),
                amount: draft.amount,
                due_day: draft.due_day,
                category: draft.category.clone(),
                created_at,
                is_paid: false,
                paid_at: None,
                schedule: BillSchedule::Installment {
                    plan_id,
                    index,
                    count,
                },
                notifications: NotificationHandles::default(),
            })
            .collect();
        self.persist(bills)
    }

    /// Pays the bill through the payment coordinator. Unknown ids and paid bills are no-ops.
    pub fn mark_paid(&self, id: Uuid) -> Result<PaymentOutcome> {
        self.payments.pay_by_id(id)
    }

    pub fn list(&self) -> Result<Vec<Bill>> {
        self.collections.load_bills()
    }

    pub fn get(&self, id: Uuid) -> Result<Option<Bill>> {
        let bills = self.list()?;
        Ok(find_by_id(&bills, id).cloned())
    }

    /// Case-insensitive description match; a blank query returns every bill.
    pub fn search(&self, query: &str) -> Result<Vec<Bill>> {
        let needle = query.trim().to_lowercase();
        let mut bills = self.list()?;
        if !needle.is_empty() {
            bills.retain(|bill| bill.description.to_lowercase().contains(&needle));
        }
        Ok(bills)
    }

    /// Schedules alerts for the new bills, then appends them in one write. Alerts are
    /// cancelled again when the write fails.
    fn persist(&self, mut bills: Vec<Bill>) -> Result<Vec<Bill>> {
        let now = self.clock.now();
        for bill in bills.iter_mut() {
            bill.notifications =
                schedule_for(bill, now, self.reminder_days_before, self.scheduler.as_ref());
        }

        let saved = {
            let _guard = self.collections.lock_bills()?;
            let mut all = self.collections.load_bills()?;
            all.extend(bills.iter().cloned());
            self.collections.save_bills(&all)
        };
        if let Err(err) = saved {
            for bill in &bills {
                cancel_all(&bill.notifications, self.scheduler.as_ref());
            }
            warn!(error = %err, count = bills.len(), "bill creation failed");
            return Err(err);
        }

        for bill in &bills {
            info!(id = %bill.id, kind = %bill.kind(), amount = %bill.amount, due_day = bill.due_day, "bill created");
        }
        Ok(bills)
    }
}
