use std::{fmt, str::FromStr};

use chrono::{DateTime, Datelike, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::currency::validate_amount;
use crate::domain::common::{require_text, Identifiable};
use crate::errors::{FinanceError, Result};

/// Smallest number of instances an installment plan may have.
pub const MIN_INSTALLMENTS: u32 = 2;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum BillKind {
    #[serde(rename = "fixed")]
    Fixed,
    #[serde(rename = "installment")]
    Installment,
    #[serde(rename = "one-time")]
    OneTime,
}

impl BillKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            BillKind::Fixed => "fixed",
            BillKind::Installment => "installment",
            BillKind::OneTime => "one-time",
        }
    }
}

impl fmt::Display for BillKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for BillKind {
    type Err = FinanceError;

    fn from_str(value: &str) -> Result<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "fixed" => Ok(BillKind::Fixed),
            "installment" => Ok(BillKind::Installment),
            "one-time" | "onetime" | "one_time" => Ok(BillKind::OneTime),
            other => Err(FinanceError::validation(format!("unknown bill kind `{other}`"))),
        }
    }
}

/// Kind-specific scheduling data. Fields that only make sense for one kind
/// live in that kind's variant.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "billKind")]
pub enum BillSchedule {
    /// Recurs every month from the creation month onward.
    #[serde(rename = "fixed")]
    Fixed,
    /// Tied to a single due date.
    #[serde(rename = "one-time")]
    OneTime {
        #[serde(rename = "dueDate")]
        due_date: NaiveDate,
    },
    /// Instance `index` (1-based) of a plan with `count` instances.
    #[serde(rename = "installment")]
    Installment {
        #[serde(rename = "planId")]
        plan_id: Uuid,
        #[serde(rename = "installmentIndex")]
        index: u32,
        #[serde(rename = "installmentCount")]
        count: u32,
    },
}

impl BillSchedule {
    pub fn kind(&self) -> BillKind {
        match self {
            BillSchedule::Fixed => BillKind::Fixed,
            BillSchedule::OneTime { .. } => BillKind::OneTime,
            BillSchedule::Installment { .. } => BillKind::Installment,
        }
    }
}

/// Opaque identifier handed out by a notification backend.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NotificationId(pub String);

impl NotificationId {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Notifications scheduled for a bill, kept so payment can cancel them.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NotificationHandles {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub due: Option<NotificationId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reminder: Option<NotificationId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub midnight: Option<NotificationId>,
}

impl NotificationHandles {
    pub fn is_empty(&self) -> bool {
        self.due.is_none() && self.reminder.is_none() && self.midnight.is_none()
    }

    pub fn ids(&self) -> impl Iterator<Item = &NotificationId> {
        [&self.due, &self.reminder, &self.midnight]
            .into_iter()
            .flatten()
    }
}

/// A scheduled obligation to pay. Only `is_paid`/`paid_at` change after creation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Bill {
    pub id: Uuid,
    pub description: String,
    pub amount: Decimal,
    pub due_day: u8,
    pub category: String,
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub is_paid: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub paid_at: Option<DateTime<Utc>>,
    #[serde(flatten)]
    pub schedule: BillSchedule,
    #[serde(default, skip_serializing_if = "NotificationHandles::is_empty")]
    pub notifications: NotificationHandles,
}

impl Bill {
    pub fn kind(&self) -> BillKind {
        self.schedule.kind()
    }

    /// Calendar date of `created_at`, the anchor for recurrence.
    pub fn created_on(&self) -> NaiveDate {
        self.created_at.date_naive()
    }

    /// `(index, count)` for installment instances.
    pub fn installment(&self) -> Option<(u32, u32)> {
        match self.schedule {
            BillSchedule::Installment { index, count, .. } => Some((index, count)),
            _ => None,
        }
    }

    pub fn due_date(&self) -> Option<NaiveDate> {
        match self.schedule {
            BillSchedule::OneTime { due_date } => Some(due_date),
            _ => None,
        }
    }

    /// Checks a stored or imported bill against the same rules creation applies.
    pub fn validate(&self) -> Result<()> {
        require_text("description", &self.description)?;
        require_text("category", &self.category)?;
        validate_amount(self.amount)?;
        validate_due_day(self.due_day)?;
        match self.schedule {
            BillSchedule::Fixed => {}
            BillSchedule::OneTime { due_date } => {
                if due_date.day() != u32::from(self.due_day) {
                    return Err(FinanceError::validation(format!(
                        "due day {} does not match due date {due_date}",
                        self.due_day
                    )));
                }
            }
            BillSchedule::Installment { index, count, .. } => {
                if count < MIN_INSTALLMENTS || index == 0 || index > count {
                    return Err(FinanceError::validation(format!(
                        "installment {index}/{count} is out of range"
                    )));
                }
            }
        }
        Ok(())
    }

    pub(crate) fn mark_paid(&mut self, at: DateTime<Utc>) {
        self.is_paid = true;
        self.paid_at = Some(at);
    }
}

impl Identifiable for Bill {
    fn id(&self) -> Uuid {
        self.id
    }
}

pub fn validate_due_day(day: u8) -> Result<u8> {
    if (1..=31).contains(&day) {
        Ok(day)
    } else {
        Err(FinanceError::validation(format!(
            "due day must be within 1-31, got {day}"
        )))
    }
}
