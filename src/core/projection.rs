//! Month projection: which bill instances belong to a calendar month and how
//! urgent each one is relative to a reference date.
//!
//! Everything here is pure. "Today" is always passed in, never read from a clock.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::Serialize;

use crate::domain::{Bill, BillSchedule, MonthPeriod};
use crate::errors::Result;

/// Bills due within this many days of today are flagged as urgent.
pub const DEFAULT_URGENT_WINDOW_DAYS: u32 = 3;

/// Derived due-status of a projected bill.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "camelCase")]
pub enum DueStatus {
    Paid,
    DueToday,
    Overdue { days: u32 },
    /// Due within the urgent window.
    DueSoon { days: u32 },
    Upcoming { days: u32 },
    /// The projected month is not the current one.
    DueDay { day: u8 },
}

/// Presentation hint for a status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum Urgency {
    Settled,
    Critical,
    Warning,
    Normal,
    Neutral,
}

impl DueStatus {
    pub fn label(&self) -> String {
        match self {
            DueStatus::Paid => "Paid".into(),
            DueStatus::DueToday => "Due today".into(),
            DueStatus::Overdue { .. } => "Overdue".into(),
            DueStatus::DueSoon { days } | DueStatus::Upcoming { days } => {
                format!("Due in {days} days")
            }
            DueStatus::DueDay { day } => format!("Due day {day}"),
        }
    }

    pub fn urgency(&self) -> Urgency {
        match self {
            DueStatus::Paid => Urgency::Settled,
            DueStatus::DueToday | DueStatus::Overdue { .. } => Urgency::Critical,
            DueStatus::DueSoon { .. } => Urgency::Warning,
            DueStatus::Upcoming { .. } => Urgency::Normal,
            DueStatus::DueDay { .. } => Urgency::Neutral,
        }
    }
}

/// A bill instance placed in a specific month.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectedBill<'a> {
    pub bill: &'a Bill,
    pub period: MonthPeriod,
    pub due_date: NaiveDate,
    pub days_until_due: i64,
    pub status: DueStatus,
}

/// Money totals over one projected month.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MonthTotals {
    pub total: Decimal,
    pub paid: Decimal,
    pub open: Decimal,
    pub overdue: Decimal,
}

impl MonthTotals {
    pub fn from_projection(projection: &[ProjectedBill<'_>]) -> Self {
        let mut totals = MonthTotals::default();
        for item in projection {
            totals.total += item.bill.amount;
            match item.status {
                DueStatus::Paid => totals.paid += item.bill.amount,
                DueStatus::Overdue { .. } => {
                    totals.open += item.bill.amount;
                    totals.overdue += item.bill.amount;
                }
                _ => totals.open += item.bill.amount,
            }
        }
        totals
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProjectionEngine {
    urgent_window_days: u32,
}

impl Default for ProjectionEngine {
    fn default() -> Self {
        Self::new(DEFAULT_URGENT_WINDOW_DAYS)
    }
}

impl ProjectionEngine {
    pub fn new(urgent_window_days: u32) -> Self {
        Self { urgent_window_days }
    }

    pub fn urgent_window_days(&self) -> u32 {
        self.urgent_window_days
    }

    /// Member bills of `period`, in input order, each with its status as seen on `today`.
    pub fn project<'a>(
        &self,
        bills: &'a [Bill],
        period: MonthPeriod,
        today: NaiveDate,
    ) -> Vec<ProjectedBill<'a>> {
        bills
            .iter()
            .filter(|bill| is_member(bill, period))
            .map(|bill| {
                let due_date = period.due_date(bill.due_day);
                let days_until_due = days_until_due(due_date, today);
                ProjectedBill {
                    bill,
                    period,
                    due_date,
                    days_until_due,
                    status: self.classify(bill, period, days_until_due, today),
                }
            })
            .collect()
    }

    /// Status of `bill` in `period` without checking membership.
    pub fn status(&self, bill: &Bill, period: MonthPeriod, today: NaiveDate) -> DueStatus {
        let days = days_until_due(period.due_date(bill.due_day), today);
        self.classify(bill, period, days, today)
    }

    /// Unpaid members of the month containing `today`, in input order, at most `limit`.
    pub fn upcoming_unpaid<'a>(
        &self,
        bills: &'a [Bill],
        today: NaiveDate,
        limit: usize,
    ) -> Vec<ProjectedBill<'a>> {
        self.project(bills, MonthPeriod::from_date(today), today)
            .into_iter()
            .filter(|item| !item.bill.is_paid)
            .take(limit)
            .collect()
    }

    fn classify(
        &self,
        bill: &Bill,
        period: MonthPeriod,
        days_until_due: i64,
        today: NaiveDate,
    ) -> DueStatus {
        if bill.is_paid {
            return DueStatus::Paid;
        }
        if period != MonthPeriod::from_date(today) {
            return DueStatus::DueDay { day: bill.due_day };
        }
        match days_until_due {
            0 => DueStatus::DueToday,
            d if d < 0 => DueStatus::Overdue {
                days: d.unsigned_abs().min(u32::MAX as u64) as u32,
            },
            d if d <= self.urgent_window_days as i64 => DueStatus::DueSoon { days: d as u32 },
            d => DueStatus::Upcoming {
                days: d.min(u32::MAX as i64) as u32,
            },
        }
    }
}

/// Projects `bills` onto the zero-based (`month0`, `year`) using the default urgent window.
pub fn project<'a>(
    bills: &'a [Bill],
    month0: u32,
    year: i32,
    today: NaiveDate,
) -> Result<Vec<ProjectedBill<'a>>> {
    let period = MonthPeriod::new(year, month0)?;
    Ok(ProjectionEngine::default().project(bills, period, today))
}

/// Whole calendar days from `today` to `due_date`; negative once the date has passed.
pub fn days_until_due(due_date: NaiveDate, today: NaiveDate) -> i64 {
    (due_date - today).num_days()
}

/// The single month an instance bill belongs to. `None` for fixed bills, which recur.
pub fn instance_period(bill: &Bill) -> Option<MonthPeriod> {
    match bill.schedule {
        BillSchedule::Fixed => None,
        BillSchedule::OneTime { due_date } => Some(MonthPeriod::from_date(due_date)),
        BillSchedule::Installment { index, .. } => {
            let steps = index.saturating_sub(1).min(i32::MAX as u32) as i32;
            Some(MonthPeriod::from_date(bill.created_on()).offset(steps))
        }
    }
}

/// Whether `bill` has an instance in `period`.
pub fn is_member(bill: &Bill, period: MonthPeriod) -> bool {
    match bill.schedule {
        BillSchedule::Fixed => period >= MonthPeriod::from_date(bill.created_on()),
        _ => instance_period(bill) == Some(period),
    }
}
