//! Bill reminders. The crate only decides *when* alerts should fire; delivering
//! them is left to a [`NotificationScheduler`] supplied by the host.

use std::sync::{
    atomic::{AtomicU64, Ordering},
    Mutex,
};

use chrono::{DateTime, Duration, NaiveDate, NaiveTime, TimeZone, Utc};
use serde::Serialize;
use tracing::{debug, warn};

use crate::core::projection::instance_period;
use crate::domain::{Bill, BillSchedule, MonthPeriod, NotificationHandles, NotificationId};

/// Default number of days before the due date the reminder fires.
pub const DEFAULT_REMINDER_DAYS_BEFORE: u32 = 1;

const DUE_ALERT_HOUR: u32 = 9;
const REMINDER_ALERT_HOUR: u32 = 18;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum NotificationKind {
    Due,
    Reminder,
    Midnight,
}

/// Delivers alerts. Implementations return `None` when an alert could not be scheduled,
/// for example when the user denied permission.
pub trait NotificationScheduler: Send + Sync {
    fn schedule_due_notification(&self, bill: &Bill, at: DateTime<Utc>) -> Option<NotificationId>;

    fn schedule_reminder_notification(
        &self,
        bill: &Bill,
        days_before: u32,
        at: DateTime<Utc>,
    ) -> Option<NotificationId>;

    fn schedule_midnight_notification(
        &self,
        bill: &Bill,
        at: DateTime<Utc>,
    ) -> Option<NotificationId>;

    fn cancel_notification(&self, id: &NotificationId);
}

/// When each alert for a bill should fire. Alerts already in the past are omitted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NotificationPlan {
    pub due_date: NaiveDate,
    pub due_at: Option<DateTime<Utc>>,
    pub midnight_at: Option<DateTime<Utc>>,
    pub reminder_at: Option<DateTime<Utc>>,
    pub days_before: u32,
}

impl NotificationPlan {
    pub fn for_bill(bill: &Bill, now: DateTime<Utc>, days_before: u32) -> Option<Self> {
        let due_date = next_due_date(bill, now)?;
        let future = |at: DateTime<Utc>| (at > now).then_some(at);
        let reminder_at = due_date
            .checked_sub_signed(Duration::days(days_before as i64))
            .filter(|_| days_before > 0)
            .and_then(|day| future(at_hour(day, REMINDER_ALERT_HOUR)));
        let plan = Self {
            due_date,
            due_at: future(at_hour(due_date, DUE_ALERT_HOUR)),
            midnight_at: future(at_hour(due_date, 0)),
            reminder_at,
            days_before,
        };
        plan.has_alerts().then_some(plan)
    }

    pub fn has_alerts(&self) -> bool {
        self.due_at.is_some() || self.midnight_at.is_some() || self.reminder_at.is_some()
    }

    pub fn schedule(&self, bill: &Bill, scheduler: &dyn NotificationScheduler) -> NotificationHandles {
        NotificationHandles {
            due: self
                .due_at
                .and_then(|at| scheduler.schedule_due_notification(bill, at)),
            reminder: self.reminder_at.and_then(|at| {
                scheduler.schedule_reminder_notification(bill, self.days_before, at)
            }),
            midnight: self
                .midnight_at
                .and_then(|at| scheduler.schedule_midnight_notification(bill, at)),
        }
    }
}

/// Next date the bill falls due on or after `now`'s day. Fixed bills roll into the
/// following month once the current month's due day has started.
pub fn next_due_date(bill: &Bill, now: DateTime<Utc>) -> Option<NaiveDate> {
    match bill.schedule {
        BillSchedule::Fixed => {
            let current = MonthPeriod::from_date(now.date_naive())
                .max(MonthPeriod::from_date(bill.created_on()));
            let candidate = current.due_date(bill.due_day);
            if at_hour(candidate, 0) > now {
                Some(candidate)
            } else {
                Some(current.next().due_date(bill.due_day))
            }
        }
        BillSchedule::OneTime { due_date } => {
            (due_date >= now.date_naive()).then_some(due_date)
        }
        BillSchedule::Installment { .. } => instance_period(bill)
            .map(|period| period.due_date(bill.due_day))
            .filter(|date| *date >= now.date_naive()),
    }
}

/// Plans and schedules every alert for `bill`, returning the handles obtained.
pub fn schedule_for(
    bill: &Bill,
    now: DateTime<Utc>,
    days_before: u32,
    scheduler: &dyn NotificationScheduler,
) -> NotificationHandles {
    match NotificationPlan::for_bill(bill, now, days_before) {
        Some(plan) => {
            let handles = plan.schedule(bill, scheduler);
            debug!(bill = %bill.id, due = %plan.due_date, scheduled = handles.ids().count(), "notifications scheduled");
            handles
        }
        None => NotificationHandles::default(),
    }
}

pub fn cancel_all(handles: &NotificationHandles, scheduler: &dyn NotificationScheduler) {
    for id in handles.ids() {
        scheduler.cancel_notification(id);
    }
}

fn at_hour(date: NaiveDate, hour: u32) -> DateTime<Utc> {
    let time = NaiveTime::from_hms_opt(hour, 0, 0).unwrap_or(NaiveTime::MIN);
    Utc.from_utc_datetime(&date.and_time(time))
}

/// Scheduler used when the host has no notification support.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopScheduler;

impl NotificationScheduler for NoopScheduler {
    fn schedule_due_notification(&self, bill: &Bill, at: DateTime<Utc>) -> Option<NotificationId> {
        debug!(bill = %bill.id, %at, "due notification skipped");
        None
    }

    fn schedule_reminder_notification(
        &self,
        bill: &Bill,
        days_before: u32,
        at: DateTime<Utc>,
    ) -> Option<NotificationId> {
        debug!(bill = %bill.id, days_before, %at, "reminder notification skipped");
        None
    }

    fn schedule_midnight_notification(
        &self,
        bill: &Bill,
        at: DateTime<Utc>,
    ) -> Option<NotificationId> {
        debug!(bill = %bill.id, %at, "midnight notification skipped");
        None
    }

    fn cancel_notification(&self, _id: &NotificationId) {}
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScheduledNotification {
    pub id: NotificationId,
    pub bill_id: uuid::Uuid,
    pub kind: NotificationKind,
    pub at: DateTime<Utc>,
    pub title: String,
}

/// In-memory scheduler that remembers what it was asked to do.
#[derive(Debug)]
pub struct RecordingScheduler {
    scheduled: Mutex<Vec<ScheduledNotification>>,
    cancelled: Mutex<Vec<NotificationId>>,
    counter: AtomicU64,
    granted: bool,
}

impl Default for RecordingScheduler {
    fn default() -> Self {
        Self::new()
    }
}

impl RecordingScheduler {
    pub fn new() -> Self {
        Self {
            scheduled: Mutex::new(Vec::new()),
            cancelled: Mutex::new(Vec::new()),
            counter: AtomicU64::new(0),
            granted: true,
        }
    }

    /// A scheduler whose permission was denied; every request yields `None`.
    pub fn denied() -> Self {
        Self {
            granted: false,
            ..Self::new()
        }
    }

    /// Notifications scheduled and not cancelled since.
    pub fn pending(&self) -> Vec<ScheduledNotification> {
        let cancelled = self.cancelled();
        self.scheduled
            .lock()
            .map(|items| {
                items
                    .iter()
                    .filter(|item| !cancelled.contains(&item.id))
                    .cloned()
                    .collect()
            })
            .unwrap_or_default()
    }

    pub fn cancelled(&self) -> Vec<NotificationId> {
        self.cancelled
            .lock()
            .map(|items| items.clone())
            .unwrap_or_default()
    }

    fn record(&self, bill: &Bill, kind: NotificationKind, at: DateTime<Utc>) -> Option<NotificationId> {
        if !self.granted {
            return None;
        }
        let seq = self.counter.fetch_add(1, Ordering::SeqCst) + 1;
        let id = NotificationId::new(format!("notif-{seq}"));
        let title = match kind {
            NotificationKind::Due => format!("{} is due today", bill.description),
            NotificationKind::Reminder => format!("{} is due soon", bill.description),
            NotificationKind::Midnight => format!("{} is due from today", bill.description),
        };
        match self.scheduled.lock() {
            Ok(mut items) => items.push(ScheduledNotification {
                id: id.clone(),
                bill_id: bill.id,
                kind,
                at,
                title,
            }),
            Err(_) => {
                warn!("recording scheduler lock poisoned");
                return None;
            }
        }
        Some(id)
    }
}

impl NotificationScheduler for RecordingScheduler {
    fn schedule_due_notification(&self, bill: &Bill, at: DateTime<Utc>) -> Option<NotificationId> {
        self.record(bill, NotificationKind::Due, at)
    }

    fn schedule_reminder_notification(
        &self,
        bill: &Bill,
        _days_before: u32,
        at: DateTime<Utc>,
    ) -> Option<NotificationId> {
        self.record(bill, NotificationKind::Reminder, at)
    }

    fn schedule_midnight_notification(
        &self,
        bill: &Bill,
        at: DateTime<Utc>,
    ) -> Option<NotificationId> {
        self.record(bill, NotificationKind::Midnight, at)
    }

    fn cancel_notification(&self, id: &NotificationId) {
        if let Ok(mut cancelled) = self.cancelled.lock() {
            cancelled.push(id.clone());
        }
    }
}
