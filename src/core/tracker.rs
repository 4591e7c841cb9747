//! Entry point bundling the stores, clock, notification scheduler and config.

use std::{fmt, str::FromStr, sync::Arc};

use chrono::NaiveDate;
use tracing::info;
use uuid::Uuid;

use crate::backup::{self, BackupDocument};
use crate::config::Config;
use crate::core::projection::{MonthTotals, ProjectedBill, ProjectionEngine};
use crate::core::reconcile::{reconcile, ReconcileReport};
use crate::core::services::{BillStore, LedgerStore, PaymentCoordinator, PaymentOutcome};
use crate::core::time::{Clock, SystemClock};
use crate::domain::{Balance, Bill, MonthPeriod};
use crate::errors::{FinanceError, Result};
use crate::export::{export_csv, CsvExport};
use crate::notifications::{cancel_all, NoopScheduler, NotificationScheduler};
use crate::storage::{Collections, KeyValueStore, MemoryStore, THEME_KEY};

/// Bills shown on the dashboard.
pub const DASHBOARD_UPCOMING_LIMIT: usize = 5;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Theme {
    #[default]
    Dark,
    Light,
}

impl Theme {
    pub fn as_str(&self) -> &'static str {
        match self {
            Theme::Dark => "dark",
            Theme::Light => "light",
        }
    }

    pub fn toggled(self) -> Self {
        match self {
            Theme::Dark => Theme::Light,
            Theme::Light => Theme::Dark,
        }
    }
}

impl fmt::Display for Theme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Theme {
    type Err = FinanceError;

    fn from_str(value: &str) -> Result<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "dark" => Ok(Theme::Dark),
            "light" => Ok(Theme::Light),
            other => Err(FinanceError::validation(format!("unknown theme `{other}`"))),
        }
    }
}

pub struct FinanceTracker {
    collections: Arc<Collections>,
    clock: Arc<dyn Clock>,
    scheduler: Arc<dyn NotificationScheduler>,
    ledger: LedgerStore,
    bills: BillStore,
    engine: ProjectionEngine,
    config: Config,
    startup_report: ReconcileReport,
}

impl FinanceTracker {
    /// Wires the services over `storage` and runs the consistency repair.
    pub fn open(
        storage: Arc<dyn KeyValueStore>,
        clock: Arc<dyn Clock>,
        scheduler: Arc<dyn NotificationScheduler>,
        config: Config,
    ) -> Result<Self> {
        let collections = Arc::new(Collections::new(storage));
        let startup_report = reconcile(&collections)?;
        let ledger = LedgerStore::new(collections.clone(), clock.clone());
        let bills = BillStore::new(collections.clone(), clock.clone(), scheduler.clone())
            .with_reminder_days_before(config.reminder_days_before);
        info!(
            repaired = startup_report.repaired_bills.len(),
            warnings = startup_report.warnings.len(),
            "finance tracker opened"
        );
        Ok(Self {
            collections,
            clock,
            scheduler,
            ledger,
            bills,
            engine: ProjectionEngine::new(config.urgent_window_days),
            config,
            startup_report,
        })
    }

    /// Volatile tracker with the system clock and no notifications.
    pub fn in_memory() -> Result<Self> {
        Self::open(
            Arc::new(MemoryStore::new()),
            Arc::new(SystemClock),
            Arc::new(NoopScheduler),
            Config::default(),
        )
    }

    pub fn ledger(&self) -> &LedgerStore {
        &self.ledger
    }

    pub fn bills(&self) -> &BillStore {
        &self.bills
    }

    pub fn payments(&self) -> &PaymentCoordinator {
        self.bills.payments()
    }

    pub fn engine(&self) -> &ProjectionEngine {
        &self.engine
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn startup_report(&self) -> &ReconcileReport {
        &self.startup_report
    }

    pub fn today(&self) -> NaiveDate {
        self.clock.today()
    }

    pub fn current_period(&self) -> MonthPeriod {
        MonthPeriod::from_date(self.today())
    }

    pub fn balance(&self) -> Result<Balance> {
        self.ledger.aggregate_balance()
    }

    pub fn pay(&self, bill_id: Uuid) -> Result<PaymentOutcome> {
        self.bills.mark_paid(bill_id)
    }

    /// Projects `bills` onto `period` as seen today.
    pub fn project<'a>(&self, bills: &'a [Bill], period: MonthPeriod) -> Vec<ProjectedBill<'a>> {
        self.engine.project(bills, period, self.today())
    }

    pub fn month_totals(&self, period: MonthPeriod) -> Result<MonthTotals> {
        let bills = self.bills.list()?;
        Ok(MonthTotals::from_projection(&self.project(&bills, period)))
    }

    pub fn upcoming<'a>(&self, bills: &'a [Bill], limit: usize) -> Vec<ProjectedBill<'a>> {
        self.engine.upcoming_unpaid(bills, self.today(), limit)
    }

    pub fn theme(&self) -> Result<Theme> {
        match self.collections.storage().get(THEME_KEY)? {
            Some(raw) => raw.parse().or_else(|_| Ok(Theme::default())),
            None => Ok(Theme::default()),
        }
    }

    pub fn set_theme(&self, theme: Theme) -> Result<()> {
        self.collections.storage().set(THEME_KEY, theme.as_str())
    }

    pub fn toggle_theme(&self) -> Result<Theme> {
        let next = self.theme()?.toggled();
        self.set_theme(next)?;
        Ok(next)
    }

    /// Removes every transaction and bill, cancelling outstanding bill alerts.
    pub fn clear_all(&self) -> Result<()> {
        let bills = {
            let _guards = self.collections.lock_all()?;
            let bills = self.collections.load_bills()?;
            self.collections.clear()?;
            bills
        };
        for bill in &bills {
            cancel_all(&bill.notifications, self.scheduler.as_ref());
        }
        info!(bills = bills.len(), "all data cleared");
        Ok(())
    }

    pub fn export_backup(&self) -> Result<BackupDocument> {
        backup::export_backup(&self.collections, self.clock.now())
    }

    /// Replaces both collections with the document and repairs payment links.
    pub fn import_backup(&self, document: &BackupDocument) -> Result<ReconcileReport> {
        let previous = backup::import_backup(&self.collections, document)?;
        for bill in &previous {
            cancel_all(&bill.notifications, self.scheduler.as_ref());
        }
        reconcile(&self.collections)
    }

    pub fn export_csv(&self) -> Result<CsvExport> {
        let transactions = self.ledger.list()?;
        let bills = self.bills.list()?;
        export_csv(&transactions, &bills)
    }
}
