pub mod projection;
pub mod reconcile;
pub mod services;
pub mod time;
pub mod tracker;

pub use projection::{DueStatus, MonthTotals, ProjectedBill, ProjectionEngine, Urgency};
pub use reconcile::ReconcileReport;
pub use time::{Clock, FixedClock, SystemClock};
pub use tracker::{FinanceTracker, Theme};
