pub mod bill;
pub mod category;
pub mod common;
pub mod period;
pub mod transaction;

pub use bill::{
    Bill, BillKind, BillSchedule, NotificationHandles, NotificationId, MIN_INSTALLMENTS,
};
pub use period::MonthPeriod;
pub use transaction::{Balance, Transaction, TransactionFilter, TransactionKind};
