//! Stateful services over the persisted collections.

pub mod bill_store;
pub mod ledger_store;
pub mod payment;

pub use bill_store::BillStore;
pub use ledger_store::LedgerStore;
pub use payment::{PaymentCoordinator, PaymentOutcome};
