#![doc(test(attr(deny(warnings))))]

//! Fina core: a personal finance tracker with an income/expense ledger,
//! fixed, installment and one-time bills, month projection of due bills,
//! and payments that couple bills back into the ledger.

pub mod backup;
pub mod cli;
pub mod config;
pub mod core;
pub mod currency;
pub mod domain;
pub mod errors;
pub mod export;
pub mod notifications;
pub mod storage;
pub mod utils;

pub use crate::core::FinanceTracker;
pub use errors::{FinanceError, Result};

use std::sync::Once;

static INIT_TRACING: Once = Once::new();

/// Initializes global tracing and emits a startup info log.
pub fn init() {
    INIT_TRACING.call_once(|| {
        utils::init_tracing();
        tracing::info!("Fina tracing initialized.");
    });
}
