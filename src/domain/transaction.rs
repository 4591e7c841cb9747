use std::{fmt, str::FromStr};

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::currency::{validate_amount, MINOR_UNITS};
use crate::domain::bill::Bill;
use crate::domain::common::{require_text, Identifiable};
use crate::errors::{FinanceError, Result};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum TransactionKind {
    Income,
    Expense,
}

impl TransactionKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            TransactionKind::Income => "income",
            TransactionKind::Expense => "expense",
        }
    }
}

impl fmt::Display for TransactionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TransactionKind {
    type Err = FinanceError;

    fn from_str(value: &str) -> Result<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "income" => Ok(TransactionKind::Income),
            "expense" => Ok(TransactionKind::Expense),
            other => Err(FinanceError::validation(format!(
                "unknown transaction kind `{other}`"
            ))),
        }
    }
}

/// A record of money actually moved. Immutable once created.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Transaction {
    pub id: Uuid,
    pub description: String,
    pub amount: Decimal,
    pub kind: TransactionKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    pub occurred_at: DateTime<Utc>,
    /// Set when the transaction was produced by paying a bill.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bill_id: Option<Uuid>,
}

impl Transaction {
    /// Builds a validated transaction. Blank categories are dropped.
    pub fn new(
        description: &str,
        amount: Decimal,
        kind: TransactionKind,
        category: Option<&str>,
        occurred_at: DateTime<Utc>,
    ) -> Result<Self> {
        let description = require_text("description", description)?;
        let amount = validate_amount(amount)?;
        let category = category
            .map(str::trim)
            .filter(|value| !value.is_empty())
            .map(str::to_string);
        Ok(Self {
            id: Uuid::new_v4(),
            description,
            amount,
            kind,
            category,
            occurred_at,
            bill_id: None,
        })
    }

    /// Re-applies the construction checks to a deserialized transaction.
    pub fn validate(&self) -> Result<()> {
        require_text("description", &self.description)?;
        validate_amount(self.amount)?;
        Ok(())
    }

    /// Expense recording the payment of `bill`.
    pub fn for_bill_payment(bill: &Bill, occurred_at: DateTime<Utc>) -> Self {
        Self {
            id: Uuid::new_v4(),
            description: bill.description.clone(),
            amount: bill.amount.round_dp(MINOR_UNITS),
            kind: TransactionKind::Expense,
            category: Some(bill.category.clone()).filter(|value| !value.is_empty()),
            occurred_at,
            bill_id: Some(bill.id),
        }
    }

    pub fn with_bill(mut self, bill_id: Uuid) -> Self {
        self.bill_id = Some(bill_id);
        self
    }

    /// Amount with the sign of its effect on the balance.
    pub fn signed_amount(&self) -> Decimal {
        match self.kind {
            TransactionKind::Income => self.amount,
            TransactionKind::Expense => -self.amount,
        }
    }
}

impl Identifiable for Transaction {
    fn id(&self) -> Uuid {
        self.id
    }
}

/// Selects which transactions a listing shows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TransactionFilter {
    #[default]
    All,
    Income,
    Expense,
}

impl TransactionFilter {
    pub fn matches(&self, transaction: &Transaction) -> bool {
        match self {
            TransactionFilter::All => true,
            TransactionFilter::Income => transaction.kind == TransactionKind::Income,
            TransactionFilter::Expense => transaction.kind == TransactionKind::Expense,
        }
    }
}

impl FromStr for TransactionFilter {
    type Err = FinanceError;

    fn from_str(value: &str) -> Result<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "" | "all" => Ok(TransactionFilter::All),
            other => other.parse::<TransactionKind>().map(|kind| match kind {
                TransactionKind::Income => TransactionFilter::Income,
                TransactionKind::Expense => TransactionFilter::Expense,
            }),
        }
    }
}

/// Aggregate totals over a set of transactions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Balance {
    pub total_income: Decimal,
    pub total_expense: Decimal,
    pub net: Decimal,
}

impl Balance {
    pub fn aggregate<'a, I>(transactions: I) -> Self
    where
        I: IntoIterator<Item = &'a Transaction>,
    {
        let mut balance = Balance::default();
        for txn in transactions {
            match txn.kind {
                TransactionKind::Income => balance.total_income += txn.amount,
                TransactionKind::Expense => balance.total_expense += txn.amount,
            }
        }
        balance.net = balance.total_income - balance.total_expense;
        balance
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use rust_decimal_macros::dec;

    fn at() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 1, 5, 12, 0, 0).unwrap()
    }

    #[test]
    fn new_rejects_non_positive_amounts() {
        let err = Transaction::new("Salary", dec!(0), TransactionKind::Income, None, at())
            .expect_err("zero amount must fail");
        assert!(matches!(err, FinanceError::Validation(_)));
        assert!(Transaction::new("Refund", dec!(-3), TransactionKind::Income, None, at()).is_err());
    }

    #[test]
    fn new_drops_blank_category_and_trims_description() {
        let txn = Transaction::new(
            "  Groceries ",
            dec!(42.5),
            TransactionKind::Expense,
            Some("  "),
            at(),
        )
        .unwrap();
        assert_eq!(txn.description, "Groceries");
        assert_eq!(txn.category, None);
        assert_eq!(txn.amount.to_string(), "42.50");
    }

    #[test]
    fn balance_nets_income_against_expense() {
        let txns = vec![
            Transaction::new("Salary", dec!(3000), TransactionKind::Income, None, at()).unwrap(),
            Transaction::new("Rent", dec!(1200.40), TransactionKind::Expense, None, at()).unwrap(),
            Transaction::new("Power", dec!(150), TransactionKind::Expense, None, at()).unwrap(),
        ];
        let balance = Balance::aggregate(&txns);
        assert_eq!(balance.total_income, dec!(3000));
        assert_eq!(balance.total_expense, dec!(1350.40));
        assert_eq!(balance.net, dec!(1649.60));
    }

    #[test]
    fn filter_parses_and_matches() {
        let income =
            Transaction::new("Salary", dec!(10), TransactionKind::Income, None, at()).unwrap();
        let filter: TransactionFilter = "expense".parse().unwrap();
        assert!(!filter.matches(&income));
        assert!(TransactionFilter::All.matches(&income));
        assert!("nope".parse::<TransactionFilter>().is_err());
    }

    #[test]
    fn serializes_with_camel_case_keys() {
        let txn = Transaction::new("Salary", dec!(10), TransactionKind::Income, None, at())
            .unwrap()
            .with_bill(Uuid::nil());
        let json = serde_json::to_value(&txn).unwrap();
        assert_eq!(json["kind"], "income");
        assert!(json.get("occurredAt").is_some());
        assert!(json.get("billId").is_some());
        assert!(json.get("category").is_none());
    }
}
