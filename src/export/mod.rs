//! Spreadsheet export: one CSV table for transactions and one for bills.

use std::{
    fs,
    path::{Path, PathBuf},
};

use chrono::{DateTime, NaiveDate, Utc};
use csv::{QuoteStyle, WriterBuilder};
use tracing::info;

use crate::domain::{Bill, BillKind, Transaction, TransactionKind};
use crate::errors::{FinanceError, Result};
use crate::utils::paths::ensure_dir;

const TRANSACTION_HEADERS: [&str; 5] = ["Tipo", "Descrição", "Valor", "Categoria", "Data"];
const BILL_HEADERS: [&str; 6] = [
    "Descrição",
    "Valor",
    "Dia Vencimento",
    "Categoria",
    "Tipo",
    "Status",
];

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CsvExport {
    pub transactions: String,
    pub bills: String,
}

/// Paths written by [`CsvExport::write_csv_files`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CsvFiles {
    pub transactions: PathBuf,
    pub bills: PathBuf,
}

impl CsvExport {
    /// Writes `transacoes_<date>.csv` and `contas_<date>.csv` into `dir`.
    pub fn write_csv_files(&self, dir: &Path, date: NaiveDate) -> Result<CsvFiles> {
        ensure_dir(dir)?;
        let stamp = date.format("%Y-%m-%d");
        let files = CsvFiles {
            transactions: dir.join(format!("transacoes_{stamp}.csv")),
            bills: dir.join(format!("contas_{stamp}.csv")),
        };
        for (path, body) in [
            (&files.transactions, &self.transactions),
            (&files.bills, &self.bills),
        ] {
            fs::write(path, body)
                .map_err(|err| FinanceError::storage(format!("writing {}", path.display()), err))?;
        }
        info!(dir = %dir.display(), "csv export written");
        Ok(files)
    }
}

pub fn export_csv(transactions: &[Transaction], bills: &[Bill]) -> Result<CsvExport> {
    let transaction_rows = transactions.iter().map(|txn| {
        vec![
            transaction_kind_label(txn.kind).to_string(),
            txn.description.clone(),
            txn.amount.to_string(),
            txn.category.clone().unwrap_or_default(),
            format_date(txn.occurred_at),
        ]
    });
    let bill_rows = bills.iter().map(|bill| {
        vec![
            bill.description.clone(),
            bill.amount.to_string(),
            bill.due_day.to_string(),
            bill.category.clone(),
            bill_kind_label(bill.kind()).to_string(),
            if bill.is_paid { "Pago" } else { "Pendente" }.to_string(),
        ]
    });
    Ok(CsvExport {
        transactions: render(&TRANSACTION_HEADERS, transaction_rows)?,
        bills: render(&BILL_HEADERS, bill_rows)?,
    })
}

pub fn transaction_kind_label(kind: TransactionKind) -> &'static str {
    match kind {
        TransactionKind::Income => "Receita",
        TransactionKind::Expense => "Despesa",
    }
}

pub fn bill_kind_label(kind: BillKind) -> &'static str {
    match kind {
        BillKind::Fixed => "Fixa",
        BillKind::Installment => "Parcelada",
        BillKind::OneTime => "Única",
    }
}

fn format_date(at: DateTime<Utc>) -> String {
    at.format("%d/%m/%Y").to_string()
}

fn render<I>(headers: &[&str], rows: I) -> Result<String>
where
    I: Iterator<Item = Vec<String>>,
{
    let mut writer = WriterBuilder::new()
        .quote_style(QuoteStyle::NonNumeric)
        .from_writer(Vec::new());
    writer.write_record(headers)?;
    for row in rows {
        writer.write_record(&row)?;
    }
    let bytes = writer
        .into_inner()
        .map_err(|err| FinanceError::storage("flushing csv", err))?;
    String::from_utf8(bytes).map_err(|err| FinanceError::storage("encoding csv", err))
}
