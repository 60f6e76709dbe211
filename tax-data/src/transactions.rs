//! CSV loader for a freelancer's transaction ledger.
//!
//! | Column        | Required | Notes                                          |
//! |---------------|----------|------------------------------------------------|
//! | `date`        | yes      | `YYYY-MM-DD`                                   |
//! | `kind`        | yes      | `income`/`expense` (also `credit`/`debit`)     |
//! | `amount`      | yes      | positive decimal, thousands separators allowed |
//! | `category`    | no       |                                                |
//! | `description` | no       |                                                |
//! | `deductible`  | no       | `true`/`false`; expenses default to `true`     |
//!
//! ```csv
//! date,kind,amount,category,description,deductible
//! 2025-01-31,income,"4,000.00",consulting,January invoice,
//! 2025-02-03,expense,129.99,software,IDE licence,true
//! ```

use std::io::Read;

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::Deserialize;
use tax_core::{Transaction, TransactionKind};
use thiserror::Error;
use tracing::debug;

#[derive(Debug, Error)]
pub enum TransactionLoaderError {
    #[error("CSV parse error: {0}")]
    CsvParse(String),

    #[error("line {line}: invalid date '{value}' (expected YYYY-MM-DD)")]
    InvalidDate { line: usize, value: String },

    #[error("line {line}: unknown transaction kind '{value}'")]
    InvalidKind { line: usize, value: String },

    #[error("line {line}: invalid amount '{value}'")]
    InvalidAmount { line: usize, value: String },

    #[error("line {line}: invalid deductible flag '{value}'")]
    InvalidFlag { line: usize, value: String },
}

impl From<csv::Error> for TransactionLoaderError {
    fn from(err: csv::Error) -> Self {
        TransactionLoaderError::CsvParse(err.to_string())
    }
}

#[derive(Debug, Deserialize)]
struct CsvRow {
    date: String,
    kind: String,
    amount: String,
    #[serde(default)]
    category: Option<String>,
    #[serde(default)]
    description: Option<String>,
    #[serde(default)]
    deductible: Option<String>,
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|s| !s.trim().is_empty())
}

fn parse_flag(value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "true" | "yes" | "y" | "1" => Some(true),
        "false" | "no" | "n" | "0" => Some(false),
        _ => None,
    }
}

impl CsvRow {
    fn into_transaction(
        self,
        line: usize,
    ) -> Result<Transaction, TransactionLoaderError> {
        let date = NaiveDate::parse_from_str(self.date.trim(), "%Y-%m-%d").map_err(|_| {
            TransactionLoaderError::InvalidDate {
                line,
                value: self.date.clone(),
            }
        })?;

        let kind = TransactionKind::parse(&self.kind).ok_or_else(|| {
            TransactionLoaderError::InvalidKind {
                line,
                value: self.kind.clone(),
            }
        })?;

        let amount = self
            .amount
            .trim()
            .replace(',', "")
            .parse::<Decimal>()
            .map_err(|_| TransactionLoaderError::InvalidAmount {
                line,
                value: self.amount.clone(),
            })?;

        let deductible = match non_empty(self.deductible) {
            Some(flag) => {
                parse_flag(&flag).ok_or(TransactionLoaderError::InvalidFlag { line, value: flag })?
            }
            None => kind == TransactionKind::Expense,
        };

        Ok(Transaction {
            date,
            kind,
            amount,
            category: non_empty(self.category),
            description: non_empty(self.description),
            deductible,
        })
    }
}

pub struct TransactionLoader;

impl TransactionLoader {
    /// Parse every ledger row. The first invalid row aborts the load.
    pub fn parse<R: Read>(reader: R) -> Result<Vec<Transaction>, TransactionLoaderError> {
        let mut csv_reader = csv::ReaderBuilder::new()
            .trim(csv::Trim::All)
            .flexible(true)
            .from_reader(reader);
        let mut transactions = Vec::new();

        for (index, result) in csv_reader.deserialize().enumerate() {
            let row: CsvRow = result?;
            // header is line 1
            transactions.push(row.into_transaction(index + 2)?);
        }

        debug!(count = transactions.len(), "parsed ledger transactions");
        Ok(transactions)
    }
}
