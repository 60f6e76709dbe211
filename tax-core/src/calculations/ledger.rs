//! Aggregation of a transaction ledger into the figures the tax computation
//! needs.

use chrono::Datelike;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::models::{TaxBracket, TaxComputationInput, TaxProfile, Transaction, TransactionKind};

/// Totals of one calendar tax year's transactions.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LedgerSummary {
    pub tax_year: i32,
    pub total_income: Decimal,
    pub deductible_expenses: Decimal,
    pub non_deductible_expenses: Decimal,
    /// Transactions counted towards the totals.
    pub transaction_count: usize,
    /// Transactions in the year that were ignored because of a negative amount.
    pub skipped: usize,
}

impl LedgerSummary {
    /// Sums the transactions dated within `tax_year`.
    ///
    /// Amounts are expected to be positive; the kind carries the sign. A
    /// negative amount is skipped and logged.
    pub fn from_transactions(
        transactions: &[Transaction],
        tax_year: i32,
    ) -> Self {
        let mut summary = Self {
            tax_year,
            ..Default::default()
        };

        for tx in transactions.iter().filter(|tx| tx.date.year() == tax_year) {
            if tx.amount < Decimal::ZERO {
                warn!(
                    date = %tx.date,
                    amount = %tx.amount,
                    "skipping transaction with negative amount"
                );
                summary.skipped += 1;
                continue;
            }

            match (tx.kind, tx.deductible) {
                (TransactionKind::Income, _) => {
                    summary.total_income = summary.total_income.saturating_add(tx.amount);
                }
                (TransactionKind::Expense, true) => {
                    summary.deductible_expenses =
                        summary.deductible_expenses.saturating_add(tx.amount);
                }
                (TransactionKind::Expense, false) => {
                    summary.non_deductible_expenses =
                        summary.non_deductible_expenses.saturating_add(tx.amount);
                }
            }
            summary.transaction_count += 1;
        }

        summary
    }

    /// Income left after deductible expenses. May be negative.
    pub fn net_profit(&self) -> Decimal {
        self.total_income - self.deductible_expenses
    }

    /// Builds a computation input with gross income set to total income and
    /// deductible expenses as additional deductions.
    pub fn to_input(
        &self,
        brackets: Vec<TaxBracket>,
        profile: &TaxProfile,
    ) -> TaxComputationInput {
        TaxComputationInput {
            gross_income: Some(self.total_income),
            additional_deductions: Some(self.deductible_expenses),
            standard_deduction: profile.standard_deduction,
            brackets,
            pension_rate_percent: profile.pension_rate_percent,
            pension_annual_cap: profile.pension_annual_cap,
        }
    }
}
