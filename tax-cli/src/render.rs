//! Terminal and JSON output for a computed filing.

use std::fmt;

use serde::Serialize;
use tax_core::{FilingDraft, LedgerSummary};

use crate::utils::{format_money, format_percent};

/// JSON document written by `--format json`.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct JsonReport<'a> {
    filing: &'a FilingDraft,
    #[serde(skip_serializing_if = "Option::is_none")]
    ledger: Option<&'a LedgerSummary>,
}

pub fn render_json(
    draft: &FilingDraft,
    ledger: Option<&LedgerSummary>,
) -> serde_json::Result<String> {
    serde_json::to_string_pretty(&JsonReport {
        filing: draft,
        ledger,
    })
}

/// Plain-text summary of a filing, one labelled amount per line.
struct TextReport<'a> {
    draft: &'a FilingDraft,
    ledger: Option<&'a LedgerSummary>,
}

impl fmt::Display for TextReport<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let result = &self.draft.result;

        writeln!(f, "Tax year {}", self.draft.tax_year)?;
        if let Some(ledger) = self.ledger {
            writeln!(
                f,
                "  Ledger income          {:>16}  ({} transactions)",
                format_money(ledger.total_income),
                ledger.transaction_count
            )?;
            writeln!(
                f,
                "  Deductible expenses    {:>16}",
                format_money(ledger.deductible_expenses)
            )?;
        }
        let gross = self.draft.input.gross_income.unwrap_or_default();
        writeln!(f, "  Gross income           {:>16}", format_money(gross))?;
        writeln!(
            f,
            "  Statutory pension      {:>16}",
            format_money(result.statutory_pension)
        )?;
        write!(f, "  Deductions             {:>16}", format_money(result.deductions))?;
        if result.deductions_capped {
            write!(f, "  (capped from {})", format_money(result.uncapped_deductions))?;
        }
        writeln!(f)?;
        writeln!(
            f,
            "  Taxable income         {:>16}",
            format_money(result.taxable_income)
        )?;
        writeln!(f, "  Tax owed               {:>16}", format_money(result.tax_owed))?;
        writeln!(
            f,
            "  Effective rate         {:>16}",
            format_percent(result.effective_rate_percent)
        )?;
        writeln!(
            f,
            "  Marginal rate          {:>16}",
            format_percent(result.marginal_rate_percent)
        )?;

        if result.breakdown.is_empty() {
            return Ok(());
        }
        writeln!(f, "Brackets")?;
        for contribution in &result.breakdown {
            let ceiling = contribution
                .max
                .amount()
                .map_or_else(|| "and above".to_string(), format_money);
            writeln!(
                f,
                "  {:>14} - {:<14} {:>8}  {:>16}  {:>14}",
                format_money(contribution.min),
                ceiling,
                format_percent(contribution.rate_percent),
                format_money(contribution.taxable_at_bracket),
                format_money(contribution.tax_at_bracket),
            )?;
        }
        Ok(())
    }
}

pub fn render_text(
    draft: &FilingDraft,
    ledger: Option<&LedgerSummary>,
) -> String {
    TextReport { draft, ledger }.to_string()
}
