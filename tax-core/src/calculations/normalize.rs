//! Input normalization ahead of the progressive tax computation.
//!
//! All defaulting happens here so [`super::TaxComputer`] only ever sees
//! concrete amounts and a bracket table sorted by floor.

use rust_decimal::Decimal;

use crate::models::{TaxBracket, TaxComputationInput};

/// A [`TaxComputationInput`] with every default applied.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NormalizedInput {
    pub gross_income: Decimal,
    pub additional_deductions: Decimal,
    pub standard_deduction: Decimal,
    pub pension_rate_percent: Decimal,
    /// `None` means the pension contribution is not capped.
    pub pension_annual_cap: Option<Decimal>,
    /// Sorted ascending by `min`. Brackets sharing a floor keep input order.
    pub brackets: Vec<TaxBracket>,
}

impl NormalizedInput {
    pub fn from_input(input: &TaxComputationInput) -> Self {
        let mut brackets = input.brackets.clone();
        brackets.sort_by(|a, b| a.min.cmp(&b.min));

        Self {
            gross_income: input.gross_income.unwrap_or_default(),
            additional_deductions: input.additional_deductions.unwrap_or_default(),
            standard_deduction: input.standard_deduction.unwrap_or_default(),
            pension_rate_percent: input.pension_rate_percent.unwrap_or_default(),
            pension_annual_cap: input.pension_annual_cap,
            brackets,
        }
    }
}

impl From<&TaxComputationInput> for NormalizedInput {
    fn from(input: &TaxComputationInput) -> Self {
        Self::from_input(input)
    }
}
