use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::amount::lenient;
use super::tax_bracket::{BracketCeiling, TaxBracket};

/// Income profile and bracket table handed to the progressive tax computation.
///
/// Every numeric field is optional. Absent or non-finite values are treated
/// as zero, except `pension_annual_cap` where absence means "no cap".
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaxComputationInput {
    #[serde(default, deserialize_with = "lenient")]
    pub gross_income: Option<Decimal>,

    /// Business expenses and other itemized deductions.
    #[serde(default, deserialize_with = "lenient")]
    pub additional_deductions: Option<Decimal>,

    #[serde(default, deserialize_with = "lenient")]
    pub standard_deduction: Option<Decimal>,

    #[serde(default)]
    pub brackets: Vec<TaxBracket>,

    /// Statutory pension contribution as a percentage of gross income.
    #[serde(default, deserialize_with = "lenient")]
    pub pension_rate_percent: Option<Decimal>,

    #[serde(default, deserialize_with = "lenient")]
    pub pension_annual_cap: Option<Decimal>,
}

/// Tax levied inside a single bracket.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BracketContribution {
    pub min: Decimal,
    pub max: BracketCeiling,
    pub rate_percent: Decimal,
    pub taxable_at_bracket: Decimal,
    pub tax_at_bracket: Decimal,
}

/// Full breakdown produced by [`crate::compute`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaxComputationResult {
    /// Deductions actually applied, never more than gross income.
    pub deductions: Decimal,
    pub taxable_income: Decimal,
    pub tax_owed: Decimal,
    pub effective_rate_percent: Decimal,
    /// Rate of the highest bracket that received taxable income.
    pub marginal_rate_percent: Decimal,
    pub statutory_pension: Decimal,
    pub breakdown: Vec<BracketContribution>,
    /// True when the requested deductions exceeded gross income.
    pub deductions_capped: bool,
    pub uncapped_deductions: Decimal,
}

impl TaxComputationResult {
    /// Sum of the per-bracket tax amounts.
    pub fn breakdown_total(&self) -> Decimal {
        self.breakdown.iter().map(|c| c.tax_at_bracket).sum()
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use rust_decimal_macros::dec;

    use super::*;

    #[test]
    fn deserializes_camel_case_record() {
        let json = r#"{
            "grossIncome": 15000,
            "additionalDeductions": "250.50",
            "standardDeduction": null,
            "brackets": [
                {"min": 0, "max": 10000, "ratePercent": 10},
                {"min": 10000, "max": null, "ratePercent": 20}
            ],
            "pensionRatePercent": 5
        }"#;

        let input: TaxComputationInput = serde_json::from_str(json).unwrap();

        assert_eq!(input.gross_income, Some(dec!(15000)));
        assert_eq!(input.additional_deductions, Some(dec!(250.50)));
        assert_eq!(input.standard_deduction, None);
        assert_eq!(input.brackets.len(), 2);
        assert_eq!(input.pension_rate_percent, Some(dec!(5)));
        assert_eq!(input.pension_annual_cap, None);
    }

    #[test]
    fn unreadable_ceiling_does_not_reject_document() {
        let json = r#"{
            "grossIncome": 15000,
            "brackets": [
                {"min": 0, "max": "oops", "ratePercent": 10},
                {"min": 10000, "max": null, "ratePercent": 20}
            ]
        }"#;

        let input: TaxComputationInput = serde_json::from_str(json).unwrap();
        let result = crate::compute(&input);

        assert_eq!(input.brackets[0].max, BracketCeiling::Bounded(dec!(0)));
        // only the 10000..15000 slice of the readable bracket is taxed
        assert_eq!(result.tax_owed, dec!(1000));
        assert_eq!(result.breakdown.len(), 1);
    }

    #[test]
    fn empty_object_is_default_input() {
        let input: TaxComputationInput = serde_json::from_str("{}").unwrap();

        assert_eq!(input, TaxComputationInput::default());
    }

    #[test]
    fn result_serializes_camel_case_fields() {
        let result = TaxComputationResult::default();

        let value = serde_json::to_value(&result).unwrap();

        for field in [
            "deductions",
            "taxableIncome",
            "taxOwed",
            "effectiveRatePercent",
            "marginalRatePercent",
            "statutoryPension",
            "breakdown",
            "deductionsCapped",
            "uncappedDeductions",
        ] {
            assert!(value.get(field).is_some(), "missing field {field}");
        }
    }
}
