//! Progressive income tax computation.
//!
//! Turns an income profile plus a bracket table into a full breakdown of
//! deductions, taxable income, tax per bracket and the resulting rates.
//!
//! # Steps
//!
//! | Step | Value |
//! |------|-------|
//! | 1    | Statutory pension: gross × pension rate, clamped to the annual cap |
//! | 2    | Uncapped deductions: standard + additional + pension, minimum 0 |
//! | 3    | Deductions: smaller of step 2 and gross income |
//! | 4    | Taxable income: gross − deductions, minimum 0 |
//! | 5    | Tax per bracket, walking brackets in ascending order of floor |
//! | 6    | Effective rate: tax ÷ gross × 100 (0 when gross ≤ 0) |
//!
//! The computation never fails. Unsorted, gapped or overlapping tables are
//! sliced as given and only reported through `tracing` warnings.
//!
//! # Example
//!
//! ```
//! use rust_decimal_macros::dec;
//! use tax_core::{TaxBracket, TaxComputationInput, compute};
//!
//! let input = TaxComputationInput {
//!     gross_income: Some(dec!(15000)),
//!     brackets: vec![
//!         TaxBracket::new(dec!(0), Some(dec!(10000)), dec!(10)),
//!         TaxBracket::new(dec!(10000), None, dec!(20)),
//!     ],
//!     ..Default::default()
//! };
//!
//! let result = compute(&input);
//!
//! assert_eq!(result.taxable_income, dec!(15000));
//! assert_eq!(result.tax_owed, dec!(2000));
//! assert_eq!(result.marginal_rate_percent, dec!(20));
//! assert_eq!(result.breakdown.len(), 2);
//! ```

use rust_decimal::Decimal;
use tracing::{debug, warn};

use super::brackets::inspect_brackets;
use super::common::{max, percent_of, ratio_percent};
use super::normalize::NormalizedInput;
use crate::models::{BracketCeiling, BracketContribution, TaxComputationInput, TaxComputationResult};

/// Computes the full tax breakdown for `input`.
pub fn compute(input: &TaxComputationInput) -> TaxComputationResult {
    TaxComputer::new(NormalizedInput::from_input(input)).compute()
}

/// Outcome of walking the bracket table.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
struct BracketTotals {
    tax_owed: Decimal,
    marginal_rate_percent: Decimal,
    breakdown: Vec<BracketContribution>,
}

/// Progressive tax calculator over a normalized input.
#[derive(Debug, Clone)]
pub struct TaxComputer {
    input: NormalizedInput,
}

impl TaxComputer {
    pub fn new(input: NormalizedInput) -> Self {
        Self { input }
    }

    pub fn compute(&self) -> TaxComputationResult {
        for issue in inspect_brackets(&self.input.brackets) {
            warn!(%issue, "computing with malformed bracket table");
        }

        let statutory_pension = self.statutory_pension();
        let uncapped_deductions = self.uncapped_deductions(statutory_pension);
        let (deductions, deductions_capped) = self.capped_deductions(uncapped_deductions);
        let taxable_income = self.taxable_income(deductions);
        let totals = self.apply_brackets(taxable_income);
        let effective_rate_percent = self.effective_rate(totals.tax_owed);

        debug!(
            gross_income = %self.input.gross_income,
            %taxable_income,
            tax_owed = %totals.tax_owed,
            brackets_used = totals.breakdown.len(),
            "computed progressive tax"
        );

        TaxComputationResult {
            deductions,
            taxable_income,
            tax_owed: totals.tax_owed,
            effective_rate_percent,
            marginal_rate_percent: totals.marginal_rate_percent,
            statutory_pension,
            breakdown: totals.breakdown,
            deductions_capped,
            uncapped_deductions,
        }
    }

    /// Pension contribution on gross income, clamped to the annual cap.
    fn statutory_pension(&self) -> Decimal {
        let pension = percent_of(self.input.gross_income, self.input.pension_rate_percent)
            .unwrap_or_else(|| {
                debug!("pension contribution overflowed, treating as zero");
                Decimal::ZERO
            });

        match self.input.pension_annual_cap {
            Some(cap) => pension.min(cap),
            None => pension,
        }
    }

    fn uncapped_deductions(
        &self,
        pension: Decimal,
    ) -> Decimal {
        let total = self
            .input
            .standard_deduction
            .saturating_add(self.input.additional_deductions)
            .saturating_add(pension);
        max(total, Decimal::ZERO)
    }

    /// Limits deductions to gross income. The flag is set when clamping
    /// actually reduced them.
    fn capped_deductions(
        &self,
        uncapped: Decimal,
    ) -> (Decimal, bool) {
        let deductions = self.input.gross_income.min(uncapped);
        (deductions, deductions < uncapped)
    }

    fn taxable_income(
        &self,
        deductions: Decimal,
    ) -> Decimal {
        max(
            self.input.gross_income.saturating_sub(deductions),
            Decimal::ZERO,
        )
    }

    /// Slices `taxable_income` across the sorted brackets.
    fn apply_brackets(
        &self,
        taxable_income: Decimal,
    ) -> BracketTotals {
        let mut totals = BracketTotals::default();

        for bracket in &self.input.brackets {
            if taxable_income <= bracket.min {
                continue;
            }

            let above_floor = taxable_income.saturating_sub(bracket.min);
            let taxable_at_bracket = match bracket.max {
                BracketCeiling::Bounded(ceiling) => {
                    above_floor.min(ceiling.saturating_sub(bracket.min))
                }
                BracketCeiling::Unbounded => above_floor,
            };
            if taxable_at_bracket <= Decimal::ZERO {
                continue;
            }

            let tax_at_bracket =
                percent_of(taxable_at_bracket, bracket.rate_percent).unwrap_or(Decimal::ZERO);
            totals.tax_owed = totals.tax_owed.saturating_add(tax_at_bracket);
            totals.marginal_rate_percent = bracket.rate_percent;
            totals.breakdown.push(BracketContribution {
                min: bracket.min,
                max: bracket.max,
                rate_percent: bracket.rate_percent,
                taxable_at_bracket,
                tax_at_bracket,
            });
        }

        totals
    }

    fn effective_rate(
        &self,
        tax_owed: Decimal,
    ) -> Decimal {
        ratio_percent(tax_owed, self.input.gross_income)
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use proptest::prelude::{prop_assert, prop_assert_eq, proptest};
    use rust_decimal_macros::dec;

    use super::*;
    use crate::calculations::common::round_half_up;
    use crate::models::TaxBracket;

    fn two_brackets() -> Vec<TaxBracket> {
        vec![
            TaxBracket::new(dec!(0), Some(dec!(10000)), dec!(10)),
            TaxBracket::new(dec!(10000), None, dec!(20)),
        ]
    }

    fn us_single_2025() -> Vec<TaxBracket> {
        vec![
            TaxBracket::new(dec!(0), Some(dec!(11925)), dec!(10)),
            TaxBracket::new(dec!(11925), Some(dec!(48475)), dec!(12)),
            TaxBracket::new(dec!(48475), Some(dec!(103350)), dec!(22)),
            TaxBracket::new(dec!(103350), Some(dec!(197300)), dec!(24)),
            TaxBracket::new(dec!(197300), Some(dec!(250525)), dec!(32)),
            TaxBracket::new(dec!(250525), Some(dec!(626350)), dec!(35)),
            TaxBracket::new(dec!(626350), None, dec!(37)),
        ]
    }

    fn input_with(gross: Decimal) -> TaxComputationInput {
        TaxComputationInput {
            gross_income: Some(gross),
            standard_deduction: Some(dec!(0)),
            additional_deductions: Some(dec!(0)),
            pension_rate_percent: Some(dec!(0)),
            brackets: two_brackets(),
            ..Default::default()
        }
    }

    fn computer(input: TaxComputationInput) -> TaxComputer {
        TaxComputer::new(NormalizedInput::from_input(&input))
    }

    // =========================================================================
    // statutory_pension tests
    // =========================================================================

    #[test]
    fn statutory_pension_applies_rate() {
        let mut input = input_with(dec!(20000));
        input.pension_rate_percent = Some(dec!(5));

        assert_eq!(computer(input).statutory_pension(), dec!(1000));
    }

    #[test]
    fn statutory_pension_is_clamped_to_cap() {
        let mut input = input_with(dec!(20000));
        input.pension_rate_percent = Some(dec!(5));
        input.pension_annual_cap = Some(dec!(500));

        assert_eq!(computer(input).statutory_pension(), dec!(500));
    }

    #[test]
    fn statutory_pension_below_cap_is_unchanged() {
        let mut input = input_with(dec!(20000));
        input.pension_rate_percent = Some(dec!(5));
        input.pension_annual_cap = Some(dec!(5000));

        assert_eq!(computer(input).statutory_pension(), dec!(1000));
    }

    #[test]
    fn statutory_pension_is_zero_without_rate() {
        let mut input = input_with(dec!(20000));
        input.pension_rate_percent = None;
        input.pension_annual_cap = Some(dec!(500));

        assert_eq!(computer(input).statutory_pension(), Decimal::ZERO);
    }

    #[test]
    fn statutory_pension_overflow_is_zero() {
        let mut input = input_with(Decimal::MAX);
        input.pension_rate_percent = Some(dec!(1000));

        assert_eq!(computer(input).statutory_pension(), Decimal::ZERO);
    }

    // =========================================================================
    // deduction tests
    // =========================================================================

    #[test]
    fn uncapped_deductions_sums_all_sources() {
        let mut input = input_with(dec!(50000));
        input.standard_deduction = Some(dec!(10000));
        input.additional_deductions = Some(dec!(2500));

        assert_eq!(computer(input).uncapped_deductions(dec!(750)), dec!(13250));
    }

    #[test]
    fn uncapped_deductions_never_negative() {
        let mut input = input_with(dec!(50000));
        input.additional_deductions = Some(dec!(-2500));

        assert_eq!(computer(input).uncapped_deductions(dec!(0)), Decimal::ZERO);
    }

    #[test]
    fn capped_deductions_limits_to_gross_income() {
        let calculator = computer(input_with(dec!(15000)));

        assert_eq!(calculator.capped_deductions(dec!(20000)), (dec!(15000), true));
    }

    #[test]
    fn capped_deductions_equal_to_gross_is_not_capped() {
        let calculator = computer(input_with(dec!(15000)));

        assert_eq!(calculator.capped_deductions(dec!(15000)), (dec!(15000), false));
    }

    #[test]
    fn taxable_income_subtracts_deductions() {
        let calculator = computer(input_with(dec!(15000)));

        assert_eq!(calculator.taxable_income(dec!(4000)), dec!(11000));
    }

    // =========================================================================
    // apply_brackets tests
    // =========================================================================

    #[test]
    fn apply_brackets_slices_across_brackets() {
        let totals = computer(input_with(dec!(15000))).apply_brackets(dec!(15000));

        assert_eq!(totals.tax_owed, dec!(2000));
        assert_eq!(totals.marginal_rate_percent, dec!(20));
        assert_eq!(
            totals.breakdown,
            vec![
                BracketContribution {
                    min: dec!(0),
                    max: BracketCeiling::Bounded(dec!(10000)),
                    rate_percent: dec!(10),
                    taxable_at_bracket: dec!(10000),
                    tax_at_bracket: dec!(1000),
                },
                BracketContribution {
                    min: dec!(10000),
                    max: BracketCeiling::Unbounded,
                    rate_percent: dec!(20),
                    taxable_at_bracket: dec!(5000),
                    tax_at_bracket: dec!(1000),
                },
            ]
        );
    }

    #[test]
    fn apply_brackets_income_at_boundary_skips_next_bracket() {
        let totals = computer(input_with(dec!(10000))).apply_brackets(dec!(10000));

        assert_eq!(totals.tax_owed, dec!(1000));
        assert_eq!(totals.marginal_rate_percent, dec!(10));
        assert_eq!(totals.breakdown.len(), 1);
    }

    #[test]
    fn apply_brackets_zero_income_is_empty() {
        let totals = computer(input_with(dec!(0))).apply_brackets(Decimal::ZERO);

        assert_eq!(totals, BracketTotals::default());
    }

    #[test]
    fn apply_brackets_leaves_gap_untaxed() {
        let mut input = input_with(dec!(20000));
        input.brackets = vec![
            TaxBracket::new(dec!(0), Some(dec!(10000)), dec!(10)),
            TaxBracket::new(dec!(12000), None, dec!(20)),
        ];

        let totals = computer(input).apply_brackets(dec!(20000));

        // 10000 × 10% + 8000 × 20%; 10000..12000 falls in the gap
        assert_eq!(totals.tax_owed, dec!(2600));
    }

    #[test]
    fn apply_brackets_double_counts_overlap() {
        let mut input = input_with(dec!(15000));
        input.brackets = vec![
            TaxBracket::new(dec!(0), Some(dec!(12000)), dec!(10)),
            TaxBracket::new(dec!(10000), None, dec!(20)),
        ];

        let totals = computer(input).apply_brackets(dec!(15000));

        // 12000 × 10% + 5000 × 20%
        assert_eq!(totals.tax_owed, dec!(2200));
    }

    #[test]
    fn apply_brackets_omits_inverted_bracket() {
        let mut input = input_with(dec!(15000));
        input.brackets = vec![
            TaxBracket::new(dec!(0), Some(dec!(10000)), dec!(10)),
            TaxBracket::new(dec!(10000), Some(dec!(9000)), dec!(50)),
        ];

        let totals = computer(input).apply_brackets(dec!(15000));

        assert_eq!(totals.tax_owed, dec!(1000));
        assert_eq!(totals.marginal_rate_percent, dec!(10));
        assert_eq!(totals.breakdown.len(), 1);
    }

    #[test]
    fn apply_brackets_marginal_rate_is_last_bracket_touched() {
        let mut input = input_with(dec!(15000));
        input.brackets = vec![
            TaxBracket::new(dec!(0), Some(dec!(10000)), dec!(30)),
            TaxBracket::new(dec!(10000), None, dec!(5)),
        ];

        let totals = computer(input).apply_brackets(dec!(15000));

        assert_eq!(totals.marginal_rate_percent, dec!(5));
    }

    #[test]
    fn apply_brackets_us_single_schedule() {
        let mut input = input_with(dec!(85000));
        input.brackets = us_single_2025();

        let totals = computer(input).apply_brackets(dec!(85000));

        // 1192.50 + 4386 + (85000 - 48475) × 22% = 13614
        assert_eq!(totals.tax_owed, dec!(13614));
        assert_eq!(totals.marginal_rate_percent, dec!(22));
        assert_eq!(totals.breakdown.len(), 3);
    }

    // =========================================================================
    // compute (integration) tests
    // =========================================================================

    #[test]
    fn compute_two_bracket_example() {
        let result = compute(&input_with(dec!(15000)));

        assert_eq!(result.deductions, dec!(0));
        assert_eq!(result.taxable_income, dec!(15000));
        assert_eq!(result.tax_owed, dec!(2000));
        assert_eq!(result.marginal_rate_percent, dec!(20));
        assert_eq!(round_half_up(result.effective_rate_percent), dec!(13.33));
        assert_eq!(result.breakdown[0].tax_at_bracket, dec!(1000));
        assert_eq!(result.breakdown[0].taxable_at_bracket, dec!(10000));
        assert_eq!(result.breakdown[1].tax_at_bracket, dec!(1000));
        assert_eq!(result.breakdown[1].taxable_at_bracket, dec!(5000));
        assert!(!result.deductions_capped);
    }

    #[test]
    fn compute_zero_income() {
        let result = compute(&input_with(dec!(0)));

        assert_eq!(result.tax_owed, dec!(0));
        assert_eq!(result.effective_rate_percent, dec!(0));
        assert_eq!(result.deductions, dec!(0));
        assert!(result.breakdown.is_empty());
    }

    #[test]
    fn compute_negative_income_owes_nothing() {
        let mut input = input_with(dec!(-5000));
        input.standard_deduction = Some(dec!(1000));

        let result = compute(&input);

        assert_eq!(result.taxable_income, dec!(0));
        assert_eq!(result.tax_owed, dec!(0));
        assert_eq!(result.effective_rate_percent, dec!(0));
        assert!(result.deductions <= dec!(-5000));
    }

    #[test]
    fn compute_caps_deductions_at_gross_income() {
        let mut input = input_with(dec!(15000));
        input.standard_deduction = Some(dec!(20000));

        let result = compute(&input);

        assert_eq!(result.uncapped_deductions, dec!(20000));
        assert_eq!(result.deductions, dec!(15000));
        assert!(result.deductions_capped);
        assert_eq!(result.taxable_income, dec!(0));
        assert_eq!(result.tax_owed, dec!(0));
        assert!(result.breakdown.is_empty());
    }

    #[test]
    fn compute_includes_capped_pension_in_deductions() {
        let mut input = input_with(dec!(20000));
        input.pension_rate_percent = Some(dec!(5));
        input.pension_annual_cap = Some(dec!(500));

        let result = compute(&input);

        assert_eq!(result.statutory_pension, dec!(500));
        assert_eq!(result.uncapped_deductions, dec!(500));
        assert_eq!(result.taxable_income, dec!(19500));
        // 1000 + 9500 × 20%
        assert_eq!(result.tax_owed, dec!(2900));
    }

    #[test]
    fn compute_is_independent_of_bracket_order() {
        let sorted = input_with(dec!(15000));
        let mut reversed = sorted.clone();
        reversed.brackets.reverse();

        assert_eq!(compute(&reversed), compute(&sorted));
    }

    #[test]
    fn compute_with_all_fields_missing() {
        let result = compute(&TaxComputationInput::default());

        assert_eq!(result, TaxComputationResult::default());
    }

    #[test]
    fn compute_with_empty_table_owes_nothing() {
        let mut input = input_with(dec!(50000));
        input.brackets.clear();

        let result = compute(&input);

        assert_eq!(result.taxable_income, dec!(50000));
        assert_eq!(result.tax_owed, dec!(0));
        assert_eq!(result.marginal_rate_percent, dec!(0));
    }

    // =========================================================================
    // property tests
    // =========================================================================

    fn money(cents: i64) -> Decimal {
        Decimal::new(cents, 2)
    }

    fn property_input(
        gross: i64,
        standard: i64,
        additional: i64,
        pension_rate: u32,
    ) -> TaxComputationInput {
        TaxComputationInput {
            gross_income: Some(money(gross)),
            standard_deduction: Some(money(standard)),
            additional_deductions: Some(money(additional)),
            pension_rate_percent: Some(Decimal::from(pension_rate)),
            pension_annual_cap: Some(dec!(6000)),
            brackets: us_single_2025(),
        }
    }

    proptest! {
        #![proptest_config(proptest::test_runner::Config::with_cases(64))]

        #[test]
        fn prop_deductions_and_taxable_income_bounds(
            gross in 0i64..100_000_000,
            standard in 0i64..5_000_000,
            additional in -1_000_000i64..5_000_000,
            pension_rate in 0u32..20,
        ) {
            let input = property_input(gross, standard, additional, pension_rate);
            let result = compute(&input);

            prop_assert!(result.taxable_income >= Decimal::ZERO);
            prop_assert!(result.deductions <= money(gross));
            prop_assert_eq!(
                result.deductions_capped,
                result.uncapped_deductions > money(gross)
            );
        }

        #[test]
        fn prop_breakdown_sums_to_tax_owed(
            gross in 0i64..100_000_000,
            standard in 0i64..5_000_000,
        ) {
            let result = compute(&property_input(gross, standard, 0, 0));

            prop_assert_eq!(result.breakdown_total(), result.tax_owed);
        }

        #[test]
        fn prop_tax_is_monotonic_in_gross_income(
            gross in 0i64..100_000_000,
            raise in 0i64..10_000_000,
            standard in 0i64..5_000_000,
            pension_rate in 0u32..20,
        ) {
            let lower = compute(&property_input(gross, standard, 0, pension_rate));
            let higher = compute(&property_input(gross + raise, standard, 0, pension_rate));

            prop_assert!(higher.tax_owed >= lower.tax_owed);
        }

        #[test]
        fn prop_bracket_order_does_not_matter(
            gross in 0i64..100_000_000,
            rotate in 0usize..7,
        ) {
            let sorted = property_input(gross, 0, 0, 0);
            let mut shuffled = sorted.clone();
            shuffled.brackets.rotate_left(rotate);

            prop_assert_eq!(compute(&shuffled), compute(&sorted));
        }
    }
}
