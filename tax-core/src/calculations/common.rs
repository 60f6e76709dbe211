//! Shared decimal helpers for the tax calculations.

use rust_decimal::{Decimal, RoundingStrategy};

pub const ONE_HUNDRED: Decimal = Decimal::ONE_HUNDRED;

/// Rounds a value to cents, with midpoints going away from zero.
///
/// ```
/// use rust_decimal_macros::dec;
/// use tax_core::calculations::common::round_half_up;
///
/// assert_eq!(round_half_up(dec!(123.454)), dec!(123.45));
/// assert_eq!(round_half_up(dec!(123.455)), dec!(123.46));
/// assert_eq!(round_half_up(dec!(-123.455)), dec!(-123.46));
/// ```
pub fn round_half_up(value: Decimal) -> Decimal {
    value.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)
}

/// Returns the larger of two values.
pub fn max(
    a: Decimal,
    b: Decimal,
) -> Decimal {
    if a > b { a } else { b }
}

/// `amount * percent / 100`, or `None` when the product does not fit in a
/// [`Decimal`].
///
/// ```
/// use rust_decimal_macros::dec;
/// use tax_core::calculations::common::percent_of;
///
/// assert_eq!(percent_of(dec!(20000), dec!(5)), Some(dec!(1000)));
/// assert_eq!(percent_of(rust_decimal::Decimal::MAX, dec!(200)), None);
/// ```
pub fn percent_of(
    amount: Decimal,
    percent: Decimal,
) -> Option<Decimal> {
    amount.checked_mul(percent)?.checked_div(ONE_HUNDRED)
}

/// `part / whole * 100`, or zero when `whole` is not positive.
pub fn ratio_percent(
    part: Decimal,
    whole: Decimal,
) -> Decimal {
    if whole <= Decimal::ZERO {
        return Decimal::ZERO;
    }
    part.checked_div(whole)
        .and_then(|ratio| ratio.checked_mul(ONE_HUNDRED))
        .unwrap_or(Decimal::ZERO)
}
