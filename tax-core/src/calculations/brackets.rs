//! Data-quality checks for bracket tables.
//!
//! The progressive computation tolerates malformed tables and simply slices
//! whatever it is given. These checks let callers find out what is wrong with
//! a table, and let loaders reject it when they want to be strict.

use rust_decimal::Decimal;
use thiserror::Error;

use crate::models::{BracketCeiling, TaxBracket};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BracketIssue {
    #[error("bracket table is empty")]
    Empty,

    #[error("bracket starting at {min} has a ceiling {max} that is not above its floor")]
    InvertedRange { min: Decimal, max: Decimal },

    #[error("bracket starting at {min} has a negative rate {rate_percent}%")]
    NegativeRate { min: Decimal, rate_percent: Decimal },

    #[error("income between {upper} and {next} is not covered by any bracket")]
    Gap { upper: Decimal, next: Decimal },

    #[error("bracket starting at {next} overlaps the bracket ending at {upper}")]
    Overlap { upper: Decimal, next: Decimal },

    #[error("unbounded bracket starting at {min} is not the top bracket")]
    UnboundedNotTop { min: Decimal },
}

/// Lists every issue found in `brackets`, in ascending order of floor.
///
/// An empty result means the table is sorted-contiguous with a single
/// unbounded top bracket (or a bounded top, which is allowed).
///
/// ```
/// use rust_decimal_macros::dec;
/// use tax_core::TaxBracket;
/// use tax_core::calculations::{BracketIssue, inspect_brackets};
///
/// let brackets = vec![
///     TaxBracket::new(dec!(0), Some(dec!(10000)), dec!(10)),
///     TaxBracket::new(dec!(12000), None, dec!(20)),
/// ];
///
/// assert_eq!(
///     inspect_brackets(&brackets),
///     vec![BracketIssue::Gap { upper: dec!(10000), next: dec!(12000) }],
/// );
/// ```
pub fn inspect_brackets(brackets: &[TaxBracket]) -> Vec<BracketIssue> {
    if brackets.is_empty() {
        return vec![BracketIssue::Empty];
    }

    let mut sorted: Vec<&TaxBracket> = brackets.iter().collect();
    sorted.sort_by(|a, b| a.min.cmp(&b.min));

    let mut issues = Vec::new();
    for bracket in &sorted {
        if let BracketCeiling::Bounded(max) = bracket.max {
            if max <= bracket.min {
                issues.push(BracketIssue::InvertedRange {
                    min: bracket.min,
                    max,
                });
            }
        }
        if bracket.rate_percent < Decimal::ZERO {
            issues.push(BracketIssue::NegativeRate {
                min: bracket.min,
                rate_percent: bracket.rate_percent,
            });
        }
    }

    for pair in sorted.windows(2) {
        let (lower, next) = (pair[0], pair[1]);
        match lower.max {
            BracketCeiling::Unbounded => {
                issues.push(BracketIssue::UnboundedNotTop { min: lower.min });
            }
            BracketCeiling::Bounded(upper) if next.min > upper => {
                issues.push(BracketIssue::Gap {
                    upper,
                    next: next.min,
                });
            }
            BracketCeiling::Bounded(upper) if next.min < upper => {
                issues.push(BracketIssue::Overlap {
                    upper,
                    next: next.min,
                });
            }
            BracketCeiling::Bounded(_) => {}
        }
    }

    issues
}
