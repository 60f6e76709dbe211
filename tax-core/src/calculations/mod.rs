//! Tax calculations.
//!
//! The progressive computation is the entry point; the other modules feed it
//! (normalization, ledger aggregation) or inspect its inputs (bracket
//! diagnostics).

pub mod brackets;
pub mod common;
pub mod ledger;
pub mod normalize;
pub mod progressive;

pub use brackets::{BracketIssue, inspect_brackets};
pub use ledger::LedgerSummary;
pub use normalize::NormalizedInput;
pub use progressive::{TaxComputer, compute};
