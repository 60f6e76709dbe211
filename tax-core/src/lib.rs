pub mod calculations;
pub mod models;

pub use calculations::{BracketIssue, LedgerSummary, NormalizedInput, TaxComputer, compute};
pub use models::*;
