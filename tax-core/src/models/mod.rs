mod amount;
mod filing;
mod tax_bracket;
mod tax_computation;
mod tax_profile;
mod transaction;

pub use amount::{finite_amount, lenient, lenient_or_zero};
pub use filing::{FilingDraft, FilingState};
pub use tax_bracket::{BracketCeiling, BracketTable, TaxBracket};
pub use tax_computation::{BracketContribution, TaxComputationInput, TaxComputationResult};
pub use tax_profile::TaxProfile;
pub use transaction::{Transaction, TransactionKind};
