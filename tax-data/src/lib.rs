//! CSV loaders for bracket tables and transaction ledgers.

pub mod loader;
pub mod transactions;

pub use loader::{TaxBracketLoader, TaxBracketLoaderError, TaxBracketRecord};
pub use transactions::{TransactionLoader, TransactionLoaderError};
