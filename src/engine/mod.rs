//! Pure ledger logic: balances, fill tracking, fees and the ledger's own storage.
//!
//! Nothing in here performs cross-contract calls; the chain drives these
//! types and wires in tokens, modifiers providers and successor ledgers.

pub mod balances;
pub mod fees;
pub mod fills;
pub mod ledger;

pub use balances::{BalanceBook, BalanceChanges, StagedBalances};
pub use fees::{nominal_fee, split_fee, FeeSplit};
pub use fills::FillTracker;
pub use ledger::{Settlement, TokenStore};
