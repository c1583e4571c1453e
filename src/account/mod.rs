// Account management module
// This module provides the account model, the account store with its
// uniqueness rules, and the balance-changing operations.

mod id;
mod model;
mod store;
mod transactions;

pub use id::{generate_numeric_id, generate_numeric_id_with, IdGenerator, RandomIdGenerator};
pub use model::Account;
pub use store::{AccountError, AccountStore};
pub use transactions::{
    deposit, parse_amount, transfer, PendingTransfer, TransactionError, TransferOutcome,
};

/// Default number of digits in an account number
pub const ACCOUNT_NUMBER_LENGTH: usize = 4;

/// Snapshot key the store is saved under
pub const DEFAULT_SNAPSHOT_KEY: &str = "accounts";
