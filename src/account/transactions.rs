use log::{debug, info, warn};
use rust_decimal::Decimal;
use std::fmt;
use std::str::FromStr;

use super::store::AccountStore;
use crate::database::StorageError;

/// Transaction processing errors
#[derive(Debug)]
pub enum TransactionError {
    /// Amount is not a number, or not strictly positive
    InvalidAmount,
    /// Source balance is zero or negative
    NothingToTransfer,
    /// Source balance is lower than the amount
    InsufficientFunds,
    /// A resulting balance would not fit in a `Decimal`
    AmountTooLarge,
    /// No account has the destination number
    DestinationNotFound,
    /// No account has the source number
    AccountNotFound,
    /// Snapshot could not be written; nothing was applied
    Storage(StorageError),
}

impl fmt::Display for TransactionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TransactionError::InvalidAmount => write!(f, "Please enter a valid, positive amount."),
            TransactionError::NothingToTransfer => write!(f, "There is nothing to transfer."),
            TransactionError::InsufficientFunds => write!(f, "Insufficient funds for transaction."),
            TransactionError::AmountTooLarge => {
                write!(f, "This amount would put the balance out of range.")
            }
            TransactionError::DestinationNotFound => {
                write!(f, "There is no account with such number.")
            }
            TransactionError::AccountNotFound => write!(f, "Account not found."),
            TransactionError::Storage(err) => write!(f, "Storage error: {}", err),
        }
    }
}

impl std::error::Error for TransactionError {}

impl From<StorageError> for TransactionError {
    fn from(error: StorageError) -> Self {
        TransactionError::Storage(error)
    }
}

/// A validated transfer waiting for the user's confirmation
#[derive(Debug, Clone, PartialEq)]
pub struct PendingTransfer {
    pub source_number: String,
    pub destination_number: String,
    pub destination_owner: String,
    pub amount: Decimal,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransferOutcome {
    Completed,
    Cancelled,
}

/// Parse user-typed amount text.
///
/// Accepts plain decimals and scientific notation; the result must be
/// strictly positive and no larger than `Decimal::MAX`. Trailing zeros are
/// dropped.
pub fn parse_amount(text: &str) -> Result<Decimal, TransactionError> {
    let text = text.trim();
    let amount = Decimal::from_str(text)
        .or_else(|_| Decimal::from_scientific(text))
        .map_err(|_| TransactionError::InvalidAmount)?;

    if amount <= Decimal::ZERO {
        return Err(TransactionError::InvalidAmount);
    }

    Ok(amount.normalize())
}

/// Add funds to an account and persist. Returns the new balance.
pub fn deposit(
    store: &mut AccountStore,
    account_number: &str,
    amount: &str,
) -> Result<Decimal, TransactionError> {
    let index = store
        .position_by_number(account_number)
        .ok_or(TransactionError::AccountNotFound)?;
    let amount = parse_amount(amount)?;

    store.apply_balance_changes(&[(index, amount)])?;

    let balance = store.account_at(index).balance;
    info!(
        "Deposit of {} to account {} completed, balance {}",
        amount, account_number, balance
    );
    Ok(balance)
}

/// Move funds between two accounts.
///
/// Checks run in a fixed order: source balance, amount, sufficient funds,
/// destination. `confirm` is asked only once every check has passed; both
/// balances change together or not at all.
pub fn transfer<F>(
    store: &mut AccountStore,
    source_number: &str,
    amount: &str,
    destination_number: &str,
    confirm: F,
) -> Result<TransferOutcome, TransactionError>
where
    F: FnOnce(&PendingTransfer) -> bool,
{
    debug!(
        "Initiating transfer of {} from account {} to account {}",
        amount, source_number, destination_number
    );

    let source = store
        .position_by_number(source_number)
        .ok_or(TransactionError::AccountNotFound)?;
    let balance = store.account_at(source).balance;

    if balance <= Decimal::ZERO {
        return Err(TransactionError::NothingToTransfer);
    }

    let amount = parse_amount(amount)?;

    if balance < amount {
        warn!(
            "Transfer of {} from account {} refused: balance is {}",
            amount, source_number, balance
        );
        return Err(TransactionError::InsufficientFunds);
    }

    let destination = store
        .position_by_number(destination_number)
        .ok_or(TransactionError::DestinationNotFound)?;

    let pending = PendingTransfer {
        source_number: source_number.to_string(),
        destination_number: destination_number.to_string(),
        destination_owner: store.account_at(destination).owner.clone(),
        amount,
    };

    if !confirm(&pending) {
        debug!("Transfer from account {} cancelled by user", source_number);
        return Ok(TransferOutcome::Cancelled);
    }

    store.apply_balance_changes(&[(source, -amount), (destination, amount)])?;

    info!(
        "Transfer of {} from {} to {} completed successfully",
        amount, source_number, destination_number
    );
    Ok(TransferOutcome::Completed)
}
