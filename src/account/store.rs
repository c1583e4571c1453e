use log::{debug, info, warn};
use rust_decimal::Decimal;

use super::id::{IdGenerator, RandomIdGenerator};
use super::model::Account;
use super::transactions::TransactionError;
use crate::database::{SnapshotStore, StorageError};

/// Account store error types
#[derive(Debug, thiserror::Error)]
pub enum AccountError {
    #[error("Account with this login already exists.")]
    LoginTaken,

    #[error("Sorry, but there is no account with such login.")]
    NotFound,

    #[error("Wrong password.")]
    WrongPassword,

    #[error("Account numbers need at least one digit.")]
    InvalidNumberLength,

    #[error("Sorry, there are no free account numbers left.")]
    NumbersExhausted,

    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),
}

/// Owns every account and keeps the persisted snapshot in sync with them.
///
/// Logins and account numbers are unique across the store. Every mutation
/// is followed by a full snapshot write; if that write fails the mutation
/// is undone, so memory and storage never disagree.
pub struct AccountStore {
    accounts: Vec<Account>,
    snapshots: Box<dyn SnapshotStore>,
    ids: Box<dyn IdGenerator>,
    key: String,
    number_length: usize,
}

impl AccountStore {
    /// Create a store bound to `snapshots` and restore whatever was saved under `key`
    pub fn open(
        snapshots: Box<dyn SnapshotStore>,
        key: &str,
        number_length: usize,
    ) -> Result<Self, AccountError> {
        if number_length == 0 {
            return Err(AccountError::InvalidNumberLength);
        }

        let mut store = Self {
            accounts: Vec::new(),
            snapshots,
            ids: Box::new(RandomIdGenerator),
            key: key.to_string(),
            number_length,
        };
        store.restore();
        Ok(store)
    }

    /// Replace the account number source
    pub fn with_id_generator(mut self, ids: Box<dyn IdGenerator>) -> Self {
        self.ids = ids;
        self
    }

    pub fn accounts(&self) -> &[Account] {
        &self.accounts
    }

    pub fn len(&self) -> usize {
        self.accounts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.accounts.is_empty()
    }

    /// Sum of every balance in the store, `None` if a `Decimal` cannot hold it exactly
    pub fn total_balance(&self) -> Option<Decimal> {
        self.accounts
            .iter()
            .try_fold(Decimal::ZERO, |total, account| exact_sum(total, account.balance))
    }

    pub fn by_login(&self, login: &str) -> Vec<&Account> {
        debug!("Searching for account with login equal to {}", login);
        self.accounts
            .iter()
            .filter(|account| account.login == login)
            .collect()
    }

    pub fn by_account_number(&self, account_number: &str) -> Vec<&Account> {
        debug!("Searching for account with number equal to {}", account_number);
        self.accounts
            .iter()
            .filter(|account| account.account_number == account_number)
            .collect()
    }

    /// Register a new account and persist the store
    pub fn create_account(
        &mut self,
        login: &str,
        owner: &str,
        password: &str,
    ) -> Result<Account, AccountError> {
        if !self.by_login(login).is_empty() {
            warn!("Refusing to create account: login {} is taken", login);
            return Err(AccountError::LoginTaken);
        }

        let account_number = self.unused_account_number()?;
        let account = Account::new(
            login.to_string(),
            owner.to_string(),
            password.to_string(),
            account_number,
        );

        self.accounts.push(account.clone());
        if let Err(e) = self.persist() {
            self.accounts.pop();
            return Err(e.into());
        }

        info!(
            "Account {} created for login {}",
            account.account_number, account.login
        );
        Ok(account)
    }

    /// Keep drawing candidates until one is not in use.
    ///
    /// Fails up front when every number of the configured length is taken.
    fn unused_account_number(&mut self) -> Result<String, AccountError> {
        let in_use = self
            .accounts
            .iter()
            .filter(|account| account.account_number.len() == self.number_length)
            .count();
        let capacity = u32::try_from(self.number_length)
            .ok()
            .and_then(|digits| 10usize.checked_pow(digits));

        if capacity.is_some_and(|capacity| in_use >= capacity) {
            warn!(
                "All {}-digit account numbers are in use",
                self.number_length
            );
            return Err(AccountError::NumbersExhausted);
        }

        loop {
            let candidate = self.ids.generate(self.number_length);
            if self.by_account_number(&candidate).is_empty() {
                return Ok(candidate);
            }
            debug!("Account number {} already in use, drawing another", candidate);
        }
    }

    /// Check a login/password pair against the store
    pub fn authenticate(&self, login: &str, password: &str) -> Result<&Account, AccountError> {
        let account = self
            .by_login(login)
            .into_iter()
            .next()
            .ok_or(AccountError::NotFound)?;

        if account.password != password {
            warn!("Wrong password supplied for login {}", login);
            return Err(AccountError::WrongPassword);
        }

        debug!("Login {} authenticated", login);
        Ok(account)
    }

    /// Write the whole store as one snapshot
    pub fn persist(&mut self) -> Result<(), StorageError> {
        let data = serde_json::to_string(&self.accounts)?;
        self.snapshots.save(&self.key, &data)
    }

    /// Reload the store from its snapshot.
    ///
    /// A missing, unreadable or corrupt snapshot leaves the store empty.
    pub fn restore(&mut self) {
        self.accounts = match self.snapshots.load(&self.key) {
            Ok(Some(data)) => match serde_json::from_str::<Vec<Account>>(&data) {
                Ok(accounts) => {
                    debug!("Restored {} account(s) from snapshot '{}'", accounts.len(), self.key);
                    accounts
                }
                Err(e) => {
                    warn!("Snapshot '{}' is corrupt, starting empty: {}", self.key, e);
                    Vec::new()
                }
            },
            Ok(None) => {
                debug!("No snapshot '{}' found, starting empty", self.key);
                Vec::new()
            }
            Err(e) => {
                warn!("Failed to read snapshot '{}', starting empty: {}", self.key, e);
                Vec::new()
            }
        };
    }

    /// Drop every account and erase the persisted snapshot
    pub fn reset(&mut self) -> Result<(), StorageError> {
        self.accounts = Vec::new();
        self.snapshots.delete(&self.key)?;
        info!("Account store reset");
        Ok(())
    }

    pub(crate) fn position_by_number(&self, account_number: &str) -> Option<usize> {
        self.accounts
            .iter()
            .position(|account| account.account_number == account_number)
    }

    pub(crate) fn account_at(&self, index: usize) -> &Account {
        &self.accounts[index]
    }

    /// Apply balance deltas by index and persist, all or nothing.
    ///
    /// Every new balance is computed before any account is touched; a sum
    /// that a `Decimal` cannot hold exactly fails with `AmountTooLarge`.
    pub(crate) fn apply_balance_changes(
        &mut self,
        changes: &[(usize, Decimal)],
    ) -> Result<(), TransactionError> {
        let mut updated: Vec<(usize, Decimal)> = Vec::with_capacity(changes.len());
        for &(index, delta) in changes {
            let current = updated
                .iter()
                .rev()
                .find(|(i, _)| *i == index)
                .map(|&(_, balance)| balance)
                .unwrap_or(self.accounts[index].balance);
            let balance = exact_sum(current, delta).ok_or(TransactionError::AmountTooLarge)?;
            updated.push((index, balance));
        }

        let previous: Vec<(usize, Decimal)> = changes
            .iter()
            .map(|&(index, _)| (index, self.accounts[index].balance))
            .collect();
        for &(index, balance) in &updated {
            self.accounts[index].balance = balance;
        }

        if let Err(e) = self.persist() {
            for &(index, balance) in previous.iter().rev() {
                self.accounts[index].balance = balance;
            }
            return Err(e.into());
        }

        Ok(())
    }
}

/// `a + b`, unless it overflows or has to be rounded to fit.
///
/// Addition only drops scale when the exact result does not fit in 96 bits.
fn exact_sum(a: Decimal, b: Decimal) -> Option<Decimal> {
    let sum = a.checked_add(b)?;
    if a.is_zero() || b.is_zero() || sum.scale() >= a.scale().max(b.scale()) {
        Some(sum)
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::account::id::MockIdGenerator;
    use crate::database::{MemorySnapshotStore, MockSnapshotStore};
    use mockall::predicate::eq;
    use std::collections::HashSet;

    fn empty_store() -> (AccountStore, MemorySnapshotStore) {
        let handle = MemorySnapshotStore::new();
        let store = AccountStore::open(Box::new(handle.clone()), "accounts", 4).unwrap();
        (store, handle)
    }

    #[test]
    fn test_create_account_persists() {
        let (mut store, handle) = empty_store();

        let account = store.create_account("alice", "Alice", "pw").unwrap();

        assert_eq!(account.balance, Decimal::ZERO);
        assert_eq!(account.account_number.len(), 4);
        assert_eq!(store.len(), 1);

        let saved = handle.get("accounts").unwrap();
        assert!(saved.contains("\"accountNumber\""));
        assert!(saved.contains("alice"));
    }

    #[test]
    fn test_duplicate_login_is_rejected() {
        let (mut store, _handle) = empty_store();

        store.create_account("alice", "Alice", "pw").unwrap();
        let result = store.create_account("alice", "Someone Else", "other");

        assert!(matches!(result, Err(AccountError::LoginTaken)));
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn test_logins_are_case_sensitive() {
        let (mut store, _handle) = empty_store();

        store.create_account("alice", "Alice", "pw").unwrap();
        store.create_account("Alice", "Alice", "pw").unwrap();

        assert_eq!(store.len(), 2);
    }

    #[test]
    fn test_logins_and_numbers_stay_unique() {
        let (mut store, _handle) = empty_store();

        for i in 0..200 {
            store
                .create_account(&format!("user{}", i), "Someone", "pw")
                .unwrap();
        }

        let logins: HashSet<_> = store.accounts().iter().map(|a| &a.login).collect();
        let numbers: HashSet<_> = store.accounts().iter().map(|a| &a.account_number).collect();

        assert_eq!(logins.len(), 200);
        assert_eq!(numbers.len(), 200);
    }

    #[test]
    fn test_account_number_collisions_are_redrawn() {
        let mut ids = MockIdGenerator::new();
        let mut queue = vec!["2222", "1111", "1111", "1111"];
        ids.expect_generate()
            .with(eq(4))
            .times(4)
            .returning(move |_| queue.pop().unwrap().to_string());

        let (store, _handle) = empty_store();
        let mut store = store.with_id_generator(Box::new(ids));

        let first = store.create_account("alice", "Alice", "pw").unwrap();
        let second = store.create_account("bob", "Bob", "pw").unwrap();

        assert_eq!(first.account_number, "1111");
        assert_eq!(second.account_number, "2222");
    }

    #[test]
    fn test_authenticate() {
        let (mut store, _handle) = empty_store();
        store.create_account("alice", "Alice", "pw").unwrap();

        assert_eq!(store.authenticate("alice", "pw").unwrap().owner, "Alice");
        assert!(matches!(
            store.authenticate("alice", "PW"),
            Err(AccountError::WrongPassword)
        ));
        assert!(matches!(
            store.authenticate("carol", "pw"),
            Err(AccountError::NotFound)
        ));
    }

    #[test]
    fn test_lookups_return_empty_when_nothing_matches() {
        let (mut store, _handle) = empty_store();
        let account = store.create_account("alice", "Alice", "pw").unwrap();

        assert!(store.by_login("nobody").is_empty());
        assert!(store.by_account_number("nope").is_empty());
        assert_eq!(store.by_account_number(&account.account_number).len(), 1);
    }

    #[test]
    fn test_restore_round_trip() {
        let (mut store, handle) = empty_store();
        store.create_account("alice", "Alice", "pw").unwrap();
        store.create_account("bob", "Bob", "secret").unwrap();
        store
            .apply_balance_changes(&[(0, "12.5".parse().unwrap()), (1, Decimal::from(-3))])
            .unwrap();

        let reopened = AccountStore::open(Box::new(handle), "accounts", 4).unwrap();

        assert_eq!(reopened.accounts(), store.accounts());
    }

    #[test]
    fn test_restore_keeps_every_digit() {
        let (mut store, handle) = empty_store();
        store.create_account("alice", "Alice", "pw").unwrap();
        let big: Decimal = "12345678901234567.89".parse().unwrap();
        store.apply_balance_changes(&[(0, big)]).unwrap();

        let saved = handle.get("accounts").unwrap();
        assert!(saved.contains("\"balance\":12345678901234567.89"));

        let reopened = AccountStore::open(Box::new(handle), "accounts", 4).unwrap();
        assert_eq!(reopened.accounts()[0].balance, big);
        assert_eq!(reopened.total_balance(), store.total_balance());
    }

    #[test]
    fn test_overflowing_change_touches_nothing() {
        let (mut store, handle) = empty_store();
        store.create_account("alice", "Alice", "pw").unwrap();
        store.create_account("bob", "Bob", "pw").unwrap();
        store
            .apply_balance_changes(&[(1, Decimal::MAX)])
            .unwrap();
        let saved = handle.get("accounts").unwrap();

        let result = store.apply_balance_changes(&[(0, Decimal::ONE), (1, Decimal::ONE)]);

        assert!(matches!(result, Err(TransactionError::AmountTooLarge)));
        assert_eq!(store.accounts()[0].balance, Decimal::ZERO);
        assert_eq!(store.accounts()[1].balance, Decimal::MAX);
        assert_eq!(handle.get("accounts").unwrap(), saved);
    }

    #[test]
    fn test_total_balance_beyond_range() {
        let (mut store, _handle) = empty_store();
        store.create_account("alice", "Alice", "pw").unwrap();
        store.create_account("bob", "Bob", "pw").unwrap();
        store
            .apply_balance_changes(&[(0, Decimal::MAX), (1, Decimal::MAX)])
            .unwrap();

        assert_eq!(store.total_balance(), None);
    }

    #[test]
    fn test_rounded_change_is_refused() {
        let (mut store, _handle) = empty_store();
        store.create_account("alice", "Alice", "pw").unwrap();
        store.apply_balance_changes(&[(0, Decimal::from(100))]).unwrap();

        let result = store.apply_balance_changes(&[(0, Decimal::new(1, 28))]);

        assert!(matches!(result, Err(TransactionError::AmountTooLarge)));
        assert_eq!(store.accounts()[0].balance, Decimal::from(100));
    }

    #[test]
    fn test_zero_length_numbers_are_rejected() {
        let result = AccountStore::open(Box::new(MemorySnapshotStore::new()), "accounts", 0);

        assert!(matches!(result, Err(AccountError::InvalidNumberLength)));
    }

    #[test]
    fn test_exhausted_numbers_fail_instead_of_looping() {
        let mut store = AccountStore::open(Box::new(MemorySnapshotStore::new()), "accounts", 1)
            .unwrap();

        for i in 0..10 {
            store
                .create_account(&format!("user{}", i), "Someone", "pw")
                .unwrap();
        }
        let result = store.create_account("user10", "Someone", "pw");

        assert!(matches!(result, Err(AccountError::NumbersExhausted)));
        assert_eq!(store.len(), 10);
    }

    #[test]
    fn test_corrupt_snapshot_restores_empty() {
        let handle = MemorySnapshotStore::new();
        handle.insert("accounts", "{not json");

        let store = AccountStore::open(Box::new(handle), "accounts", 4).unwrap();

        assert!(store.is_empty());
    }

    #[test]
    fn test_unreadable_snapshot_restores_empty() {
        let mut snapshots = MockSnapshotStore::new();
        snapshots.expect_load().returning(|_| {
            Err(StorageError::Io(std::io::Error::new(
                std::io::ErrorKind::PermissionDenied,
                "denied",
            )))
        });

        let store = AccountStore::open(Box::new(snapshots), "accounts", 4).unwrap();

        assert!(store.is_empty());
    }

    #[test]
    fn test_failed_persist_rolls_back_creation() {
        let mut snapshots = MockSnapshotStore::new();
        snapshots.expect_load().returning(|_| Ok(None));
        snapshots.expect_save().times(1).returning(|_, _| {
            Err(StorageError::Io(std::io::Error::new(
                std::io::ErrorKind::Other,
                "disk full",
            )))
        });

        let mut store = AccountStore::open(Box::new(snapshots), "accounts", 4).unwrap();
        let result = store.create_account("alice", "Alice", "pw");

        assert!(matches!(result, Err(AccountError::Storage(_))));
        assert!(store.is_empty());
    }

    #[test]
    fn test_reset_discards_accounts_and_snapshot() {
        let (mut store, handle) = empty_store();
        store.create_account("alice", "Alice", "pw").unwrap();

        store.reset().unwrap();

        assert!(store.is_empty());
        assert!(!handle.contains("accounts"));

        let reopened = AccountStore::open(Box::new(handle), "accounts", 4).unwrap();
        assert!(reopened.is_empty());
    }
}
