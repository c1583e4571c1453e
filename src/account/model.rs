use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Account model
///
/// Serialized field names match the snapshot format:
/// `login, password, owner, balance, accountNumber`, with the balance
/// written as a JSON number carrying every digit of the `Decimal`.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Account {
    pub login: String,
    pub password: String,
    pub owner: String,
    #[serde(with = "rust_decimal::serde::arbitrary_precision")]
    pub balance: Decimal,
    pub account_number: String,
}

impl Account {
    pub fn new(login: String, owner: String, password: String, account_number: String) -> Self {
        Self {
            login,
            password,
            owner,
            balance: Decimal::ZERO,
            account_number,
        }
    }
}
