use anyhow::Result;
use log::{debug, info};
use rust_decimal::Decimal;

use super::menu::{repeat_until, Menu, MenuHost};
use super::UserPort;
use crate::account::{self, AccountError, AccountStore, TransactionError, TransferOutcome};
use crate::config::Config;

/// What a menu action tells the loop around it
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MenuFlow {
    /// Show the same menu again
    Stay,
    /// Leave the current menu loop
    Exit,
}

/// One user's conversation with the bank, from the main menu to exit
pub struct Session<P> {
    port: P,
    store: AccountStore,
    title: String,
    allow_reset: bool,
}

impl<P: UserPort> MenuHost for Session<P> {
    fn port(&mut self) -> &mut dyn UserPort {
        &mut self.port
    }
}

impl<P: UserPort + 'static> Session<P> {
    pub fn new(port: P, store: AccountStore, config: &Config) -> Self {
        Self {
            port,
            store,
            title: config.app_name.clone(),
            allow_reset: config.session.allow_reset,
        }
    }

    pub fn store(&self) -> &AccountStore {
        &self.store
    }

    pub fn into_parts(self) -> (P, AccountStore) {
        (self.port, self.store)
    }

    /// Run the main menu until the user picks "Exit"
    pub fn run(&mut self) -> Result<()> {
        info!("Session started with {} account(s)", self.store.len());
        repeat_until(self, &MenuFlow::Exit, |session| session.main_menu())?;
        info!("Session ended");
        Ok(())
    }

    fn main_menu(&self) -> Menu<'static, Self, MenuFlow> {
        let menu = Menu::new(format!("{}\n\n", self.title))
            .option("Log into account", Self::sign_in)
            .option("Create new account", Self::sign_up);

        let menu = if self.allow_reset {
            menu.option("Reset all data", Self::reset)
        } else {
            menu
        };

        menu.option("Exit", Self::exit)
    }

    fn account_menu(&self, account_number: &str) -> Menu<'static, Self, MenuFlow> {
        let intro = match self.store.by_account_number(account_number).first() {
            Some(account) => format!(
                "Welcome, {}!\nAccount number: {}\nBalance: {}\n\n",
                account.owner, account.account_number, account.balance
            ),
            None => String::new(),
        };

        let transfer_from = account_number.to_string();
        let deposit_into = account_number.to_string();

        Menu::new(intro)
            .option("Transfer", move |session: &mut Self| {
                session.transfer(&transfer_from)
            })
            .option("Deposit", move |session: &mut Self| {
                session.deposit(&deposit_into)
            })
            .option("Log out", |_: &mut Self| Ok(MenuFlow::Exit))
    }

    fn sign_up(&mut self) -> Result<MenuFlow> {
        let Some(login) = self.port.prompt(
            "Enter a login you'd like to use to sign into our system:",
            None,
        )?
        else {
            return Ok(MenuFlow::Stay);
        };

        if !self.store.by_login(&login).is_empty() {
            self.port.alert(&AccountError::LoginTaken.to_string())?;
            return Ok(MenuFlow::Stay);
        }

        let Some(owner) = self.port.prompt("Enter your full name:", None)? else {
            return Ok(MenuFlow::Stay);
        };
        let Some(password) = self.port.prompt("Define a password for signing in:", None)? else {
            return Ok(MenuFlow::Stay);
        };

        match self.store.create_account(&login, &owner, &password) {
            Ok(account) => {
                // Shown as a prompt default so the number can be copied
                self.port.prompt(
                    "Great! Your new account number is:",
                    Some(&account.account_number),
                )?;
            }
            Err(e) => self.port.alert(&e.to_string())?,
        }

        Ok(MenuFlow::Stay)
    }

    fn sign_in(&mut self) -> Result<MenuFlow> {
        let Some(login) = self.port.prompt("Enter your login:", None)? else {
            return Ok(MenuFlow::Stay);
        };

        if self.store.by_login(&login).is_empty() {
            self.port.alert(&AccountError::NotFound.to_string())?;
            return Ok(MenuFlow::Stay);
        }

        let Some(password) = self.port.prompt("Enter your password:", None)? else {
            return Ok(MenuFlow::Stay);
        };

        let account_number = match self.store.authenticate(&login, &password) {
            Ok(account) => account.account_number.clone(),
            Err(e) => {
                self.port.alert(&e.to_string())?;
                return Ok(MenuFlow::Stay);
            }
        };

        debug!("Login {} entered account {}", login, account_number);
        repeat_until(self, &MenuFlow::Exit, |session| {
            session.account_menu(&account_number)
        })?;

        Ok(MenuFlow::Stay)
    }

    fn transfer(&mut self, account_number: &str) -> Result<MenuFlow> {
        if self.balance_of(account_number) <= Decimal::ZERO {
            self.port
                .alert(&TransactionError::NothingToTransfer.to_string())?;
            return Ok(MenuFlow::Stay);
        }

        let Some(destination) = self.port.prompt(
            "Enter the number of the account you want to transfer money to:",
            None,
        )?
        else {
            return Ok(MenuFlow::Stay);
        };
        let Some(amount) = self.port.prompt("Enter the amount to transfer:", None)? else {
            return Ok(MenuFlow::Stay);
        };

        let port = &mut self.port;
        let mut port_error = None;
        let result = account::transfer(
            &mut self.store,
            account_number,
            &amount,
            &destination,
            |pending| {
                let question = format!(
                    "Transfer {} to account {} owned by {}?",
                    pending.amount, pending.destination_number, pending.destination_owner
                );
                port.confirm(&question).unwrap_or_else(|e| {
                    port_error = Some(e);
                    false
                })
            },
        );

        if let Some(e) = port_error {
            return Err(e);
        }

        let message = match result {
            Ok(TransferOutcome::Completed) => format!(
                "Transfer completed. Your balance is now {}.",
                self.balance_of(account_number)
            ),
            Ok(TransferOutcome::Cancelled) => "Transfer cancelled.".to_string(),
            Err(e) => e.to_string(),
        };
        self.port.alert(&message)?;

        Ok(MenuFlow::Stay)
    }

    fn deposit(&mut self, account_number: &str) -> Result<MenuFlow> {
        let Some(amount) = self.port.prompt("Enter the amount to deposit:", None)? else {
            return Ok(MenuFlow::Stay);
        };

        let message = match account::deposit(&mut self.store, account_number, &amount) {
            Ok(balance) => format!("Deposit completed. Your balance is now {}.", balance),
            Err(e) => e.to_string(),
        };
        self.port.alert(&message)?;

        Ok(MenuFlow::Stay)
    }

    fn reset(&mut self) -> Result<MenuFlow> {
        if !self
            .port
            .confirm("This will permanently delete every account. Continue?")?
        {
            return Ok(MenuFlow::Stay);
        }

        match self.store.reset() {
            Ok(()) => self.port.alert("All data has been erased.")?,
            Err(e) => self.port.alert(&format!("Failed to erase data: {}", e))?,
        }

        Ok(MenuFlow::Stay)
    }

    fn exit(&mut self) -> Result<MenuFlow> {
        self.port.alert("See you next time!")?;
        Ok(MenuFlow::Exit)
    }

    fn balance_of(&self, account_number: &str) -> Decimal {
        self.store
            .by_account_number(account_number)
            .first()
            .map(|account| account.balance)
            .unwrap_or_default()
    }
}
