//! Toy Bank - a menu-driven terminal banking ledger
//!
//! - [`account`] - account model, the account store and balance operations
//! - [`cli`] - numbered-menu engine, the banking session and user ports
//! - [`database`] - snapshot persistence (SQLite and in-memory)
//! - [`config`] - configuration file handling

pub mod account;
pub mod cli;
pub mod config;
pub mod database;
