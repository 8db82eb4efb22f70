// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2025 Daniel Negri
//
// This program is free software: you can redistribute it and/or modify
// it under the terms of the GNU Affero General Public License as published by
// the Free Software Foundation, either version 3 of the License, or
// (at your option) any later version.
//
// This program is distributed in the hope that it will be useful,
// but WITHOUT ANY WARRANTY; without even the implied warranty of
// MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE. See the
// GNU Affero General Public License for more details.
//
// You should have received a copy of the GNU Affero General Public License
// along with this program. If not, see <https://www.gnu.org/licenses/>.

//! # Ledger Bank
//!
//! This library provides an in-memory banking ledger: clients own accounts,
//! and every deposit or withdrawal goes through the client's daily
//! transaction gate before it touches an account balance.
//!
//! ## Core Components
//!
//! - [`Bank`]: Registry of clients and accounts, entry point for callers
//! - [`Client`]: Account owner enforcing the daily transaction limit
//! - [`Account`]: Balance holder with withdrawal ceiling and history
//! - [`Transaction`]: Deposit or withdrawal request
//! - [`History`]: Append-only log of applied transactions with report views
//! - [`TransactionError`]: Reasons an operation is rejected
//!
//! ## Example
//!
//! ```
//! use ledger_bank::{Bank, Client, DocumentNumber, Transaction, TransactionKind};
//! use rust_decimal_macros::dec;
//!
//! let bank = Bank::new();
//! let document = DocumentNumber::new("123.456.789-01").unwrap();
//! let client = Client::new(
//!     "Maria Silva",
//!     Client::parse_date("15/03/1985").unwrap(),
//!     document.clone(),
//!     "Rua das Flores, 123",
//! );
//! bank.register_client(client).unwrap();
//! let account = bank.open_account(&document).unwrap();
//!
//! bank.execute(&document, account.number(), Transaction::deposit(dec!(1500))).unwrap();
//! assert!(bank
//!     .execute(&document, account.number(), Transaction::withdrawal(dec!(2000)))
//!     .is_err());
//!
//! assert_eq!(account.balance(), dec!(1500));
//! assert_eq!(
//!     account.history().filter_by_kind(Some(TransactionKind::Deposit)).count(),
//!     1
//! );
//! ```
//!
//! ## Thread Safety
//!
//! Each account serializes its own mutations, so the daily limit holds even
//! when many threads transact on the same account.

pub mod account;
pub mod audit;
mod bank;
mod base;
mod client;
pub mod config;
pub mod error;
pub mod history;
mod transaction;

pub use account::{Account, AccountSummary};
pub use audit::AuditLog;
pub use bank::Bank;
pub use base::{AccountNumber, DocumentNumber};
pub use client::Client;
pub use config::LedgerConfig;
pub use error::TransactionError;
pub use history::{History, TransactionRecord};
pub use transaction::{Transaction, TransactionKind};
