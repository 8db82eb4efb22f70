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

//! Clients and the daily transaction gate.
//!
//! Every transaction a client makes goes through
//! [`Client::execute_transaction`], which admits at most
//! [`daily_transaction_limit`](crate::LedgerConfig::daily_transaction_limit)
//! successful transactions per account per calendar day. Only recorded
//! transactions count; rejected attempts do not consume the budget.

use crate::account::Account;
use crate::base::DocumentNumber;
use crate::transaction::Transaction;
use crate::TransactionError;
use chrono::{Local, NaiveDate, NaiveDateTime};
use std::sync::Arc;
use tracing::{debug, warn};

/// Date format accepted for birth dates.
pub const DATE_FORMAT: &str = "%d/%m/%Y";

/// Bank client (natural person).
#[derive(Debug, Clone)]
pub struct Client {
    name: String,
    birth_date: NaiveDate,
    document: DocumentNumber,
    address: String,
    accounts: Vec<Arc<Account>>,
}

impl Client {
    pub fn new(
        name: impl Into<String>,
        birth_date: NaiveDate,
        document: DocumentNumber,
        address: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            birth_date,
            document,
            address: address.into(),
            accounts: Vec::new(),
        }
    }

    /// Parses a `dd/mm/yyyy` date.
    ///
    /// # Errors
    ///
    /// Returns [`TransactionError::InvalidDate`] on any other shape.
    pub fn parse_date(raw: &str) -> Result<NaiveDate, TransactionError> {
        NaiveDate::parse_from_str(raw.trim(), DATE_FORMAT).map_err(|_| TransactionError::InvalidDate)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn birth_date(&self) -> NaiveDate {
        self.birth_date
    }

    pub fn document(&self) -> &DocumentNumber {
        &self.document
    }

    pub fn address(&self) -> &str {
        &self.address
    }

    /// Owned accounts, in the order they were added.
    pub fn accounts(&self) -> &[Arc<Account>] {
        &self.accounts
    }

    pub fn add_account(&mut self, account: Arc<Account>) {
        self.accounts.push(account);
    }

    /// Runs `transaction` against `account` at the current local time.
    ///
    /// # Errors
    ///
    /// - [`TransactionError::DailyLimitReached`] - The account already recorded
    ///   its daily quota of transactions; the transaction is not attempted.
    /// - Any rejection of the transaction itself: [`TransactionError::InvalidAmount`],
    ///   [`TransactionError::InsufficientFunds`], [`TransactionError::LimitExceeded`] or
    ///   [`TransactionError::WithdrawalCountExceeded`].
    pub fn execute_transaction(
        &self,
        account: &Account,
        transaction: Transaction,
    ) -> Result<(), TransactionError> {
        self.execute_transaction_at(account, transaction, Local::now().naive_local())
    }

    /// Like [`Client::execute_transaction`], as if the local clock read `now`.
    pub fn execute_transaction_at(
        &self,
        account: &Account,
        transaction: Transaction,
        now: NaiveDateTime,
    ) -> Result<(), TransactionError> {
        // Count and apply under one lock so concurrent callers cannot both
        // slip under the limit.
        let mut data = account.lock();

        let limit = data.daily_transaction_limit;
        let today = data.history.count_on(now.date());
        if today >= limit {
            warn!(
                account = %account.number(),
                client = %self.document,
                limit,
                "daily transaction limit reached, {} rejected",
                transaction
            );
            return Err(TransactionError::DailyLimitReached { limit });
        }

        match transaction.apply(&mut data, now) {
            Ok(()) => {
                debug!(
                    account = %account.number(),
                    client = %self.document,
                    balance = %data.balance,
                    "{} applied",
                    transaction
                );
                Ok(())
            }
            Err(e) => {
                warn!(
                    account = %account.number(),
                    client = %self.document,
                    "{} rejected: {}",
                    transaction,
                    e
                );
                Err(e)
            }
        }
    }
}
