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

//! Client and account registry.
//!
//! The [`Bank`] is the entry point for callers. It keeps every registered
//! [`Client`] keyed by document number and every [`Account`] keyed by account
//! number, and routes each operation to the right objects:
//!
//! - **Registration**: add a client, open accounts for it.
//! - **Transactions**: run a deposit or withdrawal through the owning client's
//!   daily gate.
//! - **Reports**: statements filtered by kind and day, and account summaries.
//!
//! Each public operation is written to the [`AuditLog`] when one is attached.
//!
//! # Thread Safety
//!
//! Rosters live in [`DashMap`]s and each account serializes its own
//! mutations, so operations on different accounts proceed in parallel.

use crate::account::{Account, AccountSummary};
use crate::audit::AuditLog;
use crate::base::{AccountNumber, DocumentNumber};
use crate::client::Client;
use crate::config::LedgerConfig;
use crate::history::TransactionRecord;
use crate::transaction::{Transaction, TransactionKind};
use crate::TransactionError;
use chrono::{Local, NaiveDate, NaiveDateTime};
use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use std::fmt;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;
use tracing::{error, info};

/// In-memory bank holding clients and their accounts.
///
/// # Invariants
///
/// - Document numbers are unique across clients.
/// - Account numbers are unique and assigned sequentially from 1.
/// - An account is only ever transacted on by the client that owns it.
pub struct Bank {
    config: LedgerConfig,
    /// Clients indexed by normalized document number.
    clients: DashMap<DocumentNumber, Client>,
    /// Accounts indexed by number.
    accounts: DashMap<AccountNumber, Arc<Account>>,
    next_account: AtomicU32,
    audit: Option<AuditLog>,
}

impl Bank {
    /// Creates an empty bank with the default limits.
    pub fn new() -> Self {
        Self::with_config(LedgerConfig::default())
    }

    pub fn with_config(config: LedgerConfig) -> Self {
        Bank {
            config,
            clients: DashMap::new(),
            accounts: DashMap::new(),
            next_account: AtomicU32::new(1),
            audit: None,
        }
    }

    /// Attaches an audit log that receives one line per public operation.
    pub fn with_audit_log(mut self, audit: AuditLog) -> Self {
        self.audit = Some(audit);
        self
    }

    pub fn config(&self) -> &LedgerConfig {
        &self.config
    }

    /// Registers a client.
    ///
    /// # Errors
    ///
    /// Returns [`TransactionError::DuplicateClient`] if the document number is
    /// already registered.
    pub fn register_client(&self, client: Client) -> Result<(), TransactionError> {
        let document = client.document().clone();
        let result = match self.clients.entry(document.clone()) {
            Entry::Occupied(_) => Err(TransactionError::DuplicateClient),
            Entry::Vacant(entry) => {
                info!(client = %document, name = client.name(), "client registered");
                entry.insert(client);
                Ok(())
            }
        };
        self.audit("register_client", &[&document.as_str()], &[], &result);
        result
    }

    /// Opens a new account for the client with `document`.
    ///
    /// # Errors
    ///
    /// Returns [`TransactionError::ClientNotFound`] if no such client exists.
    pub fn open_account(
        &self,
        document: &DocumentNumber,
    ) -> Result<Arc<Account>, TransactionError> {
        let result = self.open_account_inner(document);
        self.audit(
            "open_account",
            &[&document.as_str()],
            &[],
            &result.as_ref().map(|account| account.number().0),
        );
        result
    }

    fn open_account_inner(
        &self,
        document: &DocumentNumber,
    ) -> Result<Arc<Account>, TransactionError> {
        let mut client = self
            .clients
            .get_mut(document)
            .ok_or(TransactionError::ClientNotFound)?;

        let number = AccountNumber(self.next_account.fetch_add(1, Ordering::Relaxed));
        let account = Arc::new(Account::with_config(
            number,
            document.clone(),
            client.name(),
            &self.config,
        ));
        client.add_account(Arc::clone(&account));
        drop(client);

        self.accounts.insert(number, Arc::clone(&account));
        info!(client = %document, account = %number, branch = %self.config.branch, "account opened");
        Ok(account)
    }

    /// Runs `transaction` on account `number` on behalf of the client with
    /// `document`, at the current local time.
    ///
    /// # Errors
    ///
    /// - [`TransactionError::AccountNotFound`] - No account with that number.
    /// - [`TransactionError::ClientMismatch`] - The account belongs to someone else.
    /// - [`TransactionError::ClientNotFound`] - No client with that document.
    /// - Any error of [`Client::execute_transaction`].
    pub fn execute(
        &self,
        document: &DocumentNumber,
        number: AccountNumber,
        transaction: Transaction,
    ) -> Result<(), TransactionError> {
        self.execute_at(document, number, transaction, Local::now().naive_local())
    }

    /// Like [`Bank::execute`], as if the local clock read `now`.
    pub fn execute_at(
        &self,
        document: &DocumentNumber,
        number: AccountNumber,
        transaction: Transaction,
        now: NaiveDateTime,
    ) -> Result<(), TransactionError> {
        let result = self.execute_inner(document, number, transaction, now);
        self.audit(
            "execute",
            &[&document.as_str(), &number.0],
            &[("transaction", &transaction)],
            &result,
        );
        result
    }

    fn execute_inner(
        &self,
        document: &DocumentNumber,
        number: AccountNumber,
        transaction: Transaction,
        now: NaiveDateTime,
    ) -> Result<(), TransactionError> {
        let account = self
            .get_account(number)
            .ok_or(TransactionError::AccountNotFound)?;
        if account.owner() != document {
            return Err(TransactionError::ClientMismatch);
        }

        let client = self
            .clients
            .get(document)
            .ok_or(TransactionError::ClientNotFound)?;
        client.execute_transaction_at(&account, transaction, now)
    }

    /// Records of account `number`, optionally narrowed to one kind and one day.
    ///
    /// # Errors
    ///
    /// Returns [`TransactionError::AccountNotFound`] if no such account exists.
    pub fn statement(
        &self,
        number: AccountNumber,
        kind: Option<TransactionKind>,
        date: Option<NaiveDate>,
    ) -> Result<Vec<TransactionRecord>, TransactionError> {
        let result = self.get_account(number).map(|account| {
            account.with_history(|history| {
                history
                    .filter_by_kind(kind)
                    .filter(|record| date.is_none_or(|date| record.date() == date))
                    .cloned()
                    .collect::<Vec<_>>()
            })
        });
        let result = result.ok_or(TransactionError::AccountNotFound);
        self.audit(
            "statement",
            &[&number.0],
            &[("kind", &kind), ("date", &date)],
            &result.as_ref().map(Vec::len),
        );
        result
    }

    /// Retrieves a client by document number.
    pub fn get_client(
        &self,
        document: &DocumentNumber,
    ) -> Option<dashmap::mapref::one::Ref<'_, DocumentNumber, Client>> {
        self.clients.get(document)
    }

    /// Retrieves an account by number.
    pub fn get_account(&self, number: AccountNumber) -> Option<Arc<Account>> {
        self.accounts.get(&number).map(|entry| Arc::clone(entry.value()))
    }

    /// Summaries of every account, ordered by account number.
    ///
    /// Each summary is taken when the iterator reaches it.
    pub fn summaries(&self) -> impl Iterator<Item = AccountSummary> + use<> {
        let mut accounts: Vec<Arc<Account>> = self
            .accounts
            .iter()
            .map(|entry| Arc::clone(entry.value()))
            .collect();
        accounts.sort_by_key(|account| account.number());
        accounts.into_iter().map(|account| account.summary())
    }

    pub fn client_count(&self) -> usize {
        self.clients.len()
    }

    pub fn account_count(&self) -> usize {
        self.accounts.len()
    }

    fn audit(
        &self,
        function: &str,
        args: &[&dyn fmt::Debug],
        kwargs: &[(&str, &dyn fmt::Debug)],
        returned: &dyn fmt::Debug,
    ) {
        let Some(log) = &self.audit else {
            return;
        };
        if let Err(e) = log.record(function, args, kwargs, returned) {
            error!(path = %log.path().display(), "failed to write audit log: {}", e);
        }
    }
}

impl Default for Bank {
    fn default() -> Self {
        Self::new()
    }
}
