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

//! Account management.
//!
//! An [`Account`] holds a balance and the history of the transactions that
//! moved it. The balance only changes through two crate-private primitives:
//! a deposit credits a strictly positive amount, and a withdrawal debits a
//! strictly positive amount without ever letting the balance go negative.
//!
//! Callers outside the crate get read access only. Every mutation goes through
//! [`Client::execute_transaction`](crate::Client::execute_transaction), which
//! enforces the daily transaction limit and records the history.
//!
//! # Example
//!
//! ```
//! use rust_decimal_macros::dec;
//! use ledger_bank::{Account, AccountNumber, DocumentNumber};
//!
//! let owner = DocumentNumber::new("123.456.789-01").unwrap();
//! let account = Account::new(AccountNumber(1), owner, "Maria Silva");
//! assert_eq!(account.balance(), dec!(0.00));
//! assert_eq!(account.ceiling(), dec!(500.00));
//! ```
//!
//! A shared account handle cannot move money on its own:
//!
//! ```compile_fail
//! use rust_decimal_macros::dec;
//! use ledger_bank::{Account, AccountNumber, DocumentNumber};
//!
//! let owner = DocumentNumber::new("12345678901").unwrap();
//! let account = Account::new(AccountNumber(1), owner, "Maria Silva");
//! account.deposit(dec!(10)).unwrap();
//! ```

use crate::base::{AccountNumber, DocumentNumber};
use crate::config::LedgerConfig;
use crate::history::History;
use crate::transaction::TransactionKind;
use crate::TransactionError;
use chrono::NaiveDate;
use parking_lot::{Mutex, MutexGuard};
use rust_decimal::Decimal;
use serde::Serialize;
use std::fmt;

#[derive(Debug)]
pub(crate) struct AccountData {
    pub(crate) balance: Decimal,
    pub(crate) history: History,
    ceiling: Decimal,
    daily_withdrawal_limit: usize,
    pub(crate) daily_transaction_limit: usize,
}

impl AccountData {
    pub(crate) fn new(config: &LedgerConfig) -> Self {
        Self {
            balance: Decimal::ZERO,
            history: History::new(),
            ceiling: config.withdrawal_ceiling,
            daily_withdrawal_limit: config.daily_withdrawal_limit,
            daily_transaction_limit: config.daily_transaction_limit,
        }
    }

    fn assert_invariants(&self) {
        debug_assert!(
            self.balance >= Decimal::ZERO,
            "Invariant violated: balance went negative: {}",
            self.balance
        );
    }

    /// Increases the balance.
    pub(crate) fn deposit(&mut self, amount: Decimal) -> Result<(), TransactionError> {
        if amount <= Decimal::ZERO {
            return Err(TransactionError::InvalidAmount);
        }
        self.balance += amount;
        self.assert_invariants();
        Ok(())
    }

    /// Decreases the balance.
    ///
    /// Checks run in a fixed order and the first failure is reported: funds,
    /// ceiling, withdrawals already made on `today`, and finally positivity.
    pub(crate) fn withdraw(
        &mut self,
        amount: Decimal,
        today: NaiveDate,
    ) -> Result<(), TransactionError> {
        if amount > self.balance {
            return Err(TransactionError::InsufficientFunds);
        }
        if amount > self.ceiling {
            return Err(TransactionError::LimitExceeded {
                ceiling: self.ceiling,
            });
        }
        if self
            .history
            .count_kind_on(TransactionKind::Withdrawal, today)
            >= self.daily_withdrawal_limit
        {
            return Err(TransactionError::WithdrawalCountExceeded {
                limit: self.daily_withdrawal_limit,
            });
        }
        if amount <= Decimal::ZERO {
            return Err(TransactionError::InvalidAmount);
        }
        self.balance -= amount;
        self.assert_invariants();
        Ok(())
    }
}

/// Bank account.
#[derive(Debug)]
pub struct Account {
    number: AccountNumber,
    branch: String,
    owner: DocumentNumber,
    holder: String,
    inner: Mutex<AccountData>,
}

impl Account {
    const DECIMAL_PRECISION: u32 = 2;

    /// Creates an empty account with the default limits.
    pub fn new(number: AccountNumber, owner: DocumentNumber, holder: impl Into<String>) -> Self {
        Self::with_config(number, owner, holder, &LedgerConfig::default())
    }

    /// Creates an empty account with the branch and limits of `config`.
    pub fn with_config(
        number: AccountNumber,
        owner: DocumentNumber,
        holder: impl Into<String>,
        config: &LedgerConfig,
    ) -> Self {
        Self {
            number,
            branch: config.branch.clone(),
            owner,
            holder: holder.into(),
            inner: Mutex::new(AccountData::new(config)),
        }
    }

    pub fn number(&self) -> AccountNumber {
        self.number
    }

    pub fn branch(&self) -> &str {
        &self.branch
    }

    /// Document number of the owning client.
    pub fn owner(&self) -> &DocumentNumber {
        &self.owner
    }

    /// Display name of the owning client.
    pub fn holder(&self) -> &str {
        &self.holder
    }

    pub fn balance(&self) -> Decimal {
        self.inner.lock().balance
    }

    pub fn ceiling(&self) -> Decimal {
        self.inner.lock().ceiling
    }

    pub fn daily_withdrawal_limit(&self) -> usize {
        self.inner.lock().daily_withdrawal_limit
    }

    pub fn daily_transaction_limit(&self) -> usize {
        self.inner.lock().daily_transaction_limit
    }

    /// Snapshot of the account history.
    pub fn history(&self) -> History {
        self.inner.lock().history.clone()
    }

    /// Runs `f` against the history without copying it.
    ///
    /// The account stays locked while `f` runs, so `f` must not call back into
    /// this account.
    pub fn with_history<R>(&self, f: impl FnOnce(&History) -> R) -> R {
        f(&self.inner.lock().history)
    }

    /// Read-only projection for reports.
    pub fn summary(&self) -> AccountSummary {
        let data = self.inner.lock();
        AccountSummary {
            branch: self.branch.clone(),
            number: self.number,
            holder: self.holder.clone(),
            document: self.owner.clone(),
            balance: data.balance.round_dp(Self::DECIMAL_PRECISION),
            transactions: data.history.len(),
        }
    }

    /// Locks the account state. Held for the whole check-then-apply sequence.
    pub(crate) fn lock(&self) -> MutexGuard<'_, AccountData> {
        self.inner.lock()
    }
}

/// Point-in-time view of an account, as shown in statements.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AccountSummary {
    pub branch: String,
    #[serde(rename = "account")]
    pub number: AccountNumber,
    pub holder: String,
    pub document: DocumentNumber,
    pub balance: Decimal,
    pub transactions: usize,
}

impl fmt::Display for AccountSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Branch:\t\t{}", self.branch)?;
        writeln!(f, "Account:\t{}", self.number)?;
        writeln!(f, "Holder:\t\t{}", self.holder)?;
        writeln!(f, "Balance:\t{:.2}", self.balance)?;
        write!(f, "Transactions:\t{}", self.transactions)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 3, 15).unwrap()
    }

    fn data_with(balance: Decimal) -> AccountData {
        let mut data = AccountData::new(&LedgerConfig::default());
        data.balance = balance;
        data
    }

    // === AccountData Internal Tests ===

    #[test]
    fn account_data_deposit_and_withdraw() {
        let mut data = data_with(Decimal::ZERO);
        data.deposit(dec!(100.00)).unwrap();
        data.withdraw(dec!(30.00), today()).unwrap();
        assert_eq!(data.balance, dec!(70.00));
    }

    #[test]
    fn withdraw_checks_funds_before_ceiling() {
        let mut data = data_with(dec!(100));
        assert_eq!(
            data.withdraw(dec!(600), today()),
            Err(TransactionError::InsufficientFunds)
        );
    }

    #[test]
    fn withdraw_checks_ceiling_before_count() {
        let mut data = data_with(dec!(1000));
        for _ in 0..3 {
            data.history.append(crate::TransactionRecord::new(
                TransactionKind::Withdrawal,
                dec!(1),
                today().and_hms_opt(10, 0, 0).unwrap(),
            ));
        }
        assert_eq!(
            data.withdraw(dec!(600), today()),
            Err(TransactionError::LimitExceeded {
                ceiling: dec!(500.00)
            })
        );
        assert_eq!(
            data.withdraw(dec!(100), today()),
            Err(TransactionError::WithdrawalCountExceeded { limit: 3 })
        );
    }

    #[test]
    fn withdraw_count_resets_on_a_new_day() {
        let mut data = data_with(dec!(1000));
        for _ in 0..3 {
            data.history.append(crate::TransactionRecord::new(
                TransactionKind::Withdrawal,
                dec!(1),
                today().and_hms_opt(23, 59, 59).unwrap(),
            ));
        }
        let tomorrow = today().succ_opt().unwrap();
        assert_eq!(data.withdraw(dec!(100), tomorrow), Ok(()));
    }

    #[test]
    fn withdraw_checks_count_before_positivity() {
        let mut data = data_with(dec!(1000));
        for _ in 0..3 {
            data.history.append(crate::TransactionRecord::new(
                TransactionKind::Withdrawal,
                dec!(1),
                today().and_hms_opt(10, 0, 0).unwrap(),
            ));
        }
        assert_eq!(
            data.withdraw(Decimal::ZERO, today()),
            Err(TransactionError::WithdrawalCountExceeded { limit: 3 })
        );
    }

    #[test]
    fn withdraw_non_positive_is_invalid() {
        let mut data = data_with(dec!(100));
        assert_eq!(
            data.withdraw(Decimal::ZERO, today()),
            Err(TransactionError::InvalidAmount)
        );
        assert_eq!(
            data.withdraw(dec!(-5), today()),
            Err(TransactionError::InvalidAmount)
        );
        assert_eq!(data.balance, dec!(100));
    }

    #[test]
    fn withdraw_entire_balance() {
        let mut data = data_with(dec!(250));
        data.withdraw(dec!(250), today()).unwrap();
        assert_eq!(data.balance, Decimal::ZERO);
    }

    #[test]
    fn deposit_non_positive_is_invalid() {
        let mut data = data_with(Decimal::ZERO);
        assert_eq!(data.deposit(Decimal::ZERO), Err(TransactionError::InvalidAmount));
        assert_eq!(data.deposit(dec!(-1)), Err(TransactionError::InvalidAmount));
        assert_eq!(data.balance, Decimal::ZERO);
    }

    // === Summary Tests ===

    #[test]
    fn summary_rounds_to_two_decimal_places() {
        let account = Account::new(
            AccountNumber(7),
            DocumentNumber::new("12345678901").unwrap(),
            "Maria Silva",
        );
        account.lock().balance = dec!(123.456);

        let summary = account.summary();
        assert_eq!(summary.balance, dec!(123.46));
        assert_eq!(summary.number, AccountNumber(7));
        assert_eq!(summary.branch, "0001");
        assert_eq!(summary.transactions, 0);
    }

    #[test]
    fn summary_display_block() {
        let account = Account::new(
            AccountNumber(1001),
            DocumentNumber::new("12345678901").unwrap(),
            "Maria Silva",
        );
        account.lock().deposit(dec!(1500)).unwrap();

        let text = account.summary().to_string();
        assert!(text.contains("Branch:\t\t0001"));
        assert!(text.contains("Account:\t1001"));
        assert!(text.contains("Holder:\t\tMaria Silva"));
        assert!(text.contains("Balance:\t1500.00"));
    }

    #[test]
    fn summary_serializes_with_account_column() {
        let account = Account::new(
            AccountNumber(3),
            DocumentNumber::new("98765432100").unwrap(),
            "Ana Costa",
        );
        account.lock().deposit(dec!(10.5)).unwrap();

        let json = serde_json::to_value(account.summary()).unwrap();
        assert_eq!(json["account"], 3);
        assert_eq!(json["document"], "98765432100");
        assert_eq!(json["balance"], "10.5");
    }

    #[test]
    fn with_history_reads_without_copying() {
        let account = Account::new(
            AccountNumber(4),
            DocumentNumber::new("12345678901").unwrap(),
            "Maria Silva",
        );
        account.lock().history.append(crate::TransactionRecord::new(
            TransactionKind::Deposit,
            dec!(20),
            today().and_hms_opt(9, 0, 0).unwrap(),
        ));

        let deposits = account.with_history(|history| history.total(TransactionKind::Deposit));
        assert_eq!(deposits, dec!(20));
        assert_eq!(account.with_history(History::len), account.history().len());
    }
}
