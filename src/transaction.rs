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

//! Transactions.
//!
//! A [`Transaction`] is a request to move money into or out of an account. It
//! carries only its amount and learns which account it runs against when a
//! client executes it:
//! - [`Deposit`] credits the account.
//! - [`Withdrawal`] debits the account, subject to funds, ceiling and the
//!   daily withdrawal count.
//!
//! On success the account history gains a [`TransactionRecord`]; on failure
//! nothing changes.
//!
//! [`Deposit`]: Transaction::Deposit
//! [`Withdrawal`]: Transaction::Withdrawal
//! [`TransactionRecord`]: crate::TransactionRecord

use crate::TransactionError;
use crate::account::AccountData;
use crate::history::TransactionRecord;
use chrono::NaiveDateTime;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Tag of a recorded transaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TransactionKind {
    Deposit,
    Withdrawal,
}

impl fmt::Display for TransactionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Deposit => f.write_str("Deposit"),
            Self::Withdrawal => f.write_str("Withdrawal"),
        }
    }
}

impl FromStr for TransactionKind {
    type Err = TransactionError;

    /// Parses a kind tag, ignoring case and surrounding whitespace.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let tag = s.trim();
        if tag.eq_ignore_ascii_case("deposit") {
            Ok(Self::Deposit)
        } else if tag.eq_ignore_ascii_case("withdrawal") {
            Ok(Self::Withdrawal)
        } else {
            Err(TransactionError::UnknownKind(tag.to_string()))
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum Transaction {
    Deposit { amount: Decimal },
    Withdrawal { amount: Decimal },
}

impl Transaction {
    pub fn deposit(amount: Decimal) -> Self {
        Self::Deposit { amount }
    }

    pub fn withdrawal(amount: Decimal) -> Self {
        Self::Withdrawal { amount }
    }

    pub fn amount(&self) -> Decimal {
        match self {
            Self::Deposit { amount } => *amount,
            Self::Withdrawal { amount } => *amount,
        }
    }

    pub fn kind(&self) -> TransactionKind {
        match self {
            Self::Deposit { .. } => TransactionKind::Deposit,
            Self::Withdrawal { .. } => TransactionKind::Withdrawal,
        }
    }

    /// Applies the transaction to locked account state as if the local clock
    /// read `now`.
    ///
    /// Only reached through
    /// [`Client::execute_transaction`](crate::Client::execute_transaction),
    /// which holds the account lock across the daily limit check and this call.
    ///
    /// # Errors
    ///
    /// - [`TransactionError::InvalidAmount`] - Amount is zero or negative.
    /// - [`TransactionError::InsufficientFunds`] - Withdrawal exceeds the balance.
    /// - [`TransactionError::LimitExceeded`] - Withdrawal exceeds the ceiling.
    /// - [`TransactionError::WithdrawalCountExceeded`] - Daily withdrawal count reached.
    pub(crate) fn apply(
        &self,
        data: &mut AccountData,
        now: NaiveDateTime,
    ) -> Result<(), TransactionError> {
        match *self {
            Self::Deposit { amount } => data.deposit(amount)?,
            Self::Withdrawal { amount } => data.withdraw(amount, now.date())?,
        }
        let record = TransactionRecord::new(self.kind(), self.amount(), now);
        data.history.append(record);
        Ok(())
    }
}

impl fmt::Display for Transaction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} of {:.2}", self.kind(), self.amount())
    }
}
