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

//! Error types for ledger operations.
//!
//! Every variant is an expected business outcome, not a fault: callers get an
//! `Err` back, the account is left untouched, and the `Display` text is the
//! message shown to the user.

use rust_decimal::Decimal;
use thiserror::Error;

/// Ledger operation errors.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TransactionError {
    /// Amount is zero or negative
    #[error("invalid amount (must be positive)")]
    InvalidAmount,

    /// Withdrawal would exceed the current balance
    #[error("insufficient funds")]
    InsufficientFunds,

    /// Withdrawal is above the per-withdrawal ceiling
    #[error("withdrawal exceeds the per-withdrawal limit of {ceiling:.2}")]
    LimitExceeded { ceiling: Decimal },

    /// Too many withdrawals recorded today
    #[error("maximum number of daily withdrawals ({limit}) exceeded")]
    WithdrawalCountExceeded { limit: usize },

    /// Too many transactions recorded today
    #[error("daily transaction limit ({limit}) reached")]
    DailyLimitReached { limit: usize },

    /// A client with the same document is already registered
    #[error("client already registered")]
    DuplicateClient,

    /// No client is registered under the document
    #[error("client not found")]
    ClientNotFound,

    /// No account exists with the number
    #[error("account not found")]
    AccountNotFound,

    /// Account is not owned by the client
    #[error("client does not own this account")]
    ClientMismatch,

    /// Document number contains no digits
    #[error("invalid document number")]
    InvalidDocument,

    /// Date is not in `dd/mm/yyyy` form
    #[error("invalid date (expected dd/mm/yyyy)")]
    InvalidDate,

    /// Transaction kind tag is neither deposit nor withdrawal
    #[error("unknown transaction kind: {0}")]
    UnknownKind(String),
}
