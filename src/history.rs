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

//! Transaction history and reporting views.
//!
//! A [`History`] is the append-only log of every transaction that
//! successfully changed an account balance. Rejected transactions never reach
//! it, so its length on a given day is exactly the number of transactions the
//! account has consumed from its daily budget.
//!
//! # Example
//!
//! ```
//! use chrono::NaiveDate;
//! use ledger_bank::{History, TransactionKind, TransactionRecord};
//! use rust_decimal_macros::dec;
//!
//! let at = NaiveDate::from_ymd_opt(2025, 3, 15)
//!     .unwrap()
//!     .and_hms_opt(9, 30, 0)
//!     .unwrap();
//!
//! let mut history = History::new();
//! history.append(TransactionRecord::new(TransactionKind::Deposit, dec!(100), at));
//! history.append(TransactionRecord::new(TransactionKind::Withdrawal, dec!(40), at));
//!
//! assert_eq!(history.filter_by_kind(Some(TransactionKind::Deposit)).count(), 1);
//! assert_eq!(history.by_day_on(at.date()).count(), 2);
//! ```

use crate::transaction::TransactionKind;
use chrono::{Local, NaiveDate, NaiveDateTime, Timelike};
use rust_decimal::Decimal;
use serde::ser::{Serialize, SerializeStruct, Serializer};
use std::fmt;

/// Display format of record timestamps.
pub const TIMESTAMP_FORMAT: &str = "%d/%m/%Y %H:%M:%S";

/// A successfully applied transaction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransactionRecord {
    kind: TransactionKind,
    amount: Decimal,
    timestamp: NaiveDateTime,
}

impl TransactionRecord {
    /// Creates a record. The timestamp is truncated to whole seconds.
    pub fn new(kind: TransactionKind, amount: Decimal, timestamp: NaiveDateTime) -> Self {
        let timestamp = timestamp.with_nanosecond(0).unwrap_or(timestamp);
        Self {
            kind,
            amount,
            timestamp,
        }
    }

    pub fn kind(&self) -> TransactionKind {
        self.kind
    }

    pub fn amount(&self) -> Decimal {
        self.amount
    }

    pub fn timestamp(&self) -> NaiveDateTime {
        self.timestamp
    }

    pub fn date(&self) -> NaiveDate {
        self.timestamp.date()
    }
}

impl fmt::Display for TransactionRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}: {:.2} - {}",
            self.kind,
            self.amount,
            self.timestamp.format(TIMESTAMP_FORMAT)
        )
    }
}

impl Serialize for TransactionRecord {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let mut state = serializer.serialize_struct("TransactionRecord", 3)?;
        state.serialize_field("kind", &self.kind)?;
        state.serialize_field("amount", &self.amount)?;
        state.serialize_field(
            "timestamp",
            &self.timestamp.format(TIMESTAMP_FORMAT).to_string(),
        )?;
        state.end()
    }
}

/// Insertion-ordered log of the transactions applied to one account.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct History {
    records: Vec<TransactionRecord>,
}

impl History {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a record at the end. No validation happens here.
    pub fn append(&mut self, record: TransactionRecord) {
        self.records.push(record);
    }

    /// All records, oldest first.
    pub fn all(&self) -> &[TransactionRecord] {
        &self.records
    }

    pub fn iter(&self) -> std::slice::Iter<'_, TransactionRecord> {
        self.records.iter()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Yields the records of `kind`, or every record when `kind` is `None`.
    ///
    /// Each call starts a fresh pass over the history.
    pub fn filter_by_kind(
        &self,
        kind: Option<TransactionKind>,
    ) -> impl Iterator<Item = &TransactionRecord> + '_ {
        self.records
            .iter()
            .filter(move |record| kind.is_none_or(|kind| record.kind == kind))
    }

    /// Yields the records dated `date`, defaulting to the local date today.
    pub fn by_day(&self, date: Option<NaiveDate>) -> impl Iterator<Item = &TransactionRecord> + '_ {
        self.by_day_on(date.unwrap_or_else(|| Local::now().date_naive()))
    }

    /// Yields the records whose timestamp falls on `date`, at any hour.
    pub fn by_day_on(&self, date: NaiveDate) -> impl Iterator<Item = &TransactionRecord> + '_ {
        self.records
            .iter()
            .filter(move |record| record.date() == date)
    }

    /// Number of records dated `date`.
    pub fn count_on(&self, date: NaiveDate) -> usize {
        self.by_day_on(date).count()
    }

    /// Number of records of `kind` dated `date`.
    pub fn count_kind_on(&self, kind: TransactionKind, date: NaiveDate) -> usize {
        self.by_day_on(date)
            .filter(|record| record.kind == kind)
            .count()
    }

    /// Sum of the amounts of every record of `kind`.
    pub fn total(&self, kind: TransactionKind) -> Decimal {
        self.filter_by_kind(Some(kind))
            .map(TransactionRecord::amount)
            .sum()
    }
}

impl<'a> IntoIterator for &'a History {
    type Item = &'a TransactionRecord;
    type IntoIter = std::slice::Iter<'a, TransactionRecord>;

    fn into_iter(self) -> Self::IntoIter {
        self.records.iter()
    }
}
