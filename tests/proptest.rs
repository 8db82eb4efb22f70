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

//! Property-based tests for the ledger.
//!
//! These tests verify invariants that should hold for any sequence of
//! transactions, valid or not.

use chrono::{NaiveDate, NaiveDateTime};
use ledger_bank::{
    Account, AccountNumber, Client, DocumentNumber, LedgerConfig, Transaction, TransactionError,
    TransactionKind,
};
use proptest::prelude::*;
use rust_decimal::Decimal;

// =============================================================================
// Arbitrary Strategies
// =============================================================================

/// Generate an amount between -10 and 1000 with 2 decimal places, biased
/// towards positive values.
fn arb_amount() -> impl Strategy<Value = Decimal> {
    prop_oneof![
        9 => (1i64..=100_000i64).prop_map(|cents| Decimal::new(cents, 2)),
        1 => (-1_000i64..=0i64).prop_map(|cents| Decimal::new(cents, 2)),
    ]
}

fn arb_transaction() -> impl Strategy<Value = Transaction> {
    prop_oneof![
        arb_amount().prop_map(Transaction::deposit),
        arb_amount().prop_map(Transaction::withdrawal),
    ]
}

/// A transaction and the day (0..3) and second of that day it happens at.
fn arb_step() -> impl Strategy<Value = (Transaction, u32, u32)> {
    (arb_transaction(), 0u32..3, 0u32..86_400)
}

fn timestamp(day: u32, second: u32) -> NaiveDateTime {
    NaiveDate::from_ymd_opt(2025, 3, 10 + day)
        .unwrap()
        .and_hms_opt(second / 3600, (second / 60) % 60, second % 60)
        .unwrap()
}

fn setup() -> (Client, Account) {
    let document = DocumentNumber::new("12345678901").unwrap();
    let client = Client::new(
        "Maria Silva",
        Client::parse_date("15/03/1985").unwrap(),
        document.clone(),
        "Rua das Flores, 123",
    );
    let account = Account::new(AccountNumber(1), document, client.name());
    (client, account)
}

/// Reference model of the ledger rules, evaluated in their documented order.
#[derive(Default)]
struct Model {
    balance: Decimal,
    /// (day, kind) of every accepted transaction.
    accepted: Vec<(u32, TransactionKind)>,
}

impl Model {
    fn apply(&mut self, tx: Transaction, day: u32, config: &LedgerConfig) -> Result<(), TransactionError> {
        let today = self.accepted.iter().filter(|(d, _)| *d == day).count();
        if today >= config.daily_transaction_limit {
            return Err(TransactionError::DailyLimitReached {
                limit: config.daily_transaction_limit,
            });
        }
        let amount = tx.amount();
        match tx {
            Transaction::Deposit { .. } => {
                if amount <= Decimal::ZERO {
                    return Err(TransactionError::InvalidAmount);
                }
                self.balance += amount;
            }
            Transaction::Withdrawal { .. } => {
                let withdrawals = self
                    .accepted
                    .iter()
                    .filter(|(d, k)| *d == day && *k == TransactionKind::Withdrawal)
                    .count();
                if amount > self.balance {
                    return Err(TransactionError::InsufficientFunds);
                }
                if amount > config.withdrawal_ceiling {
                    return Err(TransactionError::LimitExceeded {
                        ceiling: config.withdrawal_ceiling,
                    });
                }
                if withdrawals >= config.daily_withdrawal_limit {
                    return Err(TransactionError::WithdrawalCountExceeded {
                        limit: config.daily_withdrawal_limit,
                    });
                }
                if amount <= Decimal::ZERO {
                    return Err(TransactionError::InvalidAmount);
                }
                self.balance -= amount;
            }
        }
        self.accepted.push((day, tx.kind()));
        Ok(())
    }
}

// =============================================================================
// Rule Properties
// =============================================================================

proptest! {
    #![proptest_config(ProptestConfig::with_cases(500))]

    /// Every outcome matches the reference model, and the balance is the sum
    /// of accepted deposits minus accepted withdrawals.
    #[test]
    fn outcomes_match_model(steps in prop::collection::vec(arb_step(), 0..60)) {
        let (client, account) = setup();
        let config = LedgerConfig::default();
        let mut model = Model::default();

        for (tx, day, second) in steps {
            let expected = model.apply(tx, day, &config);
            let actual = client.execute_transaction_at(&account, tx, timestamp(day, second));
            prop_assert_eq!(actual, expected);
        }

        prop_assert_eq!(account.balance(), model.balance);
        prop_assert_eq!(account.history().len(), model.accepted.len());

        let history = account.history();
        let deposited = history.total(TransactionKind::Deposit);
        let withdrawn = history.total(TransactionKind::Withdrawal);
        prop_assert_eq!(account.balance(), deposited - withdrawn);
    }

    /// The balance never goes negative and no day exceeds its limits.
    #[test]
    fn limits_are_never_exceeded(steps in prop::collection::vec(arb_step(), 0..80)) {
        let (client, account) = setup();
        for (tx, day, second) in steps {
            let _ = client.execute_transaction_at(&account, tx, timestamp(day, second));
            prop_assert!(account.balance() >= Decimal::ZERO);
        }

        let history = account.history();
        for day in 0..3 {
            let date = timestamp(day, 0).date();
            prop_assert!(history.count_on(date) <= 10);
            prop_assert!(history.count_kind_on(TransactionKind::Withdrawal, date) <= 3);
        }
    }

    /// Deposits of positive amounts always succeed while under the daily limit.
    #[test]
    fn deposits_sum_to_balance(
        amounts in prop::collection::vec((1i64..=1_000_000i64).prop_map(|c| Decimal::new(c, 2)), 1..10),
    ) {
        let (client, account) = setup();
        let expected: Decimal = amounts.iter().copied().sum();

        for amount in amounts {
            client
                .execute_transaction_at(&account, Transaction::deposit(amount), timestamp(0, 0))
                .unwrap();
        }

        prop_assert_eq!(account.balance(), expected);
    }
}

// =============================================================================
// Reporting Properties
// =============================================================================

proptest! {
    #![proptest_config(ProptestConfig::with_cases(300))]

    /// Unfiltered views yield the history in order; kind filters yield
    /// order-preserving subsequences.
    #[test]
    fn filters_are_ordered_subsequences(steps in prop::collection::vec(arb_step(), 0..60)) {
        let (client, account) = setup();
        for (tx, day, second) in steps {
            let _ = client.execute_transaction_at(&account, tx, timestamp(day, second));
        }
        let history = account.history();

        let all: Vec<_> = history.filter_by_kind(None).collect();
        prop_assert_eq!(all.len(), history.len());
        prop_assert!(all.iter().zip(history.all()).all(|(a, b)| *a == b));

        for kind in [TransactionKind::Deposit, TransactionKind::Withdrawal] {
            let expected: Vec<_> = history.all().iter().filter(|r| r.kind() == kind).collect();
            let filtered: Vec<_> = history.filter_by_kind(Some(kind)).collect();
            prop_assert_eq!(filtered, expected);
        }
    }

    /// Day views partition the history by date component.
    #[test]
    fn day_views_partition_history(steps in prop::collection::vec(arb_step(), 0..60)) {
        let (client, account) = setup();
        for (tx, day, second) in steps {
            let _ = client.execute_transaction_at(&account, tx, timestamp(day, second));
        }
        let history = account.history();

        let mut seen = 0;
        for day in 0..3 {
            let date = timestamp(day, 0).date();
            for record in history.by_day(Some(date)) {
                prop_assert_eq!(record.date(), date);
                seen += 1;
            }
        }
        prop_assert_eq!(seen, history.len());
        prop_assert_eq!(history.by_day(Some(timestamp(5, 0).date())).count(), 0);
    }

    /// Reading twice without a mutation in between yields the same records.
    #[test]
    fn reads_are_idempotent(steps in prop::collection::vec(arb_step(), 0..40)) {
        let (client, account) = setup();
        for (tx, day, second) in steps {
            let _ = client.execute_transaction_at(&account, tx, timestamp(day, second));
        }

        prop_assert_eq!(account.history(), account.history());
        let history = account.history();
        let first: Vec<_> = history.filter_by_kind(Some(TransactionKind::Deposit)).collect();
        let second: Vec<_> = history.filter_by_kind(Some(TransactionKind::Deposit)).collect();
        prop_assert_eq!(first, second);
        prop_assert_eq!(account.summary(), account.summary());
    }
}
