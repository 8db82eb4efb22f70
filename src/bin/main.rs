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

use chrono::{Local, NaiveDateTime};
use clap::Parser;
use csv::{ReaderBuilder, Trim, Writer};
use ledger_bank::{
    AuditLog, Bank, Client, DocumentNumber, LedgerConfig, Transaction, TransactionError,
    TransactionKind,
};
use rust_decimal::Decimal;
use serde::Deserialize;
use std::fs::File;
use std::io::{BufReader, Read, Write};
use std::path::PathBuf;
use std::process;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

/// Ledger Bank - Replay banking operations from a CSV file
///
/// Registers clients, runs their deposits and withdrawals under the ledger
/// limits, and writes the resulting account summaries to stdout.
#[derive(Parser, Debug)]
#[command(name = "ledger-bank")]
#[command(about = "Replays a CSV of banking operations and prints account summaries", long_about = None)]
struct Args {
    /// Path to CSV file with operations
    ///
    /// Expected format: type,document,amount,name,birth_date,address
    /// Example: cargo run -- operations.csv > accounts.csv
    #[arg(value_name = "FILE")]
    input: PathBuf,

    /// Branch code stamped on new accounts
    #[arg(long, default_value = LedgerConfig::DEFAULT_BRANCH)]
    branch: String,

    /// Largest amount allowed in a single withdrawal
    #[arg(long, default_value_t = LedgerConfig::DEFAULT_WITHDRAWAL_CEILING)]
    ceiling: Decimal,

    /// Successful withdrawals allowed per account per day
    #[arg(long, default_value_t = LedgerConfig::DEFAULT_DAILY_WITHDRAWAL_LIMIT)]
    daily_withdrawals: usize,

    /// Successful transactions allowed per account per day
    #[arg(long, default_value_t = LedgerConfig::DEFAULT_DAILY_TRANSACTION_LIMIT)]
    daily_transactions: usize,

    /// Append an audit line per operation to this file
    #[arg(long, value_name = "PATH")]
    audit_log: Option<PathBuf>,
}

impl Args {
    fn config(&self) -> LedgerConfig {
        LedgerConfig {
            branch: self.branch.clone(),
            withdrawal_ceiling: self.ceiling,
            daily_withdrawal_limit: self.daily_withdrawals,
            daily_transaction_limit: self.daily_transactions,
        }
    }
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();

    let mut bank = Bank::with_config(args.config());
    if let Some(path) = &args.audit_log {
        match AuditLog::open(path) {
            Ok(log) => bank = bank.with_audit_log(log),
            Err(e) => {
                eprintln!("Error opening audit log '{}': {}", path.display(), e);
                process::exit(1);
            }
        }
    }

    let file = match File::open(&args.input) {
        Ok(f) => f,
        Err(e) => {
            eprintln!("Error opening file '{}': {}", args.input.display(), e);
            process::exit(1);
        }
    };

    let clock = || Local::now().naive_local();
    if let Err(e) = process_operations(&bank, BufReader::new(file), clock) {
        eprintln!("Error processing operations: {}", e);
        process::exit(1);
    }

    if let Err(e) = write_summaries(&bank, std::io::stdout()) {
        eprintln!("Error writing output: {}", e);
        process::exit(1);
    }
}

/// Raw CSV record matching the input format.
///
/// Fields: `type, document, amount, name, birth_date, address`.
/// The last three are only read by `register` rows.
#[derive(Debug, Deserialize)]
struct CsvRecord {
    #[serde(rename = "type")]
    op_type: String,
    document: String,
    #[serde(default, deserialize_with = "csv::invalid_option")]
    amount: Option<Decimal>,
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    birth_date: Option<String>,
    #[serde(default)]
    address: Option<String>,
}

/// A parsed input row.
#[derive(Debug)]
enum Operation {
    Register(Client),
    Transact {
        document: DocumentNumber,
        transaction: Transaction,
    },
}

impl CsvRecord {
    /// Converts the CSV record to an operation.
    fn into_operation(self) -> Result<Operation, TransactionError> {
        let document = DocumentNumber::new(&self.document)?;

        match self.op_type.to_lowercase().as_str() {
            "register" => {
                let birth_date = Client::parse_date(self.birth_date.as_deref().unwrap_or(""))?;
                let name = self
                    .name
                    .filter(|name| !name.is_empty())
                    .unwrap_or_else(|| document.to_string());
                Ok(Operation::Register(Client::new(
                    name,
                    birth_date,
                    document,
                    self.address.unwrap_or_default(),
                )))
            }
            other => {
                let kind: TransactionKind = other.parse()?;
                let amount = self.amount.ok_or(TransactionError::InvalidAmount)?;
                let transaction = match kind {
                    TransactionKind::Deposit => Transaction::deposit(amount),
                    TransactionKind::Withdrawal => Transaction::withdrawal(amount),
                };
                Ok(Operation::Transact {
                    document,
                    transaction,
                })
            }
        }
    }
}

/// Replays operations from a CSV reader against `bank`.
///
/// Rows are streamed. A `register` row registers the client and opens its
/// account; `deposit` and `withdrawal` rows run against the client's first
/// account. Malformed rows and rejected operations are logged and skipped.
/// Each transaction is stamped with a fresh reading of `clock`.
///
/// # CSV Format
///
/// ```csv
/// type,document,amount,name,birth_date,address
/// register,123.456.789-01,,Maria Silva,15/03/1985,Rua das Flores 123
/// deposit,12345678901,1500.00
/// withdrawal,12345678901,200.00
/// ```
///
/// # Errors
///
/// Returns a CSV error if the reader fails or the header is unreadable.
pub fn process_operations<R, C>(bank: &Bank, reader: R, clock: C) -> Result<(), csv::Error>
where
    R: Read,
    C: Fn() -> NaiveDateTime,
{
    let mut rdr = ReaderBuilder::new()
        .trim(Trim::All)
        .flexible(true)
        .has_headers(true)
        .from_reader(reader);

    for (line, result) in rdr.deserialize::<CsvRecord>().enumerate() {
        let record = match result {
            Ok(record) => record,
            Err(e) => {
                warn!(line = line + 2, "skipping malformed row: {}", e);
                continue;
            }
        };

        let operation = match record.into_operation() {
            Ok(operation) => operation,
            Err(e) => {
                warn!(line = line + 2, "skipping invalid row: {}", e);
                continue;
            }
        };

        if let Err(e) = apply_operation(bank, operation, clock()) {
            info!(line = line + 2, "operation rejected: {}", e);
        }
    }

    Ok(())
}

fn apply_operation(
    bank: &Bank,
    operation: Operation,
    now: NaiveDateTime,
) -> Result<(), TransactionError> {
    match operation {
        Operation::Register(client) => {
            let document = client.document().clone();
            bank.register_client(client)?;
            bank.open_account(&document)?;
        }
        Operation::Transact {
            document,
            transaction,
        } => {
            let number = bank
                .get_client(&document)
                .ok_or(TransactionError::ClientNotFound)?
                .accounts()
                .first()
                .map(|account| account.number())
                .ok_or(TransactionError::AccountNotFound)?;
            bank.execute_at(&document, number, transaction, now)?;
        }
    }
    Ok(())
}

/// Writes account summaries to a CSV writer.
///
/// # CSV Format
///
/// Columns: `branch, account, holder, document, balance, transactions`
///
/// ```csv
/// branch,account,holder,document,balance,transactions
/// 0001,1,Maria Silva,12345678901,1300.00,2
/// ```
///
/// # Errors
///
/// Returns a CSV error if writing fails.
pub fn write_summaries<W: Write>(bank: &Bank, writer: W) -> Result<(), csv::Error> {
    let mut wtr = Writer::from_writer(writer);

    for summary in bank.summaries() {
        wtr.serialize(&summary)?;
    }

    wtr.flush()?;
    Ok(())
}
