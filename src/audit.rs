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

//! Append-only audit log of ledger operations.
//!
//! Each call to [`AuditLog::record`] appends one line:
//!
//! ```text
//! [2025-03-15T12:00:00.000000Z] - Function: 'execute' executed with arguments ("12345678901", 1) and {'transaction': Deposit { amount: 100 }}. Returned: Ok(())
//! ```
//!
//! The log is a collaborator of the [`Bank`](crate::Bank): write failures are
//! reported by the bank through `tracing` and never change an operation's
//! outcome.

use chrono::{DateTime, SecondsFormat, Utc};
use parking_lot::Mutex;
use std::fmt::{self, Write as _};
use std::fs::{File, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};

/// Longest rendered argument kept in a log line before truncation.
pub const MAX_ARG_LEN: usize = 64;

/// File-backed audit log. Safe to share between threads.
#[derive(Debug)]
pub struct AuditLog {
    path: PathBuf,
    file: Mutex<File>,
}

impl AuditLog {
    /// Opens `path` for appending, creating it if needed.
    pub fn open(path: impl AsRef<Path>) -> io::Result<Self> {
        let path = path.as_ref().to_path_buf();
        let file = OpenOptions::new().create(true).append(true).open(&path)?;
        Ok(Self {
            path,
            file: Mutex::new(file),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Appends one entry stamped with the current UTC time.
    pub fn record(
        &self,
        function: &str,
        args: &[&dyn fmt::Debug],
        kwargs: &[(&str, &dyn fmt::Debug)],
        returned: &dyn fmt::Debug,
    ) -> io::Result<()> {
        let line = format_entry(Utc::now(), function, args, kwargs, returned);
        let mut file = self.file.lock();
        writeln!(file, "{line}")?;
        file.flush()
    }
}

/// Renders one audit line without the trailing newline.
pub fn format_entry(
    timestamp: DateTime<Utc>,
    function: &str,
    args: &[&dyn fmt::Debug],
    kwargs: &[(&str, &dyn fmt::Debug)],
    returned: &dyn fmt::Debug,
) -> String {
    let args = args
        .iter()
        .map(|arg| truncate(format!("{arg:?}")))
        .collect::<Vec<_>>()
        .join(", ");

    let mut named = String::new();
    for (i, (key, value)) in kwargs.iter().enumerate() {
        if i > 0 {
            named.push_str(", ");
        }
        // Writing to a String cannot fail.
        let _ = write!(named, "'{key}': {}", truncate(format!("{value:?}")));
    }

    format!(
        "[{}] - Function: '{}' executed with arguments ({}) and {{{}}}. Returned: {:?}",
        timestamp.to_rfc3339_opts(SecondsFormat::Micros, true),
        function,
        args,
        named,
        returned
    )
}

fn truncate(rendered: String) -> String {
    if rendered.chars().count() <= MAX_ARG_LEN {
        return rendered;
    }
    let mut short: String = rendered.chars().take(MAX_ARG_LEN).collect();
    short.push_str("...");
    short
}
