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

//! Ledger configuration.

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

/// Limits and identifiers applied to every account a bank opens.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LedgerConfig {
    /// Branch code stamped on new accounts.
    pub branch: String,
    /// Largest amount allowed in a single withdrawal.
    pub withdrawal_ceiling: Decimal,
    /// Successful withdrawals allowed per account per calendar day.
    pub daily_withdrawal_limit: usize,
    /// Successful transactions of any kind allowed per account per calendar day.
    pub daily_transaction_limit: usize,
}

impl LedgerConfig {
    pub const DEFAULT_BRANCH: &'static str = "0001";
    pub const DEFAULT_WITHDRAWAL_CEILING: Decimal = dec!(500.00);
    pub const DEFAULT_DAILY_WITHDRAWAL_LIMIT: usize = 3;
    pub const DEFAULT_DAILY_TRANSACTION_LIMIT: usize = 10;
}

impl Default for LedgerConfig {
    fn default() -> Self {
        Self {
            branch: Self::DEFAULT_BRANCH.to_string(),
            withdrawal_ceiling: Self::DEFAULT_WITHDRAWAL_CEILING,
            daily_withdrawal_limit: Self::DEFAULT_DAILY_WITHDRAWAL_LIMIT,
            daily_transaction_limit: Self::DEFAULT_DAILY_TRANSACTION_LIMIT,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let config = LedgerConfig::default();
        assert_eq!(config.branch, "0001");
        assert_eq!(config.withdrawal_ceiling, dec!(500.00));
        assert_eq!(config.daily_withdrawal_limit, 3);
        assert_eq!(config.daily_transaction_limit, 10);
    }

    #[test]
    fn missing_fields_fall_back_to_defaults() {
        let config: LedgerConfig =
            serde_json::from_str(r#"{"withdrawal_ceiling": "1000"}"#).unwrap();
        assert_eq!(config.withdrawal_ceiling, dec!(1000));
        assert_eq!(config.branch, "0001");
        assert_eq!(config.daily_transaction_limit, 10);
    }
}
