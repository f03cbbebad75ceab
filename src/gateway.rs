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

//! Coin daemon capability surface consumed by the engines.
//!
//! The wire protocol, authentication, and TLS live in whatever client
//! implements [`DaemonGateway`]; the core only fixes the semantics of the
//! calls. A gateway handle is constructed once per wallet and passed
//! explicitly into each operation, which keeps the engines free of hidden
//! shared state and lets tests substitute a scripted daemon.

use crate::base::Txid;
use rust_decimal::Decimal;
use thiserror::Error;

/// Gateway call failures.
///
/// `Unreachable` is a transport-level fault and retryable; `Rpc` is a
/// daemon-reported business error and is not.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum GatewayError {
    #[error("daemon unreachable: {0}")]
    Unreachable(String),

    #[error("daemon error {code}: {message}")]
    Rpc { code: i32, message: String },
}

/// One row of daemon transaction history.
///
/// Every field except `category` is optional so that malformed daemon rows
/// are representable; the sync engine skips them without losing its place.
/// `time` and `timereceived` are epoch seconds.
#[derive(Debug, Clone, Default)]
pub struct HistoryEntry {
    pub category: String,
    pub account: Option<String>,
    pub txid: Option<Txid>,
    pub address: Option<String>,
    pub amount: Option<Decimal>,
    pub confirmations: Option<i64>,
    pub time: Option<i64>,
    pub timereceived: Option<i64>,
}

/// Detail view of a single daemon transaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TxDetail {
    pub confirmations: i64,
}

/// Result of the daemon's address validation.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AddressInfo {
    pub is_valid: bool,
    pub is_mine: bool,
    pub label: Option<String>,
}

/// Capability set of the coin daemon's RPC surface.
///
/// All calls are synchronous blocking I/O from the engines' perspective;
/// timeouts and cancellation belong to the implementation.
pub trait DaemonGateway {
    /// The daemon's most recent `max` history entries, oldest first.
    fn list_recent_transactions(&self, max: usize) -> Result<Vec<HistoryEntry>, GatewayError>;

    /// Current detail for one wallet transaction.
    fn get_transaction(&self, txid: &Txid) -> Result<TxDetail, GatewayError>;

    /// Spends `amount` to `address`, attributed to `label`. Returns the
    /// new transaction id.
    fn send_to_address(
        &self,
        address: &str,
        amount: Decimal,
        label: &str,
    ) -> Result<Txid, GatewayError>;

    /// Validates an address for this currency.
    fn validate_address(&self, address: &str) -> Result<AddressInfo, GatewayError>;

    /// Generates a fresh receiving address attributed to `label`.
    fn new_address(&self, label: &str) -> Result<String, GatewayError>;

    /// Lifetime total received by the given label.
    fn received_by_label(&self, label: &str) -> Result<Decimal, GatewayError>;

    /// Daemon-side wallet balance at the given confirmation depth.
    fn balance(&self, min_confirmations: i64) -> Result<Decimal, GatewayError>;

    /// Encrypts the daemon wallet; returns whether encryption took effect.
    fn encrypt_wallet(&self, passphrase: &str) -> Result<bool, GatewayError>;
}
