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

//! # Coin Ledger
//!
//! This library keeps an internal ledger of cryptocurrency balances for
//! labeled accounts inside a single wallet, reconciled against an external
//! coin daemon reachable only through its RPC interface.
//!
//! ## Core Components
//!
//! - [`Wallet`]: Per-currency facade holding accounts, records, the sync
//!   cursor, and cached balances
//! - [`SyncEngine`]: Incremental ingestion of daemon history and
//!   confirmation promotion
//! - [`TransferEngine`]: Atomic paired transfers between accounts and
//!   validated external withdrawals
//! - [`DaemonGateway`]: Capability trait abstracting the daemon's RPC
//!   surface, injected explicitly into every operation
//! - [`LedgerError`]: Declined operations, retryable faults, and integrity
//!   violations kept apart
//!
//! ## Example
//!
//! ```
//! use coin_ledger::{Decline, LedgerError, Wallet};
//! use rust_decimal_macros::dec;
//!
//! let wallet = Wallet::new("BTC", 6);
//! wallet.create_account("alice").unwrap();
//! wallet.create_account("bob").unwrap();
//!
//! // Transfers are declined, not failed, when funds are short.
//! let result = wallet.transfer("alice", "bob", dec!(1.5), None);
//! assert_eq!(
//!     result,
//!     Err(LedgerError::Declined(Decline::InsufficientFunds))
//! );
//! assert_eq!(wallet.transfer_count(), 0);
//! ```
//!
//! ## Concurrency
//!
//! One reconciling actor per wallet: a single sync and a single
//! transfer/withdrawal may be in flight at a time, serialized by the
//! embedding layer. Record collections are guarded so concurrent readers
//! never observe half of a paired write, and no lock is held across a
//! daemon call.

pub mod account;
mod balance;
mod base;
pub mod error;
pub mod gateway;
mod store;
mod sync;
mod transaction;
mod transfer;
mod wallet;

pub use account::Account;
pub use base::{AccountId, Category, Txid};
pub use error::{Decline, LedgerError};
pub use gateway::{AddressInfo, DaemonGateway, GatewayError, HistoryEntry, TxDetail};
pub use sync::SyncEngine;
pub use transaction::{Transaction, Transfer};
pub use transfer::TransferEngine;
pub use wallet::Wallet;
