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

//! Labeled accounts with cached balances and external reference lists.
//!
//! Balances on an account are a cache of the balance aggregator's
//! recomputation from ledger records, refreshed after every mutating
//! operation that touches the account. Outside an in-flight mutation the
//! cache always equals a fresh recomputation.

use crate::base::{AccountId, Txid};
use parking_lot::Mutex;
use rust_decimal::Decimal;
use serde::ser::{Serialize, SerializeStruct, Serializer};

#[derive(Debug)]
struct AccountData {
    unconfirmed: Decimal,
    confirmed: Decimal,
    /// External ids of daemon deposits credited to this account, deduplicated.
    deposit_ids: Vec<Txid>,
    /// External ids of daemon withdrawals debited from this account, deduplicated.
    withdrawal_ids: Vec<Txid>,
    /// Lifetime total received, as reported by the daemon.
    total_received: Decimal,
}

impl AccountData {
    fn new() -> Self {
        Self {
            unconfirmed: Decimal::ZERO,
            confirmed: Decimal::ZERO,
            deposit_ids: Vec::new(),
            withdrawal_ids: Vec::new(),
            total_received: Decimal::ZERO,
        }
    }
}

/// A labeled account within one wallet.
#[derive(Debug)]
pub struct Account {
    id: AccountId,
    label: String,
    inner: Mutex<AccountData>,
}

impl Account {
    const DECIMAL_PRECISION: u32 = 8;

    pub(crate) fn new(id: AccountId, label: impl Into<String>) -> Self {
        Self {
            id,
            label: label.into(),
            inner: Mutex::new(AccountData::new()),
        }
    }

    pub fn id(&self) -> AccountId {
        self.id
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    /// Cached balance over all observed activity, confirmed or not.
    pub fn unconfirmed_balance(&self) -> Decimal {
        self.inner.lock().unconfirmed
    }

    /// Cached balance over finalized activity only.
    pub fn confirmed_balance(&self) -> Decimal {
        self.inner.lock().confirmed
    }

    pub fn total_received(&self) -> Decimal {
        self.inner.lock().total_received
    }

    pub fn deposit_ids(&self) -> Vec<Txid> {
        self.inner.lock().deposit_ids.clone()
    }

    pub fn withdrawal_ids(&self) -> Vec<Txid> {
        self.inner.lock().withdrawal_ids.clone()
    }

    pub(crate) fn set_balances(&self, unconfirmed: Decimal, confirmed: Decimal) {
        let mut data = self.inner.lock();
        data.unconfirmed = unconfirmed;
        data.confirmed = confirmed;
    }

    pub(crate) fn set_total_received(&self, total: Decimal) {
        self.inner.lock().total_received = total;
    }

    /// Appends a deposit reference; returns whether it was new.
    pub(crate) fn record_deposit(&self, txid: Txid) -> bool {
        let mut data = self.inner.lock();
        if data.deposit_ids.contains(&txid) {
            return false;
        }
        data.deposit_ids.push(txid);
        true
    }

    /// Appends a withdrawal reference; returns whether it was new.
    pub(crate) fn record_withdrawal(&self, txid: Txid) -> bool {
        let mut data = self.inner.lock();
        if data.withdrawal_ids.contains(&txid) {
            return false;
        }
        data.withdrawal_ids.push(txid);
        true
    }
}

impl Serialize for Account {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let data = self.inner.lock();
        let mut state = serializer.serialize_struct("Account", 4)?;
        state.serialize_field("label", &self.label)?;
        state.serialize_field(
            "unconfirmed",
            &data.unconfirmed.round_dp(Account::DECIMAL_PRECISION),
        )?;
        state.serialize_field(
            "confirmed",
            &data.confirmed.round_dp(Account::DECIMAL_PRECISION),
        )?;
        state.serialize_field(
            "total_received",
            &data.total_received.round_dp(Account::DECIMAL_PRECISION),
        )?;
        state.end()
    }
}
