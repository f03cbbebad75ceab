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

//! Scriptable stand-in for the coin daemon, shared by the integration tests.

#![allow(dead_code)]

use coin_ledger::{AddressInfo, DaemonGateway, GatewayError, HistoryEntry, TxDetail, Txid};
use parking_lot::Mutex;
use rust_decimal::Decimal;
use std::collections::{HashMap, HashSet};

#[derive(Default)]
pub struct MockDaemon {
    history: Mutex<Vec<HistoryEntry>>,
    confirmations: Mutex<HashMap<Txid, i64>>,
    received: Mutex<HashMap<String, Decimal>>,
    valid_addresses: Mutex<HashSet<String>>,
    own_addresses: Mutex<HashSet<String>>,
    sends: Mutex<Vec<(String, Decimal, String)>>,
    next_send: Mutex<u64>,
    unreachable: Mutex<bool>,
    refuse_sends: Mutex<Option<String>>,
    /// Labels whose `received_by_label` call fails, simulating the daemon
    /// dropping mid-sweep.
    fail_received_for: Mutex<HashSet<String>>,
}

impl MockDaemon {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push_entry(&self, entry: HistoryEntry) {
        self.history.lock().push(entry);
    }

    /// Scripts a daemon `receive` for `label` and registers its
    /// confirmation count for later polls.
    pub fn push_receive(&self, label: &str, txid: &str, amount: Decimal, confirmations: i64) {
        self.push_entry(HistoryEntry {
            category: "receive".into(),
            account: Some(label.into()),
            txid: Some(Txid::from(txid)),
            address: Some(format!("addr-{txid}")),
            amount: Some(amount),
            confirmations: Some(confirmations),
            time: Some(1_700_000_000),
            timereceived: Some(1_700_000_000),
        });
        self.confirmations.lock().insert(Txid::from(txid), confirmations);
        *self
            .received
            .lock()
            .entry(label.to_owned())
            .or_insert(Decimal::ZERO) += amount;
    }

    /// Scripts a daemon `send`; the daemon reports spend amounts negative.
    pub fn push_send(&self, label: &str, txid: &str, amount: Decimal, confirmations: i64) {
        self.push_entry(HistoryEntry {
            category: "send".into(),
            account: Some(label.into()),
            txid: Some(Txid::from(txid)),
            address: Some(format!("addr-{txid}")),
            amount: Some(-amount),
            confirmations: Some(confirmations),
            time: Some(1_700_000_000),
            timereceived: Some(1_700_000_000),
        });
        self.confirmations.lock().insert(Txid::from(txid), confirmations);
    }

    /// Updates the confirmation count a later poll will report.
    pub fn set_confirmations(&self, txid: &str, confirmations: i64) {
        self.confirmations
            .lock()
            .insert(Txid::from(txid), confirmations);
    }

    pub fn truncate_history(&self, len: usize) {
        self.history.lock().truncate(len);
    }

    pub fn history_len(&self) -> usize {
        self.history.lock().len()
    }

    pub fn allow_address(&self, address: &str) {
        self.valid_addresses.lock().insert(address.to_owned());
    }

    pub fn claim_address(&self, address: &str) {
        self.valid_addresses.lock().insert(address.to_owned());
        self.own_addresses.lock().insert(address.to_owned());
    }

    pub fn set_unreachable(&self, unreachable: bool) {
        *self.unreachable.lock() = unreachable;
    }

    pub fn refuse_sends(&self, message: &str) {
        *self.refuse_sends.lock() = Some(message.to_owned());
    }

    pub fn fail_received_for(&self, label: &str) {
        self.fail_received_for.lock().insert(label.to_owned());
    }

    /// Transfers executed through `send_to_address`, as `(address, amount,
    /// label)` triples.
    pub fn sends(&self) -> Vec<(String, Decimal, String)> {
        self.sends.lock().clone()
    }

    fn check_reachable(&self) -> Result<(), GatewayError> {
        if *self.unreachable.lock() {
            Err(GatewayError::Unreachable("connection refused".into()))
        } else {
            Ok(())
        }
    }
}

impl DaemonGateway for MockDaemon {
    fn list_recent_transactions(&self, max: usize) -> Result<Vec<HistoryEntry>, GatewayError> {
        self.check_reachable()?;
        Ok(self.history.lock().iter().take(max).cloned().collect())
    }

    fn get_transaction(&self, txid: &Txid) -> Result<TxDetail, GatewayError> {
        self.check_reachable()?;
        self.confirmations
            .lock()
            .get(txid)
            .map(|&confirmations| TxDetail { confirmations })
            .ok_or(GatewayError::Rpc {
                code: -5,
                message: "Invalid or non-wallet transaction id".into(),
            })
    }

    fn send_to_address(
        &self,
        address: &str,
        amount: Decimal,
        label: &str,
    ) -> Result<Txid, GatewayError> {
        self.check_reachable()?;
        if let Some(message) = self.refuse_sends.lock().clone() {
            return Err(GatewayError::Rpc { code: -6, message });
        }
        let mut next = self.next_send.lock();
        *next += 1;
        let txid = format!("sent-{}", *next);
        self.sends
            .lock()
            .push((address.to_owned(), amount, label.to_owned()));
        // The spend shows up in subsequent history listings, as it would
        // from a real daemon.
        self.push_entry(HistoryEntry {
            category: "send".into(),
            account: Some(label.to_owned()),
            txid: Some(Txid::new(txid.clone())),
            address: Some(address.to_owned()),
            amount: Some(-amount),
            confirmations: Some(0),
            time: Some(1_700_000_000),
            timereceived: Some(1_700_000_000),
        });
        self.confirmations.lock().insert(Txid::new(txid.clone()), 0);
        Ok(Txid::new(txid))
    }

    fn validate_address(&self, address: &str) -> Result<AddressInfo, GatewayError> {
        self.check_reachable()?;
        Ok(AddressInfo {
            is_valid: self.valid_addresses.lock().contains(address),
            is_mine: self.own_addresses.lock().contains(address),
            label: None,
        })
    }

    fn new_address(&self, label: &str) -> Result<String, GatewayError> {
        self.check_reachable()?;
        Ok(format!("addr-{label}"))
    }

    fn received_by_label(&self, label: &str) -> Result<Decimal, GatewayError> {
        self.check_reachable()?;
        if self.fail_received_for.lock().contains(label) {
            return Err(GatewayError::Unreachable("connection reset".into()));
        }
        Ok(self
            .received
            .lock()
            .get(label)
            .copied()
            .unwrap_or(Decimal::ZERO))
    }

    fn balance(&self, min_confirmations: i64) -> Result<Decimal, GatewayError> {
        self.check_reachable()?;
        let total = self
            .history
            .lock()
            .iter()
            .filter(|entry| entry.confirmations.unwrap_or(0) >= min_confirmations)
            .filter_map(|entry| entry.amount)
            .sum();
        Ok(total)
    }

    fn encrypt_wallet(&self, _passphrase: &str) -> Result<bool, GatewayError> {
        self.check_reachable()?;
        Ok(true)
    }
}
