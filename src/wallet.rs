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

//! Wallet facade: per-currency settings, sync cursor, and cached balances.
//!
//! One [`Wallet`] per currency. The confirmation threshold is fixed at
//! creation and used uniformly for every promotion decision. Exactly one
//! sync and one transfer/withdrawal may be in flight per wallet at a time;
//! serialization across callers is the embedding layer's job.

use crate::account::Account;
use crate::balance;
use crate::base::Txid;
use crate::error::LedgerError;
use crate::gateway::DaemonGateway;
use crate::store::LedgerStore;
use crate::sync::SyncEngine;
use crate::transaction::Transaction;
use crate::transfer::TransferEngine;
use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use rust_decimal::Decimal;
use std::sync::Arc;

#[derive(Debug)]
struct WalletState {
    /// Count of daemon history entries already examined by sync.
    checked_count: usize,
    unconfirmed: Decimal,
    confirmed: Decimal,
    last_synced: Option<DateTime<Utc>>,
    encrypted: bool,
}

/// Ledger of labeled account balances for one currency, reconciled against
/// an external coin daemon.
pub struct Wallet {
    currency: String,
    confirmations: i64,
    store: LedgerStore,
    state: Mutex<WalletState>,
}

impl Wallet {
    /// Creates an empty wallet for `currency` with a fixed confirmation
    /// threshold.
    pub fn new(currency: impl Into<String>, confirmations: i64) -> Self {
        Self {
            currency: currency.into(),
            confirmations,
            store: LedgerStore::new(),
            state: Mutex::new(WalletState {
                checked_count: 0,
                unconfirmed: Decimal::ZERO,
                confirmed: Decimal::ZERO,
                last_synced: None,
                encrypted: false,
            }),
        }
    }

    pub fn currency(&self) -> &str {
        &self.currency
    }

    /// Confirmation threshold used for every promotion decision.
    pub fn confirmations(&self) -> i64 {
        self.confirmations
    }

    pub fn encrypted(&self) -> bool {
        self.state.lock().encrypted
    }

    /// Count of daemon history entries already examined by sync.
    pub fn checked_count(&self) -> usize {
        self.state.lock().checked_count
    }

    pub fn unconfirmed_balance(&self) -> Decimal {
        self.state.lock().unconfirmed
    }

    pub fn confirmed_balance(&self) -> Decimal {
        self.state.lock().confirmed
    }

    pub fn last_synced(&self) -> Option<DateTime<Utc>> {
        self.state.lock().last_synced
    }

    /// Creates an account under a wallet-unique label.
    pub fn create_account(&self, label: &str) -> Result<Arc<Account>, LedgerError> {
        self.store.create_account(label)
    }

    pub fn account(&self, label: &str) -> Option<Arc<Account>> {
        self.store.account(label)
    }

    /// All accounts, ordered by creation.
    pub fn accounts(&self) -> Vec<Arc<Account>> {
        self.store.accounts()
    }

    /// Looks up a ledger transaction by its external id.
    pub fn transaction(&self, txid: &Txid) -> Option<Transaction> {
        self.store.transaction(txid)
    }

    pub fn transaction_count(&self) -> usize {
        self.store.transaction_count()
    }

    pub fn transfer_count(&self) -> usize {
        self.store.transfer_count()
    }

    /// Full sync: ingests new daemon history and promotes confirmations.
    pub fn sync<G: DaemonGateway>(&self, gateway: &G) -> Result<(), LedgerError> {
        SyncEngine::new(self, gateway).full_sync()
    }

    /// Targeted sync of one external id; unknown ids fall back to a full
    /// sync.
    pub fn sync_transaction<G: DaemonGateway>(
        &self,
        gateway: &G,
        txid: &Txid,
    ) -> Result<(), LedgerError> {
        SyncEngine::new(self, gateway).sync_transaction(txid)
    }

    /// Moves `amount` between two accounts as an atomic paired transfer.
    pub fn transfer(
        &self,
        sender: &str,
        recipient: &str,
        amount: Decimal,
        comment: Option<String>,
    ) -> Result<(), LedgerError> {
        TransferEngine::new(self).transfer(sender, recipient, amount, comment)
    }

    /// Sends `amount` from `account` to an external address via the daemon.
    pub fn withdraw<G: DaemonGateway>(
        &self,
        gateway: &G,
        account: &str,
        address: &str,
        amount: Decimal,
    ) -> Result<Txid, LedgerError> {
        TransferEngine::new(self).withdraw(gateway, account, address, amount)
    }

    /// Fresh aggregator recomputation for one account, bypassing the cache.
    pub fn recompute_account(&self, label: &str) -> Option<(Decimal, Decimal)> {
        let account = self.store.account(label)?;
        Some(balance::account_balances(
            &self.store,
            self.confirmations,
            &account,
        ))
    }

    /// Fresh wallet-wide recomputation, bypassing the cache.
    pub fn recompute(&self) -> (Decimal, Decimal) {
        balance::wallet_balances(&self.store, self.confirmations)
    }

    /// Reconciliation pass over the atomicity contract; violations are
    /// surfaced as [`LedgerError::Integrity`], never repaired.
    pub fn verify(&self) -> Result<(), LedgerError> {
        self.store.verify()
    }

    /// Generates a fresh receiving address attributed to `label`.
    pub fn generate_address<G: DaemonGateway>(
        &self,
        gateway: &G,
        label: &str,
    ) -> Result<String, LedgerError> {
        Ok(gateway.new_address(label)?)
    }

    /// Whether the daemon considers `address` well-formed for this currency.
    pub fn valid_address<G: DaemonGateway>(
        &self,
        gateway: &G,
        address: &str,
    ) -> Result<bool, LedgerError> {
        Ok(gateway.validate_address(address)?.is_valid)
    }

    /// Whether `address` belongs to the daemon wallet.
    pub fn own_address<G: DaemonGateway>(
        &self,
        gateway: &G,
        address: &str,
    ) -> Result<bool, LedgerError> {
        Ok(gateway.validate_address(address)?.is_mine)
    }

    /// The label the daemon has attached to `address`, if any.
    pub fn address_label<G: DaemonGateway>(
        &self,
        gateway: &G,
        address: &str,
    ) -> Result<Option<String>, LedgerError> {
        Ok(gateway.validate_address(address)?.label)
    }

    /// Daemon-side wallet balance at the given confirmation depth.
    pub fn daemon_balance<G: DaemonGateway>(
        &self,
        gateway: &G,
        min_confirmations: i64,
    ) -> Result<Decimal, LedgerError> {
        Ok(gateway.balance(min_confirmations)?)
    }

    /// Encrypts the daemon wallet and remembers the outcome.
    pub fn encrypt<G: DaemonGateway>(
        &self,
        gateway: &G,
        passphrase: &str,
    ) -> Result<bool, LedgerError> {
        let encrypted = gateway.encrypt_wallet(passphrase)?;
        if encrypted {
            self.state.lock().encrypted = true;
        }
        Ok(encrypted)
    }

    pub(crate) fn store(&self) -> &LedgerStore {
        &self.store
    }

    pub(crate) fn set_checked_count(&self, count: usize) {
        self.state.lock().checked_count = count;
    }

    pub(crate) fn advance_checked_count(&self) {
        self.state.lock().checked_count += 1;
    }

    /// Recomputes and persists one account's cached balances.
    pub(crate) fn refresh_account(&self, account: &Account) {
        let (unconfirmed, confirmed) =
            balance::account_balances(&self.store, self.confirmations, account);
        account.set_balances(unconfirmed, confirmed);
    }

    /// Recomputes and persists the wallet-level cached balances.
    pub(crate) fn refresh_balances(&self) {
        let (unconfirmed, confirmed) = balance::wallet_balances(&self.store, self.confirmations);
        let mut state = self.state.lock();
        state.unconfirmed = unconfirmed;
        state.confirmed = confirmed;
    }

    pub(crate) fn touch_synced(&self) {
        self.state.lock().last_synced = Some(Utc::now());
    }
}
