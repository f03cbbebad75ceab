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

//! Wallet-scoped collection of accounts, transactions, and transfers.
//!
//! Keyed lookup by account label and external transaction id, with
//! insertion-ordered record logs for cursor-based iteration. Paired
//! transfer records are appended in a single critical section, as is a
//! transaction append together with its deposit-reference update, so a
//! concurrent reader never observes half of either write.
//!
//! This is the in-memory rendition of the persistence contract; a durable
//! engine can stand in behind the same surface without touching the
//! engines above it.

use crate::account::Account;
use crate::base::{AccountId, Category, Txid};
use crate::error::{Decline, LedgerError};
use crate::transaction::{Transaction, Transfer};
use dashmap::DashMap;
use dashmap::mapref::entry::Entry;
use parking_lot::RwLock;
use rust_decimal::Decimal;
use std::collections::HashSet;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

#[derive(Debug, Default)]
pub struct LedgerStore {
    /// Accounts indexed by label.
    accounts: DashMap<String, Arc<Account>>,
    next_account_id: AtomicU64,
    /// Transactions in insertion order; `tx_index` maps external id to
    /// position for O(1) natural-key lookup.
    transactions: RwLock<Vec<Transaction>>,
    tx_index: DashMap<Txid, usize>,
    /// Paired transfers in insertion order, always appended two at a time.
    transfers: RwLock<Vec<Transfer>>,
}

impl LedgerStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates an account under a wallet-unique label.
    pub fn create_account(&self, label: &str) -> Result<Arc<Account>, LedgerError> {
        match self.accounts.entry(label.to_owned()) {
            Entry::Occupied(_) => Err(Decline::DuplicateLabel.into()),
            Entry::Vacant(entry) => {
                let id = AccountId(self.next_account_id.fetch_add(1, Ordering::Relaxed));
                let account = Arc::new(Account::new(id, label));
                entry.insert(Arc::clone(&account));
                Ok(account)
            }
        }
    }

    pub fn account(&self, label: &str) -> Option<Arc<Account>> {
        self.accounts.get(label).map(|entry| Arc::clone(&entry))
    }

    /// All accounts, ordered by id for stable output.
    pub fn accounts(&self) -> Vec<Arc<Account>> {
        let mut accounts: Vec<_> = self
            .accounts
            .iter()
            .map(|entry| Arc::clone(entry.value()))
            .collect();
        accounts.sort_by_key(|account| account.id());
        accounts
    }

    /// Looks up a transaction by its external id.
    pub fn transaction(&self, txid: &Txid) -> Option<Transaction> {
        let index = *self.tx_index.get(txid)?;
        self.transactions.read().get(index).cloned()
    }

    pub fn transaction_count(&self) -> usize {
        self.transactions.read().len()
    }

    pub fn transfer_count(&self) -> usize {
        self.transfers.read().len()
    }

    /// Appends a transaction, optionally recording its external id as a
    /// deposit reference on `deposit_to` within the same critical section.
    ///
    /// Returns `false` without writing anything when the external id is
    /// already present (natural key, unique per wallet).
    pub(crate) fn append_transaction(
        &self,
        transaction: Transaction,
        deposit_to: Option<&Account>,
    ) -> bool {
        let txid = transaction.txid().clone();
        match self.tx_index.entry(txid.clone()) {
            Entry::Occupied(_) => false,
            Entry::Vacant(entry) => {
                let mut transactions = self.transactions.write();
                entry.insert(transactions.len());
                transactions.push(transaction);
                if let Some(account) = deposit_to {
                    account.record_deposit(txid);
                }
                true
            }
        }
    }

    /// Applies `f` to the transaction with the given external id.
    pub(crate) fn update_transaction<F>(&self, txid: &Txid, f: F) -> bool
    where
        F: FnOnce(&mut Transaction),
    {
        let Some(index) = self.tx_index.get(txid).map(|entry| *entry) else {
            return false;
        };
        let mut transactions = self.transactions.write();
        match transactions.get_mut(index) {
            Some(transaction) => {
                f(transaction);
                true
            }
            None => false,
        }
    }

    /// Full-history reset: drops every transaction. Transfers and accounts
    /// are untouched.
    pub(crate) fn clear_transactions(&self) {
        // Index first: between the two clears a reader resolves no id and
        // sees an empty ledger rather than a stale position.
        self.tx_index.clear();
        self.transactions.write().clear();
    }

    /// Appends both halves of a paired transfer as one atomic unit.
    pub(crate) fn append_transfer_pair(
        &self,
        debit: Transfer,
        credit: Transfer,
    ) -> Result<(), LedgerError> {
        if !debit.amount_matches_category()
            || !credit.amount_matches_category()
            || debit.amount() + credit.amount() != Decimal::ZERO
        {
            return Err(LedgerError::Integrity(
                "transfer pair does not balance".into(),
            ));
        }
        let mut transfers = self.transfers.write();
        transfers.push(debit);
        transfers.push(credit);
        Ok(())
    }

    /// Runs `f` over the transaction log under the read lock.
    pub(crate) fn with_transactions<R>(&self, f: impl FnOnce(&[Transaction]) -> R) -> R {
        f(&self.transactions.read())
    }

    /// Runs `f` over the transfer log under the read lock.
    pub(crate) fn with_transfers<R>(&self, f: impl FnOnce(&[Transfer]) -> R) -> R {
        f(&self.transfers.read())
    }

    /// Reconciliation pass over the atomicity contract.
    ///
    /// Detects a partially persisted transfer pair, a pair whose halves do
    /// not mirror each other, and records referencing accounts this wallet
    /// does not hold. Violations are surfaced, never repaired.
    pub(crate) fn verify(&self) -> Result<(), LedgerError> {
        let known_ids: HashSet<AccountId> =
            self.accounts.iter().map(|entry| entry.value().id()).collect();

        {
            let transfers = self.transfers.read();
            if transfers.len() % 2 != 0 {
                return Err(LedgerError::Integrity(
                    "transfer log holds an unpaired record".into(),
                ));
            }
            for (offset, pair) in transfers.chunks(2).enumerate() {
                let (debit, credit) = (&pair[0], &pair[1]);
                let mirrored = debit.category() == Category::Send
                    && credit.category() == Category::Receive
                    && debit.sender() == credit.sender()
                    && debit.recipient() == credit.recipient()
                    && debit.amount() + credit.amount() == Decimal::ZERO;
                if !mirrored {
                    return Err(LedgerError::Integrity(format!(
                        "transfer pair {offset} does not balance"
                    )));
                }
                if !known_ids.contains(&debit.sender()) || !known_ids.contains(&debit.recipient()) {
                    return Err(LedgerError::Integrity(format!(
                        "transfer pair {offset} references an unknown account"
                    )));
                }
            }
        }

        self.with_transactions(|transactions| {
            for transaction in transactions {
                if self.accounts.get(transaction.account_label()).is_none() {
                    return Err(LedgerError::Integrity(format!(
                        "transaction {} references unknown account '{}'",
                        transaction.txid(),
                        transaction.account_label()
                    )));
                }
            }
            Ok(())
        })
    }
}
