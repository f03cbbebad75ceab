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

//! Incremental ingestion of daemon history and confirmation promotion.
//!
//! The sync cursor is length-based: every examined history entry advances
//! it by exactly one, in order, whether or not the entry yields a ledger
//! record. The cursor is persisted per entry, so a daemon failure mid-sweep
//! loses no progress and re-examines nothing already counted. The sweep
//! processes through the final entry of the fetched window.
//!
//! The engine is invoked by an external scheduler; nothing here
//! self-schedules, and no store lock is held across a gateway call.

use crate::base::{Category, Txid};
use crate::error::LedgerError;
use crate::gateway::{DaemonGateway, HistoryEntry};
use crate::transaction::Transaction;
use crate::wallet::Wallet;
use chrono::{DateTime, TimeZone, Utc};

/// Entries fetched per full sync; large enough to cover a whole wallet
/// history in one page.
const HISTORY_PAGE: usize = 99_999;

/// Drives reconciliation of one wallet against its daemon.
pub struct SyncEngine<'a, G: DaemonGateway> {
    wallet: &'a Wallet,
    gateway: &'a G,
}

impl<'a, G: DaemonGateway> SyncEngine<'a, G> {
    pub fn new(wallet: &'a Wallet, gateway: &'a G) -> Self {
        Self { wallet, gateway }
    }

    /// Full sweep: ingest new history entries, re-poll pending receives,
    /// refresh wallet balances, and stamp the sync time.
    ///
    /// A stored cursor exceeding the fetched history length is evidence of
    /// a daemon-side history reset (re-index); all local transactions are
    /// discarded and the cursor returns to zero before reprocessing.
    pub fn full_sync(&self) -> Result<(), LedgerError> {
        let history = self
            .gateway
            .list_recent_transactions(HISTORY_PAGE)
            .map_err(LedgerError::from)?;

        if self.wallet.checked_count() > history.len() {
            log::warn!(
                "daemon history shrank below cursor ({} > {}); discarding local transactions",
                self.wallet.checked_count(),
                history.len()
            );
            self.wallet.store().clear_transactions();
            self.wallet.set_checked_count(0);
        }

        let start = self.wallet.checked_count();
        for entry in &history[start..] {
            self.wallet.advance_checked_count();
            self.ingest(entry)?;
        }

        self.poll_unconfirmed()?;
        // Wholesale pass over every account: balances again after the
        // promotions above, and lifetime received totals. This also repairs
        // totals left stale when a previous sweep aborted between appending
        // a record and fetching its account's total.
        for account in self.wallet.store().accounts() {
            self.wallet.refresh_account(&account);
            let total = self
                .gateway
                .received_by_label(account.label())
                .map_err(LedgerError::from)?;
            account.set_total_received(total);
        }
        self.wallet.refresh_balances();
        self.wallet.touch_synced();
        Ok(())
    }

    /// Targeted sync of one external id.
    ///
    /// A known pending receive is re-polled and promoted if ready; a known
    /// confirmed transaction or a send is a no-op; an unknown id falls back
    /// to a full sweep.
    pub fn sync_transaction(&self, txid: &Txid) -> Result<(), LedgerError> {
        let store = self.wallet.store();
        let Some(existing) = store.transaction(txid) else {
            return self.full_sync();
        };
        // Sends are final at creation; only pending receives are re-polled.
        if existing.confirmed() || existing.category() == Category::Send {
            return Ok(());
        }

        let detail = self.gateway.get_transaction(txid).map_err(LedgerError::from)?;
        let threshold = self.wallet.confirmations();
        let mut promoted = false;
        store.update_transaction(txid, |tx| {
            tx.set_confirmations(detail.confirmations);
            if detail.confirmations >= threshold {
                tx.confirm();
                promoted = true;
            }
        });
        if promoted {
            if let Some(account) = store.account(existing.account_label()) {
                self.wallet.refresh_account(&account);
            }
            self.wallet.refresh_balances();
        }
        Ok(())
    }

    /// Turns one history entry into a ledger record, where it yields one.
    ///
    /// Skips without error: unmatched categories, labels with no account,
    /// entries missing txid or amount (malformed), and external ids already
    /// ingested. The cursor has already been advanced for this entry.
    fn ingest(&self, entry: &HistoryEntry) -> Result<(), LedgerError> {
        let Some(category) = Category::from_daemon(&entry.category) else {
            return Ok(());
        };
        let Some(label) = entry.account.as_deref() else {
            log::debug!("history entry without an account label, skipping");
            return Ok(());
        };
        let store = self.wallet.store();
        let Some(account) = store.account(label) else {
            log::debug!("no account for label '{label}', skipping entry");
            return Ok(());
        };
        let (Some(txid), Some(amount)) = (entry.txid.clone(), entry.amount) else {
            log::debug!("malformed daemon entry for '{label}', skipping record creation");
            return Ok(());
        };
        if store.transaction(&txid).is_some() {
            // Natural key already ingested, e.g. a withdrawal recorded at
            // send time.
            return Ok(());
        }

        let confirmations = entry.confirmations.unwrap_or(0);
        let transaction = Transaction::new(
            txid.clone(),
            label,
            entry.address.clone().unwrap_or_default(),
            category,
            amount.abs(),
            confirmations,
            entry.time.and_then(from_epoch),
            entry.timereceived.and_then(from_epoch),
        );
        let deposit_to = (category == Category::Receive).then(|| account.as_ref());
        store.append_transaction(transaction, deposit_to);

        // Only receives carry the confirmation lifecycle; sends are final
        // at creation and never get the flag.
        if category == Category::Receive && confirmations >= self.wallet.confirmations() {
            store.update_transaction(&txid, |tx| tx.confirm());
        }
        // Cache refresh before the gateway call below: a failure there must
        // not leave the appended record outside the cached balances.
        self.wallet.refresh_account(&account);

        if category == Category::Receive {
            let total = self
                .gateway
                .received_by_label(label)
                .map_err(LedgerError::from)?;
            account.set_total_received(total);
        }
        Ok(())
    }

    /// Re-polls stored `receive` transactions still awaiting confirmation
    /// and promotes those that now meet the threshold. Cache refreshes are
    /// the caller's responsibility.
    fn poll_unconfirmed(&self) -> Result<(), LedgerError> {
        let store = self.wallet.store();
        let pending: Vec<Txid> = store.with_transactions(|transactions| {
            transactions
                .iter()
                .filter(|tx| tx.category() == Category::Receive && !tx.confirmed())
                .map(|tx| tx.txid().clone())
                .collect()
        });

        let threshold = self.wallet.confirmations();
        for txid in pending {
            let detail = self.gateway.get_transaction(&txid).map_err(LedgerError::from)?;
            log::debug!("re-polled {txid}: {} confirmations", detail.confirmations);
            store.update_transaction(&txid, |tx| {
                tx.set_confirmations(detail.confirmations);
                if detail.confirmations >= threshold {
                    tx.confirm();
                }
            });
        }
        Ok(())
    }
}

fn from_epoch(secs: i64) -> Option<DateTime<Utc>> {
    Utc.timestamp_opt(secs, 0).single()
}
