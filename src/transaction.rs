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

//! Ledger records: daemon-observed transactions and paired internal transfers.
//!
//! A [`Transaction`] follows a one-way state machine:
//! `unconfirmed → confirmed` (terminal). Promotion happens exactly once,
//! when the daemon-reported confirmation count reaches the wallet threshold,
//! and is never reversed.

use crate::base::{AccountId, Category, Txid};
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;

/// One daemon-observed movement tied to an account by label.
#[derive(Debug, Clone)]
pub struct Transaction {
    txid: Txid,
    account_label: String,
    address: String,
    category: Category,
    /// Non-negative magnitude; the sign is implied by the category.
    amount: Decimal,
    confirmations: i64,
    confirmed: bool,
    occurred_at: Option<DateTime<Utc>>,
    received_at: Option<DateTime<Utc>>,
}

impl Transaction {
    #[allow(clippy::too_many_arguments)]
    pub(crate) fn new(
        txid: Txid,
        account_label: impl Into<String>,
        address: impl Into<String>,
        category: Category,
        amount: Decimal,
        confirmations: i64,
        occurred_at: Option<DateTime<Utc>>,
        received_at: Option<DateTime<Utc>>,
    ) -> Self {
        debug_assert!(
            amount >= Decimal::ZERO,
            "transaction amount is a magnitude, got {amount}"
        );
        Self {
            txid,
            account_label: account_label.into(),
            address: address.into(),
            category,
            amount,
            confirmations,
            confirmed: false,
            occurred_at,
            received_at,
        }
    }

    pub fn txid(&self) -> &Txid {
        &self.txid
    }

    pub fn account_label(&self) -> &str {
        &self.account_label
    }

    pub fn address(&self) -> &str {
        &self.address
    }

    pub fn category(&self) -> Category {
        self.category
    }

    /// Non-negative magnitude of the movement.
    pub fn amount(&self) -> Decimal {
        self.amount
    }

    pub fn confirmations(&self) -> i64 {
        self.confirmations
    }

    pub fn confirmed(&self) -> bool {
        self.confirmed
    }

    pub fn occurred_at(&self) -> Option<DateTime<Utc>> {
        self.occurred_at
    }

    pub fn received_at(&self) -> Option<DateTime<Utc>> {
        self.received_at
    }

    /// Signed contribution to a balance.
    pub fn signed_amount(&self) -> Decimal {
        self.category.signed(self.amount)
    }

    /// Whether this record counts toward a confirmed balance.
    ///
    /// Outgoing spends reduce the confirmed balance as soon as the daemon
    /// accepts them; incoming funds count only once promoted or once their
    /// reported count meets the threshold.
    pub fn is_final(&self, threshold: i64) -> bool {
        matches!(self.category, Category::Send) || self.confirmed || self.confirmations >= threshold
    }

    /// Marks the record confirmed. Idempotent; never reversed.
    pub(crate) fn confirm(&mut self) {
        self.confirmed = true;
    }

    pub(crate) fn set_confirmations(&mut self, confirmations: i64) {
        self.confirmations = confirmations;
    }
}

/// One half of a paired internal movement between two accounts.
///
/// Every logical transfer of magnitude `m` is represented as exactly two
/// records created together: a `send` for `-m` against the sender and a
/// `receive` for `+m` against the recipient. Transfers are final the moment
/// they are written; there is no confirmation lifecycle.
#[derive(Debug, Clone)]
pub struct Transfer {
    timestamp: DateTime<Utc>,
    sender: AccountId,
    recipient: AccountId,
    category: Category,
    /// Signed: negative for the `send` half, positive for the `receive` half.
    amount: Decimal,
    comment: Option<String>,
}

impl Transfer {
    /// Fractional digits permitted on a transfer amount, matching the
    /// currency's smallest unit.
    pub const DECIMAL_PRECISION: u32 = 8;

    /// Builds the two records for one logical transfer of magnitude `amount`.
    pub(crate) fn pair(
        sender: AccountId,
        recipient: AccountId,
        amount: Decimal,
        comment: Option<String>,
    ) -> (Transfer, Transfer) {
        debug_assert!(amount > Decimal::ZERO, "transfer magnitude must be positive");
        let timestamp = Utc::now();
        let debit = Transfer {
            timestamp,
            sender,
            recipient,
            category: Category::Send,
            amount: -amount,
            comment: comment.clone(),
        };
        let credit = Transfer {
            timestamp,
            sender,
            recipient,
            category: Category::Receive,
            amount,
            comment,
        };
        (debit, credit)
    }

    pub fn timestamp(&self) -> DateTime<Utc> {
        self.timestamp
    }

    pub fn sender(&self) -> AccountId {
        self.sender
    }

    pub fn recipient(&self) -> AccountId {
        self.recipient
    }

    pub fn category(&self) -> Category {
        self.category
    }

    /// Signed amount carried by this half of the pair.
    pub fn amount(&self) -> Decimal {
        self.amount
    }

    pub fn comment(&self) -> Option<&str> {
        self.comment.as_deref()
    }

    /// Sign matches category: `send` strictly negative, `receive` strictly
    /// positive.
    pub fn amount_matches_category(&self) -> bool {
        match self.category {
            Category::Send => self.amount < Decimal::ZERO,
            Category::Receive => self.amount > Decimal::ZERO,
        }
    }

    /// Signed contribution to the given account's balance, if any.
    ///
    /// The `send` half belongs to the sender, the `receive` half to the
    /// recipient; a record contributes to at most one account.
    pub fn amount_for(&self, account: AccountId) -> Option<Decimal> {
        match self.category {
            Category::Send if self.sender == account => Some(self.amount),
            Category::Receive if self.recipient == account => Some(self.amount),
            _ => None,
        }
    }
}
