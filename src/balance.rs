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

//! Balance aggregation: pure recomputation from ledger records.
//!
//! The unconfirmed balance sums every record in scope, mirroring the
//! daemon's 0-confirmation view. The confirmed balance restricts to
//! transfers (final the moment they are written) plus transactions that
//! count as final at the wallet threshold. Recomputation is idempotent
//! and side-effect-free; callers persist the result into the caches.

use crate::account::Account;
use crate::store::LedgerStore;
use rust_decimal::Decimal;

/// Recomputes `(unconfirmed, confirmed)` for one account.
///
/// An account with no records yields `(0, 0)`.
pub(crate) fn account_balances(
    store: &LedgerStore,
    threshold: i64,
    account: &Account,
) -> (Decimal, Decimal) {
    let mut unconfirmed = Decimal::ZERO;
    let mut confirmed = Decimal::ZERO;

    store.with_transactions(|transactions| {
        for transaction in transactions
            .iter()
            .filter(|tx| tx.account_label() == account.label())
        {
            let amount = transaction.signed_amount();
            unconfirmed += amount;
            if transaction.is_final(threshold) {
                confirmed += amount;
            }
        }
    });

    store.with_transfers(|transfers| {
        for transfer in transfers {
            if let Some(amount) = transfer.amount_for(account.id()) {
                unconfirmed += amount;
                confirmed += amount;
            }
        }
    });

    (unconfirmed, confirmed)
}

/// Recomputes `(unconfirmed, confirmed)` for the whole wallet.
///
/// Paired transfers are internal movements and net to zero at this scope;
/// they are summed anyway so a torn pair shows up as a balance skew rather
/// than being masked.
pub(crate) fn wallet_balances(store: &LedgerStore, threshold: i64) -> (Decimal, Decimal) {
    let mut unconfirmed = Decimal::ZERO;
    let mut confirmed = Decimal::ZERO;

    store.with_transactions(|transactions| {
        for transaction in transactions {
            let amount = transaction.signed_amount();
            unconfirmed += amount;
            if transaction.is_final(threshold) {
                confirmed += amount;
            }
        }
    });

    store.with_transfers(|transfers| {
        for transfer in transfers {
            unconfirmed += transfer.amount();
            confirmed += transfer.amount();
        }
    });

    (unconfirmed, confirmed)
}
