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

//! Internal transfers and external withdrawals.
//!
//! Every precondition is checked before anything is written; a failed
//! precondition is a decline, not a fault, and leaves the ledger untouched.
//! The two records of an internal transfer are appended as one atomic unit.

use crate::base::{Category, Txid};
use crate::error::{Decline, LedgerError};
use crate::gateway::DaemonGateway;
use crate::transaction::{Transaction, Transfer};
use crate::wallet::Wallet;
use chrono::Utc;
use rust_decimal::Decimal;

/// Executes balance movements against one wallet's ledger.
pub struct TransferEngine<'a> {
    wallet: &'a Wallet,
}

impl<'a> TransferEngine<'a> {
    pub fn new(wallet: &'a Wallet) -> Self {
        Self { wallet }
    }

    /// Moves `amount` from `sender` to `recipient` as a paired transfer.
    ///
    /// Declined when the amount is not positive, carries excess precision,
    /// either account is missing, sender and recipient coincide, or the
    /// sender's or wallet's confirmed balance is below the amount.
    pub fn transfer(
        &self,
        sender: &str,
        recipient: &str,
        amount: Decimal,
        comment: Option<String>,
    ) -> Result<(), LedgerError> {
        check_amount(amount)?;
        let store = self.wallet.store();
        let sender = store.account(sender).ok_or(Decline::UnknownAccount)?;
        let recipient = store.account(recipient).ok_or(Decline::UnknownRecipient)?;
        if sender.id() == recipient.id() {
            return Err(Decline::SelfTransfer.into());
        }
        if sender.confirmed_balance() < amount || self.wallet.confirmed_balance() < amount {
            return Err(Decline::InsufficientFunds.into());
        }

        let (debit, credit) = Transfer::pair(sender.id(), recipient.id(), amount, comment);
        store.append_transfer_pair(debit, credit)?;

        self.wallet.refresh_account(&sender);
        self.wallet.refresh_account(&recipient);
        self.wallet.refresh_balances();
        log::debug!(
            "transferred {amount} from '{}' to '{}'",
            sender.label(),
            recipient.label()
        );
        Ok(())
    }

    /// Sends `amount` to an external address, attributed to `account`.
    ///
    /// The daemon validates the address and executes the spend; on success
    /// the returned txid is recorded as a withdrawal reference and as a
    /// local `send` transaction, so balances reflect the spend without
    /// waiting for the next sweep (the natural key keeps the sweep from
    /// re-ingesting it). A daemon-reported error declines with zero ledger
    /// mutation. Transaction fees are handled higher in the stack.
    pub fn withdraw<G: DaemonGateway>(
        &self,
        gateway: &G,
        account: &str,
        address: &str,
        amount: Decimal,
    ) -> Result<Txid, LedgerError> {
        check_amount(amount)?;
        let store = self.wallet.store();
        let account = store.account(account).ok_or(Decline::UnknownAccount)?;
        if account.confirmed_balance() < amount || self.wallet.confirmed_balance() < amount {
            return Err(Decline::InsufficientFunds.into());
        }
        let info = gateway.validate_address(address).map_err(LedgerError::from)?;
        if !info.is_valid {
            return Err(Decline::InvalidAddress.into());
        }

        let txid = gateway
            .send_to_address(address, amount, account.label())
            .map_err(LedgerError::from)?;

        let now = Utc::now();
        let transaction = Transaction::new(
            txid.clone(),
            account.label(),
            address,
            Category::Send,
            amount,
            0,
            Some(now),
            Some(now),
        );
        store.append_transaction(transaction, None);
        account.record_withdrawal(txid.clone());

        self.wallet.refresh_account(&account);
        self.wallet.refresh_balances();
        log::info!(
            "withdrew {amount} from '{}' to {address} ({txid})",
            account.label()
        );
        Ok(txid)
    }
}

fn check_amount(amount: Decimal) -> Result<(), Decline> {
    if amount <= Decimal::ZERO {
        return Err(Decline::InvalidAmount);
    }
    if amount.normalize().scale() > Transfer::DECIMAL_PRECISION {
        return Err(Decline::ExcessPrecision);
    }
    Ok(())
}
