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

//! Error taxonomy for ledger operations.
//!
//! Three classes of failure, kept apart on purpose:
//!
//! - [`Decline`]: an expected negative outcome (insufficient funds, bad
//!   address). Nothing was mutated.
//! - [`LedgerError::Unavailable`]: a collaborator could not be reached.
//!   Retryable by the caller; the core never retries on its own.
//! - [`LedgerError::Integrity`]: the atomicity contract was violated.
//!   Fatal, and never silently repaired.

use crate::gateway::GatewayError;
use thiserror::Error;

/// Reasons an operation is declined before any state is mutated.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Decline {
    /// Amount is zero or negative
    #[error("amount must be positive")]
    InvalidAmount,

    /// Amount carries more fractional digits than the currency supports
    #[error("amount exceeds 8 fractional digits")]
    ExcessPrecision,

    /// Confirmed balance of the account or wallet is below the amount
    #[error("insufficient confirmed funds")]
    InsufficientFunds,

    /// No account with the given label exists in this wallet
    #[error("unknown account")]
    UnknownAccount,

    /// The transfer recipient does not exist in this wallet
    #[error("unknown recipient account")]
    UnknownRecipient,

    /// Sender and recipient are the same account
    #[error("sender and recipient are the same account")]
    SelfTransfer,

    /// The daemon rejected the destination address as malformed
    #[error("invalid destination address")]
    InvalidAddress,

    /// An account with this label already exists
    #[error("account label already exists")]
    DuplicateLabel,

    /// The daemon reported a business error for the request
    #[error("daemon refused the request: {0}")]
    DaemonRefused(String),
}

/// Ledger operation errors.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LedgerError {
    /// Structured negative result; no state was mutated
    #[error("declined: {0}")]
    Declined(#[from] Decline),

    /// The daemon could not be reached; retry belongs to the caller
    #[error("daemon unavailable: {0}")]
    Unavailable(String),

    /// A paired write was only partially persisted, or a record references
    /// a missing account
    #[error("ledger integrity violated: {0}")]
    Integrity(String),
}

impl From<GatewayError> for LedgerError {
    fn from(err: GatewayError) -> Self {
        match err {
            GatewayError::Unreachable(message) => Self::Unavailable(message),
            GatewayError::Rpc { message, .. } => Self::Declined(Decline::DaemonRefused(message)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decline_display_messages() {
        assert_eq!(Decline::InvalidAmount.to_string(), "amount must be positive");
        assert_eq!(
            Decline::InsufficientFunds.to_string(),
            "insufficient confirmed funds"
        );
        assert_eq!(Decline::UnknownAccount.to_string(), "unknown account");
        assert_eq!(
            Decline::SelfTransfer.to_string(),
            "sender and recipient are the same account"
        );
    }

    #[test]
    fn gateway_errors_map_to_ledger_errors() {
        let unreachable = GatewayError::Unreachable("connection refused".into());
        assert_eq!(
            LedgerError::from(unreachable),
            LedgerError::Unavailable("connection refused".into())
        );

        let refused = GatewayError::Rpc {
            code: -6,
            message: "Insufficient funds".into(),
        };
        assert_eq!(
            LedgerError::from(refused),
            LedgerError::Declined(Decline::DaemonRefused("Insufficient funds".into()))
        );
    }

    #[test]
    fn errors_are_cloneable() {
        let error = LedgerError::Declined(Decline::InsufficientFunds);
        assert_eq!(error.clone(), error);
    }
}
