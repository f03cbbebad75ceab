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

//! Core identifier types shared across the ledger.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Stable identifier for an account within one wallet.
///
/// Assigned by the ledger store at account creation; never reused, even
/// if the wallet's transaction history is reset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Deserialize, Serialize)]
#[serde(transparent)]
pub struct AccountId(pub u64);

impl fmt::Display for AccountId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// External transaction identifier reported by the coin daemon.
///
/// The natural key for ledger transactions: unique per wallet.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Deserialize, Serialize)]
#[serde(transparent)]
pub struct Txid(pub String);

impl Txid {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }
}

impl fmt::Display for Txid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for Txid {
    fn from(id: &str) -> Self {
        Self(id.to_owned())
    }
}

/// Movement direction of a ledger record.
///
/// Daemon history rows carry other categories ("move", "generate",
/// "immature"); only `send` and `receive` yield ledger records.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Category {
    Send,
    Receive,
}

impl Category {
    /// Maps a raw daemon category string; unmatched categories yield `None`.
    pub fn from_daemon(raw: &str) -> Option<Self> {
        match raw {
            "send" => Some(Self::Send),
            "receive" => Some(Self::Receive),
            _ => None,
        }
    }

    /// Applies the sign implied by the category to a non-negative magnitude.
    pub fn signed(self, magnitude: Decimal) -> Decimal {
        match self {
            Self::Send => -magnitude,
            Self::Receive => magnitude,
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Send => write!(f, "send"),
            Self::Receive => write!(f, "receive"),
        }
    }
}
