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

use clap::Parser;
use coin_ledger::{
    AddressInfo, DaemonGateway, GatewayError, HistoryEntry, TxDetail, Txid, Wallet,
};
use csv::{ReaderBuilder, Trim, Writer};
use rust_decimal::Decimal;
use serde::Deserialize;
use std::fs::File;
use std::io::{BufReader, Read, Write};
use std::path::PathBuf;
use std::process;

/// Ledger Replay - Reconcile a recorded daemon history offline
///
/// Reads daemon history entries from a CSV file, replays them through a
/// read-only gateway into a fresh wallet, and outputs account states to
/// stdout.
#[derive(Parser, Debug)]
#[command(name = "coin-ledger")]
#[command(about = "Replays a recorded coin-daemon history into a fresh ledger", long_about = None)]
struct Args {
    /// Path to CSV file with daemon history entries
    ///
    /// Expected format: category,account,txid,address,amount,confirmations,time,timereceived
    #[arg(value_name = "FILE")]
    input: PathBuf,

    /// Currency code for the replayed wallet
    #[arg(long, default_value = "BTC")]
    currency: String,

    /// Confirmation threshold for promotion decisions
    #[arg(long, default_value_t = 6)]
    confirmations: i64,
}

fn main() {
    env_logger::init();
    let args = Args::parse();

    let file = match File::open(&args.input) {
        Ok(f) => f,
        Err(e) => {
            eprintln!("Error opening file '{}': {}", args.input.display(), e);
            process::exit(1);
        }
    };

    let wallet = match replay_history(
        BufReader::new(file),
        &args.currency,
        args.confirmations,
    ) {
        Ok(wallet) => wallet,
        Err(e) => {
            eprintln!("Error replaying history: {}", e);
            process::exit(1);
        }
    };

    if let Err(e) = write_accounts(&wallet, std::io::stdout()) {
        eprintln!("Error writing output: {}", e);
        process::exit(1);
    }
}

/// Raw CSV record matching the daemon history export format.
///
/// Fields: `category, account, txid, address, amount, confirmations, time, timereceived`
#[derive(Debug, Deserialize)]
struct CsvRecord {
    category: String,
    account: Option<String>,
    txid: Option<String>,
    address: Option<String>,
    #[serde(deserialize_with = "csv::invalid_option")]
    amount: Option<Decimal>,
    #[serde(deserialize_with = "csv::invalid_option")]
    confirmations: Option<i64>,
    #[serde(deserialize_with = "csv::invalid_option")]
    time: Option<i64>,
    #[serde(deserialize_with = "csv::invalid_option")]
    timereceived: Option<i64>,
}

impl CsvRecord {
    fn into_entry(self) -> HistoryEntry {
        HistoryEntry {
            category: self.category,
            account: self.account.filter(|s| !s.is_empty()),
            txid: self
                .txid
                .filter(|s| !s.is_empty())
                .map(Txid::new),
            address: self.address.filter(|s| !s.is_empty()),
            amount: self.amount,
            confirmations: self.confirmations,
            time: self.time,
            timereceived: self.timereceived,
        }
    }
}

/// Read-only gateway over a recorded history window.
///
/// Mutating capabilities answer with a daemon error so a replay can never
/// spend anything.
struct ReplayGateway {
    history: Vec<HistoryEntry>,
}

impl ReplayGateway {
    fn read_only() -> GatewayError {
        GatewayError::Rpc {
            code: -32601,
            message: "replay gateway is read-only".into(),
        }
    }
}

impl DaemonGateway for ReplayGateway {
    fn list_recent_transactions(&self, max: usize) -> Result<Vec<HistoryEntry>, GatewayError> {
        Ok(self.history.iter().take(max).cloned().collect())
    }

    fn get_transaction(&self, txid: &Txid) -> Result<TxDetail, GatewayError> {
        self.history
            .iter()
            .find(|entry| entry.txid.as_ref() == Some(txid))
            .and_then(|entry| entry.confirmations)
            .map(|confirmations| TxDetail { confirmations })
            .ok_or(GatewayError::Rpc {
                code: -5,
                message: "Invalid or non-wallet transaction id".into(),
            })
    }

    fn send_to_address(
        &self,
        _address: &str,
        _amount: Decimal,
        _label: &str,
    ) -> Result<Txid, GatewayError> {
        Err(Self::read_only())
    }

    fn validate_address(&self, _address: &str) -> Result<AddressInfo, GatewayError> {
        Err(Self::read_only())
    }

    fn new_address(&self, _label: &str) -> Result<String, GatewayError> {
        Err(Self::read_only())
    }

    fn received_by_label(&self, label: &str) -> Result<Decimal, GatewayError> {
        let total = self
            .history
            .iter()
            .filter(|entry| {
                entry.category == "receive" && entry.account.as_deref() == Some(label)
            })
            .filter_map(|entry| entry.amount)
            .map(|amount| amount.abs())
            .sum();
        Ok(total)
    }

    fn balance(&self, min_confirmations: i64) -> Result<Decimal, GatewayError> {
        let total = self
            .history
            .iter()
            .filter(|entry| entry.confirmations.unwrap_or(0) >= min_confirmations)
            .filter_map(|entry| match entry.category.as_str() {
                "receive" => entry.amount.map(|a| a.abs()),
                "send" => entry.amount.map(|a| -a.abs()),
                _ => None,
            })
            .sum();
        Ok(total)
    }

    fn encrypt_wallet(&self, _passphrase: &str) -> Result<bool, GatewayError> {
        Err(Self::read_only())
    }
}

/// Replays a CSV of daemon history through a fresh wallet.
///
/// Accounts are created for every label seen in the history, in order of
/// first appearance, then a single full sync reconciles the ledger.
/// Malformed rows are skipped.
///
/// # Errors
///
/// Returns a CSV error if the reader fails, or the sync error if the
/// replay gateway rejects a call.
fn replay_history<R: Read>(
    reader: R,
    currency: &str,
    confirmations: i64,
) -> Result<Wallet, Box<dyn std::error::Error>> {
    let mut rdr = ReaderBuilder::new()
        .trim(Trim::All)
        .flexible(true)
        .has_headers(true)
        .from_reader(reader);

    let mut history = Vec::new();
    for result in rdr.deserialize::<CsvRecord>() {
        match result {
            Ok(record) => history.push(record.into_entry()),
            Err(e) => {
                // Skip malformed rows
                #[cfg(debug_assertions)]
                eprintln!("Skipping malformed row: {}", e);
                continue;
            }
        }
    }

    let wallet = Wallet::new(currency, confirmations);
    for entry in &history {
        if let Some(label) = entry.account.as_deref() {
            // Idempotent: duplicate labels decline, which is fine here.
            let _ = wallet.create_account(label);
        }
    }

    let gateway = ReplayGateway { history };
    wallet.sync(&gateway)?;
    Ok(wallet)
}

/// Write account states to a CSV writer.
///
/// Columns: `label, unconfirmed, confirmed, total_received`, eight decimal
/// places.
fn write_accounts<W: Write>(wallet: &Wallet, writer: W) -> Result<(), csv::Error> {
    let mut wtr = Writer::from_writer(writer);
    for account in wallet.accounts() {
        wtr.serialize(&*account)?;
    }
    wtr.flush()?;
    Ok(())
}
