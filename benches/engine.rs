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

//! Benchmarks for the wallet ledger.
//!
//! Run with: cargo bench
//!
//! Benchmarks include:
//! - Full sync throughput over growing daemon histories
//! - No-op sweeps against an already synced ledger
//! - Internal transfer throughput
//! - Balance recomputation as the ledger grows

use criterion::{BenchmarkId, Criterion, Throughput, black_box, criterion_group, criterion_main};
use coin_ledger::{
    AddressInfo, DaemonGateway, GatewayError, HistoryEntry, TxDetail, Txid, Wallet,
};
use rust_decimal::Decimal;

// =============================================================================
// Helper Gateway
// =============================================================================

/// In-memory gateway backed by a prebuilt history vector.
struct FixedGateway {
    history: Vec<HistoryEntry>,
}

impl FixedGateway {
    /// `count` confirmed receives spread across `labels`.
    fn with_receives(labels: &[&str], count: usize) -> Self {
        let history = (0..count)
            .map(|i| HistoryEntry {
                category: "receive".into(),
                account: Some(labels[i % labels.len()].to_string()),
                txid: Some(Txid::from(format!("tx{i}").as_str())),
                address: None,
                amount: Some(Decimal::new((i as i64 + 1) * 100, 8)),
                confirmations: Some(6),
                time: Some(1_700_000_000 + i as i64),
                timereceived: Some(1_700_000_000 + i as i64),
            })
            .collect();
        Self { history }
    }
}

impl DaemonGateway for FixedGateway {
    fn list_recent_transactions(&self, max: usize) -> Result<Vec<HistoryEntry>, GatewayError> {
        Ok(self.history.iter().take(max).cloned().collect())
    }

    fn get_transaction(&self, _txid: &Txid) -> Result<TxDetail, GatewayError> {
        Ok(TxDetail { confirmations: 6 })
    }

    fn send_to_address(
        &self,
        _address: &str,
        _amount: Decimal,
        _label: &str,
    ) -> Result<Txid, GatewayError> {
        Ok(Txid::from("bench-send"))
    }

    fn validate_address(&self, address: &str) -> Result<AddressInfo, GatewayError> {
        Ok(AddressInfo {
            is_valid: !address.is_empty(),
            is_mine: false,
            label: None,
        })
    }

    fn new_address(&self, label: &str) -> Result<String, GatewayError> {
        Ok(format!("addr-{label}"))
    }

    fn received_by_label(&self, label: &str) -> Result<Decimal, GatewayError> {
        Ok(self
            .history
            .iter()
            .filter(|entry| entry.account.as_deref() == Some(label))
            .filter_map(|entry| entry.amount)
            .sum())
    }

    fn balance(&self, _min_confirmations: i64) -> Result<Decimal, GatewayError> {
        Ok(self.history.iter().filter_map(|entry| entry.amount).sum())
    }

    fn encrypt_wallet(&self, _passphrase: &str) -> Result<bool, GatewayError> {
        Ok(true)
    }
}

const LABELS: [&str; 4] = ["alice", "bob", "carol", "dave"];

fn wallet_with_accounts() -> Wallet {
    let wallet = Wallet::new("BTC", 6);
    for label in LABELS {
        wallet.create_account(label).unwrap();
    }
    wallet
}

// =============================================================================
// Sync Benchmarks
// =============================================================================

fn bench_full_sync(c: &mut Criterion) {
    let mut group = c.benchmark_group("full_sync");

    for count in [100, 1_000, 10_000].iter() {
        let gateway = FixedGateway::with_receives(&LABELS, *count);
        group.throughput(Throughput::Elements(*count as u64));
        group.bench_with_input(BenchmarkId::from_parameter(count), count, |b, _| {
            b.iter(|| {
                let wallet = wallet_with_accounts();
                wallet.sync(&gateway).unwrap();
                black_box(&wallet);
            })
        });
    }
    group.finish();
}

fn bench_noop_sweep(c: &mut Criterion) {
    let mut group = c.benchmark_group("noop_sweep");

    // The ledger is already caught up; the sweep only scans for pending
    // confirmations and refreshes balances.
    for count in [100, 1_000, 10_000].iter() {
        let gateway = FixedGateway::with_receives(&LABELS, *count);
        let wallet = wallet_with_accounts();
        wallet.sync(&gateway).unwrap();

        group.throughput(Throughput::Elements(*count as u64));
        group.bench_with_input(BenchmarkId::from_parameter(count), count, |b, _| {
            b.iter(|| {
                wallet.sync(&gateway).unwrap();
                black_box(&wallet);
            })
        });
    }
    group.finish();
}

// =============================================================================
// Transfer Benchmarks
// =============================================================================

fn bench_transfers(c: &mut Criterion) {
    let mut group = c.benchmark_group("transfers");

    for count in [100, 1_000].iter() {
        let gateway = FixedGateway::with_receives(&LABELS, 100);
        group.throughput(Throughput::Elements(*count as u64));
        group.bench_with_input(BenchmarkId::from_parameter(count), count, |b, &count| {
            b.iter(|| {
                let wallet = wallet_with_accounts();
                wallet.sync(&gateway).unwrap();
                for i in 0..count {
                    let sender = LABELS[i % LABELS.len()];
                    let recipient = LABELS[(i + 1) % LABELS.len()];
                    let amount = Decimal::new(1, 8);
                    wallet.transfer(sender, recipient, amount, None).unwrap();
                }
                black_box(&wallet);
            })
        });
    }
    group.finish();
}

// =============================================================================
// Aggregation Benchmarks
// =============================================================================

fn bench_recompute(c: &mut Criterion) {
    let mut group = c.benchmark_group("recompute");

    // Wallet-wide recomputation cost as the ledger grows.
    for count in [100, 1_000, 10_000].iter() {
        let gateway = FixedGateway::with_receives(&LABELS, *count);
        let wallet = wallet_with_accounts();
        wallet.sync(&gateway).unwrap();

        group.throughput(Throughput::Elements(*count as u64));
        group.bench_with_input(BenchmarkId::from_parameter(count), count, |b, _| {
            b.iter(|| black_box(wallet.recompute()))
        });
    }
    group.finish();
}

// =============================================================================
// Criterion Groups
// =============================================================================

criterion_group!(sync, bench_full_sync, bench_noop_sweep,);

criterion_group!(transfers, bench_transfers,);

criterion_group!(aggregation, bench_recompute,);

criterion_main!(sync, transfers, aggregation);
