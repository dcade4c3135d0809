//! Ledger replay: trades in, positions and cash out.
//!
//! # Purpose
//! [`accounting`](crate::accounting) holds the raw BUY/SELL mechanics. This
//! module wraps them behind a [`Ledger`] façade that:
//!
//! - Applies trades strictly in canonical order (see [`crate::ordering`]).
//! - Emits [`Position`]s only above the dust threshold.
//! - Surfaces residual cash as a synthetic cash-asset position.
//!
//! # Determinism
//! No IO, no clock reads. Two ledgers fed the same trades produce identical
//! snapshots.

use std::collections::BTreeMap;

use serde::Serialize;
use tracing::debug;

use crate::accounting::{AssetBook, Holdings};
use crate::config::ReplaySection;
use crate::types::{DatedTrade, Position};

/// Point-in-time view of a replayed ledger.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct LedgerSnapshot {
    pub cash: f64,
    /// Every asset ever touched, including flat ones.
    #[serde(skip)]
    pub books: BTreeMap<String, AssetBook>,
    pub trades_applied: usize,
    /// Non-dust positions sorted by asset, plus the cash position if any.
    pub positions: Vec<Position>,
}

impl LedgerSnapshot {
    pub fn position(&self, asset: &str) -> Option<&Position> {
        self.positions.iter().find(|p| p.asset == asset)
    }

    /// `cash + Σ total_cost`.
    pub fn cash_plus_cost(&self) -> f64 {
        self.cash + self.books.values().map(|b| b.total_cost).sum::<f64>()
    }
}

/// Replay façade over [`Holdings`].
#[derive(Clone, Debug)]
pub struct Ledger {
    holdings: Holdings,
    rules: ReplaySection,
    trades_applied: usize,
}

impl Ledger {
    pub fn new(starting_cash: f64, rules: &ReplaySection) -> Self {
        Self {
            holdings: Holdings::new(starting_cash, rules.full_exit_threshold),
            rules: rules.clone(),
            trades_applied: 0,
        }
    }

    /// Apply one trade. Callers must feed trades in canonical order.
    pub fn apply(&mut self, trade: &DatedTrade) {
        self.holdings.apply(trade);
        self.trades_applied += 1;
    }

    pub fn cash(&self) -> f64 {
        self.holdings.cash
    }

    /// Positions above dust, then the cash position when material.
    pub fn positions(&self) -> Vec<Position> {
        let mut out: Vec<Position> = self
            .holdings
            .books
            .iter()
            .filter(|(_, b)| b.amount > self.rules.dust_threshold)
            .map(|(asset, b)| Position {
                asset: asset.clone(),
                amount: b.amount,
                cost_basis: b.cost_basis(),
            })
            .collect();

        let cash = self.holdings.cash;
        if cash > self.rules.cash_threshold {
            let cash_asset = &self.rules.cash_asset;
            match out.iter_mut().find(|p| &p.asset == cash_asset) {
                // Cash-asset trades and residual cash are the same money; merge at par.
                Some(existing) => {
                    let total = existing.amount + cash;
                    existing.cost_basis = (existing.amount * existing.cost_basis + cash) / total;
                    existing.amount = total;
                }
                None => out.push(Position {
                    asset: cash_asset.clone(),
                    amount: cash,
                    cost_basis: 1.0,
                }),
            }
        }
        out
    }

    pub fn snapshot(&self) -> LedgerSnapshot {
        LedgerSnapshot {
            cash: self.holdings.cash,
            books: self.holdings.books.clone(),
            trades_applied: self.trades_applied,
            positions: self.positions(),
        }
    }
}

/// Replay a canonically ordered trade list from `starting_cash`.
pub fn replay(sorted: &[DatedTrade], starting_cash: f64, rules: &ReplaySection) -> LedgerSnapshot {
    let mut ledger = Ledger::new(starting_cash, rules);
    for t in sorted {
        ledger.apply(t);
    }
    let snap = ledger.snapshot();
    debug!(
        trades = snap.trades_applied,
        positions = snap.positions.len(),
        cash = snap.cash,
        "ledger replayed"
    );
    snap
}
