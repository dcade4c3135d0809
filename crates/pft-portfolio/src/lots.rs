//! FIFO lot matching.
//!
//! Each asset gets its own queue of [`Lot`]s in BUY order. A SELL walks the
//! queue oldest-first and consumes `min(remaining_sell, lot.remaining)` from
//! every lot that still has quantity, emitting one [`CompletedRoundTrip`]
//! per slice. Exhausted lots stay in the queue; they are skipped, never
//! removed, so queue order is always BUY order.
//!
//! # Over-sells
//! When a SELL outlives every open lot, matching stops. The leftover
//! quantity is not turned into a round trip (no short is opened and no
//! profit is invented); it is reported as an [`UnmatchedSell`] so callers
//! can see the gap.

use std::collections::BTreeMap;

use serde::Serialize;
use tracing::warn;

use crate::dates::{days_between, NormalizedDate};
use crate::types::{CompletedRoundTrip, DatedTrade, Lot, Side};

/// Quantities at or below this are float residue: they neither match a lot
/// nor count as an over-sell.
const QTY_EPSILON: f64 = 1e-12;

/// Quantity a SELL could not match against any open lot.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct UnmatchedSell {
    pub asset: String,
    pub date: NormalizedDate,
    pub quantity: f64,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct LotMatching {
    /// In SELL order, then lot order within a SELL.
    pub round_trips: Vec<CompletedRoundTrip>,
    pub unmatched_sells: Vec<UnmatchedSell>,
    /// Final lot queues per asset, exhausted lots included.
    pub open_lots: BTreeMap<String, Vec<Lot>>,
}

impl LotMatching {
    /// Sum of `remaining` over every lot of `asset`.
    pub fn open_quantity(&self, asset: &str) -> f64 {
        self.open_lots
            .get(asset)
            .map(|q| q.iter().map(|l| l.remaining).sum())
            .unwrap_or(0.0)
    }
}

/// Match a canonically ordered trade list.
pub fn match_round_trips(sorted: &[DatedTrade]) -> LotMatching {
    let mut out = LotMatching::default();

    for t in sorted {
        let queue = out.open_lots.entry(t.asset.clone()).or_default();
        match t.side {
            Side::Buy => queue.push(Lot::open(t.date, t.amount, t.price)),
            Side::Sell => {
                let left = consume(queue, t, &mut out.round_trips);
                if left > QTY_EPSILON {
                    warn!(
                        asset = %t.asset,
                        date = %t.date.date_key(),
                        quantity = left,
                        "sell exceeds open lots; excess left unmatched"
                    );
                    out.unmatched_sells.push(UnmatchedSell {
                        asset: t.asset.clone(),
                        date: t.date,
                        quantity: left,
                    });
                }
            }
        }
    }

    out
}

/// Consume lots for one SELL; returns the quantity left unmatched.
fn consume(queue: &mut [Lot], sell: &DatedTrade, trips: &mut Vec<CompletedRoundTrip>) -> f64 {
    let mut left = sell.amount;

    for lot in queue.iter_mut() {
        if left <= QTY_EPSILON {
            break;
        }
        if lot.is_exhausted() {
            continue;
        }

        let m = left.min(lot.remaining);
        if m <= QTY_EPSILON {
            continue;
        }
        let profit_pct = if lot.price != 0.0 {
            (sell.price - lot.price) / lot.price * 100.0
        } else {
            warn!(
                asset = %sell.asset,
                lot_date = %lot.date.date_key(),
                "zero-priced lot matched; profit_pct reported as 0"
            );
            0.0
        };

        trips.push(CompletedRoundTrip {
            asset: sell.asset.clone(),
            buy_date: lot.date,
            sell_date: sell.date,
            buy_price: lot.price,
            sell_price: sell.price,
            amount: m,
            profit: m * (sell.price - lot.price),
            profit_pct,
            hold_days: days_between(lot.date, sell.date),
        });

        lot.remaining -= m;
        left -= m;
    }

    left
}
