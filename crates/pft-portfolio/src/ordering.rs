//! Canonical trade ordering.
//!
//! Every downstream component (ledger, history, lot matching) consumes the
//! same ordering: trades sorted by [`NormalizedDate`] ascending, ties kept in
//! the order the caller supplied them. The sort key is `(date, seq)` where
//! `seq` is the input index, so the result does not depend on the sort
//! algorithm's stability.

use chrono::NaiveDateTime;

use crate::dates::normalize;
use crate::types::{DatedTrade, Trade};

/// Resolve a single trade: normalize its date and parse its numeric fields.
pub fn resolve_trade(seq: usize, trade: &Trade, reference_year: i32, now: NaiveDateTime) -> DatedTrade {
    DatedTrade {
        seq,
        raw_date: trade.date.clone(),
        date: normalize(&trade.date, reference_year, now),
        side: trade.side,
        asset: trade.asset.clone(),
        amount: trade.amount.value(),
        price: trade.price.value(),
    }
}

/// Resolve and sort `trades` into canonical order.
///
/// Pure and deterministic for a fixed `now`.
pub fn sort_trades(trades: &[Trade], reference_year: i32, now: NaiveDateTime) -> Vec<DatedTrade> {
    let mut out: Vec<DatedTrade> = trades
        .iter()
        .enumerate()
        .map(|(i, t)| resolve_trade(i, t, reference_year, now))
        .collect();
    out.sort_by(|a, b| a.date.cmp(&b.date).then(a.seq.cmp(&b.seq)));
    out
}
