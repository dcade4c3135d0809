//! Point-in-time portfolio value series.
//!
//! Trades are grouped by their raw date label (first-occurrence order) and
//! replayed cumulatively. After each group the portfolio is marked:
//!
//! `value = cash + Σ holdings[a] * price(a)` over assets with positive
//! holdings, where cash equivalents are marked at 1.0, an asset that the
//! group's last trade touched is marked at that trade's price, and every
//! other asset at its live price (or configured fallback).
//!
//! Cost basis is irrelevant here; the full-exit rule still applies so the
//! series agrees with [`crate::ledger`] on quantities.

use std::collections::HashMap;

use tracing::debug;

use crate::accounting::Holdings;
use crate::config::EngineConfig;
use crate::prices::PriceBook;
use crate::types::{DatedTrade, HistoryPoint};

/// Build one [`HistoryPoint`] per distinct raw trade date.
///
/// `benchmark_value` is left `None`; see [`crate::benchmark::apply`].
pub fn synthesize(sorted: &[DatedTrade], config: &EngineConfig, prices: &PriceBook) -> Vec<HistoryPoint> {
    // `index` maps a raw date to its slot in `groups` (first-seen order).
    let mut groups: Vec<(&str, Vec<&DatedTrade>)> = Vec::new();
    let mut index: HashMap<&str, usize> = HashMap::new();
    for t in sorted {
        let raw = t.raw_date.as_str();
        let slot = *index.entry(raw).or_insert_with(|| {
            groups.push((raw, Vec::new()));
            groups.len() - 1
        });
        groups[slot].1.push(t);
    }

    let mut holdings = Holdings::new(
        config.portfolio.starting_capital,
        config.replay.full_exit_threshold,
    );
    let mut out = Vec::with_capacity(groups.len());

    for (raw_date, members) in groups {
        for t in &members {
            holdings.apply(t);
        }
        // Groups are never empty.
        let Some(last) = members.last() else { continue };

        let mut value = holdings.cash;
        for (asset, book) in &holdings.books {
            if book.amount <= 0.0 {
                continue;
            }
            let price = if prices.is_cash_equivalent(asset) {
                1.0
            } else if &last.asset == asset {
                last.price
            } else {
                prices.history_price(asset)
            };
            value += book.amount * price;
        }

        out.push(HistoryPoint {
            date: raw_date.to_string(),
            timestamp: members[0].date,
            value,
            benchmark_value: None,
        });
    }

    debug!(points = out.len(), "history synthesized");
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;

    use crate::dates::NormalizedDate;
    use crate::types::Side;

    fn t(raw: &str, day: u32, side: Side, asset: &str, amount: f64, price: f64) -> DatedTrade {
        DatedTrade {
            seq: 0,
            raw_date: raw.into(),
            date: NormalizedDate::from_ymd(2025, 6, day).unwrap(),
            side,
            asset: asset.into(),
            amount,
            price,
        }
    }

    fn config(capital: f64) -> EngineConfig {
        EngineConfig::default().with_starting_capital(capital)
    }

    #[test]
    fn empty_trades_yield_empty_series() {
        let cfg = config(1_000.0);
        let book = PriceBook::new(BTreeMap::new(), &cfg);
        assert!(synthesize(&[], &cfg, &book).is_empty());
    }

    #[test]
    fn one_point_per_raw_date() {
        let cfg = config(10_000.0);
        let book = PriceBook::new(BTreeMap::from([("ETH".to_string(), 2_500.0)]), &cfg);
        let trades = vec![
            t("Jun 1", 1, Side::Buy, "ETH", 1.0, 2_000.0),
            t("Jun 1", 1, Side::Buy, "BTC", 0.01, 100_000.0),
            t("Jun 2", 2, Side::Sell, "BTC", 0.01, 105_000.0),
        ];
        let h = synthesize(&trades, &cfg, &book);
        assert_eq!(h.len(), 2);
        assert_eq!(h[0].date, "Jun 1");
        assert_eq!(h[1].date, "Jun 2");

        // Jun 1: cash 7000, BTC marked at the group's last trade, ETH at live.
        assert_eq!(h[0].value, 7_000.0 + 0.01 * 100_000.0 + 2_500.0);
        // Jun 2: cash 8050, BTC flat, ETH at live.
        assert_eq!(h[1].value, 8_050.0 + 2_500.0);
        assert!(h.iter().all(|p| p.benchmark_value.is_none()));
    }

    #[test]
    fn repeated_raw_date_joins_its_first_group() {
        let cfg = config(1_000.0);
        let book = PriceBook::new(BTreeMap::new(), &cfg);
        let trades = vec![
            t("Jun 1", 1, Side::Buy, "SOL", 1.0, 100.0),
            t("Jun 2", 2, Side::Buy, "SOL", 1.0, 110.0),
            t("Jun 1", 1, Side::Buy, "SOL", 1.0, 120.0),
            t("Jun 3", 3, Side::Buy, "SOL", 1.0, 130.0),
        ];
        let h = synthesize(&trades, &cfg, &book);
        let dates: Vec<&str> = h.iter().map(|p| p.date.as_str()).collect();
        assert_eq!(dates, vec!["Jun 1", "Jun 2", "Jun 3"]);
        // Jun 1 holds both of its trades: 2 SOL marked at the last (120).
        assert_eq!(h[0].value, 1_000.0 - 100.0 - 120.0 + 2.0 * 120.0);
    }

    #[test]
    fn unknown_asset_uses_configured_fallback() {
        let mut cfg = config(1_000.0);
        cfg.prices.fallback.insert("SOL".into(), 200.0);
        let book = PriceBook::new(BTreeMap::new(), &cfg);
        let trades = vec![
            t("Jun 1", 1, Side::Buy, "SOL", 2.0, 150.0),
            t("Jun 2", 2, Side::Buy, "ADA", 100.0, 0.5),
        ];
        let h = synthesize(&trades, &cfg, &book);
        assert_eq!(h[1].value, 1_000.0 - 300.0 - 50.0 + 2.0 * 200.0 + 100.0 * 0.5);
    }

    #[test]
    fn cash_equivalent_holdings_marked_at_par() {
        let cfg = config(500.0);
        let book = PriceBook::new(BTreeMap::new(), &cfg);
        let trades = vec![t("Jun 1", 1, Side::Buy, "USDC", 100.0, 1.01)];
        let h = synthesize(&trades, &cfg, &book);
        assert_eq!(h[0].value, 500.0 - 101.0 + 100.0);
    }
}
