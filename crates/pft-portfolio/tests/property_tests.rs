//! Property tests for replay invariants.
//!
//! Uses proptest to verify:
//! 1. Cash identity: cash equals start minus buys plus sells
//! 2. No negative or dust positions are ever emitted
//! 3. Lot matching accounts for every sold unit exactly once
//! 4. Benchmark series shares the portfolio series' date axis
//! 5. The full pipeline is idempotent for a fixed `now`

use std::collections::BTreeMap;

use chrono::{NaiveDate, NaiveDateTime};
use pft_portfolio::config::ReplaySection;
use pft_portfolio::{
    build_report, match_round_trips, replay, sort_trades, EngineConfig, PortfolioInputs,
    PriceHistory, Side, Trade,
};
use proptest::prelude::*;

const ASSETS: [&str; 3] = ["BTC", "ETH", "SOL"];

fn now() -> NaiveDateTime {
    NaiveDate::from_ymd_opt(2026, 1, 1)
        .unwrap()
        .and_hms_opt(0, 0, 0)
        .unwrap()
}

// ── Strategies (proptest) ────────────────────────────────────────────

fn arb_trade() -> impl Strategy<Value = Trade> {
    (
        1u32..=12,
        1u32..=28,
        prop::bool::ANY,
        0usize..ASSETS.len(),
        (0.0..10.0_f64).prop_map(|q| (q * 1000.0).round() / 1000.0),
        (1.0..5000.0_f64).prop_map(|p| (p * 100.0).round() / 100.0),
    )
        .prop_map(|(m, d, buy, a, qty, px)| {
            let side = if buy { Side::Buy } else { Side::Sell };
            Trade::new(format!("2025-{m:02}-{d:02}"), side, ASSETS[a], qty, px)
        })
}

fn arb_trades() -> impl Strategy<Value = Vec<Trade>> {
    prop::collection::vec(arb_trade(), 0..40)
}

fn tolerance(scale: f64) -> f64 {
    1e-9 * scale.abs().max(1.0)
}

proptest! {
    #[test]
    fn cash_identity_holds(trades in arb_trades(), capital in 0.0..100_000.0_f64) {
        let sorted = sort_trades(&trades, 2025, now());
        let snap = replay(&sorted, capital, &ReplaySection::default());

        let flow: f64 = sorted
            .iter()
            .map(|t| match t.side {
                Side::Buy => -t.notional(),
                Side::Sell => t.notional(),
            })
            .sum();
        let gross: f64 = sorted.iter().map(|t| t.notional()).sum::<f64>() + capital;
        prop_assert!((snap.cash - (capital + flow)).abs() <= tolerance(gross));
    }

    #[test]
    fn positions_are_never_negative_or_dust(trades in arb_trades(), capital in 0.0..100_000.0_f64) {
        let rules = ReplaySection::default();
        let sorted = sort_trades(&trades, 2025, now());
        let snap = replay(&sorted, capital, &rules);

        for p in &snap.positions {
            prop_assert!(p.amount > rules.dust_threshold, "{} amount {}", p.asset, p.amount);
            prop_assert!(p.cost_basis >= 0.0 || p.asset == rules.cash_asset);
        }
        let mut assets: Vec<&str> = snap.positions.iter().map(|p| p.asset.as_str()).collect();
        let n = assets.len();
        assets.dedup();
        prop_assert_eq!(assets.len(), n);
    }

    #[test]
    fn every_sold_unit_is_matched_or_flagged(trades in arb_trades()) {
        let sorted = sort_trades(&trades, 2025, now());
        let m = match_round_trips(&sorted);

        for asset in ASSETS {
            let sold: f64 = sorted
                .iter()
                .filter(|t| t.asset == asset && t.side == Side::Sell)
                .map(|t| t.amount)
                .sum();
            let matched: f64 = m.round_trips.iter().filter(|r| r.asset == asset).map(|r| r.amount).sum();
            let flagged: f64 = m.unmatched_sells.iter().filter(|u| u.asset == asset).map(|u| u.quantity).sum();
            prop_assert!((sold - matched - flagged).abs() <= tolerance(sold));

            let bought: f64 = sorted
                .iter()
                .filter(|t| t.asset == asset && t.side == Side::Buy)
                .map(|t| t.amount)
                .sum();
            prop_assert!((bought - matched - m.open_quantity(asset)).abs() <= tolerance(bought));
        }

        for r in &m.round_trips {
            prop_assert!(r.amount > 0.0);
            prop_assert!(r.hold_days >= 0);
            prop_assert!(r.buy_date <= r.sell_date);
        }
    }

    #[test]
    fn benchmark_shares_date_axis(trades in arb_trades(), capital in 1.0..50_000.0_f64) {
        let config = EngineConfig::default().with_starting_capital(capital);
        let inputs = PortfolioInputs {
            trades,
            live_prices: BTreeMap::from([("BTC".to_string(), 105_000.0)]),
            reference_history: PriceHistory::from([("2025-06-20".to_string(), 100_000.0)]),
            ..PortfolioInputs::default()
        };
        let report = build_report(&inputs, &config, now());

        let dates: Vec<&str> = report.history.iter().map(|p| p.date.as_str()).collect();
        let mut distinct: Vec<&str> = inputs.trades.iter().map(|t| t.date.as_str()).collect();
        distinct.sort();
        distinct.dedup();
        prop_assert_eq!(dates.len(), distinct.len());
        prop_assert!(report.history.iter().all(|p| p.benchmark_value.is_some()));
        prop_assert!(report.history.windows(2).all(|w| w[0].timestamp <= w[1].timestamp));
    }

    #[test]
    fn pipeline_is_idempotent(trades in arb_trades(), capital in 0.0..50_000.0_f64) {
        let config = EngineConfig::default().with_starting_capital(capital);
        let inputs = PortfolioInputs {
            trades,
            live_prices: BTreeMap::from([
                ("BTC".to_string(), 105_000.0),
                ("ETH".to_string(), 3_900.0),
            ]),
            ..PortfolioInputs::default()
        };
        let a = build_report(&inputs, &config, now());
        let b = build_report(&inputs, &config, now());
        prop_assert_eq!(&a, &b);
        prop_assert_eq!(
            serde_json::to_string(&a).unwrap(),
            serde_json::to_string(&b).unwrap()
        );
    }
}
