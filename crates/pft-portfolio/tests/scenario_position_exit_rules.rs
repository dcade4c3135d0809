use chrono::{NaiveDate, NaiveDateTime};
use pft_portfolio::config::ReplaySection;
use pft_portfolio::{replay, sort_trades, Trade};

fn now() -> NaiveDateTime {
    NaiveDate::from_ymd_opt(2025, 12, 31)
        .unwrap()
        .and_hms_opt(0, 0, 0)
        .unwrap()
}

#[test]
fn scenario_partial_sell_keeps_cost_basis() {
    // 10 units, total cost 1000; sell 5
    let trades = vec![
        Trade::buy("2025-02-01", "AAA", 10.0, 100.0),
        Trade::sell("2025-02-02", "AAA", 5.0, 130.0),
    ];
    let snap = replay(&sort_trades(&trades, 2025, now()), 1_000.0, &ReplaySection::default());

    let book = &snap.books["AAA"];
    assert_eq!(book.amount, 5.0);
    assert_eq!(book.total_cost, 500.0);
    let pos = snap.position("AAA").unwrap();
    assert_eq!(pos.cost_basis, 100.0);
    assert_eq!(snap.cash, 650.0);
}

#[test]
fn scenario_ninety_nine_percent_sell_resets_book() {
    let trades = vec![
        Trade::buy("2025-02-01", "AAA", 10.0, 100.0),
        Trade::sell("2025-02-02", "AAA", 9.9, 90.0),
    ];
    let snap = replay(&sort_trades(&trades, 2025, now()), 1_000.0, &ReplaySection::default());

    let book = &snap.books["AAA"];
    assert_eq!(book.amount, 0.0);
    assert_eq!(book.total_cost, 0.0);
    assert!(snap.position("AAA").is_none());
}

#[test]
fn scenario_threshold_is_configurable() {
    let rules = ReplaySection {
        full_exit_threshold: 1.0,
        ..ReplaySection::default()
    };
    let trades = vec![
        Trade::buy("2025-02-01", "AAA", 10.0, 100.0),
        Trade::sell("2025-02-02", "AAA", 9.9, 90.0),
    ];
    let snap = replay(&sort_trades(&trades, 2025, now()), 1_000.0, &rules);

    let pos = snap.position("AAA").unwrap();
    assert!((pos.amount - 0.1).abs() < 1e-9);
    assert!((pos.cost_basis - 100.0).abs() < 1e-6);
}

#[test]
fn scenario_dust_residue_is_hidden() {
    let rules = ReplaySection {
        full_exit_threshold: 1.0,
        ..ReplaySection::default()
    };
    let trades = vec![
        Trade::buy("2025-02-01", "AAA", 1.0, 100.0),
        Trade::sell("2025-02-02", "AAA", 0.99995, 100.0),
    ];
    let snap = replay(&sort_trades(&trades, 2025, now()), 100.0, &rules);
    assert!(snap.books["AAA"].amount > 0.0);
    assert!(snap.position("AAA").is_none());
}

#[test]
fn scenario_buy_then_sell_same_qty_price_restores_cash() {
    let trades = vec![
        Trade::buy("Jun 1", "ETH", "1.25", "$2,400.50"),
        Trade::sell("Jun 2", "ETH", "1.25", "$2,400.50"),
    ];
    let snap = replay(&sort_trades(&trades, 2025, now()), 10_000.0, &ReplaySection::default());
    assert_eq!(snap.cash, 10_000.0);
    assert_eq!(snap.cash_plus_cost(), 10_000.0);
}
