//! Buy-and-hold benchmark.
//!
//! Answers one question: had the whole starting capital bought the
//! reference asset on day one and never traded, what would it be worth on
//! each portfolio history date, and how far ahead is the portfolio now?
//!
//! The benchmark uses the same starting capital and the same date axis as
//! the portfolio series; [`apply`] only fills in `benchmark_value` on the
//! points it is given.

use serde::Serialize;
use tracing::debug;

use crate::config::BenchmarkSection;
use crate::dates::NormalizedDate;
use crate::numeric::ratio_or_zero;
use crate::prices::PriceHistory;
use crate::types::HistoryPoint;

/// Where the start price came from.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum StartPriceSource {
    ExactDate,
    DefaultKey,
    Constant,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct BenchmarkOutcome {
    pub reference_asset: String,
    pub start_price: f64,
    pub start_price_source: StartPriceSource,
    pub units_bought: f64,
    /// Live reference price used for the current-moment delta.
    pub live_price: f64,
    /// Value of the benchmark holding right now.
    pub current_value: f64,
    /// `current_portfolio_value - units_bought * live_price`.
    pub beating_benchmark_by: f64,
}

fn usable(v: Option<&f64>) -> Option<f64> {
    v.copied().filter(|p| p.is_finite() && *p > 0.0)
}

/// Resolve the start price: exact start date key, else the configured
/// default key, else the configured constant.
pub fn resolve_start_price(
    start: Option<NormalizedDate>,
    history: &PriceHistory,
    cfg: &BenchmarkSection,
) -> (f64, StartPriceSource) {
    if let Some(p) = start.and_then(|d| usable(history.get(&d.date_key()))) {
        return (p, StartPriceSource::ExactDate);
    }
    if let Some(p) = usable(history.get(&cfg.default_start_key)) {
        return (p, StartPriceSource::DefaultKey);
    }
    (cfg.start_price_fallback, StartPriceSource::Constant)
}

/// Price of the reference asset on `date`: historical, else live, else start.
pub fn price_on(date: NormalizedDate, history: &PriceHistory, live: Option<f64>, start_price: f64) -> f64 {
    usable(history.get(&date.date_key()))
        .or(live.filter(|p| p.is_finite() && *p > 0.0))
        .unwrap_or(start_price)
}

/// Fill `benchmark_value` on every point and compute the headline delta.
///
/// `start` is the portfolio's first trade date (or configured start date);
/// `current_portfolio_value` is the valuator's total for "now".
pub fn apply(
    points: &mut [HistoryPoint],
    starting_capital: f64,
    start: Option<NormalizedDate>,
    history: &PriceHistory,
    live_price: Option<f64>,
    current_portfolio_value: f64,
    cfg: &BenchmarkSection,
) -> BenchmarkOutcome {
    let (start_price, source) = resolve_start_price(start, history, cfg);
    let units = if start_price > 0.0 {
        ratio_or_zero(starting_capital, start_price)
    } else {
        0.0
    };

    for p in points.iter_mut() {
        let px = price_on(p.timestamp, history, live_price, start_price);
        p.benchmark_value = Some((units * px).round());
    }

    let live = live_price
        .filter(|p| p.is_finite() && *p > 0.0)
        .unwrap_or(start_price);
    let current_value = units * live;

    debug!(
        start_price,
        ?source,
        units,
        points = points.len(),
        "benchmark applied"
    );

    BenchmarkOutcome {
        reference_asset: cfg.reference_asset.clone(),
        start_price,
        start_price_source: source,
        units_bought: units,
        live_price: live,
        current_value,
        beating_benchmark_by: current_portfolio_value - current_value,
    }
}
