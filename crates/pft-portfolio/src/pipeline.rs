//! Full report pipeline.
//!
//! ```text
//! trades ──► ordering ──┬─► ledger ──► positions ──► valuation
//!                       ├─► history ──► benchmark
//!                       └─► lots ──► analytics
//! ```
//!
//! One call, one fresh replay. Nothing is cached between calls; the only
//! time input is the `now` the caller passes in.

use std::collections::BTreeMap;

use chrono::NaiveDateTime;
use serde::Serialize;
use tracing::{debug, info};

use crate::analytics::{summarize, TradeAnalyticsSummary};
use crate::benchmark::{self, BenchmarkOutcome};
use crate::config::EngineConfig;
use crate::dates::{normalize, try_parse, NormalizedDate};
use crate::history::synthesize;
use crate::ledger::replay;
use crate::lots::{match_round_trips, UnmatchedSell};
use crate::ordering::sort_trades;
use crate::prices::{PriceBook, PriceHistory};
use crate::types::{CompletedRoundTrip, HistoryPoint, Position, SeriesPoint, Trade};
use crate::valuation::{target_progress, value_positions, PriceTarget, TargetProgress, Valuation};

/// Everything the I/O layer supplies for one run.
#[derive(Clone, Debug, Default)]
pub struct PortfolioInputs {
    pub trades: Vec<Trade>,
    pub live_prices: BTreeMap<String, f64>,
    pub reference_history: PriceHistory,
    pub targets: Vec<PriceTarget>,
    /// Used as the portfolio series when there are no trades.
    pub fallback_history: Vec<SeriesPoint>,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum HistorySource {
    Trades,
    External,
    Empty,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct PortfolioReport {
    pub client_name: String,
    pub start_date: Option<NormalizedDate>,
    pub generated_at: NaiveDateTime,
    pub positions: Vec<Position>,
    pub cash: f64,
    pub valuation: Valuation,
    pub history: Vec<HistoryPoint>,
    pub history_source: HistorySource,
    pub benchmark: BenchmarkOutcome,
    pub analytics: Option<TradeAnalyticsSummary>,
    pub round_trips: Vec<CompletedRoundTrip>,
    pub unmatched_sells: Vec<UnmatchedSell>,
    /// First `report.recent_trades` trades in the order supplied.
    pub recent_trades: Vec<Trade>,
    pub targets: Vec<TargetProgress>,
}

/// Run every component over `inputs`.
pub fn build_report(inputs: &PortfolioInputs, config: &EngineConfig, now: NaiveDateTime) -> PortfolioReport {
    let year = config.dates.reference_year;
    let capital = config.portfolio.starting_capital;

    let sorted = sort_trades(&inputs.trades, year, now);
    let prices = PriceBook::new(inputs.live_prices.clone(), config);

    let ledger = replay(&sorted, capital, &config.replay);
    let valuation = value_positions(&ledger.positions, &prices, capital);

    let (mut history, history_source) = if !sorted.is_empty() {
        (synthesize(&sorted, config, &prices), HistorySource::Trades)
    } else if !inputs.fallback_history.is_empty() {
        (external_history(&inputs.fallback_history, year, now), HistorySource::External)
    } else {
        (Vec::new(), HistorySource::Empty)
    };

    let start_date = sorted
        .first()
        .map(|t| t.date)
        .or_else(|| try_parse(&config.portfolio.start_date, year));

    let reference = &config.benchmark.reference_asset;
    let benchmark = benchmark::apply(
        &mut history,
        capital,
        start_date,
        &inputs.reference_history,
        prices.live(reference),
        valuation.total_value,
        &config.benchmark,
    );

    let lots = match_round_trips(&sorted);
    let analytics = summarize(inputs.trades.len(), &lots.round_trips);

    let recent_trades = inputs
        .trades
        .iter()
        .take(config.report.recent_trades)
        .cloned()
        .collect();

    let targets = target_progress(&inputs.targets, &prices);

    debug!(
        round_trips = lots.round_trips.len(),
        unmatched = lots.unmatched_sells.len(),
        "lots matched"
    );
    info!(
        trades = inputs.trades.len(),
        positions = ledger.positions.len(),
        history_points = history.len(),
        total_value = valuation.total_value,
        beating_benchmark_by = benchmark.beating_benchmark_by,
        "portfolio report built"
    );

    PortfolioReport {
        client_name: config.portfolio.client_name.clone(),
        start_date,
        generated_at: now,
        positions: ledger.positions,
        cash: ledger.cash,
        valuation,
        history,
        history_source,
        benchmark,
        analytics,
        round_trips: lots.round_trips,
        unmatched_sells: lots.unmatched_sells,
        recent_trades,
        targets,
    }
}

/// Externally supplied series, kept in the order given.
fn external_history(series: &[SeriesPoint], year: i32, now: NaiveDateTime) -> Vec<HistoryPoint> {
    series
        .iter()
        .map(|p| HistoryPoint {
            date: p.date.clone(),
            timestamp: normalize(&p.date, year, now),
            value: p.value,
            benchmark_value: None,
        })
        .collect()
}
