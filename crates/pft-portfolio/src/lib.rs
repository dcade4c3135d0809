//! pft-portfolio
//!
//! Ledger replay and analytics core.
//! - Trades are the source of truth; every call replays them from scratch
//! - Canonical ordering by normalized date (stable on ties)
//! - Average-cost positions with a configurable full-exit reset
//! - FIFO lot matching for realized round trips
//! - Value series plus a buy-and-hold benchmark
//! - Pure deterministic logic (no IO, no clock reads; `now` is injected)

mod accounting;
mod error;
mod numeric;
mod types;

pub mod analytics;
pub mod benchmark;
pub mod config;
pub mod dates;
pub mod history;
pub mod ledger;
pub mod lots;
pub mod ordering;
pub mod pipeline;
pub mod prices;
pub mod valuation;

pub use accounting::{AssetBook, Holdings};
pub use analytics::{summarize, TradeAnalyticsSummary};
pub use benchmark::{BenchmarkOutcome, StartPriceSource};
pub use config::EngineConfig;
pub use dates::{days_between, normalize, NormalizedDate};
pub use error::{ConfigError, TradeShapeError};
pub use history::synthesize;
pub use ledger::{replay, Ledger, LedgerSnapshot};
pub use lots::{match_round_trips, LotMatching, UnmatchedSell};
pub use numeric::parse_number;
pub use ordering::sort_trades;
pub use pipeline::{build_report, HistorySource, PortfolioInputs, PortfolioReport};
pub use prices::{PriceBook, PriceHistory, PriceLookup};
pub use types::{
    CompletedRoundTrip, DatedTrade, HistoryPoint, Lot, Position, RawNumber, RawTrade,
    SeriesPoint, Side, Trade,
};
pub use valuation::{
    target_progress, value_positions, AllocationSlice, PriceTarget, TargetProgress, Valuation,
    ValuedPosition,
};

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_send_sync<T: Send + Sync>() {}

    #[test]
    fn public_results_are_send_sync() {
        assert_send_sync::<PortfolioReport>();
        assert_send_sync::<LedgerSnapshot>();
        assert_send_sync::<LotMatching>();
        assert_send_sync::<PriceBook>();
        assert_send_sync::<EngineConfig>();
    }
}
