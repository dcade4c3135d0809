//! pft-md
//!
//! Boundary ingestion for the portfolio engine.
//!
//! This crate turns exported sheet tabs (CSV) and saved quote payloads
//! (JSON) into the types `pft-portfolio` consumes. It does no network I/O
//! and no replay; callers (CLI) read files and hand the results to
//! `pft_portfolio::build_report`.

pub mod ingest_csv;
pub mod quotes;

use thiserror::Error;

pub use ingest_csv::{
    parse_config_sheet_file, parse_config_sheet_str, parse_history_file, parse_history_str,
    parse_price_history_file, parse_price_history_str, parse_prices_file, parse_prices_str,
    parse_targets_file, parse_targets_str, parse_trades_file, parse_trades_str, ConfigSheet,
};
pub use quotes::{parse_simple_price, parse_simple_price_file, DEFAULT_COIN_IDS};

/// Errors produced while ingesting external data.
#[derive(Debug, Error)]
pub enum IngestError {
    #[error("read '{path}': {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("csv: {0}")]
    Csv(#[from] csv::Error),
    #[error("json: {0}")]
    Json(#[from] serde_json::Error),
    /// The header row is missing a required column.
    #[error("csv missing required header column: '{0}'")]
    MissingHeader(String),
    /// A trade row violates the structural contract.
    #[error("trades row {row}: {source}")]
    TradeShape {
        row: usize,
        #[source]
        source: pft_portfolio::TradeShapeError,
    },
}
