//! CSV ingestion for the sheet tabs (pft-md boundary).
//!
//! Converts CSV text (or files) exported from the tracking spreadsheet into
//! core types. This is the **read** side only: no replay, no valuation.
//!
//! Headers are case-insensitive and order-independent. Quoted fields are
//! honoured, so `"$100,000"` survives as one field. Blank rows are skipped.
//!
//! ## Tabs
//!
//! | Tab       | Required columns        | Output                    |
//! |-----------|-------------------------|---------------------------|
//! | Trades    | `action`, `asset`       | `Vec<Trade>`              |
//! | Prices    | `asset`, `price`        | `BTreeMap<String, f64>`   |
//! | Reference | `date`, `price`         | [`PriceHistory`]          |
//! | Config    | `key`, `value`          | [`ConfigSheet`]           |
//! | Targets   | `asset`, `target`       | `Vec<PriceTarget>`        |
//! | History   | `date`, `value`         | `Vec<SeriesPoint>`        |
//!
//! Trades may also carry `date`, `amount`, `price`; missing ones degrade the
//! same way malformed values do. Only a missing or unknown `action`, or a
//! blank `asset`, fails ingestion.

use std::collections::{BTreeMap, HashMap};
use std::path::Path;

use pft_portfolio::dates::try_parse;
use pft_portfolio::{
    parse_number, EngineConfig, PriceHistory, PriceTarget, RawNumber, RawTrade, SeriesPoint,
    Trade,
};
use tracing::{debug, warn};

use crate::IngestError;

/// A CSV table with a case-insensitive header index.
struct Table {
    cols: HashMap<String, usize>,
    rows: Vec<csv::StringRecord>,
}

impl Table {
    fn parse(src: &str, required: &[&'static str]) -> Result<Self, IngestError> {
        let mut rdr = csv::ReaderBuilder::new()
            .has_headers(true)
            .flexible(true)
            .trim(csv::Trim::All)
            .from_reader(src.as_bytes());

        let headers = rdr.headers()?.clone();
        let cols: HashMap<String, usize> = headers
            .iter()
            .enumerate()
            .map(|(i, h)| (h.to_ascii_lowercase(), i))
            .collect();

        // An empty source has no header row at all: nothing to read.
        if headers.is_empty() || (headers.len() == 1 && headers[0].is_empty()) {
            return Ok(Self {
                cols,
                rows: Vec::new(),
            });
        }

        for req in required {
            if !cols.contains_key(*req) {
                return Err(IngestError::MissingHeader((*req).to_string()));
            }
        }

        let mut rows = Vec::new();
        for rec in rdr.records() {
            let rec = rec?;
            if rec.iter().all(str::is_empty) {
                continue;
            }
            rows.push(rec);
        }
        Ok(Self { cols, rows })
    }

    /// Field `name` of `rec`; `None` when the column is absent or the cell blank.
    fn get<'r>(&self, rec: &'r csv::StringRecord, name: &str) -> Option<&'r str> {
        self.cols
            .get(name)
            .and_then(|&i| rec.get(i))
            .filter(|s| !s.is_empty())
    }
}

/// 1-based data row number (header is row 1).
fn row_number(rec: &csv::StringRecord, fallback: usize) -> usize {
    rec.position()
        .map(|p| p.line() as usize)
        .unwrap_or(fallback + 2)
}

// ---------------------------------------------------------------------------
// Trades
// ---------------------------------------------------------------------------

/// Parse the Trades tab. Rows keep sheet order.
pub fn parse_trades_str(src: &str) -> Result<Vec<Trade>, IngestError> {
    let table = Table::parse(src, &["action", "asset"])?;
    let mut out = Vec::with_capacity(table.rows.len());

    for (i, rec) in table.rows.iter().enumerate() {
        let raw = RawTrade {
            date: table.get(rec, "date").map(str::to_string),
            action: table.get(rec, "action").map(str::to_string),
            asset: table.get(rec, "asset").map(str::to_string),
            amount: table.get(rec, "amount").map(RawNumber::from),
            price: table.get(rec, "price").map(RawNumber::from),
        };
        let trade = Trade::try_from(raw).map_err(|source| IngestError::TradeShape {
            row: row_number(rec, i),
            source,
        })?;
        out.push(trade);
    }

    debug!(rows = out.len(), "trades ingested");
    Ok(out)
}

// ---------------------------------------------------------------------------
// Prices
// ---------------------------------------------------------------------------

/// Parse `asset,price` rows. Later rows override earlier ones; malformed
/// prices are kept as 0 (treated as unknown downstream).
pub fn parse_prices_str(src: &str) -> Result<BTreeMap<String, f64>, IngestError> {
    let table = Table::parse(src, &["asset", "price"])?;
    let mut out = BTreeMap::new();
    for rec in &table.rows {
        let Some(asset) = table.get(rec, "asset") else {
            continue;
        };
        let price = table.get(rec, "price").map(parse_number).unwrap_or(0.0);
        out.insert(asset.to_string(), price);
    }
    Ok(out)
}

/// Parse `date,price` rows for the reference asset, keyed by `YYYY-MM-DD`.
///
/// Rows whose date cannot be parsed are skipped: keying them at "now" would
/// invent a price for a day that was never quoted.
pub fn parse_price_history_str(src: &str, reference_year: i32) -> Result<PriceHistory, IngestError> {
    let table = Table::parse(src, &["date", "price"])?;
    let mut out = PriceHistory::new();
    for (i, rec) in table.rows.iter().enumerate() {
        let raw_date = table.get(rec, "date").unwrap_or_default();
        let Some(date) = try_parse(raw_date, reference_year) else {
            warn!(row = row_number(rec, i), raw_date, "skipping reference price with unparseable date");
            continue;
        };
        let price = table.get(rec, "price").map(parse_number).unwrap_or(0.0);
        out.insert(date.date_key(), price);
    }
    Ok(out)
}

// ---------------------------------------------------------------------------
// Config sheet
// ---------------------------------------------------------------------------

/// Key/value overrides from the Config tab.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ConfigSheet {
    pub entries: BTreeMap<String, String>,
}

impl ConfigSheet {
    pub fn get(&self, key: &str) -> Option<&str> {
        self.entries.get(key).map(String::as_str)
    }

    /// Apply recognised keys on top of `config`.
    ///
    /// `total_invested` (or `starting_capital`), `client_name`, `start_date`.
    /// Unrecognised keys are logged and ignored.
    pub fn apply_to(&self, config: &mut EngineConfig) {
        for (k, v) in &self.entries {
            match k.as_str() {
                "total_invested" | "starting_capital" => {
                    config.portfolio.starting_capital = parse_number(v);
                }
                "client_name" => config.portfolio.client_name = v.clone(),
                "start_date" => config.portfolio.start_date = v.clone(),
                other => debug!(key = other, "config sheet key not used by the engine"),
            }
        }
    }
}

/// Parse the Config tab. Rows with a blank key or value are dropped.
pub fn parse_config_sheet_str(src: &str) -> Result<ConfigSheet, IngestError> {
    let table = Table::parse(src, &["key", "value"])?;
    let mut entries = BTreeMap::new();
    for rec in &table.rows {
        if let (Some(k), Some(v)) = (table.get(rec, "key"), table.get(rec, "value")) {
            entries.insert(k.to_string(), v.to_string());
        }
    }
    Ok(ConfigSheet { entries })
}

// ---------------------------------------------------------------------------
// Targets / History
// ---------------------------------------------------------------------------

/// Parse `asset,target` rows. Malformed targets are 0.
pub fn parse_targets_str(src: &str) -> Result<Vec<PriceTarget>, IngestError> {
    let table = Table::parse(src, &["asset", "target"])?;
    Ok(table
        .rows
        .iter()
        .filter_map(|rec| {
            let asset = table.get(rec, "asset")?;
            Some(PriceTarget {
                asset: asset.to_string(),
                target: table.get(rec, "target").map(parse_number).unwrap_or(0.0),
            })
        })
        .collect())
}

/// Parse `date,value` rows of an externally maintained value series.
pub fn parse_history_str(src: &str) -> Result<Vec<SeriesPoint>, IngestError> {
    let table = Table::parse(src, &["date", "value"])?;
    Ok(table
        .rows
        .iter()
        .map(|rec| SeriesPoint {
            date: table.get(rec, "date").unwrap_or_default().to_string(),
            value: table.get(rec, "value").map(parse_number).unwrap_or(0.0),
        })
        .collect())
}

// ---------------------------------------------------------------------------
// File variants
// ---------------------------------------------------------------------------

fn read(path: &Path) -> Result<String, IngestError> {
    std::fs::read_to_string(path).map_err(|source| IngestError::Io {
        path: path.display().to_string(),
        source,
    })
}

pub fn parse_trades_file(path: &Path) -> Result<Vec<Trade>, IngestError> {
    parse_trades_str(&read(path)?)
}

pub fn parse_prices_file(path: &Path) -> Result<BTreeMap<String, f64>, IngestError> {
    parse_prices_str(&read(path)?)
}

pub fn parse_price_history_file(path: &Path, reference_year: i32) -> Result<PriceHistory, IngestError> {
    parse_price_history_str(&read(path)?, reference_year)
}

pub fn parse_config_sheet_file(path: &Path) -> Result<ConfigSheet, IngestError> {
    parse_config_sheet_str(&read(path)?)
}

pub fn parse_targets_file(path: &Path) -> Result<Vec<PriceTarget>, IngestError> {
    parse_targets_str(&read(path)?)
}

pub fn parse_history_file(path: &Path) -> Result<Vec<SeriesPoint>, IngestError> {
    parse_history_str(&read(path)?)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
