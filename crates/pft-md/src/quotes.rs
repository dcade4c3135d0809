//! Live quote payloads.
//!
//! The dashboard's live prices come from CoinGecko's `simple/price`
//! endpoint. Fetching is the caller's job; this module only turns a saved
//! response body into the `symbol -> price` map the engine consumes.
//!
//! ```json
//! {"bitcoin":{"usd":110000},"ethereum":{"usd":3900.5},"solana":{"usd":null}}
//! ```

use std::collections::BTreeMap;
use std::path::Path;

use serde::Deserialize;
use tracing::debug;

use crate::IngestError;

/// CoinGecko id → ticker for the assets the tracker follows.
pub const DEFAULT_COIN_IDS: &[(&str, &str)] = &[
    ("bitcoin", "BTC"),
    ("ethereum", "ETH"),
    ("solana", "SOL"),
];

#[derive(Debug, Deserialize)]
struct CoinQuote {
    usd: Option<f64>,
}

/// Parse a `simple/price?vs_currencies=usd` body.
///
/// Only ids listed in `ids` are kept. Missing, null, zero or non-finite
/// quotes are dropped so the valuator falls back instead of pricing at 0.
pub fn parse_simple_price(body: &str, ids: &[(&str, &str)]) -> Result<BTreeMap<String, f64>, IngestError> {
    let raw: BTreeMap<String, CoinQuote> = serde_json::from_str(body)?;
    let mut out = BTreeMap::new();
    for (id, symbol) in ids {
        match raw.get(*id).and_then(|q| q.usd) {
            Some(p) if p.is_finite() && p > 0.0 => {
                out.insert((*symbol).to_string(), p);
            }
            _ => debug!(id, "no usable quote"),
        }
    }
    Ok(out)
}

pub fn parse_simple_price_file(path: &Path, ids: &[(&str, &str)]) -> Result<BTreeMap<String, f64>, IngestError> {
    let body = std::fs::read_to_string(path).map_err(|source| IngestError::Io {
        path: path.display().to_string(),
        source,
    })?;
    parse_simple_price(&body, ids)
}
