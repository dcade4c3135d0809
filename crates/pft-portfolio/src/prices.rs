//! Price lookups.
//!
//! Live prices arrive as a sparse `symbol -> unit price` map. Missing
//! entries never fail a lookup: cash equivalents are worth 1.0, unknown
//! symbols are worth 0 (valuation) or the configured fallback (history).

use std::collections::BTreeMap;

use crate::config::{EngineConfig, ReplaySection};

/// `normalized date key (YYYY-MM-DD) -> unit price` for the reference asset.
pub type PriceHistory = BTreeMap<String, f64>;

/// Anything that can price one unit of an asset.
pub trait PriceLookup {
    fn unit_price(&self, asset: &str) -> f64;
}

impl<F> PriceLookup for F
where
    F: Fn(&str) -> f64,
{
    fn unit_price(&self, asset: &str) -> f64 {
        self(asset)
    }
}

/// Live prices plus configured fallbacks.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct PriceBook {
    live: BTreeMap<String, f64>,
    fallback: BTreeMap<String, f64>,
    replay: ReplaySection,
}

impl PriceBook {
    pub fn new(live: BTreeMap<String, f64>, config: &EngineConfig) -> Self {
        Self {
            live: only_usable(live),
            fallback: only_usable(config.prices.fallback.clone()),
            replay: config.replay.clone(),
        }
    }

    pub fn is_cash_equivalent(&self, asset: &str) -> bool {
        self.replay.is_cash_equivalent(asset)
    }

    /// Live price, if one is known and positive.
    pub fn live(&self, asset: &str) -> Option<f64> {
        self.live.get(asset).copied()
    }

    /// Price for marking a historical point: live, else fallback, else 0.
    pub fn history_price(&self, asset: &str) -> f64 {
        if self.is_cash_equivalent(asset) {
            return 1.0;
        }
        self.live
            .get(asset)
            .or_else(|| self.fallback.get(asset))
            .copied()
            .unwrap_or(0.0)
    }
}

impl PriceLookup for PriceBook {
    /// Cash equivalents are 1.0, known symbols their live price, unknown 0.
    fn unit_price(&self, asset: &str) -> f64 {
        if self.is_cash_equivalent(asset) {
            return 1.0;
        }
        self.live(asset).unwrap_or(0.0)
    }
}

/// Keep only finite, positive prices; anything else counts as absent.
fn only_usable(map: BTreeMap<String, f64>) -> BTreeMap<String, f64> {
    map.into_iter()
        .filter(|(_, v)| v.is_finite() && *v > 0.0)
        .collect()
}
