//! Engine configuration.
//!
//! Every scalar the replay depends on (reference year, full-exit threshold,
//! dust threshold, benchmark fallbacks) lives here instead of being baked
//! into the algorithms. All fields default, so an empty YAML document yields
//! a usable engine.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    pub portfolio: PortfolioSection,
    pub dates: DatesSection,
    pub replay: ReplaySection,
    pub benchmark: BenchmarkSection,
    pub prices: PricesSection,
    pub report: ReportSection,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PortfolioSection {
    /// Starting cash balance (total invested capital).
    pub starting_capital: f64,
    pub client_name: String,
    /// Raw start date; used for the benchmark when there are no trades.
    pub start_date: String,
}

impl Default for PortfolioSection {
    fn default() -> Self {
        Self {
            starting_capital: 0.0,
            client_name: "Portfolio".to_string(),
            start_date: String::new(),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DatesSection {
    /// Year used for `"Mon D"` dates that carry no year.
    pub reference_year: i32,
}

impl Default for DatesSection {
    fn default() -> Self {
        Self {
            reference_year: 2025,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReplaySection {
    /// A SELL of at least this fraction of the held amount resets the asset.
    pub full_exit_threshold: f64,
    /// Amounts at or below this are not emitted as positions.
    pub dust_threshold: f64,
    /// Residual cash above this is emitted as a synthetic cash position.
    pub cash_threshold: f64,
    pub cash_asset: String,
    /// Symbols valued at 1.0 per unit.
    pub cash_equivalents: Vec<String>,
}

impl Default for ReplaySection {
    fn default() -> Self {
        Self {
            full_exit_threshold: 0.99,
            dust_threshold: 0.0001,
            cash_threshold: 1.0,
            cash_asset: "USDC".to_string(),
            cash_equivalents: vec!["USDC".to_string(), "USD".to_string()],
        }
    }
}

impl ReplaySection {
    pub fn is_cash_equivalent(&self, asset: &str) -> bool {
        asset == self.cash_asset || self.cash_equivalents.iter().any(|c| c == asset)
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BenchmarkSection {
    pub reference_asset: String,
    /// Date key tried when the exact start date has no historical price.
    pub default_start_key: String,
    /// Last-resort start price.
    pub start_price_fallback: f64,
}

impl Default for BenchmarkSection {
    fn default() -> Self {
        Self {
            reference_asset: "BTC".to_string(),
            default_start_key: "2025-06-20".to_string(),
            start_price_fallback: 100_000.0,
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PricesSection {
    /// Unit prices used when no live price is known for an asset.
    pub fallback: BTreeMap<String, f64>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReportSection {
    /// How many trades (sheet order) the report echoes back.
    pub recent_trades: usize,
}

impl Default for ReportSection {
    fn default() -> Self {
        Self { recent_trades: 6 }
    }
}

impl EngineConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        let t = self.replay.full_exit_threshold;
        if !(t.is_finite() && t > 0.0 && t <= 1.0) {
            return Err(ConfigError::FullExitThreshold(t));
        }
        let d = self.replay.dust_threshold;
        if !(d.is_finite() && d >= 0.0) {
            return Err(ConfigError::DustThreshold(d));
        }
        let c = self.portfolio.starting_capital;
        if !(c.is_finite() && c >= 0.0) {
            return Err(ConfigError::StartingCapital(c));
        }
        if self.replay.cash_asset.trim().is_empty() {
            return Err(ConfigError::EmptyCashAsset);
        }
        if self.benchmark.reference_asset.trim().is_empty() {
            return Err(ConfigError::EmptyReferenceAsset);
        }
        Ok(())
    }

    /// Shorthand used by tests and the CLI.
    pub fn with_starting_capital(mut self, capital: f64) -> Self {
        self.portfolio.starting_capital = capital;
        self
    }
}
