//! `pft report`: ingest exported sheet tabs, replay, print JSON.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;
use pft_md::DEFAULT_COIN_IDS;
use pft_portfolio::{build_report, PortfolioInputs};
use tracing::info;

#[derive(Args, Debug)]
pub struct ReportArgs {
    /// Trades tab export (date, action, asset, amount, price)
    #[arg(long)]
    pub trades: Option<PathBuf>,

    /// Layered YAML config, repeat in merge order (base -> overrides)
    #[arg(long = "config")]
    pub config: Vec<String>,

    /// Config tab export (key, value); overrides YAML for the keys it names
    #[arg(long)]
    pub config_sheet: Option<PathBuf>,

    /// Live prices as CSV (asset, price)
    #[arg(long)]
    pub prices: Option<PathBuf>,

    /// Saved CoinGecko simple/price response; merged over --prices
    #[arg(long)]
    pub quotes: Option<PathBuf>,

    /// Reference asset daily closes (date, price)
    #[arg(long)]
    pub reference_history: Option<PathBuf>,

    /// Price targets tab export (asset, target)
    #[arg(long)]
    pub targets: Option<PathBuf>,

    /// History tab export (date, value); used when there are no trades
    #[arg(long)]
    pub history: Option<PathBuf>,

    /// Override "now" (e.g. 2025-08-01 or 2025-08-01T09:00:00Z)
    #[arg(long)]
    pub now: Option<String>,

    /// Pretty-print the JSON report
    #[arg(long, default_value_t = false)]
    pub pretty: bool,

    /// Fail when the YAML config carries keys the engine does not read
    #[arg(long, default_value_t = false)]
    pub strict_config: bool,
}

pub fn run(args: ReportArgs) -> Result<()> {
    let loaded = super::load_config(&args.config)?;
    if !args.config.is_empty() {
        let policy = if args.strict_config {
            pft_config::UnusedKeyPolicy::Fail
        } else {
            pft_config::UnusedKeyPolicy::Warn
        };
        pft_config::report_unused_keys(&loaded.config_json, policy)?;
    }

    let mut config = loaded.engine;
    if let Some(path) = &args.config_sheet {
        let sheet = pft_md::parse_config_sheet_file(path)
            .with_context(|| format!("config sheet '{}'", path.display()))?;
        sheet.apply_to(&mut config);
        config.validate().context("CONFIG_INVALID")?;
    }

    let now = super::resolve_now(args.now.as_deref(), config.dates.reference_year)?;
    let inputs = read_inputs(&args, config.dates.reference_year)?;

    info!(
        config_hash = %loaded.config_hash,
        trades = inputs.trades.len(),
        live_prices = inputs.live_prices.len(),
        "building report"
    );

    let report = build_report(&inputs, &config, now);

    let out = if args.pretty {
        serde_json::to_string_pretty(&report)?
    } else {
        serde_json::to_string(&report)?
    };
    println!("{out}");
    Ok(())
}

fn read_inputs(args: &ReportArgs, reference_year: i32) -> Result<PortfolioInputs> {
    let mut inputs = PortfolioInputs::default();

    if let Some(path) = &args.trades {
        inputs.trades = pft_md::parse_trades_file(path)
            .with_context(|| format!("trades '{}'", path.display()))?;
    }
    if let Some(path) = &args.prices {
        inputs.live_prices = pft_md::parse_prices_file(path)
            .with_context(|| format!("prices '{}'", path.display()))?;
    }
    if let Some(path) = &args.quotes {
        let quotes = pft_md::parse_simple_price_file(path, DEFAULT_COIN_IDS)
            .with_context(|| format!("quotes '{}'", path.display()))?;
        inputs.live_prices.extend(quotes);
    }
    if let Some(path) = &args.reference_history {
        inputs.reference_history = pft_md::parse_price_history_file(path, reference_year)
            .with_context(|| format!("reference history '{}'", path.display()))?;
    }
    if let Some(path) = &args.targets {
        inputs.targets = pft_md::parse_targets_file(path)
            .with_context(|| format!("targets '{}'", path.display()))?;
    }
    if let Some(path) = &args.history {
        inputs.fallback_history = pft_md::parse_history_file(path)
            .with_context(|| format!("history '{}'", path.display()))?;
    }

    Ok(inputs)
}
