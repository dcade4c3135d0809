//! Command handler modules for pft-cli.
//!
//! Shared utilities used by multiple command paths live here.
//! Command-specific logic lives in the submodules.

pub mod report;

use anyhow::{Context, Result};
use chrono::{NaiveDateTime, Utc};
use pft_config::{LoadedConfig, UnusedKeyPolicy};
use pft_portfolio::dates::try_parse;

// ---------------------------------------------------------------------------
// Shared helpers
// ---------------------------------------------------------------------------

/// Load layered YAML config; no paths means engine defaults.
pub fn load_config(paths: &[String]) -> Result<LoadedConfig> {
    let path_refs: Vec<&str> = paths.iter().map(|s| s.as_str()).collect();
    pft_config::load_layered_yaml(&path_refs).context("load config failed")
}

/// `--now` override, or the current UTC time.
pub fn resolve_now(raw: Option<&str>, reference_year: i32) -> Result<NaiveDateTime> {
    match raw {
        None => Ok(Utc::now().naive_utc()),
        Some(s) => try_parse(s, reference_year)
            .map(|d| d.as_datetime())
            .with_context(|| format!("invalid --now '{s}'. expected e.g. 2025-08-01 or 2025-08-01T09:00:00Z")),
    }
}

/// `check-config`: validate, then report unused keys.
pub fn check_config(paths: &[String], strict: bool) -> Result<()> {
    let loaded = load_config(paths)?;
    let policy = if strict {
        UnusedKeyPolicy::Fail
    } else {
        UnusedKeyPolicy::Warn
    };
    let report = pft_config::report_unused_keys(&loaded.config_json, policy)?;

    println!("config_hash={}", loaded.config_hash);
    println!("config_valid=true");
    println!("unused_keys={}", report.unused_leaf_pointers.len());
    for p in &report.unused_leaf_pointers {
        println!("unused={p}");
    }
    Ok(())
}
