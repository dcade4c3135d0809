use anyhow::{bail, Context, Result};
use pft_portfolio::EngineConfig;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use sha2::{Digest, Sha256};
use std::collections::BTreeSet;
use std::fs;
use tracing::warn;

/// Config consumption map + unused-key guard.
///
/// Every section of [`EngineConfig`] is `#[serde(default)]`, so a typo such
/// as `replay.dust_treshold` would otherwise be dropped without a trace.
/// Callers decide whether unused keys are warnings or errors by calling
/// `report_unused_keys(&config_json, UnusedKeyPolicy::Warn|Fail)`.
///
/// "Consumed pointers" are JSON Pointer prefixes. If a leaf pointer is under
/// any consumed prefix, that leaf is considered consumed. Any leaf not
/// covered is "unused".
///
/// Examples:
/// - consumed prefix "/prices/fallback" consumes "/prices/fallback/SOL"
/// - consumed prefix "/replay/cash_equivalents" consumes "/replay/cash_equivalents/0"
pub fn consumed_pointers() -> &'static [&'static str] {
    // Must mirror the fields of pft_portfolio::config. Adding a field there
    // without listing it here makes it show up as unused.
    &[
        "/portfolio/starting_capital",
        "/portfolio/client_name",
        "/portfolio/start_date",
        "/dates/reference_year",
        "/replay/full_exit_threshold",
        "/replay/dust_threshold",
        "/replay/cash_threshold",
        "/replay/cash_asset",
        "/replay/cash_equivalents",
        "/benchmark/reference_asset",
        "/benchmark/default_start_key",
        "/benchmark/start_price_fallback",
        "/prices/fallback",
        "/report/recent_trades",
    ]
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnusedKeyPolicy {
    Warn,
    Fail,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UnusedKeyReport {
    /// Consumed JSON-pointer prefixes used for this analysis (sorted, unique)
    pub consumed_prefixes: Vec<String>,
    /// Minimal set of unused leaf pointers (sorted)
    pub unused_leaf_pointers: Vec<String>,
}

impl UnusedKeyReport {
    pub fn is_clean(&self) -> bool {
        self.unused_leaf_pointers.is_empty()
    }
}

/// Compare `config_json` against [`consumed_pointers`].
///
/// `Fail` turns any unused leaf into an error; `Warn` logs and returns the
/// report either way.
pub fn report_unused_keys(config_json: &Value, policy: UnusedKeyPolicy) -> Result<UnusedKeyReport> {
    let mut consumed_prefixes: Vec<String> =
        consumed_pointers().iter().map(|p| p.to_string()).collect();
    consumed_prefixes.sort();

    let unused: BTreeSet<String> = leaf_pointers(config_json)
        .into_iter()
        .filter(|leaf| !consumed_prefixes.iter().any(|c| covers(c, leaf)))
        .collect();

    let report = UnusedKeyReport {
        consumed_prefixes,
        unused_leaf_pointers: unused.into_iter().collect(),
    };

    if !report.is_clean() {
        let first = first_few(&report.unused_leaf_pointers);
        match policy {
            UnusedKeyPolicy::Fail => bail!(
                "CONFIG_UNUSED_KEYS: {} config key(s) are not read by the engine \
                (typo or stale key?): {first}",
                report.unused_leaf_pointers.len(),
            ),
            UnusedKeyPolicy::Warn => warn!(
                count = report.unused_leaf_pointers.len(),
                keys = %first,
                "config keys not read by the engine"
            ),
        }
    }

    Ok(report)
}

/// `prefix` covers `leaf` when they are equal or `leaf` continues below it
/// (`/a/b` covers `/a/b/0`, never `/a/bc`).
fn covers(prefix: &str, leaf: &str) -> bool {
    match leaf.strip_prefix(prefix) {
        Some(rest) => rest.is_empty() || rest.starts_with('/'),
        None => false,
    }
}

/// Every scalar leaf of `v` as an RFC 6901 pointer. Empty objects and arrays
/// contribute nothing.
fn leaf_pointers(v: &Value) -> Vec<String> {
    fn walk(v: &Value, at: &mut String, out: &mut Vec<String>) {
        let children: Vec<(String, &Value)> = match v {
            Value::Object(map) => map
                .iter()
                .map(|(k, child)| (k.replace('~', "~0").replace('/', "~1"), child))
                .collect(),
            Value::Array(items) => items.iter().enumerate().map(|(i, c)| (i.to_string(), c)).collect(),
            _ => {
                out.push(if at.is_empty() { "/".to_string() } else { at.clone() });
                return;
            }
        };
        for (token, child) in children {
            let len = at.len();
            at.push('/');
            at.push_str(&token);
            walk(child, at, out);
            at.truncate(len);
        }
    }

    let mut out = Vec::new();
    walk(v, &mut String::new(), &mut out);
    out
}

fn first_few(keys: &[String]) -> String {
    const SHOWN: usize = 12;
    let mut s = keys.iter().take(SHOWN).cloned().collect::<Vec<_>>().join(", ");
    if keys.len() > SHOWN {
        s.push_str(", ...");
    }
    s
}

#[derive(Debug, Clone)]
pub struct LoadedConfig {
    pub config_hash: String,
    pub canonical_json: String,
    pub config_json: Value,
    /// Typed view of `config_json`, already validated.
    pub engine: EngineConfig,
}

pub fn load_layered_yaml(paths: &[&str]) -> Result<LoadedConfig> {
    let mut docs: Vec<String> = Vec::new();
    for p in paths {
        let raw =
            fs::read_to_string(p).with_context(|| format!("failed to read yaml path: {p}"))?;
        docs.push(raw);
    }

    let doc_refs: Vec<&str> = docs.iter().map(|s| s.as_str()).collect();
    load_layered_yaml_from_strings(&doc_refs)
}

pub fn load_layered_yaml_from_strings(yaml_docs: &[&str]) -> Result<LoadedConfig> {
    // Merge YAML docs in order: earlier docs are base, later docs override.
    let mut merged = serde_json::json!({});
    for raw in yaml_docs {
        let v_yaml: serde_yaml::Value = serde_yaml::from_str(raw).context("invalid yaml")?;
        let v_json = serde_json::to_value(v_yaml).context("yaml->json conversion failed")?;
        // An empty document is an empty layer, not a null override.
        if v_json.is_null() {
            continue;
        }
        merge_into(&mut merged, v_json);
    }

    let engine: EngineConfig =
        serde_json::from_value(merged.clone()).context("config does not match engine schema")?;
    engine.validate().context("CONFIG_INVALID")?;

    let canonical_json = canonicalize_json(&merged)?;
    let config_hash = sha256_hex(canonical_json.as_bytes());
    Ok(LoadedConfig {
        config_hash,
        canonical_json,
        config_json: merged,
        engine,
    })
}

/// Overlay `layer` onto `base`: objects merge key by key, anything else
/// replaces.
fn merge_into(base: &mut Value, layer: Value) {
    match (base, layer) {
        (Value::Object(base_map), Value::Object(layer_map)) => {
            for (k, v) in layer_map {
                merge_into(base_map.entry(k).or_insert(Value::Null), v);
            }
        }
        (slot, v) => *slot = v,
    }
}

fn canonicalize_json(v: &Value) -> Result<String> {
    // serde_json::Map is BTreeMap-backed (no preserve_order), so object keys
    // serialize sorted regardless of source order.
    let s = serde_json::to_string(v).context("canonical json serialize failed")?;
    Ok(s)
}

fn sha256_hex(bytes: &[u8]) -> String {
    hex::encode(Sha256::digest(bytes))
}
