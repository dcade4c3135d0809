use std::fs;
use std::path::PathBuf;

use assert_cmd::prelude::*;
use predicates::prelude::*;

fn base_yaml() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("..")
        .join("..")
        .join("config/defaults/base.yaml")
}

#[test]
fn cli_config_hash_matches_library_hash() -> anyhow::Result<()> {
    let base = base_yaml();
    let base_s = base.to_string_lossy().to_string();
    let loaded = pft_config::load_layered_yaml(&[base_s.as_str()])?;

    let mut cmd = std::process::Command::cargo_bin("pft")?;
    cmd.args(["config-hash", base_s.as_str()]).env("RUST_LOG", "off");

    cmd.assert()
        .success()
        .stdout(predicate::str::contains(format!(
            "config_hash={}",
            loaded.config_hash
        )))
        .stdout(predicate::str::contains("\"reference_asset\":\"BTC\""));
    Ok(())
}

#[test]
fn cli_check_config_strict_fails_on_unknown_keys() -> anyhow::Result<()> {
    let dir = tempfile::tempdir()?;
    let overlay = dir.path().join("overlay.yaml");
    fs::write(&overlay, "portfolio:\n  starting_capital: 5000\n  nickname: moon\n")?;
    let base = base_yaml();

    // Warn mode lists the key and succeeds.
    let mut warn = std::process::Command::cargo_bin("pft")?;
    warn.arg("check-config").arg(&base).arg(&overlay).env("RUST_LOG", "off");
    warn.assert()
        .success()
        .stdout(predicate::str::contains("unused=/portfolio/nickname"));

    // Strict mode refuses.
    let mut strict = std::process::Command::cargo_bin("pft")?;
    strict.arg("check-config").arg(&base).arg(&overlay).arg("--strict");
    strict
        .assert()
        .failure()
        .stderr(predicate::str::contains("CONFIG_UNUSED_KEYS"));
    Ok(())
}

#[test]
fn cli_check_config_rejects_invalid_threshold() -> anyhow::Result<()> {
    let dir = tempfile::tempdir()?;
    let bad = dir.path().join("bad.yaml");
    fs::write(&bad, "replay:\n  full_exit_threshold: 1.5\n")?;

    let mut cmd = std::process::Command::cargo_bin("pft")?;
    cmd.arg("check-config").arg(&bad);
    cmd.assert()
        .failure()
        .stderr(predicate::str::contains("CONFIG_INVALID"));
    Ok(())
}
