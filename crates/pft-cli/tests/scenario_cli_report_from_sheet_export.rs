use std::fs;

use assert_cmd::prelude::*;
use predicates::prelude::*;

fn close(a: f64, b: f64) -> bool {
    (a - b).abs() < 1e-6
}

/// `pft report` replays exported tabs and prints one JSON document on stdout.
#[test]
fn cli_report_prints_json_for_sheet_export() -> anyhow::Result<()> {
    let dir = tempfile::tempdir()?;
    let p = |name: &str| dir.path().join(name);

    fs::write(
        p("trades.csv"),
        "date,action,asset,amount,price\n\
         Jul 1,SELL,BTC,0.05,\"$120,000\"\n\
         Jun 20,BUY,BTC,0.1,\"$100,000\"\n",
    )?;
    fs::write(p("config.csv"), "key,value\ntotal_invested,\"$10,000\"\nclient_name,Acme\n")?;
    fs::write(p("prices.csv"), "asset,price\nBTC,110000\n")?;
    fs::write(
        p("btc_history.csv"),
        "date,price\n2025-06-20,100000\n2025-07-01,120000\n",
    )?;

    let output = std::process::Command::cargo_bin("pft")?
        .args(["report", "--trades"])
        .arg(p("trades.csv"))
        .arg("--config-sheet")
        .arg(p("config.csv"))
        .arg("--prices")
        .arg(p("prices.csv"))
        .arg("--reference-history")
        .arg(p("btc_history.csv"))
        .args(["--now", "2025-08-01"])
        .env("RUST_LOG", "off")
        .output()?;
    assert!(output.status.success(), "stderr: {}", String::from_utf8_lossy(&output.stderr));

    let report: serde_json::Value = serde_json::from_slice(&output.stdout)?;
    assert_eq!(report["client_name"], "Acme");
    assert_eq!(report["history_source"], "trades");
    assert!(close(report["cash"].as_f64().unwrap(), 6_000.0));
    assert!(close(report["valuation"]["total_value"].as_f64().unwrap(), 11_500.0));
    assert_eq!(report["round_trips"].as_array().unwrap().len(), 1);
    assert_eq!(report["history"].as_array().unwrap().len(), 2);
    assert!(close(
        report["benchmark"]["beating_benchmark_by"].as_f64().unwrap(),
        500.0
    ));
    Ok(())
}

#[test]
fn cli_report_without_inputs_is_an_empty_portfolio() -> anyhow::Result<()> {
    let mut cmd = std::process::Command::cargo_bin("pft")?;
    cmd.args(["report", "--now", "2025-08-01"]).env("RUST_LOG", "off");

    cmd.assert()
        .success()
        .stdout(predicate::str::contains("\"client_name\":\"Portfolio\""))
        .stdout(predicate::str::contains("\"history_source\":\"empty\""));
    Ok(())
}

#[test]
fn cli_report_rejects_trade_without_action() -> anyhow::Result<()> {
    let dir = tempfile::tempdir()?;
    let trades = dir.path().join("trades.csv");
    fs::write(&trades, "date,action,asset,amount,price\nJun 20,,BTC,0.1,100000\n")?;

    let mut cmd = std::process::Command::cargo_bin("pft")?;
    cmd.args(["report", "--trades"]).arg(&trades);

    cmd.assert()
        .failure()
        .stderr(predicate::str::contains("trades row"));
    Ok(())
}

#[test]
fn cli_report_rejects_bad_now() -> anyhow::Result<()> {
    let mut cmd = std::process::Command::cargo_bin("pft")?;
    cmd.args(["report", "--now", "someday"]);

    cmd.assert()
        .failure()
        .stderr(predicate::str::contains("invalid --now"));
    Ok(())
}
