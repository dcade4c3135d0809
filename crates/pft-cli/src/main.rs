use anyhow::Result;
use clap::{Parser, Subcommand};

mod commands;

use commands::report::ReportArgs;

#[derive(Parser)]
#[command(name = "pft")]
#[command(about = "Portfolio tracker ledger engine CLI", long_about = None)]
struct Cli {
    #[command(subcommand)]
    cmd: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Replay exported sheet tabs and print the portfolio report as JSON
    Report(ReportArgs),

    /// Compute layered config hash + print canonical JSON
    ConfigHash {
        /// Paths in merge order (base -> overrides)
        #[arg(required = true)]
        paths: Vec<String>,
    },

    /// Validate layered config and list keys the engine does not read
    CheckConfig {
        /// Paths in merge order (base -> overrides)
        #[arg(required = true)]
        paths: Vec<String>,

        /// Fail (non-zero exit) when unused keys are present
        #[arg(long, default_value_t = false)]
        strict: bool,
    },
}

fn main() -> Result<()> {
    // Load .env.local if present (dev convenience, e.g. RUST_LOG).
    // Silent if the file does not exist.
    let _ = dotenvy::from_filename(".env.local");

    init_tracing();

    let cli = Cli::parse();

    match cli.cmd {
        Commands::Report(args) => commands::report::run(args)?,

        Commands::ConfigHash { paths } => {
            let loaded = commands::load_config(&paths)?;
            println!("config_hash={}", loaded.config_hash);
            println!("{}", loaded.canonical_json);
        }

        Commands::CheckConfig { paths, strict } => commands::check_config(&paths, strict)?,
    }

    Ok(())
}

/// Logs go to stderr so stdout stays machine-readable.
fn init_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()),
        )
        .with_writer(std::io::stderr)
        .init();
}
