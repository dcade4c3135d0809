use thiserror::Error;

/// Structural contract violations on a raw trade row.
///
/// These are the only hard failures in the engine. Malformed numbers and
/// dates degrade to documented defaults instead; a row with no usable
/// action or asset cannot be replayed at all.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TradeShapeError {
    /// The `action` field is absent or blank.
    #[error("trade shape: missing action")]
    MissingAction,
    /// The `action` field is present but is neither BUY nor SELL.
    #[error("trade shape: unknown action '{action}' (expected BUY | SELL)")]
    UnknownAction { action: String },
    /// The `asset` field is absent or blank.
    #[error("trade shape: missing asset")]
    MissingAsset,
}

/// Invalid engine configuration values.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConfigError {
    #[error("config: replay.full_exit_threshold must be in (0, 1], got {0}")]
    FullExitThreshold(f64),
    #[error("config: replay.dust_threshold must be >= 0, got {0}")]
    DustThreshold(f64),
    #[error("config: portfolio.starting_capital must be finite and >= 0, got {0}")]
    StartingCapital(f64),
    #[error("config: replay.cash_asset must not be empty")]
    EmptyCashAsset,
    #[error("config: benchmark.reference_asset must not be empty")]
    EmptyReferenceAsset,
}
