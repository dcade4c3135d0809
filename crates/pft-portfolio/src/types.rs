use serde::{Deserialize, Serialize};

use crate::dates::NormalizedDate;
use crate::error::TradeShapeError;
use crate::numeric::{finite_or_zero, parse_number};

/// BUY or SELL.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Side {
    Buy,
    Sell,
}

impl Side {
    pub fn as_str(&self) -> &'static str {
        match self {
            Side::Buy => "BUY",
            Side::Sell => "SELL",
        }
    }

    /// Case-insensitive parse of `BUY` / `SELL`.
    pub fn parse(s: &str) -> Result<Self, TradeShapeError> {
        match s.trim().to_ascii_uppercase().as_str() {
            "" => Err(TradeShapeError::MissingAction),
            "BUY" => Ok(Side::Buy),
            "SELL" => Ok(Side::Sell),
            _ => Err(TradeShapeError::UnknownAction {
                action: s.trim().to_string(),
            }),
        }
    }
}

/// A numeric field as delivered by the sheet layer: already a number, or text
/// that may carry currency symbols and separators.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RawNumber {
    Number(f64),
    Text(String),
}

impl RawNumber {
    /// Numeric value; malformed input is `0.0`.
    pub fn value(&self) -> f64 {
        match self {
            RawNumber::Number(n) => finite_or_zero(*n),
            RawNumber::Text(s) => parse_number(s),
        }
    }
}

impl Default for RawNumber {
    fn default() -> Self {
        RawNumber::Text(String::new())
    }
}

impl From<f64> for RawNumber {
    fn from(v: f64) -> Self {
        RawNumber::Number(v)
    }
}

impl From<&str> for RawNumber {
    fn from(s: &str) -> Self {
        RawNumber::Text(s.to_string())
    }
}

impl From<String> for RawNumber {
    fn from(s: String) -> Self {
        RawNumber::Text(s)
    }
}

/// An immutable trade as supplied by the caller (the accounting atom).
///
/// `date` stays raw; it is normalized when the trade list is ordered.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Trade {
    pub date: String,
    pub side: Side,
    pub asset: String,
    pub amount: RawNumber,
    pub price: RawNumber,
}

impl Trade {
    pub fn new<D, A>(
        date: D,
        side: Side,
        asset: A,
        amount: impl Into<RawNumber>,
        price: impl Into<RawNumber>,
    ) -> Self
    where
        D: Into<String>,
        A: Into<String>,
    {
        Self {
            date: date.into(),
            side,
            asset: asset.into(),
            amount: amount.into(),
            price: price.into(),
        }
    }

    pub fn buy(date: &str, asset: &str, amount: impl Into<RawNumber>, price: impl Into<RawNumber>) -> Self {
        Self::new(date, Side::Buy, asset, amount, price)
    }

    pub fn sell(date: &str, asset: &str, amount: impl Into<RawNumber>, price: impl Into<RawNumber>) -> Self {
        Self::new(date, Side::Sell, asset, amount, price)
    }
}

/// A loosely shaped trade row, before boundary validation.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct RawTrade {
    pub date: Option<String>,
    pub action: Option<String>,
    pub asset: Option<String>,
    pub amount: Option<RawNumber>,
    pub price: Option<RawNumber>,
}

impl TryFrom<RawTrade> for Trade {
    type Error = TradeShapeError;

    /// Missing dates and numbers are tolerated (they degrade later); a missing
    /// action or asset is a contract violation.
    fn try_from(raw: RawTrade) -> Result<Self, Self::Error> {
        let action = raw.action.ok_or(TradeShapeError::MissingAction)?;
        let side = Side::parse(&action)?;

        let asset = raw
            .asset
            .map(|a| a.trim().to_string())
            .filter(|a| !a.is_empty())
            .ok_or(TradeShapeError::MissingAsset)?;

        Ok(Trade {
            date: raw.date.unwrap_or_default(),
            side,
            asset,
            amount: raw.amount.unwrap_or_default(),
            price: raw.price.unwrap_or_default(),
        })
    }
}

/// A trade with its date normalized and numeric fields resolved.
///
/// `seq` is the trade's position in the caller's original list; it is the
/// tie-breaker that keeps the chronological sort stable.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct DatedTrade {
    pub seq: usize,
    pub raw_date: String,
    pub date: NormalizedDate,
    pub side: Side,
    pub asset: String,
    pub amount: f64,
    pub price: f64,
}

impl DatedTrade {
    /// `amount * price`.
    pub fn notional(&self) -> f64 {
        self.amount * self.price
    }
}

/// A FIFO lot opened by a BUY. `remaining` only ever decreases.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Lot {
    pub date: NormalizedDate,
    pub amount: f64,
    pub price: f64,
    pub remaining: f64,
}

impl Lot {
    pub fn open(date: NormalizedDate, amount: f64, price: f64) -> Self {
        Self {
            date,
            amount,
            price,
            remaining: amount,
        }
    }

    pub fn is_exhausted(&self) -> bool {
        self.remaining <= 0.0
    }
}

/// One matched BUY-lot-to-SELL slice.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct CompletedRoundTrip {
    pub asset: String,
    pub buy_date: NormalizedDate,
    pub sell_date: NormalizedDate,
    pub buy_price: f64,
    pub sell_price: f64,
    pub amount: f64,
    pub profit: f64,
    pub profit_pct: f64,
    pub hold_days: i64,
}

impl CompletedRoundTrip {
    pub fn is_winner(&self) -> bool {
        self.profit > 0.0
    }

    pub fn is_loser(&self) -> bool {
        self.profit < 0.0
    }
}

/// Current holding of one asset. `cost_basis` covers the open quantity only.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Position {
    pub asset: String,
    pub amount: f64,
    pub cost_basis: f64,
}

/// One point on the portfolio value series.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct HistoryPoint {
    /// Raw date label as it appeared on the trade rows.
    pub date: String,
    pub timestamp: NormalizedDate,
    pub value: f64,
    pub benchmark_value: Option<f64>,
}

/// An externally supplied `(date, value)` pair, used when there are no trades
/// to synthesize a series from.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SeriesPoint {
    pub date: String,
    pub value: f64,
}
