//! Mark-to-market of open positions.

use serde::{Deserialize, Serialize};

use crate::numeric::ratio_or_zero;
use crate::prices::PriceLookup;
use crate::types::Position;

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct ValuedPosition {
    pub asset: String,
    pub amount: f64,
    pub cost_basis: f64,
    pub price: f64,
    pub value: f64,
    /// `(price - cost_basis) * amount`.
    pub unrealized_profit: f64,
    /// `None` when cost basis is zero.
    pub unrealized_pct: Option<f64>,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct AllocationSlice {
    pub asset: String,
    pub value: f64,
    /// Fraction of total value, `0..=1`.
    pub weight: f64,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Valuation {
    pub positions: Vec<ValuedPosition>,
    pub total_value: f64,
    pub total_invested: f64,
    /// `total_value - total_invested`.
    pub profit: f64,
    /// 0 when nothing was invested.
    pub total_return_pct: f64,
    /// Positions with positive value only.
    pub allocation: Vec<AllocationSlice>,
}

/// Value every position with `prices`.
pub fn value_positions<P: PriceLookup + ?Sized>(
    positions: &[Position],
    prices: &P,
    total_invested: f64,
) -> Valuation {
    let valued: Vec<ValuedPosition> = positions
        .iter()
        .map(|p| {
            let price = prices.unit_price(&p.asset);
            let unrealized_pct = if p.cost_basis != 0.0 {
                Some((price - p.cost_basis) / p.cost_basis * 100.0)
            } else {
                None
            };
            ValuedPosition {
                asset: p.asset.clone(),
                amount: p.amount,
                cost_basis: p.cost_basis,
                price,
                value: p.amount * price,
                unrealized_profit: (price - p.cost_basis) * p.amount,
                unrealized_pct,
            }
        })
        .collect();

    let total_value: f64 = valued.iter().map(|v| v.value).sum();
    let total_return_pct = if total_invested > 0.0 {
        (total_value - total_invested) / total_invested * 100.0
    } else {
        0.0
    };

    let allocation = valued
        .iter()
        .filter(|v| v.value > 0.0)
        .map(|v| AllocationSlice {
            asset: v.asset.clone(),
            value: v.value,
            weight: ratio_or_zero(v.value, total_value),
        })
        .collect();

    Valuation {
        positions: valued,
        total_value,
        total_invested,
        profit: total_value - total_invested,
        total_return_pct,
        allocation,
    }
}

/// A price target for one asset.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PriceTarget {
    pub asset: String,
    pub target: f64,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct TargetProgress {
    pub asset: String,
    pub target: f64,
    pub current: f64,
    /// `(target - current) / current * 100`; 0 when there is no current price.
    pub upside_pct: f64,
}

pub fn target_progress<P: PriceLookup + ?Sized>(targets: &[PriceTarget], prices: &P) -> Vec<TargetProgress> {
    targets
        .iter()
        .map(|t| {
            let current = prices.unit_price(&t.asset);
            let upside_pct = if current > 0.0 {
                (t.target - current) / current * 100.0
            } else {
                0.0
            };
            TargetProgress {
                asset: t.asset.clone(),
                target: t.target,
                current,
                upside_pct,
            }
        })
        .collect()
}
