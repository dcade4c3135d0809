use std::collections::BTreeMap;

use crate::types::{DatedTrade, Side};

/// Per-asset running state: quantity and the total cost of that quantity.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct AssetBook {
    pub amount: f64,
    pub total_cost: f64,
}

impl AssetBook {
    /// `total_cost / amount`, or 0 when nothing is held.
    pub fn cost_basis(&self) -> f64 {
        if self.amount > 0.0 {
            self.total_cost / self.amount
        } else {
            0.0
        }
    }
}

/// Cash plus per-asset books, mutated trade by trade.
///
/// Scoped to one replay call; nothing here outlives the caller.
#[derive(Clone, Debug, PartialEq)]
pub struct Holdings {
    pub cash: f64,
    pub books: BTreeMap<String, AssetBook>,
    full_exit_threshold: f64,
}

impl Holdings {
    pub fn new(starting_cash: f64, full_exit_threshold: f64) -> Self {
        Self {
            cash: starting_cash,
            books: BTreeMap::new(),
            full_exit_threshold,
        }
    }

    /// Apply one trade.
    ///
    /// Rules:
    /// - BUY: `amount += q; total_cost += q*p; cash -= q*p`.
    /// - SELL with `q >= threshold * amount`: the book resets to zero.
    /// - SELL otherwise: `total_cost` shrinks by `min(q/amount, 1)` of itself
    ///   and `amount -= q`.
    /// - SELL always credits `cash += q*p`.
    ///
    /// A SELL of a never-bought asset opens an empty book and resets it.
    pub fn apply(&mut self, t: &DatedTrade) {
        let q = t.amount;
        let p = t.price;
        let book = self.books.entry(t.asset.clone()).or_default();

        match t.side {
            Side::Buy => {
                book.amount += q;
                book.total_cost += q * p;
                self.cash -= q * p;
            }
            Side::Sell => {
                if q >= self.full_exit_threshold * book.amount {
                    book.amount = 0.0;
                    book.total_cost = 0.0;
                } else {
                    let fraction = if book.amount != 0.0 {
                        (q / book.amount).min(1.0)
                    } else {
                        1.0
                    };
                    book.total_cost -= fraction * book.total_cost;
                    book.amount -= q;
                }
                self.cash += q * p;
            }
        }
    }

    pub fn amount(&self, asset: &str) -> f64 {
        self.books.get(asset).map(|b| b.amount).unwrap_or(0.0)
    }

    /// Sum of `total_cost` over all books.
    pub fn total_cost(&self) -> f64 {
        self.books.values().map(|b| b.total_cost).sum()
    }
}
