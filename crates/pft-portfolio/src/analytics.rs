use serde::Serialize;

use crate::types::CompletedRoundTrip;

/// Aggregate statistics over completed round trips.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct TradeAnalyticsSummary {
    /// Raw trade count (BUYs and SELLs), not round trips.
    pub total_trades: usize,
    pub round_trips: usize,
    /// `winners / round_trips * 100`; `None` with zero round trips.
    pub win_rate: Option<f64>,
    pub best: Option<CompletedRoundTrip>,
    pub worst: Option<CompletedRoundTrip>,
    pub avg_hold_days: Option<f64>,
    pub total_realized_profit: f64,
    pub winners: usize,
    pub losers: usize,
}

/// Summarize `trips`. `None` when there were no trades at all.
///
/// Best and worst are by absolute profit, not percentage; on a tie the
/// round trip encountered first wins.
pub fn summarize(total_trades: usize, trips: &[CompletedRoundTrip]) -> Option<TradeAnalyticsSummary> {
    if total_trades == 0 {
        return None;
    }

    let n = trips.len();
    let winners = trips.iter().filter(|t| t.is_winner()).count();
    let losers = trips.iter().filter(|t| t.is_loser()).count();

    let mut best: Option<&CompletedRoundTrip> = None;
    let mut worst: Option<&CompletedRoundTrip> = None;
    for t in trips {
        if best.map_or(true, |b| t.profit > b.profit) {
            best = Some(t);
        }
        if worst.map_or(true, |w| t.profit < w.profit) {
            worst = Some(t);
        }
    }

    let (win_rate, avg_hold_days) = if n > 0 {
        let hold: i64 = trips.iter().map(|t| t.hold_days).sum();
        (
            Some(winners as f64 / n as f64 * 100.0),
            Some(hold as f64 / n as f64),
        )
    } else {
        (None, None)
    };

    Some(TradeAnalyticsSummary {
        total_trades,
        round_trips: n,
        win_rate,
        best: best.cloned(),
        worst: worst.cloned(),
        avg_hold_days,
        total_realized_profit: trips.iter().map(|t| t.profit).sum(),
        winners,
        losers,
    })
}
