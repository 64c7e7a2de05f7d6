//! Metrics aggregation: fills in, one [`MetricsRow`] out.
//!
//! Trades come from [`pair_fills`], so they are ordered by exit in bar order
//! even if the fill slice is not. Each trade is charged
//! `2 * commission + 2 * slip * qty` (one commission and one unit of slip per
//! side).

use crate::domain::Fill;
use crate::engine::pairing::{pair_fills, RoundTrip};
use crate::schema::MetricsRow;

/// Net P&L of one round trip after costs.
pub fn trade_pnl(trade: &RoundTrip, commission: f64, slip: f64) -> f64 {
    trade.gross_pnl() - 2.0 * commission - 2.0 * slip * trade.qty()
}

/// Most negative drawdown of the cumulative P&L path, starting flat at 0.
pub fn max_drawdown(pnls: &[f64]) -> f64 {
    let mut equity = 0.0_f64;
    let mut peak = 0.0_f64;
    let mut worst = 0.0_f64;
    for &pnl in pnls {
        equity += pnl;
        peak = peak.max(equity);
        worst = worst.min(equity - peak);
    }
    worst
}

pub fn aggregate(fills: &[Fill], commission: f64, slip: f64) -> MetricsRow {
    let pairing = pair_fills(fills);
    if pairing.round_trips.is_empty() {
        return MetricsRow::ZERO;
    }

    let pnls: Vec<f64> = pairing
        .round_trips
        .iter()
        .map(|t| trade_pnl(t, commission, slip))
        .collect();

    let trades = pnls.len();
    let net_profit: f64 = pnls.iter().sum();
    let wins = pnls.iter().filter(|&&p| p > 0.0).count();

    MetricsRow {
        net_profit,
        max_drawdown: max_drawdown(&pnls),
        trades: trades as u64,
        win_rate: wins as f64 / trades as f64,
        avg_trade: net_profit / trades as f64,
    }
}
