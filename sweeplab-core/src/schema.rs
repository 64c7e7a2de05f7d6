//! Metrics schema contract: the boundary between Stage 2 and ranking consumers.
//!
//! Consumers index the metrics matrix by the `COL_*` constants. Column order is
//! versioned: new columns are appended and bump [`METRICS_SCHEMA_VERSION`],
//! existing indices never move.

use serde::{Deserialize, Serialize};

pub const METRICS_SCHEMA_VERSION: u32 = 1;

pub const COL_NET_PROFIT: usize = 0;
pub const COL_MAX_DD: usize = 1;
pub const COL_TRADES: usize = 2;
pub const COL_WIN_RATE: usize = 3;
pub const COL_AVG_TRADE: usize = 4;
pub const NUM_METRIC_COLS: usize = 5;

pub const METRIC_COLUMNS: [&str; NUM_METRIC_COLS] = [
    "net_profit",
    "max_drawdown",
    "trades",
    "win_rate",
    "avg_trade",
];

/// Per-row Stage-2 result. Computed once from a fill sequence, never mutated.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct MetricsRow {
    pub net_profit: f64,
    /// Most negative `equity - running peak`; always `<= 0`.
    pub max_drawdown: f64,
    /// Completed round trips.
    pub trades: u64,
    pub win_rate: f64,
    pub avg_trade: f64,
}

impl MetricsRow {
    pub const ZERO: MetricsRow = MetricsRow {
        net_profit: 0.0,
        max_drawdown: 0.0,
        trades: 0,
        win_rate: 0.0,
        avg_trade: 0.0,
    };

    pub fn to_array(&self) -> [f64; NUM_METRIC_COLS] {
        let mut out = [0.0; NUM_METRIC_COLS];
        out[COL_NET_PROFIT] = self.net_profit;
        out[COL_MAX_DD] = self.max_drawdown;
        out[COL_TRADES] = self.trades as f64;
        out[COL_WIN_RATE] = self.win_rate;
        out[COL_AVG_TRADE] = self.avg_trade;
        out
    }

    /// Read a row back from a matrix slice. `None` if the slice is too short.
    pub fn from_slice(row: &[f64]) -> Option<Self> {
        if row.len() < NUM_METRIC_COLS {
            return None;
        }
        Some(Self {
            net_profit: row[COL_NET_PROFIT],
            max_drawdown: row[COL_MAX_DD],
            trades: row[COL_TRADES] as u64,
            win_rate: row[COL_WIN_RATE],
            avg_trade: row[COL_AVG_TRADE],
        })
    }

    pub fn is_zero(&self) -> bool {
        self.to_array().iter().all(|&v| v == 0.0)
    }
}
