//! Order intents: what a strategy kernel asks the simulator to execute.

use serde::{Deserialize, Serialize};

/// Whether an intent opens or closes a position.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum OrderRole {
    Entry,
    Exit,
}

/// How an intent triggers.
///
/// `Limit` and `Stop` share one mechanical trigger test in this engine; the
/// distinction is informational (mean-reversion vs momentum intent).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum OrderKind {
    /// Fills on the first eligible bar at that bar's open.
    Market,
    Limit,
    Stop,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum OrderSide {
    Buy,
    Sell,
}

impl OrderSide {
    /// +1 for buy, -1 for sell.
    pub fn sign(self) -> f64 {
        match self {
            OrderSide::Buy => 1.0,
            OrderSide::Sell => -1.0,
        }
    }

    pub fn opposite(self) -> Self {
        match self {
            OrderSide::Buy => OrderSide::Sell,
            OrderSide::Sell => OrderSide::Buy,
        }
    }
}

/// An immutable, not-yet-executed order instruction.
///
/// `order_id` must be unique within the intent set handed to the simulator;
/// ascending id is the only same-bar tie-break.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct OrderIntent {
    pub order_id: u64,
    /// First bar on which the intent may trigger; -1 means eligible from bar 0.
    pub created_bar: i64,
    pub role: OrderRole,
    pub kind: OrderKind,
    pub side: OrderSide,
    pub price: f64,
    pub qty: i64,
    /// Bars after `created_bar` the intent stays live. Negative means "use the
    /// simulator default".
    pub ttl_bars: i64,
}

impl OrderIntent {
    /// Bar from which TTL is counted.
    pub fn start_bar(&self) -> i64 {
        self.created_bar.max(0)
    }
}
