use crate::domain::order::{OrderIntent, OrderKind, OrderRole, OrderSide};
use serde::{Deserialize, Serialize};

/// Realized execution of one intent on one bar.
///
/// `price` is the raw trigger price; commission and slippage are charged by the
/// metrics aggregator's cost model.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Fill {
    pub bar_index: usize,
    pub order_id: u64,
    pub role: OrderRole,
    pub kind: OrderKind,
    pub side: OrderSide,
    pub price: f64,
    pub qty: i64,
}

impl Fill {
    pub fn from_intent(intent: &OrderIntent, bar_index: usize, price: f64) -> Self {
        Self {
            bar_index,
            order_id: intent.order_id,
            role: intent.role,
            kind: intent.kind,
            side: intent.side,
            price,
            qty: intent.qty,
        }
    }

    /// Chronological sort key: bar first, then the tie-break id.
    pub fn chrono_key(&self) -> (usize, u64) {
        (self.bar_index, self.order_id)
    }
}
