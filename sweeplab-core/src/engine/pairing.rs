//! Round-trip pairing: matches EXIT fills to earlier ENTRY fills.
//!
//! Fills are walked in chronological order `(bar_index, order_id)`. Entries
//! queue FIFO; an exit closes the oldest queued entry of the opposite side.
//! Exits with nothing to close are ignored.

use crate::domain::{Fill, OrderRole};

/// A completed entry/exit pair.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RoundTrip {
    pub entry: Fill,
    pub exit: Fill,
}

impl RoundTrip {
    /// Quantity of the round trip, taken from the entry.
    pub fn qty(&self) -> f64 {
        self.entry.qty as f64
    }

    /// Price P&L before costs.
    pub fn gross_pnl(&self) -> f64 {
        (self.exit.price - self.entry.price) * self.entry.side.sign() * self.qty()
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Pairing {
    /// Completed trades in exit order.
    pub round_trips: Vec<RoundTrip>,
    /// Entries still open after the last fill, oldest first.
    pub open_entries: Vec<Fill>,
}

/// Copy of `fills` sorted by `(bar_index, order_id)`; stable for equal keys.
pub fn chronological(fills: &[Fill]) -> Vec<Fill> {
    let mut ordered = fills.to_vec();
    ordered.sort_by_key(Fill::chrono_key);
    ordered
}

pub fn pair_fills(fills: &[Fill]) -> Pairing {
    let mut pairing = Pairing::default();
    for fill in chronological(fills) {
        match fill.role {
            OrderRole::Entry => pairing.open_entries.push(fill),
            OrderRole::Exit => {
                let closes = fill.side.opposite();
                if let Some(pos) = pairing.open_entries.iter().position(|e| e.side == closes) {
                    let entry = pairing.open_entries.remove(pos);
                    pairing.round_trips.push(RoundTrip { entry, exit: fill });
                }
            }
        }
    }
    pairing
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{OrderKind, OrderSide};

    fn fill(bar: usize, id: u64, role: OrderRole, side: OrderSide, price: f64) -> Fill {
        Fill {
            bar_index: bar,
            order_id: id,
            role,
            kind: OrderKind::Market,
            side,
            price,
            qty: 2,
        }
    }

    #[test]
    fn pairs_entry_with_next_opposite_exit() {
        let fills = [
            fill(1, 1, OrderRole::Entry, OrderSide::Buy, 100.0),
            fill(4, 2, OrderRole::Exit, OrderSide::Sell, 110.0),
        ];
        let p = pair_fills(&fills);
        assert_eq!(p.round_trips.len(), 1);
        assert!(p.open_entries.is_empty());
        assert_eq!(p.round_trips[0].gross_pnl(), 20.0);
    }

    #[test]
    fn short_round_trip_profits_when_price_falls() {
        let fills = [
            fill(1, 1, OrderRole::Entry, OrderSide::Sell, 100.0),
            fill(2, 2, OrderRole::Exit, OrderSide::Buy, 90.0),
        ];
        let p = pair_fills(&fills);
        assert_eq!(p.round_trips[0].gross_pnl(), 20.0);
    }

    #[test]
    fn same_side_exit_does_not_close_entry() {
        let fills = [
            fill(1, 1, OrderRole::Entry, OrderSide::Buy, 100.0),
            fill(2, 2, OrderRole::Exit, OrderSide::Buy, 105.0),
        ];
        let p = pair_fills(&fills);
        assert!(p.round_trips.is_empty());
        assert_eq!(p.open_entries.len(), 1);
    }

    #[test]
    fn orphan_exit_is_ignored() {
        let fills = [fill(0, 1, OrderRole::Exit, OrderSide::Sell, 100.0)];
        assert_eq!(pair_fills(&fills), Pairing::default());
    }

    #[test]
    fn fifo_across_multiple_entries() {
        let fills = [
            fill(0, 1, OrderRole::Entry, OrderSide::Buy, 100.0),
            fill(1, 2, OrderRole::Entry, OrderSide::Buy, 101.0),
            fill(2, 3, OrderRole::Exit, OrderSide::Sell, 105.0),
        ];
        let p = pair_fills(&fills);
        assert_eq!(p.round_trips[0].entry.order_id, 1);
        assert_eq!(p.open_entries[0].order_id, 2);
    }

    #[test]
    fn pairing_uses_chronological_order_not_slice_order() {
        let fills = [
            fill(5, 4, OrderRole::Exit, OrderSide::Sell, 120.0),
            fill(2, 1, OrderRole::Entry, OrderSide::Buy, 100.0),
        ];
        let p = pair_fills(&fills);
        assert_eq!(p.round_trips.len(), 1);
        assert_eq!(p.round_trips[0].exit.bar_index, 5);
    }

    #[test]
    fn exit_on_entry_bar_with_higher_id_closes_it() {
        let fills = [
            fill(0, 2, OrderRole::Exit, OrderSide::Sell, 95.0),
            fill(0, 1, OrderRole::Entry, OrderSide::Buy, 105.0),
        ];
        let p = pair_fills(&fills);
        assert_eq!(p.round_trips.len(), 1);
        assert_eq!(p.round_trips[0].gross_pnl(), -20.0);
    }
}
