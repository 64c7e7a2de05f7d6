//! Order-matching simulator: bar-by-bar trigger state machine.
//!
//! For each bar in ascending order, every live intent is visited in ascending
//! `order_id`:
//!
//! 1. Not yet eligible (`b < max(created_bar, 0)`): stays live.
//! 2. Past its TTL (`b - start > ttl`): dropped, no fill.
//! 3. Triggers: one fill at the trigger price, then removed.
//!
//! Because the visit order is the id order, all fills on the same bar come out
//! sorted by `order_id`. Role, kind and side never affect ordering.

use crate::domain::{BarSeries, Fill, OrderIntent};
use crate::engine::trigger::check_trigger;

/// TTL actually applied to an intent. Negative means the intent never expires.
pub fn effective_ttl(intent: &OrderIntent, default_ttl: i64) -> i64 {
    if intent.ttl_bars >= 0 {
        intent.ttl_bars
    } else {
        default_ttl
    }
}

/// Match `intents` against `bars` and return the fills in emission order
/// (ascending bar, then ascending `order_id`).
///
/// Intents with non-positive quantity never fill. Duplicate ids keep their
/// input order.
pub fn simulate(bars: &BarSeries<'_>, intents: &[OrderIntent], default_ttl: i64) -> Vec<Fill> {
    let mut live: Vec<&OrderIntent> = intents.iter().filter(|i| i.qty > 0).collect();
    live.sort_by_key(|i| i.order_id);

    let mut fills = Vec::with_capacity(live.len());
    for b in 0..bars.len() {
        if live.is_empty() {
            break;
        }
        let bar = b as i64;
        live.retain(|intent| {
            let start = intent.start_bar();
            if bar < start {
                return true;
            }
            let ttl = effective_ttl(intent, default_ttl);
            if ttl >= 0 && bar - start > ttl {
                return false;
            }
            match check_trigger(intent, bars, b) {
                Some(price) => {
                    fills.push(Fill::from_intent(intent, b, price));
                    false
                }
                None => true,
            }
        });
    }
    fills
}
