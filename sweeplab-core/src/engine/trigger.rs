//! Trigger checking: does bar `b` fill a given intent, and at what price?
//!
//! MARKET fills at the bar's open. LIMIT and STOP both fill at their declared
//! price when that price lies inside the bar's `[low, high]` range, for either
//! side. There is no gap-through handling: a stop whose price the bar jumped
//! over does not fill on that bar.

use crate::domain::{BarSeries, OrderIntent, OrderKind};

/// Raw fill price if `intent` triggers on bar `b`, else `None`.
///
/// Does not check eligibility or TTL; the simulator does that first.
pub fn check_trigger(intent: &OrderIntent, bars: &BarSeries<'_>, b: usize) -> Option<f64> {
    match intent.kind {
        OrderKind::Market => Some(bars.open()[b]),
        OrderKind::Limit | OrderKind::Stop => {
            price_in_range(intent.price, bars.low()[b], bars.high()[b]).then_some(intent.price)
        }
    }
}

#[inline]
fn price_in_range(price: f64, low: f64, high: f64) -> bool {
    low <= price && price <= high
}
