//! Strategy kernels: the seam that turns one parameter row into order intents.
//!
//! A kernel is a pure function of `(bars, params, order_qty)`. The grid runner
//! calls it once per selected row, possibly from several threads at once.

use sweeplab_core::domain::{as_length, BarSeries, OrderIntent, OrderKind, OrderRole, OrderSide};
use sweeplab_core::proxy::{rolling_max, rolling_mean, true_range};

pub trait StrategyKernel: Sync {
    fn name(&self) -> &str;

    /// Intents for one parameter row. An invalid row yields no intents.
    fn intents(&self, bars: &BarSeries<'_>, params: &[f64], order_qty: i64) -> Vec<OrderIntent>;
}

/// Wraps a closure as a [`StrategyKernel`].
pub struct FnKernel<F> {
    name: String,
    f: F,
}

impl<F> FnKernel<F>
where
    F: Fn(&BarSeries<'_>, &[f64], i64) -> Vec<OrderIntent> + Sync,
{
    pub fn new(name: impl Into<String>, f: F) -> Self {
        Self {
            name: name.into(),
            f,
        }
    }
}

impl<F> StrategyKernel for FnKernel<F>
where
    F: Fn(&BarSeries<'_>, &[f64], i64) -> Vec<OrderIntent> + Sync,
{
    fn name(&self) -> &str {
        &self.name
    }

    fn intents(&self, bars: &BarSeries<'_>, params: &[f64], order_qty: i64) -> Vec<OrderIntent> {
        (self.f)(bars, params, order_qty)
    }
}

/// Long-only channel breakout with an ATR stop and a time stop.
///
/// Params: `[channel_len, atr_len, stop_mult]` with an optional fourth
/// `hold_bars` (defaults to `channel_len`). Every length must fit inside the
/// series: `channel_len < N`, `atr_len <= N`, `hold_bars < N`.
///
/// A signal fires on bar `t` when `close[t]` exceeds the highest high of the
/// previous `channel_len` bars. Each signal emits three intents, all created
/// for bar `t + 1`:
///
/// | id       | role  | kind   | side | price                          | ttl         |
/// |----------|-------|--------|------|--------------------------------|-------------|
/// | `3k`     | Entry | Market | Buy  | -                              | 0           |
/// | `3k + 1` | Exit  | Stop   | Sell | `close[t] - stop_mult * ATR[t]`| `hold_bars` |
/// | `3k + 2` | Exit  | Market | Sell | -                              | 0, created at `t + 1 + hold_bars` |
///
/// The next signal is searched from `t + hold_bars + 2`, so trades never
/// overlap.
#[derive(Debug, Clone, Copy, Default)]
pub struct ChannelBreakoutKernel;

#[derive(Debug, Clone, Copy, PartialEq)]
struct BreakoutParams {
    channel_len: usize,
    atr_len: usize,
    stop_mult: f64,
    hold_bars: usize,
}

impl BreakoutParams {
    fn parse(params: &[f64], n: usize) -> Option<Self> {
        let channel_len = as_length(*params.first()?)?;
        let atr_len = as_length(*params.get(1)?)?;
        let stop_mult = *params.get(2)?;
        if !(stop_mult.is_finite() && stop_mult > 0.0) {
            return None;
        }
        let hold_bars = match params.get(3) {
            Some(&h) => as_length(h)?,
            None => channel_len,
        };
        if channel_len >= n || atr_len > n || hold_bars >= n {
            return None;
        }
        Some(Self {
            channel_len,
            atr_len,
            stop_mult,
            hold_bars,
        })
    }
}

impl StrategyKernel for ChannelBreakoutKernel {
    fn name(&self) -> &str {
        "channel_breakout"
    }

    fn intents(&self, bars: &BarSeries<'_>, params: &[f64], order_qty: i64) -> Vec<OrderIntent> {
        let n = bars.len();
        let Some(p) = BreakoutParams::parse(params, n) else {
            return Vec::new();
        };
        let close = bars.close();
        // channel_hi[k] covers high[k..k + channel_len]; atr[k] ends at k + atr_len - 1.
        let channel_hi = rolling_max(bars.high(), p.channel_len);
        let atr = rolling_mean(&true_range(bars), p.atr_len);

        let mut intents = Vec::new();
        let mut k = 0u64;
        let mut t = p.channel_len.max(p.atr_len - 1);
        while t < n {
            if close[t] <= channel_hi[t - p.channel_len] {
                t += 1;
                continue;
            }
            let created = t as i64 + 1;
            let stop = close[t] - p.stop_mult * atr[t + 1 - p.atr_len];
            let base = OrderIntent {
                order_id: 3 * k,
                created_bar: created,
                role: OrderRole::Entry,
                kind: OrderKind::Market,
                side: OrderSide::Buy,
                price: 0.0,
                qty: order_qty,
                ttl_bars: 0,
            };
            intents.push(base);
            intents.push(OrderIntent {
                order_id: 3 * k + 1,
                role: OrderRole::Exit,
                kind: OrderKind::Stop,
                side: OrderSide::Sell,
                price: stop,
                ttl_bars: p.hold_bars as i64,
                ..base
            });
            intents.push(OrderIntent {
                order_id: 3 * k + 2,
                created_bar: created + p.hold_bars as i64,
                role: OrderRole::Exit,
                side: OrderSide::Sell,
                ..base
            });
            k += 1;
            t += p.hold_bars + 2;
        }
        intents
    }
}
