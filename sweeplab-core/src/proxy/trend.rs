//! Trend proxy: params `[fast, slow]`.
//!
//! Mean relative spread of the fast SMA over the slow SMA of closes, taken over
//! every bar where the slow window is complete:
//!
//! `score = mean_t((sma_fast[t] - sma_slow[t]) / sma_slow[t])`, `t in slow-1..N`
//!
//! Positive means the series spent the period trending up. Requires
//! `1 <= fast < slow <= N`.

use std::collections::HashMap;

use rayon::prelude::*;

use super::{finite_or_invalid, rolling_mean, ProxyScorer, INVALID_SCORE};
use crate::domain::{as_length, BarSeries, ParamMatrix};

const FAST: usize = 0;
const SLOW: usize = 1;

/// Validated `(fast, slow)` window lengths, or `None` for an invalid row.
pub fn trend_windows(row: &[f64], n_bars: usize) -> Option<(usize, usize)> {
    if row.len() < 2 {
        return None;
    }
    let fast = as_length(row[FAST])?;
    let slow = as_length(row[SLOW])?;
    (fast < slow && slow <= n_bars).then_some((fast, slow))
}

/// Spread mean from precomputed trailing means. `fast_sma[k]` ends at bar
/// `k + fast - 1`, `slow_sma[k]` at `k + slow - 1`.
fn spread_mean(fast_sma: &[f64], slow_sma: &[f64], fast: usize, slow: usize) -> f64 {
    let shift = slow - fast;
    let mut acc = 0.0;
    for (k, &slow_v) in slow_sma.iter().enumerate() {
        let fast_v = fast_sma[k + shift];
        acc += (fast_v - slow_v) / slow_v;
    }
    finite_or_invalid(acc / slow_sma.len() as f64)
}

#[derive(Debug, Clone, Copy, Default)]
pub struct TrendOptimized;

impl ProxyScorer for TrendOptimized {
    fn name(&self) -> &'static str {
        "trend"
    }

    fn n_params(&self) -> usize {
        2
    }

    fn score_row(&self, bars: &BarSeries<'_>, row: &[f64]) -> f64 {
        let Some((fast, slow)) = trend_windows(row, bars.len()) else {
            return INVALID_SCORE;
        };
        let close = bars.close();
        spread_mean(
            &rolling_mean(close, fast),
            &rolling_mean(close, slow),
            fast,
            slow,
        )
    }

    fn score(&self, bars: &BarSeries<'_>, params: &ParamMatrix) -> Vec<f64> {
        if !self.accepts(params) {
            return vec![INVALID_SCORE; params.n_rows()];
        }
        let close = bars.close();
        let n = bars.len();

        let mut lengths = params.distinct_lengths(FAST);
        lengths.extend(params.distinct_lengths(SLOW));
        lengths.sort_unstable();
        lengths.dedup();
        lengths.retain(|&len| len <= n);

        let smas: HashMap<usize, Vec<f64>> = lengths
            .par_iter()
            .map(|&len| (len, rolling_mean(close, len)))
            .collect();

        (0..params.n_rows())
            .into_par_iter()
            .map(|i| match trend_windows(params.row(i), n) {
                Some((fast, slow)) => spread_mean(&smas[&fast], &smas[&slow], fast, slow),
                None => INVALID_SCORE,
            })
            .collect()
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct TrendReference;

impl TrendReference {
    fn sma_at(close: &[f64], t: usize, len: usize) -> f64 {
        close[t + 1 - len..=t].iter().sum::<f64>() / len as f64
    }
}

impl ProxyScorer for TrendReference {
    fn name(&self) -> &'static str {
        "trend"
    }

    fn n_params(&self) -> usize {
        2
    }

    fn score_row(&self, bars: &BarSeries<'_>, row: &[f64]) -> f64 {
        let Some((fast, slow)) = trend_windows(row, bars.len()) else {
            return INVALID_SCORE;
        };
        let close = bars.close();
        let spreads: Vec<f64> = (slow - 1..close.len())
            .map(|t| {
                let fast_v = Self::sma_at(close, t, fast);
                let slow_v = Self::sma_at(close, t, slow);
                (fast_v - slow_v) / slow_v
            })
            .collect();
        finite_or_invalid(spreads.iter().sum::<f64>() / spreads.len() as f64)
    }
}
