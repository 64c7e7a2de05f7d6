//! Volatility proxy: params `[atr_len, stop_mult]`.
//!
//! ATR here is the simple trailing mean of true range. The stop distance at
//! each bar is `stop_mult * ATR[t]`, and the score is
//! `-ln_1p(mean stop distance)`: every valid score is `<= 0`, and a tighter
//! average stop scores closer to zero.

use std::collections::HashMap;

use rayon::prelude::*;

use super::{finite_or_invalid, rolling_mean, true_range, ProxyScorer, INVALID_SCORE};
use crate::domain::{as_length, BarSeries, ParamMatrix};

const ATR_LEN: usize = 0;
const STOP_MULT: usize = 1;

/// Validated `(atr_len, stop_mult)`, or `None` for an invalid row.
pub fn volatility_params(row: &[f64], n_bars: usize) -> Option<(usize, f64)> {
    if row.len() < 2 {
        return None;
    }
    let atr_len = as_length(row[ATR_LEN])?;
    let stop_mult = row[STOP_MULT];
    (atr_len <= n_bars && stop_mult.is_finite() && stop_mult > 0.0).then_some((atr_len, stop_mult))
}

fn stop_score(mean_stop_distance: f64) -> f64 {
    finite_or_invalid(-mean_stop_distance.max(0.0).ln_1p())
}

fn mean_stop_distance(atr: &[f64], stop_mult: f64) -> f64 {
    let mut acc = 0.0;
    for &a in atr {
        acc += stop_mult * a;
    }
    acc / atr.len() as f64
}

#[derive(Debug, Clone, Copy, Default)]
pub struct VolatilityOptimized;

impl ProxyScorer for VolatilityOptimized {
    fn name(&self) -> &'static str {
        "volatility"
    }

    fn n_params(&self) -> usize {
        2
    }

    fn score_row(&self, bars: &BarSeries<'_>, row: &[f64]) -> f64 {
        let Some((atr_len, stop_mult)) = volatility_params(row, bars.len()) else {
            return INVALID_SCORE;
        };
        let atr = rolling_mean(&true_range(bars), atr_len);
        stop_score(mean_stop_distance(&atr, stop_mult))
    }

    fn score(&self, bars: &BarSeries<'_>, params: &ParamMatrix) -> Vec<f64> {
        if !self.accepts(params) {
            return vec![INVALID_SCORE; params.n_rows()];
        }
        let n = bars.len();
        let tr = true_range(bars);

        let mut lengths = params.distinct_lengths(ATR_LEN);
        lengths.retain(|&len| len <= n);
        let atrs: HashMap<usize, Vec<f64>> = lengths
            .par_iter()
            .map(|&len| (len, rolling_mean(&tr, len)))
            .collect();

        (0..params.n_rows())
            .into_par_iter()
            .map(|i| match volatility_params(params.row(i), n) {
                Some((atr_len, stop_mult)) => {
                    stop_score(mean_stop_distance(&atrs[&atr_len], stop_mult))
                }
                None => INVALID_SCORE,
            })
            .collect()
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct VolatilityReference;

impl ProxyScorer for VolatilityReference {
    fn name(&self) -> &'static str {
        "volatility"
    }

    fn n_params(&self) -> usize {
        2
    }

    fn score_row(&self, bars: &BarSeries<'_>, row: &[f64]) -> f64 {
        let Some((atr_len, stop_mult)) = volatility_params(row, bars.len()) else {
            return INVALID_SCORE;
        };
        let (high, low, close) = (bars.high(), bars.low(), bars.close());

        let mut tr = Vec::with_capacity(bars.len());
        for t in 0..bars.len() {
            let hl = high[t] - low[t];
            if t == 0 {
                tr.push(hl);
            } else {
                let hc = (high[t] - close[t - 1]).abs();
                let lc = (low[t] - close[t - 1]).abs();
                tr.push(hl.max(hc).max(lc));
            }
        }

        let stops: Vec<f64> = (atr_len - 1..tr.len())
            .map(|t| {
                let atr = tr[t + 1 - atr_len..=t].iter().sum::<f64>() / atr_len as f64;
                stop_mult * atr
            })
            .collect();
        let mean = stops.iter().sum::<f64>() / stops.len() as f64;
        stop_score(mean)
    }
}
