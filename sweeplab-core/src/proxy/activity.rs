//! Activity proxy: params `[channel_len]`.
//!
//! For every bar `t >= L` the channel is built from the prior `L` bars
//! (`high[t-L..t]`, `low[t-L..t]`) and the close is classified as above or
//! below the channel midpoint. A trigger is a flip between consecutive non-zero
//! classifications. Score is `ln_1p(triggers / (N - L))`: oscillating series
//! flip often, smooth trends almost never. Requires `1 <= L < N`.

use std::cmp::Ordering;
use std::collections::HashMap;

use rayon::prelude::*;

use super::{finite_or_invalid, rolling_max, rolling_min, ProxyScorer, INVALID_SCORE};
use crate::domain::{as_length, BarSeries, ParamMatrix};

const CHANNEL_LEN: usize = 0;

pub fn channel_len(row: &[f64], n_bars: usize) -> Option<usize> {
    let len = as_length(*row.first()?)?;
    (len < n_bars).then_some(len)
}

/// Which side of the channel midpoint a close sits on.
fn side(close: f64, mid: f64) -> i8 {
    match close.partial_cmp(&mid) {
        Some(Ordering::Greater) => 1,
        Some(Ordering::Less) => -1,
        _ => 0,
    }
}

/// Counts side flips; bars exactly on the midpoint neither trigger nor reset.
#[derive(Debug, Default)]
struct FlipCounter {
    last: i8,
    triggers: usize,
}

impl FlipCounter {
    fn push(&mut self, side: i8) {
        if side == 0 {
            return;
        }
        if self.last != 0 && side != self.last {
            self.triggers += 1;
        }
        self.last = side;
    }
}

fn activity_score(triggers: usize, evaluated: usize) -> f64 {
    finite_or_invalid((triggers as f64 / evaluated as f64).ln_1p())
}

/// Channel midpoints for `t in L..N`; `mids[k]` belongs to bar `k + L`.
fn channel_mids(bars: &BarSeries<'_>, len: usize) -> Vec<f64> {
    let n = bars.len();
    let upper = rolling_max(&bars.high()[..n - 1], len);
    let lower = rolling_min(&bars.low()[..n - 1], len);
    upper
        .iter()
        .zip(&lower)
        .map(|(&hi, &lo)| (hi + lo) / 2.0)
        .collect()
}

fn count_flips(close: &[f64], mids: &[f64], len: usize) -> usize {
    let mut counter = FlipCounter::default();
    for (k, &mid) in mids.iter().enumerate() {
        counter.push(side(close[k + len], mid));
    }
    counter.triggers
}

#[derive(Debug, Clone, Copy, Default)]
pub struct ActivityOptimized;

impl ProxyScorer for ActivityOptimized {
    fn name(&self) -> &'static str {
        "activity"
    }

    fn n_params(&self) -> usize {
        1
    }

    fn score_row(&self, bars: &BarSeries<'_>, row: &[f64]) -> f64 {
        let Some(len) = channel_len(row, bars.len()) else {
            return INVALID_SCORE;
        };
        let mids = channel_mids(bars, len);
        activity_score(count_flips(bars.close(), &mids, len), mids.len())
    }

    fn score(&self, bars: &BarSeries<'_>, params: &ParamMatrix) -> Vec<f64> {
        if !self.accepts(params) {
            return vec![INVALID_SCORE; params.n_rows()];
        }
        let n = bars.len();
        let mut lengths = params.distinct_lengths(CHANNEL_LEN);
        lengths.retain(|&len| len < n);

        // Trigger counts depend only on the channel length.
        let flips: HashMap<usize, usize> = lengths
            .par_iter()
            .map(|&len| (len, count_flips(bars.close(), &channel_mids(bars, len), len)))
            .collect();

        (0..params.n_rows())
            .into_par_iter()
            .map(|i| match channel_len(params.row(i), n) {
                Some(len) => activity_score(flips[&len], n - len),
                None => INVALID_SCORE,
            })
            .collect()
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct ActivityReference;

impl ProxyScorer for ActivityReference {
    fn name(&self) -> &'static str {
        "activity"
    }

    fn n_params(&self) -> usize {
        1
    }

    fn score_row(&self, bars: &BarSeries<'_>, row: &[f64]) -> f64 {
        let n = bars.len();
        let Some(len) = channel_len(row, n) else {
            return INVALID_SCORE;
        };
        let (high, low, close) = (bars.high(), bars.low(), bars.close());

        let sides: Vec<i8> = (len..n)
            .map(|t| {
                let upper = high[t - len..t]
                    .iter()
                    .cloned()
                    .fold(f64::NEG_INFINITY, f64::max);
                let lower = low[t - len..t].iter().cloned().fold(f64::INFINITY, f64::min);
                side(close[t], (upper + lower) / 2.0)
            })
            .collect();

        let mut last = 0;
        let mut triggers = 0;
        for &s in sides.iter().filter(|&&s| s != 0) {
            if last != 0 && s != last {
                triggers += 1;
            }
            last = s;
        }
        activity_score(triggers, sides.len())
    }
}
