//! Stage-0 proxy scorers: cheap per-row heuristics used to pre-rank a sweep.
//!
//! Every scorer is a pure function `(bars, params) -> scores` and comes in two
//! interchangeable implementations behind [`ProxyScorer`]:
//!
//! - **Optimized**: window statistics are computed once per distinct window
//!   length and rows are scored in parallel.
//! - **Reference**: straightforward per-row recomputation, sequential.
//!
//! Both perform the same floating-point operations in the same order, so they
//! agree well inside [`TREND_TOLERANCE`] / [`VOLATILITY_TOLERANCE`] /
//! [`ACTIVITY_TOLERANCE`]. A structurally invalid row scores exactly
//! [`INVALID_SCORE`] in both.

pub mod activity;
pub mod trend;
pub mod volatility;

use std::collections::VecDeque;

use serde::{Deserialize, Serialize};

use crate::domain::{BarSeries, ParamMatrix};

pub use activity::{ActivityOptimized, ActivityReference};
pub use trend::{TrendOptimized, TrendReference};
pub use volatility::{VolatilityOptimized, VolatilityReference};

/// Sentinel for a parameter row that violates the scorer's domain bounds.
pub const INVALID_SCORE: f64 = f64::NEG_INFINITY;

pub const TREND_TOLERANCE: f64 = 1e-12;
pub const VOLATILITY_TOLERANCE: f64 = 1e-12;
pub const ACTIVITY_TOLERANCE: f64 = 1e-10;

/// A Stage-0 scorer over a full parameter matrix.
pub trait ProxyScorer: Send + Sync {
    fn name(&self) -> &'static str;

    /// Minimum number of parameter columns a row needs.
    fn n_params(&self) -> usize;

    /// Whether `params` has enough columns for this scorer. A matrix that is
    /// too narrow scores every row as [`INVALID_SCORE`].
    fn accepts(&self, params: &ParamMatrix) -> bool {
        params.n_cols() >= self.n_params()
    }

    fn score_row(&self, bars: &BarSeries<'_>, row: &[f64]) -> f64;

    fn score(&self, bars: &BarSeries<'_>, params: &ParamMatrix) -> Vec<f64> {
        if !self.accepts(params) {
            return vec![INVALID_SCORE; params.n_rows()];
        }
        params.rows().map(|row| self.score_row(bars, row)).collect()
    }
}

/// Which implementation family to use at runtime.
///
/// [`ScorerImpl::default`] follows the `reference-scorers` feature, the same
/// switch that picks the `Default*Scorer` aliases.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScorerImpl {
    Optimized,
    Reference,
}

impl Default for ScorerImpl {
    fn default() -> Self {
        if cfg!(feature = "reference-scorers") {
            ScorerImpl::Reference
        } else {
            ScorerImpl::Optimized
        }
    }
}

impl ScorerImpl {
    pub fn trend(self) -> &'static dyn ProxyScorer {
        match self {
            ScorerImpl::Optimized => &TrendOptimized,
            ScorerImpl::Reference => &TrendReference,
        }
    }

    pub fn volatility(self) -> &'static dyn ProxyScorer {
        match self {
            ScorerImpl::Optimized => &VolatilityOptimized,
            ScorerImpl::Reference => &VolatilityReference,
        }
    }

    pub fn activity(self) -> &'static dyn ProxyScorer {
        match self {
            ScorerImpl::Optimized => &ActivityOptimized,
            ScorerImpl::Reference => &ActivityReference,
        }
    }
}

#[cfg(not(feature = "reference-scorers"))]
pub type DefaultTrendScorer = TrendOptimized;
#[cfg(feature = "reference-scorers")]
pub type DefaultTrendScorer = TrendReference;

#[cfg(not(feature = "reference-scorers"))]
pub type DefaultVolatilityScorer = VolatilityOptimized;
#[cfg(feature = "reference-scorers")]
pub type DefaultVolatilityScorer = VolatilityReference;

#[cfg(not(feature = "reference-scorers"))]
pub type DefaultActivityScorer = ActivityOptimized;
#[cfg(feature = "reference-scorers")]
pub type DefaultActivityScorer = ActivityReference;

/// Score vectors from all three proxies.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProxyScores {
    pub trend: Vec<f64>,
    pub volatility: Vec<f64>,
    pub activity: Vec<f64>,
}

/// Run all three proxies, each over its own parameter matrix.
pub fn score_all(
    bars: &BarSeries<'_>,
    trend_params: &ParamMatrix,
    volatility_params: &ParamMatrix,
    activity_params: &ParamMatrix,
    imp: ScorerImpl,
) -> ProxyScores {
    score_with(
        [imp.trend(), imp.volatility(), imp.activity()],
        bars,
        [trend_params, volatility_params, activity_params],
    )
}

/// [`score_all`] with the build-time `Default*Scorer` implementations.
pub fn score_all_default(
    bars: &BarSeries<'_>,
    trend_params: &ParamMatrix,
    volatility_params: &ParamMatrix,
    activity_params: &ParamMatrix,
) -> ProxyScores {
    score_with(
        [
            &DefaultTrendScorer {},
            &DefaultVolatilityScorer {},
            &DefaultActivityScorer {},
        ],
        bars,
        [trend_params, volatility_params, activity_params],
    )
}

/// Scorers and matrices in trend, volatility, activity order.
fn score_with(
    scorers: [&dyn ProxyScorer; 3],
    bars: &BarSeries<'_>,
    params: [&ParamMatrix; 3],
) -> ProxyScores {
    let [trend_scorer, volatility_scorer, activity_scorer] = scorers;
    let [trend_params, volatility_params, activity_params] = params;
    let (trend, (volatility, activity)) = rayon::join(
        || trend_scorer.score(bars, trend_params),
        || {
            rayon::join(
                || volatility_scorer.score(bars, volatility_params),
                || activity_scorer.score(bars, activity_params),
            )
        },
    );
    ProxyScores {
        trend,
        volatility,
        activity,
    }
}

/// Collapse any non-finite result to the invalid sentinel so NaN never escapes.
pub(crate) fn finite_or_invalid(score: f64) -> f64 {
    if score.is_finite() {
        score
    } else {
        INVALID_SCORE
    }
}

/// Mean of `values[end + 1 - len..=end]`, summed left to right.
#[inline]
pub(crate) fn window_mean(values: &[f64], end: usize, len: usize) -> f64 {
    let mut acc = 0.0;
    for &v in &values[end + 1 - len..=end] {
        acc += v;
    }
    acc / len as f64
}

/// Trailing means for every complete window; `out[k]` ends at bar `k + len - 1`.
pub fn rolling_mean(values: &[f64], len: usize) -> Vec<f64> {
    if len == 0 || len > values.len() {
        return Vec::new();
    }
    (len - 1..values.len())
        .map(|end| window_mean(values, end, len))
        .collect()
}

/// Sliding-window extreme via a monotonic deque; `out[k]` covers
/// `values[k..k + len]`. `evicts(new, old)` is true when `new` dominates `old`.
fn rolling_extreme(values: &[f64], len: usize, evicts: fn(f64, f64) -> bool) -> Vec<f64> {
    let n = values.len();
    if len == 0 || len > n {
        return Vec::new();
    }
    let mut out = Vec::with_capacity(n - len + 1);
    let mut window: VecDeque<usize> = VecDeque::with_capacity(len);
    for i in 0..n {
        while let Some(&back) = window.back() {
            if evicts(values[i], values[back]) {
                window.pop_back();
            } else {
                break;
            }
        }
        window.push_back(i);
        if let Some(&front) = window.front() {
            if front + len <= i {
                window.pop_front();
            }
        }
        if i + 1 >= len {
            out.push(values[window[0]]);
        }
    }
    out
}

pub fn rolling_max(values: &[f64], len: usize) -> Vec<f64> {
    rolling_extreme(values, len, |new, old| new >= old)
}

pub fn rolling_min(values: &[f64], len: usize) -> Vec<f64> {
    rolling_extreme(values, len, |new, old| new <= old)
}

/// True range per bar. The first bar has no previous close and uses high - low.
pub fn true_range(bars: &BarSeries<'_>) -> Vec<f64> {
    let (high, low, close) = (bars.high(), bars.low(), bars.close());
    (0..bars.len())
        .map(|t| {
            let range = high[t] - low[t];
            if t == 0 {
                range
            } else {
                let pc = close[t - 1];
                range.max((high[t] - pc).abs()).max((low[t] - pc).abs())
            }
        })
        .collect()
}
