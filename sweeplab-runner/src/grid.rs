//! Grid runner: evaluate a kernel over a parameter matrix.
//!
//! Pipeline per selected row:
//!
//! ```text
//! row → kernel → intents → simulate → fills → [force close] → aggregate → MetricsRow
//! ```
//!
//! Rows are independent. With `parallel` they run on the rayon pool, and
//! results are written back by original row index, so parallel and sequential
//! runs are bit-identical.

use std::cmp::Ordering;

use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, info, warn};

use sweeplab_core::aggregate::aggregate;
use sweeplab_core::domain::{BarError, BarSeries, Fill, OhlcData, OrderKind, OrderRole, ParamMatrix};
use sweeplab_core::engine::{pair_fills, simulate};
use sweeplab_core::schema::{MetricsRow, NUM_METRIC_COLS};
use sweeplab_core::subsample::{select, SubsampleError};

use crate::config::{ConfigError, GridConfig};
use crate::kernel::StrategyKernel;
use crate::perf::{run_hash, PerfDiagnostics};

#[derive(Debug, Error)]
pub enum GridError {
    #[error("config error: {0}")]
    Config(#[from] ConfigError),
    #[error("bar series error: {0}")]
    Bars(#[from] BarError),
    #[error("subsample error: {0}")]
    Subsample(#[from] SubsampleError),
}

/// Row-major `n_rows × NUM_METRIC_COLS` metrics, indexed by original row.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetricsMatrix {
    data: Vec<f64>,
    n_rows: usize,
}

impl MetricsMatrix {
    pub fn zeros(n_rows: usize) -> Self {
        Self {
            data: vec![0.0; n_rows * NUM_METRIC_COLS],
            n_rows,
        }
    }

    pub fn n_rows(&self) -> usize {
        self.n_rows
    }

    pub fn row(&self, i: usize) -> &[f64] {
        &self.data[i * NUM_METRIC_COLS..(i + 1) * NUM_METRIC_COLS]
    }

    pub fn get(&self, i: usize, col: usize) -> f64 {
        self.data[i * NUM_METRIC_COLS + col]
    }

    pub fn metrics_row(&self, i: usize) -> Option<MetricsRow> {
        MetricsRow::from_slice(self.row(i))
    }

    pub fn as_slice(&self) -> &[f64] {
        &self.data
    }

    fn set_row(&mut self, i: usize, row: &MetricsRow) {
        self.data[i * NUM_METRIC_COLS..(i + 1) * NUM_METRIC_COLS].copy_from_slice(&row.to_array());
    }
}

/// First entry and first exit fill of one row, as `(bar_index, price)`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct FirstFills {
    pub entry: Option<(usize, f64)>,
    pub exit: Option<(usize, f64)>,
}

impl FirstFills {
    fn from_fills(fills: &[Fill]) -> Self {
        let first = |role| {
            fills
                .iter()
                .find(|f| f.role == role)
                .map(|f| (f.bar_index, f.price))
        };
        Self {
            entry: first(OrderRole::Entry),
            exit: first(OrderRole::Exit),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GridResult {
    pub metrics: MetricsMatrix,
    pub perf: PerfDiagnostics,
    /// Present when `collect_debug` is set; `None` at unselected rows.
    pub debug_fills_first: Option<Vec<Option<FirstFills>>>,
}

/// What one row contributes to the grid.
struct RowOutcome {
    metrics: MetricsRow,
    intents: u64,
    fills: u64,
    forced: u64,
    first_fills: Option<FirstFills>,
}

/// Synthetic exits for every entry FIFO pairing leaves open, on the last bar
/// at the last close. Ids count down from `u64::MAX` so they sort after any
/// kernel id on that bar.
pub fn force_close_fills(bars: &BarSeries<'_>, fills: &[Fill]) -> Vec<Fill> {
    let Some(last) = bars.last_index() else {
        return Vec::new();
    };
    let close = bars.close()[last];
    pair_fills(fills)
        .open_entries
        .iter()
        .enumerate()
        .map(|(k, entry)| Fill {
            bar_index: last,
            order_id: u64::MAX - k as u64,
            role: OrderRole::Exit,
            kind: OrderKind::Market,
            side: entry.side.opposite(),
            price: close,
            qty: entry.qty,
        })
        .collect()
}

fn evaluate_row(
    bars: &BarSeries<'_>,
    row: &[f64],
    kernel: &dyn StrategyKernel,
    config: &GridConfig,
) -> RowOutcome {
    let intents = kernel.intents(bars, row, config.order_qty);
    let mut fills = simulate(bars, &intents, config.default_ttl);

    let mut forced = 0;
    if config.force_close_last {
        let closes = force_close_fills(bars, &fills);
        forced = closes.len() as u64;
        fills.extend(closes);
    }

    RowOutcome {
        metrics: aggregate(&fills, config.commission, config.slip),
        intents: intents.len() as u64,
        fills: fills.len() as u64,
        forced,
        first_fills: config.collect_debug.then(|| FirstFills::from_fills(&fills)),
    }
}

/// Row indices ordered lexicographically by parameter value, ties by index.
pub fn param_ranking(params: &ParamMatrix) -> Vec<usize> {
    let mut order: Vec<usize> = (0..params.n_rows()).collect();
    order.sort_by(|&a, &b| {
        params
            .row(a)
            .iter()
            .zip(params.row(b))
            .map(|(x, y)| x.total_cmp(y))
            .find(|o| *o != Ordering::Equal)
            .unwrap_or(Ordering::Equal)
            .then(a.cmp(&b))
    });
    order
}

/// Original row indices to evaluate, ascending.
fn selected_rows(params: &ParamMatrix, config: &GridConfig) -> Result<Vec<usize>, GridError> {
    let n = params.n_rows();
    let positions = select(n, config.subsample.rate, config.subsample.seed)?;
    if !config.sort_params {
        return Ok(positions);
    }
    let ranking = param_ranking(params);
    debug!(n_params = n, "ranked rows by parameter value");
    let mut rows: Vec<usize> = positions.into_iter().map(|p| ranking[p]).collect();
    rows.sort_unstable();
    Ok(rows)
}

/// Run `kernel` over every selected row of `params`.
pub fn run_grid(
    bars: &BarSeries<'_>,
    params: &ParamMatrix,
    kernel: &dyn StrategyKernel,
    config: &GridConfig,
) -> Result<GridResult, GridError> {
    config.validate()?;

    let n_params = params.n_rows();
    let selected = selected_rows(params, config)?;
    debug!(
        n_params,
        selected = selected.len(),
        rate = config.subsample.rate,
        seed = config.subsample.seed,
        "selected param rows"
    );
    if selected.is_empty() && config.subsample.rate < 1.0 {
        warn!(
            n_params,
            rate = config.subsample.rate,
            "param subsample selected zero rows"
        );
    }

    let run = |&i: &usize| (i, evaluate_row(bars, params.row(i), kernel, config));
    let outcomes: Vec<(usize, RowOutcome)> = if config.parallel {
        selected.par_iter().map(run).collect()
    } else {
        selected.iter().map(run).collect()
    };

    let mut metrics = MetricsMatrix::zeros(n_params);
    let mut mask = vec![false; n_params];
    let mut debug_fills: Option<Vec<Option<FirstFills>>> =
        config.collect_debug.then(|| vec![None; n_params]);
    let (mut intents_total, mut fills_total, mut forced_closes) = (0u64, 0u64, 0u64);

    for (i, outcome) in &outcomes {
        metrics.set_row(*i, &outcome.metrics);
        mask[*i] = true;
        intents_total += outcome.intents;
        fills_total += outcome.fills;
        forced_closes += outcome.forced;
        if let Some(slots) = debug_fills.as_mut() {
            slots[*i] = outcome.first_fills;
        }
    }

    let selected_params_count = selected.len();
    let perf = PerfDiagnostics {
        n_params,
        n_bars: bars.len(),
        intents_total,
        fills_total,
        forced_closes,
        selected_params_count,
        metrics_rows_computed: outcomes.len(),
        param_subsample_rate_configured: config.subsample.rate,
        param_subsample_seed: config.subsample.seed,
        selected_params_ratio: if n_params == 0 {
            0.0
        } else {
            selected_params_count as f64 / n_params as f64
        },
        metrics_computed_mask: mask,
        run_hash: run_hash(bars, params, kernel.name(), config),
    };

    info!(
        kernel = kernel.name(),
        n_params,
        n_bars = perf.n_bars,
        selected_params_count,
        intents_total,
        fills_total,
        forced_closes,
        "grid run complete"
    );

    Ok(GridResult {
        metrics,
        perf,
        debug_fills_first: debug_fills,
    })
}

/// [`run_grid`] over owned OHLC data, validating the series first.
pub fn run_grid_ohlc(
    data: &OhlcData,
    params: &ParamMatrix,
    kernel: &dyn StrategyKernel,
    config: &GridConfig,
) -> Result<GridResult, GridError> {
    let bars = data.series()?;
    run_grid(&bars, params, kernel, config)
}
