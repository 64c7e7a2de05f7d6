//! Per-run performance diagnostics and the run fingerprint.
//!
//! [`PerfDiagnostics`] is written once at the end of a grid run for
//! observability. Nothing in the simulation reads it back.

use serde::{Deserialize, Serialize};

use sweeplab_core::domain::{BarSeries, ParamMatrix};

use crate::config::GridConfig;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PerfDiagnostics {
    pub n_params: usize,
    pub n_bars: usize,
    /// Intents emitted by the kernel across all selected rows.
    pub intents_total: u64,
    /// Fills across all selected rows, forced closes included.
    pub fills_total: u64,
    pub forced_closes: u64,
    pub selected_params_count: usize,
    pub metrics_rows_computed: usize,
    pub param_subsample_rate_configured: f64,
    pub param_subsample_seed: u64,
    /// `selected_params_count / n_params`, 0 for an empty grid.
    pub selected_params_ratio: f64,
    /// `true` at every original row index whose metrics were computed.
    pub metrics_computed_mask: Vec<bool>,
    pub run_hash: String,
}

impl PerfDiagnostics {
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }
}

/// BLAKE3 fingerprint of everything that determines a grid run's output.
///
/// Identical bars, params, kernel name and config always hash the same.
/// `parallel` and `collect_debug` are excluded since they never change the
/// metrics.
pub fn run_hash(
    bars: &BarSeries<'_>,
    params: &ParamMatrix,
    kernel_name: &str,
    config: &GridConfig,
) -> String {
    let mut hasher = blake3::Hasher::new();

    hasher.update(&(bars.len() as u64).to_le_bytes());
    for series in [bars.open(), bars.high(), bars.low(), bars.close()] {
        for v in series {
            hasher.update(&v.to_le_bytes());
        }
    }

    hasher.update(&(params.n_rows() as u64).to_le_bytes());
    hasher.update(&(params.n_cols() as u64).to_le_bytes());
    for v in params.as_slice() {
        hasher.update(&v.to_le_bytes());
    }

    hasher.update(kernel_name.as_bytes());
    hasher.update(&config.subsample.rate.to_le_bytes());
    hasher.update(&config.subsample.seed.to_le_bytes());
    hasher.update(&[u8::from(config.force_close_last), u8::from(config.sort_params)]);
    hasher.update(&config.commission.to_le_bytes());
    hasher.update(&config.slip.to_le_bytes());
    hasher.update(&config.order_qty.to_le_bytes());
    hasher.update(&config.default_ttl.to_le_bytes());

    hasher.finalize().to_hex().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use sweeplab_core::domain::OhlcData;

    fn fixture() -> (OhlcData, ParamMatrix) {
        let data = OhlcData::from_closes(&[100.0, 101.0, 99.5, 102.0], 0.5);
        let params = ParamMatrix::from_rows(&[[2.0, 3.0], [1.0, 2.0]]).unwrap();
        (data, params)
    }

    #[test]
    fn hash_is_stable_and_hex() {
        let (data, params) = fixture();
        let bars = data.series().unwrap();
        let config = GridConfig::default();
        let a = run_hash(&bars, &params, "k", &config);
        let b = run_hash(&bars, &params, "k", &config);
        assert_eq!(a, b);
        assert_eq!(a.len(), 64);
        assert!(a.chars().all(|c| c.is_ascii_hexdigit()));
    }

    #[test]
    fn hash_ignores_parallelism_but_not_costs() {
        let (data, params) = fixture();
        let bars = data.series().unwrap();
        let base = GridConfig::default();
        let h = run_hash(&bars, &params, "k", &base);
        assert_eq!(h, run_hash(&bars, &params, "k", &base.clone().with_parallelism(false)));

        let mut costly = base.clone();
        costly.commission = 1.0;
        assert_ne!(h, run_hash(&bars, &params, "k", &costly));
        assert_ne!(h, run_hash(&bars, &params, "other", &base));
    }

    #[test]
    fn hash_changes_with_data() {
        let (data, params) = fixture();
        let mut moved = data.clone();
        moved.close[3] += 0.01;
        let config = GridConfig::default();
        assert_ne!(
            run_hash(&data.series().unwrap(), &params, "k", &config),
            run_hash(&moved.series().unwrap(), &params, "k", &config),
        );
    }
}
