//! SweepLab Runner: grid orchestration on top of `sweeplab-core`.
//!
//! This crate provides:
//! - Grid configuration (serde, loadable from TOML)
//! - The strategy-kernel seam and a built-in channel-breakout kernel
//! - The grid runner: subsampling, param ordering, force close, sequential or
//!   rayon-parallel row evaluation
//! - Perf diagnostics, the debug first-fill channel and the run fingerprint

pub mod config;
pub mod grid;
pub mod kernel;
pub mod perf;

pub use config::{ConfigError, GridConfig, SubsampleConfig};
pub use grid::{
    force_close_fills, param_ranking, run_grid, run_grid_ohlc, FirstFills, GridError, GridResult,
    MetricsMatrix,
};
pub use kernel::{ChannelBreakoutKernel, FnKernel, StrategyKernel};
pub use perf::{run_hash, PerfDiagnostics};
