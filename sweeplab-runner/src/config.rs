//! Grid run configuration.
//!
//! Every knob the grid runner reads lives here as an explicit, serializable
//! field. Missing fields take their defaults, so a TOML file only needs to
//! name what it changes:
//!
//! ```toml
//! sort_params = true
//! commission = 1.0
//!
//! [subsample]
//! rate = 0.05
//! seed = 7
//! ```

use serde::{Deserialize, Serialize};
use thiserror::Error;

use sweeplab_core::subsample::{validate_rate, SubsampleError};

/// Errors from configuration loading and validation.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("subsample config: {0}")]
    Subsample(#[from] SubsampleError),
    #[error("order_qty must be positive, got {0}")]
    InvalidOrderQty(i64),
    #[error("{field} must be finite and non-negative, got {value}")]
    InvalidCost { field: &'static str, value: f64 },
    #[error("parse grid TOML: {0}")]
    Toml(#[from] toml::de::Error),
}

pub const DEFAULT_SUBSAMPLE_SEED: u64 = 42;

/// Deterministic row subsampling.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SubsampleConfig {
    /// Fraction of rows to evaluate, in (0, 1].
    pub rate: f64,
    pub seed: u64,
}

impl Default for SubsampleConfig {
    fn default() -> Self {
        Self {
            rate: 1.0,
            seed: DEFAULT_SUBSAMPLE_SEED,
        }
    }
}

/// Configuration for one [`run_grid`](crate::grid::run_grid) call.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GridConfig {
    pub subsample: SubsampleConfig,
    /// Close positions still open after the last bar at the final close.
    pub force_close_last: bool,
    /// Rank rows by parameter value before subsampling.
    pub sort_params: bool,
    /// Charged once per side of every round trip.
    pub commission: f64,
    /// Charged per unit of quantity, once per side.
    pub slip: f64,
    /// Quantity handed to the kernel for every intent it emits.
    pub order_qty: i64,
    /// TTL for intents with a negative `ttl_bars`; negative means no expiry.
    pub default_ttl: i64,
    pub parallel: bool,
    pub collect_debug: bool,
}

impl Default for GridConfig {
    fn default() -> Self {
        Self {
            subsample: SubsampleConfig::default(),
            force_close_last: false,
            sort_params: false,
            commission: 0.0,
            slip: 0.0,
            order_qty: 1,
            default_ttl: -1,
            parallel: true,
            collect_debug: false,
        }
    }
}

impl GridConfig {
    /// Parse from TOML and validate.
    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        let config: GridConfig = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        validate_rate(self.subsample.rate)?;
        if self.order_qty <= 0 {
            return Err(ConfigError::InvalidOrderQty(self.order_qty));
        }
        for (field, value) in [("commission", self.commission), ("slip", self.slip)] {
            if !value.is_finite() || value < 0.0 {
                return Err(ConfigError::InvalidCost { field, value });
            }
        }
        Ok(())
    }

    pub fn with_subsample(mut self, rate: f64, seed: u64) -> Self {
        self.subsample = SubsampleConfig { rate, seed };
        self
    }

    pub fn with_parallelism(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }
}
