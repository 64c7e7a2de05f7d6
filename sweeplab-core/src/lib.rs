//! SweepLab Core: Stage-0 proxy scoring and the Stage-2 order-matching engine.
//!
//! This crate contains the numeric heart of the parameter funnel:
//! - Domain types (bar series, parameter matrix, order intents, fills)
//! - Proxy scorers (trend, volatility, activity), each with an optimized and a
//!   reference implementation behind one trait
//! - Trigger test and bar-by-bar order-matching simulator
//! - Round-trip pairing and metrics aggregation against a fixed column schema
//! - Deterministic parameter subsampling

pub mod aggregate;
pub mod domain;
pub mod engine;
pub mod proxy;
pub mod schema;
pub mod subsample;

pub use aggregate::aggregate;
pub use domain::{BarError, BarSeries, Fill, OrderIntent, ParamMatrix};
pub use engine::simulate;
pub use proxy::{ProxyScorer, ScorerImpl};
pub use schema::MetricsRow;
pub use subsample::{select, SubsampleError};

#[cfg(test)]
mod tests {
    use super::*;

    /// Compile-time check: everything shared across worker threads is Send + Sync.
    #[allow(dead_code)]
    fn assert_send_sync() {
        fn require_send<T: Send>() {}
        fn require_sync<T: Sync>() {}

        require_send::<BarSeries<'static>>();
        require_sync::<BarSeries<'static>>();
        require_send::<ParamMatrix>();
        require_sync::<ParamMatrix>();
        require_send::<OrderIntent>();
        require_sync::<OrderIntent>();
        require_send::<Fill>();
        require_sync::<Fill>();
        require_send::<MetricsRow>();
        require_sync::<MetricsRow>();

        require_send::<proxy::TrendOptimized>();
        require_sync::<proxy::TrendOptimized>();
        require_send::<proxy::VolatilityOptimized>();
        require_sync::<proxy::VolatilityOptimized>();
        require_send::<proxy::ActivityOptimized>();
        require_sync::<proxy::ActivityOptimized>();
        require_send::<proxy::ProxyScores>();
        require_sync::<proxy::ProxyScores>();
    }

    /// Architecture contract: the simulator sees bars and intents only.
    ///
    /// No cost model, no position state, no kernel. If the signature grows one
    /// of those, this stops compiling.
    #[test]
    fn simulator_signature_is_pure() {
        fn _check(bars: &BarSeries<'_>, intents: &[OrderIntent]) -> Vec<Fill> {
            simulate(bars, intents, -1)
        }
    }

    #[test]
    fn scorers_are_usable_as_trait_objects() {
        let scorers: [&dyn ProxyScorer; 3] = [
            ScorerImpl::Optimized.trend(),
            ScorerImpl::Reference.volatility(),
            ScorerImpl::default().activity(),
        ];
        let names: Vec<&str> = scorers.iter().map(|s| s.name()).collect();
        assert_eq!(names, vec!["trend", "volatility", "activity"]);
    }
}
