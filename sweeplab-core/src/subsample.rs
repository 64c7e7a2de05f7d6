//! Deterministic parameter subsampling.
//!
//! Picks `round(n * rate)` row positions (at least one when `n > 0`) without
//! replacement. The RNG seed is derived from `(seed, n_params)` via BLAKE3, so
//! the selection depends only on those inputs and the rate, never on thread
//! scheduling or call order.

use rand::rngs::StdRng;
use rand::SeedableRng;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum SubsampleError {
    #[error("param subsample rate must be in (0, 1], got {0}")]
    InvalidRate(f64),
}

pub fn validate_rate(rate: f64) -> Result<(), SubsampleError> {
    if rate.is_finite() && rate > 0.0 && rate <= 1.0 {
        Ok(())
    } else {
        Err(SubsampleError::InvalidRate(rate))
    }
}

/// Number of positions [`select`] returns for a validated rate.
pub fn selection_size(n_params: usize, rate: f64) -> usize {
    if n_params == 0 {
        return 0;
    }
    let k = (n_params as f64 * rate).round() as usize;
    k.clamp(1, n_params)
}

/// Derive the RNG seed for one selection.
fn derive_seed(seed: u64, n_params: usize) -> u64 {
    let mut hasher = blake3::Hasher::new();
    hasher.update(b"sweeplab/param-subsample");
    hasher.update(&seed.to_le_bytes());
    hasher.update(&(n_params as u64).to_le_bytes());
    let hash = hasher.finalize();
    let mut first = [0u8; 8];
    first.copy_from_slice(&hash.as_bytes()[..8]);
    u64::from_le_bytes(first)
}

/// Select positions in `0..n_params`, returned in ascending order.
///
/// `rate == 1.0` returns every position without touching the RNG.
pub fn select(n_params: usize, rate: f64, seed: u64) -> Result<Vec<usize>, SubsampleError> {
    validate_rate(rate)?;
    if rate == 1.0 {
        return Ok((0..n_params).collect());
    }
    let k = selection_size(n_params, rate);
    let mut rng = StdRng::seed_from_u64(derive_seed(seed, n_params));
    let mut picked = rand::seq::index::sample(&mut rng, n_params, k).into_vec();
    picked.sort_unstable();
    Ok(picked)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn full_rate_selects_everything() {
        assert_eq!(select(7, 1.0, 99).unwrap(), (0..7).collect::<Vec<_>>());
        assert!(select(0, 1.0, 99).unwrap().is_empty());
    }

    #[test]
    fn selection_is_deterministic() {
        let a = select(1000, 0.05, 42).unwrap();
        let b = select(1000, 0.05, 42).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn selection_is_sorted_and_unique() {
        let picked = select(500, 0.3, 7).unwrap();
        assert!(picked.windows(2).all(|w| w[0] < w[1]));
        assert!(picked.iter().all(|&i| i < 500));
    }

    #[test]
    fn selection_size_is_rounded_rate() {
        assert_eq!(select(1000, 0.05, 42).unwrap().len(), 50);
        assert_eq!(select(10, 0.25, 1).unwrap().len(), 3);
        assert_eq!(selection_size(10, 0.24), 2);
    }

    #[test]
    fn tiny_rate_still_selects_one() {
        assert_eq!(select(10, 0.001, 3).unwrap().len(), 1);
        assert!(select(0, 0.5, 3).unwrap().is_empty());
    }

    #[test]
    fn different_seeds_pick_different_rows() {
        assert_ne!(select(1000, 0.1, 1).unwrap(), select(1000, 0.1, 2).unwrap());
    }

    #[test]
    fn invalid_rates_are_rejected() {
        for rate in [0.0, -0.1, 1.5, f64::NAN, f64::INFINITY] {
            assert!(select(10, rate, 0).is_err(), "rate {rate}");
        }
        assert!(validate_rate(1.0).is_ok());
        assert!(validate_rate(1e-9).is_ok());
    }
}
