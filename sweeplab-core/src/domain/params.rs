//! Parameter matrix: one row per strategy configuration in the sweep.

use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParamMatrixError {
    #[error("buffer of {len} values cannot be shaped as {n_rows} x {n_cols}")]
    ShapeMismatch {
        len: usize,
        n_rows: usize,
        n_cols: usize,
    },
    #[error("row {row} has {found} columns, expected {expected}")]
    RaggedRows {
        row: usize,
        expected: usize,
        found: usize,
    },
}

/// Row-major `n_rows x n_cols` matrix of parameter values.
///
/// Semantics of each column belong to the scorer or kernel reading the row.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParamMatrix {
    data: Vec<f64>,
    n_rows: usize,
    n_cols: usize,
}

impl ParamMatrix {
    pub fn new(data: Vec<f64>, n_rows: usize, n_cols: usize) -> Result<Self, ParamMatrixError> {
        if n_rows.checked_mul(n_cols) != Some(data.len()) {
            return Err(ParamMatrixError::ShapeMismatch {
                len: data.len(),
                n_rows,
                n_cols,
            });
        }
        Ok(Self {
            data,
            n_rows,
            n_cols,
        })
    }

    pub fn from_rows<R: AsRef<[f64]>>(rows: &[R]) -> Result<Self, ParamMatrixError> {
        let n_cols = rows.first().map_or(0, |r| r.as_ref().len());
        let mut data = Vec::with_capacity(rows.len() * n_cols);
        for (row, values) in rows.iter().enumerate() {
            let values = values.as_ref();
            if values.len() != n_cols {
                return Err(ParamMatrixError::RaggedRows {
                    row,
                    expected: n_cols,
                    found: values.len(),
                });
            }
            data.extend_from_slice(values);
        }
        Ok(Self {
            data,
            n_rows: rows.len(),
            n_cols,
        })
    }

    pub fn n_rows(&self) -> usize {
        self.n_rows
    }

    pub fn n_cols(&self) -> usize {
        self.n_cols
    }

    pub fn row(&self, i: usize) -> &[f64] {
        &self.data[i * self.n_cols..(i + 1) * self.n_cols]
    }

    pub fn rows(&self) -> impl ExactSizeIterator<Item = &[f64]> + '_ {
        (0..self.n_rows).map(move |i| self.row(i))
    }

    pub fn as_slice(&self) -> &[f64] {
        &self.data
    }

    /// Distinct window lengths found in column `col` across all rows.
    ///
    /// Values that are not valid lengths are skipped.
    pub fn distinct_lengths(&self, col: usize) -> Vec<usize> {
        if col >= self.n_cols {
            return Vec::new();
        }
        let mut lengths: Vec<usize> = self.rows().filter_map(|r| as_length(r[col])).collect();
        lengths.sort_unstable();
        lengths.dedup();
        lengths
    }
}

/// Interpret a float parameter as a window length: `floor(value)`, which must be
/// finite and at least 1.
pub fn as_length(value: f64) -> Option<usize> {
    if !value.is_finite() {
        return None;
    }
    let floored = value.floor();
    if floored < 1.0 || floored > usize::MAX as f64 {
        return None;
    }
    Some(floored as usize)
}
