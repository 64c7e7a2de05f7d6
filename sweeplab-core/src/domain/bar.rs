//! Bar series: the read-only OHLC input shared by every stage.

use thiserror::Error;

/// Structural problems with a bar series. Fatal for the whole run.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum BarError {
    #[error("OHLC length mismatch: open={open}, high={high}, low={low}, close={close}")]
    LengthMismatch {
        open: usize,
        high: usize,
        low: usize,
        close: usize,
    },
    #[error("non-finite {series} price at bar {index}: {value}")]
    NonFinite {
        series: &'static str,
        index: usize,
        value: f64,
    },
}

/// Borrowed view over one asset's OHLC arrays.
///
/// The caller owns the arrays; every component borrows the same view. Construction
/// checks the structural contract (equal lengths, finite prices). The
/// `low <= min(open, close)` / `high >= max(open, close)` relation is assumed to
/// hold upstream and is not checked.
#[derive(Debug, Clone, Copy)]
pub struct BarSeries<'a> {
    open: &'a [f64],
    high: &'a [f64],
    low: &'a [f64],
    close: &'a [f64],
}

impl<'a> BarSeries<'a> {
    pub fn new(
        open: &'a [f64],
        high: &'a [f64],
        low: &'a [f64],
        close: &'a [f64],
    ) -> Result<Self, BarError> {
        let n = open.len();
        if high.len() != n || low.len() != n || close.len() != n {
            return Err(BarError::LengthMismatch {
                open: open.len(),
                high: high.len(),
                low: low.len(),
                close: close.len(),
            });
        }

        for (series, values) in [("open", open), ("high", high), ("low", low), ("close", close)] {
            if let Some((index, &value)) = values.iter().enumerate().find(|(_, v)| !v.is_finite())
            {
                return Err(BarError::NonFinite {
                    series,
                    index,
                    value,
                });
            }
        }

        Ok(Self {
            open,
            high,
            low,
            close,
        })
    }

    pub fn len(&self) -> usize {
        self.close.len()
    }

    pub fn is_empty(&self) -> bool {
        self.close.is_empty()
    }

    pub fn open(&self) -> &'a [f64] {
        self.open
    }

    pub fn high(&self) -> &'a [f64] {
        self.high
    }

    pub fn low(&self) -> &'a [f64] {
        self.low
    }

    pub fn close(&self) -> &'a [f64] {
        self.close
    }

    /// Index of the final bar, if any.
    pub fn last_index(&self) -> Option<usize> {
        self.len().checked_sub(1)
    }
}

/// Owned OHLC arrays, for callers (and tests) that need to build a series.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct OhlcData {
    pub open: Vec<f64>,
    pub high: Vec<f64>,
    pub low: Vec<f64>,
    pub close: Vec<f64>,
}

impl OhlcData {
    /// Synthesize bars from closes: open = previous close (or close for the
    /// first bar), high/low = max/min(open, close) ± `spread`.
    pub fn from_closes(closes: &[f64], spread: f64) -> Self {
        let mut data = Self::default();
        for (i, &close) in closes.iter().enumerate() {
            let open = if i == 0 { close } else { closes[i - 1] };
            data.open.push(open);
            data.high.push(open.max(close) + spread);
            data.low.push(open.min(close) - spread);
            data.close.push(close);
        }
        data
    }

    pub fn series(&self) -> Result<BarSeries<'_>, BarError> {
        BarSeries::new(&self.open, &self.high, &self.low, &self.close)
    }
}
