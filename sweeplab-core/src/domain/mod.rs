//! Domain types for SweepLab

pub mod bar;
pub mod fill;
pub mod order;
pub mod params;

pub use bar::{BarError, BarSeries, OhlcData};
pub use fill::Fill;
pub use order::{OrderIntent, OrderKind, OrderRole, OrderSide};
pub use params::{as_length, ParamMatrix, ParamMatrixError};
