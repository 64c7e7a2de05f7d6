//! Stage-2 engine: trigger test, order-matching simulator, round-trip pairing.
//!
//! The simulator is a pure function of `(bars, intents, default_ttl)`. It knows
//! nothing about positions; pairing fills into trades happens afterwards.

pub mod pairing;
pub mod simulator;
pub mod trigger;

pub use pairing::{chronological, pair_fills, Pairing, RoundTrip};
pub use simulator::{effective_ttl, simulate};
pub use trigger::check_trigger;
