//! Market analysis: the indicator library, risk sizing, composite scoring
//! and the entry-gate analyzers built on top of them.

pub mod analyzer;
pub mod indicators;
pub mod predictor;
pub mod quick;
pub mod risk;
pub mod strength;

pub use analyzer::analyze;
pub use predictor::{predict, Prediction};
pub use quick::quick_scan;
pub use risk::{compute_tp_sl, TpSl};
pub use strength::{composite_strength, StrengthInput};
