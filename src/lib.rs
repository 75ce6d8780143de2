//! Trace-driven evaluation of gshare and perceptron branch predictors.

pub mod branch;
pub mod history;
pub mod error;
pub mod config;
pub mod predictor;
pub mod confidence;
pub mod stats;
pub mod eval;
pub mod trace;
pub mod report;
pub mod sweep;

pub use branch::*;
pub use history::*;
pub use predictor::*;
pub use eval::*;
pub use trace::*;
