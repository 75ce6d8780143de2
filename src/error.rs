//! Error types.

use thiserror::Error;

/// A configuration that cannot be used to build a predictor.
///
/// These are detected before any branch is evaluated.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    #[error("LHR_LENGTH cannot be greater than 64 (got {0})")]
    LocalHistoryLength(usize),

    #[error("GHR_LENGTH cannot be greater than 64 (got {0})")]
    GlobalHistoryLength(usize),

    #[error("HASHING_SCHEME must be between 1 and 9 (inclusive) (got {0})")]
    HashingScheme(u64),

    #[error("NUM_PERCEPTRONS must be non-zero")]
    NoPerceptrons,

    #[error("LHT_SIZE must be non-zero")]
    EmptyLocalHistoryTable,

    #[error("{num_perceptrons} perceptrons of {row_len} weights each do not fit in memory")]
    TableSize { num_perceptrons: usize, row_len: usize },

    #[error("cannot parse '{0}'")]
    Unparsable(String),
}

/// Errors produced at the edges of an evaluation (configuration, trace
/// input, and report output).
#[derive(Debug, Error)]
pub enum Error {
    #[error("invalid configuration: {0}")]
    Config(#[from] ConfigError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("{path}:{line}: {msg}")]
    TraceParse { path: String, line: usize, msg: String },

    #[error("{path}: length {len} is not a multiple of the {record}-byte record size")]
    TraceLength { path: String, len: usize, record: usize },

    #[error("malformed results file: {0}")]
    Results(String),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
