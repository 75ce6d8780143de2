//! Configuration for the predictors and for an evaluation run.
//!
//! Defaults match the command-line knobs of the evaluation tools.

use serde::{ Deserialize, Serialize };
use crate::error::ConfigError;
use crate::history::MAX_HISTORY_BITS;
use crate::predictor::hashing::HashingScheme;

/// Options that apply to a whole run, independent of the predictor.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RunConfig {
    /// Base path for output files
    pub output: String,

    /// Append the process id to output paths
    pub append_pid: bool,

    /// Stop after this many branches (0 is unlimited)
    pub branch_limit: u64,

    /// Write the results as JSON instead of text
    pub json: bool,
}
impl Default for RunConfig {
    fn default() -> Self {
        Self {
            output: String::from("branch_predictor.out"),
            append_pid: false,
            branch_limit: 0,
            json: false,
        }
    }
}

/// Configuration for the gshare predictor.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GshareConfig {
    /// XOR the global history into the table index. When disabled, the
    /// table is indexed with the program counter alone.
    pub use_ghr: bool,
}
impl Default for GshareConfig {
    fn default() -> Self {
        Self { use_ghr: true }
    }
}

/// Initial values for perceptron weights.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WeightInit {
    /// All weights start at zero.
    Zero,
    /// Each weight is drawn uniformly from `{-1, 0, 1}`.
    Random { seed: u64 },
}
impl Default for WeightInit {
    fn default() -> Self {
        Self::Random { seed: 1 }
    }
}

/// Configuration for the perceptron predictor.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(default)]
pub struct PerceptronConfig {
    /// Number of rows in the perceptron table
    pub num_perceptrons: usize,

    /// Global history length in bits
    pub ghr_length: usize,

    /// Local history length in bits
    pub lhr_length: usize,

    /// Number of registers in the local history table
    pub lht_size: usize,

    /// Hashing scheme number (1-9)
    pub hashing_scheme: u64,

    /// Record confidence statistics for every prediction
    pub confidence: bool,

    /// Initial values for the weights
    pub weight_init: WeightInit,
}
impl Default for PerceptronConfig {
    fn default() -> Self {
        Self {
            num_perceptrons: 1024,
            ghr_length: 24,
            lhr_length: 8,
            lht_size: 1024,
            hashing_scheme: 3,
            confidence: false,
            weight_init: WeightInit::default(),
        }
    }
}

impl PerceptronConfig {
    /// Check this configuration and return the selected [HashingScheme].
    pub fn validate(&self) -> Result<HashingScheme, ConfigError> {
        if self.lhr_length > MAX_HISTORY_BITS {
            return Err(ConfigError::LocalHistoryLength(self.lhr_length));
        }
        if self.ghr_length > MAX_HISTORY_BITS {
            return Err(ConfigError::GlobalHistoryLength(self.ghr_length));
        }
        let scheme = HashingScheme::try_from(self.hashing_scheme)?;
        if self.num_perceptrons == 0 {
            return Err(ConfigError::NoPerceptrons);
        }
        if self.lht_size == 0 {
            return Err(ConfigError::EmptyLocalHistoryTable);
        }
        if self.num_perceptrons.checked_mul(self.row_len()).is_none() {
            return Err(ConfigError::TableSize {
                num_perceptrons: self.num_perceptrons,
                row_len: self.row_len(),
            });
        }
        Ok(scheme)
    }

    /// Number of inputs to each perceptron (excluding the bias).
    pub fn num_features(&self) -> usize {
        self.ghr_length + self.lhr_length
    }

    /// Number of weights in each row of the table (including the bias).
    pub fn row_len(&self) -> usize {
        self.num_features() + 1
    }

    /// Training threshold.
    /// Papers suggest this constant (based on the history size).
    pub fn threshold(&self) -> i32 {
        (1.93f64 * self.num_features() as f64 + 14.0f64).round() as i32
    }
}
