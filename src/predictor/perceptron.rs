//! Perceptron predictor [with integer weights], using both global and local
//! history.
//!
//! See the following papers:
//!
//! - "Dynamic Branch Prediction with Perceptrons" (Jiménez and Lin, 2001)
//! - "Neural Methods for Dynamic Branch Prediction" (Jiménez and Lin, 2002)
//!

use rand::{ Rng, SeedableRng };
use rand::rngs::StdRng;

use crate::Outcome;
use crate::config::{ PerceptronConfig, WeightInit };
use crate::error::ConfigError;
use crate::history::*;
use crate::predictor::*;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PerceptronPrediction {
    /// The predicted direction
    pub outcome: Outcome,

    /// The output value (the sign of this determines the outcome)
    pub output: i32,

    /// The perceptron used to make this prediction
    pub row: usize,

    /// The local history register read for this prediction
    pub lht_idx: usize,

    /// Local history used as input
    pub local: u64,

    /// Global history used as input
    pub ghr: u64,
}
impl PredictionInfo for PerceptronPrediction {
    fn outcome(&self) -> Outcome { self.outcome }
    fn magnitude(&self) -> Option<u32> { Some(self.output.unsigned_abs()) }
}

/// Compute the contribution of a set of weights, where each bit in 'history'
/// selects an input of +1 (when set) or -1 (when clear).
#[inline(always)]
fn dot_product(weights: &[i8], history: u64) -> i32 {
    weights.iter().enumerate().fold(0, |sum, (i, w)| {
        let w = *w as i32;
        if (history >> i) & 1 != 0 { sum + w } else { sum - w }
    })
}

/// Move each weight toward agreement between its input bit and the outcome.
#[inline(always)]
fn adjust(weights: &mut [i8], history: u64, t: i8) {
    for (i, w) in weights.iter_mut().enumerate() {
        let adj = if (history >> i) & 1 != 0 { t } else { -t };
        *w = w.saturating_add(adj);
    }
}

/// A table of perceptrons, global history, and a table of local histories.
///
/// Each row of the table holds `ghr_length + lhr_length + 1` weights laid
/// out as `[global..., local..., bias]`.
pub struct PerceptronPredictor {
    cfg: PerceptronConfig,

    /// Selects rows of the table and registers in the local history table
    plan: IndexPlan,

    /// Training threshold
    threshold: i32,

    /// Weights for all perceptrons
    weights: Vec<i8>,

    /// Global history
    ghr: HistoryRegister,

    /// Local history
    lht: LocalHistoryTable,
}
impl PerceptronPredictor {
    /// Validate some configuration and build a predictor.
    pub fn new(cfg: PerceptronConfig) -> Result<Self, ConfigError> {
        let scheme = cfg.validate()?;
        let len = cfg.num_perceptrons * cfg.row_len();
        let weights = match cfg.weight_init {
            WeightInit::Zero => vec![0; len],
            WeightInit::Random { seed } => {
                let mut rng = StdRng::seed_from_u64(seed);
                (0..len).map(|_| rng.gen_range(-1i8..=1)).collect()
            },
        };
        Ok(Self {
            cfg,
            plan: scheme.plan(),
            threshold: cfg.threshold(),
            weights,
            ghr: HistoryRegister::new(cfg.ghr_length),
            lht: LocalHistoryTable::new(cfg.lht_size, cfg.lhr_length),
        })
    }

    pub fn config(&self) -> &PerceptronConfig { &self.cfg }
    pub fn plan(&self) -> &IndexPlan { &self.plan }
    pub fn threshold(&self) -> i32 { self.threshold }
    pub fn ghr(&self) -> &HistoryRegister { &self.ghr }
    pub fn lht(&self) -> &LocalHistoryTable { &self.lht }

    /// Return the local history register at some index.
    pub fn local_history(&self, idx: usize) -> u64 { self.lht.read(idx) }

    /// Number of perceptrons in the table.
    pub fn size(&self) -> usize { self.cfg.num_perceptrons }

    /// Return a reference to the list of weights for one perceptron.
    pub fn weights(&self, row: usize) -> &[i8] {
        let len = self.cfg.row_len();
        &self.weights[row * len..(row + 1) * len]
    }

    /// Return the bias weight for one perceptron.
    pub fn bias(&self, row: usize) -> i8 {
        self.weights(row)[self.cfg.num_features()]
    }

    fn weights_mut(&mut self, row: usize) -> &mut [i8] {
        let len = self.cfg.row_len();
        &mut self.weights[row * len..(row + 1) * len]
    }

    /// Given some inputs, compute the output value of a perceptron.
    pub fn output(&self, row: usize, ghr: u64, local: u64) -> i32 {
        let (global_w, rest) = self.weights(row).split_at(self.cfg.ghr_length);
        let (local_w, bias) = rest.split_at(self.cfg.lhr_length);
        bias[0] as i32 + dot_product(global_w, ghr) + dot_product(local_w, local)
    }

    /// Adjust the weights of the perceptron that made some prediction.
    ///
    /// Training only occurs when the magnitude of the output is at or below
    /// the threshold. Weights saturate at the limits of an [i8].
    pub fn train(&mut self, p: &PerceptronPrediction, outcome: Outcome) {
        if p.output.unsigned_abs() > self.threshold.unsigned_abs() {
            return;
        }
        let t = outcome.sign() as i8;
        let ghr_length = self.cfg.ghr_length;
        let lhr_length = self.cfg.lhr_length;
        let weights = self.weights_mut(p.row);
        let (global_w, rest) = weights.split_at_mut(ghr_length);
        let (local_w, bias) = rest.split_at_mut(lhr_length);
        adjust(global_w, p.ghr, t);
        adjust(local_w, p.local, t);
        bias[0] = bias[0].saturating_add(t);
    }
}

impl DirectionPredictor for PerceptronPredictor {
    type Prediction = PerceptronPrediction;

    fn name(&self) -> &'static str { "perceptron" }

    fn predict(&self, pc: usize) -> PerceptronPrediction {
        let pc = pc as u64;
        let ghr = self.ghr.bits();
        let lht_idx = self.plan.lht_index(pc, ghr, self.lht.size());
        let local = self.lht.read(lht_idx);
        let row = self.plan.perceptron_index(pc, ghr, local, self.size());
        let output = self.output(row, ghr, local);
        PerceptronPrediction {
            outcome: Outcome::from(output >= 0),
            output,
            row,
            lht_idx,
            local,
            ghr,
        }
    }

    fn update(&mut self, _pc: usize, prediction: PerceptronPrediction, outcome: Outcome) {
        self.train(&prediction, outcome);
        self.ghr.push(outcome);
        self.lht.write(prediction.lht_idx, prediction.local, outcome);
    }
}
