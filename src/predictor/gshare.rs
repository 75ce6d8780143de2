//! The "gshare" predictor: a table of 2-bit saturating counters indexed by
//! the program counter XOR'ed with global history.
//!
//! See "Combining Branch Predictors" (McFarling, 1993).

use crate::Outcome;
use crate::config::GshareConfig;
use crate::history::HistoryRegister;
use crate::predictor::*;

/// Number of bits in the global history register.
pub const GSHARE_GHR_BITS: usize = 16;

/// Number of entries in the pattern table.
pub const GSHARE_TABLE_SIZE: usize = 1 << GSHARE_GHR_BITS;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct GsharePrediction {
    /// The predicted direction
    pub outcome: Outcome,

    /// The index of the counter used to make this prediction
    pub idx: usize,
}
impl PredictionInfo for GsharePrediction {
    fn outcome(&self) -> Outcome { self.outcome }
}

pub struct GsharePredictor {
    cfg: GshareConfig,

    /// Table of counters
    data: Vec<SaturatingCounter>,

    /// Number of updates made to each counter
    access_counts: Vec<u64>,

    /// Global history
    ghr: HistoryRegister,
}
impl GsharePredictor {
    pub fn new(cfg: GshareConfig) -> Self {
        Self {
            cfg,
            data: vec![SaturatingCounter::two_bit(); GSHARE_TABLE_SIZE],
            access_counts: vec![0; GSHARE_TABLE_SIZE],
            ghr: HistoryRegister::new(GSHARE_GHR_BITS),
        }
    }

    pub fn config(&self) -> &GshareConfig { &self.cfg }

    /// Return the global history register.
    pub fn ghr(&self) -> &HistoryRegister { &self.ghr }

    /// Return the state of the counter at some index.
    pub fn counter(&self, idx: usize) -> u8 {
        self.get_entry(idx).state()
    }

    /// Return the number of updates made to each entry, in index order.
    pub fn access_counts(&self) -> &[u64] { &self.access_counts }

    /// Return the normalized Shannon entropy of the distribution of accesses
    /// over the table. This is 1.0 when every entry was updated equally often,
    /// and approaches 0.0 when all updates land on a single entry.
    pub fn access_entropy(&self) -> f64 {
        normalized_entropy(&self.access_counts)
    }
}

/// Normalized Shannon entropy of some histogram.
/// Returns 0.0 for an empty (or all-zero) histogram.
pub fn normalized_entropy(counts: &[u64]) -> f64 {
    let total: u64 = counts.iter().sum();
    if total == 0 || counts.len() < 2 {
        return 0.0;
    }
    let total = total as f64;
    let h: f64 = counts.iter()
        .filter(|c| **c > 0)
        .map(|c| {
            let p = *c as f64 / total;
            -(p * p.log2())
        })
        .sum();
    h / (counts.len() as f64).log2()
}

impl PredictorTable for GsharePredictor {
    type Input = usize;
    type Entry = SaturatingCounter;

    fn size(&self) -> usize { self.data.len() }

    // The table size is a power of two, so masking is a modulo.
    fn get_index(&self, pc: usize) -> usize {
        let input = if self.cfg.use_ghr {
            (self.ghr.bits() as usize) ^ pc
        } else {
            pc
        };
        input & self.index_mask()
    }

    fn get_entry(&self, idx: usize) -> &SaturatingCounter {
        &self.data[idx & self.index_mask()]
    }

    fn get_entry_mut(&mut self, idx: usize) -> &mut SaturatingCounter {
        let index = idx & self.index_mask();
        &mut self.data[index]
    }
}

impl DirectionPredictor for GsharePredictor {
    type Prediction = GsharePrediction;

    fn name(&self) -> &'static str {
        if self.cfg.use_ghr { "gshare" } else { "bimodal" }
    }

    fn predict(&self, pc: usize) -> GsharePrediction {
        let idx = self.get_index(pc);
        GsharePrediction {
            outcome: self.get_entry(idx).predict(),
            idx,
        }
    }

    fn update(&mut self, _pc: usize, prediction: GsharePrediction, outcome: Outcome) {
        let idx = prediction.idx;
        self.access_counts[idx] += 1;
        self.get_entry_mut(idx).update(outcome);

        // The index was formed with the old history.
        self.ghr.push(outcome);
    }
}


#[cfg(test)]
mod test {
    use super::*;
    use crate::Outcome::*;

    fn step(p: &mut GsharePredictor, pc: usize, outcome: Outcome) -> Outcome {
        let pred = p.predict(pc);
        p.update(pc, pred, outcome);
        pred.outcome
    }

    #[test]
    fn bimodal_learns_taken() {
        let mut p = GsharePredictor::new(GshareConfig { use_ghr: false });
        let preds: Vec<bool> = (0..4)
            .map(|_| step(&mut p, 0x1000, T).into())
            .collect();
        assert_eq!(preds, [false, false, true, true]);
        assert_eq!(p.counter(0x1000), 3);
        assert_eq!(p.access_counts()[0x1000], 4);
        assert_eq!(p.ghr().bits(), 0b1111);
    }

    #[test]
    fn index_uses_history_before_update() {
        let mut p = GsharePredictor::new(GshareConfig::default());
        assert_eq!(p.get_index(0x1234), 0x1234);
        step(&mut p, 0x1234, T);
        // The first update happened at the index formed with ghr == 0
        assert_eq!(p.counter(0x1234), 1);
        assert_eq!(p.get_index(0x1234), 0x1235);
        step(&mut p, 0x1234, T);
        assert_eq!(p.counter(0x1235), 1);
        assert_eq!(p.ghr().bits(), 0b11);
    }

    #[test]
    fn index_is_masked() {
        let mut p = GsharePredictor::new(GshareConfig::default());
        for _ in 0..20 { step(&mut p, usize::MAX, T); }
        assert!(p.get_index(usize::MAX) < GSHARE_TABLE_SIZE);
        assert!(p.ghr().bits() < (1 << 16));
    }

    #[test]
    fn entropy_of_access_counts() {
        assert_eq!(normalized_entropy(&[0, 0, 0, 0]), 0.0);
        assert_eq!(normalized_entropy(&[7, 0, 0, 0]), 0.0);
        assert!((normalized_entropy(&[3, 3, 3, 3]) - 1.0).abs() < 1e-12);
        assert!((normalized_entropy(&[1, 1, 0, 0]) - 0.5).abs() < 1e-12);
    }
}
