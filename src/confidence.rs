//! Running estimates of prediction confidence.

use serde::Serialize;
use crate::predictor::{ SaturatingCounter, StatefulPredictor };
use crate::Outcome;

/// One row of the confidence series, recorded after each prediction.
#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct ConfidenceRecord {
    /// Number of predictions made so far (starting at 1)
    pub index: u64,

    /// Fraction of correct predictions so far
    pub accuracy: f64,

    /// Average output magnitude so far
    pub avg_magnitude: f64,

    /// State of the saturating confidence counter, in `[0, 3]`
    pub saturation: u8,
}

/// A destination for confidence records, fed once per prediction.
pub trait ConfidenceSink {
    fn record(&mut self, rec: ConfidenceRecord);
}
impl ConfidenceSink for Vec<ConfidenceRecord> {
    fn record(&mut self, rec: ConfidenceRecord) { self.push(rec); }
}

/// Tracks accuracy, average output magnitude, and a 2-bit saturating
/// counter which moves up on correct predictions and down on mispredictions.
#[derive(Clone, Debug)]
pub struct ConfidenceTracker {
    total: u64,
    correct: u64,
    magnitude: u64,
    counter: SaturatingCounter,
}
impl ConfidenceTracker {
    pub fn new() -> Self {
        Self {
            total: 0,
            correct: 0,
            magnitude: 0,
            counter: SaturatingCounter::two_bit(),
        }
    }

    pub fn total(&self) -> u64 { self.total }
    pub fn saturation(&self) -> u8 { self.counter.state() }

    /// Account for a single prediction.
    pub fn observe(&mut self, correct: bool, magnitude: u32) -> ConfidenceRecord {
        self.total += 1;
        if correct { self.correct += 1; }
        self.magnitude += magnitude as u64;
        // Correct predictions count as 'taken' for the counter.
        self.counter.update(Outcome::from(correct));

        let n = self.total as f64;
        ConfidenceRecord {
            index: self.total,
            accuracy: self.correct as f64 / n,
            avg_magnitude: self.magnitude as f64 / n,
            saturation: self.counter.state(),
        }
    }
}
impl Default for ConfidenceTracker {
    fn default() -> Self { Self::new() }
}
