//! Implementations of different branch predictors.

pub mod table;
pub mod counter;
pub mod hashing;
pub mod gshare;
pub mod perceptron;

pub use table::*;
pub use counter::*;
pub use hashing::*;
pub use gshare::*;
pub use perceptron::*;

use crate::Outcome;

/// Interface to a predictor with some internal state which is only subject to
/// change by the correct branch outcome.
pub trait StatefulPredictor {
    fn name(&self) -> &'static str;

    /// Reset the internal state of the predictor.
    fn reset(&mut self);

    /// Return the current predicted outcome.
    fn predict(&self) -> Outcome;

    /// Update the internal state of the predictor with the correct outcome.
    fn update(&mut self, outcome: Outcome);
}

/// Information about a prediction made by some [DirectionPredictor].
pub trait PredictionInfo: Copy {
    /// The predicted direction.
    fn outcome(&self) -> Outcome;

    /// Magnitude of the predictor output, for predictors that have one.
    fn magnitude(&self) -> Option<u32> { None }
}

/// Interface to a predictor for the direction of a branch which is indexed
/// by the program counter value.
///
/// A [DirectionPredictor::Prediction] captures whatever state was used to
/// make the prediction (ie. table indexes and history). It must be passed
/// back to [DirectionPredictor::update] for the same branch, before the next
/// branch is predicted.
pub trait DirectionPredictor {
    type Prediction: PredictionInfo;

    fn name(&self) -> &'static str;

    /// Make a prediction for the branch at 'pc'.
    fn predict(&self, pc: usize) -> Self::Prediction;

    /// Given a particular prediction and the resolved outcome, update the
    /// state of the predictor (including any history registers).
    fn update(&mut self, pc: usize, prediction: Self::Prediction, outcome: Outcome);
}
