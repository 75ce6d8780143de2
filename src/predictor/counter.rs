//! Implementation of a saturating counter.

use crate::Outcome;
use crate::predictor::StatefulPredictor;

/// An N-bit saturating counter used to follow the behavior of a branch.
///
/// The state moves between `0` and `max`. The upper half of the range
/// predicts 'taken': for the usual 2-bit counter (`max == 3`) the states are
/// strongly not-taken, weakly not-taken, weakly taken, and strongly taken.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SaturatingCounter {
    state: u8,
    max: u8,
    init: u8,
}
impl SaturatingCounter {
    /// A counter saturating at 'max' and starting in state 'init'.
    pub fn new(max: u8, init: u8) -> Self {
        assert!(init <= max);
        Self { state: init, max, init }
    }

    /// A 2-bit counter starting in the strongly not-taken state.
    pub fn two_bit() -> Self { Self::new(3, 0) }

    pub fn state(&self) -> u8 { self.state }
    pub fn max(&self) -> u8 { self.max }

    pub fn inc(&mut self) {
        if self.state < self.max { self.state += 1; }
    }

    pub fn dec(&mut self) {
        self.state = self.state.saturating_sub(1);
    }
}

impl StatefulPredictor for SaturatingCounter {
    fn name(&self) -> &'static str { "SaturatingCounter" }

    fn predict(&self) -> Outcome {
        Outcome::from(self.state > self.max / 2)
    }

    fn reset(&mut self) {
        self.state = self.init;
    }

    fn update(&mut self, outcome: Outcome) {
        match outcome {
            Outcome::T => self.inc(),
            Outcome::N => self.dec(),
        }
    }
}


#[cfg(test)]
mod test {
    use super::*;
    use crate::Outcome::*;

    #[test]
    fn two_bit_transitions() {
        let mut c = SaturatingCounter::two_bit();
        assert_eq!(c.predict(), N);
        c.update(T);
        assert_eq!((c.state(), c.predict()), (1, N));
        c.update(T);
        assert_eq!((c.state(), c.predict()), (2, T));
        c.update(T);
        c.update(T);
        assert_eq!((c.state(), c.predict()), (3, T));
        c.update(N);
        assert_eq!((c.state(), c.predict()), (2, T));
        c.update(N);
        c.update(N);
        c.update(N);
        assert_eq!((c.state(), c.predict()), (0, N));
        c.update(T);
        c.reset();
        assert_eq!(c.state(), 0);
    }
}
