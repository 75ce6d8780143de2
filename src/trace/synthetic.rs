//! Synthetic traces built from branches with pre-determined behavior.

use rand::{ Rng, SeedableRng };
use rand::rngs::StdRng;
use serde::{ Deserialize, Serialize };

use crate::branch::*;
use crate::trace::Trace;

/// A pre-determined pattern of outcomes associated with a branch.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BranchPattern {
    /// A branch whose outcome is always 'taken'.
    AlwaysTaken,

    /// A branch whose outcome is always 'not-taken'.
    NeverTaken,

    /// A branch whose outcome is only periodically "taken".
    /// Otherwise, the branch is "not-taken" by default.
    TakenPeriodic(usize),

    /// A branch whose outcome is only periodically "not-taken".
    /// Otherwise, the branch is "taken" by default.
    NotTakenPeriodic(usize),

    /// A branch with an arbitrary repeating pattern of outcomes.
    Pattern(Vec<Outcome>),

    /// A branch which is taken with some probability.
    Random(f64),
}
impl BranchPattern {
    /// Given the number of previous executions of this branch, generate an
    /// outcome.
    pub fn outcome(&self, ctr: usize, rng: &mut impl Rng) -> Outcome {
        match self {
            Self::AlwaysTaken => Outcome::T,
            Self::NeverTaken => Outcome::N,
            Self::TakenPeriodic(p) => {
                Outcome::from(*p > 0 && ctr % p == (p - 1))
            },
            Self::NotTakenPeriodic(p) => {
                Outcome::from(!(*p > 0 && ctr % p == (p - 1)))
            },
            Self::Pattern(p) => {
                if p.is_empty() { Outcome::N } else { p[ctr % p.len()] }
            },
            Self::Random(prob) => Outcome::from(rng.gen_bool(prob.clamp(0.0, 1.0))),
        }
    }
}

/// A branch in a synthetic program.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SyntheticBranch {
    pub pc: usize,
    pub flags: BranchFlags,
    pub pattern: BranchPattern,
}

/// Builds a trace by executing a list of branches in a loop.
///
/// Each iteration executes every branch once, in the order they were added.
#[derive(Debug)]
pub struct SyntheticTrace {
    branches: Vec<SyntheticBranch>,
    ctr: Vec<usize>,
    rng: StdRng,
}
impl SyntheticTrace {
    pub fn new(seed: u64) -> Self {
        Self {
            branches: Vec::new(),
            ctr: Vec::new(),
            rng: StdRng::seed_from_u64(seed),
        }
    }

    /// Add a conditional branch with some pattern of outcomes.
    pub fn branch(&mut self, pc: usize, pattern: BranchPattern) -> &mut Self {
        self.add(SyntheticBranch {
            pc,
            flags: BranchFlags::new(BranchFlags::DIRECT),
            pattern,
        })
    }

    pub fn add(&mut self, branch: SyntheticBranch) -> &mut Self {
        self.branches.push(branch);
        self.ctr.push(0);
        self
    }

    pub fn num_branches(&self) -> usize { self.branches.len() }

    /// Generate the next event.
    fn step(&mut self, cur: usize) -> BranchEvent {
        let branch = &self.branches[cur];
        let outcome = branch.pattern.outcome(self.ctr[cur], &mut self.rng);
        self.ctr[cur] += 1;
        BranchEvent::new(branch.pc, outcome, branch.flags)
    }

    /// Generate 'len' events.
    pub fn generate(&mut self, len: usize) -> Vec<BranchEvent> {
        if self.branches.is_empty() {
            return Vec::new();
        }
        let n = self.branches.len();
        (0..len).map(|i| self.step(i % n)).collect()
    }

    /// Generate a [Trace] with 'len' events.
    pub fn build(&mut self, name: &str, len: usize) -> Trace {
        Trace::new(name, self.generate(len))
    }
}
