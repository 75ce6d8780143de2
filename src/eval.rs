//! Trace-driven evaluation of a [DirectionPredictor].

use serde::Serialize;
use tracing::{ debug, warn };

use crate::branch::*;
use crate::confidence::*;
use crate::predictor::*;
use crate::stats::BranchStats;

/// A limit on the number of branches evaluated in a run.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize)]
pub struct BranchLimit(u64);
impl BranchLimit {
    /// A limit of zero means there is no limit.
    pub fn new(limit: u64) -> Self { Self(limit) }
    pub fn unlimited() -> Self { Self(0) }

    pub fn get(&self) -> Option<u64> {
        if self.0 == 0 { None } else { Some(self.0) }
    }

    /// Returns 'true' when exactly 'seen' branches satisfy the limit.
    pub fn is_reached(&self, seen: u64) -> bool {
        self.0 != 0 && seen >= self.0
    }
}

/// Counters accumulated over a run.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize)]
pub struct Counters {
    /// Number of branches evaluated
    pub seen: u64,

    /// Number of taken branches
    pub taken: u64,

    /// Number of correct predictions
    pub correct: u64,
}
impl Counters {
    pub fn record(&mut self, outcome: Outcome, prediction: Outcome) {
        self.seen += 1;
        if outcome.is_taken() { self.taken += 1; }
        if outcome == prediction { self.correct += 1; }
    }

    pub fn mispredicted(&self) -> u64 { self.seen - self.correct }

    /// Return the percentage of correct predictions, or [None] when no
    /// branches have been seen.
    pub fn accuracy(&self) -> Option<f64> {
        if self.seen == 0 { return None; }
        Some(self.correct as f64 / self.seen as f64 * 100.0)
    }

    /// Return the percentage of mispredictions, or [None] when no branches
    /// have been seen.
    pub fn misprediction_rate(&self) -> Option<f64> {
        if self.seen == 0 { return None; }
        Some(self.mispredicted() as f64 / self.seen as f64 * 100.0)
    }
}

/// Why a run stopped.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub enum Termination {
    /// The configured [BranchLimit] was reached.
    #[serde(rename = "limit reached")]
    LimitReached,
    /// The trace was exhausted.
    #[serde(rename = "completed")]
    Completed,
}
impl Termination {
    pub fn reason(&self) -> &'static str {
        match self {
            Self::LimitReached => "limit reached",
            Self::Completed => "completed",
        }
    }
}
impl std::fmt::Display for Termination {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(f, "{}", self.reason())
    }
}

/// The result of evaluating a predictor against some trace.
pub struct RunSummary {
    pub termination: Termination,
    pub counters: Counters,

    /// One record per branch, when confidence estimation is enabled and the
    /// run was made with [Evaluator::run]. Empty when the records were
    /// passed to a [ConfidenceSink].
    pub confidence: Vec<ConfidenceRecord>,

    /// Per-branch statistics, when enabled
    pub branch_stats: Option<BranchStats>,
}

/// Drives a predictor with a stream of branch events.
///
/// For each event: make a prediction, compare it with the outcome, update
/// counters, and then update the predictor. A run stops after exactly
/// [BranchLimit] events when a limit is configured.
#[derive(Clone, Copy, Debug, Default)]
pub struct Evaluator {
    limit: BranchLimit,
    confidence: bool,
    branch_stats: bool,
}
impl Evaluator {
    pub fn new(limit: BranchLimit) -> Self {
        Self { limit, confidence: false, branch_stats: false }
    }

    /// Record a [ConfidenceRecord] for every prediction.
    pub fn with_confidence(mut self, enabled: bool) -> Self {
        self.confidence = enabled;
        self
    }

    /// Collect [BranchStats] for every branch.
    pub fn with_branch_stats(mut self, enabled: bool) -> Self {
        self.branch_stats = enabled;
        self
    }

    pub fn limit(&self) -> BranchLimit { self.limit }

    /// Run to completion, keeping any confidence records in the summary.
    pub fn run<P, I>(&self, predictor: &mut P, events: I) -> RunSummary
        where P: DirectionPredictor,
              I: IntoIterator<Item = BranchEvent>,
    {
        let mut confidence = Vec::new();
        let mut summary = self.run_with_sink(predictor, events, &mut confidence);
        summary.confidence = confidence;
        summary
    }

    /// Run to completion, passing each confidence record to 'sink' as soon
    /// as it is produced.
    pub fn run_with_sink<P, I, S>(&self, predictor: &mut P, events: I, sink: &mut S)
        -> RunSummary
        where P: DirectionPredictor,
              I: IntoIterator<Item = BranchEvent>,
              S: ConfidenceSink + ?Sized,
    {
        let mut counters = Counters::default();
        let mut tracker = ConfidenceTracker::new();
        let mut stats = if self.branch_stats { Some(BranchStats::new()) } else { None };
        let mut termination = Termination::Completed;

        debug!(predictor = predictor.name(), limit = ?self.limit.get(), "starting run");
        for event in events {
            let p = predictor.predict(event.pc);
            let prediction = p.outcome();
            counters.record(event.outcome, prediction);

            if self.confidence {
                let correct = prediction == event.outcome;
                sink.record(tracker.observe(correct, p.magnitude().unwrap_or(0)));
            }
            if let Some(stats) = stats.as_mut() {
                stats.update(&event, prediction);
            }

            predictor.update(event.pc, p, event.outcome);

            if self.limit.is_reached(counters.seen) {
                termination = Termination::LimitReached;
                break;
            }
        }

        if termination == Termination::LimitReached {
            warn!(seen = counters.seen, "branch limit reached");
        }
        RunSummary {
            termination,
            counters,
            confidence: Vec::new(),
            branch_stats: stats,
        }
    }
}
