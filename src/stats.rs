//! Helpers for collecting per-branch statistics.

use std::collections::*;
use bitvec::prelude::*;
use itertools::*;
use serde::Serialize;
use crate::branch::*;

/// Hits and occurrences for one class of branch.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize)]
pub struct ClassData {
    pub occ: u64,
    pub hits: u64,
}

/// Container for statistics recorded for each branch while evaluating some
/// model.
pub struct BranchStats {
    /// Per-branch statistics (indexed by program counter value).
    pub data: BTreeMap<usize, BranchData>,

    /// Per-class statistics.
    pub classes: BTreeMap<BranchClass, ClassData>,
}
impl BranchStats {
    pub fn new() -> Self {
        Self {
            data: BTreeMap::new(),
            classes: BTreeMap::new(),
        }
    }

    /// Account for a single branch and the direction that was predicted.
    pub fn update(&mut self, event: &BranchEvent, prediction: Outcome) {
        let hit = prediction == event.outcome;
        let data = self.get_mut(event.pc);
        data.occ += 1;
        data.pat.push(event.outcome.into());
        if hit { data.hits += 1; }

        let class = self.classes.entry(event.class()).or_default();
        class.occ += 1;
        if hit { class.hits += 1; }
    }

    /// Returns a reference to data collected for a particular branch.
    pub fn get(&self, pc: usize) -> Option<&BranchData> {
        self.data.get(&pc)
    }

    /// Returns a mutable reference to data collected for a particular branch.
    /// Creates a new entry if one doesn't already exist.
    pub fn get_mut(&mut self, pc: usize) -> &mut BranchData {
        self.data.entry(pc).or_default()
    }

    /// Returns the number of unique observed branch instructions.
    pub fn num_unique_branches(&self) -> usize {
        self.data.len()
    }

    /// Returns the number of branches that are always taken
    pub fn num_always_taken(&self) -> usize {
        self.data.values().filter(|entry| entry.is_always_taken()).count()
    }

    /// Returns the number of branches that are never taken
    pub fn num_never_taken(&self) -> usize {
        self.data.values().filter(|entry| entry.is_never_taken()).count()
    }

    /// Returns the 'n' most frequently executed branches.
    pub fn get_common_branches(&self, n: usize) -> Vec<(usize, &BranchData)> {
        self.data.iter()
            .sorted_by(|x, y| x.1.occ.cmp(&y.1.occ).then(y.0.cmp(x.0)))
            .rev()
            .take(n)
            .map(|(pc, s)| (*pc, s))
            .collect()
    }

    /// Returns up to 'n' of the most frequently executed branches which
    /// occur more than 100 times and are predicted correctly no more than
    /// 55% of the time.
    pub fn get_low_rate_branches(&self, n: usize)
        -> Vec<(usize, &BranchData)>
    {
        self.data.iter()
            .filter(|(_, s)| {
                s.occ > 100 && s.hit_rate() <= 0.55
            })
            .sorted_by(|x, y| x.1.occ.cmp(&y.1.occ).then(y.0.cmp(x.0)))
            .rev()
            .take(n)
            .map(|(pc, s)| (*pc, s))
            .collect()
    }
}
impl Default for BranchStats {
    fn default() -> Self { Self::new() }
}

/// Container for per-branch statistics.
#[derive(Default)]
pub struct BranchData {
    /// Number of times this branch was encountered.
    pub occ: usize,

    /// Number of correct predictions for this branch.
    pub hits: usize,

    /// Record of all observed outcomes for this branch.
    pub pat: BitVec,
}
impl BranchData {
    /// Return the hit rate for this branch.
    pub fn hit_rate(&self) -> f64 {
        if self.occ == 0 { return 0.0; }
        self.hits as f64 / self.occ as f64
    }

    pub fn is_always_taken(&self) -> bool {
        self.pat.count_ones() == self.pat.len()
    }

    pub fn is_never_taken(&self) -> bool {
        self.pat.count_zeros() == self.pat.len()
    }

    pub fn times_taken(&self) -> usize {
        self.pat.count_ones()
    }

    /// Format the most recent 'n' outcomes, oldest first.
    pub fn recent_pattern(&self, n: usize) -> String {
        let start = self.pat.len().saturating_sub(n);
        self.pat[start..].iter().by_vals()
            .map(|b| if b { '1' } else { '0' })
            .collect()
    }

    // NOTE: Remember that this isn't too useful apart from telling you
    // whether some sequence of outcomes is mixed or uniform.
    pub fn shannon_entropy(&self) -> f64 {
        let n   = self.pat.len() as f64;
        let n_t = self.pat.count_ones();
        let n_f = self.pat.count_zeros();

        let p_t = (n_t as f64) / n;
        let p_f = (n_f as f64) / n;

        let res = -(p_t * p_t.log2() + p_f * p_f.log2());
        if res.is_nan() { 0.0 } else { res }
    }
}
