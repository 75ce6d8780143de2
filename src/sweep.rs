//! One-factor-at-a-time sweeps over perceptron parameters.
//!
//! Starting from a base configuration, each axis is varied on its own while
//! every other parameter is held at the base value. Each configuration gets
//! its own [PerceptronPredictor] and all of them share the same read-only
//! list of events, so configurations are evaluated in parallel.

use std::collections::BTreeSet;
use std::io::{ BufRead, Write };
use rayon::prelude::*;
use serde::Serialize;
use tracing::{ info, warn };

use crate::branch::*;
use crate::config::*;
use crate::error::{ Error, Result };
use crate::eval::*;
use crate::predictor::*;

/// Header row of a results table.
pub const RESULTS_HEADER: &str =
    "Benchmark,NUM_PERCEPTRONS,GHR_LENGTH,LHR_LENGTH,LHT_SIZE,HASHING_SCHEME,Accuracy";

/// The parameters that distinguish one sweep point from another.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub struct SweepKey {
    pub num_perceptrons: usize,
    pub ghr_length: usize,
    pub lhr_length: usize,
    pub lht_size: usize,
    pub hashing_scheme: u64,
}
impl SweepKey {
    pub fn from_config(cfg: &PerceptronConfig) -> Self {
        Self {
            num_perceptrons: cfg.num_perceptrons,
            ghr_length: cfg.ghr_length,
            lhr_length: cfg.lhr_length,
            lht_size: cfg.lht_size,
            hashing_scheme: cfg.hashing_scheme,
        }
    }

    /// Apply these parameters to some other configuration.
    pub fn apply(&self, base: &PerceptronConfig) -> PerceptronConfig {
        PerceptronConfig {
            num_perceptrons: self.num_perceptrons,
            ghr_length: self.ghr_length,
            lhr_length: self.lhr_length,
            lht_size: self.lht_size,
            hashing_scheme: self.hashing_scheme,
            ..*base
        }
    }
}

/// Values taken along each axis of a sweep.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SweepAxes {
    pub num_perceptrons: Vec<usize>,
    pub ghr_length: Vec<usize>,
    pub lhr_length: Vec<usize>,
    pub lht_size: Vec<usize>,
    pub hashing_scheme: Vec<u64>,
}
impl Default for SweepAxes {
    fn default() -> Self {
        Self {
            num_perceptrons: (5..=15).map(|x| 1usize << x).collect(),
            ghr_length: vec![8, 16, 32, 64],
            lhr_length: vec![8, 16, 32, 64],
            lht_size: (8..=15).map(|x| 1usize << x).collect(),
            hashing_scheme: HashingScheme::all().map(|s| s.get()).collect(),
        }
    }
}

/// The base configuration used for sweeps.
pub fn default_base() -> PerceptronConfig {
    PerceptronConfig {
        num_perceptrons: 1024,
        ghr_length: 32,
        lhr_length: 16,
        lht_size: 4096,
        hashing_scheme: 3,
        ..Default::default()
    }
}

/// An ordered list of configurations to evaluate.
#[derive(Clone, Debug)]
pub struct SweepPlan {
    base: PerceptronConfig,
    points: Vec<SweepKey>,
}
impl SweepPlan {
    /// Build a plan by varying each axis around 'base'. Points in 'skip'
    /// (usually the results of an earlier sweep) are left out, and a point
    /// shared by more than one axis only appears once.
    pub fn new(base: PerceptronConfig, axes: &SweepAxes, skip: &BTreeSet<SweepKey>)
        -> Self
    {
        let b = SweepKey::from_config(&base);
        let candidates = axes.num_perceptrons.iter()
            .map(|&x| SweepKey { num_perceptrons: x, ..b })
            .chain(axes.ghr_length.iter().map(|&x| SweepKey { ghr_length: x, ..b }))
            .chain(axes.lhr_length.iter().map(|&x| SweepKey { lhr_length: x, ..b }))
            .chain(axes.lht_size.iter().map(|&x| SweepKey { lht_size: x, ..b }))
            .chain(axes.hashing_scheme.iter().map(|&x| SweepKey { hashing_scheme: x, ..b }));

        let mut seen = skip.clone();
        let points = candidates.filter(|k| seen.insert(*k)).collect();
        Self { base, points }
    }

    pub fn base(&self) -> &PerceptronConfig { &self.base }
    pub fn points(&self) -> &[SweepKey] { &self.points }
    pub fn len(&self) -> usize { self.points.len() }
    pub fn is_empty(&self) -> bool { self.points.is_empty() }

    /// Evaluate every point in the plan against the same events.
    ///
    /// Results are returned in plan order. Points whose configuration is
    /// invalid are reported and dropped.
    pub fn run(&self, benchmark: &str, events: &[BranchEvent], limit: BranchLimit)
        -> Vec<SweepResult>
    {
        info!(points = self.len(), events = events.len(), "starting sweep");
        let results: Vec<SweepResult> = self.points.par_iter().filter_map(|key| {
            let cfg = key.apply(&self.base);
            let mut p = match PerceptronPredictor::new(cfg) {
                Ok(p) => p,
                Err(e) => {
                    warn!(?key, "skipping configuration: {}", e);
                    return None;
                },
            };
            let summary = Evaluator::new(limit).run(&mut p, events.iter().copied());
            let accuracy = summary.counters.misprediction_rate()
                .map(|r| 100.0 - r);
            Some(SweepResult {
                benchmark: benchmark.to_string(),
                key: *key,
                accuracy,
            })
        }).collect();
        info!(completed = results.len(), "sweep finished");
        results
    }
}

/// The outcome of evaluating one point of a sweep.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct SweepResult {
    pub benchmark: String,
    pub key: SweepKey,

    /// Percentage of correct predictions (undefined for an empty trace)
    pub accuracy: Option<f64>,
}
impl SweepResult {
    /// Format this result as a row of the results table.
    pub fn to_row(&self) -> String {
        let k = &self.key;
        let acc = match self.accuracy {
            Some(a) => format!("{:.2}", a),
            None => String::from("n/a"),
        };
        format!("{},{},{},{},{},{},{}", self.benchmark,
            k.num_perceptrons, k.ghr_length, k.lhr_length, k.lht_size,
            k.hashing_scheme, acc)
    }
}

/// Read the keys of all rows in an existing results table.
pub fn read_existing(r: impl BufRead) -> Result<BTreeSet<SweepKey>> {
    let mut res = BTreeSet::new();
    for (lineno, line) in r.lines().enumerate() {
        let line = line?;
        let line = line.trim();
        if lineno == 0 || line.is_empty() {
            continue;
        }
        let fields: Vec<&str> = line.split(',').map(str::trim).collect();
        if fields.len() != 7 {
            return Err(Error::Results(format!(
                "line {}: expected 7 fields, found {}", lineno + 1, fields.len()
            )));
        }
        let num = |i: usize| -> Result<u64> {
            fields[i].parse().map_err(|_| Error::Results(format!(
                "line {}: invalid value '{}'", lineno + 1, fields[i]
            )))
        };
        res.insert(SweepKey {
            num_perceptrons: num(1)? as usize,
            ghr_length: num(2)? as usize,
            lhr_length: num(3)? as usize,
            lht_size: num(4)? as usize,
            hashing_scheme: num(5)?,
        });
    }
    Ok(res)
}

/// Append results to a table. The header is written when 'header' is set.
pub fn write_results(mut w: impl Write, results: &[SweepResult], header: bool)
    -> Result<()>
{
    if header {
        writeln!(w, "{}", RESULTS_HEADER)?;
    }
    for r in results {
        writeln!(w, "{}", r.to_row())?;
    }
    Ok(())
}


#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn default_plan() {
        let plan = SweepPlan::new(default_base(), &SweepAxes::default(), &BTreeSet::new());
        // 11 + 4 + 4 + 8 + 9 points, with the base shared by all five axes
        assert_eq!(plan.len(), 36 - 4);
        let base = SweepKey::from_config(&default_base());
        assert_eq!(plan.points().iter().filter(|k| **k == base).count(), 1);
        assert_eq!(plan.points()[0].num_perceptrons, 32);
        assert!(plan.points().iter().all(|k| {
            let diffs = [
                k.num_perceptrons != base.num_perceptrons,
                k.ghr_length != base.ghr_length,
                k.lhr_length != base.lhr_length,
                k.lht_size != base.lht_size,
                k.hashing_scheme != base.hashing_scheme,
            ];
            diffs.iter().filter(|d| **d).count() <= 1
        }));
    }

    #[test]
    fn existing_rows_are_skipped() {
        let csv = format!("{}\n\
            bench,32,32,16,4096,3,91.20\n\
            bench,1024,32,16,4096,9,88.00\n", RESULTS_HEADER);
        let existing = read_existing(csv.as_bytes()).unwrap();
        assert_eq!(existing.len(), 2);

        let plan = SweepPlan::new(default_base(), &SweepAxes::default(), &existing);
        assert_eq!(plan.len(), 30);
        assert!(plan.points().iter().all(|k| !existing.contains(k)));
    }

    #[test]
    fn malformed_results() {
        let bad = format!("{}\nbench,32,32\n", RESULTS_HEADER);
        assert!(matches!(read_existing(bad.as_bytes()), Err(Error::Results(_))));
        let bad = format!("{}\nbench,x,32,16,4096,3,1.0\n", RESULTS_HEADER);
        assert!(matches!(read_existing(bad.as_bytes()), Err(Error::Results(_))));
    }

    #[test]
    fn run_and_write() {
        let axes = SweepAxes {
            num_perceptrons: vec![16, 32],
            ghr_length: vec![],
            lhr_length: vec![],
            lht_size: vec![],
            hashing_scheme: vec![1, 10],
        };
        let base = PerceptronConfig { weight_init: WeightInit::Zero, ..default_base() };
        let plan = SweepPlan::new(base, &axes, &BTreeSet::new());
        assert_eq!(plan.len(), 4);

        let events: Vec<BranchEvent> = (0..64)
            .map(|i| BranchEvent::bare(0x400 + (i % 2) * 4, Outcome::from(i % 2 == 0)))
            .collect();
        let results = plan.run("loop", &events, BranchLimit::unlimited());
        // Scheme 10 is rejected
        assert_eq!(results.len(), 3);
        assert_eq!(results[0].key.num_perceptrons, 16);
        assert!(results.iter().all(|r| r.accuracy.is_some()));

        let mut out = Vec::new();
        write_results(&mut out, &results, true).unwrap();
        let text = String::from_utf8(out).unwrap();
        assert!(text.starts_with(RESULTS_HEADER));
        assert_eq!(text.lines().count(), 4);
        assert!(text.lines().nth(1).unwrap().starts_with("loop,16,32,16,4096,3,"));

        let reread = read_existing(text.as_bytes()).unwrap();
        assert_eq!(reread.len(), 3);
    }
}
