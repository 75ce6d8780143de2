//! Formatting the results of a run.
//!
//! Nothing in here influences prediction. Reports are built from a
//! [RunSummary] after a run and written to any [Write].

use std::fmt;
use std::io::Write;
use serde::Serialize;

use crate::config::*;
use crate::confidence::{ ConfidenceRecord, ConfidenceSink };
use crate::error::Result;
use crate::eval::*;
use crate::predictor::*;

/// Return the path for an output file, optionally suffixed with the id of
/// the current process.
pub fn output_path(base: &str, append_pid: bool) -> String {
    if append_pid {
        format!("{}.{}", base, std::process::id())
    } else {
        base.to_string()
    }
}

/// Return the path of the access-count dump associated with some output.
pub fn access_count_path(base: &str, append_pid: bool) -> String {
    output_path(&format!("{}.access_count", base), append_pid)
}

/// Format a percentage with two decimal places, or "n/a" when undefined.
fn percent(x: Option<f64>) -> String {
    match x {
        Some(x) => format!("{:.2}%", x),
        None => String::from("n/a"),
    }
}

/// Results of running the gshare predictor.
#[derive(Clone, Debug, Serialize)]
pub struct GshareReport {
    pub termination: Termination,
    pub accuracy: Option<f64>,
    pub seen: u64,
    pub taken: u64,
    pub correct: u64,
    pub use_ghr: bool,
    /// Normalized entropy of the table access counts
    pub access_entropy: f64,
}
impl GshareReport {
    pub fn new(summary: &RunSummary, predictor: &GsharePredictor) -> Self {
        let c = &summary.counters;
        Self {
            termination: summary.termination,
            accuracy: c.accuracy(),
            seen: c.seen,
            taken: c.taken,
            correct: c.correct,
            use_ghr: predictor.config().use_ghr,
            access_entropy: predictor.access_entropy(),
        }
    }
}
impl fmt::Display for GshareReport {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        writeln!(f, "Reason: {}", self.termination)?;
        writeln!(f, "Accuracy: {}", percent(self.accuracy))?;
        writeln!(f, "Count Seen: {}", self.seen)?;
        writeln!(f, "Count Taken: {}", self.taken)?;
        writeln!(f, "Count Correct: {}", self.correct)?;
        writeln!(f, "Use GHR: {}", if self.use_ghr { 1 } else { 0 })?;
        writeln!(f, "Access Entropy: {:.4}", self.access_entropy)
    }
}

/// Write one access count per line, in index order.
pub fn write_access_counts(mut w: impl Write, counts: &[u64]) -> Result<()> {
    for c in counts {
        writeln!(w, "{}", c)?;
    }
    Ok(())
}

/// The parameters of a perceptron predictor, as echoed in a report.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub struct PerceptronParams {
    pub num_perceptrons: usize,
    pub ghr_length: usize,
    pub lhr_length: usize,
    pub lht_size: usize,
    pub hashing_scheme: u64,
}
impl From<&PerceptronConfig> for PerceptronParams {
    fn from(cfg: &PerceptronConfig) -> Self {
        Self {
            num_perceptrons: cfg.num_perceptrons,
            ghr_length: cfg.ghr_length,
            lhr_length: cfg.lhr_length,
            lht_size: cfg.lht_size,
            hashing_scheme: cfg.hashing_scheme,
        }
    }
}

/// Results of running the perceptron predictor.
#[derive(Clone, Debug, Serialize)]
pub struct PerceptronReport {
    pub termination: Termination,
    pub branches: u64,
    pub taken: u64,
    pub mispredictions: u64,
    pub misprediction_rate: Option<f64>,
    pub accuracy: Option<f64>,
    pub threshold: i32,
    pub params: PerceptronParams,
}
impl PerceptronReport {
    pub fn new(summary: &RunSummary, predictor: &PerceptronPredictor) -> Self {
        let c = &summary.counters;
        Self {
            termination: summary.termination,
            branches: c.seen,
            taken: c.taken,
            mispredictions: c.mispredicted(),
            misprediction_rate: c.misprediction_rate(),
            accuracy: c.misprediction_rate().map(|r| 100.0 - r),
            threshold: predictor.threshold(),
            params: PerceptronParams::from(predictor.config()),
        }
    }
}
impl fmt::Display for PerceptronReport {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        writeln!(f, "Reason: {}", self.termination)?;
        writeln!(f, "Branches:            {}", self.branches)?;
        writeln!(f, "Mispredictions:      {}", self.mispredictions)?;
        writeln!(f, "Misprediction Rate:  {}", percent(self.misprediction_rate))?;
        writeln!(f, "Accuracy:            {}", percent(self.accuracy))?;
        writeln!(f, "NUM_PERCEPTRONS: {}", self.params.num_perceptrons)?;
        writeln!(f, "GHR_LENGTH: {}", self.params.ghr_length)?;
        writeln!(f, "LHR_LENGTH: {}", self.params.lhr_length)?;
        writeln!(f, "LHT_SIZE: {}", self.params.lht_size)?;
        writeln!(f, "HASHING_SCHEME: {}", self.params.hashing_scheme)
    }
}

/// Header row of the confidence table.
pub const CONFIDENCE_HEADER: &str = "Prediction,Accuracy,AvgMagnitude,SaturationCounter";

/// Writes confidence records as CSV rows while a run is in progress.
///
/// The first write error stops all further output and is returned by
/// [ConfidenceCsv::finish].
pub struct ConfidenceCsv<W: Write> {
    w: W,
    rows: u64,
    err: Option<std::io::Error>,
}
impl<W: Write> ConfidenceCsv<W> {
    /// Write the header row.
    pub fn new(mut w: W) -> Result<Self> {
        writeln!(w, "{}", CONFIDENCE_HEADER)?;
        Ok(Self { w, rows: 0, err: None })
    }

    /// Number of rows written so far (excluding the header).
    pub fn rows(&self) -> u64 { self.rows }

    /// Flush the output and return the underlying writer.
    pub fn finish(mut self) -> Result<W> {
        if let Some(e) = self.err.take() {
            return Err(e.into());
        }
        self.w.flush()?;
        Ok(self.w)
    }
}
impl<W: Write> ConfidenceSink for ConfidenceCsv<W> {
    fn record(&mut self, r: ConfidenceRecord) {
        if self.err.is_some() {
            return;
        }
        let res = writeln!(self.w, "{},{},{},{}",
            r.index, r.accuracy, r.avg_magnitude, r.saturation);
        match res {
            Ok(()) => self.rows += 1,
            Err(e) => self.err = Some(e),
        }
    }
}

/// Write a confidence series as CSV.
pub fn write_confidence(w: impl Write, records: &[ConfidenceRecord]) -> Result<()> {
    let mut csv = ConfidenceCsv::new(w)?;
    for r in records {
        csv.record(*r);
    }
    csv.finish()?;
    Ok(())
}

/// Write some report either as text or as JSON.
pub fn write_report<R>(mut w: impl Write, report: &R, json: bool) -> Result<()>
    where R: fmt::Display + Serialize
{
    if json {
        serde_json::to_writer_pretty(&mut w, report)?;
        writeln!(w)?;
    } else {
        write!(w, "{}", report)?;
    }
    Ok(())
}
