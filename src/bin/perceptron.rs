//! Evaluate a perceptron predictor against a trace.

use std::fs::File;
use std::io::BufWriter;
use std::path::PathBuf;
use std::process;
use clap::Parser;
use tracing::{ error, info };
use tracing_subscriber::EnvFilter;

use axon::*;
use axon::config::*;
use axon::error::Result;
use axon::report::*;

#[derive(Parser, Debug)]
#[command(name = "perceptron", version, about = "Evaluate a perceptron branch predictor")]
struct Args {
    /// Trace file (`.bin` for binary records, text otherwise)
    trace: PathBuf,

    /// Output file
    #[arg(short, default_value = "perceptron_predictor.out")]
    o: String,

    /// Append the process id to output file names
    #[arg(short)]
    i: bool,

    /// Number of perceptrons
    #[arg(short, default_value_t = 1024)]
    p: usize,

    /// Global history length
    #[arg(short, default_value_t = 24)]
    g: usize,

    /// Local history length
    #[arg(short, default_value_t = 8)]
    l: usize,

    /// Local history table size
    #[arg(short, default_value_t = 1024)]
    s: usize,

    /// Hashing scheme (1-9)
    #[arg(short, default_value_t = 3)]
    x: u64,

    /// Record prediction confidence
    #[arg(short)]
    q: bool,

    /// Output file for confidence data
    #[arg(long, default_value = "confidence_data.csv")]
    confidence_output: String,

    /// Number of branches to evaluate (0 is unlimited)
    #[arg(long, default_value_t = 0)]
    limit: u64,

    /// Seed for the initial weights
    #[arg(long, default_value_t = 1)]
    seed: u64,

    /// Start with all weights at zero
    #[arg(long, conflicts_with = "seed")]
    zero_weights: bool,

    /// Write results as JSON
    #[arg(long)]
    json: bool,
}

fn run(args: Args) -> Result<()> {
    let run_cfg = RunConfig {
        output: args.o,
        append_pid: args.i,
        branch_limit: args.limit,
        json: args.json,
    };
    let cfg = PerceptronConfig {
        num_perceptrons: args.p,
        ghr_length: args.g,
        lhr_length: args.l,
        lht_size: args.s,
        hashing_scheme: args.x,
        confidence: args.q,
        weight_init: if args.zero_weights {
            WeightInit::Zero
        } else {
            WeightInit::Random { seed: args.seed }
        },
    };
    info!(?cfg, ?run_cfg, "perceptron configuration");

    // Reject bad parameters before touching the trace.
    let mut predictor = PerceptronPredictor::new(cfg)?;
    info!(threshold = predictor.threshold(), "built predictor");

    let trace = Trace::from_file(&args.trace)?;
    let evaluator = Evaluator::new(BranchLimit::new(run_cfg.branch_limit))
        .with_confidence(cfg.confidence);
    let summary = if cfg.confidence {
        let path = output_path(&args.confidence_output, run_cfg.append_pid);
        let mut csv = ConfidenceCsv::new(BufWriter::new(File::create(&path)?))?;
        let summary = evaluator.run_with_sink(&mut predictor, trace.iter(), &mut csv);
        info!(records = csv.rows(), "wrote {}", path);
        csv.finish()?;
        summary
    } else {
        evaluator.run(&mut predictor, trace.iter())
    };

    let report = PerceptronReport::new(&summary, &predictor);
    let path = output_path(&run_cfg.output, run_cfg.append_pid);
    write_report(BufWriter::new(File::create(&path)?), &report, run_cfg.json)?;
    info!(
        trace = trace.name(),
        branches = report.branches,
        mispredictions = report.mispredictions,
        reason = %report.termination,
        "wrote {}", path
    );

    Ok(())
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    if let Err(e) = run(Args::parse()) {
        error!("{}", e);
        process::exit(1);
    }
}
