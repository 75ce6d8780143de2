//! Sweep perceptron parameters over a trace, one axis at a time.

use std::collections::BTreeSet;
use std::fs::{ File, OpenOptions };
use std::io::BufReader;
use std::path::{ Path, PathBuf };
use std::process;
use std::time::Instant;
use clap::Parser;
use tracing::{ error, info };
use tracing_subscriber::EnvFilter;

use axon::*;
use axon::config::*;
use axon::error::Result;
use axon::sweep::*;

#[derive(Parser, Debug)]
#[command(name = "sweep", version, about = "Sweep perceptron predictor parameters")]
struct Args {
    /// Trace file (`.bin` for binary records, text otherwise)
    trace: PathBuf,

    /// Results table. Configurations already present are not evaluated
    /// again, and new rows are appended.
    #[arg(short, long)]
    results: Option<PathBuf>,

    /// Number of worker threads (defaults to the number of CPUs)
    #[arg(long)]
    threads: Option<usize>,

    /// Number of branches to evaluate per configuration (0 is unlimited)
    #[arg(long, default_value_t = 0)]
    limit: u64,

    /// Start with all weights at zero
    #[arg(long)]
    zero_weights: bool,
}

fn run(args: Args) -> Result<()> {
    if let Some(n) = args.threads {
        if let Err(e) = rayon::ThreadPoolBuilder::new().num_threads(n).build_global() {
            error!("couldn't configure thread pool: {}", e);
        }
    }

    let trace = Trace::from_file(&args.trace)?;
    let benchmark = args.trace.file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| trace.name().to_string());
    let results_path = args.results.unwrap_or_else(|| {
        PathBuf::from(format!("{}_perceptron_results.csv", benchmark))
    });

    let existing = if results_path.exists() {
        read_existing(BufReader::new(File::open(&results_path)?))?
    } else {
        BTreeSet::new()
    };
    info!(existing = existing.len(), path = %results_path.display(), "read results");

    let mut base = default_base();
    if args.zero_weights {
        base.weight_init = WeightInit::Zero;
    }
    let plan = SweepPlan::new(base, &SweepAxes::default(), &existing);
    if plan.is_empty() {
        info!("nothing to do");
        return Ok(());
    }

    let start = Instant::now();
    let results = plan.run(&benchmark, trace.as_slice(), BranchLimit::new(args.limit));
    let out = OpenOptions::new().create(true).append(true).open(&results_path)?;
    write_results(out, &results, !has_header(&results_path)?)?;

    for r in results.iter() {
        info!(key = ?r.key, accuracy = ?r.accuracy, "result");
    }
    info!("completed {} configurations in {:.2}s", results.len(),
        start.elapsed().as_secs_f64());
    Ok(())
}

/// Returns 'true' when the results table already has at least one line.
fn has_header(path: &Path) -> Result<bool> {
    Ok(std::fs::metadata(path)?.len() > 0)
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
