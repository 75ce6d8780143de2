//! Evaluate a gshare predictor against a trace.

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
#[command(name = "gshare", version, about = "Evaluate a gshare branch predictor")]
struct Args {
    /// Trace file (`.bin` for binary records, text otherwise)
    trace: PathBuf,

    /// Output file
    #[arg(short, default_value = "branch_predictor.out")]
    o: String,

    /// Append the process id to output file names
    #[arg(short)]
    i: bool,

    /// Number of branches to evaluate (0 is unlimited)
    #[arg(short, default_value_t = 0)]
    l: u64,

    /// XOR the global history into the table index (0 or 1)
    #[arg(short, default_value_t = 1)]
    x: u8,

    /// Write results as JSON
    #[arg(long)]
    json: bool,

    /// Print per-class hit rates and the least predictable branches
    #[arg(long)]
    stats: bool,
}

fn run(args: Args) -> Result<()> {
    let run_cfg = RunConfig {
        output: args.o,
        append_pid: args.i,
        branch_limit: args.l,
        json: args.json,
    };
    let cfg = GshareConfig { use_ghr: args.x != 0 };
    info!(?cfg, ?run_cfg, "gshare configuration");

    let trace = Trace::from_file(&args.trace)?;
    let mut predictor = GsharePredictor::new(cfg);
    let summary = Evaluator::new(BranchLimit::new(run_cfg.branch_limit))
        .with_branch_stats(args.stats)
        .run(&mut predictor, trace.iter());

    let report = GshareReport::new(&summary, &predictor);
    let path = output_path(&run_cfg.output, run_cfg.append_pid);
    write_report(BufWriter::new(File::create(&path)?), &report, run_cfg.json)?;

    let counts_path = access_count_path(&run_cfg.output, run_cfg.append_pid);
    write_access_counts(BufWriter::new(File::create(&counts_path)?),
        predictor.access_counts())?;

    info!(
        trace = trace.name(),
        seen = report.seen,
        correct = report.correct,
        reason = %report.termination,
        "wrote {} and {}", path, counts_path
    );

    if let Some(stats) = summary.branch_stats {
        for (class, data) in stats.classes.iter() {
            println!("{:?}: {}/{} correct", class, data.hits, data.occ);
        }
        for (pc, data) in stats.get_low_rate_branches(16) {
            println!("{:016x}: {:.2}% correct over {} ({} taken, entropy {:.3})",
                pc, data.hit_rate() * 100.0, data.occ,
                data.times_taken(), data.shannon_entropy()
            );
        }
    }
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
