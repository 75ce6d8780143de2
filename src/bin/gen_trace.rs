//! Generate a synthetic trace.

use std::fs::File;
use std::io::BufWriter;
use std::path::PathBuf;
use std::process;
use clap::Parser;
use tracing::{ error, info };
use tracing_subscriber::EnvFilter;

use axon::*;
use axon::error::Result;

#[derive(Parser, Debug)]
#[command(name = "gen-trace", version, about = "Generate a synthetic branch trace")]
struct Args {
    /// Output file (`.bin` for binary records, text otherwise)
    output: PathBuf,

    /// Number of events
    #[arg(short, long, default_value_t = 100_000)]
    len: usize,

    /// Seed for randomly-behaving branches
    #[arg(long, default_value_t = 0)]
    seed: u64,
}

fn run(args: Args) -> Result<()> {
    // A small loop nest with a mix of easy, correlated, and random branches.
    let mut t = SyntheticTrace::new(args.seed);
    t.branch(0x0040_1000, BranchPattern::NotTakenPeriodic(8))
     .branch(0x0040_1010, BranchPattern::AlwaysTaken)
     .branch(0x0040_1024, BranchPattern::TakenPeriodic(3))
     .branch(0x0040_1038, BranchPattern::Pattern(vec![
        Outcome::T, Outcome::T, Outcome::N, Outcome::T, Outcome::N,
     ]))
     .branch(0x0040_1050, BranchPattern::Random(0.7))
     .branch(0x0040_1064, BranchPattern::NeverTaken);

    let name = args.output.to_string_lossy().into_owned();
    let trace = t.build(&name, args.len);
    let out = BufWriter::new(File::create(&args.output)?);
    if args.output.extension().is_some_and(|e| e == "bin") {
        trace.write_binary(out)?;
    } else {
        trace.write_text(out)?;
    }
    info!(entries = trace.num_entries(), branches = t.num_branches(), "wrote {}", name);
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
