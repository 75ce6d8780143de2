use std::fs::{ self, File };
use std::io::BufReader;
use tempfile::tempdir;

use axon::*;
use axon::config::*;
use axon::error::Error;
use axon::report::*;
use axon::sweep::*;

fn sample_trace() -> Trace {
    let mut t = SyntheticTrace::new(11);
    t.branch(0x1000, BranchPattern::NotTakenPeriodic(4))
     .branch(0x1010, BranchPattern::Random(0.5))
     .branch(0x1020, BranchPattern::Pattern(vec![Outcome::T, Outcome::N]));
    t.build("sample", 3000)
}

#[test]
fn trace_files_round_trip() {
    let dir = tempdir().unwrap();
    let trace = sample_trace();

    let text_path = dir.path().join("sample.trace");
    trace.write_text(File::create(&text_path).unwrap()).unwrap();
    let bin_path = dir.path().join("sample.bin");
    trace.write_binary(File::create(&bin_path).unwrap()).unwrap();
    assert_eq!(fs::metadata(&bin_path).unwrap().len(), 3000 * 16);

    let from_text = Trace::from_file(&text_path).unwrap();
    let from_bin = Trace::from_file(&bin_path).unwrap();
    assert_eq!(from_text.name(), "sample.trace");
    assert_eq!(from_text.as_slice(), trace.as_slice());
    assert_eq!(from_bin.as_slice(), trace.as_slice());
}

#[test]
fn truncated_binary_trace_is_rejected() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("short.bin");
    fs::write(&path, [0u8; 20]).unwrap();
    assert!(matches!(Trace::from_file(&path), Err(Error::TraceLength { len: 20, .. })));
    assert!(matches!(Trace::from_file(dir.path().join("missing.bin")), Err(Error::Io(_))));
}

#[test]
fn gshare_report_and_access_counts() {
    let dir = tempdir().unwrap();
    let base = dir.path().join("branch_predictor.out");
    let base = base.to_str().unwrap();
    let trace = sample_trace();

    let mut p = GsharePredictor::new(GshareConfig::default());
    let summary = Evaluator::new(BranchLimit::new(1000)).run(&mut p, trace.iter());
    let report = GshareReport::new(&summary, &p);
    write_report(File::create(output_path(base, false)).unwrap(), &report, false).unwrap();
    write_access_counts(File::create(access_count_path(base, false)).unwrap(),
        p.access_counts()).unwrap();

    let text = fs::read_to_string(base).unwrap();
    assert!(text.starts_with("Reason: limit reached\n"));
    assert!(text.contains("Count Seen: 1000\n"));

    let counts = fs::read_to_string(format!("{}.access_count", base)).unwrap();
    let counts: Vec<u64> = counts.lines().map(|l| l.parse().unwrap()).collect();
    assert_eq!(counts.len(), GSHARE_TABLE_SIZE);
    assert_eq!(counts.iter().sum::<u64>(), 1000);
    assert_eq!(counts, p.access_counts());
}

#[test]
fn perceptron_config_echo() {
    let dir = tempdir().unwrap();
    let cfg = PerceptronConfig {
        num_perceptrons: 512,
        ghr_length: 20,
        lhr_length: 12,
        lht_size: 2048,
        hashing_scheme: 6,
        confidence: true,
        weight_init: WeightInit::Random { seed: 99 },
    };

    // The configuration itself survives a trip through a file.
    let cfg_path = dir.path().join("cfg.json");
    fs::write(&cfg_path, serde_json::to_string(&cfg).unwrap()).unwrap();
    let reread: PerceptronConfig =
        serde_json::from_str(&fs::read_to_string(&cfg_path).unwrap()).unwrap();
    assert_eq!(reread, cfg);

    let mut p = PerceptronPredictor::new(reread).unwrap();
    let summary = Evaluator::default()
        .with_confidence(cfg.confidence)
        .run(&mut p, sample_trace().iter());
    let report = PerceptronReport::new(&summary, &p);

    let out = dir.path().join("perceptron_predictor.out");
    write_report(File::create(&out).unwrap(), &report, true).unwrap();
    let v: serde_json::Value = serde_json::from_str(&fs::read_to_string(&out).unwrap()).unwrap();
    assert_eq!(v["termination"], "completed");
    assert_eq!(v["params"]["num_perceptrons"], 512);
    assert_eq!(v["params"]["ghr_length"], 20);
    assert_eq!(v["params"]["lhr_length"], 12);
    assert_eq!(v["params"]["lht_size"], 2048);
    assert_eq!(v["params"]["hashing_scheme"], 6);

    let csv = dir.path().join("confidence_data.csv");
    write_confidence(File::create(&csv).unwrap(), &summary.confidence).unwrap();
    let text = fs::read_to_string(&csv).unwrap();
    assert_eq!(text.lines().next(), Some(CONFIDENCE_HEADER));
    assert_eq!(text.lines().count(), 3001);
}

#[test]
fn sweep_resumes_from_results_file() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("results.csv");
    let events = sample_trace().as_slice()[..500].to_vec();
    let axes = SweepAxes {
        num_perceptrons: vec![64, 128],
        ghr_length: vec![8],
        lhr_length: vec![],
        lht_size: vec![],
        hashing_scheme: vec![],
    };
    let base = PerceptronConfig { weight_init: WeightInit::Zero, ..default_base() };

    let plan = SweepPlan::new(base, &axes, &Default::default());
    assert_eq!(plan.len(), 3);
    let first = plan.run("sample", &events, BranchLimit::unlimited());
    write_results(File::create(&path).unwrap(), &first, true).unwrap();

    let existing = read_existing(BufReader::new(File::open(&path).unwrap())).unwrap();
    assert_eq!(existing.len(), 3);
    let again = SweepPlan::new(base, &axes, &existing);
    assert!(again.is_empty());

    // Each configuration is independent of the others in the plan.
    let single = SweepPlan::new(base, &SweepAxes {
        num_perceptrons: vec![128],
        ghr_length: vec![],
        lhr_length: vec![],
        lht_size: vec![],
        hashing_scheme: vec![],
    }, &Default::default());
    let rerun = single.run("sample", &events, BranchLimit::unlimited());
    assert_eq!(Some(&rerun[0]), first.iter().find(|r| r.key.num_perceptrons == 128));
}
