use proptest::prelude::*;

use axon::*;
use axon::config::*;

fn outcome() -> impl Strategy<Value = Outcome> {
    any::<bool>().prop_map(Outcome::from)
}

fn events(max_len: usize) -> impl Strategy<Value = Vec<BranchEvent>> {
    prop::collection::vec(
        (any::<usize>(), outcome()).prop_map(|(pc, o)| BranchEvent::bare(pc, o)),
        0..max_len,
    )
}

/// Events drawn from a small set of addresses, so that entries are revisited.
fn hot_events(max_len: usize) -> impl Strategy<Value = Vec<BranchEvent>> {
    prop::collection::vec(
        (0usize..8, outcome()).prop_map(|(i, o)| BranchEvent::bare(0x4000 + i * 4, o)),
        0..max_len,
    )
}

fn perceptron_config() -> impl Strategy<Value = PerceptronConfig> {
    (1usize..300, 0usize..=64, 0usize..=64, 1usize..300, 1u64..=9, any::<u64>())
        .prop_map(|(num_perceptrons, ghr_length, lhr_length, lht_size, scheme, seed)| {
            PerceptronConfig {
                num_perceptrons,
                ghr_length,
                lhr_length,
                lht_size,
                hashing_scheme: scheme,
                confidence: false,
                weight_init: WeightInit::Random { seed },
            }
        })
}

proptest! {
    #[test]
    fn gshare_indices_in_bounds(use_ghr in any::<bool>(), events in events(500)) {
        let mut p = GsharePredictor::new(GshareConfig { use_ghr });
        for e in events {
            let pred = p.predict(e.pc);
            prop_assert!(pred.idx < GSHARE_TABLE_SIZE);
            p.update(e.pc, pred, e.outcome);
            prop_assert!(p.ghr().bits() < (1 << GSHARE_GHR_BITS));
        }
    }

    #[test]
    fn perceptron_indices_in_bounds(cfg in perceptron_config(), events in events(300)) {
        let mut p = PerceptronPredictor::new(cfg).unwrap();
        for e in events {
            let pred = p.predict(e.pc);
            prop_assert!(pred.row < cfg.num_perceptrons);
            prop_assert!(pred.lht_idx < cfg.lht_size);
            p.update(e.pc, pred, e.outcome);
        }
    }

    #[test]
    fn gshare_counters_replay(use_ghr in any::<bool>(), events in hot_events(400)) {
        // Replay the sequence against a plain model of the table.
        let mut model = vec![0u8; GSHARE_TABLE_SIZE];
        let mut ghr = 0usize;
        let mut p = GsharePredictor::new(GshareConfig { use_ghr });
        for e in events.iter() {
            let idx = if use_ghr { (ghr ^ e.pc) & 0xffff } else { e.pc & 0xffff };
            let pred = p.predict(e.pc);
            prop_assert_eq!(pred.idx, idx);
            prop_assert_eq!(pred.outcome.is_taken(), model[idx] >= 2);
            p.update(e.pc, pred, e.outcome);

            model[idx] = if e.is_taken() {
                (model[idx] + 1).min(3)
            } else {
                model[idx].saturating_sub(1)
            };
            ghr = ((ghr << 1) | e.is_taken() as usize) & 0xffff;
        }
        for (idx, state) in model.iter().enumerate() {
            prop_assert_eq!(p.counter(idx), *state);
            if p.access_counts()[idx] == 0 {
                prop_assert_eq!(*state, 0);
            }
        }
        prop_assert_eq!(p.access_counts().iter().sum::<u64>(), events.len() as u64);
    }

    #[test]
    fn gshare_is_deterministic(use_ghr in any::<bool>(), events in hot_events(400)) {
        let run = || {
            let mut p = GsharePredictor::new(GshareConfig { use_ghr });
            let res = Evaluator::default().run(&mut p, events.iter().copied());
            let table: Vec<u8> = (0..GSHARE_TABLE_SIZE).map(|i| p.counter(i)).collect();
            (res.counters, table, p.access_counts().to_vec())
        };
        prop_assert_eq!(run(), run());
    }

    #[test]
    fn perceptron_is_deterministic(cfg in perceptron_config(), events in hot_events(200)) {
        let run = || {
            let mut p = PerceptronPredictor::new(cfg).unwrap();
            Evaluator::default().run(&mut p, events.iter().copied()).counters
        };
        prop_assert_eq!(run(), run());
    }

    /// Once both histories are full of 'taken' outcomes, the inputs to the
    /// selected perceptron stop changing, and every training step can only
    /// move the output up.
    #[test]
    fn perceptron_output_grows_on_repeated_branch(
        ghr_length in 0usize..=32,
        lhr_length in 0usize..=32,
        scheme in 1u64..=9,
        pc in any::<usize>(),
        zero in any::<bool>(),
    ) {
        let cfg = PerceptronConfig {
            num_perceptrons: 64,
            ghr_length,
            lhr_length,
            lht_size: 64,
            hashing_scheme: scheme,
            confidence: false,
            weight_init: if zero { WeightInit::Zero } else { WeightInit::Random { seed: 7 } },
        };
        let mut p = PerceptronPredictor::new(cfg).unwrap();
        let mut outputs = Vec::new();
        for _ in 0..1000 {
            let pred = p.predict(pc);
            outputs.push(pred.output);
            p.update(pc, pred, Outcome::T);
        }
        let warm = &outputs[ghr_length + lhr_length..];
        for w in warm.windows(2) {
            prop_assert!(w[0] <= w[1], "output decreased: {} -> {}", w[0], w[1]);
        }
    }

    #[test]
    fn limit_is_exact(limit in 1u64..200, events in hot_events(300)) {
        let mut p = GsharePredictor::new(GshareConfig::default());
        let res = Evaluator::new(BranchLimit::new(limit)).run(&mut p, events.iter().copied());
        let expected = limit.min(events.len() as u64);
        prop_assert_eq!(res.counters.seen, expected);
        prop_assert_eq!(p.access_counts().iter().sum::<u64>(), expected);
        let taken = events.iter().take(expected as usize).filter(|e| e.is_taken()).count();
        prop_assert_eq!(res.counters.taken, taken as u64);
        if limit <= events.len() as u64 {
            prop_assert_eq!(res.termination, Termination::LimitReached);
        } else {
            prop_assert_eq!(res.termination, Termination::Completed);
        }
    }

    #[test]
    fn confidence_counter_moves_by_one(correct in prop::collection::vec(any::<bool>(), 1..300)) {
        let mut c = axon::confidence::ConfidenceTracker::new();
        let mut prev = 0i32;
        for ok in correct {
            let r = c.observe(ok, 0);
            let cur = r.saturation as i32;
            prop_assert!((0..=3).contains(&cur));
            prop_assert!((cur - prev).abs() <= 1);
            if ok { prop_assert_eq!(cur, (prev + 1).min(3)); }
            else { prop_assert_eq!(cur, (prev - 1).max(0)); }
            prev = cur;
        }
    }
}

/// With a single row and no local history, the output during warm-up is
/// `k * (g - k)` after 'k' events, and afterwards grows by `g + 1` per
/// training step until it passes the threshold.
#[test]
fn perceptron_repeated_taken_branch() {
    let cfg = PerceptronConfig {
        num_perceptrons: 4,
        ghr_length: 8,
        lhr_length: 0,
        lht_size: 4,
        hashing_scheme: 1,
        confidence: false,
        weight_init: WeightInit::Zero,
    };
    let mut p = PerceptronPredictor::new(cfg).unwrap();
    assert_eq!(p.threshold(), 29);
    let mut outputs = Vec::new();
    for _ in 0..1000 {
        let pred = p.predict(0x1000);
        outputs.push(pred.output);
        p.update(0x1000, pred, Outcome::T);
    }
    assert_eq!(outputs[..13], [0, 7, 12, 15, 16, 15, 12, 7, 0, 9, 18, 27, 36]);
    assert!(outputs[12..].iter().all(|x| *x == 36));
}
