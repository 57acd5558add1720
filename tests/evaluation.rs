use ahp_elicit::consistency::ConsistencyConfig;
use ahp_elicit::elicitation::{Action, Direction, ElicitationSession, Step};
use ahp_elicit::evaluate::{finalize, EvaluationConfig};
use ahp_elicit::judgment::{list_pairs, ItemSet, Judgment, PairJudgment, Reliability};
use ahp_elicit::matrix::{build_matrix, RECIPROCITY_TOLERANCE};
use ahp_elicit::priority::{PowerIterationConfig, PriorityMethod};
use ahp_elicit::scale::ScaleFamily;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

fn approx_eq(a: f64, b: f64, tol: f64) -> bool {
    (a - b).abs() <= tol
}

fn judged(i: usize, j: usize, ratio: f64) -> PairJudgment {
    let judgment = Judgment::new(ratio, Reliability::MEDIUM, Some(ScaleFamily::Integer)).unwrap();
    PairJudgment::new(i, j, judgment)
}

fn items(n: usize) -> ItemSet {
    ItemSet::new((0..n).map(|i| format!("alt-{i}"))).unwrap()
}

fn random_judgments(rng: &mut StdRng, n: usize) -> Vec<PairJudgment> {
    list_pairs(n)
        .into_iter()
        .map(|(i, j)| {
            let grade: f64 = rng.gen_range(1.0..=9.0);
            let family = ScaleFamily::ALL[rng.gen_range(0..ScaleFamily::ALL.len())];
            let raw = family.transform(grade).unwrap();
            let ratio = if rng.gen_bool(0.5) { raw } else { 1.0 / raw };
            judged(i, j, ratio)
        })
        .collect()
}

#[test]
fn random_matrices_are_reciprocal_with_normalized_weights() {
    let mut rng = StdRng::seed_from_u64(7);
    for method in [PriorityMethod::Eigenvector, PriorityMethod::GeometricMean] {
        let cfg = EvaluationConfig {
            method,
            ..EvaluationConfig::default()
        };
        for _ in 0..50 {
            let n = rng.gen_range(2..=12);
            let judgments = random_judgments(&mut rng, n);
            let matrix = build_matrix(n, &judgments).unwrap();
            assert!(matrix.is_positive_reciprocal(RECIPROCITY_TOLERANCE));

            let out = finalize(&items(n), &judgments, &cfg).unwrap();
            let sum: f64 = out.priorities.weights.iter().sum();
            assert!(approx_eq(sum, 1.0, 1e-9), "sum {sum}");
            assert!(out.priorities.weights.iter().all(|w| *w >= 0.0));
            assert!(out.consistency.cr.is_finite() && out.consistency.cr >= 0.0);
            assert!(out.consistency.lambda_max >= n as f64 - 1e-9);
            assert!(out.missing_pairs.is_empty());
        }
    }
}

#[test]
fn consistent_matrices_recover_true_weights() {
    let mut rng = StdRng::seed_from_u64(42);
    for _ in 0..30 {
        let n = rng.gen_range(3..=10);
        let raw: Vec<f64> = (0..n).map(|_| rng.gen_range(0.1..5.0)).collect();
        let total: f64 = raw.iter().sum();
        let truth: Vec<f64> = raw.iter().map(|w| w / total).collect();

        let judgments: Vec<PairJudgment> = list_pairs(n)
            .into_iter()
            .map(|(i, j)| judged(i, j, truth[i] / truth[j]))
            .collect();

        for method in [PriorityMethod::Eigenvector, PriorityMethod::GeometricMean] {
            let cfg = EvaluationConfig {
                method,
                ..EvaluationConfig::default()
            };
            let out = finalize(&items(n), &judgments, &cfg).unwrap();
            for (w, t) in out.priorities.weights.iter().zip(&truth) {
                assert!(approx_eq(*w, *t, 1e-8), "{method:?}: {w} vs {t}");
            }
            assert!(out.consistency.cr.abs() < 1e-8);
            assert!(out.consistency.is_consistent);
        }
    }
}

#[test]
fn known_example_orders_items() {
    let judgments = vec![
        judged(0, 1, 3.0),
        judged(0, 2, 7.0),
        judged(1, 2, 5.0),
    ];
    let out = finalize(&items(3), &judgments, &EvaluationConfig::default()).unwrap();
    let w = &out.priorities.weights;
    assert!(w[0] > w[1] && w[1] > w[2]);
    assert_eq!(out.ranks, vec![1, 2, 3]);
    assert!(out.consistency.cr.is_finite() && out.consistency.cr >= 0.0);
    assert_eq!(
        out.ranked().iter().map(|(label, _)| *label).collect::<Vec<_>>(),
        vec!["alt-0", "alt-1", "alt-2"]
    );
}

#[test]
fn estimators_agree_closely_on_mildly_inconsistent_input() {
    let judgments = vec![
        judged(0, 1, 3.0),
        judged(0, 2, 7.0),
        judged(1, 2, 5.0),
    ];
    let ev = finalize(&items(3), &judgments, &EvaluationConfig::default()).unwrap();
    let gm = finalize(
        &items(3),
        &judgments,
        &EvaluationConfig {
            method: PriorityMethod::GeometricMean,
            ..EvaluationConfig::default()
        },
    )
    .unwrap();
    for (a, b) in ev.priorities.weights.iter().zip(&gm.priorities.weights) {
        assert!(approx_eq(*a, *b, 0.02));
    }
    assert_eq!(ev.ranks, gm.ranks);
}

#[test]
fn judgments_from_sessions_feed_finalize() {
    let labels = ItemSet::new(["price", "comfort", "safety"]).unwrap();
    let mut session = ElicitationSession::new(ScaleFamily::Power);
    let scripts: [(usize, usize, Vec<Action>); 3] = [
        // comfort is preferred over price, coarse "weakly" then Low strip grade 3.
        (
            0,
            1,
            vec![
                Action::Choose(Direction::SecondPreferred),
                Action::Select(1),
                Action::Select(2),
            ],
        ),
        // safety over price, fine strip of 4, strongest option.
        (
            0,
            2,
            vec![
                Action::Choose(Direction::SecondPreferred),
                Action::SetGradations(4),
                Action::Select(4),
            ],
        ),
        (1, 2, vec![Action::NotSure]),
    ];

    let mut judgments = Vec::new();
    for (i, j, actions) in scripts {
        let mut emitted = None;
        for action in actions {
            if let Step::Done(judgment) = session.apply(action).unwrap() {
                emitted = Some(judgment);
            }
        }
        judgments.push(PairJudgment::new(i, j, emitted.unwrap()));
    }
    assert_eq!(judgments[1].judgment.reliability.value(), 4);
    assert!(judgments[2].judgment.is_not_sure());

    let out = finalize(&labels, &judgments, &EvaluationConfig::default()).unwrap();
    assert_eq!(out.ranked()[2].0, "price");
    assert!(out.matrix.is_positive_reciprocal(RECIPROCITY_TOLERANCE));
}

#[test]
fn config_loads_from_partial_json() {
    let cfg: EvaluationConfig = serde_json::from_str(
        r#"{ "method": "geometric_mean", "consistency": { "threshold": 0.2 } }"#,
    )
    .unwrap();
    assert_eq!(cfg.method, PriorityMethod::GeometricMean);
    assert_eq!(cfg.consistency.threshold, 0.2);
    assert_eq!(
        cfg.consistency.max_pair_hints,
        ConsistencyConfig::default().max_pair_hints
    );
    assert_eq!(cfg.power_iteration, PowerIterationConfig::default());

    let empty: EvaluationConfig = serde_json::from_str("{}").unwrap();
    assert_eq!(empty, EvaluationConfig::default());
}

#[test]
fn evaluation_serializes_to_json() {
    let judgments = vec![judged(0, 1, 2.0)];
    let out = finalize(&items(3), &judgments, &EvaluationConfig::default()).unwrap();
    let value = serde_json::to_value(&out).unwrap();
    assert_eq!(value["items"][0], "alt-0");
    assert_eq!(value["matrix"][0][1], 2.0);
    assert_eq!(value["missing_pairs"].as_array().map(Vec::len), Some(2));
}
