use ahp_elicit::elicitation::{Action, Direction};
use ahp_elicit::evaluate::EvaluationConfig;
use ahp_elicit::judgment::ItemSet;
use ahp_elicit::scale::ScaleFamily;
use ahp_elicit::survey::{PairwiseSurvey, SurveyStep};

/// First item preferred on the High strip at its strongest grade (ratio 9).
fn strongly_first() -> Vec<Action> {
    vec![
        Action::Choose(Direction::FirstPreferred),
        Action::Select(3),
        Action::Select(4),
    ]
}

fn strongly_second() -> Vec<Action> {
    vec![
        Action::Choose(Direction::SecondPreferred),
        Action::Select(3),
        Action::Select(4),
    ]
}

fn answer(survey: &mut PairwiseSurvey, actions: Vec<Action>) {
    let mut recorded = false;
    for action in actions {
        if let SurveyStep::Recorded { .. } = survey.apply(action).unwrap() {
            recorded = true;
        }
    }
    assert!(recorded);
}

#[test]
fn cyclic_answers_are_flagged_with_pair_hints() {
    let items = ItemSet::new(["north", "east", "south"]).unwrap();
    let mut survey = PairwiseSurvey::new(items, ScaleFamily::Integer).unwrap();

    // north > east, north < south, east > south: a cycle.
    answer(&mut survey, strongly_first());
    answer(&mut survey, strongly_second());
    answer(&mut survey, strongly_first());
    assert!(survey.is_complete());
    assert!(survey.current_pair().is_none());

    let out = survey.finalize(&EvaluationConfig::default()).unwrap();
    assert!(!out.consistency.is_consistent);
    assert!(out.consistency.cr > 0.10);
    let hints: Vec<&String> = out
        .consistency
        .recommendations
        .iter()
        .filter(|r| r.starts_with("Reconsider "))
        .collect();
    assert_eq!(hints.len(), 3);
    assert!(hints[0].contains(" vs "));
}

#[test]
fn revisiting_a_pair_replaces_its_judgment() {
    let items = ItemSet::new(["a", "b", "c"]).unwrap();
    let mut survey = PairwiseSurvey::new(items, ScaleFamily::Integer).unwrap();

    answer(&mut survey, strongly_first());
    survey.back();
    answer(&mut survey, strongly_second());

    let snapshot = survey.judgments();
    assert_eq!(snapshot.len(), 1);
    assert!((snapshot[0].judgment.ratio - 1.0 / 9.0).abs() < 1e-12);
}

#[test]
fn partial_survey_finalizes_with_missing_pairs() {
    let items = ItemSet::new(["a", "b", "c", "d"]).unwrap();
    let mut survey = PairwiseSurvey::new(items, ScaleFamily::Balanced).unwrap();

    answer(&mut survey, strongly_first());
    survey.skip().unwrap();
    survey.set_scale(ScaleFamily::Power);
    answer(&mut survey, vec![Action::NotSure]);

    let progress = survey.progress();
    assert_eq!((progress.visited, progress.judged, progress.total), (3, 2, 6));
    assert!(!survey.is_complete());

    let out = survey.finalize(&EvaluationConfig::default()).unwrap();
    assert_eq!(out.missing_pairs, vec![(0, 2), (1, 2), (1, 3), (2, 3)]);
    assert_eq!(out.ranks[0], 1);
}
