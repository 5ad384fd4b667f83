//! Property tests for the structured loss and the F1 metric.

use eventrel::eval::{weighted_f1_with, ClassificationReport};
use eventrel::loss::{hinge_gradient, joint_loss, structured_hinge};
use eventrel::{Assignment, DatasetSchema, LabelAlgebra, LabelSet, ScoreTable};
use proptest::prelude::*;

const C: usize = 4;

fn rows_strategy() -> impl Strategy<Value = Vec<(Vec<f64>, usize, usize)>> {
    prop::collection::vec(
        (prop::collection::vec(-3.0f64..3.0, C), 0..C, 0..C),
        0..24,
    )
}

fn split(rows: &[(Vec<f64>, usize, usize)]) -> (ScoreTable, Assignment, Vec<usize>) {
    let scores: Vec<Vec<f64>> = rows.iter().map(|(s, _, _)| s.clone()).collect();
    let best: Vec<usize> = rows.iter().map(|(_, b, _)| *b).collect();
    let gold: Vec<usize> = rows.iter().map(|(_, _, g)| *g).collect();
    (
        ScoreTable::from_rows(&scores, C).unwrap(),
        Assignment::from_labels(best, C).unwrap(),
        gold,
    )
}

proptest! {
    #[test]
    fn test_loss_invariant_to_row_permutation(rows in rows_strategy(), shift in 0usize..24) {
        let (scores, best, gold) = split(&rows);
        let base = structured_hinge(&best, &gold, &scores, 0.0).unwrap();

        let mut permuted = rows.clone();
        permuted.reverse();
        if !permuted.is_empty() {
            let k = shift % permuted.len();
            permuted.rotate_left(k);
        }
        let (p_scores, p_best, p_gold) = split(&permuted);
        let other = structured_hinge(&p_best, &p_gold, &p_scores, 0.0).unwrap();
        prop_assert!((base - other).abs() < 1e-9);
    }

    #[test]
    fn test_loss_nonnegative_and_zero_on_gold(rows in rows_strategy()) {
        let (scores, best, gold) = split(&rows);
        prop_assert!(structured_hinge(&best, &gold, &scores, 0.0).unwrap() >= 0.0);

        let exact = Assignment::from_labels(gold.clone(), C).unwrap();
        prop_assert_eq!(structured_hinge(&exact, &gold, &scores, 0.0).unwrap(), 0.0);
    }

    #[test]
    fn test_gradient_rows_sum_to_zero(rows in rows_strategy()) {
        let (scores, best, gold) = split(&rows);
        let grad = hinge_gradient(&best, &gold, &scores, 0.0).unwrap();
        prop_assert_eq!(grad.n_rows(), scores.n_rows());
        for row in grad.rows() {
            prop_assert!(row.iter().sum::<f64>().abs() < 1e-12);
        }
    }

    #[test]
    fn test_f1_bounded(
        pairs in prop::collection::vec((0..C, 0..C), 0..50),
        excluded in prop::collection::vec(0..C, 0..2),
    ) {
        let pred: Vec<usize> = pairs.iter().map(|(p, _)| *p).collect();
        let gold: Vec<usize> = pairs.iter().map(|(_, g)| *g).collect();
        let exclusions: LabelSet = excluded.into_iter().collect();
        let f1 = weighted_f1_with(&pred, &gold, C, exclusions).unwrap();
        prop_assert!((0.0..=1.0).contains(&f1));
    }

    #[test]
    fn test_perfect_prediction_scores_one(gold in prop::collection::vec(0usize..2, 1..30)) {
        // BEFORE / AFTER only, never excluded.
        let f1 = weighted_f1_with(&gold, &gold, C, LabelSet::empty()).unwrap();
        prop_assert_eq!(f1, 1.0);
    }
}

#[test]
fn test_joint_loss_adds_causal_term() {
    let scores = ScoreTable::from_rows(&[[0.0, 1.0, 0.0, 0.0]], 4).unwrap();
    let best = Assignment::from_labels(vec![1], 4).unwrap();
    let scores_c = ScoreTable::from_rows(&[[0.3, 0.5]], 2).unwrap();
    let best_c = Assignment::from_labels(vec![1], 2).unwrap();

    let loss = joint_loss(&best, &[0], &scores, &best_c, &[0], &scores_c, 0.0).unwrap();
    assert!((loss.temporal - 3.0).abs() < 1e-12);
    assert!((loss.causal - 2.2).abs() < 1e-12);
    assert!((loss.total - 5.2).abs() < 1e-12);
}

#[test]
fn test_report_on_reference_example() {
    // gold = [A, B, A, A], pred = [A, B, B, A] with no exclusions.
    let algebra = LabelAlgebra::temporal_only(DatasetSchema::Tbd);
    let space = algebra.temporal();
    let report =
        ClassificationReport::with_exclusions("ref", &[0, 1, 1, 0], &[0, 1, 0, 0], space, LabelSet::empty())
            .unwrap();
    let a = &report.per_label[0];
    assert_eq!(a.precision, 1.0);
    assert!((a.recall - 2.0 / 3.0).abs() < 1e-12);
    assert!((a.f1 - 0.8).abs() < 1e-12);
    assert!((report.micro_f1 - 0.75).abs() < 1e-12);
}
