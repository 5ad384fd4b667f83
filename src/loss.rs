//! Margin-rescaled structured hinge loss.
//!
//! For row `n` with selected label `ŷ` and gold label `y`:
//!
//! ```text
//! term_n = max(0, Δ(ŷ, y) + s[n][ŷ] - s[n][y])
//! loss   = mean_n term_n
//! ```
//!
//! `Δ` is the Hamming distance between the one-hot rows, so 0 on agreement
//! and 2 otherwise. The `margin` argument is accepted but does not enter the
//! computation. `ŷ` comes from plain global inference, not loss-augmented
//! inference.

use crate::{Assignment, Error, LabelId, Result, ScoreTable};
use serde::{Deserialize, Serialize};

fn check_shapes(best: &Assignment, gold: &[LabelId], scores: &ScoreTable) -> Result<()> {
    Error::check_len("assignment rows vs score rows", scores.n_rows(), best.len())?;
    Error::check_len("gold labels vs score rows", scores.n_rows(), gold.len())?;
    if !best.is_empty() {
        Error::check_len("assignment width vs score width", scores.n_labels(), best.n_labels())?;
    }
    if let Some(bad) = gold.iter().find(|&&g| g >= scores.n_labels()) {
        return Err(Error::invalid_input(format!(
            "gold label {bad} out of range for {} labels",
            scores.n_labels()
        )));
    }
    Ok(())
}

fn hinge_term(best: &Assignment, gold: &[LabelId], scores: &ScoreTable, row: usize) -> f64 {
    let selected = best.label(row);
    let delta = best.hamming(row, gold[row]) as f64;
    (delta + scores.get(row, selected) - scores.get(row, gold[row])).max(0.0)
}

/// Structured hinge loss of one table, averaged over rows.
///
/// An empty table has loss 0.
///
/// # Errors
///
/// [`Error::ShapeMismatch`] when the assignment, gold labels, and scores do
/// not line up; [`Error::InvalidInput`] for an out-of-range gold label.
///
/// # Example
///
/// ```rust
/// use eventrel::loss::structured_hinge;
/// use eventrel::{Assignment, ScoreTable};
///
/// let scores = ScoreTable::from_rows(&[[0.7, 0.3]], 2).unwrap();
/// let best = Assignment::from_labels(vec![0], 2).unwrap();
/// // Wrong by Hamming 2, plus the score gap 0.4.
/// let loss = structured_hinge(&best, &[1], &scores, 1.0).unwrap();
/// assert!((loss - 2.4).abs() < 1e-12);
/// ```
pub fn structured_hinge(
    best: &Assignment,
    gold: &[LabelId],
    scores: &ScoreTable,
    _margin: f64,
) -> Result<f64> {
    check_shapes(best, gold, scores)?;
    let n = scores.n_rows();
    if n == 0 {
        return Ok(0.0);
    }
    let total: f64 = (0..n).map(|row| hinge_term(best, gold, scores, row)).sum();
    Ok(total / n as f64)
}

/// Gradient of [`structured_hinge`] with respect to the scores.
///
/// Rows with a positive term get `+1/N` on the selected label and `-1/N` on
/// the gold label (the two cancel when they coincide); every other cell is 0.
///
/// # Errors
///
/// As [`structured_hinge`].
pub fn hinge_gradient(
    best: &Assignment,
    gold: &[LabelId],
    scores: &ScoreTable,
    _margin: f64,
) -> Result<ScoreTable> {
    check_shapes(best, gold, scores)?;
    let n = scores.n_rows();
    let mut grad = ScoreTable::zeros(n, scores.n_labels());
    if n == 0 {
        return Ok(grad);
    }
    let w = 1.0 / n as f64;
    for row in 0..n {
        if hinge_term(best, gold, scores, row) > 0.0 {
            *grad.get_mut(row, best.label(row)) += w;
            *grad.get_mut(row, gold[row]) -= w;
        }
    }
    Ok(grad)
}

/// Temporal and causal loss of one epoch.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct JointLoss {
    /// Temporal term.
    pub temporal: f64,
    /// Causal term (0 for an empty causal table).
    pub causal: f64,
    /// `temporal + causal`.
    pub total: f64,
}

/// Sum of the temporal and causal structured losses.
///
/// An empty causal table contributes nothing.
///
/// # Errors
///
/// As [`structured_hinge`], for either task.
pub fn joint_loss(
    best: &Assignment,
    gold: &[LabelId],
    scores: &ScoreTable,
    best_c: &Assignment,
    gold_c: &[LabelId],
    scores_c: &ScoreTable,
    margin: f64,
) -> Result<JointLoss> {
    let temporal = structured_hinge(best, gold, scores, margin)?;
    let causal = if scores_c.is_empty() && gold_c.is_empty() && best_c.is_empty() {
        0.0
    } else {
        structured_hinge(best_c, gold_c, scores_c, margin)?
    };
    Ok(JointLoss {
        temporal,
        causal,
        total: temporal + causal,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table(rows: &[[f64; 3]]) -> ScoreTable {
        ScoreTable::from_rows(rows, 3).unwrap()
    }

    #[test]
    fn test_zero_when_best_is_gold() {
        let scores = table(&[[0.2, 0.5, 0.3], [0.6, 0.1, 0.3]]);
        let best = Assignment::from_labels(vec![1, 0], 3).unwrap();
        assert_eq!(structured_hinge(&best, &[1, 0], &scores, 0.5).unwrap(), 0.0);
        let grad = hinge_gradient(&best, &[1, 0], &scores, 0.5).unwrap();
        assert!(grad.rows().flatten().all(|&g| g == 0.0));
    }

    #[test]
    fn test_mean_over_rows() {
        let scores = table(&[[0.2, 0.5, 0.3], [0.6, 0.1, 0.3]]);
        // Row 0 correct, row 1 wrong: 2 + 0.6 - 0.3 = 2.3.
        let best = Assignment::from_labels(vec![1, 0], 3).unwrap();
        let loss = structured_hinge(&best, &[1, 2], &scores, 0.0).unwrap();
        assert!((loss - 1.15).abs() < 1e-12);
    }

    #[test]
    fn test_term_clamped_at_zero() {
        // Selected label scores far below gold: 2 + 0.0 - 5.0 < 0.
        let scores = table(&[[0.0, 5.0, 0.0]]);
        let best = Assignment::from_labels(vec![0], 3).unwrap();
        assert_eq!(structured_hinge(&best, &[1], &scores, 0.0).unwrap(), 0.0);
    }

    #[test]
    fn test_margin_is_ignored() {
        let scores = table(&[[0.4, 0.6, 0.0]]);
        let best = Assignment::from_labels(vec![1], 3).unwrap();
        let a = structured_hinge(&best, &[0], &scores, 0.0).unwrap();
        let b = structured_hinge(&best, &[0], &scores, 10.0).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_gradient_signs() {
        let scores = table(&[[0.4, 0.6, 0.0], [0.1, 0.1, 0.8]]);
        let best = Assignment::from_labels(vec![1, 2], 3).unwrap();
        let grad = hinge_gradient(&best, &[0, 2], &scores, 0.0).unwrap();
        assert_eq!(grad.row(0), &[-0.5, 0.5, 0.0]);
        assert_eq!(grad.row(1), &[0.0, 0.0, 0.0]);
    }

    #[test]
    fn test_empty_causal_contributes_nothing() {
        let scores = table(&[[0.4, 0.6, 0.0]]);
        let best = Assignment::from_labels(vec![1], 3).unwrap();
        let loss = joint_loss(
            &best,
            &[0],
            &scores,
            &Assignment::empty(0),
            &[],
            &ScoreTable::new(0),
            0.0,
        )
        .unwrap();
        assert_eq!(loss.causal, 0.0);
        assert_eq!(loss.total, loss.temporal);
        assert!((loss.temporal - 2.2).abs() < 1e-12);
    }

    #[test]
    fn test_shape_mismatch() {
        let scores = table(&[[0.4, 0.6, 0.0]]);
        let best = Assignment::from_labels(vec![1], 3).unwrap();
        assert!(matches!(
            structured_hinge(&best, &[0, 1], &scores, 0.0),
            Err(Error::ShapeMismatch { .. })
        ));
        assert!(matches!(
            structured_hinge(&best, &[3], &scores, 0.0),
            Err(Error::InvalidInput(_))
        ));
    }
}
