//! Micro-averaged F1 with a label exclusion policy.
//!
//! Labels in the exclusion set are ignored on both sides: a prediction of an
//! excluded label counts as no prediction, a gold excluded label as no gold.
//! The default policy excludes `NONE` always and `VAGUE` as well when the
//! label space has exactly four labels (the MATRES-style spaces).

use crate::{Error, LabelId, LabelSet, LabelSpace, Result};
use serde::{Deserialize, Serialize};

/// Correct / predicted / gold counts.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PrfCounts {
    /// Rows where prediction equals gold.
    pub correct: usize,
    /// Rows predicted with a counted label.
    pub predicted: usize,
    /// Rows whose gold label is counted.
    pub gold: usize,
}

impl PrfCounts {
    /// `correct / predicted`, 0 when nothing was predicted.
    #[must_use]
    pub fn precision(&self) -> f64 {
        safe_div(self.correct as f64, self.predicted as f64)
    }

    /// `correct / gold`, 0 when there is no gold.
    #[must_use]
    pub fn recall(&self) -> f64 {
        safe_div(self.correct as f64, self.gold as f64)
    }

    /// Harmonic mean of precision and recall.
    #[must_use]
    pub fn f1(&self) -> f64 {
        f1_score(self.precision(), self.recall())
    }
}

/// Per-label counts over aligned prediction/gold lists.
///
/// # Errors
///
/// Lists of different lengths, or a label id `>= n_labels`.
pub fn label_counts(pred: &[LabelId], gold: &[LabelId], n_labels: usize) -> Result<Vec<PrfCounts>> {
    Error::check_len("predictions vs gold labels", gold.len(), pred.len())?;
    let mut counts = vec![PrfCounts::default(); n_labels];
    for (&p, &g) in pred.iter().zip(gold) {
        if p >= n_labels || g >= n_labels {
            return Err(Error::invalid_input(format!(
                "label pair ({p}, {g}) out of range for {n_labels} labels"
            )));
        }
        counts[p].predicted += 1;
        counts[g].gold += 1;
        if p == g {
            counts[p].correct += 1;
        }
    }
    Ok(counts)
}

/// Micro F1 under the label space's default exclusions.
///
/// ```rust
/// use eventrel::eval::weighted_f1;
/// use eventrel::{DatasetSchema, LabelAlgebra};
///
/// let algebra = LabelAlgebra::temporal_only(DatasetSchema::Matres);
/// // BEFORE=0, AFTER=1, SIMULTANEOUS=2, VAGUE=3; VAGUE is not counted.
/// let f1 = weighted_f1(&[0, 1, 3], &[0, 1, 1], algebra.temporal()).unwrap();
/// assert!((f1 - 0.8).abs() < 1e-12);
/// ```
pub fn weighted_f1(pred: &[LabelId], gold: &[LabelId], space: &LabelSpace) -> Result<f64> {
    weighted_f1_with(pred, gold, space.len(), space.default_exclusions())
}

/// Micro F1 with an explicit exclusion set.
///
/// # Errors
///
/// As [`label_counts`].
pub fn weighted_f1_with(
    pred: &[LabelId],
    gold: &[LabelId],
    n_labels: usize,
    exclusions: LabelSet,
) -> Result<f64> {
    let counts = label_counts(pred, gold, n_labels)?;
    Ok(micro(&counts, exclusions).f1())
}

/// Sum of the counts of every non-excluded label.
#[must_use]
pub fn micro(counts: &[PrfCounts], exclusions: LabelSet) -> PrfCounts {
    counts
        .iter()
        .enumerate()
        .filter(|(label, _)| !exclusions.contains(*label))
        .fold(PrfCounts::default(), |acc, (_, c)| PrfCounts {
            correct: acc.correct + c.correct,
            predicted: acc.predicted + c.predicted,
            gold: acc.gold + c.gold,
        })
}

pub(crate) fn safe_div(num: f64, den: f64) -> f64 {
    if den == 0.0 {
        0.0
    } else {
        num / den
    }
}

/// F1 from precision and recall; 0 when both are 0.
#[must_use]
pub fn f1_score(precision: f64, recall: f64) -> f64 {
    safe_div(2.0 * precision * recall, precision + recall)
}
