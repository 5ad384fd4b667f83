//! Per-label classification report over decoded predictions.

use super::metrics::{label_counts, micro, PrfCounts};
use crate::{LabelId, LabelSet, LabelSpace, Result};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Scores of one label.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LabelMetrics {
    /// Label name.
    pub label: String,
    /// Precision.
    pub precision: f64,
    /// Recall.
    pub recall: f64,
    /// F1.
    pub f1: f64,
    /// Gold rows with this label.
    pub support: usize,
    /// Rows predicted with this label.
    pub predicted: usize,
    /// Whether the label is left out of the micro average.
    pub excluded: bool,
}

/// Precision / recall / F1 per label plus the micro aggregate.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClassificationReport {
    /// Name of the evaluated system.
    pub name: String,
    /// One entry per label, in label-id order.
    pub per_label: Vec<LabelMetrics>,
    /// Micro precision over non-excluded labels.
    pub micro_precision: f64,
    /// Micro recall over non-excluded labels.
    pub micro_recall: f64,
    /// Micro F1 over non-excluded labels.
    pub micro_f1: f64,
    /// Rows evaluated.
    pub total: usize,
}

impl ClassificationReport {
    /// Report under the label space's default exclusions.
    ///
    /// # Errors
    ///
    /// As [`Self::with_exclusions`].
    pub fn new(
        name: impl Into<String>,
        pred: &[LabelId],
        gold: &[LabelId],
        space: &LabelSpace,
    ) -> Result<Self> {
        Self::with_exclusions(name, pred, gold, space, space.default_exclusions())
    }

    /// Report with an explicit exclusion set.
    ///
    /// # Errors
    ///
    /// Shape mismatch between `pred` and `gold`, or a label id outside `space`.
    pub fn with_exclusions(
        name: impl Into<String>,
        pred: &[LabelId],
        gold: &[LabelId],
        space: &LabelSpace,
        exclusions: LabelSet,
    ) -> Result<Self> {
        let counts = label_counts(pred, gold, space.len())?;
        let per_label = counts
            .iter()
            .enumerate()
            .map(|(id, c)| label_metrics(space, id, c, exclusions.contains(id)))
            .collect();
        let agg = micro(&counts, exclusions);
        Ok(Self {
            name: name.into(),
            per_label,
            micro_precision: agg.precision(),
            micro_recall: agg.recall(),
            micro_f1: agg.f1(),
            total: gold.len(),
        })
    }

    /// Metrics of a label by name.
    #[must_use]
    pub fn label(&self, name: &str) -> Option<&LabelMetrics> {
        self.per_label.iter().find(|m| m.label == name)
    }

    /// Human-readable table.
    #[must_use]
    pub fn to_string_human(&self) -> String {
        let mut out = String::new();
        out.push_str(&format!("Classification report: {}\n", self.name));
        out.push_str(&format!(
            "{:<14} {:>9} {:>9} {:>9} {:>9}\n",
            "label", "precision", "recall", "f1", "support"
        ));
        for m in &self.per_label {
            let marker = if m.excluded { " *" } else { "" };
            out.push_str(&format!(
                "{:<14} {:>9.4} {:>9.4} {:>9.4} {:>9}{}\n",
                m.label, m.precision, m.recall, m.f1, m.support, marker
            ));
        }
        out.push_str(&format!(
            "{:<14} {:>9.4} {:>9.4} {:>9.4} {:>9}\n",
            "micro", self.micro_precision, self.micro_recall, self.micro_f1, self.total
        ));
        if self.per_label.iter().any(|m| m.excluded) {
            out.push_str("(* excluded from micro average)\n");
        }
        out
    }
}

impl fmt::Display for ClassificationReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_string_human())
    }
}

fn label_metrics(space: &LabelSpace, id: LabelId, c: &PrfCounts, excluded: bool) -> LabelMetrics {
    LabelMetrics {
        label: space.name_of(id).unwrap_or("?").to_string(),
        precision: c.precision(),
        recall: c.recall(),
        f1: c.f1(),
        support: c.gold,
        predicted: c.predicted,
        excluded,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{DatasetSchema, LabelAlgebra};

    #[test]
    fn test_report_matches_counts() {
        let algebra = LabelAlgebra::temporal_only(DatasetSchema::Tbd);
        let space = algebra.temporal();
        let before = space.id_of("BEFORE").unwrap();
        let after = space.id_of("AFTER").unwrap();
        let gold = [before, after, before, before];
        let pred = [before, after, after, before];

        let report = ClassificationReport::new("test", &pred, &gold, space).unwrap();
        let b = report.label("BEFORE").unwrap();
        assert_eq!(b.precision, 1.0);
        assert!((b.recall - 2.0 / 3.0).abs() < 1e-12);
        assert!((b.f1 - 0.8).abs() < 1e-12);
        assert_eq!(b.support, 3);
        assert!((report.micro_f1 - 0.75).abs() < 1e-12);
        assert_eq!(report.total, 4);

        let text = report.to_string_human();
        assert!(text.contains("BEFORE"));
        assert!(text.contains("micro"));
    }

    #[test]
    fn test_excluded_labels_marked() {
        let algebra = LabelAlgebra::temporal_only(DatasetSchema::Matres);
        let space = algebra.temporal();
        let report = ClassificationReport::new("m", &[0, 3], &[0, 3], space).unwrap();
        assert!(report.label("VAGUE").unwrap().excluded);
        assert!(!report.label("BEFORE").unwrap().excluded);
        assert_eq!(report.micro_f1, 1.0);
        assert!(report.to_string_human().contains("excluded"));
    }
}
