//! Post-hoc check of an assignment against the global constraints.
//!
//! Useful for measuring how often local (argmax) decoding breaks the
//! constraints that global inference enforces.

use super::index::PairIndex;
use crate::{Assignment, Error, LabelAlgebra, Pair, Result};
use serde::{Deserialize, Serialize};

/// One broken constraint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Violation {
    /// Two rows of the same relationship disagree (after inversion).
    Symmetry {
        /// Task the rows belong to.
        task: crate::Task,
        /// First row of the relationship.
        anchor: usize,
        /// Disagreeing row.
        row: usize,
    },
    /// `(a, b)`, `(b, c)`, `(a, c)` compose to a forbidden label.
    Transitivity {
        /// Document of the triple.
        doc_id: String,
        /// Anchor rows of `(a, b)`, `(b, c)`, `(a, c)`.
        rows: [usize; 3],
    },
    /// A causal label disagrees with the temporal label of the same pair.
    CrossTask {
        /// Temporal anchor row.
        temporal_row: usize,
        /// Causal anchor row.
        causal_row: usize,
    },
}

/// All violations found in an assignment.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConsistencyReport {
    /// Violations in discovery order.
    pub violations: Vec<Violation>,
}

impl ConsistencyReport {
    /// Whether no constraint is broken.
    #[must_use]
    pub fn is_consistent(&self) -> bool {
        self.violations.is_empty()
    }

    /// Number of transitivity violations.
    #[must_use]
    pub fn transitivity_count(&self) -> usize {
        self.violations
            .iter()
            .filter(|v| matches!(v, Violation::Transitivity { .. }))
            .count()
    }
}

/// Check temporal and causal assignments against symmetry, transitivity,
/// and cross-task constraints.
///
/// # Errors
///
/// Shape mismatches between pairs and assignments, or a self-relation.
pub fn check_consistency(
    pairs: &[Pair],
    temporal: &Assignment,
    pairs_c: &[Pair],
    causal: &Assignment,
    algebra: &LabelAlgebra,
) -> Result<ConsistencyReport> {
    Error::check_len("temporal assignment vs pairs", pairs.len(), temporal.len())?;
    Error::check_len("causal assignment vs pairs", pairs_c.len(), causal.len())?;
    let space = algebra.temporal();
    let t_index = PairIndex::new(pairs)?;
    let mut report = ConsistencyReport::default();

    let oriented = |view: (usize, bool)| {
        let label = temporal.label(view.0);
        if view.1 {
            label
        } else {
            space.inverse(label)
        }
    };

    for dup in t_index.duplicates() {
        let expected = if dup.same_orientation {
            temporal.label(dup.anchor)
        } else {
            space.inverse(temporal.label(dup.anchor))
        };
        if temporal.label(dup.row) != expected {
            report.violations.push(Violation::Symmetry {
                task: crate::Task::Temporal,
                anchor: dup.anchor,
                row: dup.row,
            });
        }
    }

    for doc in t_index.documents() {
        for [i, j, k] in doc.triples() {
            for (a, b, c) in [(i, j, k), (j, i, k), (i, k, j)] {
                let (Some(ab), Some(bc), Some(ac)) =
                    (doc.oriented(a, b), doc.oriented(b, c), doc.oriented(a, c))
                else {
                    continue;
                };
                if !algebra.allowed(oriented(ab), oriented(bc)).contains(oriented(ac)) {
                    report.violations.push(Violation::Transitivity {
                        doc_id: doc.doc_id.clone(),
                        rows: [ab.0, bc.0, ac.0],
                    });
                }
            }
        }
    }

    if let Some(causal_space) = algebra.causal() {
        let c_index = PairIndex::new(pairs_c)?;
        for dup in c_index.duplicates() {
            let expected = if dup.same_orientation {
                causal.label(dup.anchor)
            } else {
                causal_space.inverse(causal.label(dup.anchor))
            };
            if causal.label(dup.row) != expected {
                report.violations.push(Violation::Symmetry {
                    task: crate::Task::Causal,
                    anchor: dup.anchor,
                    row: dup.row,
                });
            }
        }
        for doc in c_index.documents() {
            for row in doc.anchor_rows() {
                let pair = &pairs_c[row];
                let Some(view) = t_index.lookup(&pair.doc_id, &pair.left, &pair.right) else {
                    continue;
                };
                let allowed = algebra.temporal_allowed_for_causal(causal.label(row));
                if !allowed.contains(oriented(view)) {
                    report.violations.push(Violation::CrossTask {
                        temporal_row: view.0,
                        causal_row: row,
                    });
                }
            }
        }
    }

    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::DatasetSchema;

    #[test]
    fn test_detects_transitivity_break() {
        let algebra = LabelAlgebra::temporal_only(DatasetSchema::Matres);
        let before = algebra.temporal().id_of("BEFORE").unwrap();
        let after = algebra.temporal().id_of("AFTER").unwrap();
        let pairs = vec![
            Pair::new("d", "a", "b"),
            Pair::new("d", "b", "c"),
            Pair::new("d", "a", "c"),
        ];
        let bad = Assignment::from_labels(vec![before, before, after], 4).unwrap();
        let report = check_consistency(&pairs, &bad, &[], &Assignment::empty(0), &algebra).unwrap();
        assert!(!report.is_consistent());
        assert!(report.transitivity_count() >= 1);

        let good = Assignment::from_labels(vec![before, before, before], 4).unwrap();
        let report = check_consistency(&pairs, &good, &[], &Assignment::empty(0), &algebra).unwrap();
        assert!(report.is_consistent());
    }

    #[test]
    fn test_detects_symmetry_and_cross_task() {
        let algebra = LabelAlgebra::joint(DatasetSchema::Tcr);
        let before = algebra.temporal().id_of("BEFORE").unwrap();
        let pairs = vec![
            Pair::new("d", "e1", "e2"),
            Pair::new("d", "e2", "e1").with_reversed(true),
        ];
        let temporal = Assignment::from_labels(vec![before, before], 4).unwrap();
        let caused_by = algebra
            .space(crate::Task::Causal)
            .unwrap()
            .id_of("CAUSED_BY")
            .unwrap();
        let pairs_c = vec![Pair::new("d", "e1", "e2")];
        let causal = Assignment::from_labels(vec![caused_by], 2).unwrap();

        let report = check_consistency(&pairs, &temporal, &pairs_c, &causal, &algebra).unwrap();
        assert_eq!(
            report.violations,
            vec![
                Violation::Symmetry {
                    task: crate::Task::Temporal,
                    anchor: 0,
                    row: 1
                },
                Violation::CrossTask {
                    temporal_row: 0,
                    causal_row: 0
                },
            ]
        );
    }
}
