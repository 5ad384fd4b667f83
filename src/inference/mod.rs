//! Global inference: one constrained decoding over every scored pair.
//!
//! Given temporal and causal score tables, the engine picks exactly one label
//! per row so that the total score of the chosen labels is maximal, subject to:
//!
//! | Constraint   | Meaning                                                        |
//! |--------------|----------------------------------------------------------------|
//! | uniqueness   | one label per row                                              |
//! | symmetry     | rows for `(a, b)` and `(b, a)` carry inverse labels            |
//! | duplicates   | rows repeating the same `(a, b)` carry the same label          |
//! | transitivity | labels on `(a, b)`, `(b, c)` restrict `(a, c)`, per document   |
//! | cross-task   | a causal label restricts the temporal label of the same pair   |
//!
//! The problem is expressed through the [`ConstraintSolver`] trait. The
//! default backend is [`MilpSolver`], an integer program per document solved
//! with LP-relaxation bounds; [`BranchAndBound`] is a dependency-free exact
//! search for small documents. Documents share no constraint, so both
//! backends solve them as independent components.
//!
//! Transitivity is written in its aggregated form: for premises `l1` on
//! `(a, b)` and `l2` on `(b, c)`,
//!
//! ```text
//! x[ab][l1] + x[bc][l2] + sum(x[ac][l3] for l3 not in allowed(l1, l2)) <= 2
//! ```
//!
//! which, given uniqueness, forbids the same labels as one implication per
//! `l3` but has a tighter LP relaxation.
//!
//! # Example
//!
//! ```rust
//! use eventrel::inference::GlobalInference;
//! use eventrel::{DatasetSchema, LabelAlgebra, Pair, ScoreTable};
//!
//! let algebra = LabelAlgebra::temporal_only(DatasetSchema::Matres);
//! let pairs = vec![Pair::new("d1", "e1", "e2")];
//! let scores = ScoreTable::from_rows(&[[0.1, 0.7, 0.1, 0.1]], 4).unwrap();
//! let causal = ScoreTable::new(0);
//!
//! let out = GlobalInference::new(&algebra)
//!     .solve(&pairs, &scores, &[], &causal)
//!     .unwrap();
//! assert_eq!(out.temporal.labels(), &[1]);
//! ```

mod branch_bound;
mod consistency;
mod index;
mod milp;
mod model;
mod solver;

pub use branch_bound::BranchAndBound;
pub use milp::MilpSolver;
pub use consistency::{check_consistency, ConsistencyReport, Violation};
pub use solver::{Comparison, ConstraintSolver, SolveLimits, SolveSummary, VarId};

use crate::{Assignment, Error, LabelAlgebra, LabelSpace, Pair, Result, ScoreTable};
use index::{DocGraph, PairIndex};
use serde::{Deserialize, Serialize};
use std::time::Duration;

#[cfg(feature = "parallel")]
use rayon::prelude::*;

/// Which [`ConstraintSolver`] implementation [`GlobalInference::solve`] uses.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SolverBackend {
    /// [`MilpSolver`].
    #[default]
    Milp,
    /// [`BranchAndBound`].
    BranchAndBound,
}

/// Constraint counts by family.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConstraintCounts {
    /// One-label-per-row constraints.
    pub uniqueness: usize,
    /// Equalities tying inverse and duplicate rows.
    pub symmetry: usize,
    /// Transitivity constraints, one per chain and premise label pair.
    pub transitivity: usize,
    /// Causal-to-temporal implications.
    pub cross_task: usize,
}

impl ConstraintCounts {
    /// Sum over all families.
    #[must_use]
    pub fn total(&self) -> usize {
        self.uniqueness + self.symmetry + self.transitivity + self.cross_task
    }
}

/// Statistics of one global inference call.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct InferenceStats {
    /// Total score of the chosen labels.
    pub objective: f64,
    /// Binary variables declared.
    pub variables: usize,
    /// Constraints declared, by family.
    pub constraints: ConstraintCounts,
    /// Search nodes explored by the backend (components solved, for [`MilpSolver`]).
    pub nodes: u64,
    /// Wall-clock time of the solve.
    pub elapsed: Duration,
}

/// Labels chosen for both tasks.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JointAssignment {
    /// One temporal label per temporal row.
    pub temporal: Assignment,
    /// One causal label per causal row (zero rows when there is no causal input).
    pub causal: Assignment,
    /// Solve statistics.
    pub stats: InferenceStats,
}

/// The global inference engine.
#[derive(Debug, Clone, Copy)]
pub struct GlobalInference<'a> {
    algebra: &'a LabelAlgebra,
    limits: SolveLimits,
    backend: SolverBackend,
}

impl<'a> GlobalInference<'a> {
    /// Engine with default solver limits.
    #[must_use]
    pub fn new(algebra: &'a LabelAlgebra) -> Self {
        Self {
            algebra,
            limits: SolveLimits::default(),
            backend: SolverBackend::default(),
        }
    }

    /// Override the solver limits.
    #[must_use]
    pub fn with_limits(mut self, limits: SolveLimits) -> Self {
        self.limits = limits;
        self
    }

    /// Choose the backend used by [`Self::solve`].
    #[must_use]
    pub fn with_backend(mut self, backend: SolverBackend) -> Self {
        self.backend = backend;
        self
    }

    /// Solve with the configured built-in backend.
    ///
    /// `pairs[i]` identifies row `i` of `scores`; likewise for the causal
    /// inputs. Pass an empty causal pair list with a zero-row table when the
    /// causal task is inactive.
    ///
    /// # Errors
    ///
    /// - [`Error::ShapeMismatch`] when pairs and rows disagree, or a table's
    ///   width differs from its label space.
    /// - [`Error::InvalidInput`] for causal rows on a temporal-only algebra or
    ///   a pair relating an event to itself.
    /// - [`Error::Infeasible`] / [`Error::SolverTimeout`] from the backend.
    /// - [`Error::InvalidAssignment`] if a row comes back without exactly one
    ///   selected label.
    pub fn solve(
        &self,
        pairs: &[Pair],
        scores: &ScoreTable,
        pairs_c: &[Pair],
        scores_c: &ScoreTable,
    ) -> Result<JointAssignment> {
        match self.backend {
            SolverBackend::Milp => {
                let mut solver = MilpSolver::with_limits(self.limits);
                self.solve_with(&mut solver, pairs, scores, pairs_c, scores_c)
            }
            SolverBackend::BranchAndBound => {
                let mut solver = BranchAndBound::with_limits(self.limits);
                self.solve_with(&mut solver, pairs, scores, pairs_c, scores_c)
            }
        }
    }

    /// Solve with a caller-provided backend.
    ///
    /// The backend should be fresh; the engine declares every variable and
    /// constraint itself.
    ///
    /// # Errors
    ///
    /// As [`Self::solve`], with backend failures coming from `solver`.
    pub fn solve_with<S: ConstraintSolver>(
        &self,
        solver: &mut S,
        pairs: &[Pair],
        scores: &ScoreTable,
        pairs_c: &[Pair],
        scores_c: &ScoreTable,
    ) -> Result<JointAssignment> {
        let temporal_space = self.algebra.temporal();
        check_table("temporal", pairs, scores, temporal_space)?;
        let causal_space = match (self.algebra.causal(), pairs_c.is_empty()) {
            (Some(space), _) => {
                check_table("causal", pairs_c, scores_c, space)?;
                Some(space)
            }
            (None, true) => {
                Error::check_len("causal score rows vs pairs", 0, scores_c.n_rows())?;
                None
            }
            (None, false) => {
                return Err(Error::invalid_input(
                    "causal rows given to a temporal-only label algebra",
                ))
            }
        };

        let t_index = PairIndex::new(pairs)?;
        let c_index = PairIndex::new(pairs_c)?;
        let mut counts = ConstraintCounts::default();

        // Variables, objective, uniqueness.
        let t_vars = declare_rows(solver, scores, &mut counts);
        let c_vars = match causal_space {
            Some(_) => declare_rows(solver, scores_c, &mut counts),
            None => RowVars::default(),
        };
        let mut objective = Vec::with_capacity(t_vars.vars.len() + c_vars.vars.len());
        objective.extend(t_vars.vars.iter().copied().zip(scores.rows().flatten().copied()));
        objective.extend(c_vars.vars.iter().copied().zip(scores_c.rows().flatten().copied()));
        solver.set_objective(&objective);

        // Symmetry and duplicates.
        add_symmetry(solver, &t_index, &t_vars, temporal_space, &mut counts);
        if let Some(space) = causal_space {
            add_symmetry(solver, &c_index, &c_vars, space, &mut counts);
        }

        // Transitivity, one document at a time.
        let docs: Vec<&DocGraph> = t_index.documents().collect();
        let per_doc = |doc: &&DocGraph| transitivity_rules(doc, &t_vars, self.algebra);
        #[cfg(feature = "parallel")]
        let rules: Vec<Vec<Rule>> = docs.par_iter().map(per_doc).collect();
        #[cfg(not(feature = "parallel"))]
        let rules: Vec<Vec<Rule>> = docs.iter().map(per_doc).collect();
        for rule in rules.into_iter().flatten() {
            let terms: Vec<(VarId, i64)> = rule
                .premises
                .iter()
                .chain(&rule.forbidden)
                .map(|&v| (v, 1))
                .collect();
            solver.add_linear(&terms, Comparison::Le, 2);
            counts.transitivity += 1;
        }

        // Causal label restricts the temporal label of the same pair.
        if let Some(space) = causal_space {
            for doc in c_index.documents() {
                for anchor in doc.anchor_rows() {
                    let pair = &pairs_c[anchor];
                    let Some(view) = t_index.lookup(&pair.doc_id, &pair.left, &pair.right) else {
                        continue;
                    };
                    for lc in 0..space.len() {
                        let allowed = self.algebra.temporal_allowed_for_causal(lc);
                        for lt in 0..temporal_space.len() {
                            if allowed.contains(lt) {
                                continue;
                            }
                            let forbidden = t_vars.oriented(view, lt, temporal_space);
                            solver.add_implication(&[c_vars.var(anchor, lc)], forbidden);
                            counts.cross_task += 1;
                        }
                    }
                }
            }
        }

        log::debug!(
            "global inference: {} temporal rows over {} documents, {} causal rows, {} constraints",
            pairs.len(),
            docs.len(),
            pairs_c.len(),
            counts.total()
        );

        let summary = solver.solve()?;
        let temporal = read_assignment(solver, &t_vars)?;
        let causal = match causal_space {
            Some(_) => read_assignment(solver, &c_vars)?,
            None => Assignment::empty(scores_c.n_labels()),
        };

        let stats = InferenceStats {
            objective: summary.objective,
            variables: solver.num_variables(),
            constraints: counts,
            nodes: summary.nodes,
            elapsed: summary.elapsed,
        };
        log::info!(
            "global inference solved: objective {:.4}, {} variables, {} constraints ({} transitivity), {} nodes in {:?}",
            stats.objective,
            stats.variables,
            counts.total(),
            counts.transitivity,
            stats.nodes,
            stats.elapsed
        );
        Ok(JointAssignment {
            temporal,
            causal,
            stats,
        })
    }
}

/// Solve with default limits, returning `(temporal, causal)` assignments.
///
/// Shorthand for [`GlobalInference::solve`].
///
/// # Errors
///
/// As [`GlobalInference::solve`].
pub fn solve(
    pairs: &[Pair],
    scores: &ScoreTable,
    pairs_c: &[Pair],
    scores_c: &ScoreTable,
    algebra: &LabelAlgebra,
) -> Result<(Assignment, Assignment)> {
    let out = GlobalInference::new(algebra).solve(pairs, scores, pairs_c, scores_c)?;
    Ok((out.temporal, out.causal))
}

// =============================================================================
// Model construction
// =============================================================================

#[derive(Debug, Default)]
struct RowVars {
    n_labels: usize,
    vars: Vec<VarId>,
}

impl RowVars {
    fn var(&self, row: usize, label: usize) -> VarId {
        self.vars[row * self.n_labels + label]
    }

    /// Variable meaning "`a -> b` has `label`", where `view` is the anchor row
    /// of `{a, b}` and whether it runs `a -> b`.
    fn oriented(&self, view: (usize, bool), label: usize, space: &LabelSpace) -> VarId {
        let (row, forward) = view;
        if forward {
            self.var(row, label)
        } else {
            self.var(row, space.inverse(label))
        }
    }

    fn n_rows(&self) -> usize {
        if self.n_labels == 0 {
            0
        } else {
            self.vars.len() / self.n_labels
        }
    }
}

struct Rule {
    premises: [VarId; 2],
    forbidden: Vec<VarId>,
}

fn check_table(task: &str, pairs: &[Pair], scores: &ScoreTable, space: &LabelSpace) -> Result<()> {
    Error::check_len(&format!("{task} score rows vs pairs"), pairs.len(), scores.n_rows())?;
    if !pairs.is_empty() {
        Error::check_len(&format!("{task} score row width"), space.len(), scores.n_labels())?;
    }
    Ok(())
}

fn declare_rows<S: ConstraintSolver>(
    solver: &mut S,
    scores: &ScoreTable,
    counts: &mut ConstraintCounts,
) -> RowVars {
    let n_labels = scores.n_labels();
    let mut vars = Vec::with_capacity(scores.n_rows() * n_labels);
    for _ in 0..scores.n_rows() {
        let row: Vec<VarId> = (0..n_labels).map(|_| solver.add_variable()).collect();
        let terms: Vec<(VarId, i64)> = row.iter().map(|&v| (v, 1)).collect();
        solver.add_linear(&terms, Comparison::Eq, 1);
        counts.uniqueness += 1;
        vars.extend(row);
    }
    RowVars { n_labels, vars }
}

fn add_symmetry<S: ConstraintSolver>(
    solver: &mut S,
    index: &PairIndex,
    vars: &RowVars,
    space: &LabelSpace,
    counts: &mut ConstraintCounts,
) {
    for dup in index.duplicates() {
        for label in 0..space.len() {
            let other = if dup.same_orientation {
                label
            } else {
                space.inverse(label)
            };
            solver.add_linear(
                &[(vars.var(dup.anchor, label), 1), (vars.var(dup.row, other), -1)],
                Comparison::Eq,
                0,
            );
            counts.symmetry += 1;
        }
    }
}

fn transitivity_rules(doc: &DocGraph, vars: &RowVars, algebra: &LabelAlgebra) -> Vec<Rule> {
    let space = algebra.temporal();
    let n = space.len();
    let mut rules = Vec::new();
    for [i, j, k] in doc.triples() {
        // One chain per choice of middle event; the reversed chains are
        // implied through symmetry.
        for (a, b, c) in [(i, j, k), (j, i, k), (i, k, j)] {
            let (Some(ab), Some(bc), Some(ac)) =
                (doc.oriented(a, b), doc.oriented(b, c), doc.oriented(a, c))
            else {
                continue;
            };
            for l1 in 0..n {
                for l2 in 0..n {
                    let allowed = algebra.allowed(l1, l2);
                    if allowed.len() == n {
                        continue;
                    }
                    rules.push(Rule {
                        premises: [vars.oriented(ab, l1, space), vars.oriented(bc, l2, space)],
                        forbidden: (0..n)
                            .filter(|&l| !allowed.contains(l))
                            .map(|l3| vars.oriented(ac, l3, space))
                            .collect(),
                    });
                }
            }
        }
    }
    rules
}

fn read_assignment<S: ConstraintSolver>(solver: &S, vars: &RowVars) -> Result<Assignment> {
    let indicators: Vec<Vec<bool>> = (0..vars.n_rows())
        .map(|row| {
            (0..vars.n_labels)
                .map(|l| solver.value(vars.var(row, l)).unwrap_or(false))
                .collect()
        })
        .collect();
    Assignment::from_indicators(&indicators, vars.n_labels)
}
