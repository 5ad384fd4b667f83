//! Mixed-integer backend over `good_lp` with the pure-Rust `microlp` solver.
//!
//! Each independent component (one document, for relation inference) becomes
//! its own small integer program: binary variables, the linear constraints as
//! written, and every implication `p1 ∧ ... ∧ pk ⇒ ¬f` as
//! `p1 + ... + pk + f <= k`. LP relaxation bounds prune the integer search,
//! so densely connected documents stay tractable.
//!
//! `microlp` cannot be interrupted mid-solve: the time limit is checked
//! between components, and the node limit does not apply.

use super::model::{Component, Constraint, Model};
use super::solver::{Comparison, ConstraintSolver, SolveLimits, SolveSummary, VarId};
use crate::{Error, Result};
use good_lp::{
    constraint, microlp, variable, Expression, ProblemVariables, ResolutionError, Solution,
    SolverModel, Variable,
};
use std::time::Instant;

/// Integer-programming backend for [`ConstraintSolver`]; the default for
/// [`super::GlobalInference`].
///
/// ```rust
/// use eventrel::inference::{Comparison, ConstraintSolver, MilpSolver};
///
/// let mut solver = MilpSolver::new();
/// let x = solver.add_variable();
/// let y = solver.add_variable();
/// solver.add_linear(&[(x, 1), (y, 1)], Comparison::Eq, 1);
/// solver.set_objective(&[(x, 0.2), (y, 0.8)]);
/// solver.solve().unwrap();
/// assert_eq!(solver.value(y), Some(true));
/// ```
#[derive(Debug, Clone, Default)]
pub struct MilpSolver {
    limits: SolveLimits,
    model: Model,
    solution: Option<Vec<bool>>,
}

impl MilpSolver {
    /// Solver with default limits.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Solver with explicit limits.
    #[must_use]
    pub fn with_limits(limits: SolveLimits) -> Self {
        Self {
            limits,
            ..Self::default()
        }
    }

    fn solve_component(&self, component: &Component, position: &[usize]) -> Result<Vec<bool>> {
        let model = &self.model;
        let mut problem = ProblemVariables::new();
        let vars: Vec<Variable> = component
            .vars
            .iter()
            .map(|_| problem.add(variable().binary()))
            .collect();
        let local = |v: usize| vars[position[v]];

        let objective: Expression = component
            .vars
            .iter()
            .map(|&v| model.objective[v] * local(v))
            .sum();
        let mut program = problem.maximise(objective).using(microlp);

        for &ci in &component.constraints {
            let row = match &model.constraints[ci] {
                Constraint::Linear { terms, cmp, rhs } => {
                    let lhs: Expression = terms.iter().map(|&(v, c)| c as f64 * local(v)).sum();
                    let rhs = *rhs as f64;
                    match cmp {
                        Comparison::Eq => constraint::eq(lhs, rhs),
                        Comparison::Le => constraint::leq(lhs, rhs),
                        Comparison::Ge => constraint::geq(lhs, rhs),
                    }
                }
                Constraint::Implication {
                    premises,
                    forbidden,
                } => {
                    let lhs: Expression = premises
                        .iter()
                        .chain(Some(forbidden))
                        .map(|&v| 1.0 * local(v))
                        .sum();
                    constraint::leq(lhs, premises.len() as f64)
                }
            };
            program.add_constraint(row);
        }

        let solved = program.solve().map_err(|e| match e {
            ResolutionError::Infeasible => Error::infeasible(format!(
                "component of {} variables has no feasible assignment",
                component.vars.len()
            )),
            other => Error::solver(other.to_string()),
        })?;
        Ok(vars.iter().map(|&x| solved.value(x) > 0.5).collect())
    }
}

impl ConstraintSolver for MilpSolver {
    fn add_variable(&mut self) -> VarId {
        self.solution = None;
        self.model.add_variable()
    }

    fn add_linear(&mut self, terms: &[(VarId, i64)], cmp: Comparison, rhs: i64) {
        self.model.add_linear(terms, cmp, rhs);
    }

    fn add_implication(&mut self, premises: &[VarId], forbidden: VarId) {
        self.model.add_implication(premises, forbidden);
    }

    fn set_objective(&mut self, coefficients: &[(VarId, f64)]) {
        self.model.set_objective(coefficients);
    }

    fn solve(&mut self) -> Result<SolveSummary> {
        self.solution = None;
        let started = Instant::now();
        self.model.validate()?;

        let components = self.model.components();
        let mut position = vec![0usize; self.model.num_variables()];
        for component in &components {
            for (i, &v) in component.vars.iter().enumerate() {
                position[v] = i;
            }
        }
        log::debug!(
            "milp: {} vars, {} constraints, {} components",
            self.model.num_variables(),
            self.model.constraints.len(),
            components.len()
        );

        let mut solution = vec![false; self.model.num_variables()];
        let mut solved = 0u64;
        for component in &components {
            if self
                .limits
                .time_limit
                .is_some_and(|max| started.elapsed() >= max)
            {
                return Err(Error::SolverTimeout {
                    nodes: solved,
                    elapsed_ms: started.elapsed().as_millis(),
                });
            }
            let bits = self.solve_component(component, &position)?;
            for (&v, bit) in component.vars.iter().zip(bits) {
                solution[v] = bit;
            }
            solved += 1;
        }

        if let Some(ci) = self.model.first_violation(&solution) {
            return Err(Error::solver(format!(
                "integer solution violates constraint {ci}"
            )));
        }

        let summary = SolveSummary {
            objective: self.model.value_of(&solution),
            nodes: solved,
            elapsed: started.elapsed(),
        };
        self.solution = Some(solution);
        Ok(summary)
    }

    fn value(&self, var: VarId) -> Option<bool> {
        self.solution.as_ref().and_then(|s| s.get(var.0).copied())
    }

    fn num_variables(&self) -> usize {
        self.model.num_variables()
    }

    fn num_constraints(&self) -> usize {
        self.model.constraints.len()
    }
}
