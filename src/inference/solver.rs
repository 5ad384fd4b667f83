//! The constraint solver capability used by global inference.
//!
//! The inference engine only talks to this trait: it declares binary
//! indicator variables, linear constraints, implications, and an objective,
//! then asks for a solution and reads indicator values back. Any 0/1
//! integer-programming or constraint-propagation backend can sit behind it.

use crate::Result;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Handle to a binary variable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct VarId(pub usize);

impl VarId {
    /// Index of the variable in creation order.
    #[must_use]
    pub fn index(self) -> usize {
        self.0
    }
}

/// Comparison of a linear constraint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Comparison {
    /// `sum == rhs`
    Eq,
    /// `sum <= rhs`
    Le,
    /// `sum >= rhs`
    Ge,
}

/// Budget for one solve call.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SolveLimits {
    /// Wall-clock budget.
    pub time_limit: Option<Duration>,
    /// Maximum number of search nodes.
    pub node_limit: Option<u64>,
}

impl Default for SolveLimits {
    fn default() -> Self {
        Self {
            time_limit: Some(Duration::from_secs(600)),
            node_limit: None,
        }
    }
}

impl SolveLimits {
    /// No budget at all.
    #[must_use]
    pub fn unlimited() -> Self {
        Self {
            time_limit: None,
            node_limit: None,
        }
    }
}

/// Outcome of a successful solve.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SolveSummary {
    /// Objective value of the returned solution.
    pub objective: f64,
    /// Search nodes explored.
    pub nodes: u64,
    /// Wall-clock time spent.
    pub elapsed: Duration,
}

/// A 0/1 maximization backend.
pub trait ConstraintSolver {
    /// Declare a new binary variable.
    fn add_variable(&mut self) -> VarId;

    /// Require `sum(coef * var) <cmp> rhs`.
    fn add_linear(&mut self, terms: &[(VarId, i64)], cmp: Comparison, rhs: i64);

    /// Require that `forbidden` is 0 whenever every premise is 1.
    fn add_implication(&mut self, premises: &[VarId], forbidden: VarId);

    /// Set the coefficients of the objective to maximize (unlisted variables get 0).
    fn set_objective(&mut self, coefficients: &[(VarId, f64)]);

    /// Solve to optimality.
    ///
    /// # Errors
    ///
    /// [`crate::Error::Infeasible`] when no solution exists,
    /// [`crate::Error::SolverTimeout`] when the budget runs out first.
    fn solve(&mut self) -> Result<SolveSummary>;

    /// Value of a variable in the last solution; `None` before a successful solve.
    fn value(&self, var: VarId) -> Option<bool>;

    /// Number of declared variables.
    fn num_variables(&self) -> usize;

    /// Number of constraints of any kind.
    fn num_constraints(&self) -> usize;
}
