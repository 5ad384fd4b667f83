//! Exact 0/1 solver: depth-first branch-and-bound with constraint propagation.
//!
//! Suited to small programs, such as documents with a handful of events, or
//! to checking the default [`super::MilpSolver`]. Its bound ignores
//! transitivity, so search effort grows exponentially with the number of
//! conflicting pairs in a document.
//!
//! # Algorithm
//!
//! 1. Variables are split into independent components (two variables are
//!    connected when a constraint mentions both). Each component is solved on
//!    its own; for relation inference this means one search per document.
//! 2. Constraints of the form `x1 + ... + xk == 1` are recognized as
//!    *choice groups*. Branching picks an open group and tries its free
//!    members in decreasing objective order, so the first dive is the greedy
//!    (locally best) assignment.
//! 3. After every decision, propagation fixes variables forced by linear
//!    bounds and implications; a conflict backtracks immediately.
//! 4. A node is pruned when its optimistic bound (fixed objective, plus the
//!    best free member of every open group, plus every positive free
//!    ungrouped coefficient) cannot beat the incumbent.
//!
//! The search proves optimality. Among equal-objective solutions the first
//! one found wins, which depends on insertion order: ties are not broken in
//! any documented way.

use super::model::{Component, Constraint, Model};
use super::solver::{Comparison, ConstraintSolver, SolveLimits, SolveSummary, VarId};
use crate::{Error, Result};
use std::time::Instant;

const FREE: i8 = -1;
const EPS: f64 = 1e-9;
const CLOCK_CHECK_INTERVAL: u64 = 256;

/// Branch-and-bound backend for [`ConstraintSolver`].
///
/// ```rust
/// use eventrel::inference::{BranchAndBound, Comparison, ConstraintSolver};
///
/// let mut solver = BranchAndBound::new();
/// let x = solver.add_variable();
/// let y = solver.add_variable();
/// solver.add_linear(&[(x, 1), (y, 1)], Comparison::Eq, 1);
/// solver.set_objective(&[(x, 0.2), (y, 0.8)]);
/// solver.solve().unwrap();
/// assert_eq!(solver.value(y), Some(true));
/// ```
#[derive(Debug, Clone, Default)]
pub struct BranchAndBound {
    limits: SolveLimits,
    model: Model,
    solution: Option<Vec<bool>>,
}

impl BranchAndBound {
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
}

impl ConstraintSolver for BranchAndBound {
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
        let model = &self.model;
        let n = model.num_variables();

        let mut occurs: Vec<Vec<usize>> = vec![Vec::new(); n];
        for (ci, c) in model.constraints.iter().enumerate() {
            for v in c.vars() {
                occurs[v].push(ci);
            }
        }

        // Disjoint choice groups.
        let mut var_group: Vec<Option<usize>> = vec![None; n];
        let mut groups: Vec<Vec<usize>> = Vec::new();
        for c in &model.constraints {
            if let Some(terms) = c.as_choice_group() {
                if terms.iter().all(|&(v, _)| var_group[v].is_none()) {
                    for &(v, _) in terms {
                        var_group[v] = Some(groups.len());
                    }
                    groups.push(terms.iter().map(|&(v, _)| v).collect());
                }
            }
        }

        let components = model.components();
        log::debug!(
            "branch-and-bound: {} vars, {} constraints, {} choice groups, {} components",
            n,
            model.constraints.len(),
            groups.len(),
            components.len()
        );

        let mut search = Search {
            objective: &model.objective,
            constraints: &model.constraints,
            occurs: &occurs,
            groups: &groups,
            var_group: &var_group,
            values: vec![FREE; n],
            trail: Vec::new(),
            queue: Vec::new(),
            nodes: 0,
            limits: self.limits,
            started,
        };

        let mut solution = vec![false; n];
        let mut objective = 0.0;
        for (k, component) in components.iter().enumerate() {
            match search.solve_component(component)? {
                Some((value, assignment)) => {
                    objective += value;
                    for (&v, &bit) in component.vars.iter().zip(&assignment) {
                        solution[v] = bit;
                    }
                }
                None => {
                    return Err(Error::infeasible(format!(
                        "component {k} ({} variables) has no feasible assignment",
                        component.vars.len()
                    )))
                }
            }
        }

        let summary = SolveSummary {
            objective,
            nodes: search.nodes,
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

// =============================================================================
// Search
// =============================================================================

struct Frame {
    mark: usize,
    choices: Vec<(usize, bool)>,
}

enum Branch {
    Leaf,
    Choices(Vec<(usize, bool)>),
}

struct Search<'a> {
    objective: &'a [f64],
    constraints: &'a [Constraint],
    occurs: &'a [Vec<usize>],
    groups: &'a [Vec<usize>],
    var_group: &'a [Option<usize>],
    values: Vec<i8>,
    trail: Vec<usize>,
    queue: Vec<usize>,
    nodes: u64,
    limits: SolveLimits,
    started: Instant,
}

impl<'a> Search<'a> {
    fn solve_component(&mut self, component: &Component) -> Result<Option<(f64, Vec<bool>)>> {
        let groups: Vec<usize> = {
            let mut g: Vec<usize> = component
                .vars
                .iter()
                .filter_map(|&v| self.var_group[v])
                .collect();
            g.sort_unstable();
            g.dedup();
            g
        };
        let ungrouped: Vec<usize> = component
            .vars
            .iter()
            .copied()
            .filter(|&v| self.var_group[v].is_none())
            .collect();

        let root_mark = self.trail.len();
        let mut feasible = true;
        for &v in &component.vars {
            let occurs = self.occurs;
            for &ci in &occurs[v] {
                if !self.check(ci) {
                    feasible = false;
                    break;
                }
            }
            if !feasible {
                break;
            }
        }
        if !feasible || !self.propagate() {
            self.undo_to(root_mark);
            return Ok(None);
        }

        let mut best: Option<(f64, Vec<bool>)> = None;
        let mut stack: Vec<Frame> = Vec::new();
        loop {
            self.nodes += 1;
            self.check_limits()?;

            let bound = self.upper_bound(&groups, &ungrouped, &component.vars);
            let pruned = bound == f64::NEG_INFINITY
                || best.as_ref().is_some_and(|(b, _)| bound <= b + EPS);
            if !pruned {
                match self.branch(&groups, &ungrouped) {
                    Branch::Leaf => {
                        let value: f64 = component
                            .vars
                            .iter()
                            .filter(|&&v| self.values[v] == 1)
                            .map(|&v| self.objective[v])
                            .sum();
                        if best.as_ref().map_or(true, |(b, _)| value > b + EPS) {
                            let snapshot =
                                component.vars.iter().map(|&v| self.values[v] == 1).collect();
                            best = Some((value, snapshot));
                        }
                    }
                    Branch::Choices(choices) => stack.push(Frame {
                        mark: self.trail.len(),
                        choices,
                    }),
                }
            }

            // Move to the next open node.
            loop {
                let Some(frame) = stack.last_mut() else {
                    self.undo_to(root_mark);
                    return Ok(best);
                };
                let mark = frame.mark;
                let next = frame.choices.pop();
                self.undo_to(mark);
                match next {
                    Some((var, val)) => {
                        if self.assign(var, val) && self.propagate() {
                            break;
                        }
                    }
                    None => {
                        stack.pop();
                    }
                }
            }
        }
    }

    fn check_limits(&self) -> Result<()> {
        let out_of_nodes = self.limits.node_limit.is_some_and(|max| self.nodes > max);
        let out_of_time = self.nodes % CLOCK_CHECK_INTERVAL == 0
            && self
                .limits
                .time_limit
                .is_some_and(|max| self.started.elapsed() > max);
        if out_of_nodes || out_of_time {
            return Err(Error::SolverTimeout {
                nodes: self.nodes,
                elapsed_ms: self.started.elapsed().as_millis(),
            });
        }
        Ok(())
    }

    fn upper_bound(&self, groups: &[usize], ungrouped: &[usize], vars: &[usize]) -> f64 {
        let mut bound: f64 = vars
            .iter()
            .filter(|&&v| self.values[v] == 1)
            .map(|&v| self.objective[v])
            .sum();
        for &g in groups {
            let members = &self.groups[g];
            if members.iter().any(|&v| self.values[v] == 1) {
                continue;
            }
            let best_free = members
                .iter()
                .filter(|&&v| self.values[v] == FREE)
                .map(|&v| self.objective[v])
                .fold(f64::NEG_INFINITY, f64::max);
            bound += best_free;
        }
        bound
            + ungrouped
                .iter()
                .filter(|&&v| self.values[v] == FREE)
                .map(|&v| self.objective[v].max(0.0))
                .sum::<f64>()
    }

    fn branch(&self, groups: &[usize], ungrouped: &[usize]) -> Branch {
        // Fail-first: the open group with the fewest free members.
        let open = groups
            .iter()
            .filter(|&&g| !self.groups[g].iter().any(|&v| self.values[v] == 1))
            .map(|&g| {
                let free: Vec<usize> = self.groups[g]
                    .iter()
                    .copied()
                    .filter(|&v| self.values[v] == FREE)
                    .collect();
                free
            })
            .min_by_key(Vec::len);

        if let Some(mut free) = open {
            // Popped from the back: best objective last.
            free.sort_by(|&a, &b| self.objective[a].total_cmp(&self.objective[b]));
            return Branch::Choices(free.into_iter().map(|v| (v, true)).collect());
        }

        match ungrouped.iter().find(|&&v| self.values[v] == FREE) {
            Some(&v) => {
                let preferred = self.objective[v] > 0.0;
                Branch::Choices(vec![(v, !preferred), (v, preferred)])
            }
            None => Branch::Leaf,
        }
    }

    fn assign(&mut self, var: usize, value: bool) -> bool {
        let v = i8::from(value);
        match self.values[var] {
            FREE => {
                self.values[var] = v;
                self.trail.push(var);
                self.queue.push(var);
                true
            }
            current => current == v,
        }
    }

    fn undo_to(&mut self, mark: usize) {
        while self.trail.len() > mark {
            if let Some(v) = self.trail.pop() {
                self.values[v] = FREE;
            }
        }
        self.queue.clear();
    }

    fn propagate(&mut self) -> bool {
        let occurs = self.occurs;
        while let Some(v) = self.queue.pop() {
            for &ci in &occurs[v] {
                if !self.check(ci) {
                    self.queue.clear();
                    return false;
                }
            }
        }
        true
    }

    /// Check one constraint, fixing forced variables. Returns false on conflict.
    fn check(&mut self, ci: usize) -> bool {
        let constraints = self.constraints;
        match &constraints[ci] {
            Constraint::Linear { terms, cmp, rhs } => self.check_linear(terms, *cmp, *rhs),
            Constraint::Implication {
                premises,
                forbidden,
            } => self.check_implication(premises, *forbidden),
        }
    }

    fn check_linear(&mut self, terms: &[(usize, i64)], cmp: Comparison, rhs: i64) -> bool {
        let (mut fixed, mut min_free, mut max_free) = (0i64, 0i64, 0i64);
        for &(v, c) in terms {
            match self.values[v] {
                1 => fixed += c,
                0 => {}
                _ if c > 0 => max_free += c,
                _ => min_free += c,
            }
        }
        let lo = fixed + min_free;
        let hi = fixed + max_free;
        let upper = matches!(cmp, Comparison::Le | Comparison::Eq);
        let lower = matches!(cmp, Comparison::Ge | Comparison::Eq);
        if (upper && lo > rhs) || (lower && hi < rhs) {
            return false;
        }

        for &(v, c) in terms {
            if self.values[v] != FREE {
                continue;
            }
            let mut forced: Option<bool> = None;
            if upper && lo + c.abs() > rhs {
                forced = Some(c < 0);
            }
            if lower && hi - c.abs() < rhs {
                let need = c > 0;
                if forced.is_some_and(|f| f != need) {
                    return false;
                }
                forced = Some(need);
            }
            if let Some(value) = forced {
                if !self.assign(v, value) {
                    return false;
                }
            }
        }
        true
    }

    fn check_implication(&mut self, premises: &[usize], forbidden: usize) -> bool {
        if self.values[forbidden] == 0 {
            return true;
        }
        let mut free_premise = None;
        let mut n_free = 0;
        for &p in premises {
            match self.values[p] {
                0 => return true,
                1 => {}
                _ => {
                    n_free += 1;
                    free_premise = Some(p);
                }
            }
        }
        match (n_free, self.values[forbidden]) {
            (0, 1) => false,
            (0, _) => self.assign(forbidden, false),
            (1, 1) => free_premise.map_or(true, |p| self.assign(p, false)),
            _ => true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn choice(solver: &mut BranchAndBound, scores: &[f64]) -> Vec<VarId> {
        let vars: Vec<VarId> = scores.iter().map(|_| solver.add_variable()).collect();
        let terms: Vec<(VarId, i64)> = vars.iter().map(|&v| (v, 1)).collect();
        solver.add_linear(&terms, Comparison::Eq, 1);
        vars
    }

    fn objective(vars: &[(Vec<VarId>, Vec<f64>)]) -> Vec<(VarId, f64)> {
        vars.iter()
            .flat_map(|(vs, ss)| vs.iter().copied().zip(ss.iter().copied()))
            .collect()
    }

    #[test]
    fn test_picks_local_best_without_coupling() {
        let mut solver = BranchAndBound::new();
        let a = choice(&mut solver, &[0.1, 0.7, 0.2]);
        let b = choice(&mut solver, &[0.6, 0.3, 0.1]);
        solver.set_objective(&objective(&[
            (a.clone(), vec![0.1, 0.7, 0.2]),
            (b.clone(), vec![0.6, 0.3, 0.1]),
        ]));
        let summary = solver.solve().unwrap();
        assert!((summary.objective - 1.3).abs() < 1e-12);
        assert_eq!(solver.value(a[1]), Some(true));
        assert_eq!(solver.value(b[0]), Some(true));
        assert_eq!(solver.value(b[1]), Some(false));
    }

    #[test]
    fn test_implication_changes_optimum() {
        // a0 and b0 cannot both hold; the best joint choice is a0 + b1.
        let mut solver = BranchAndBound::new();
        let a = choice(&mut solver, &[0.9, 0.1]);
        let b = choice(&mut solver, &[0.6, 0.4]);
        solver.add_implication(&[a[0]], b[0]);
        solver.set_objective(&objective(&[
            (a.clone(), vec![0.9, 0.1]),
            (b.clone(), vec![0.6, 0.4]),
        ]));
        let summary = solver.solve().unwrap();
        assert!((summary.objective - 1.3).abs() < 1e-12);
        assert_eq!(solver.value(a[0]), Some(true));
        assert_eq!(solver.value(b[1]), Some(true));
    }

    #[test]
    fn test_equality_link() {
        // x_a0 == x_b1 and x_a1 == x_b0.
        let mut solver = BranchAndBound::new();
        let a = choice(&mut solver, &[0.55, 0.45]);
        let b = choice(&mut solver, &[0.9, 0.1]);
        solver.add_linear(&[(a[0], 1), (b[1], -1)], Comparison::Eq, 0);
        solver.add_linear(&[(a[1], 1), (b[0], -1)], Comparison::Eq, 0);
        solver.set_objective(&objective(&[
            (a.clone(), vec![0.55, 0.45]),
            (b.clone(), vec![0.9, 0.1]),
        ]));
        solver.solve().unwrap();
        assert_eq!(solver.value(a[1]), Some(true));
        assert_eq!(solver.value(b[0]), Some(true));
    }

    #[test]
    fn test_infeasible() {
        let mut solver = BranchAndBound::new();
        let a = choice(&mut solver, &[1.0]);
        solver.add_linear(&[(a[0], 1)], Comparison::Eq, 0);
        assert!(matches!(solver.solve(), Err(Error::Infeasible(_))));
        assert_eq!(solver.value(a[0]), None);
    }

    #[test]
    fn test_ungrouped_variables() {
        let mut solver = BranchAndBound::new();
        let x = solver.add_variable();
        let y = solver.add_variable();
        let z = solver.add_variable();
        solver.add_linear(&[(x, 1), (y, 1), (z, 1)], Comparison::Le, 2);
        solver.add_linear(&[(x, 2), (z, 1)], Comparison::Ge, 1);
        solver.set_objective(&[(x, -1.0), (y, 3.0), (z, 2.0)]);
        let summary = solver.solve().unwrap();
        assert!((summary.objective - 5.0).abs() < 1e-12);
        assert_eq!(solver.value(x), Some(false));
    }

    #[test]
    fn test_node_limit_is_timeout() {
        let mut solver = BranchAndBound::with_limits(SolveLimits {
            time_limit: None,
            node_limit: Some(1),
        });
        let mut all = Vec::new();
        for _ in 0..4 {
            let vars = choice(&mut solver, &[0.5, 0.5]);
            all.extend(vars.iter().map(|&v| (v, 0.5)));
        }
        let link: Vec<(VarId, i64)> = all.iter().map(|&(v, _)| (v, 1)).collect();
        solver.add_linear(&link, Comparison::Le, 4);
        solver.set_objective(&all);
        assert!(matches!(
            solver.solve(),
            Err(Error::SolverTimeout { .. })
        ));
    }

    #[test]
    fn test_independent_components() {
        let mut solver = BranchAndBound::new();
        let mut coefficients = Vec::new();
        for _ in 0..10 {
            let vars = choice(&mut solver, &[0.3, 0.7]);
            coefficients.push((vars[0], 0.3));
            coefficients.push((vars[1], 0.7));
        }
        solver.set_objective(&coefficients);
        let summary = solver.solve().unwrap();
        assert!((summary.objective - 7.0).abs() < 1e-9);
        assert!(summary.nodes >= 10);
        assert_eq!(solver.num_variables(), 20);
        assert_eq!(solver.num_constraints(), 10);
    }
}
