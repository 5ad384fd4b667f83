//! Backend-neutral storage of a 0/1 program.
//!
//! Both solver backends record variables, constraints, and the objective the
//! same way, split the program into independent components, and validate
//! returned solutions against it.

use super::solver::{Comparison, VarId};
use crate::{Error, Result};

#[derive(Debug, Clone)]
pub(super) enum Constraint {
    Linear {
        terms: Vec<(usize, i64)>,
        cmp: Comparison,
        rhs: i64,
    },
    Implication {
        premises: Vec<usize>,
        forbidden: usize,
    },
}

impl Constraint {
    pub(super) fn vars(&self) -> Vec<usize> {
        match self {
            Constraint::Linear { terms, .. } => terms.iter().map(|&(v, _)| v).collect(),
            Constraint::Implication {
                premises,
                forbidden,
            } => premises.iter().copied().chain(Some(*forbidden)).collect(),
        }
    }

    /// `x1 + ... + xk == 1` with unit coefficients.
    pub(super) fn as_choice_group(&self) -> Option<&[(usize, i64)]> {
        match self {
            Constraint::Linear {
                terms,
                cmp: Comparison::Eq,
                rhs: 1,
            } if !terms.is_empty() && terms.iter().all(|&(_, c)| c == 1) => Some(terms),
            _ => None,
        }
    }

    /// Whether a complete assignment satisfies the constraint.
    pub(super) fn holds(&self, values: &[bool]) -> bool {
        match self {
            Constraint::Linear { terms, cmp, rhs } => {
                let sum: i64 = terms
                    .iter()
                    .filter(|&&(v, _)| values[v])
                    .map(|&(_, c)| c)
                    .sum();
                match cmp {
                    Comparison::Eq => sum == *rhs,
                    Comparison::Le => sum <= *rhs,
                    Comparison::Ge => sum >= *rhs,
                }
            }
            Constraint::Implication {
                premises,
                forbidden,
            } => !(values[*forbidden] && premises.iter().all(|&p| values[p])),
        }
    }
}

/// Variables that share no constraint with the rest of the program, and the
/// constraints over them.
#[derive(Debug)]
pub(super) struct Component {
    pub(super) vars: Vec<usize>,
    pub(super) constraints: Vec<usize>,
}

#[derive(Debug, Clone, Default)]
pub(super) struct Model {
    pub(super) objective: Vec<f64>,
    pub(super) constraints: Vec<Constraint>,
}

impl Model {
    pub(super) fn add_variable(&mut self) -> VarId {
        self.objective.push(0.0);
        VarId(self.objective.len() - 1)
    }

    pub(super) fn add_linear(&mut self, terms: &[(VarId, i64)], cmp: Comparison, rhs: i64) {
        // Repeated variables collapse into one coefficient.
        let mut merged: Vec<(usize, i64)> = Vec::with_capacity(terms.len());
        for &(var, coef) in terms {
            match merged.iter_mut().find(|(v, _)| *v == var.0) {
                Some((_, c)) => *c += coef,
                None => merged.push((var.0, coef)),
            }
        }
        merged.retain(|&(_, c)| c != 0);
        self.constraints.push(Constraint::Linear {
            terms: merged,
            cmp,
            rhs,
        });
    }

    pub(super) fn add_implication(&mut self, premises: &[VarId], forbidden: VarId) {
        let mut premises: Vec<usize> = premises.iter().map(|v| v.0).collect();
        premises.sort_unstable();
        premises.dedup();
        self.constraints.push(Constraint::Implication {
            premises,
            forbidden: forbidden.0,
        });
    }

    pub(super) fn set_objective(&mut self, coefficients: &[(VarId, f64)]) {
        self.objective.iter_mut().for_each(|c| *c = 0.0);
        for &(var, coef) in coefficients {
            self.objective[var.0] += coef;
        }
    }

    pub(super) fn num_variables(&self) -> usize {
        self.objective.len()
    }

    /// Reject references to undeclared variables and violated constraints
    /// that mention no variable at all.
    pub(super) fn validate(&self) -> Result<()> {
        let n = self.objective.len();
        for (ci, c) in self.constraints.iter().enumerate() {
            let vars = c.vars();
            if let Some(v) = vars.iter().find(|&&v| v >= n) {
                return Err(Error::invalid_input(format!(
                    "constraint {ci} references undeclared variable {v}"
                )));
            }
            if vars.is_empty() && !c.holds(&[]) {
                return Err(Error::infeasible(format!(
                    "constraint {ci} has no variables and is violated"
                )));
            }
        }
        Ok(())
    }

    pub(super) fn value_of(&self, values: &[bool]) -> f64 {
        self.objective
            .iter()
            .zip(values)
            .filter(|(_, &bit)| bit)
            .map(|(c, _)| c)
            .sum()
    }

    /// First constraint a complete assignment breaks.
    pub(super) fn first_violation(&self, values: &[bool]) -> Option<usize> {
        self.constraints.iter().position(|c| !c.holds(values))
    }

    /// Split into components; two variables are connected when a constraint
    /// mentions both.
    pub(super) fn components(&self) -> Vec<Component> {
        let n = self.objective.len();
        let mut parent: Vec<usize> = (0..n).collect();
        for c in &self.constraints {
            let vars = c.vars();
            if let Some((&first, rest)) = vars.split_first() {
                for &v in rest {
                    union(&mut parent, first, v);
                }
            }
        }

        let mut index_of_root: Vec<Option<usize>> = vec![None; n];
        let mut out: Vec<Component> = Vec::new();
        for v in 0..n {
            let root = find(&mut parent, v);
            let idx = *index_of_root[root].get_or_insert_with(|| {
                out.push(Component {
                    vars: Vec::new(),
                    constraints: Vec::new(),
                });
                out.len() - 1
            });
            out[idx].vars.push(v);
        }
        for (ci, c) in self.constraints.iter().enumerate() {
            if let Some(&first) = c.vars().first() {
                let root = find(&mut parent, first);
                if let Some(idx) = index_of_root[root] {
                    out[idx].constraints.push(ci);
                }
            }
        }
        out
    }
}

/// Root of `i`, compressing the path behind it.
fn find(parent: &mut [usize], mut i: usize) -> usize {
    let mut root = i;
    while parent[root] != root {
        root = parent[root];
    }
    while parent[i] != root {
        let next = parent[i];
        parent[i] = root;
        i = next;
    }
    root
}

fn union(parent: &mut [usize], i: usize, j: usize) {
    let (a, b) = (find(parent, i), find(parent, j));
    if a != b {
        parent[a] = b;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_components_group_constraints() {
        let mut model = Model::default();
        let v: Vec<VarId> = (0..5).map(|_| model.add_variable()).collect();
        model.add_linear(&[(v[0], 1), (v[1], 1)], Comparison::Eq, 1);
        model.add_implication(&[v[1]], v[2]);
        model.add_linear(&[(v[3], 1)], Comparison::Le, 1);
        let comps = model.components();
        assert_eq!(comps.len(), 3);
        assert_eq!(comps[0].vars, vec![0, 1, 2]);
        assert_eq!(comps[0].constraints, vec![0, 1]);
        assert_eq!(comps[1].vars, vec![3]);
        assert_eq!(comps[1].constraints, vec![2]);
        assert_eq!(comps[2].vars, vec![4]);
        assert!(comps[2].constraints.is_empty());
    }

    #[test]
    fn test_holds_and_violation() {
        let mut model = Model::default();
        let a = model.add_variable();
        let b = model.add_variable();
        model.add_linear(&[(a, 1), (b, 1), (a, 1)], Comparison::Le, 2);
        model.add_implication(&[a], b);
        assert_eq!(model.first_violation(&[true, false]), None);
        assert_eq!(model.first_violation(&[true, true]), Some(0));
        assert_eq!(model.first_violation(&[false, true]), None);
    }

    #[test]
    fn test_validate_rejects_bad_references() {
        let mut model = Model::default();
        let a = model.add_variable();
        model.add_implication(&[a], VarId(7));
        assert!(matches!(model.validate(), Err(Error::InvalidInput(_))));

        let mut model = Model::default();
        model.add_linear(&[], Comparison::Ge, 1);
        assert!(matches!(model.validate(), Err(Error::Infeasible(_))));
    }
}
