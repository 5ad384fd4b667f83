//! Label algebra: relation label spaces, inversion, and composition.
//!
//! Every dataset schema defines an ordered temporal label list. The joint
//! model adds a causal label space. Both spaces know how to invert a label
//! (the relation seen from the other event), and the temporal space knows
//! which labels may close a chain `a -> b -> c`:
//!
//! | (a,b) | (b,c) | admissible (a,c) |
//! |-------|-------|------------------|
//! | BEFORE | BEFORE | BEFORE |
//! | BEFORE | SIMULTANEOUS | BEFORE |
//! | BEFORE | INCLUDES | BEFORE |
//! | IS_INCLUDED | AFTER | AFTER |
//! | BEFORE | VAGUE | BEFORE, VAGUE |
//! | SIMULTANEOUS | VAGUE | VAGUE |
//! | ... | ... | every label when nothing is implied |
//!
//! The composition table is written once over label names and filtered to
//! the labels a schema actually has, so the same rules serve every schema.
//!
//! # Example
//!
//! ```rust
//! use eventrel_core::{DatasetSchema, LabelAlgebra};
//!
//! let algebra = LabelAlgebra::new(DatasetSchema::Matres, false);
//! let temporal = algebra.temporal();
//! let before = temporal.id_of("BEFORE").unwrap();
//! let after = temporal.id_of("AFTER").unwrap();
//!
//! assert_eq!(temporal.inverse(before), after);
//! assert!(!algebra.allowed(before, before).contains(after));
//! ```

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

/// Integer id of a label within its label space.
pub type LabelId = usize;

/// Largest label space a [`LabelSet`] can represent.
pub const MAX_LABELS: usize = 64;

/// Labels of the causal space, in id order.
pub const CAUSAL_LABELS: &[&str] = &["CAUSES", "CAUSED_BY"];

/// Label that is excluded from every F1 computation.
pub const NONE_LABEL: &str = "NONE";

/// Label excluded from F1 when the label space has exactly four labels.
pub const VAGUE_LABEL: &str = "VAGUE";

const INVERSES: &[(&str, &str)] = &[
    ("BEFORE", "AFTER"),
    ("INCLUDES", "IS_INCLUDED"),
    ("CAUSES", "CAUSED_BY"),
];

// (label of a->b, label of b->c, admissible labels of a->c)
const COMPOSITION: &[(&str, &str, &[&str])] = &[
    ("BEFORE", "BEFORE", &["BEFORE"]),
    ("BEFORE", "SIMULTANEOUS", &["BEFORE"]),
    ("SIMULTANEOUS", "BEFORE", &["BEFORE"]),
    ("AFTER", "AFTER", &["AFTER"]),
    ("AFTER", "SIMULTANEOUS", &["AFTER"]),
    ("SIMULTANEOUS", "AFTER", &["AFTER"]),
    ("SIMULTANEOUS", "SIMULTANEOUS", &["SIMULTANEOUS"]),
    ("INCLUDES", "INCLUDES", &["INCLUDES"]),
    ("IS_INCLUDED", "IS_INCLUDED", &["IS_INCLUDED"]),
    ("INCLUDES", "SIMULTANEOUS", &["INCLUDES"]),
    ("SIMULTANEOUS", "INCLUDES", &["INCLUDES"]),
    ("IS_INCLUDED", "SIMULTANEOUS", &["IS_INCLUDED"]),
    ("SIMULTANEOUS", "IS_INCLUDED", &["IS_INCLUDED"]),
    ("BEFORE", "INCLUDES", &["BEFORE"]),
    ("AFTER", "INCLUDES", &["AFTER"]),
    ("IS_INCLUDED", "BEFORE", &["BEFORE"]),
    ("IS_INCLUDED", "AFTER", &["AFTER"]),
    ("SIMULTANEOUS", "OVERLAP", &["OVERLAP"]),
    ("OVERLAP", "SIMULTANEOUS", &["OVERLAP"]),
    ("BEFORE", "VAGUE", &["BEFORE", "VAGUE"]),
    ("VAGUE", "BEFORE", &["BEFORE", "VAGUE"]),
    ("AFTER", "VAGUE", &["AFTER", "VAGUE"]),
    ("VAGUE", "AFTER", &["AFTER", "VAGUE"]),
    ("SIMULTANEOUS", "VAGUE", &["VAGUE"]),
    ("VAGUE", "SIMULTANEOUS", &["VAGUE"]),
];

// A cause precedes its effect.
const CAUSAL_IMPLIES_TEMPORAL: &[(&str, &str)] = &[("CAUSES", "BEFORE"), ("CAUSED_BY", "AFTER")];

// =============================================================================
// Task & Schema
// =============================================================================

/// Which label space a pair belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Task {
    /// Temporal ordering between two events.
    Temporal,
    /// Causal relation between two events.
    Causal,
}

impl Task {
    /// Lowercase name.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Task::Temporal => "temporal",
            Task::Causal => "causal",
        }
    }
}

impl fmt::Display for Task {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Dataset schema, which fixes the temporal label list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DatasetSchema {
    /// MATRES: start-point relations with a VAGUE class.
    Matres,
    /// Temporal-causal corpus (TCR).
    Tcr,
    /// TimeBank-Dense.
    Tbd,
    /// Richer Event Description.
    Red,
}

impl DatasetSchema {
    /// All known schemas.
    pub const ALL: [DatasetSchema; 4] = [
        DatasetSchema::Matres,
        DatasetSchema::Tcr,
        DatasetSchema::Tbd,
        DatasetSchema::Red,
    ];

    /// Ordered temporal labels of this schema.
    #[must_use]
    pub fn temporal_labels(self) -> &'static [&'static str] {
        match self {
            DatasetSchema::Matres | DatasetSchema::Tcr => {
                &["BEFORE", "AFTER", "SIMULTANEOUS", "VAGUE"]
            }
            DatasetSchema::Tbd => &[
                "BEFORE",
                "AFTER",
                "INCLUDES",
                "IS_INCLUDED",
                "SIMULTANEOUS",
                "VAGUE",
            ],
            DatasetSchema::Red => &[
                "BEFORE",
                "AFTER",
                "INCLUDES",
                "IS_INCLUDED",
                "OVERLAP",
                "SIMULTANEOUS",
                "VAGUE",
                "NONE",
            ],
        }
    }

    /// Short name used in configuration files.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            DatasetSchema::Matres => "matres",
            DatasetSchema::Tcr => "tcr",
            DatasetSchema::Tbd => "tbd",
            DatasetSchema::Red => "red",
        }
    }
}

impl fmt::Display for DatasetSchema {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DatasetSchema {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "matres" => Ok(DatasetSchema::Matres),
            "tcr" | "new" => Ok(DatasetSchema::Tcr),
            "tbd" | "tbdense" => Ok(DatasetSchema::Tbd),
            "red" => Ok(DatasetSchema::Red),
            other => Err(Error::config(format!("unknown dataset schema '{other}'"))),
        }
    }
}

// =============================================================================
// LabelSet
// =============================================================================

/// A set of label ids, stored as a bitmask.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LabelSet(u64);

impl LabelSet {
    /// The empty set.
    #[must_use]
    pub const fn empty() -> Self {
        Self(0)
    }

    /// Every label of a space with `n` labels.
    #[must_use]
    pub fn full(n: usize) -> Self {
        if n >= MAX_LABELS {
            Self(u64::MAX)
        } else {
            Self((1u64 << n) - 1)
        }
    }

    /// Add a label.
    pub fn insert(&mut self, label: LabelId) {
        self.0 |= 1u64 << label;
    }

    /// Whether the set holds `label`.
    #[must_use]
    pub fn contains(self, label: LabelId) -> bool {
        label < MAX_LABELS && self.0 & (1u64 << label) != 0
    }

    /// Number of labels in the set.
    #[must_use]
    pub fn len(self) -> usize {
        self.0.count_ones() as usize
    }

    /// Whether the set is empty.
    #[must_use]
    pub fn is_empty(self) -> bool {
        self.0 == 0
    }

    /// Iterate label ids in increasing order.
    pub fn iter(self) -> impl Iterator<Item = LabelId> {
        (0..MAX_LABELS).filter(move |&l| self.contains(l))
    }
}

impl FromIterator<LabelId> for LabelSet {
    fn from_iter<I: IntoIterator<Item = LabelId>>(iter: I) -> Self {
        let mut set = LabelSet::empty();
        for label in iter {
            set.insert(label);
        }
        set
    }
}

// =============================================================================
// LabelSpace
// =============================================================================

/// An ordered, finite set of relation labels with an inverse function.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(from = "SpaceRepr", into = "SpaceRepr")]
pub struct LabelSpace {
    task: Task,
    names: Vec<String>,
    inverse: Vec<LabelId>,
    ids: HashMap<String, LabelId>,
}

#[derive(Serialize, Deserialize)]
struct SpaceRepr {
    task: Task,
    names: Vec<String>,
}

impl From<SpaceRepr> for LabelSpace {
    fn from(repr: SpaceRepr) -> Self {
        LabelSpace::build(repr.task, &repr.names)
    }
}

impl From<LabelSpace> for SpaceRepr {
    fn from(space: LabelSpace) -> Self {
        Self {
            task: space.task,
            names: space.names,
        }
    }
}

impl PartialEq for LabelSpace {
    fn eq(&self, other: &Self) -> bool {
        self.task == other.task && self.names == other.names
    }
}

impl Eq for LabelSpace {}

impl LabelSpace {
    /// Build a label space from an ordered list of names.
    ///
    /// # Errors
    ///
    /// Fails on an empty list, duplicate names, more than [`MAX_LABELS`]
    /// labels, or a label whose known inverse is missing from the list.
    pub fn new(task: Task, names: &[&str]) -> Result<Self> {
        if names.is_empty() {
            return Err(Error::invalid_input(format!("empty {task} label space")));
        }
        if names.len() > MAX_LABELS {
            return Err(Error::invalid_input(format!(
                "{task} label space has {} labels, at most {MAX_LABELS} supported",
                names.len()
            )));
        }
        let space = Self::build(task, names);
        if space.ids.len() != names.len() {
            return Err(Error::invalid_input(format!(
                "duplicate label names in {task} label space"
            )));
        }
        for name in names {
            if let Some(partner) = known_inverse(name) {
                if !space.ids.contains_key(partner) {
                    return Err(Error::invalid_input(format!(
                        "label {name} needs its inverse {partner} in the {task} label space"
                    )));
                }
            }
        }
        Ok(space)
    }

    fn build<S: AsRef<str>>(task: Task, names: &[S]) -> Self {
        let names: Vec<String> = names.iter().map(|n| n.as_ref().to_string()).collect();
        let ids: HashMap<String, LabelId> = names
            .iter()
            .enumerate()
            .map(|(i, n)| (n.clone(), i))
            .collect();
        let inverse = names
            .iter()
            .enumerate()
            .map(|(i, n)| {
                known_inverse(n)
                    .and_then(|partner| ids.get(partner).copied())
                    .unwrap_or(i)
            })
            .collect();
        Self {
            task,
            names,
            inverse,
            ids,
        }
    }

    /// The task this space labels.
    #[must_use]
    pub fn task(&self) -> Task {
        self.task
    }

    /// Number of labels.
    #[must_use]
    pub fn len(&self) -> usize {
        self.names.len()
    }

    /// Always false for a constructed space.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    /// Label names in id order.
    #[must_use]
    pub fn names(&self) -> &[String] {
        &self.names
    }

    /// Name of a label id.
    #[must_use]
    pub fn name_of(&self, id: LabelId) -> Option<&str> {
        self.names.get(id).map(String::as_str)
    }

    /// Id of a label name, if defined.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<LabelId> {
        self.ids.get(name).copied()
    }

    /// Id of a label name.
    ///
    /// # Errors
    ///
    /// Returns [`Error::UnknownLabel`] when the name is not in this space.
    pub fn id_of(&self, name: &str) -> Result<LabelId> {
        self.get(name).ok_or_else(|| Error::UnknownLabel {
            label: name.to_string(),
            space: self.task.to_string(),
        })
    }

    /// Inverse of a label: the relation seen from the other event.
    ///
    /// # Panics
    ///
    /// Panics if `id` is out of range.
    #[must_use]
    pub fn inverse(&self, id: LabelId) -> LabelId {
        self.inverse[id]
    }

    /// The full set of labels.
    #[must_use]
    pub fn all(&self) -> LabelSet {
        LabelSet::full(self.len())
    }

    /// Labels ignored by micro F1: NONE always, VAGUE when there are four labels.
    #[must_use]
    pub fn default_exclusions(&self) -> LabelSet {
        let mut excluded = LabelSet::empty();
        if let Some(none) = self.get(NONE_LABEL) {
            excluded.insert(none);
        }
        if self.len() == 4 {
            if let Some(vague) = self.get(VAGUE_LABEL) {
                excluded.insert(vague);
            }
        }
        excluded
    }
}

fn known_inverse(name: &str) -> Option<&'static str> {
    INVERSES.iter().find_map(|&(a, b)| {
        if a == name {
            Some(b)
        } else if b == name {
            Some(a)
        } else {
            None
        }
    })
}

// =============================================================================
// LabelAlgebra
// =============================================================================

/// Immutable label configuration shared by every component of one run.
///
/// Construct once per dataset schema and pass by reference.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LabelAlgebra {
    schema: DatasetSchema,
    temporal: LabelSpace,
    causal: Option<LabelSpace>,
    transitivity: Vec<LabelSet>,
    cross_task: Vec<LabelSet>,
}

impl LabelAlgebra {
    /// Build the algebra for a schema; `joint` adds the causal space.
    #[must_use]
    pub fn new(schema: DatasetSchema, joint: bool) -> Self {
        let temporal = LabelSpace::build(Task::Temporal, schema.temporal_labels());
        let causal = joint.then(|| LabelSpace::build(Task::Causal, CAUSAL_LABELS));
        let transitivity = compose_table(&temporal);
        let cross_task = match &causal {
            Some(causal) => cross_task_table(causal, &temporal),
            None => Vec::new(),
        };
        Self {
            schema,
            temporal,
            causal,
            transitivity,
            cross_task,
        }
    }

    /// Temporal-only algebra for a schema.
    #[must_use]
    pub fn temporal_only(schema: DatasetSchema) -> Self {
        Self::new(schema, false)
    }

    /// Joint temporal + causal algebra for a schema.
    #[must_use]
    pub fn joint(schema: DatasetSchema) -> Self {
        Self::new(schema, true)
    }

    /// The dataset schema.
    #[must_use]
    pub fn schema(&self) -> DatasetSchema {
        self.schema
    }

    /// Whether the causal space is active.
    #[must_use]
    pub fn is_joint(&self) -> bool {
        self.causal.is_some()
    }

    /// The temporal label space.
    #[must_use]
    pub fn temporal(&self) -> &LabelSpace {
        &self.temporal
    }

    /// The causal label space, if joint.
    #[must_use]
    pub fn causal(&self) -> Option<&LabelSpace> {
        self.causal.as_ref()
    }

    /// Label space of a task.
    ///
    /// # Errors
    ///
    /// Asking for the causal space of a temporal-only algebra is invalid input.
    pub fn space(&self, task: Task) -> Result<&LabelSpace> {
        match task {
            Task::Temporal => Ok(&self.temporal),
            Task::Causal => self.causal.as_ref().ok_or_else(|| {
                Error::invalid_input("causal label space requested from a temporal-only algebra")
            }),
        }
    }

    /// Labels admissible on `a -> c` given `a -> b` is `ab` and `b -> c` is `bc`.
    ///
    /// Never empty: unconstrained compositions allow every label.
    #[must_use]
    pub fn allowed(&self, ab: LabelId, bc: LabelId) -> LabelSet {
        self.transitivity[ab * self.temporal.len() + bc]
    }

    /// Temporal labels admissible on a pair whose causal label is `causal`.
    ///
    /// Returns every temporal label for a temporal-only algebra.
    #[must_use]
    pub fn temporal_allowed_for_causal(&self, causal: LabelId) -> LabelSet {
        self.cross_task
            .get(causal)
            .copied()
            .unwrap_or_else(|| self.temporal.all())
    }
}

fn compose_table(space: &LabelSpace) -> Vec<LabelSet> {
    let n = space.len();
    let mut table = vec![space.all(); n * n];
    for &(ab, bc, ac) in COMPOSITION {
        let (Some(ab), Some(bc)) = (space.get(ab), space.get(bc)) else {
            continue;
        };
        let allowed: LabelSet = ac.iter().filter_map(|name| space.get(name)).collect();
        if !allowed.is_empty() {
            table[ab * n + bc] = allowed;
        }
    }
    table
}

fn cross_task_table(causal: &LabelSpace, temporal: &LabelSpace) -> Vec<LabelSet> {
    (0..causal.len())
        .map(|c| {
            let name = causal.names[c].as_str();
            CAUSAL_IMPLIES_TEMPORAL
                .iter()
                .find(|(cause, _)| *cause == name)
                .and_then(|(_, t)| temporal.get(t))
                .map(|t| std::iter::once(t).collect())
                .unwrap_or_else(|| temporal.all())
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_schema_sizes() {
        assert_eq!(DatasetSchema::Matres.temporal_labels().len(), 4);
        assert_eq!(DatasetSchema::Tcr.temporal_labels().len(), 4);
        assert_eq!(DatasetSchema::Tbd.temporal_labels().len(), 6);
        assert_eq!(DatasetSchema::Red.temporal_labels().len(), 8);
    }

    #[test]
    fn test_schema_from_str() {
        assert_eq!("MATRES".parse::<DatasetSchema>().unwrap(), DatasetSchema::Matres);
        assert_eq!("new".parse::<DatasetSchema>().unwrap(), DatasetSchema::Tcr);
        assert!("timebank".parse::<DatasetSchema>().is_err());
    }

    #[test]
    fn test_inverse_is_involution() {
        for schema in DatasetSchema::ALL {
            let algebra = LabelAlgebra::joint(schema);
            for space in [algebra.temporal(), algebra.causal().unwrap()] {
                for l in 0..space.len() {
                    assert_eq!(space.inverse(space.inverse(l)), l, "{schema} {l}");
                }
            }
        }
    }

    #[test]
    fn test_inverse_pairs() {
        let algebra = LabelAlgebra::joint(DatasetSchema::Tbd);
        let t = algebra.temporal();
        assert_eq!(t.inverse(t.id_of("BEFORE").unwrap()), t.id_of("AFTER").unwrap());
        assert_eq!(
            t.inverse(t.id_of("INCLUDES").unwrap()),
            t.id_of("IS_INCLUDED").unwrap()
        );
        let v = t.id_of("VAGUE").unwrap();
        assert_eq!(t.inverse(v), v);
        let c = algebra.causal().unwrap();
        assert_eq!(c.inverse(0), 1);
    }

    #[test]
    fn test_transitivity_total() {
        for schema in DatasetSchema::ALL {
            let algebra = LabelAlgebra::temporal_only(schema);
            let n = algebra.temporal().len();
            for ab in 0..n {
                for bc in 0..n {
                    let allowed = algebra.allowed(ab, bc);
                    assert!(!allowed.is_empty());
                    assert!(allowed.iter().all(|l| l < n));
                }
            }
        }
    }

    #[test]
    fn test_transitivity_closed_under_inversion() {
        // If ab∘bc -> S then inv(bc)∘inv(ab) -> inv(S).
        for schema in DatasetSchema::ALL {
            let algebra = LabelAlgebra::temporal_only(schema);
            let t = algebra.temporal();
            for ab in 0..t.len() {
                for bc in 0..t.len() {
                    let forward: LabelSet =
                        algebra.allowed(ab, bc).iter().map(|l| t.inverse(l)).collect();
                    let backward = algebra.allowed(t.inverse(bc), t.inverse(ab));
                    assert_eq!(forward, backward, "{schema}: {ab} {bc}");
                }
            }
        }
    }

    #[test]
    fn test_before_before_is_before() {
        let algebra = LabelAlgebra::temporal_only(DatasetSchema::Matres);
        let t = algebra.temporal();
        let b = t.id_of("BEFORE").unwrap();
        let a = t.id_of("AFTER").unwrap();
        let allowed = algebra.allowed(b, b);
        assert_eq!(allowed.len(), 1);
        assert!(allowed.contains(b));
        assert!(!allowed.contains(a));

        let v = t.id_of("VAGUE").unwrap();
        assert_eq!(algebra.allowed(v, v), t.all());
        let bv = algebra.allowed(b, v);
        assert!(bv.contains(b) && bv.contains(v) && bv.len() == 2);
    }

    #[test]
    fn test_cross_task() {
        let algebra = LabelAlgebra::joint(DatasetSchema::Tcr);
        let c = algebra.causal().unwrap();
        let t = algebra.temporal();
        let causes = c.id_of("CAUSES").unwrap();
        let allowed = algebra.temporal_allowed_for_causal(causes);
        assert_eq!(allowed.len(), 1);
        assert!(allowed.contains(t.id_of("BEFORE").unwrap()));

        let temporal_only = LabelAlgebra::temporal_only(DatasetSchema::Tcr);
        assert_eq!(temporal_only.temporal_allowed_for_causal(0), t.all());
        assert!(temporal_only.space(Task::Causal).is_err());
    }

    #[test]
    fn test_default_exclusions() {
        let matres = LabelAlgebra::temporal_only(DatasetSchema::Matres);
        let ex = matres.temporal().default_exclusions();
        assert!(ex.contains(matres.temporal().id_of("VAGUE").unwrap()));
        assert_eq!(ex.len(), 1);

        let tbd = LabelAlgebra::temporal_only(DatasetSchema::Tbd);
        assert!(tbd.temporal().default_exclusions().is_empty());

        let red = LabelAlgebra::temporal_only(DatasetSchema::Red);
        let ex = red.temporal().default_exclusions();
        assert_eq!(ex.len(), 1);
        assert!(ex.contains(red.temporal().id_of("NONE").unwrap()));
    }

    #[test]
    fn test_custom_space_validation() {
        assert!(LabelSpace::new(Task::Temporal, &["A", "B", "C", "D"]).is_ok());
        assert!(LabelSpace::new(Task::Temporal, &[]).is_err());
        assert!(LabelSpace::new(Task::Temporal, &["A", "A"]).is_err());
        assert!(LabelSpace::new(Task::Temporal, &["BEFORE", "VAGUE"]).is_err());
        let err = LabelSpace::new(Task::Causal, &["CAUSES", "CAUSED_BY"])
            .unwrap()
            .id_of("PREVENTS")
            .unwrap_err();
        assert!(matches!(err, Error::UnknownLabel { .. }));
    }

    #[test]
    fn test_label_set() {
        let mut set = LabelSet::empty();
        assert!(set.is_empty());
        set.insert(0);
        set.insert(3);
        assert_eq!(set.len(), 2);
        assert_eq!(set.iter().collect::<Vec<_>>(), vec![0, 3]);
        assert_eq!(LabelSet::full(4).len(), 4);
        assert!(!LabelSet::full(4).contains(4));
    }

    #[test]
    fn test_algebra_serde_roundtrip() {
        let algebra = LabelAlgebra::joint(DatasetSchema::Tbd);
        let json = serde_json::to_string(&algebra).unwrap();
        let restored: LabelAlgebra = serde_json::from_str(&json).unwrap();
        assert_eq!(restored.temporal().id_of("VAGUE").unwrap(), 5);
        assert_eq!(restored.allowed(0, 0), algebra.allowed(0, 0));
    }

    proptest::proptest! {
        #[test]
        fn prop_label_set_matches_btreeset(ids in proptest::collection::vec(0usize..MAX_LABELS, 0..20)) {
            let set: LabelSet = ids.iter().copied().collect();
            let reference: std::collections::BTreeSet<usize> = ids.iter().copied().collect();
            proptest::prop_assert_eq!(set.len(), reference.len());
            proptest::prop_assert_eq!(set.iter().collect::<Vec<_>>(), reference.into_iter().collect::<Vec<_>>());
        }
    }
}
