//! Per-document relation lists for temporal-awareness scoring.
//!
//! Temporal awareness compares the temporal closure of gold and predicted
//! graphs document by document. The closure comparison lives outside this
//! crate behind [`TemporalAwarenessEvaluator`]; this module only assembles its
//! input:
//!
//! - gold relations per document, skipping gold `VAGUE` on MATRES;
//! - predicted relations per document, keyed through the gold rows, so a
//!   prediction whose row has no document mapping is dropped;
//! - optionally, event-timex and timex-timex edges appended on TBD.
//!
//! Timex edge files are JSON objects `{ "doc_id": [[left, right, label], ...] }`.

use crate::{DatasetSchema, Error, LabelId, LabelSpace, Pair, Result, VAGUE_LABEL};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashSet};
use std::path::Path;

/// One labeled edge of a document graph.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocRelation {
    /// Left node (event or timex id).
    pub left: String,
    /// Right node.
    pub right: String,
    /// Label name.
    pub label: String,
}

impl DocRelation {
    /// Create a relation.
    pub fn new(left: impl Into<String>, right: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            left: left.into(),
            right: right.into(),
            label: label.into(),
        }
    }
}

/// Externally produced edges involving time expressions, per document.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TimexEdges {
    edges: BTreeMap<String, Vec<(String, String, String)>>,
}

impl TimexEdges {
    /// Parse from a JSON string.
    ///
    /// # Errors
    ///
    /// [`Error::Json`] when the text is not a map of `[left, right, label]` lists.
    pub fn from_json_str(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Load from a JSON file.
    ///
    /// # Errors
    ///
    /// [`Error::Io`] for an unreadable file, otherwise as [`Self::from_json_str`].
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self> {
        let text = std::fs::read_to_string(path.as_ref())?;
        Self::from_json_str(&text)
    }

    /// Documents with at least one edge.
    #[must_use]
    pub fn num_documents(&self) -> usize {
        self.edges.len()
    }

    fn iter(&self) -> impl Iterator<Item = (&String, &Vec<(String, String, String)>)> {
        self.edges.iter()
    }
}

/// Gold and predicted relations grouped by document.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RelationLists {
    /// Gold edges per document.
    pub gold: BTreeMap<String, Vec<DocRelation>>,
    /// Predicted edges per document.
    pub predicted: BTreeMap<String, Vec<DocRelation>>,
}

/// Timex edges to append on TBD: `(gold, predicted)`.
#[derive(Debug, Clone, Copy)]
pub struct TimexInput<'a> {
    /// Reference edges.
    pub gold: &'a TimexEdges,
    /// System edges.
    pub predicted: &'a TimexEdges,
}

impl RelationLists {
    /// Build the lists from evaluation rows.
    ///
    /// `pairs[i]` and `gold[i]` describe row `i`; `pred` holds one prediction
    /// per row position and may be shorter or longer than `pairs`. Timex
    /// edges are appended only for [`DatasetSchema::Tbd`].
    ///
    /// # Errors
    ///
    /// [`Error::ShapeMismatch`] when `pairs` and `gold` differ in length, or
    /// [`Error::InvalidInput`] for a label id outside `space`.
    pub fn build(
        pairs: &[Pair],
        gold: &[LabelId],
        pred: &[LabelId],
        space: &LabelSpace,
        schema: DatasetSchema,
        timex: Option<TimexInput<'_>>,
    ) -> Result<Self> {
        Error::check_len("gold labels vs pairs", pairs.len(), gold.len())?;
        let name = |id: LabelId| {
            space
                .name_of(id)
                .map(str::to_string)
                .ok_or_else(|| Error::invalid_input(format!("label id {id} out of range")))
        };
        let skip_vague = match schema {
            DatasetSchema::Matres => space.get(VAGUE_LABEL),
            _ => None,
        };

        let mut lists = RelationLists::default();
        let mut kept: HashSet<usize> = HashSet::new();
        for (row, (pair, &g)) in pairs.iter().zip(gold).enumerate() {
            if skip_vague == Some(g) {
                continue;
            }
            lists
                .gold
                .entry(pair.doc_id.clone())
                .or_default()
                .push(DocRelation::new(&pair.left, &pair.right, name(g)?));
            kept.insert(row);
        }

        if let (DatasetSchema::Tbd, Some(t)) = (schema, timex) {
            append(&mut lists.gold, t.gold);
        }

        let mut skipped = 0usize;
        for (row, &p) in pred.iter().enumerate() {
            if !kept.contains(&row) {
                skipped += 1;
                continue;
            }
            let pair = &pairs[row];
            lists
                .predicted
                .entry(pair.doc_id.clone())
                .or_default()
                .push(DocRelation::new(&pair.left, &pair.right, name(p)?));
        }
        if skipped > 0 {
            log::debug!("{skipped} predictions without a document mapping were skipped");
        }

        if let (DatasetSchema::Tbd, Some(t)) = (schema, timex) {
            append(&mut lists.predicted, t.predicted);
        }
        Ok(lists)
    }

    /// Number of gold edges over all documents.
    #[must_use]
    pub fn num_gold(&self) -> usize {
        self.gold.values().map(Vec::len).sum()
    }

    /// Number of predicted edges over all documents.
    #[must_use]
    pub fn num_predicted(&self) -> usize {
        self.predicted.values().map(Vec::len).sum()
    }
}

fn append(target: &mut BTreeMap<String, Vec<DocRelation>>, edges: &TimexEdges) {
    for (doc, list) in edges.iter() {
        target
            .entry(doc.clone())
            .or_default()
            .extend(list.iter().map(|(l, r, lab)| DocRelation::new(l, r, lab)));
    }
}

/// Temporal-awareness precision / recall / F1.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct AwarenessScore {
    /// Precision.
    pub precision: f64,
    /// Recall.
    pub recall: f64,
    /// F1.
    pub f1: f64,
}

/// Closure-based graph comparison.
pub trait TemporalAwarenessEvaluator {
    /// Score predicted against gold relation lists.
    fn evaluate(&self, lists: &RelationLists) -> Result<AwarenessScore>;
}

/// Build relation lists and hand them to an evaluator.
///
/// # Errors
///
/// Errors of [`RelationLists::build`] and of the evaluator.
pub fn temporal_awareness<E: TemporalAwarenessEvaluator + ?Sized>(
    evaluator: &E,
    pairs: &[Pair],
    gold: &[LabelId],
    pred: &[LabelId],
    space: &LabelSpace,
    schema: DatasetSchema,
    timex: Option<TimexInput<'_>>,
) -> Result<AwarenessScore> {
    let lists = RelationLists::build(pairs, gold, pred, space, schema, timex)?;
    log::debug!(
        "temporal awareness over {} documents: {} gold, {} predicted edges",
        lists.gold.len(),
        lists.num_gold(),
        lists.num_predicted()
    );
    let score = evaluator.evaluate(&lists)?;
    log::info!(
        "temporal awareness: P={:.4} R={:.4} F1={:.4}",
        score.precision,
        score.recall,
        score.f1
    );
    Ok(score)
}
