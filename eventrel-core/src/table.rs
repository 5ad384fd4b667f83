//! Dense score tables and one-hot assignments.

use crate::error::{Error, Result};
use crate::label::LabelId;
use serde::{Deserialize, Serialize};

/// Row-major `rows x labels` matrix of scorer outputs.
///
/// Row `i` holds the score of every label for the `i`-th pair of the
/// aligned pair list. A table with zero rows is valid (e.g. no causal pairs).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ScoreTable {
    n_labels: usize,
    data: Vec<f64>,
}

impl ScoreTable {
    /// Empty table with a fixed row width.
    #[must_use]
    pub fn new(n_labels: usize) -> Self {
        Self {
            n_labels,
            data: Vec::new(),
        }
    }

    /// Table of zeros.
    #[must_use]
    pub fn zeros(n_rows: usize, n_labels: usize) -> Self {
        Self {
            n_labels,
            data: vec![0.0; n_rows * n_labels],
        }
    }

    /// Build from rows, checking every row has `n_labels` finite scores.
    ///
    /// # Errors
    ///
    /// The first error [`Self::push_row`] reports.
    pub fn from_rows<R: AsRef<[f64]>>(rows: &[R], n_labels: usize) -> Result<Self> {
        let mut table = Self::new(n_labels);
        for row in rows {
            table.push_row(row.as_ref())?;
        }
        Ok(table)
    }

    /// Append one row.
    ///
    /// # Errors
    ///
    /// Shape mismatch on a wrong width, invalid input on a non-finite score.
    pub fn push_row(&mut self, row: &[f64]) -> Result<()> {
        Error::check_len("score row width", self.n_labels, row.len())?;
        if let Some(bad) = row.iter().find(|s| !s.is_finite()) {
            return Err(Error::invalid_input(format!(
                "non-finite score {bad} in row {}",
                self.n_rows()
            )));
        }
        self.data.extend_from_slice(row);
        Ok(())
    }

    /// Append every row of `other`.
    ///
    /// # Errors
    ///
    /// Shape mismatch when a non-empty `other` has a different width.
    pub fn extend_from(&mut self, other: &ScoreTable) -> Result<()> {
        if other.n_rows() == 0 {
            return Ok(());
        }
        Error::check_len("score row width", self.n_labels, other.n_labels)?;
        self.data.extend_from_slice(&other.data);
        Ok(())
    }

    /// Number of rows.
    #[must_use]
    pub fn n_rows(&self) -> usize {
        if self.n_labels == 0 {
            0
        } else {
            self.data.len() / self.n_labels
        }
    }

    /// Row width.
    #[must_use]
    pub fn n_labels(&self) -> usize {
        self.n_labels
    }

    /// Whether the table has no rows.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Scores of one row.
    ///
    /// # Panics
    ///
    /// Panics if `row` is out of range.
    #[must_use]
    pub fn row(&self, row: usize) -> &[f64] {
        &self.data[row * self.n_labels..(row + 1) * self.n_labels]
    }

    /// Score of one cell.
    #[must_use]
    pub fn get(&self, row: usize, label: LabelId) -> f64 {
        self.data[row * self.n_labels + label]
    }

    /// Mutable access to one cell.
    pub fn get_mut(&mut self, row: usize, label: LabelId) -> &mut f64 {
        &mut self.data[row * self.n_labels + label]
    }

    /// Iterate rows.
    pub fn rows(&self) -> impl Iterator<Item = &[f64]> {
        // chunks_exact panics on a zero chunk size.
        self.data.chunks_exact(self.n_labels.max(1))
    }

    /// Highest-scoring label of a row (first one on ties).
    #[must_use]
    pub fn argmax(&self, row: usize) -> LabelId {
        self.row(row)
            .iter()
            .enumerate()
            .fold((0, f64::NEG_INFINITY), |best, (l, &s)| {
                if s > best.1 {
                    (l, s)
                } else {
                    best
                }
            })
            .0
    }
}

/// Exactly one chosen label per row, aligned with a [`ScoreTable`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Assignment {
    n_labels: usize,
    labels: Vec<LabelId>,
}

impl Assignment {
    /// Zero-row assignment.
    #[must_use]
    pub fn empty(n_labels: usize) -> Self {
        Self {
            n_labels,
            labels: Vec::new(),
        }
    }

    /// Build from one label id per row.
    ///
    /// # Errors
    ///
    /// Invalid input for a label id `>= n_labels`.
    pub fn from_labels(labels: Vec<LabelId>, n_labels: usize) -> Result<Self> {
        if let Some(bad) = labels.iter().find(|&&l| l >= n_labels) {
            return Err(Error::invalid_input(format!(
                "label id {bad} out of range for {n_labels} labels"
            )));
        }
        Ok(Self { n_labels, labels })
    }

    /// Build from a one-hot indicator matrix.
    ///
    /// # Errors
    ///
    /// [`Error::InvalidAssignment`] when a row does not have exactly one set bit.
    pub fn from_indicators<R: AsRef<[bool]>>(rows: &[R], n_labels: usize) -> Result<Self> {
        let mut labels = Vec::with_capacity(rows.len());
        for (i, row) in rows.iter().enumerate() {
            let row = row.as_ref();
            Error::check_len("indicator row width", n_labels, row.len())?;
            let selected = row.iter().filter(|&&b| b).count();
            if selected != 1 {
                return Err(Error::InvalidAssignment { row: i, selected });
            }
            labels.push(row.iter().position(|&b| b).unwrap_or_default());
        }
        Ok(Self { n_labels, labels })
    }

    /// Local (unconstrained) decoding: argmax of every row.
    #[must_use]
    pub fn argmax(scores: &ScoreTable) -> Self {
        Self {
            n_labels: scores.n_labels(),
            labels: (0..scores.n_rows()).map(|r| scores.argmax(r)).collect(),
        }
    }

    /// Number of rows.
    #[must_use]
    pub fn len(&self) -> usize {
        self.labels.len()
    }

    /// Whether there are no rows.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }

    /// Row width of the one-hot view.
    #[must_use]
    pub fn n_labels(&self) -> usize {
        self.n_labels
    }

    /// Chosen label of a row.
    #[must_use]
    pub fn label(&self, row: usize) -> LabelId {
        self.labels[row]
    }

    /// All chosen labels in row order.
    #[must_use]
    pub fn labels(&self) -> &[LabelId] {
        &self.labels
    }

    /// One cell of the one-hot view.
    #[must_use]
    pub fn indicator(&self, row: usize, label: LabelId) -> bool {
        self.labels[row] == label
    }

    /// Materialize the one-hot indicator matrix.
    #[must_use]
    pub fn to_one_hot(&self) -> Vec<Vec<u8>> {
        self.labels
            .iter()
            .map(|&l| {
                let mut row = vec![0u8; self.n_labels];
                row[l] = 1;
                row
            })
            .collect()
    }

    /// Hamming distance between row `row`'s one-hot vector and the one-hot of `gold`.
    ///
    /// Two cells differ when the labels disagree, none otherwise.
    #[must_use]
    pub fn hamming(&self, row: usize, gold: LabelId) -> usize {
        if self.labels[row] == gold {
            0
        } else {
            2
        }
    }
}
