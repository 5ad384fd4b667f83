//! Score aggregation across one pass over the data.
//!
//! The scorer runs batch by batch, separately for each task and for each
//! direction (forward, or flipped with the two events swapped). Global
//! inference needs everything at once, so the aggregator collects the batches
//! into one table per task:
//!
//! ```text
//! temporal table = [forward batch 1, forward batch 2, ..., flipped batch 1, ...]
//! causal table   = [forward batch 1, ..., flipped batch 1, ...]
//! ```
//!
//! Rows keep pass order inside each direction. Flipped rows are recorded as
//! `(right, left)` with `reversed = true` so that downstream code sees the pair
//! in the orientation the scores refer to. Labels are never inverted here.

use crate::{Error, LabelAlgebra, LabelId, Pair, Result, ScoreTable, Task};
use serde::{Deserialize, Serialize};

/// Scorer output for one batch of one task in one direction.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScoreBatch {
    /// Task the batch was scored for.
    pub task: Task,
    /// Whether the scorer ran on flipped pairs.
    pub reversed: bool,
    /// Pairs as stored in the data, `(left, right)`.
    pub pairs: Vec<Pair>,
    /// One score row per pair.
    pub scores: ScoreTable,
    /// Gold label per pair.
    pub gold: Vec<LabelId>,
}

/// Pairs, scores, and gold labels of one task, row-aligned.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ScoredPairs {
    /// Pair identity per row.
    pub pairs: Vec<Pair>,
    /// Score table.
    pub scores: ScoreTable,
    /// Gold label per row.
    pub gold: Vec<LabelId>,
}

impl ScoredPairs {
    /// Empty set with a fixed row width.
    #[must_use]
    pub fn empty(n_labels: usize) -> Self {
        Self {
            pairs: Vec::new(),
            scores: ScoreTable::new(n_labels),
            gold: Vec::new(),
        }
    }

    /// Number of rows.
    #[must_use]
    pub fn len(&self) -> usize {
        self.pairs.len()
    }

    /// Whether there are no rows.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }

    /// Check that pairs, score rows, and gold labels line up.
    ///
    /// # Errors
    ///
    /// [`Error::ShapeMismatch`] on the first length that disagrees.
    pub fn validate(&self) -> Result<()> {
        Error::check_len("score rows vs pairs", self.pairs.len(), self.scores.n_rows())?;
        Error::check_len("gold labels vs pairs", self.pairs.len(), self.gold.len())
    }

    fn append(&mut self, other: ScoredPairs) -> Result<()> {
        self.scores.extend_from(&other.scores)?;
        self.pairs.extend(other.pairs);
        self.gold.extend(other.gold);
        Ok(())
    }
}

/// Aggregated tables for one pass.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AggregatedScores {
    /// Temporal rows.
    pub temporal: ScoredPairs,
    /// Causal rows (empty when the task is inactive or has no instances).
    pub causal: ScoredPairs,
}

/// Collects per-batch scorer outputs into one table per task.
#[derive(Debug)]
pub struct ScoreAggregator<'a> {
    algebra: &'a LabelAlgebra,
    // Indexed by [task][reversed].
    buckets: [[ScoredPairs; 2]; 2],
}

impl<'a> ScoreAggregator<'a> {
    /// Start an empty pass.
    #[must_use]
    pub fn new(algebra: &'a LabelAlgebra) -> Self {
        let t = algebra.temporal().len();
        let c = algebra.causal().map_or(0, |s| s.len());
        Self {
            algebra,
            buckets: [
                [ScoredPairs::empty(t), ScoredPairs::empty(t)],
                [ScoredPairs::empty(c), ScoredPairs::empty(c)],
            ],
        }
    }

    /// Add one batch.
    ///
    /// # Errors
    ///
    /// - [`Error::ShapeMismatch`] when pairs, score rows, gold labels, or the
    ///   row width disagree.
    /// - [`Error::InvalidInput`] for a causal batch on a temporal-only algebra
    ///   or an out-of-range gold label.
    pub fn push(&mut self, batch: ScoreBatch) -> Result<()> {
        let space = self.algebra.space(batch.task)?;
        Error::check_len(
            &format!("{} score rows vs pairs", batch.task),
            batch.pairs.len(),
            batch.scores.n_rows(),
        )?;
        Error::check_len(
            &format!("{} gold labels vs pairs", batch.task),
            batch.pairs.len(),
            batch.gold.len(),
        )?;
        if !batch.pairs.is_empty() {
            Error::check_len(
                &format!("{} score row width", batch.task),
                space.len(),
                batch.scores.n_labels(),
            )?;
        }
        if let Some(bad) = batch.gold.iter().find(|&&g| g >= space.len()) {
            return Err(Error::invalid_input(format!(
                "gold label {bad} out of range for the {} label space",
                batch.task
            )));
        }

        let pairs = if batch.reversed {
            batch
                .pairs
                .into_iter()
                .map(|p| Pair {
                    doc_id: p.doc_id,
                    left: p.right,
                    right: p.left,
                    reversed: true,
                })
                .collect()
        } else {
            batch.pairs
        };

        let bucket = &mut self.buckets[task_index(batch.task)][usize::from(batch.reversed)];
        bucket.append(ScoredPairs {
            pairs,
            scores: batch.scores,
            gold: batch.gold,
        })
    }

    /// Rows collected so far for a task.
    #[must_use]
    pub fn rows(&self, task: Task) -> usize {
        self.buckets[task_index(task)].iter().map(ScoredPairs::len).sum()
    }

    /// Concatenate forward then flipped rows per task.
    ///
    /// # Errors
    ///
    /// [`Error::ShapeMismatch`] when batches of one task differ in width.
    pub fn finish(self) -> Result<AggregatedScores> {
        let [[mut temporal, temporal_rev], [mut causal, causal_rev]] = self.buckets;
        temporal.append(temporal_rev)?;
        causal.append(causal_rev)?;
        temporal.validate()?;
        causal.validate()?;
        log::debug!(
            "aggregated {} temporal rows, {} causal rows",
            temporal.len(),
            causal.len()
        );
        Ok(AggregatedScores { temporal, causal })
    }
}

fn task_index(task: Task) -> usize {
    match task {
        Task::Temporal => 0,
        Task::Causal => 1,
    }
}
