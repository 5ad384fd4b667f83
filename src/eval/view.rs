//! Row selection for evaluation.
//!
//! Decoded tables contain every scored row, including flipped copies when
//! backward sampling is on. Evaluation counts each relationship once, in its
//! stored orientation, and skips gold `VAGUE` rows unless the schema is TBD.

use crate::{DatasetSchema, Error, LabelId, LabelSpace, Pair, Result, VAGUE_LABEL};
use serde::{Deserialize, Serialize};

/// Predictions and gold labels of the rows that count for evaluation.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EvalView {
    /// Source row of each kept entry.
    pub rows: Vec<usize>,
    /// Predicted label per kept row.
    pub pred: Vec<LabelId>,
    /// Gold label per kept row.
    pub gold: Vec<LabelId>,
}

impl EvalView {
    /// Select rows from decoded output.
    ///
    /// - With `backward_sample`, rows with `reversed = true` are dropped.
    /// - Gold-`VAGUE` rows are dropped unless `schema` is [`DatasetSchema::Tbd`].
    ///
    /// # Errors
    ///
    /// [`Error::ShapeMismatch`] when the three lists differ in length.
    pub fn select(
        pairs: &[Pair],
        pred: &[LabelId],
        gold: &[LabelId],
        space: &LabelSpace,
        schema: DatasetSchema,
        backward_sample: bool,
    ) -> Result<Self> {
        Error::check_len("predictions vs pairs", pairs.len(), pred.len())?;
        Error::check_len("gold labels vs pairs", pairs.len(), gold.len())?;
        let vague = match schema {
            DatasetSchema::Tbd => None,
            _ => space.get(VAGUE_LABEL),
        };

        let mut view = EvalView::default();
        for (row, pair) in pairs.iter().enumerate() {
            if backward_sample && pair.reversed {
                continue;
            }
            if vague.is_some_and(|v| gold[row] == v) {
                continue;
            }
            view.rows.push(row);
            view.pred.push(pred[row]);
            view.gold.push(gold[row]);
        }
        Ok(view)
    }

    /// Number of kept rows.
    #[must_use]
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// Whether no row was kept.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::LabelAlgebra;

    fn pairs() -> Vec<Pair> {
        vec![
            Pair::new("d", "e1", "e2"),
            Pair::new("d", "e2", "e3"),
            Pair::new("d", "e2", "e1").with_reversed(true),
        ]
    }

    #[test]
    fn test_drops_reversed_and_vague() {
        let algebra = LabelAlgebra::temporal_only(DatasetSchema::Matres);
        let space = algebra.temporal();
        let vague = space.id_of("VAGUE").unwrap();
        let view = EvalView::select(
            &pairs(),
            &[0, 1, 1],
            &[0, vague, 1],
            space,
            DatasetSchema::Matres,
            true,
        )
        .unwrap();
        assert_eq!(view.rows, vec![0]);
        assert_eq!(view.pred, vec![0]);
    }

    #[test]
    fn test_tbd_keeps_vague_and_no_backward_keeps_all() {
        let algebra = LabelAlgebra::temporal_only(DatasetSchema::Tbd);
        let space = algebra.temporal();
        let vague = space.id_of("VAGUE").unwrap();
        let view = EvalView::select(
            &pairs(),
            &[0, 1, 1],
            &[0, vague, 1],
            space,
            DatasetSchema::Tbd,
            false,
        )
        .unwrap();
        assert_eq!(view.len(), 3);
    }

    #[test]
    fn test_length_mismatch() {
        let algebra = LabelAlgebra::temporal_only(DatasetSchema::Matres);
        assert!(EvalView::select(
            &pairs(),
            &[0],
            &[0, 0, 0],
            algebra.temporal(),
            DatasetSchema::Matres,
            true
        )
        .is_err());
    }
}
