//! Evaluation of decoded relation labels.
//!
//! # Overview
//!
//! | Item | Purpose |
//! |------|---------|
//! | [`weighted_f1`] | micro F1 under the exclusion policy (`NONE`, plus `VAGUE` for 4-label spaces) |
//! | [`ClassificationReport`] | per-label precision / recall / F1 and the micro aggregate |
//! | [`EvalView`] | rows that count: stored orientation only, gold `VAGUE` dropped except on TBD |
//! | [`RelationLists`] | per-document gold / predicted edges for temporal awareness |
//!
//! Division by zero anywhere yields 0.
//!
//! # Example
//!
//! ```rust
//! use eventrel::eval::{ClassificationReport, EvalView};
//! use eventrel::{DatasetSchema, LabelAlgebra, Pair};
//!
//! let algebra = LabelAlgebra::temporal_only(DatasetSchema::Matres);
//! let pairs = vec![
//!     Pair::new("d", "e1", "e2"),
//!     Pair::new("d", "e2", "e1").with_reversed(true),
//! ];
//! let view = EvalView::select(&pairs, &[0, 1], &[0, 1], algebra.temporal(), DatasetSchema::Matres, true)
//!     .unwrap();
//! let report = ClassificationReport::new("global", &view.pred, &view.gold, algebra.temporal()).unwrap();
//! assert_eq!(report.micro_f1, 1.0);
//! ```

pub mod awareness;
pub mod metrics;
pub mod report;
pub mod view;

pub use awareness::{
    temporal_awareness, AwarenessScore, DocRelation, RelationLists, TemporalAwarenessEvaluator,
    TimexEdges, TimexInput,
};
pub use metrics::{f1_score, label_counts, micro, weighted_f1, weighted_f1_with, PrfCounts};
pub use report::{ClassificationReport, LabelMetrics};
pub use view::EvalView;
