//! # eventrel
//!
//! Joint temporal and causal relation labeling with global consistency.
//!
//! - **Inference**: one 0/1 program over every scored event pair, with
//!   uniqueness, symmetry, per-document transitivity, and causal-temporal
//!   constraints
//! - **Loss**: margin-rescaled structured hinge loss against gold labels
//! - **Evaluation**: micro F1 with label exclusions, per-label reports,
//!   temporal-awareness relation lists
//! - **Training**: epoch-granular driver around an external pair scorer
//!
//! ## Quick Start
//!
//! ```rust
//! use eventrel::inference::GlobalInference;
//! use eventrel::{DatasetSchema, LabelAlgebra, Pair, ScoreTable};
//!
//! let algebra = LabelAlgebra::temporal_only(DatasetSchema::Matres);
//! let before = algebra.temporal().id_of("BEFORE").unwrap();
//! let after = algebra.temporal().id_of("AFTER").unwrap();
//!
//! // a < b and b < c are confident; a > c is locally preferred but inconsistent.
//! let pairs = vec![
//!     Pair::new("doc", "a", "b"),
//!     Pair::new("doc", "b", "c"),
//!     Pair::new("doc", "a", "c"),
//! ];
//! let mut rows = vec![vec![0.0; 4]; 3];
//! rows[0][before] = 0.9;
//! rows[1][before] = 0.9;
//! rows[2][after] = 0.6;
//! rows[2][before] = 0.4;
//! let scores = ScoreTable::from_rows(&rows, 4).unwrap();
//!
//! let out = GlobalInference::new(&algebra)
//!     .solve(&pairs, &scores, &[], &ScoreTable::new(0))
//!     .unwrap();
//! assert_eq!(out.temporal.labels(), &[before, before, before]);
//! ```
//!
//! ## Label schemas
//!
//! | Schema | Temporal labels |
//! |--------|-----------------|
//! | `matres`, `tcr` | BEFORE, AFTER, SIMULTANEOUS, VAGUE |
//! | `tbd` | + INCLUDES, IS_INCLUDED |
//! | `red` | + INCLUDES, IS_INCLUDED, OVERLAP, NONE |
//!
//! The causal space (joint mode) is CAUSES / CAUSED_BY.
//!
//! ## Feature Flags
//!
//! - `parallel`: enumerate per-document transitivity triples on rayon

#![warn(missing_docs)]

pub mod aggregate;
pub mod config;
pub mod eval;
pub mod inference;
pub mod loss;
pub mod train;

pub use eventrel_core::{
    Assignment, DatasetSchema, Error, LabelAlgebra, LabelId, LabelSet, LabelSpace, Pair, PairKey,
    Result, ScoreTable, Task, CAUSAL_LABELS, NONE_LABEL, VAGUE_LABEL,
};

pub use aggregate::{AggregatedScores, ScoreAggregator, ScoreBatch, ScoredPairs};
pub use config::{ParamGrid, ParamSetting, SolverConfig, TrainConfig};
pub use inference::{GlobalInference, JointAssignment, SolverBackend};
pub use loss::{joint_loss, structured_hinge, JointLoss};
pub use train::{Instance, InstanceKind, PairScorer, Trainer, UpdateStep};
