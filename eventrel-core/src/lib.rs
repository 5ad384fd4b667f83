//! # eventrel-core
//!
//! Core types for the eventrel workspace: shared data structures used by the
//! inference engine, the structured loss, and the evaluation code.
//!
//! This crate provides:
//! - **Label algebra**: `LabelAlgebra`, `LabelSpace`, `LabelSet`, `DatasetSchema`, `Task`
//! - **Pairs**: `Pair`, `PairKey`
//! - **Tables**: `ScoreTable`, `Assignment`
//! - **Errors**: `Error`, `Result`

#![warn(missing_docs)]

pub mod error;
pub mod label;
pub mod pair;
pub mod table;

pub use error::{Error, Result};
pub use label::{
    DatasetSchema, LabelAlgebra, LabelId, LabelSet, LabelSpace, Task, CAUSAL_LABELS, MAX_LABELS,
    NONE_LABEL, VAGUE_LABEL,
};
pub use pair::{Pair, PairKey};
pub use table::{Assignment, ScoreTable};
