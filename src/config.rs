//! Training configuration and hyperparameter grids.
//!
//! [`TrainConfig`] is a plain serde record; every field has a default so a
//! JSON file only needs the values it changes. A [`ParamGrid`] lists
//! candidate values per hyperparameter and expands to concrete
//! [`ParamSetting`]s, which are applied to a config by field assignment.
//!
//! ```rust
//! use eventrel::config::{ParamGrid, TrainConfig};
//!
//! let grid = ParamGrid::new()
//!     .with_learning_rate(vec![0.1, 0.01])
//!     .with_margin(vec![0.1, 0.5]);
//! let settings = grid.expand();
//! assert_eq!(settings.len(), 4);
//!
//! let mut config = TrainConfig::default();
//! config.apply(&settings[3]).unwrap();
//! assert_eq!(config.learning_rate, 0.01);
//! assert_eq!(config.margin, 0.5);
//! ```

use crate::inference::{SolveLimits, SolverBackend};
use crate::{DatasetSchema, Error, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;
use std::time::Duration;

/// Budget handed to the constraint solver.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SolverConfig {
    /// Seconds per solve; `None` for no limit.
    pub time_limit_secs: Option<f64>,
    /// Search nodes per solve; `None` for no limit. Only the
    /// branch-and-bound backend counts nodes.
    pub node_limit: Option<u64>,
    /// Backend used for global inference.
    pub backend: SolverBackend,
}

impl Default for SolverConfig {
    fn default() -> Self {
        Self {
            time_limit_secs: Some(600.0),
            node_limit: None,
            backend: SolverBackend::Milp,
        }
    }
}

impl SolverConfig {
    /// Limits for [`crate::inference::GlobalInference::with_limits`].
    #[must_use]
    pub fn limits(&self) -> SolveLimits {
        SolveLimits {
            time_limit: self.time_limit_secs.map(Duration::from_secs_f64),
            node_limit: self.node_limit,
        }
    }
}

/// Everything the training driver needs besides data and scorer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TrainConfig {
    /// Dataset schema (selects the temporal label space).
    pub schema: DatasetSchema,
    /// Add the causal task and cross-task constraints.
    pub joint: bool,
    /// Number of epochs.
    pub epochs: usize,
    /// Step size of the scorer update.
    pub learning_rate: f64,
    /// Momentum of the scorer update.
    pub momentum: f64,
    /// L2 weight decay of the scorer update.
    pub weight_decay: f64,
    /// Loss margin (accepted, not used by the loss).
    pub margin: f64,
    /// Data includes flipped copies of every pair.
    pub backward_sample: bool,
    /// Pass timex edges to temporal awareness (TBD only).
    pub eval_with_timex: bool,
    /// Instances per scoring call.
    pub batch_size: usize,
    /// Solver budget.
    pub solver: SolverConfig,
}

impl Default for TrainConfig {
    fn default() -> Self {
        Self {
            schema: DatasetSchema::Matres,
            joint: false,
            epochs: 10,
            learning_rate: 0.01,
            momentum: 0.9,
            weight_decay: 0.0,
            margin: 0.1,
            backward_sample: true,
            eval_with_timex: false,
            batch_size: 16,
            solver: SolverConfig::default(),
        }
    }
}

impl TrainConfig {
    /// Load from a JSON file; missing fields take their defaults.
    ///
    /// # Errors
    ///
    /// I/O and JSON errors, or a config that fails [`Self::validate`].
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self> {
        let text = std::fs::read_to_string(path.as_ref())?;
        let config: TrainConfig = serde_json::from_str(&text)?;
        config.validate()?;
        Ok(config)
    }

    /// Check value ranges.
    ///
    /// # Errors
    ///
    /// [`Error::Config`] naming the first out-of-range field.
    pub fn validate(&self) -> Result<()> {
        if self.epochs == 0 {
            return Err(Error::config("epochs must be at least 1"));
        }
        if self.batch_size == 0 {
            return Err(Error::config("batch_size must be at least 1"));
        }
        if !(self.learning_rate.is_finite() && self.learning_rate > 0.0) {
            return Err(Error::config(format!(
                "learning_rate must be positive, got {}",
                self.learning_rate
            )));
        }
        if !(0.0..1.0).contains(&self.momentum) {
            return Err(Error::config(format!(
                "momentum must be in [0, 1), got {}",
                self.momentum
            )));
        }
        if !(self.weight_decay.is_finite() && self.weight_decay >= 0.0) {
            return Err(Error::config(format!(
                "weight_decay must be non-negative, got {}",
                self.weight_decay
            )));
        }
        if !self.margin.is_finite() {
            return Err(Error::config("margin must be finite"));
        }
        if let Some(secs) = self.solver.time_limit_secs {
            if !(secs.is_finite() && secs > 0.0) {
                return Err(Error::config(format!(
                    "solver.time_limit_secs must be positive, got {secs}"
                )));
            }
        }
        if self.solver.node_limit == Some(0) {
            return Err(Error::config("solver.node_limit must be at least 1"));
        }
        Ok(())
    }

    /// Assign every value of a grid setting, then re-validate.
    ///
    /// # Errors
    ///
    /// Whatever [`Self::validate`] rejects in the updated config.
    pub fn apply(&mut self, setting: &ParamSetting) -> Result<()> {
        for value in &setting.values {
            match *value {
                Hyperparameter::LearningRate(v) => self.learning_rate = v,
                Hyperparameter::Momentum(v) => self.momentum = v,
                Hyperparameter::WeightDecay(v) => self.weight_decay = v,
                Hyperparameter::Margin(v) => self.margin = v,
                Hyperparameter::Epochs(v) => self.epochs = v,
                Hyperparameter::BatchSize(v) => self.batch_size = v,
            }
        }
        self.validate()
    }
}

/// One hyperparameter value.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "name", content = "value", rename_all = "snake_case")]
pub enum Hyperparameter {
    /// [`TrainConfig::learning_rate`]
    LearningRate(f64),
    /// [`TrainConfig::momentum`]
    Momentum(f64),
    /// [`TrainConfig::weight_decay`]
    WeightDecay(f64),
    /// [`TrainConfig::margin`]
    Margin(f64),
    /// [`TrainConfig::epochs`]
    Epochs(usize),
    /// [`TrainConfig::batch_size`]
    BatchSize(usize),
}

impl fmt::Display for Hyperparameter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Hyperparameter::LearningRate(v) => write!(f, "learning_rate={v}"),
            Hyperparameter::Momentum(v) => write!(f, "momentum={v}"),
            Hyperparameter::WeightDecay(v) => write!(f, "weight_decay={v}"),
            Hyperparameter::Margin(v) => write!(f, "margin={v}"),
            Hyperparameter::Epochs(v) => write!(f, "epochs={v}"),
            Hyperparameter::BatchSize(v) => write!(f, "batch_size={v}"),
        }
    }
}

/// One point of a [`ParamGrid`].
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ParamSetting {
    /// Values in grid-axis order.
    pub values: Vec<Hyperparameter>,
}

impl fmt::Display for ParamSetting {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, v) in self.values.iter().enumerate() {
            if i > 0 {
                f.write_str(" ")?;
            }
            write!(f, "{v}")?;
        }
        Ok(())
    }
}

/// Candidate values per hyperparameter. An empty axis leaves the field alone.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ParamGrid {
    /// Learning rates.
    pub learning_rate: Vec<f64>,
    /// Momentum values.
    pub momentum: Vec<f64>,
    /// Weight decay values.
    pub weight_decay: Vec<f64>,
    /// Margins.
    pub margin: Vec<f64>,
    /// Epoch counts.
    pub epochs: Vec<usize>,
    /// Batch sizes.
    pub batch_size: Vec<usize>,
}

impl ParamGrid {
    /// Empty grid (expands to one empty setting).
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the learning-rate axis.
    #[must_use]
    pub fn with_learning_rate(mut self, values: Vec<f64>) -> Self {
        self.learning_rate = values;
        self
    }

    /// Set the momentum axis.
    #[must_use]
    pub fn with_momentum(mut self, values: Vec<f64>) -> Self {
        self.momentum = values;
        self
    }

    /// Set the weight-decay axis.
    #[must_use]
    pub fn with_weight_decay(mut self, values: Vec<f64>) -> Self {
        self.weight_decay = values;
        self
    }

    /// Set the margin axis.
    #[must_use]
    pub fn with_margin(mut self, values: Vec<f64>) -> Self {
        self.margin = values;
        self
    }

    /// Set the epochs axis.
    #[must_use]
    pub fn with_epochs(mut self, values: Vec<usize>) -> Self {
        self.epochs = values;
        self
    }

    /// Set the batch-size axis.
    #[must_use]
    pub fn with_batch_size(mut self, values: Vec<usize>) -> Self {
        self.batch_size = values;
        self
    }

    /// Load from a JSON file; missing axes stay empty.
    ///
    /// # Errors
    ///
    /// I/O errors, or JSON that does not match the grid layout.
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self> {
        let text = std::fs::read_to_string(path.as_ref())?;
        Ok(serde_json::from_str(&text)?)
    }

    fn axes(&self) -> Vec<Vec<Hyperparameter>> {
        let axes = vec![
            self.learning_rate.iter().map(|&v| Hyperparameter::LearningRate(v)).collect::<Vec<_>>(),
            self.momentum.iter().map(|&v| Hyperparameter::Momentum(v)).collect(),
            self.weight_decay.iter().map(|&v| Hyperparameter::WeightDecay(v)).collect(),
            self.margin.iter().map(|&v| Hyperparameter::Margin(v)).collect(),
            self.epochs.iter().map(|&v| Hyperparameter::Epochs(v)).collect(),
            self.batch_size.iter().map(|&v| Hyperparameter::BatchSize(v)).collect(),
        ];
        axes.into_iter().filter(|a| !a.is_empty()).collect()
    }

    /// Number of settings [`Self::expand`] returns.
    #[must_use]
    pub fn len(&self) -> usize {
        self.axes().iter().map(Vec::len).product()
    }

    /// Whether the grid has no non-empty axis.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.axes().is_empty()
    }

    /// Cartesian product of the non-empty axes; the last axis varies fastest.
    #[must_use]
    pub fn expand(&self) -> Vec<ParamSetting> {
        let mut out = vec![ParamSetting::default()];
        for axis in self.axes() {
            out = out
                .into_iter()
                .flat_map(|setting| {
                    axis.iter().map(move |&value| {
                        let mut next = setting.clone();
                        next.values.push(value);
                        next
                    })
                })
                .collect();
        }
        out
    }
}
