//! Error types for eventrel.

use thiserror::Error;

/// Result type for eventrel operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Error type for eventrel operations.
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum Error {
    /// Two aligned sequences disagree in length or width.
    #[error("Shape mismatch in {context}: expected {expected}, got {actual}")]
    ShapeMismatch {
        /// Where the mismatch was detected.
        context: String,
        /// Expected length or width.
        expected: usize,
        /// Observed length or width.
        actual: usize,
    },

    /// An assignment row does not select exactly one label.
    #[error("Invalid assignment at row {row}: {selected} labels selected")]
    InvalidAssignment {
        /// Offending row.
        row: usize,
        /// Number of indicators set on that row.
        selected: usize,
    },

    /// The solver proved that no assignment satisfies the constraints.
    #[error("Global inference infeasible: {0}")]
    Infeasible(String),

    /// The solver hit its time or node budget before proving optimality.
    #[error("Global inference timed out after {nodes} nodes ({elapsed_ms} ms)")]
    SolverTimeout {
        /// Search nodes explored.
        nodes: u64,
        /// Wall-clock time spent.
        elapsed_ms: u128,
    },

    /// The solver backend failed for a reason other than infeasibility.
    #[error("Solver error: {0}")]
    Solver(String),

    /// Invalid input provided.
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// A label name that the label space does not define.
    #[error("Unknown label '{label}' in {space} label space")]
    UnknownLabel {
        /// The label name.
        label: String,
        /// The label space it was looked up in.
        space: String,
    },

    /// Configuration error.
    #[error("Configuration error: {0}")]
    Config(String),

    /// The external scorer failed.
    #[error("Scorer error: {0}")]
    Scorer(String),

    /// IO error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON (de)serialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl Error {
    /// Create a shape mismatch error.
    #[must_use]
    pub fn shape(context: impl Into<String>, expected: usize, actual: usize) -> Self {
        Self::ShapeMismatch {
            context: context.into(),
            expected,
            actual,
        }
    }

    /// Create an infeasibility error.
    #[must_use]
    pub fn infeasible(msg: impl Into<String>) -> Self {
        Self::Infeasible(msg.into())
    }

    /// Create a solver backend error.
    #[must_use]
    pub fn solver(msg: impl Into<String>) -> Self {
        Self::Solver(msg.into())
    }

    /// Create an invalid input error.
    #[must_use]
    pub fn invalid_input(msg: impl Into<String>) -> Self {
        Self::InvalidInput(msg.into())
    }

    /// Create a configuration error.
    #[must_use]
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Create a scorer error.
    #[must_use]
    pub fn scorer(msg: impl Into<String>) -> Self {
        Self::Scorer(msg.into())
    }

    /// Check a length precondition, returning a [`Error::ShapeMismatch`] on failure.
    pub fn check_len(context: &str, expected: usize, actual: usize) -> Result<()> {
        if expected == actual {
            Ok(())
        } else {
            Err(Self::shape(context, expected, actual))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_check_len() {
        assert!(Error::check_len("rows", 3, 3).is_ok());
        let err = Error::check_len("rows", 3, 2).unwrap_err();
        assert!(matches!(
            err,
            Error::ShapeMismatch {
                expected: 3,
                actual: 2,
                ..
            }
        ));
        assert!(err.to_string().contains("rows"));
    }
}
