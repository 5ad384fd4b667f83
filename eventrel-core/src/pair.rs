//! Event pairs and their canonical identity.

use serde::{Deserialize, Serialize};
use std::fmt;

/// An ordered pair of events in one document.
///
/// `reversed` records that the scorer saw the pair in flipped orientation;
/// the event order stored here is the orientation the scores refer to.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Pair {
    /// Document the events belong to.
    pub doc_id: String,
    /// Left (source) event id, local to the document.
    pub left: String,
    /// Right (target) event id, local to the document.
    pub right: String,
    /// Whether the scores were produced in flipped direction.
    #[serde(default)]
    pub reversed: bool,
}

impl Pair {
    /// Create a forward pair.
    #[must_use]
    pub fn new(doc_id: impl Into<String>, left: impl Into<String>, right: impl Into<String>) -> Self {
        Self {
            doc_id: doc_id.into(),
            left: left.into(),
            right: right.into(),
            reversed: false,
        }
    }

    /// Mark the pair as scored in flipped direction.
    #[must_use]
    pub fn with_reversed(mut self, reversed: bool) -> Self {
        self.reversed = reversed;
        self
    }

    /// The same relationship seen from the other event, with the flag toggled.
    #[must_use]
    pub fn flipped(&self) -> Self {
        Self {
            doc_id: self.doc_id.clone(),
            left: self.right.clone(),
            right: self.left.clone(),
            reversed: !self.reversed,
        }
    }

    /// Orientation-free identity of the underlying relationship.
    #[must_use]
    pub fn key(&self) -> PairKey {
        PairKey::new(&self.doc_id, &self.left, &self.right)
    }

    /// Whether this pair runs from `key.first` to `key.second`.
    #[must_use]
    pub fn is_canonical(&self) -> bool {
        self.left <= self.right
    }
}

impl fmt::Display for Pair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}->{}", self.doc_id, self.left, self.right)?;
        if self.reversed {
            f.write_str(" (rev)")?;
        }
        Ok(())
    }
}

/// Document-scoped, unordered identity of a pair.
///
/// `first <= second` always holds, so `(a, b)` and `(b, a)` share a key.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct PairKey {
    /// Document id.
    pub doc_id: String,
    /// Smaller event id.
    pub first: String,
    /// Larger event id.
    pub second: String,
}

impl PairKey {
    /// Build the key of the relationship between `a` and `b`.
    #[must_use]
    pub fn new(doc_id: &str, a: &str, b: &str) -> Self {
        let (first, second) = if a <= b { (a, b) } else { (b, a) };
        Self {
            doc_id: doc_id.to_string(),
            first: first.to_string(),
            second: second.to_string(),
        }
    }
}
