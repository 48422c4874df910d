//! Numbers still available to combine
//!
//! Values are `f64` so that division results can flow into later steps.
//! Every comparison goes through [`approx_eq`] with the shared [`EPSILON`].

use serde::{Deserialize, Serialize};
use std::fmt;

/// Tolerance used for every numeric comparison, including the final check against 24
pub const EPSILON: f64 = 1e-6;

/// The value every derivation is trying to reach
pub const TARGET: f64 = 24.0;

/// Compare two values within [`EPSILON`]
pub fn approx_eq(a: f64, b: f64) -> bool {
    (a - b).abs() < EPSILON
}

/// Check whether a value hits the target
pub fn is_target(value: f64) -> bool {
    approx_eq(value, TARGET)
}

/// Render a number the way prompts and traces show it
///
/// Integral values print without a fractional part (`8`, not `8.0`);
/// anything else prints with at most six decimals, trailing zeros trimmed.
pub fn format_number(value: f64) -> String {
    let rounded = value.round();
    if approx_eq(value, rounded) {
        // -0 renders as 0
        return format!("{}", rounded as i64);
    }

    let fixed = format!("{:.6}", value);
    fixed.trim_end_matches('0').trim_end_matches('.').to_string()
}

/// Ordered multiset of the numbers still in play
///
/// Order carries no meaning; [`NumberMultiset::sorted`] gives the
/// deterministic ordering the scorer needs.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NumberMultiset {
    values: Vec<f64>,
}

impl NumberMultiset {
    /// Create a multiset from values
    pub fn new(values: Vec<f64>) -> Self {
        Self { values }
    }

    /// Create a multiset from integer values
    pub fn from_ints(values: &[i64]) -> Self {
        Self {
            values: values.iter().map(|&v| v as f64).collect(),
        }
    }

    /// Number of values still available
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Check if no values remain
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Values in insertion order
    pub fn values(&self) -> &[f64] {
        &self.values
    }

    /// Values in ascending order
    pub fn sorted(&self) -> Vec<f64> {
        let mut sorted = self.values.clone();
        sorted.sort_by(|a, b| a.total_cmp(b));
        sorted
    }

    /// Count how many instances of `value` are present
    pub fn count(&self, value: f64) -> usize {
        self.values.iter().filter(|&&v| approx_eq(v, value)).count()
    }

    /// Check whether at least one instance of `value` is present
    pub fn contains(&self, value: f64) -> bool {
        self.values.iter().any(|&v| approx_eq(v, value))
    }

    /// Remove the first instance of `value`
    ///
    /// Returns false (and leaves the multiset untouched) if none is present.
    pub fn remove_first(&mut self, value: f64) -> bool {
        match self.values.iter().position(|&v| approx_eq(v, value)) {
            Some(idx) => {
                self.values.remove(idx);
                true
            }
            None => false,
        }
    }

    /// Append a value
    pub fn push(&mut self, value: f64) {
        self.values.push(value);
    }

    /// Multiset equality, ignoring order
    pub fn same_multiset(&self, other: &NumberMultiset) -> bool {
        if self.len() != other.len() {
            return false;
        }
        self.sorted()
            .iter()
            .zip(other.sorted().iter())
            .all(|(&a, &b)| approx_eq(a, b))
    }
}

impl From<Vec<f64>> for NumberMultiset {
    fn from(values: Vec<f64>) -> Self {
        Self::new(values)
    }
}

impl fmt::Display for NumberMultiset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[")?;
        for (i, value) in self.values.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{}", format_number(*value))?;
        }
        write!(f, "]")
    }
}
