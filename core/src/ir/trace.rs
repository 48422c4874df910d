//! Derivation traces
//!
//! A trace records the equations applied from the original puzzle down to
//! the current numbers, one `"<expr> = <value>"` entry per accepted step.

use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Errors that can occur while exporting a trace
#[derive(Error, Debug)]
pub enum TraceError {
    #[error("JSON serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),
}

/// Result type for trace operations
pub type TraceResult<T> = Result<T, TraceError>;

/// Append-only log of applied equations
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DerivationTrace {
    steps: Vec<String>,
}

impl DerivationTrace {
    /// Create a new empty trace
    pub fn new() -> Self {
        Self { steps: Vec::new() }
    }

    /// Return a copy of this trace with one more entry
    pub fn extended(&self, entry: impl Into<String>) -> Self {
        let mut steps = Vec::with_capacity(self.steps.len() + 1);
        steps.extend(self.steps.iter().cloned());
        steps.push(entry.into());
        Self { steps }
    }

    /// Entries in application order
    pub fn steps(&self) -> &[String] {
        &self.steps
    }

    /// Number of entries
    pub fn len(&self) -> usize {
        self.steps.len()
    }

    /// Check if no step has been applied
    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    /// Most recent entry
    pub fn last(&self) -> Option<&str> {
        self.steps.last().map(|s| s.as_str())
    }

    /// Serialize to JSON string
    pub fn to_json(&self) -> TraceResult<String> {
        Ok(serde_json::to_string(self)?)
    }

    /// Deserialize from JSON string
    pub fn from_json(json: &str) -> TraceResult<Self> {
        Ok(serde_json::from_str(json)?)
    }
}

impl fmt::Display for DerivationTrace {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.steps.join("; "))
    }
}
