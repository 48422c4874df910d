//! Search state representation
//!
//! A search state pairs the numbers still available with the trace that
//! produced them. States are never mutated once created; children are new
//! values built from a parent plus one validated equation.

use super::numbers::NumberMultiset;
use super::trace::DerivationTrace;
use serde::{Deserialize, Serialize};

/// A puzzle instance: the original four numbers
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Puzzle {
    /// Puzzle identifier
    pub id: String,

    /// Position in the source dataset (lower = harder)
    pub rank: usize,

    /// The original numbers
    pub numbers: Vec<i64>,
}

impl Puzzle {
    /// Create a puzzle with a generated identifier
    pub fn new(rank: usize, numbers: Vec<i64>) -> Self {
        let id = numbers
            .iter()
            .map(|n| n.to_string())
            .collect::<Vec<_>>()
            .join("-");
        Self { id, rank, numbers }
    }

    /// Numbers as a multiset
    pub fn multiset(&self) -> NumberMultiset {
        NumberMultiset::from_ints(&self.numbers)
    }

    /// Numbers sorted ascending, used to detect duplicate puzzles
    pub fn canonical(&self) -> Vec<i64> {
        let mut sorted = self.numbers.clone();
        sorted.sort_unstable();
        sorted
    }

    /// Convert puzzle to the root search state
    pub fn to_state(&self) -> SearchState {
        SearchState::root(self.multiset())
    }
}

/// Remaining numbers plus the trace that led to them
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchState {
    /// Numbers still available to combine
    pub numbers: NumberMultiset,

    /// Equations applied so far
    pub trace: DerivationTrace,
}

impl SearchState {
    /// Create a state with an empty trace
    pub fn root(numbers: NumberMultiset) -> Self {
        Self {
            numbers,
            trace: DerivationTrace::new(),
        }
    }

    /// Create a child state from new numbers and one more trace entry
    pub fn child(&self, numbers: NumberMultiset, entry: impl Into<String>) -> Self {
        Self {
            numbers,
            trace: self.trace.extended(entry),
        }
    }

    /// Number of steps applied so far
    pub fn depth(&self) -> usize {
        self.trace.len()
    }

    /// Check whether only the final two numbers remain
    pub fn is_terminal(&self) -> bool {
        self.numbers.len() <= 2
    }
}

/// A state with the score the evaluator assigned it
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoredCandidate {
    pub score: f32,
    pub state: SearchState,
}
