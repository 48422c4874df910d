//! Intermediate Representation (IR) module
//!
//! Core data structures shared by the validator, the scorer and the search:
//! - **numbers**: the multiset of values still available, and the shared epsilon
//! - **trace**: append-only log of applied equations
//! - **state**: puzzles, search states and scored candidates
//!
//! # Example
//!
//! ```rust
//! use tot24_core::ir::*;
//!
//! let puzzle = Puzzle::new(0, vec![4, 4, 4, 4]);
//! let root = puzzle.to_state();
//! let child = root.child(NumberMultiset::from_ints(&[4, 4, 8]), "4 + 4 = 8");
//!
//! assert_eq!(child.numbers.to_string(), "[4, 4, 8]");
//! assert_eq!(child.trace.steps(), &["4 + 4 = 8".to_string()]);
//! ```

mod numbers;
mod state;
mod trace;

pub use numbers::{approx_eq, format_number, is_target, NumberMultiset, EPSILON, TARGET};
pub use state::{Puzzle, ScoredCandidate, SearchState};
pub use trace::{DerivationTrace, TraceError, TraceResult};
