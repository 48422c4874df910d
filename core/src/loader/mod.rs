//! Puzzle dataset loader
//!
//! Reads puzzle collections, splits them into difficulty buckets and samples
//! experiment runs. Source files list the hardest puzzles first.

pub mod fournums;

pub use fournums::{load_puzzles, parse_json, parse_text};

use crate::ir::Puzzle;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use thiserror::Error;

/// Problem loader result
pub type LoadResult<T> = Result<T, LoadError>;

/// Problem loading errors
#[derive(Error, Debug)]
pub enum LoadError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: String,
        source: std::io::Error,
    },

    #[error("JSON parse error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("invalid puzzle: {0}")]
    InvalidPuzzle(String),

    #[error("no puzzles found in {0}")]
    Empty(String),
}

/// Split into `n` contiguous buckets, hardest first
///
/// Bucket sizes differ by at most one; earlier buckets take the extra items.
pub fn split_buckets(puzzles: &[Puzzle], n: usize) -> Vec<Vec<Puzzle>> {
    if n == 0 {
        return Vec::new();
    }

    let base = puzzles.len() / n;
    let extra = puzzles.len() % n;
    let mut buckets = Vec::with_capacity(n);
    let mut offset = 0;

    for idx in 0..n {
        let size = base + usize::from(idx < extra);
        buckets.push(puzzles[offset..offset + size].to_vec());
        offset += size;
    }

    buckets
}

/// Sample without replacement, reproducibly
///
/// Asking for more than the pool holds returns the whole pool (shuffled).
pub fn sample(puzzles: &[Puzzle], amount: usize, seed: u64) -> Vec<Puzzle> {
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    puzzles
        .choose_multiple(&mut rng, amount.min(puzzles.len()))
        .cloned()
        .collect()
}
