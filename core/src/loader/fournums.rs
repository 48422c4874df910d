//! Game of 24 dataset formats
//!
//! Loads the 4nums.com ranking export (CSV, one puzzle per line) and JSON
//! puzzle lists.

use super::{LoadError, LoadResult};
use crate::ir::Puzzle;
use log::{debug, warn};
use rustc_hash::FxHashSet;
use serde::Deserialize;
use std::fs;
use std::path::Path;

const PUZZLE_SIZE: usize = 4;

/// One JSON entry: a bare list of numbers or an object with an id
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum JsonPuzzle {
    Bare(Vec<i64>),
    Full {
        #[serde(default)]
        id: Option<String>,
        numbers: Vec<i64>,
    },
}

/// Drop exact duplicates (same numbers in any order), keeping the first
fn dedupe(puzzles: Vec<Puzzle>) -> Vec<Puzzle> {
    let mut seen: FxHashSet<Vec<i64>> = FxHashSet::default();
    let mut out = Vec::with_capacity(puzzles.len());

    for puzzle in puzzles {
        if seen.insert(puzzle.canonical()) {
            out.push(puzzle);
        } else {
            debug!("Skipping duplicate puzzle {:?}", puzzle.numbers);
        }
    }

    // Ranks follow the kept order
    for (rank, puzzle) in out.iter_mut().enumerate() {
        puzzle.rank = rank;
    }
    out
}

fn four_ints(text: &str) -> Option<Vec<i64>> {
    let numbers: Vec<i64> = text
        .split_whitespace()
        .map(|tok| tok.trim_matches('"').parse().ok())
        .collect::<Option<_>>()?;
    (numbers.len() == PUZZLE_SIZE).then_some(numbers)
}

/// Parse a JSON puzzle list
pub fn parse_json(contents: &str) -> LoadResult<Vec<Puzzle>> {
    let entries: Vec<JsonPuzzle> = serde_json::from_str(contents)?;
    let mut puzzles = Vec::with_capacity(entries.len());

    for (rank, entry) in entries.into_iter().enumerate() {
        let (id, numbers) = match entry {
            JsonPuzzle::Bare(numbers) => (None, numbers),
            JsonPuzzle::Full { id, numbers } => (id, numbers),
        };

        if numbers.len() != PUZZLE_SIZE {
            return Err(LoadError::InvalidPuzzle(format!(
                "entry {} has {} numbers, expected {}",
                rank,
                numbers.len(),
                PUZZLE_SIZE
            )));
        }

        let mut puzzle = Puzzle::new(rank, numbers);
        if let Some(id) = id {
            puzzle.id = id;
        }
        puzzles.push(puzzle);
    }

    Ok(dedupe(puzzles))
}

/// Parse the CSV/text export
///
/// Each line contributes the first comma-separated field holding exactly
/// four whitespace-separated integers. Lines without one are skipped.
pub fn parse_text(contents: &str) -> Vec<Puzzle> {
    let mut puzzles = Vec::new();

    for (line_no, line) in contents.lines().enumerate() {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }

        let numbers = line
            .split(',')
            .find_map(four_ints)
            .or_else(|| four_ints(&line.replace(',', " ")));

        match numbers {
            Some(numbers) => puzzles.push(Puzzle::new(puzzles.len(), numbers)),
            None if line_no == 0 => debug!("Skipping header line: {}", line),
            None => warn!("Skipping line {}: no puzzle in '{}'", line_no + 1, line),
        }
    }

    dedupe(puzzles)
}

/// Load puzzles from a file
///
/// `.json` files are parsed as puzzle lists, anything else as the text export.
pub fn load_puzzles<P: AsRef<Path>>(path: P) -> LoadResult<Vec<Puzzle>> {
    let path = path.as_ref();

    let contents = fs::read_to_string(path).map_err(|source| LoadError::Io {
        path: path.display().to_string(),
        source,
    })?;

    let puzzles = if path.extension().and_then(|s| s.to_str()) == Some("json") {
        parse_json(&contents)?
    } else {
        parse_text(&contents)
    };

    if puzzles.is_empty() {
        return Err(LoadError::Empty(path.display().to_string()));
    }

    Ok(puzzles)
}
