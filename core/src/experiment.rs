//! Batch experiments over a puzzle sample
//!
//! Runs the solver on every puzzle in order and aggregates accuracy, token
//! usage and cost.

use crate::ir::Puzzle;
use crate::oracle::{Oracle, TokenUsage};
use crate::search::{BeamSolver, Outcome, Scorer, SearchResult};
use log::info;
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::{self, BufWriter};
use std::path::Path;
use std::time::Instant;

/// Per-token prices in USD per million tokens
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CostModel {
    pub input_per_million: f64,
    pub output_per_million: f64,
}

impl Default for CostModel {
    fn default() -> Self {
        Self {
            input_per_million: 0.15,
            output_per_million: 0.60,
        }
    }
}

impl CostModel {
    /// Price of the given usage in USD
    pub fn total_cost(&self, usage: &TokenUsage) -> f64 {
        (usage.input as f64 * self.input_per_million
            + usage.output as f64 * self.output_per_million)
            / 1_000_000.0
    }
}

/// One puzzle's run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InstanceReport {
    pub puzzle: Puzzle,
    /// 1 oracle, 2 fallback, 0 otherwise
    pub code: u8,
    pub result: SearchResult,
    pub elapsed_ms: u128,
}

/// Aggregated experiment results
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExperimentReport {
    pub total: usize,
    /// Solved by the oracle or the fallback
    pub solved: usize,
    pub solved_by_fallback: usize,
    pub no_candidates: usize,
    pub usage: TokenUsage,
    pub cost: f64,
    pub elapsed_ms: u128,
    pub instances: Vec<InstanceReport>,
}

impl ExperimentReport {
    /// Fraction solved; 0 for an empty run
    pub fn accuracy(&self) -> f64 {
        if self.total == 0 {
            0.0
        } else {
            self.solved as f64 / self.total as f64
        }
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }

    pub fn to_json_file<P: AsRef<Path>>(&self, path: P) -> io::Result<()> {
        let writer = BufWriter::new(File::create(path)?);
        serde_json::to_writer_pretty(writer, self)?;
        Ok(())
    }
}

/// Solve every puzzle in turn
///
/// A failed or aborted instance never stops the run.
pub fn run_experiment<O, S>(
    puzzles: &[Puzzle],
    solver: &BeamSolver,
    oracle: &mut O,
    scorer: &S,
    cost: &CostModel,
) -> ExperimentReport
where
    O: Oracle + ?Sized,
    S: Scorer + ?Sized,
{
    let start = Instant::now();
    let mut usage = TokenUsage::default();
    let mut solved = 0;
    let mut solved_by_fallback = 0;
    let mut no_candidates = 0;
    let mut instances = Vec::with_capacity(puzzles.len());

    for (idx, puzzle) in puzzles.iter().enumerate() {
        let instance_start = Instant::now();
        let result = solver.solve(puzzle, oracle, scorer);
        let elapsed_ms = instance_start.elapsed().as_millis();

        usage += result.usage;
        match result.outcome {
            Outcome::SolvedByOracle => solved += 1,
            Outcome::SolvedByFallback => {
                solved += 1;
                solved_by_fallback += 1;
            }
            Outcome::NoCandidates { .. } => no_candidates += 1,
            Outcome::Failed => {}
        }

        info!(
            "[{}/{}] {} -> {:?} ({} queries, {} ms)",
            idx + 1,
            puzzles.len(),
            puzzle.id,
            result.outcome,
            result.queries,
            elapsed_ms
        );

        instances.push(InstanceReport {
            puzzle: puzzle.clone(),
            code: result.outcome.code(),
            result,
            elapsed_ms,
        });
    }

    let report = ExperimentReport {
        total: puzzles.len(),
        solved,
        solved_by_fallback,
        no_candidates,
        usage,
        cost: cost.total_cost(&usage),
        elapsed_ms: start.elapsed().as_millis(),
        instances,
    };

    info!(
        "Used {} input tokens and {} output tokens (${:.4})",
        report.usage.input, report.usage.output, report.cost
    );
    info!(
        "Finished {} problems in {} ms, accuracy {:.2}, fell back on {}",
        report.total,
        report.elapsed_ms,
        report.accuracy(),
        report.solved_by_fallback
    );

    report
}
