//! Beam search implementation
//!
//! Propose moves through the oracle, score the resulting states, keep the
//! best `beam_width`, and at the last step check the remaining pair against
//! 24, falling back to brute force when the oracle misses.

use crate::equation::{accept, brute_force};
use crate::ir::{is_target, DerivationTrace, NumberMultiset, Puzzle, ScoredCandidate, SearchState};
use crate::oracle::{Oracle, TokenUsage};
use crate::search::generator::CandidateGenerator;
use crate::search::scoring::Scorer;
use log::{debug, info, warn};
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::{self, BufWriter};
use std::path::Path;

/// Beam search configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BeamConfig {
    /// Beam width (states kept per depth)
    pub beam_width: usize,

    /// Oracle queries per kept parent per depth
    pub branching: usize,

    /// Sampling temperature for intermediate steps
    pub generation_temperature: f32,

    /// Sampling temperature for the final step
    pub terminal_temperature: f32,
}

impl Default for BeamConfig {
    fn default() -> Self {
        Self {
            beam_width: 5,
            branching: 3,
            generation_temperature: 1.2,
            terminal_temperature: 1.0,
        }
    }
}

/// How a search ended
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Outcome {
    /// The oracle proposed a correct final step
    SolvedByOracle,

    /// Brute force over the last two numbers found 24
    SolvedByFallback,

    /// Every leaf was exhausted
    Failed,

    /// A depth produced no valid candidate at all
    NoCandidates { depth: usize },
}

impl Outcome {
    pub fn is_solved(&self) -> bool {
        matches!(self, Outcome::SolvedByOracle | Outcome::SolvedByFallback)
    }

    /// Numeric code for statistics: 1 oracle, 2 fallback, 0 otherwise
    pub fn code(&self) -> u8 {
        match self {
            Outcome::SolvedByOracle => 1,
            Outcome::SolvedByFallback => 2,
            Outcome::Failed | Outcome::NoCandidates { .. } => 0,
        }
    }
}

/// Search result
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchResult {
    /// The numbers the search started from
    pub start: NumberMultiset,

    pub outcome: Outcome,

    /// Full derivation (if solved)
    pub trace: Option<DerivationTrace>,

    /// Tokens spent on oracle queries
    pub usage: TokenUsage,

    /// Oracle queries issued
    pub queries: usize,

    /// Queries the oracle failed to answer
    pub oracle_failures: usize,

    /// Valid candidates produced across all depths
    pub candidates_generated: usize,

    /// Last depth the search reached
    pub depth_reached: usize,

    /// Best score the scorer assigned
    pub best_score: Option<f32>,
}

impl SearchResult {
    pub fn solved(&self) -> bool {
        self.outcome.is_solved()
    }

    /// Serialize to pretty JSON
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }

    /// Write as pretty JSON to a file
    pub fn to_json_file<P: AsRef<Path>>(&self, path: P) -> io::Result<()> {
        let writer = BufWriter::new(File::create(path)?);
        serde_json::to_writer_pretty(writer, self)?;
        Ok(())
    }
}

/// Score candidates in one batch and keep the best `width`
///
/// The sort is stable: equal scores keep generation order. NaN and missing
/// scores rank last.
pub fn select_top<S: Scorer + ?Sized>(
    scorer: &S,
    candidates: Vec<SearchState>,
    width: usize,
) -> Vec<ScoredCandidate> {
    let batch: Vec<&NumberMultiset> = candidates.iter().map(|c| &c.numbers).collect();
    let mut scores = scorer.score_batch(&batch);
    if scores.len() != candidates.len() {
        warn!(
            "Scorer returned {} scores for {} candidates",
            scores.len(),
            candidates.len()
        );
        scores.resize(candidates.len(), f32::NEG_INFINITY);
    }

    let mut scored: Vec<ScoredCandidate> = scores
        .into_iter()
        .zip(candidates)
        .map(|(score, state)| ScoredCandidate {
            score: if score.is_nan() { f32::NEG_INFINITY } else { score },
            state,
        })
        .collect();

    scored.sort_by(|a, b| b.score.total_cmp(&a.score));
    scored.truncate(width);
    scored
}

/// Beam search solver
pub struct BeamSolver {
    config: BeamConfig,
}

impl BeamSolver {
    /// Create a new beam search solver
    pub fn new(config: BeamConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &BeamConfig {
        &self.config
    }

    /// Solve one puzzle
    pub fn solve<O, S>(&self, puzzle: &Puzzle, oracle: &mut O, scorer: &S) -> SearchResult
    where
        O: Oracle + ?Sized,
        S: Scorer + ?Sized,
    {
        info!("Solving puzzle {} {:?}", puzzle.id, puzzle.numbers);
        self.solve_state(puzzle.to_state(), oracle, scorer)
    }

    /// Search from an arbitrary start state
    ///
    /// Never fails: every recoverable condition ends up in the outcome.
    pub fn solve_state<O, S>(&self, root: SearchState, oracle: &mut O, scorer: &S) -> SearchResult
    where
        O: Oracle + ?Sized,
        S: Scorer + ?Sized,
    {
        let width = self.config.beam_width.max(1);
        let branching = self.config.branching;
        let start = root.numbers.clone();

        let mut generator = CandidateGenerator::new(oracle);
        let mut candidates_generated = 0;
        let mut best_score: Option<f32> = None;
        let mut beam = vec![root];
        let mut depth = 0;

        while beam.iter().any(|s| !s.is_terminal()) {
            depth += 1;
            let first = depth == 1;
            // The single root gets the whole depth budget
            let queries = if first { width * branching } else { branching };

            let mut candidates = Vec::new();
            for parent in &beam {
                candidates.extend(generator.expand(
                    parent,
                    queries,
                    first,
                    self.config.generation_temperature,
                ));
            }
            candidates_generated += candidates.len();

            if candidates.is_empty() {
                info!("Depth {} produced no valid candidates", depth);
                return SearchResult {
                    start,
                    outcome: Outcome::NoCandidates { depth },
                    trace: None,
                    usage: generator.usage(),
                    queries: generator.queries(),
                    oracle_failures: generator.failures(),
                    candidates_generated,
                    depth_reached: depth,
                    best_score,
                };
            }

            let kept = select_top(scorer, candidates, width);
            if let Some(top) = kept.first() {
                best_score = Some(best_score.map_or(top.score, |b| b.max(top.score)));
            }
            debug!(
                "Depth {}: kept {:?}",
                depth,
                kept.iter()
                    .map(|c| (c.score, c.state.numbers.to_string()))
                    .collect::<Vec<_>>()
            );

            beam = kept.into_iter().map(|c| c.state).collect();
        }

        depth += 1;
        let mut outcome = Outcome::Failed;
        let mut trace = None;

        for leaf in &beam {
            if let Some(solution) = self.ask_terminal(&mut generator, leaf) {
                info!("Oracle solved it with: {:?}", solution.steps());
                outcome = Outcome::SolvedByOracle;
                trace = Some(solution);
                break;
            }

            if let [a, b] = leaf.numbers.values() {
                if let Some(fallback) = brute_force(*a, *b) {
                    let solution = leaf.trace.extended(fallback.entry());
                    info!("Fallback solved it with: {:?}", solution.steps());
                    outcome = Outcome::SolvedByFallback;
                    trace = Some(solution);
                    break;
                }
            }
        }

        if outcome == Outcome::Failed {
            info!("Search failed after {} leaves", beam.len());
        }

        SearchResult {
            start,
            outcome,
            trace,
            usage: generator.usage(),
            queries: generator.queries(),
            oracle_failures: generator.failures(),
            candidates_generated,
            depth_reached: depth,
            best_score,
        }
    }

    /// Up to `branching` terminal queries at one leaf
    fn ask_terminal<O: Oracle + ?Sized>(
        &self,
        generator: &mut CandidateGenerator<'_, O>,
        leaf: &SearchState,
    ) -> Option<DerivationTrace> {
        for _ in 0..self.config.branching {
            let proposal = generator.propose_terminal(&leaf.numbers, self.config.terminal_temperature);
            let Some(equation) = proposal.equation else {
                continue;
            };
            let Some(valid) = accept(&leaf.numbers, &equation.before, &equation.after) else {
                continue;
            };
            if is_target(valid.value) {
                return Some(leaf.trace.extended(valid.entry()));
            }
            debug!("Terminal proposal '{}' does not reach 24", valid.entry());
        }
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::oracle::{FnOracle, OracleRequest};
    use crate::search::scoring::HeuristicScorer;

    fn flat(_: &NumberMultiset) -> f32 {
        0.0
    }

    fn refuse(_: &OracleRequest) -> String {
        "No".to_string()
    }

    #[test]
    fn test_solver_creation() {
        let solver = BeamSolver::new(BeamConfig::default());
        assert_eq!(solver.config().beam_width, 5);
        assert_eq!(solver.config().branching, 3);
    }

    #[test]
    fn test_oracle_solves_four_fours() {
        let mut oracle = FnOracle::new(|req: &OracleRequest| {
            let answer = if req.terminal {
                "20+4=24"
            } else if req.numbers.contains(16.0) {
                "16+4=20"
            } else {
                "4*4=16"
            };
            answer.to_string()
        });

        let solver = BeamSolver::new(BeamConfig::default());
        let result = solver.solve(&Puzzle::new(0, vec![4, 4, 4, 4]), &mut oracle, &flat);

        assert_eq!(result.outcome, Outcome::SolvedByOracle);
        assert_eq!(result.outcome.code(), 1);
        assert_eq!(
            result.trace.unwrap().steps(),
            &["4 * 4 = 16", "16 + 4 = 20", "20 + 4 = 24"]
        );
        // 15 at the root, 3 for each of 5 kept parents, 1 terminal
        assert_eq!(result.queries, 31);
        assert_eq!(result.candidates_generated, 30);
        assert_eq!(result.depth_reached, 3);
    }

    #[test]
    fn test_fallback_solves_last_pair() {
        let mut oracle = FnOracle::new(|req: &OracleRequest| {
            let answer = if req.terminal {
                "No"
            } else if req.numbers.len() == 4 {
                "1 * 1 = 1"
            } else {
                "3 * 1 = 3"
            };
            answer.to_string()
        });

        let solver = BeamSolver::new(BeamConfig::default());
        let result = solver.solve(&Puzzle::new(0, vec![1, 1, 3, 8]), &mut oracle, &flat);

        assert_eq!(result.outcome, Outcome::SolvedByFallback);
        assert_eq!(result.outcome.code(), 2);
        assert_eq!(
            result.trace.unwrap().steps(),
            &["1 * 1 = 1", "3 * 1 = 3", "8 * 3 = 24"]
        );
    }

    #[test]
    fn test_fallback_on_three_eight_leaf() {
        let mut oracle = FnOracle::new(refuse);
        let root = SearchState::root(NumberMultiset::from_ints(&[3, 8]));

        let solver = BeamSolver::new(BeamConfig::default());
        let result = solver.solve_state(root, &mut oracle, &flat);

        assert_eq!(result.outcome, Outcome::SolvedByFallback);
        assert_eq!(result.trace.unwrap().steps(), &["3 * 8 = 24"]);
        assert_eq!(result.queries, 3);
    }

    #[test]
    fn test_unsolvable_leaf_fails() {
        let mut oracle = FnOracle::new(refuse);
        let root = SearchState::root(NumberMultiset::from_ints(&[5, 7]));

        let solver = BeamSolver::new(BeamConfig::default());
        let result = solver.solve_state(root, &mut oracle, &flat);

        assert_eq!(result.outcome, Outcome::Failed);
        assert_eq!(result.outcome.code(), 0);
        assert!(result.trace.is_none());
        assert_eq!(result.queries, 3);
    }

    #[test]
    fn test_wrong_terminal_claim_is_not_accepted() {
        // Arithmetic is right but the value is not 24
        let mut oracle = FnOracle::new(|_: &OracleRequest| "5 + 7 = 12".to_string());
        let root = SearchState::root(NumberMultiset::from_ints(&[5, 7]));

        let result = BeamSolver::new(BeamConfig::default()).solve_state(root, &mut oracle, &flat);
        assert_eq!(result.outcome, Outcome::Failed);
    }

    #[test]
    fn test_false_terminal_claim_is_not_accepted() {
        // Claims 24 but the arithmetic is wrong
        let mut oracle = FnOracle::new(|_: &OracleRequest| "5 * 7 = 24".to_string());
        let root = SearchState::root(NumberMultiset::from_ints(&[5, 7]));

        let result = BeamSolver::new(BeamConfig::default()).solve_state(root, &mut oracle, &flat);
        assert_eq!(result.outcome, Outcome::Failed);
    }

    #[test]
    fn test_miscounted_four_fours_is_not_solved() {
        // 12 + 4 is 16, and no single operation takes [4, 12] to 24
        let mut oracle = FnOracle::new(|req: &OracleRequest| {
            let answer = if req.terminal {
                "12 + 4 = 24"
            } else if req.numbers.contains(8.0) {
                "8 + 4 = 12"
            } else {
                "4 + 4 = 8"
            };
            answer.to_string()
        });

        let result = BeamSolver::new(BeamConfig::default()).solve(
            &Puzzle::new(0, vec![4, 4, 4, 4]),
            &mut oracle,
            &flat,
        );

        assert_eq!(result.outcome, Outcome::Failed);
        assert!(result.trace.is_none());
        // Every kept leaf used its full terminal budget
        assert_eq!(result.queries, 15 + 15 + 15);
    }

    #[test]
    fn test_no_candidates_at_depth_one() {
        let mut oracle = FnOracle::new(|_: &OracleRequest| "I cannot help with that.".to_string());

        let config = BeamConfig {
            beam_width: 2,
            branching: 3,
            ..BeamConfig::default()
        };
        let result = BeamSolver::new(config).solve(&Puzzle::new(0, vec![1, 2, 3, 4]), &mut oracle, &flat);

        assert_eq!(result.outcome, Outcome::NoCandidates { depth: 1 });
        assert!(!result.solved());
        assert_eq!(result.queries, 6);
        assert!(result.usage.input > 0);
        assert!(result.usage.output > 0);
        assert_eq!(result.candidates_generated, 0);
    }

    #[test]
    fn test_no_candidates_at_depth_two() {
        let mut oracle = FnOracle::new(|req: &OracleRequest| {
            if req.numbers.len() == 4 {
                "1 + 2 = 3".to_string()
            } else {
                "99 + 1 = 100".to_string()
            }
        });

        let result = BeamSolver::new(BeamConfig::default()).solve(
            &Puzzle::new(0, vec![1, 2, 3, 4]),
            &mut oracle,
            &flat,
        );

        assert_eq!(result.outcome, Outcome::NoCandidates { depth: 2 });
        assert_eq!(result.candidates_generated, 15);
    }

    #[test]
    fn test_select_top_is_stable() {
        let states: Vec<SearchState> = (1..=6)
            .map(|n| SearchState::root(NumberMultiset::from_ints(&[n, n])))
            .collect();

        let first = select_top(&flat, states.clone(), 3);
        let second = select_top(&flat, states.clone(), 3);

        assert_eq!(first, second);
        let kept: Vec<f64> = first.iter().map(|c| c.state.numbers.values()[0]).collect();
        assert_eq!(kept, vec![1.0, 2.0, 3.0]);
    }

    #[test]
    fn test_select_top_orders_by_descending_score() {
        let states: Vec<SearchState> = [3, 9, 1, 9, 5]
            .iter()
            .map(|&n| SearchState::root(NumberMultiset::from_ints(&[n])))
            .collect();
        let by_value = |s: &NumberMultiset| s.values()[0] as f32;

        let kept = select_top(&by_value, states, 3);
        let scores: Vec<f32> = kept.iter().map(|c| c.score).collect();
        assert_eq!(scores, vec![9.0, 9.0, 5.0]);
    }

    #[test]
    fn test_select_top_ranks_nan_last() {
        let candidates: Vec<SearchState> = [1, 2, 3]
            .iter()
            .map(|&n| SearchState::root(NumberMultiset::from_ints(&[n])))
            .collect();
        let nan_for_one = |s: &NumberMultiset| if s.contains(1.0) { f32::NAN } else { 0.5 };

        let kept = select_top(&nan_for_one, candidates, 2);
        let firsts: Vec<f64> = kept.iter().map(|c| c.state.numbers.values()[0]).collect();
        assert_eq!(firsts, vec![2.0, 3.0]);
        assert!(kept.iter().all(|c| c.score == 0.5));
    }

    struct ShortScorer;

    impl Scorer for ShortScorer {
        fn score_batch(&self, states: &[&NumberMultiset]) -> Vec<f32> {
            // One score short, highest last
            (1..states.len()).map(|i| i as f32).collect()
        }
    }

    #[test]
    fn test_select_top_keeps_unscored_candidates() {
        let candidates: Vec<SearchState> = [1, 2, 3]
            .iter()
            .map(|&n| SearchState::root(NumberMultiset::from_ints(&[n])))
            .collect();

        let kept = select_top(&ShortScorer, candidates, 3);
        assert_eq!(kept.len(), 3);
        assert_eq!(kept[0].score, 2.0);
        assert_eq!(kept[2].score, f32::NEG_INFINITY);
        assert_eq!(kept[2].state.numbers.values(), &[3.0]);
    }

    #[test]
    fn test_scorer_steers_the_beam() {
        // Root offers two moves; only the solvable [4, 6] survives a beam of one
        let mut oracle = FnOracle::new(|req: &OracleRequest| {
            if req.terminal {
                return "No".to_string();
            }
            if req.tried.is_empty() {
                "5 - 1 = 4".to_string()
            } else {
                "5 + 1 = 6".to_string()
            }
        });
        let config = BeamConfig {
            beam_width: 1,
            branching: 2,
            ..BeamConfig::default()
        };
        let root = SearchState::root(NumberMultiset::from_ints(&[5, 1, 4]));

        let result = BeamSolver::new(config).solve_state(root, &mut oracle, &HeuristicScorer);

        assert_eq!(result.outcome, Outcome::SolvedByFallback);
        assert_eq!(
            result.trace.unwrap().steps(),
            &["5 + 1 = 6", "4 * 6 = 24"]
        );
        assert_eq!(result.best_score, Some(1.0));
    }

    #[test]
    fn test_result_json_export() {
        let mut oracle = FnOracle::new(refuse);
        let root = SearchState::root(NumberMultiset::from_ints(&[3, 8]));
        let result = BeamSolver::new(BeamConfig::default()).solve_state(root, &mut oracle, &flat);

        let json: serde_json::Value = serde_json::from_str(&result.to_json().unwrap()).unwrap();
        assert_eq!(json["outcome"]["kind"], "solved_by_fallback");
        assert_eq!(json["trace"][0], "3 * 8 = 24");
        assert_eq!(json["start"], serde_json::json!([3.0, 8.0]));
    }
}
