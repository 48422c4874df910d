//! Tree-of-Thoughts solver for the Game of 24
//!
//! Beam search where a language-model oracle proposes one equation per step
//! and a learned value network prunes the candidates

pub mod ir;         // Intermediate representation (numbers, states, traces)
pub mod expr;       // Arithmetic expressions and their parser
pub mod equation;   // Step validation, projection, brute-force fallback
pub mod oracle;     // Move-proposing oracle and its prompts
pub mod search;     // Beam search with a learned scorer
pub mod loader;     // Puzzle datasets
pub mod experiment; // Batch runs and cost accounting
pub mod config;     // YAML configuration

pub use ir::*;
pub use equation::{check, project, validate, Equation, Rejection, ValidEquation};
pub use oracle::{Oracle, OracleError, OracleRequest, TokenUsage};
pub use search::{BeamConfig, BeamSolver, Outcome, Scorer, SearchResult};
pub use loader::{load_puzzles, LoadError, LoadResult};
pub use experiment::{run_experiment, CostModel, ExperimentReport};
pub use config::{Config, ConfigError};
