//! Run configuration
//!
//! One YAML file drives both single solves and experiments. Every field has
//! a default, so an empty file (or no file) is a valid configuration.

use crate::experiment::CostModel;
use crate::oracle::{CommandOracle, EnumeratingOracle, Oracle};
use crate::search::{load_scorer, BeamConfig, Scorer, ScorerError};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Configuration loading errors
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),
    #[error("Failed to parse YAML: {0}")]
    Yaml(#[from] serde_yaml::Error),
    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

/// Root configuration
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct Config {
    /// Beam search parameters
    pub search: BeamConfig,
    /// Which oracle answers the queries
    pub oracle: OracleConfig,
    pub scorer: ScorerConfig,
    pub experiment: ExperimentConfig,
    /// Token prices for cost reporting
    pub cost: CostModel,
}

impl Config {
    /// Load configuration from a YAML file
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        Self::from_yaml(&contents)
    }

    /// Load configuration from a YAML string
    pub fn from_yaml(yaml: &str) -> Result<Self, ConfigError> {
        // serde_yaml rejects an empty document for a struct
        if yaml.trim().is_empty() {
            return Ok(Self::default());
        }
        let config: Config = serde_yaml::from_str(yaml)?;
        Ok(config)
    }
}

/// Oracle backend
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum OracleKind {
    /// External program speaking JSON over stdin/stdout
    Command,
    /// Offline enumeration of legal moves
    #[default]
    Enumerate,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct OracleConfig {
    pub kind: OracleKind,
    /// Program to spawn for the `command` backend
    pub program: Option<PathBuf>,
    pub args: Vec<String>,
    /// Seed for the `enumerate` backend
    pub seed: u64,
}

impl OracleConfig {
    /// Instantiate the configured oracle
    pub fn build(&self) -> Result<Box<dyn Oracle>, ConfigError> {
        match self.kind {
            OracleKind::Command => {
                let program = self.program.as_ref().ok_or_else(|| {
                    ConfigError::Invalid("oracle.kind is 'command' but oracle.program is unset".into())
                })?;
                Ok(Box::new(CommandOracle::new(program.clone(), self.args.clone())))
            }
            OracleKind::Enumerate => Ok(Box::new(EnumeratingOracle::new(self.seed))),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct ScorerConfig {
    /// safetensors weights for the learned scorer; heuristic when unset
    pub weights: Option<PathBuf>,
}

impl ScorerConfig {
    pub fn build(&self) -> Result<Box<dyn Scorer>, ScorerError> {
        load_scorer(self.weights.as_deref())
    }
}

/// Dataset sampling for `run`
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct ExperimentConfig {
    /// Puzzles to sample from the chosen bucket
    pub amount: usize,
    /// Number of difficulty buckets
    pub buckets: usize,
    /// Bucket index, 0 = hardest
    pub bucket: usize,
    pub seed: u64,
}

impl Default for ExperimentConfig {
    fn default() -> Self {
        Self {
            amount: 10,
            buckets: 5,
            bucket: 1,
            seed: 0,
        }
    }
}
