//! Game of 24 Tree-of-Thoughts CLI
//!
//! `solve` searches a single puzzle, `run` samples a dataset bucket and
//! reports accuracy and cost.

use anyhow::{bail, Context, Result};
use clap::{Args, Parser, Subcommand};
use log::info;
use std::path::PathBuf;
use tot24_core::config::OracleKind;
use tot24_core::loader::{sample, split_buckets};
use tot24_core::{load_puzzles, run_experiment, BeamSolver, Config, Puzzle};

#[derive(Parser)]
#[command(name = "tot24-solve")]
#[command(about = "Solve Game of 24 puzzles with oracle-guided beam search")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Solve one puzzle
    Solve {
        /// The four numbers
        #[arg(num_args = 4, required = true, allow_negative_numbers = true)]
        numbers: Vec<i64>,

        /// Print the full result as JSON
        #[arg(long)]
        json: bool,

        #[command(flatten)]
        common: CommonArgs,
    },

    /// Run an experiment over a dataset bucket
    Run {
        /// Puzzle file (4nums CSV/text or JSON)
        #[arg(long)]
        data: PathBuf,

        /// Write the full report as JSON
        #[arg(long)]
        out: Option<PathBuf>,

        /// Puzzles to sample
        #[arg(long)]
        amount: Option<usize>,

        /// Bucket index, 0 = hardest
        #[arg(long)]
        bucket: Option<usize>,

        #[command(flatten)]
        common: CommonArgs,
    },
}

/// Flags that override the configuration file
#[derive(Args)]
struct CommonArgs {
    /// YAML configuration file
    #[arg(long)]
    config: Option<PathBuf>,

    /// Beam width
    #[arg(long)]
    beam: Option<usize>,

    /// Oracle queries per parent
    #[arg(long)]
    branching: Option<usize>,

    /// Value network weights (safetensors)
    #[arg(long)]
    weights: Option<PathBuf>,

    /// Oracle program; switches to the command oracle
    #[arg(long)]
    oracle_cmd: Option<PathBuf>,

    /// Argument passed to the oracle program (repeatable)
    #[arg(long = "oracle-arg", allow_hyphen_values = true)]
    oracle_args: Vec<String>,

    /// Seed for sampling and the enumerating oracle
    #[arg(long)]
    seed: Option<u64>,
}

impl CommonArgs {
    fn resolve(&self) -> Result<Config> {
        let mut config = match &self.config {
            Some(path) => Config::load(path)
                .with_context(|| format!("Failed to load config {}", path.display()))?,
            None => Config::default(),
        };

        if let Some(beam) = self.beam {
            config.search.beam_width = beam;
        }
        if let Some(branching) = self.branching {
            config.search.branching = branching;
        }
        if let Some(weights) = &self.weights {
            config.scorer.weights = Some(weights.clone());
        }
        if let Some(program) = &self.oracle_cmd {
            config.oracle.kind = OracleKind::Command;
            config.oracle.program = Some(program.clone());
        }
        if !self.oracle_args.is_empty() {
            config.oracle.args = self.oracle_args.clone();
        }
        if let Some(seed) = self.seed {
            config.oracle.seed = seed;
            config.experiment.seed = seed;
        }

        Ok(config)
    }
}

fn solve(numbers: Vec<i64>, json: bool, config: Config) -> Result<()> {
    let mut oracle = config.oracle.build()?;
    let scorer = config.scorer.build().context("Failed to load scorer")?;
    let solver = BeamSolver::new(config.search);

    let puzzle = Puzzle::new(0, numbers);
    let result = solver.solve(&puzzle, oracle.as_mut(), scorer.as_ref());

    if json {
        println!("{}", result.to_json()?);
        return Ok(());
    }

    println!("Puzzle: {}", result.start);
    println!("Outcome: {:?} (code {})", result.outcome, result.outcome.code());
    if let Some(trace) = &result.trace {
        for step in trace.steps() {
            println!("  {}", step);
        }
    }
    println!(
        "Queries: {}, tokens: {} in / {} out",
        result.queries, result.usage.input, result.usage.output
    );
    Ok(())
}

fn run(
    data: PathBuf,
    out: Option<PathBuf>,
    amount: Option<usize>,
    bucket: Option<usize>,
    mut config: Config,
) -> Result<()> {
    if let Some(amount) = amount {
        config.experiment.amount = amount;
    }
    if let Some(bucket) = bucket {
        config.experiment.bucket = bucket;
    }
    let exp = &config.experiment;

    let puzzles = load_puzzles(&data)
        .with_context(|| format!("Failed to load puzzles from {}", data.display()))?;
    let buckets = split_buckets(&puzzles, exp.buckets);
    let Some(pool) = buckets.get(exp.bucket) else {
        bail!("bucket {} out of range ({} buckets)", exp.bucket, buckets.len());
    };
    let chosen = sample(pool, exp.amount, exp.seed);
    info!(
        "Loaded {} puzzles, sampled {} from bucket {}/{}",
        puzzles.len(),
        chosen.len(),
        exp.bucket,
        exp.buckets
    );

    let mut oracle = config.oracle.build()?;
    let scorer = config.scorer.build().context("Failed to load scorer")?;
    let solver = BeamSolver::new(config.search.clone());

    let report = run_experiment(&chosen, &solver, oracle.as_mut(), scorer.as_ref(), &config.cost);

    println!(
        "Solved {}/{} ({:.2}), fell back on {}, no candidates on {}",
        report.solved,
        report.total,
        report.accuracy(),
        report.solved_by_fallback,
        report.no_candidates
    );
    println!(
        "Used {} input tokens and {} output tokens, cost ${:.4}",
        report.usage.input, report.usage.output, report.cost
    );

    if let Some(path) = out {
        report
            .to_json_file(&path)
            .with_context(|| format!("Failed to write report {}", path.display()))?;
        info!("Wrote report to {}", path.display());
    }

    Ok(())
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    match Cli::parse().command {
        Command::Solve {
            numbers,
            json,
            common,
        } => solve(numbers, json, common.resolve()?),
        Command::Run {
            data,
            out,
            amount,
            bucket,
            common,
        } => run(data, out, amount, bucket, common.resolve()?),
    }
}
