//! Move-proposing oracle
//!
//! The search asks an external proposer (normally a language model) for one
//! equation at a time. Everything the core needs from it fits behind the
//! narrow [`Oracle`] trait: a request in, free text plus token counts out.

mod command;
mod enumerate;
mod parse;
pub mod prompts;

pub use command::CommandOracle;
pub use enumerate::EnumeratingOracle;
pub use parse::parse_reply;

use crate::ir::NumberMultiset;
use serde::{Deserialize, Serialize};
use std::ops::AddAssign;
use thiserror::Error;

/// Errors raised while talking to an oracle
#[derive(Error, Debug)]
pub enum OracleError {
    #[error("failed to run oracle: {0}")]
    Io(#[from] std::io::Error),

    #[error("oracle exited with {status}: {stderr}")]
    Failed { status: String, stderr: String },

    #[error("malformed oracle response: {0}")]
    InvalidResponse(#[from] serde_json::Error),
}

/// Result type for oracle operations
pub type OracleResult<T> = Result<T, OracleError>;

/// Token counts for cost accounting
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenUsage {
    pub input: u64,
    pub output: u64,
}

impl TokenUsage {
    pub fn new(input: u64, output: u64) -> Self {
        Self { input, output }
    }

    pub fn total(&self) -> u64 {
        self.input + self.output
    }
}

impl AddAssign for TokenUsage {
    fn add_assign(&mut self, rhs: Self) {
        self.input += rhs.input;
        self.output += rhs.output;
    }
}

/// One query to the oracle
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OracleRequest {
    /// System-level instruction
    pub instruction: String,

    /// Rendered user prompt
    pub prompt: String,

    /// Sampling temperature
    pub temperature: f32,

    /// Numbers the prompt was rendered from
    pub numbers: NumberMultiset,

    /// Left-hand sides already tried at this parent
    pub tried: Vec<String>,

    /// Whether this is the final step (two numbers left, aiming for 24)
    pub terminal: bool,
}

impl OracleRequest {
    /// Request for an intermediate step
    pub fn step(numbers: &NumberMultiset, first: bool, tried: &[String], temperature: f32) -> Self {
        Self {
            instruction: prompts::INSTRUCTION.to_string(),
            prompt: prompts::step_prompt(numbers, first, tried),
            temperature,
            numbers: numbers.clone(),
            tried: tried.to_vec(),
            terminal: false,
        }
    }

    /// Request for the final step
    pub fn terminal(numbers: &NumberMultiset, temperature: f32) -> Self {
        Self {
            instruction: prompts::INSTRUCTION.to_string(),
            prompt: prompts::terminal_prompt(numbers),
            temperature,
            numbers: numbers.clone(),
            tried: Vec::new(),
            terminal: true,
        }
    }
}

/// Free-text answer plus its token cost
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OracleReply {
    pub text: String,
    pub usage: TokenUsage,
}

/// A move proposer
pub trait Oracle {
    /// Short name for logs and reports
    fn name(&self) -> &str;

    /// Answer one request
    fn ask(&mut self, request: &OracleRequest) -> OracleResult<OracleReply>;
}

impl<O: Oracle + ?Sized> Oracle for Box<O> {
    fn name(&self) -> &str {
        (**self).name()
    }

    fn ask(&mut self, request: &OracleRequest) -> OracleResult<OracleReply> {
        (**self).ask(request)
    }
}

/// Oracle backed by a closure
///
/// Token usage is approximated by whitespace-separated word counts.
pub struct FnOracle<F> {
    respond: F,
}

impl<F> FnOracle<F>
where
    F: FnMut(&OracleRequest) -> String,
{
    pub fn new(respond: F) -> Self {
        Self { respond }
    }
}

fn word_count(text: &str) -> u64 {
    text.split_whitespace().count() as u64
}

impl<F> Oracle for FnOracle<F>
where
    F: FnMut(&OracleRequest) -> String,
{
    fn name(&self) -> &str {
        "fn"
    }

    fn ask(&mut self, request: &OracleRequest) -> OracleResult<OracleReply> {
        let text = (self.respond)(request);
        let usage = TokenUsage::new(
            word_count(&request.instruction) + word_count(&request.prompt),
            word_count(&text),
        );
        Ok(OracleReply { text, usage })
    }
}
