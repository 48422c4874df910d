//! Candidate generation through the oracle
//!
//! Wraps an oracle, turns its free-text answers into equations, and keeps
//! the query and token counters for the whole search.

use crate::equation::{accept, apply, Equation};
use crate::ir::{NumberMultiset, SearchState};
use crate::oracle::{parse_reply, Oracle, OracleRequest, TokenUsage};
use log::{debug, warn};

/// Outcome of one oracle query
#[derive(Debug, Clone, PartialEq)]
pub struct Proposal {
    /// `None` when the answer held no parsable equation
    pub equation: Option<Equation>,
    pub usage: TokenUsage,
}

/// Issues proposal queries and filters them through the validator
pub struct CandidateGenerator<'o, O: Oracle + ?Sized> {
    oracle: &'o mut O,
    usage: TokenUsage,
    queries: usize,
    failures: usize,
}

impl<'o, O: Oracle + ?Sized> CandidateGenerator<'o, O> {
    pub fn new(oracle: &'o mut O) -> Self {
        Self {
            oracle,
            usage: TokenUsage::default(),
            queries: 0,
            failures: 0,
        }
    }

    /// Send one request and parse the answer
    ///
    /// Oracle failures are logged and reported as an empty proposal.
    pub fn propose(&mut self, request: &OracleRequest) -> Proposal {
        self.queries += 1;

        match self.oracle.ask(request) {
            Ok(reply) => {
                self.usage += reply.usage;
                let equation = parse_reply(&reply.text);
                if equation.is_none() {
                    debug!("No equation in reply to '{}': {:?}", request.prompt, reply.text);
                }
                Proposal {
                    equation,
                    usage: reply.usage,
                }
            }
            Err(e) => {
                self.failures += 1;
                warn!("Oracle '{}' failed: {}", self.oracle.name(), e);
                Proposal {
                    equation: None,
                    usage: TokenUsage::default(),
                }
            }
        }
    }

    /// Ask for an intermediate step over `numbers`
    pub fn propose_step(
        &mut self,
        numbers: &NumberMultiset,
        first: bool,
        forbidden: &[String],
        temperature: f32,
    ) -> Proposal {
        self.propose(&OracleRequest::step(numbers, first, forbidden, temperature))
    }

    /// Ask whether 24 is reachable from the last two numbers
    pub fn propose_terminal(&mut self, numbers: &NumberMultiset, temperature: f32) -> Proposal {
        self.propose(&OracleRequest::terminal(numbers, temperature))
    }

    /// Query `queries` times at one parent and keep the valid children
    ///
    /// Each query lists the left-hand sides already accepted at this parent.
    pub fn expand(
        &mut self,
        parent: &SearchState,
        queries: usize,
        first: bool,
        temperature: f32,
    ) -> Vec<SearchState> {
        let mut tried: Vec<String> = Vec::new();
        let mut children = Vec::new();

        for _ in 0..queries {
            let proposal = self.propose_step(&parent.numbers, first, &tried, temperature);
            let Some(equation) = proposal.equation else {
                continue;
            };
            let Some(valid) = accept(&parent.numbers, &equation.before, &equation.after) else {
                continue;
            };

            let numbers = apply(&parent.numbers, &valid);
            children.push(parent.child(numbers, valid.entry()));
            tried.push(valid.lhs());
        }

        children
    }

    /// Total token usage so far
    pub fn usage(&self) -> TokenUsage {
        self.usage
    }

    /// Number of oracle queries issued so far
    pub fn queries(&self) -> usize {
        self.queries
    }

    /// Number of queries the oracle failed to answer
    pub fn failures(&self) -> usize {
        self.failures
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::oracle::{FnOracle, OracleError, OracleReply, OracleResult};

    struct BrokenOracle;

    impl Oracle for BrokenOracle {
        fn name(&self) -> &str {
            "broken"
        }

        fn ask(&mut self, _request: &OracleRequest) -> OracleResult<OracleReply> {
            Err(OracleError::Failed {
                status: "exit status: 1".to_string(),
                stderr: "unavailable".to_string(),
            })
        }
    }

    #[test]
    fn test_propose_parses_equation() {
        let mut oracle = FnOracle::new(|_: &OracleRequest| "Thinking...\n4 + 4 = 8".to_string());
        let mut generator = CandidateGenerator::new(&mut oracle);
        let numbers = NumberMultiset::from_ints(&[4, 4, 4, 4]);

        let proposal = generator.propose_step(&numbers, true, &[], 1.2);
        assert_eq!(proposal.equation, Some(Equation::new("4 + 4", "8")));
        assert_eq!(generator.queries(), 1);
        assert_eq!(generator.usage(), proposal.usage);
    }

    #[test]
    fn test_propose_unparsable_is_none() {
        let mut oracle = FnOracle::new(|_: &OracleRequest| "I am not sure.".to_string());
        let mut generator = CandidateGenerator::new(&mut oracle);
        let numbers = NumberMultiset::from_ints(&[5, 7]);

        let proposal = generator.propose_terminal(&numbers, 1.0);
        assert_eq!(proposal.equation, None);
        assert!(proposal.usage.output > 0);
    }

    #[test]
    fn test_oracle_failure_is_recoverable() {
        let mut oracle = BrokenOracle;
        let mut generator = CandidateGenerator::new(&mut oracle);
        let numbers = NumberMultiset::from_ints(&[1, 2, 3, 4]);

        let proposal = generator.propose_step(&numbers, true, &[], 1.2);
        assert_eq!(proposal.equation, None);
        assert_eq!(generator.queries(), 1);
        assert_eq!(generator.failures(), 1);
    }

    #[test]
    fn test_expand_keeps_valid_children_and_tracks_tried() {
        let mut seen_prompts = Vec::new();
        let mut answers = vec!["1 + 2 = 3", "1 + 1 + 1 = 3", "3 * 4 = 12", "9 + 9 = 18"].into_iter();
        let mut oracle = FnOracle::new(|req: &OracleRequest| {
            seen_prompts.push(req.tried.clone());
            answers.next().unwrap_or("No").to_string()
        });

        let parent = SearchState::root(NumberMultiset::from_ints(&[1, 2, 3, 4]));
        let children = {
            let mut generator = CandidateGenerator::new(&mut oracle);
            let children = generator.expand(&parent, 4, true, 1.2);
            assert_eq!(generator.queries(), 4);
            children
        };
        drop(oracle);

        assert_eq!(children.len(), 2);
        assert_eq!(children[0].numbers.values(), &[3.0, 4.0, 3.0]);
        assert_eq!(children[0].trace.steps(), &["1 + 2 = 3".to_string()]);
        assert_eq!(children[1].numbers.values(), &[1.0, 2.0, 12.0]);

        assert_eq!(seen_prompts[0], Vec::<String>::new());
        assert_eq!(seen_prompts[1], vec!["1 + 2".to_string()]);
        assert_eq!(seen_prompts[3], vec!["1 + 2".to_string(), "3 * 4".to_string()]);
    }
}
