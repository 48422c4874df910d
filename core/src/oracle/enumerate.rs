//! Offline proposer that picks legal moves itself
//!
//! Intermediate steps get a random untried pairwise operation; the final
//! step gets a move reaching 24 when one exists, `No` otherwise. Useful for
//! dry runs of the search without a language model.

use super::{Oracle, OracleReply, OracleRequest, OracleResult, TokenUsage};
use crate::equation::render_operation;
use crate::expr::{parse, BinaryOp};
use crate::ir::{format_number, is_target, NumberMultiset};
use rand::seq::SliceRandom;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

/// Seeded local move proposer
#[derive(Debug, Clone)]
pub struct EnumeratingOracle {
    rng: ChaCha8Rng,
}

impl EnumeratingOracle {
    pub fn new(seed: u64) -> Self {
        Self {
            rng: ChaCha8Rng::seed_from_u64(seed),
        }
    }
}

/// Every distinct `(lhs text, value)` combining two of the numbers
fn legal_moves(numbers: &NumberMultiset) -> Vec<(String, f64)> {
    let values = numbers.values();
    let mut moves: Vec<(String, f64)> = Vec::new();

    for i in 0..values.len() {
        for j in (i + 1)..values.len() {
            for op in BinaryOp::ALL {
                let mut orders = vec![(values[i], values[j])];
                if !op.is_commutative() {
                    orders.push((values[j], values[i]));
                }
                for (a, b) in orders {
                    let lhs = render_operation(a, op.symbol(), b);
                    // Value of the rendered text, so both sides always agree
                    let Ok(value) = parse(&lhs).and_then(|e| e.eval()) else {
                        continue;
                    };
                    if !moves.iter().any(|(seen, _)| *seen == lhs) {
                        moves.push((lhs, value));
                    }
                }
            }
        }
    }

    moves
}

impl Oracle for EnumeratingOracle {
    fn name(&self) -> &str {
        "enumerate"
    }

    fn ask(&mut self, request: &OracleRequest) -> OracleResult<OracleReply> {
        let moves = legal_moves(&request.numbers);

        let chosen = if request.terminal {
            moves.iter().find(|(_, value)| is_target(*value))
        } else {
            let untried: Vec<&(String, f64)> = moves
                .iter()
                .filter(|(lhs, _)| !request.tried.contains(lhs))
                .collect();
            untried.choose(&mut self.rng).copied()
        };

        let text = match chosen {
            Some((lhs, value)) => format!("{} = {}", lhs, format_number(*value)),
            None => "No".to_string(),
        };

        Ok(OracleReply {
            text,
            usage: TokenUsage::default(),
        })
    }
}
