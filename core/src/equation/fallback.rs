//! Deterministic enumeration over the final two numbers

use super::render_operation;
use crate::expr::BinaryOp;
use crate::ir::{format_number, is_target, NumberMultiset};

/// A terminal expression found by enumeration
#[derive(Debug, Clone, PartialEq)]
pub struct FallbackSolution {
    /// Expression over the last two numbers, e.g. `3 * 8`
    pub expression: String,
    pub value: f64,
}

impl FallbackSolution {
    /// Trace entry, e.g. `3 * 8 = 24`
    pub fn entry(&self) -> String {
        format!("{} = {}", self.expression, format_number(self.value))
    }
}

/// Try the six combinations of `a` and `b` and return the first that hits 24
///
/// Order: `a + b`, `a - b`, `b - a`, `a * b`, `a / b`, `b / a`. Divisions by
/// zero are skipped.
pub fn brute_force(a: f64, b: f64) -> Option<FallbackSolution> {
    let candidates = [
        (a, BinaryOp::Add, b),
        (a, BinaryOp::Sub, b),
        (b, BinaryOp::Sub, a),
        (a, BinaryOp::Mul, b),
        (a, BinaryOp::Div, b),
        (b, BinaryOp::Div, a),
    ];

    candidates.iter().find_map(|&(lhs, op, rhs)| {
        let value = op.apply(lhs, rhs)?;
        is_target(value).then(|| FallbackSolution {
            expression: render_operation(lhs, op.symbol(), rhs),
            value,
        })
    })
}

/// Check whether 24 is still reachable from these numbers
///
/// Exhaustive over every ordered pair and operator, recursing on the
/// reduced multiset.
pub fn solvable(numbers: &NumberMultiset) -> bool {
    reachable(numbers.values())
}

fn reachable(values: &[f64]) -> bool {
    match values.len() {
        0 => false,
        1 => is_target(values[0]),
        n => {
            for i in 0..n {
                for j in 0..n {
                    if i == j {
                        continue;
                    }
                    let rest: Vec<f64> = values
                        .iter()
                        .enumerate()
                        .filter(|&(idx, _)| idx != i && idx != j)
                        .map(|(_, &v)| v)
                        .collect();

                    for op in BinaryOp::ALL {
                        // Commutative operators only need one ordering
                        if op.is_commutative() && j < i {
                            continue;
                        }
                        let Some(value) = op.apply(values[i], values[j]) else {
                            continue;
                        };
                        let mut next = rest.clone();
                        next.push(value);
                        if reachable(&next) {
                            return true;
                        }
                    }
                }
            }
            false
        }
    }
}
