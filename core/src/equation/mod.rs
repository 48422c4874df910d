//! Equation checking for a single search step
//!
//! A step is a `before = after` pair proposed by the oracle. It is legal
//! when both sides evaluate to the same value and `before` combines exactly
//! two of the available numbers, each instance used at most once.

mod fallback;

pub use fallback::{brute_force, solvable, FallbackSolution};

use crate::expr::{parse, Expr, ExprError, ExprResult};
use crate::ir::{approx_eq, format_number, NumberMultiset};
use log::{debug, warn};
use thiserror::Error;

/// Raw equation text as returned by the oracle
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Equation {
    pub before: String,
    pub after: String,
}

impl Equation {
    pub fn new(before: impl Into<String>, after: impl Into<String>) -> Self {
        Self {
            before: before.into(),
            after: after.into(),
        }
    }
}

/// Why a proposed equation was not accepted
#[derive(Error, Debug, Clone, PartialEq)]
pub enum Rejection {
    #[error("cannot evaluate {side} side: {source}")]
    Unparsable {
        side: &'static str,
        source: ExprError,
    },

    #[error("sides disagree: {before} != {after}")]
    ValueMismatch { before: f64, after: f64 },

    #[error("expected exactly two numbers, found {0}")]
    WrongOperandCount(usize),

    #[error("number {0} is not available")]
    UnavailableOperand(f64),
}

/// An equation that passed every check
#[derive(Debug, Clone, PartialEq)]
pub struct ValidEquation {
    pub before: Expr,
    pub after: Expr,
    /// Value both sides evaluate to
    pub value: f64,
}

impl ValidEquation {
    /// Trace entry, rendered canonically
    pub fn entry(&self) -> String {
        format!("{} = {}", self.before, self.after)
    }

    /// Canonical left-hand side, used as the "already tried" marker
    pub fn lhs(&self) -> String {
        self.before.to_string()
    }
}

fn parse_side(side: &'static str, src: &str) -> Result<(Expr, f64), Rejection> {
    let expr = parse(src).map_err(|source| Rejection::Unparsable { side, source })?;
    let value = expr
        .eval()
        .map_err(|source| Rejection::Unparsable { side, source })?;
    Ok((expr, value))
}

/// Check an equation against the available numbers
pub fn check(
    available: &NumberMultiset,
    before: &str,
    after: &str,
) -> Result<ValidEquation, Rejection> {
    let (before_expr, before_value) = parse_side("left", before)?;
    let (after_expr, after_value) = parse_side("right", after)?;

    if !approx_eq(before_value, after_value) {
        return Err(Rejection::ValueMismatch {
            before: before_value,
            after: after_value,
        });
    }

    let used = before_expr.literals();
    if used.len() != 2 {
        return Err(Rejection::WrongOperandCount(used.len()));
    }

    let mut remaining = available.clone();
    for &number in &used {
        if !remaining.remove_first(number) {
            return Err(Rejection::UnavailableOperand(number));
        }
    }

    Ok(ValidEquation {
        before: before_expr,
        after: after_expr,
        value: after_value,
    })
}

/// [`check`], logging the rejection instead of returning it
///
/// Parse failures are logged as warnings; every other rejection is routine
/// and only logged at debug level.
pub fn accept(available: &NumberMultiset, before: &str, after: &str) -> Option<ValidEquation> {
    match check(available, before, after) {
        Ok(equation) => Some(equation),
        Err(rejection @ Rejection::Unparsable { .. }) => {
            warn!("Cannot eval '{} = {}': {}", before, after, rejection);
            None
        }
        Err(rejection) => {
            debug!("Invalid equation '{} = {}': {}", before, after, rejection);
            None
        }
    }
}

/// Predicate form of [`check`]
pub fn validate(available: &NumberMultiset, before: &str, after: &str) -> bool {
    accept(available, before, after).is_some()
}

/// Remove the two consumed literals and append the result
///
/// Does not validate: the caller must have accepted the equation first.
pub fn project(original: &NumberMultiset, before: &Expr, after: &Expr) -> ExprResult<NumberMultiset> {
    let value = after.eval()?;
    let mut output = original.clone();
    for number in before.literals() {
        output.remove_first(number);
    }
    output.push(value);
    Ok(output)
}

/// Project an already-checked equation
pub fn apply(original: &NumberMultiset, equation: &ValidEquation) -> NumberMultiset {
    let mut output = original.clone();
    for number in equation.before.literals() {
        output.remove_first(number);
    }
    output.push(equation.value);
    output
}

/// Render `<lhs> <op> <rhs>` the way trace entries show plain operations
pub(crate) fn render_operation(lhs: f64, symbol: char, rhs: f64) -> String {
    format!("{} {} {}", format_number(lhs), symbol, format_number(rhs))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn nums(values: &[i64]) -> NumberMultiset {
        NumberMultiset::from_ints(values)
    }

    #[test]
    fn test_accepts_simple_product() {
        assert!(validate(&nums(&[3, 8]), "3*8", "24"));
    }

    #[test]
    fn test_accepts_parenthesized_rhs_expression() {
        let eq = check(&nums(&[1, 1, 4, 6]), "(6 - 1)", "5").unwrap();
        assert_eq!(eq.value, 5.0);
        assert_eq!(eq.entry(), "6 - 1 = 5");
    }

    #[test]
    fn test_rejects_value_mismatch() {
        assert!(matches!(
            check(&nums(&[3, 8]), "3*8", "25"),
            Err(Rejection::ValueMismatch { .. })
        ));
        assert!(!validate(&nums(&[3, 8]), "3+8", "24"));
    }

    #[test]
    fn test_tolerates_floating_point_noise() {
        let available = NumberMultiset::new(vec![8.0, 1.0 / 3.0]);
        assert!(validate(&available, "8 / 0.333333333", "24.000000024"));
    }

    #[test]
    fn test_rejects_three_literals() {
        assert_eq!(
            check(&nums(&[1, 2, 3, 4]), "1 + 2 + 3", "6"),
            Err(Rejection::WrongOperandCount(3))
        );
    }

    #[test]
    fn test_rejects_single_literal() {
        assert_eq!(
            check(&nums(&[6, 4]), "(6)", "6"),
            Err(Rejection::WrongOperandCount(1))
        );
    }

    #[test]
    fn test_rejects_unavailable_literal() {
        assert_eq!(
            check(&nums(&[1, 2, 3, 4]), "5 + 1", "6"),
            Err(Rejection::UnavailableOperand(5.0))
        );
    }

    #[test]
    fn test_rejects_overused_literal() {
        assert_eq!(
            check(&nums(&[4, 1, 2, 3]), "4 * 4", "16"),
            Err(Rejection::UnavailableOperand(4.0))
        );
        // Two instances present, both may be used
        assert!(validate(&nums(&[4, 4, 1, 2]), "4 * 4", "16"));
    }

    #[test]
    fn test_unparsable_is_rejected_not_raised() {
        assert!(!validate(&nums(&[3, 8]), "3 ** 8", "24"));
        assert!(!validate(&nums(&[3, 8]), "import os", "24"));
        assert!(matches!(
            check(&nums(&[3, 8]), "3 * 8", "twenty-four"),
            Err(Rejection::Unparsable { side: "right", .. })
        ));
    }

    #[test]
    fn test_division_by_zero_is_rejected() {
        assert!(matches!(
            check(&nums(&[3, 0]), "3 / 0", "0"),
            Err(Rejection::Unparsable {
                source: ExprError::DivisionByZero,
                ..
            })
        ));
    }

    #[test]
    fn test_oversized_proposals_are_rejected() {
        let nested = format!("{}3 * 8{}", "(".repeat(50_000), ")".repeat(50_000));
        assert!(matches!(
            check(&nums(&[3, 8]), &nested, "24"),
            Err(Rejection::Unparsable {
                source: ExprError::TooComplex { .. },
                ..
            })
        ));

        let chain = vec!["1"; 200_000].join("+");
        assert!(!validate(&nums(&[3, 8]), &chain, "200000"));
    }

    #[test]
    fn test_project_conserves_numbers() {
        let original = nums(&[1, 2, 3, 4]);
        let eq = check(&original, "4 - 1", "3").unwrap();
        let projected = project(&original, &eq.before, &eq.after).unwrap();

        assert_eq!(projected.len(), original.len() - 1);
        assert!(projected.same_multiset(&nums(&[2, 3, 3])));

        // projected + consumed literals == original + produced value
        let mut lhs = projected.clone();
        for literal in eq.before.literals() {
            lhs.push(literal);
        }
        let mut rhs = original.clone();
        rhs.push(eq.value);
        assert!(lhs.same_multiset(&rhs));
    }

    #[test]
    fn test_project_removes_one_instance_per_literal() {
        let original = nums(&[4, 4, 4, 4]);
        let eq = check(&original, "4+4", "8").unwrap();
        let projected = project(&original, &eq.before, &eq.after).unwrap();
        assert_eq!(projected.values(), &[4.0, 4.0, 8.0]);
        assert_eq!(apply(&original, &eq), projected);
    }

    #[test]
    fn test_project_reports_bad_rhs() {
        let before = parse("4 + 4").unwrap();
        let after = parse("8 / 0").unwrap();
        assert_eq!(
            project(&nums(&[4, 4]), &before, &after),
            Err(ExprError::DivisionByZero)
        );
    }
}
