//! Arithmetic expressions over numeric literals
//!
//! Only the four binary operators, parentheses and (optionally signed)
//! numeric literals are understood. Anything else is an [`ExprError`],
//! which callers treat as an invalid candidate rather than a fault.

mod parser;

pub use parser::{parse, MAX_TOKENS};

use crate::ir::{approx_eq, format_number};
use std::fmt;
use thiserror::Error;

/// Errors produced while parsing or evaluating an expression
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ExprError {
    #[error("empty expression")]
    Empty,

    #[error("unexpected character '{ch}' at {pos}")]
    UnexpectedChar { ch: char, pos: usize },

    #[error("unexpected {found} at {pos}")]
    UnexpectedToken { found: String, pos: usize },

    #[error("unexpected end of expression at {pos}")]
    UnexpectedEnd { pos: usize },

    #[error("invalid number literal: {0}")]
    InvalidNumber(String),

    #[error("division by zero")]
    DivisionByZero,

    #[error("expression longer than {limit} tokens")]
    TooComplex { limit: usize },
}

/// Result type for expression operations
pub type ExprResult<T> = Result<T, ExprError>;

/// The four basic operators
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BinaryOp {
    Add,
    Sub,
    Mul,
    Div,
}

impl BinaryOp {
    /// All operators, in the order the fallback enumerates them
    pub const ALL: [BinaryOp; 4] = [BinaryOp::Add, BinaryOp::Sub, BinaryOp::Mul, BinaryOp::Div];

    pub fn symbol(self) -> char {
        match self {
            BinaryOp::Add => '+',
            BinaryOp::Sub => '-',
            BinaryOp::Mul => '*',
            BinaryOp::Div => '/',
        }
    }

    fn precedence(self) -> u8 {
        match self {
            BinaryOp::Add | BinaryOp::Sub => 1,
            BinaryOp::Mul | BinaryOp::Div => 2,
        }
    }

    /// Apply the operator; `None` on division by zero
    pub fn apply(self, lhs: f64, rhs: f64) -> Option<f64> {
        match self {
            BinaryOp::Add => Some(lhs + rhs),
            BinaryOp::Sub => Some(lhs - rhs),
            BinaryOp::Mul => Some(lhs * rhs),
            BinaryOp::Div if approx_eq(rhs, 0.0) => None,
            BinaryOp::Div => Some(lhs / rhs),
        }
    }

    /// Check whether swapping the operands can change the result
    pub fn is_commutative(self) -> bool {
        matches!(self, BinaryOp::Add | BinaryOp::Mul)
    }
}

/// Parsed arithmetic expression
#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    Num(f64),
    Binary {
        op: BinaryOp,
        lhs: Box<Expr>,
        rhs: Box<Expr>,
    },
}

impl Expr {
    pub fn binary(op: BinaryOp, lhs: Expr, rhs: Expr) -> Self {
        Expr::Binary {
            op,
            lhs: Box::new(lhs),
            rhs: Box::new(rhs),
        }
    }

    /// Evaluate the expression
    pub fn eval(&self) -> ExprResult<f64> {
        match self {
            Expr::Num(v) => Ok(*v),
            Expr::Binary { op, lhs, rhs } => {
                let l = lhs.eval()?;
                let r = rhs.eval()?;
                op.apply(l, r).ok_or(ExprError::DivisionByZero)
            }
        }
    }

    /// Numeric literals in source order
    pub fn literals(&self) -> Vec<f64> {
        let mut out = Vec::new();
        self.collect_literals(&mut out);
        out
    }

    fn collect_literals(&self, out: &mut Vec<f64>) {
        match self {
            Expr::Num(v) => out.push(*v),
            Expr::Binary { lhs, rhs, .. } => {
                lhs.collect_literals(out);
                rhs.collect_literals(out);
            }
        }
    }

    fn precedence(&self) -> u8 {
        match self {
            Expr::Num(_) => u8::MAX,
            Expr::Binary { op, .. } => op.precedence(),
        }
    }
}

impl fmt::Display for Expr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Expr::Num(v) => write!(f, "{}", format_number(*v)),
            Expr::Binary { op, lhs, rhs } => {
                let prec = op.precedence();

                if lhs.precedence() < prec {
                    write!(f, "({})", lhs)?;
                } else {
                    write!(f, "{}", lhs)?;
                }

                write!(f, " {} ", op.symbol())?;

                // Right operands at the same level keep their parentheses: a - (b - c)
                if rhs.precedence() <= prec {
                    write!(f, "({})", rhs)
                } else {
                    write!(f, "{}", rhs)
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_canonical_rendering() {
        assert_eq!(parse("4+4").unwrap().to_string(), "4 + 4");
        assert_eq!(parse("(4+4)*3").unwrap().to_string(), "(4 + 4) * 3");
        assert_eq!(parse("((3*8))").unwrap().to_string(), "3 * 8");
        assert_eq!(parse("12-(4-2)").unwrap().to_string(), "12 - (4 - 2)");
        assert_eq!(parse("8 / (3 - 8 / 3)").unwrap().to_string(), "8 / (3 - 8 / 3)");
    }

    #[test]
    fn test_rendering_reparses_to_same_value() {
        for src in ["1+2*3", "(1+2)*3", "6/(1-3/4)", "10-(2-8)", "-5*-4"] {
            let expr = parse(src).unwrap();
            let again = parse(&expr.to_string()).unwrap();
            assert_eq!(expr.eval().unwrap(), again.eval().unwrap(), "{}", src);
        }
    }

    #[test]
    fn test_division_by_zero() {
        assert_eq!(parse("4 / 0").unwrap().eval(), Err(ExprError::DivisionByZero));
        assert_eq!(parse("4 / (2 - 2)").unwrap().eval(), Err(ExprError::DivisionByZero));
    }

    #[test]
    fn test_literals_in_source_order() {
        let expr = parse("(12 - 4) * 3").unwrap();
        assert_eq!(expr.literals(), vec![12.0, 4.0, 3.0]);
    }

    #[test]
    fn test_apply() {
        assert_eq!(BinaryOp::Sub.apply(3.0, 8.0), Some(-5.0));
        assert_eq!(BinaryOp::Div.apply(3.0, 0.0), None);
        assert!(BinaryOp::Mul.is_commutative());
        assert!(!BinaryOp::Div.is_commutative());
    }
}
