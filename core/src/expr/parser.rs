//! Tokenizer and recursive-descent parser
//!
//! ```text
//! expr   := term (('+' | '-') term)*
//! term   := factor (('*' | '/') factor)*
//! factor := '-'? number | '(' expr ')'
//! ```

use super::{BinaryOp, Expr, ExprError, ExprResult};

/// Longest accepted token stream; bounds the parse and evaluation recursion
pub const MAX_TOKENS: usize = 64;

#[derive(Debug, Clone, Copy, PartialEq)]
enum Token {
    Num(f64),
    Op(BinaryOp),
    LParen,
    RParen,
}

impl Token {
    fn describe(&self) -> String {
        match self {
            Token::Num(v) => format!("number {}", v),
            Token::Op(op) => format!("operator '{}'", op.symbol()),
            Token::LParen => "'('".to_string(),
            Token::RParen => "')'".to_string(),
        }
    }
}

fn tokenize(src: &str) -> ExprResult<Vec<(Token, usize)>> {
    let chars: Vec<char> = src.chars().collect();
    let mut tokens = Vec::new();
    let mut pos = 0;

    while pos < chars.len() {
        let ch = chars[pos];
        let token = match ch {
            c if c.is_whitespace() => {
                pos += 1;
                continue;
            }
            '+' => Token::Op(BinaryOp::Add),
            '-' => Token::Op(BinaryOp::Sub),
            '*' => Token::Op(BinaryOp::Mul),
            '/' => Token::Op(BinaryOp::Div),
            '(' => Token::LParen,
            ')' => Token::RParen,
            c if c.is_ascii_digit() || c == '.' => {
                let start = pos;
                while pos < chars.len() && (chars[pos].is_ascii_digit() || chars[pos] == '.') {
                    pos += 1;
                }
                let text: String = chars[start..pos].iter().collect();
                let value = text
                    .parse::<f64>()
                    .map_err(|_| ExprError::InvalidNumber(text.clone()))?;
                tokens.push((Token::Num(value), start));
                if tokens.len() > MAX_TOKENS {
                    return Err(ExprError::TooComplex { limit: MAX_TOKENS });
                }
                continue;
            }
            other => return Err(ExprError::UnexpectedChar { ch: other, pos }),
        };
        tokens.push((token, pos));
        pos += 1;

        if tokens.len() > MAX_TOKENS {
            return Err(ExprError::TooComplex { limit: MAX_TOKENS });
        }
    }

    Ok(tokens)
}

struct Parser {
    tokens: Vec<(Token, usize)>,
    cursor: usize,
}

impl Parser {
    fn peek(&self) -> Option<Token> {
        self.tokens.get(self.cursor).map(|(t, _)| *t)
    }

    fn next(&mut self) -> Option<(Token, usize)> {
        let item = self.tokens.get(self.cursor).copied();
        if item.is_some() {
            self.cursor += 1;
        }
        item
    }

    fn expr(&mut self) -> ExprResult<Expr> {
        let mut lhs = self.term()?;
        while let Some(Token::Op(op @ (BinaryOp::Add | BinaryOp::Sub))) = self.peek() {
            self.cursor += 1;
            let rhs = self.term()?;
            lhs = Expr::binary(op, lhs, rhs);
        }
        Ok(lhs)
    }

    fn term(&mut self) -> ExprResult<Expr> {
        let mut lhs = self.factor()?;
        while let Some(Token::Op(op @ (BinaryOp::Mul | BinaryOp::Div))) = self.peek() {
            self.cursor += 1;
            let rhs = self.factor()?;
            lhs = Expr::binary(op, lhs, rhs);
        }
        Ok(lhs)
    }

    fn factor(&mut self) -> ExprResult<Expr> {
        match self.next() {
            Some((Token::Num(v), _)) => Ok(Expr::Num(v)),
            // A sign is only allowed directly in front of a literal
            Some((Token::Op(BinaryOp::Sub), pos)) => match self.next() {
                Some((Token::Num(v), _)) => Ok(Expr::Num(-v)),
                Some((token, pos)) => Err(ExprError::UnexpectedToken {
                    found: token.describe(),
                    pos,
                }),
                None => Err(ExprError::UnexpectedEnd { pos: pos + 1 }),
            },
            Some((Token::LParen, _)) => {
                let inner = self.expr()?;
                match self.next() {
                    Some((Token::RParen, _)) => Ok(inner),
                    Some((token, pos)) => Err(ExprError::UnexpectedToken {
                        found: token.describe(),
                        pos,
                    }),
                    None => Err(ExprError::UnexpectedEnd {
                        pos: self.end_pos(),
                    }),
                }
            }
            Some((token, pos)) => Err(ExprError::UnexpectedToken {
                found: token.describe(),
                pos,
            }),
            None => Err(ExprError::UnexpectedEnd {
                pos: self.end_pos(),
            }),
        }
    }

    fn end_pos(&self) -> usize {
        self.tokens.last().map(|(_, p)| p + 1).unwrap_or(0)
    }
}

/// Parse an arithmetic expression
pub fn parse(src: &str) -> ExprResult<Expr> {
    let tokens = tokenize(src)?;
    if tokens.is_empty() {
        return Err(ExprError::Empty);
    }

    let mut parser = Parser { tokens, cursor: 0 };
    let expr = parser.expr()?;

    if let Some((token, pos)) = parser.next() {
        return Err(ExprError::UnexpectedToken {
            found: token.describe(),
            pos,
        });
    }

    Ok(expr)
}
