//! Recursive descent parser
//!
//! Precedence, lowest first: `?:`, `||`, `&&`, equality, comparison,
//! additive, multiplicative, unary, postfix (`.name`, `[index]`, `(args)`).

use super::ast::{BinaryOp, Expr, UnaryOp};
use super::error::{ExprError, ExprResult};
use super::lexer::{Token, TokenKind, tokenize};
use crate::value::Value;

/// Maximum nesting depth accepted by the parser
pub const MAX_DEPTH: usize = 64;

/// Parse an expression
///
/// A single leading `=` is ignored so spreadsheet-style formulas parse.
pub fn parse(source: &str) -> ExprResult<Expr> {
    let trimmed = source.trim_start();
    let body = match trimmed.strip_prefix('=') {
        Some(rest) if !rest.starts_with('=') => rest,
        _ => trimmed,
    };
    let base = source.len() - body.len();

    let mut tokens = tokenize(body)?;
    for token in &mut tokens {
        token.offset += base;
    }

    let mut parser = Parser {
        tokens,
        pos: 0,
        depth: 0,
    };
    let expr = parser.expression()?;
    parser.expect(TokenKind::Eof, "end of input")?;
    Ok(expr)
}

struct Parser {
    tokens: Vec<Token>,
    pos: usize,
    depth: usize,
}

impl Parser {
    fn peek(&self) -> &Token {
        // tokenize always terminates the stream with Eof
        &self.tokens[self.pos.min(self.tokens.len() - 1)]
    }

    fn advance(&mut self) -> Token {
        let token = self.peek().clone();
        if self.pos < self.tokens.len() - 1 {
            self.pos += 1;
        }
        token
    }

    fn check(&self, kind: &TokenKind) -> bool {
        &self.peek().kind == kind
    }

    fn eat(&mut self, kind: &TokenKind) -> bool {
        if self.check(kind) {
            self.advance();
            true
        } else {
            false
        }
    }

    fn expect(&mut self, kind: TokenKind, expected: &str) -> ExprResult<Token> {
        if self.check(&kind) {
            Ok(self.advance())
        } else {
            Err(self.unexpected(expected))
        }
    }

    fn unexpected(&self, expected: &str) -> ExprError {
        let token = self.peek();
        ExprError::UnexpectedToken {
            found: token.kind.to_string(),
            expected: expected.to_string(),
            offset: token.offset,
        }
    }

    fn enter(&mut self) -> ExprResult<()> {
        self.depth += 1;
        if self.depth > MAX_DEPTH {
            return Err(ExprError::TooDeep(MAX_DEPTH));
        }
        Ok(())
    }

    fn expression(&mut self) -> ExprResult<Expr> {
        self.enter()?;
        let result = self.conditional();
        self.depth -= 1;
        result
    }

    fn conditional(&mut self) -> ExprResult<Expr> {
        let condition = self.or()?;
        if !self.eat(&TokenKind::Question) {
            return Ok(condition);
        }
        let then_branch = self.expression()?;
        self.expect(TokenKind::Colon, "`:`")?;
        let else_branch = self.expression()?;
        Ok(Expr::Conditional {
            condition: Box::new(condition),
            then_branch: Box::new(then_branch),
            else_branch: Box::new(else_branch),
        })
    }

    fn or(&mut self) -> ExprResult<Expr> {
        self.chain(Self::and, |kind| match kind {
            TokenKind::OrOr => Some(BinaryOp::Or),
            _ => None,
        })
    }

    fn and(&mut self) -> ExprResult<Expr> {
        self.chain(Self::equality, |kind| match kind {
            TokenKind::AndAnd => Some(BinaryOp::And),
            _ => None,
        })
    }

    fn equality(&mut self) -> ExprResult<Expr> {
        self.chain(Self::comparison, |kind| match kind {
            TokenKind::EqEq => Some(BinaryOp::Eq),
            TokenKind::NotEq => Some(BinaryOp::NotEq),
            TokenKind::EqEqEq => Some(BinaryOp::StrictEq),
            TokenKind::NotEqEq => Some(BinaryOp::StrictNotEq),
            _ => None,
        })
    }

    fn comparison(&mut self) -> ExprResult<Expr> {
        self.chain(Self::additive, |kind| match kind {
            TokenKind::Lt => Some(BinaryOp::Lt),
            TokenKind::LtEq => Some(BinaryOp::LtEq),
            TokenKind::Gt => Some(BinaryOp::Gt),
            TokenKind::GtEq => Some(BinaryOp::GtEq),
            _ => None,
        })
    }

    fn additive(&mut self) -> ExprResult<Expr> {
        self.chain(Self::multiplicative, |kind| match kind {
            TokenKind::Plus => Some(BinaryOp::Add),
            TokenKind::Minus => Some(BinaryOp::Sub),
            _ => None,
        })
    }

    fn multiplicative(&mut self) -> ExprResult<Expr> {
        self.chain(Self::unary, |kind| match kind {
            TokenKind::Star => Some(BinaryOp::Mul),
            TokenKind::Slash => Some(BinaryOp::Div),
            TokenKind::Percent => Some(BinaryOp::Rem),
            _ => None,
        })
    }

    /// Left-associative run of `operand (op operand)*`
    ///
    /// Every binary node nests the previous one, so each counts toward
    /// [`MAX_DEPTH`].
    fn chain(
        &mut self,
        operand: fn(&mut Self) -> ExprResult<Expr>,
        operator: fn(&TokenKind) -> Option<BinaryOp>,
    ) -> ExprResult<Expr> {
        let depth = self.depth;
        let mut left = operand(self)?;
        while let Some(op) = operator(&self.peek().kind) {
            self.advance();
            self.enter()?;
            let right = operand(self)?;
            left = binary(op, left, right);
        }
        self.depth = depth;
        Ok(left)
    }

    fn unary(&mut self) -> ExprResult<Expr> {
        let op = match self.peek().kind {
            TokenKind::Bang => UnaryOp::Not,
            TokenKind::Minus => UnaryOp::Neg,
            TokenKind::Plus => UnaryOp::Plus,
            _ => return self.postfix(),
        };
        self.advance();

        self.enter()?;
        let operand = self.unary();
        self.depth -= 1;

        Ok(Expr::Unary {
            op,
            operand: Box::new(operand?),
        })
    }

    /// Member, index and call suffixes; each one nests the expression
    /// before it and counts toward [`MAX_DEPTH`]
    fn postfix(&mut self) -> ExprResult<Expr> {
        let depth = self.depth;
        let mut expr = self.primary()?;
        loop {
            let token = self.peek().clone();
            match token.kind {
                TokenKind::Dot => {
                    self.advance();
                    self.enter()?;
                    let TokenKind::Ident(property) = self.peek().kind.clone() else {
                        return Err(self.unexpected("property name"));
                    };
                    self.advance();
                    expr = Expr::Member {
                        object: Box::new(expr),
                        property,
                    };
                }
                TokenKind::LBracket => {
                    self.advance();
                    self.enter()?;
                    let index = self.expression()?;
                    self.expect(TokenKind::RBracket, "`]`")?;
                    expr = Expr::Index {
                        object: Box::new(expr),
                        index: Box::new(index),
                    };
                }
                TokenKind::LParen => {
                    let Expr::Identifier(function) = expr else {
                        return Err(ExprError::InvalidCallee {
                            offset: token.offset,
                        });
                    };
                    self.advance();
                    self.enter()?;
                    let args = self.list(TokenKind::RParen, "`)`")?;
                    expr = Expr::Call { function, args };
                }
                _ => {
                    self.depth = depth;
                    return Ok(expr);
                }
            }
        }
    }

    fn primary(&mut self) -> ExprResult<Expr> {
        let token = self.advance();
        let expr = match token.kind {
            TokenKind::Number(n) => Expr::Literal(Value::Number(n)),
            TokenKind::String(s) => Expr::Literal(Value::String(s)),
            TokenKind::True => Expr::Literal(Value::Bool(true)),
            TokenKind::False => Expr::Literal(Value::Bool(false)),
            TokenKind::Null => Expr::Literal(Value::Null),
            TokenKind::Ident(name) => Expr::Identifier(name),
            TokenKind::LParen => {
                let inner = self.expression()?;
                self.expect(TokenKind::RParen, "`)`")?;
                inner
            }
            TokenKind::LBracket => Expr::Array(self.list(TokenKind::RBracket, "`]`")?),
            _ => {
                return Err(ExprError::UnexpectedToken {
                    found: token.kind.to_string(),
                    expected: "expression".to_string(),
                    offset: token.offset,
                });
            }
        };
        Ok(expr)
    }

    /// Comma separated expressions up to `close`, which is consumed
    fn list(&mut self, close: TokenKind, expected: &str) -> ExprResult<Vec<Expr>> {
        let mut items = Vec::new();
        if self.eat(&close) {
            return Ok(items);
        }
        loop {
            items.push(self.expression()?);
            if self.eat(&TokenKind::Comma) {
                continue;
            }
            self.expect(close.clone(), expected)?;
            return Ok(items);
        }
    }
}

fn binary(op: BinaryOp, left: Expr, right: Expr) -> Expr {
    Expr::Binary {
        op,
        left: Box::new(left),
        right: Box::new(right),
    }
}

#[cfg(test)]
#[path = "parser_tests.rs"]
mod parser_tests;
