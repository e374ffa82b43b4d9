//! Tokenizer for the expression language

use std::fmt;
use std::iter::Peekable;
use std::str::CharIndices;

use super::error::{ExprError, ExprResult};

/// Kinds of tokens produced by [`tokenize`]
#[derive(Debug, Clone, PartialEq)]
pub enum TokenKind {
    Number(f64),
    String(String),
    Ident(String),
    True,
    False,
    Null,
    LParen,
    RParen,
    LBracket,
    RBracket,
    Comma,
    Dot,
    Question,
    Colon,
    Plus,
    Minus,
    Star,
    Slash,
    Percent,
    Bang,
    EqEq,
    EqEqEq,
    NotEq,
    NotEqEq,
    Lt,
    LtEq,
    Gt,
    GtEq,
    AndAnd,
    OrOr,
    Eof,
}

impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            TokenKind::Number(n) => return write!(f, "number `{}`", n),
            TokenKind::String(s) => return write!(f, "string {:?}", s),
            TokenKind::Ident(name) => return write!(f, "identifier `{}`", name),
            TokenKind::True => "`true`",
            TokenKind::False => "`false`",
            TokenKind::Null => "`null`",
            TokenKind::LParen => "`(`",
            TokenKind::RParen => "`)`",
            TokenKind::LBracket => "`[`",
            TokenKind::RBracket => "`]`",
            TokenKind::Comma => "`,`",
            TokenKind::Dot => "`.`",
            TokenKind::Question => "`?`",
            TokenKind::Colon => "`:`",
            TokenKind::Plus => "`+`",
            TokenKind::Minus => "`-`",
            TokenKind::Star => "`*`",
            TokenKind::Slash => "`/`",
            TokenKind::Percent => "`%`",
            TokenKind::Bang => "`!`",
            TokenKind::EqEq => "`==`",
            TokenKind::EqEqEq => "`===`",
            TokenKind::NotEq => "`!=`",
            TokenKind::NotEqEq => "`!==`",
            TokenKind::Lt => "`<`",
            TokenKind::LtEq => "`<=`",
            TokenKind::Gt => "`>`",
            TokenKind::GtEq => "`>=`",
            TokenKind::AndAnd => "`&&`",
            TokenKind::OrOr => "`||`",
            TokenKind::Eof => "end of input",
        };
        f.write_str(text)
    }
}

/// A token with its byte offset in the source
#[derive(Debug, Clone, PartialEq)]
pub struct Token {
    pub kind: TokenKind,
    pub offset: usize,
}

/// Split an expression into tokens, always ending with [`TokenKind::Eof`]
pub fn tokenize(source: &str) -> ExprResult<Vec<Token>> {
    Lexer {
        source,
        chars: source.char_indices().peekable(),
    }
    .run()
}

struct Lexer<'a> {
    source: &'a str,
    chars: Peekable<CharIndices<'a>>,
}

impl<'a> Lexer<'a> {
    fn run(mut self) -> ExprResult<Vec<Token>> {
        let mut tokens = Vec::new();

        while let Some(&(offset, c)) = self.chars.peek() {
            if c.is_whitespace() {
                self.chars.next();
                continue;
            }

            let kind = if c.is_ascii_digit() {
                self.number(offset)?
            } else if c == '\'' || c == '"' {
                self.string(offset, c)?
            } else if is_ident_start(c) {
                self.identifier(offset)
            } else {
                self.chars.next();
                self.punctuation(offset, c)?
            };
            tokens.push(Token { kind, offset });
        }

        tokens.push(Token {
            kind: TokenKind::Eof,
            offset: self.source.len(),
        });
        Ok(tokens)
    }

    fn number(&mut self, start: usize) -> ExprResult<TokenKind> {
        let mut end = start;
        let mut seen_dot = false;
        let mut seen_exp = false;
        let mut prev = '\0';

        while let Some(&(idx, c)) = self.chars.peek() {
            let accept = c.is_ascii_digit()
                || (c == '.' && !seen_dot && !seen_exp && self.digit_follows(idx))
                || ((c == 'e' || c == 'E') && !seen_exp)
                || ((c == '+' || c == '-') && (prev == 'e' || prev == 'E'));
            if !accept {
                break;
            }
            seen_dot |= c == '.';
            seen_exp |= c == 'e' || c == 'E';
            prev = c;
            end = idx + c.len_utf8();
            self.chars.next();
        }

        let text = &self.source[start..end];
        text.parse::<f64>()
            .map(TokenKind::Number)
            .map_err(|_| ExprError::InvalidNumber {
                text: text.to_string(),
                offset: start,
            })
    }

    /// `1.5` is a number, `1.length` is not
    fn digit_follows(&self, dot_offset: usize) -> bool {
        self.source[dot_offset + 1..]
            .chars()
            .next()
            .is_some_and(|c| c.is_ascii_digit())
    }

    fn string(&mut self, start: usize, quote: char) -> ExprResult<TokenKind> {
        self.chars.next();
        let mut value = String::new();

        loop {
            let Some((_, c)) = self.chars.next() else {
                return Err(ExprError::UnterminatedString { offset: start });
            };
            match c {
                c if c == quote => return Ok(TokenKind::String(value)),
                '\\' => {
                    let Some((_, escaped)) = self.chars.next() else {
                        return Err(ExprError::UnterminatedString { offset: start });
                    };
                    value.push(match escaped {
                        'n' => '\n',
                        't' => '\t',
                        'r' => '\r',
                        '0' => '\0',
                        other => other,
                    });
                }
                c => value.push(c),
            }
        }
    }

    fn identifier(&mut self, start: usize) -> TokenKind {
        let mut end = start;
        while let Some(&(idx, c)) = self.chars.peek() {
            if !is_ident_continue(c) {
                break;
            }
            end = idx + c.len_utf8();
            self.chars.next();
        }

        match &self.source[start..end] {
            "true" => TokenKind::True,
            "false" => TokenKind::False,
            "null" => TokenKind::Null,
            name => TokenKind::Ident(name.to_string()),
        }
    }

    fn punctuation(&mut self, offset: usize, c: char) -> ExprResult<TokenKind> {
        let kind = match c {
            '(' => TokenKind::LParen,
            ')' => TokenKind::RParen,
            '[' => TokenKind::LBracket,
            ']' => TokenKind::RBracket,
            ',' => TokenKind::Comma,
            '.' => TokenKind::Dot,
            '?' => TokenKind::Question,
            ':' => TokenKind::Colon,
            '+' => TokenKind::Plus,
            '-' => TokenKind::Minus,
            '*' => TokenKind::Star,
            '/' => TokenKind::Slash,
            '%' => TokenKind::Percent,
            '!' => {
                if self.eat('=') {
                    if self.eat('=') {
                        TokenKind::NotEqEq
                    } else {
                        TokenKind::NotEq
                    }
                } else {
                    TokenKind::Bang
                }
            }
            '=' => {
                if !self.eat('=') {
                    return Err(ExprError::UnexpectedChar { ch: '=', offset });
                }
                if self.eat('=') {
                    TokenKind::EqEqEq
                } else {
                    TokenKind::EqEq
                }
            }
            '<' => {
                if self.eat('=') {
                    TokenKind::LtEq
                } else {
                    TokenKind::Lt
                }
            }
            '>' => {
                if self.eat('=') {
                    TokenKind::GtEq
                } else {
                    TokenKind::Gt
                }
            }
            '&' if self.eat('&') => TokenKind::AndAnd,
            '|' if self.eat('|') => TokenKind::OrOr,
            other => return Err(ExprError::UnexpectedChar { ch: other, offset }),
        };
        Ok(kind)
    }

    fn eat(&mut self, expected: char) -> bool {
        if self.chars.peek().is_some_and(|&(_, c)| c == expected) {
            self.chars.next();
            true
        } else {
            false
        }
    }
}

fn is_ident_start(c: char) -> bool {
    c.is_ascii_alphabetic() || c == '_' || c == '$'
}

fn is_ident_continue(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_' || c == '$'
}
