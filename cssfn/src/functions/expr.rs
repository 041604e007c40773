//! Arithmetic lexer, AST, parser, and evaluator for `math()`.
//!
//! Input has already been filtered down to digits, `.`, and `+ - * / ( )`,
//! so there are no identifiers, calls, or anything else to evaluate.
//!
//! Operator precedence (lowest → highest):
//!   additive  →  multiplicative  →  unary  →  primary

use crate::error::MathError;

// ── Token ─────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq)]
pub enum Token {
    Num(f64),
    Plus,
    Minus,
    Star,
    Slash,
    LParen,
    RParen,
    /// Unrecognised input char, reported instead of silently skipped.
    Unknown(char),
    Eof,
}

// ── Lexer ─────────────────────────────────────────────────────────────────────

struct Lexer<'a> {
    src: &'a [u8],
    pos: usize,
}

impl<'a> Lexer<'a> {
    fn new(src: &'a str) -> Self {
        Lexer {
            src: src.as_bytes(),
            pos: 0,
        }
    }

    fn peek(&self) -> Option<u8> {
        self.src.get(self.pos).copied()
    }

    fn skip_ws(&mut self) {
        while matches!(self.peek(), Some(b' ' | b'\t' | b'\n' | b'\r')) {
            self.pos += 1;
        }
    }

    /// Digits with at most one `.`; a second `.` starts a new number (and so
    /// a parse error).
    fn read_number(&mut self) -> Result<Token, MathError> {
        let start = self.pos;
        let mut seen_dot = false;
        while let Some(c) = self.peek() {
            match c {
                b'0'..=b'9' => {}
                b'.' if !seen_dot => seen_dot = true,
                _ => break,
            }
            self.pos += 1;
        }
        let text = String::from_utf8_lossy(&self.src[start..self.pos]);
        text.parse::<f64>()
            .map(Token::Num)
            .map_err(|_| MathError::InvalidNumber(text.into_owned()))
    }

    fn next_token(&mut self) -> Result<Token, MathError> {
        self.skip_ws();
        let Some(ch) = self.peek() else {
            return Ok(Token::Eof);
        };
        if ch.is_ascii_digit() || ch == b'.' {
            return self.read_number();
        }
        self.pos += 1;
        Ok(match ch {
            b'+' => Token::Plus,
            b'-' => Token::Minus,
            b'*' => Token::Star,
            b'/' => Token::Slash,
            b'(' => Token::LParen,
            b')' => Token::RParen,
            c => Token::Unknown(c as char),
        })
    }

    fn tokenize(mut self) -> Result<Vec<Token>, MathError> {
        let mut tokens = Vec::new();
        loop {
            let t = self.next_token()?;
            let done = matches!(t, Token::Eof);
            tokens.push(t);
            if done {
                break;
            }
        }
        Ok(tokens)
    }
}

// ── AST ───────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum BinOp {
    Add,
    Sub,
    Mul,
    Div,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    Num(f64),
    Neg(Box<Expr>),
    Binary(BinOp, Box<Expr>, Box<Expr>),
}

// ── Parser ────────────────────────────────────────────────────────────────────

struct Parser {
    tokens: Vec<Token>,
    pos: usize,
}

impl Parser {
    fn new(tokens: Vec<Token>) -> Self {
        Parser { tokens, pos: 0 }
    }

    fn peek(&self) -> &Token {
        self.tokens.get(self.pos).unwrap_or(&Token::Eof)
    }

    fn advance(&mut self) -> Token {
        let t = self.tokens.get(self.pos).cloned().unwrap_or(Token::Eof);
        self.pos += 1;
        t
    }

    fn eat(&mut self, expected: &Token) -> bool {
        if self.peek() == expected {
            self.pos += 1;
            true
        } else {
            false
        }
    }

    fn parse_additive(&mut self) -> Result<Expr, MathError> {
        let mut lhs = self.parse_multiplicative()?;
        loop {
            let op = match self.peek() {
                Token::Plus => BinOp::Add,
                Token::Minus => BinOp::Sub,
                _ => break,
            };
            self.pos += 1;
            let rhs = self.parse_multiplicative()?;
            lhs = Expr::Binary(op, Box::new(lhs), Box::new(rhs));
        }
        Ok(lhs)
    }

    fn parse_multiplicative(&mut self) -> Result<Expr, MathError> {
        let mut lhs = self.parse_unary()?;
        loop {
            let op = match self.peek() {
                Token::Star => BinOp::Mul,
                Token::Slash => BinOp::Div,
                _ => break,
            };
            self.pos += 1;
            let rhs = self.parse_unary()?;
            lhs = Expr::Binary(op, Box::new(lhs), Box::new(rhs));
        }
        Ok(lhs)
    }

    fn parse_unary(&mut self) -> Result<Expr, MathError> {
        match self.peek() {
            Token::Minus => {
                self.pos += 1;
                Ok(Expr::Neg(Box::new(self.parse_unary()?)))
            }
            Token::Plus => {
                self.pos += 1;
                self.parse_unary()
            }
            _ => self.parse_primary(),
        }
    }

    fn parse_primary(&mut self) -> Result<Expr, MathError> {
        match self.advance() {
            Token::Num(x) => Ok(Expr::Num(x)),
            Token::LParen => {
                let inner = self.parse_additive()?;
                if !self.eat(&Token::RParen) {
                    return Err(self.unexpected());
                }
                Ok(inner)
            }
            Token::Eof => Err(MathError::UnexpectedEnd),
            other => Err(MathError::UnexpectedToken(format!("{other:?}"))),
        }
    }

    fn unexpected(&self) -> MathError {
        match self.peek() {
            Token::Eof => MathError::UnexpectedEnd,
            other => MathError::UnexpectedToken(format!("{other:?}")),
        }
    }
}

/// Parse an arithmetic expression into an AST.  Trailing tokens are an error.
pub fn parse_expr(src: &str) -> Result<Expr, MathError> {
    let tokens = Lexer::new(src).tokenize()?;
    let mut parser = Parser::new(tokens);
    let expr = parser.parse_additive()?;
    if parser.peek() != &Token::Eof {
        return Err(parser.unexpected());
    }
    Ok(expr)
}

// ── Evaluator ─────────────────────────────────────────────────────────────────

pub fn eval_expr(expr: &Expr) -> Result<f64, MathError> {
    let v = match expr {
        Expr::Num(x) => *x,
        Expr::Neg(inner) => -eval_expr(inner)?,
        Expr::Binary(op, lhs, rhs) => {
            let l = eval_expr(lhs)?;
            let r = eval_expr(rhs)?;
            match op {
                BinOp::Add => l + r,
                BinOp::Sub => l - r,
                BinOp::Mul => l * r,
                BinOp::Div => {
                    if r == 0.0 {
                        return Err(MathError::DivisionByZero);
                    }
                    l / r
                }
            }
        }
    };
    if v.is_finite() {
        Ok(v)
    } else {
        Err(MathError::NotFinite)
    }
}

/// Convenience: parse and evaluate.
pub fn eval_str(src: &str) -> Result<f64, MathError> {
    eval_expr(&parse_expr(src)?)
}

// ── Tests ─────────────────────────────────────────────────────────────────────
