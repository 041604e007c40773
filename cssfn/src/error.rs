//! Crate error types.

use thiserror::Error;

/// Errors surfaced by [`Functions::apply`](crate::functions::Functions::apply).
///
/// Everything that can go wrong at a single call site (unknown name,
/// unbalanced parens, bad color, failed arithmetic) degrades in place and is
/// never reported here.  Only configuration mistakes are.
#[derive(Debug, Error)]
pub enum FunctionError {
    /// The pattern was compiled before any function was registered.
    #[error("no functions registered")]
    EmptyRegistry,
    /// The generated call-site pattern failed to compile.
    #[error("function pattern error: {0}")]
    InvalidPattern(#[from] regex::Error),
}

/// Errors from the sandboxed arithmetic evaluator used by `math()`.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum MathError {
    #[error("unexpected token {0:?}")]
    UnexpectedToken(String),
    #[error("unexpected end of expression")]
    UnexpectedEnd,
    #[error("invalid number {0:?}")]
    InvalidNumber(String),
    #[error("division by zero")]
    DivisionByZero,
    #[error("result is not finite")]
    NotFinite,
}
