//! Error types for the three pipeline stages.
//!
//! Each family carries `{kind, position, message}` as required by the
//! public error surface: a 1-based character position into the source
//! expression (0 for runtime errors that don't originate in parsing) and a
//! human-readable message. `LexError` and `ParseError` additionally know how
//! to render the `^` pointer format used for user-facing diagnostics.

use thiserror::Error;

/// Raised by the lexer: unexpected character, bad operator, unterminated
/// backtick/quote literal.
#[derive(Debug, Clone, PartialEq, Error)]
#[error("{}", render_caret(.expr, *.pos, .message))]
pub struct LexError {
    pub pos: usize,
    pub message: String,
    pub expr: String,
}

impl LexError {
    pub fn new(source: &str, pos: usize, message: impl Into<String>) -> Self {
        LexError {
            pos,
            message: message.into(),
            expr: source.to_owned(),
        }
    }
}

/// Raised by the parser: unexpected token, unclosed delimiter, syntax error
/// after a projection, quoted identifier used as a function name, etc.
#[derive(Debug, Clone, PartialEq, Error)]
#[error("{}", render_caret(.expr, *.pos, .message))]
pub struct ParseError {
    pub pos: usize,
    pub message: String,
    pub expr: String,
}

impl ParseError {
    pub fn new(source: &str, pos: usize, message: impl Into<String>) -> Self {
        ParseError {
            pos,
            message: message.into(),
            expr: source.to_owned(),
        }
    }
}

/// `parse()` surfaces a single `ParseError`, so a lexing failure (which can
/// happen before a single token is produced) is folded into one by carrying
/// its position and message over directly.
impl From<LexError> for ParseError {
    fn from(e: LexError) -> Self {
        ParseError {
            pos: e.pos,
            message: e.message,
            expr: e.expr,
        }
    }
}

/// Raised by the interpreter: unknown function, arity/type mismatch,
/// invalid slice step, expression nested too deeply.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum RuntimeError {
    #[error("unknown function: {name}")]
    UnknownFunction { name: String },

    #[error("invalid arity calling {name}: expected {expected}, got {actual}")]
    InvalidArity {
        name: String,
        expected: String,
        actual: usize,
    },

    #[error("argument {position} to {name} is an invalid type: expected {expected}, got {actual}")]
    InvalidType {
        name: String,
        position: usize,
        expected: String,
        actual: String,
    },

    #[error("slice step cannot be 0")]
    InvalidSliceStep,

    #[error("expression nested too deeply")]
    TooDeep,

    #[error("{0}")]
    Custom(String),
}

impl RuntimeError {
    /// 0 for every runtime error: these don't originate in the source text.
    pub fn position(&self) -> usize {
        0
    }
}

/// Unifies the three error families for the top-level `search` entry point.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum Error {
    #[error(transparent)]
    Lex(#[from] LexError),
    #[error(transparent)]
    Parse(#[from] ParseError),
    #[error(transparent)]
    Runtime(#[from] RuntimeError),
}

impl Error {
    pub fn position(&self) -> usize {
        match self {
            Error::Lex(e) => e.pos,
            Error::Parse(e) => e.pos,
            Error::Runtime(e) => e.position(),
        }
    }
}

fn render_caret(source: &str, pos: usize, message: &str) -> String {
    let caret_col = pos.saturating_sub(1);
    let caret = " ".repeat(caret_col) + "^";
    format!("Syntax error at character {pos}\n{source}\n{caret}\n{message}")
}
