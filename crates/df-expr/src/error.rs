//! Expression parsing errors.

use thiserror::Error;

pub type ParseResult<T> = Result<T, ParseError>;

/// Raised when an expression is not valid syntax.
///
/// `offset` is the byte offset into the source where parsing stopped.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("Invalid expression at offset {offset}: {message}")]
pub struct ParseError {
    pub message: String,
    pub offset: usize,
}

impl ParseError {
    pub fn new(message: impl Into<String>, offset: usize) -> Self {
        Self {
            message: message.into(),
            offset,
        }
    }
}
