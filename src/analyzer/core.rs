//! # Core Parser Definitions
//!
//! The parser interface and error type shared by every combinator.

use thiserror::Error;

/// Parser trait defines the core parsing interface.
///
/// A parser takes the whole input slice plus a start position and returns the
/// position after the consumed items together with the parsed value.
///
/// # Type Parameters
///
/// * `I` - The input item type
/// * `O` - The output value type
pub trait Parser<I, O> {
    fn parse(&self, input: &[I], pos: usize) -> ParseResult<O>;
}

/// On success, the new position and the parsed value.
pub type ParseResult<O> = Result<(usize, O), ParseError>;

/// Error type for parsing operations.
///
/// Every variant records the input position it was raised at. Combinators
/// use that position to decide between alternatives: an error raised after
/// input was consumed is a committed failure and is not backtracked over.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ParseError {
    /// Input ended while `expected` was still required
    #[error("unexpected end of input, expected {expected}")]
    UnexpectedEOF { expected: String, position: usize },
    /// Found an item that does not fit
    #[error("expected {expected}, found {found}")]
    Unexpected {
        expected: String,
        found: String,
        position: usize,
    },
    /// No alternative matched
    #[error("no alternative matched")]
    NoAlternative { position: usize },
    /// Explicit failure; alternatives never backtrack over it
    #[error("{message}")]
    Failure { message: String, position: usize },
    #[error("{inner} in {context}")]
    WithContext {
        context: String,
        inner: Box<ParseError>,
    },
}

impl ParseError {
    pub fn position(&self) -> usize {
        match self {
            ParseError::UnexpectedEOF { position, .. }
            | ParseError::Unexpected { position, .. }
            | ParseError::NoAlternative { position }
            | ParseError::Failure { position, .. } => *position,
            ParseError::WithContext { inner, .. } => inner.position(),
        }
    }

    /// Wraps the error in a context label; the innermost label wins when
    /// nested so messages name the most specific construct.
    pub fn with_context(self, context: &str) -> Self {
        match self {
            ParseError::WithContext { .. } => self,
            inner => ParseError::WithContext {
                context: context.to_string(),
                inner: Box::new(inner),
            },
        }
    }

    pub fn is_fatal(&self) -> bool {
        match self {
            ParseError::Failure { .. } => true,
            ParseError::WithContext { inner, .. } => inner.is_fatal(),
            _ => false,
        }
    }

    /// Whether a parser started at `pos` must propagate this error instead
    /// of backtracking.
    pub fn is_committed(&self, pos: usize) -> bool {
        self.is_fatal() || self.position() > pos
    }

    pub fn is_eof(&self) -> bool {
        match self {
            ParseError::UnexpectedEOF { .. } => true,
            ParseError::WithContext { inner, .. } => inner.is_eof(),
            _ => false,
        }
    }
}
