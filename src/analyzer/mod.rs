//! # Template Analyzer
//!
//! Parser combinators over the token stream, and the template grammar built
//! from them.
//!
//! ```text
//! Template → Tokenizer → Preprocessor → Parser → Block
//! ```
//!
//! [`parse`] runs the whole chain and maps failures to [`ASTError`] with the
//! offending source [`Location`].

pub mod combinators;
pub mod core;
pub mod parsers;
pub mod prelude;

pub use core::ParseError;
pub use core::ParseResult;
pub use core::Parser;

use tracing::debug;

use crate::ast::{ASTError, ASTResult, Block, Location};
use crate::preprocessor::{Preprocessor, TokenPreprocessor};
use crate::tokenizer::token::{TokenSpan, Tokenizer, TokenizerError};

/// Parses template text into a [`Block`].
///
/// # Examples
///
/// ```
/// use pathmetrics::analyzer::parse;
///
/// let block = parse("/data/<%=day%>/part-*").unwrap();
/// assert_eq!(block.expressions.len(), 3);
///
/// let error = parse("<%=foo@bar%>").unwrap_err();
/// assert_eq!(error.location().column, 7);
/// ```
#[tracing::instrument(level = "debug")]
pub fn parse(text: &str) -> ASTResult<Block> {
    // 1. Tokenization
    let mut tokenizer = Tokenizer::new();
    let tokens = tokenizer.tokenize(text).map_err(|e| match e {
        TokenizerError::ParseError { found, span, .. } => ASTError::Lexical {
            message: format!(
                "invalid character '{}'",
                found.chars().next().unwrap_or_default()
            ),
            location: span.location(),
        },
    })?;
    let end = tokenizer.location();

    // 2. Preprocessing
    let tokens = TokenPreprocessor::default().process(tokens);
    let location_at = |pos: usize| tokens.get(pos).map(TokenSpan::location).unwrap_or(end);

    // 3. Parsing
    let (pos, expressions) = parsers::template::parse_template()
        .parse(&tokens, 0)
        .map_err(|e| ASTError::Syntax {
            message: e.to_string(),
            location: location_at(e.position()),
        })?;

    // every token must be consumed
    if pos != tokens.len() {
        return Err(ASTError::Syntax {
            message: format!("unexpected {}", tokens[pos]),
            location: location_at(pos),
        });
    }

    debug!("parsed {} segments", expressions.len());
    Ok(Block::new(expressions, Location::new(1, 1)))
}
