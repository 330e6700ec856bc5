//! # Whitespace Token Handling
//!
//! Whitespace inside an expression island separates tokens. It is kept as
//! tokens so positions stay exact, and is dropped by the
//! [`TokenPreprocessor`](crate::preprocessor::TokenPreprocessor) before
//! parsing. Whitespace in template text is part of the text token and is
//! never seen here.

use nom::{
    branch::alt,
    bytes::complete::{tag, take_while1},
    combinator::map,
    error::context,
};

use super::token::{ParserResult, Token};

/// Parses spaces and tabs.
///
/// # Examples
///
/// ```
/// # use pathmetrics::tokenizer::whitespace::parse_whitespace;
/// # use pathmetrics::tokenizer::token::Token;
/// let (rest, token) = parse_whitespace("  \tfoo").unwrap();
/// assert_eq!(token, Token::Whitespace("  \t".to_string()));
/// assert_eq!(rest, "foo");
/// ```
#[tracing::instrument(level = "debug", skip(input))]
pub fn parse_whitespace(input: &str) -> ParserResult<Token> {
    context(
        "whitespace expected",
        map(take_while1(|c| c == ' ' || c == '\t'), |ws: &str| {
            Token::Whitespace(ws.to_string())
        }),
    )(input)
}

/// Parses `\n` or `\r\n`.
#[tracing::instrument(level = "debug", skip(input))]
pub fn parse_newline(input: &str) -> ParserResult<Token> {
    context(
        "newline expected",
        map(alt((tag("\r\n"), tag("\n"))), |_| Token::Newline),
    )(input)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_newline() {
        let (rest, token) = parse_newline("\r\nx").unwrap();
        assert_eq!(token, Token::Newline);
        assert_eq!(rest, "x");
        assert!(parse_newline("x").is_err());
    }

    #[test]
    fn test_whitespace_requires_input() {
        assert!(parse_whitespace("").is_err());
        assert!(parse_whitespace("a").is_err());
    }
}
