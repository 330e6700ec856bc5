//! # Symbol Token Handling
//!
//! Symbols recognized inside an expression island, plus the island
//! markers themselves.
//!
//! * [`Operator`]: the closure arrow and member access
//! * [`Delimiter`]: brackets, separators and the `<%=` / `%>` markers
//!
//! Multi-character symbols are matched before single-character ones so that
//! `->` is never split.

use core::fmt;

use nom::{
    branch::alt,
    bytes::complete::tag,
    combinator::{map, value},
    error::context,
};
use strum_macros::{AsRefStr, Display, EnumString};

use super::token::{ParserResult, Token};

/// Opening marker of an expression island.
pub const ISLAND_OPEN: &str = "<%=";
/// Closing marker of an expression island.
pub const ISLAND_CLOSE: &str = "%>";

#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumString, Display, AsRefStr)]
pub enum Operator {
    /// Closure body arrow (`->`)
    #[strum(serialize = "->")]
    ThinArrow,
    /// Member access operator (`.`)
    #[strum(serialize = ".")]
    Dot,
}

/// Structural symbols.
///
/// `Display` is written by hand: brace characters in strum serialize
/// strings break the generated format string.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Delimiter {
    OpenParen,
    CloseParen,
    OpenBracket,
    CloseBracket,
    OpenBrace,
    CloseBrace,
    Comma,
    Colon,
    IslandOpen,
    IslandClose,
}

impl Delimiter {
    pub fn as_str(&self) -> &'static str {
        match self {
            Delimiter::OpenParen => "(",
            Delimiter::CloseParen => ")",
            Delimiter::OpenBracket => "[",
            Delimiter::CloseBracket => "]",
            Delimiter::OpenBrace => "{",
            Delimiter::CloseBrace => "}",
            Delimiter::Comma => ",",
            Delimiter::Colon => ":",
            Delimiter::IslandOpen => ISLAND_OPEN,
            Delimiter::IslandClose => ISLAND_CLOSE,
        }
    }
}

impl fmt::Display for Delimiter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Parses an operator token from the input string.
///
/// # Examples
///
/// ```
/// # use pathmetrics::tokenizer::symbol::{parse_operator, Operator};
/// # use pathmetrics::tokenizer::token::Token;
/// let (rest, token) = parse_operator("-> add(a, b)").unwrap();
/// assert_eq!(token, Token::Operator(Operator::ThinArrow));
/// assert_eq!(rest, " add(a, b)");
/// ```
#[tracing::instrument(level = "debug", skip(input))]
pub fn parse_operator(input: &str) -> ParserResult<Token> {
    context(
        "operator",
        map(
            alt((
                value(Operator::ThinArrow, tag("->")),
                value(Operator::Dot, tag(".")),
            )),
            Token::Operator,
        ),
    )(input)
}

/// Parses a delimiter token, including the island closing marker.
#[tracing::instrument(level = "debug", skip(input))]
pub fn parse_delimiter(input: &str) -> ParserResult<Token> {
    context(
        "delimiter",
        map(
            alt((
                value(Delimiter::IslandClose, tag(ISLAND_CLOSE)),
                value(Delimiter::OpenParen, tag("(")),
                value(Delimiter::CloseParen, tag(")")),
                value(Delimiter::OpenBracket, tag("[")),
                value(Delimiter::CloseBracket, tag("]")),
                value(Delimiter::OpenBrace, tag("{")),
                value(Delimiter::CloseBrace, tag("}")),
                value(Delimiter::Comma, tag(",")),
                value(Delimiter::Colon, tag(":")),
            )),
            Token::Delimiter,
        ),
    )(input)
}
