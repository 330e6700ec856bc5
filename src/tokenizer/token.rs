use nom::{
    branch::alt,
    bytes::complete::{tag, take_until1, take_while},
    character::complete::satisfy,
    combinator::{map, recognize, rest, value, verify},
    error::{context, VerboseError},
    sequence::pair,
    IResult,
};
use core::fmt;

use thiserror::Error;

use crate::ast::Location;

use super::{
    keyword::Keyword,
    literal::{parse_literal, Literal},
    symbol::{parse_delimiter, parse_operator, Delimiter, Operator, ISLAND_OPEN},
    whitespace::{parse_newline, parse_whitespace},
};

#[derive(Debug, Clone, PartialEq)]
pub enum Token {
    // Template text outside of `<%= ... %>`
    Text(String),
    // Keywords
    Keyword(Keyword),
    // Identifiers
    Identifier(String),
    // Symbols
    Operator(Operator),
    Delimiter(Delimiter),
    // Literals
    Literal(Literal),
    // Formatting
    Whitespace(String),
    Newline,
}

impl Token {
    pub fn is_whitespace(&self) -> bool {
        matches!(self, Token::Whitespace(_))
    }

    pub fn is_newline(&self) -> bool {
        matches!(self, Token::Newline)
    }
}

/// Short human readable form used in syntax error messages.
impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Token::Text(text) => write!(f, "text \"{}\"", text),
            Token::Keyword(keyword) => write!(f, "keyword '{}'", keyword),
            Token::Identifier(name) => write!(f, "identifier '{}'", name),
            Token::Operator(operator) => write!(f, "'{}'", operator),
            Token::Delimiter(delimiter) => write!(f, "'{}'", delimiter),
            Token::Literal(Literal::String(s)) => write!(f, "string '{}'", s),
            Token::Literal(Literal::Integer(i)) => write!(f, "number {}", i),
            Token::Literal(Literal::Float(n)) => write!(f, "number {}", n),
            Token::Whitespace(_) => f.write_str("whitespace"),
            Token::Newline => f.write_str("newline"),
        }
    }
}

/// Which grammar applies at the current position.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Mode {
    Text,
    Expression,
}

#[derive(Debug, Clone)]
pub struct Tokenizer {
    current_position: usize,
    current_line: usize,
    current_column: usize,
    mode: Mode,
}

impl Default for Tokenizer {
    fn default() -> Self {
        Self::new()
    }
}

impl Tokenizer {
    pub fn new() -> Self {
        Self {
            current_position: 0,
            current_line: 1,   // 1-based
            current_column: 1, // 1-based
            mode: Mode::Text,
        }
    }

    /// Position just past the last consumed character.
    pub fn location(&self) -> Location {
        Location::new(self.current_line, self.current_column)
    }

    #[tracing::instrument(level = "debug", skip(input))]
    pub fn tokenize(&mut self, input: &str) -> TokenizerResult<Vec<TokenSpan>> {
        let mut tokens = Vec::new();
        let mut remaining = input;

        while !remaining.is_empty() {
            let start_position = self.current_position;
            let start_line = self.current_line;
            let start_column = self.current_column;

            let result = match self.mode {
                Mode::Text => alt((parse_island_open, parse_template_text))(remaining),
                Mode::Expression => alt((
                    // Formatting
                    parse_whitespace,
                    parse_newline,
                    // Literals
                    parse_literal,
                    // Code elements
                    parse_operator,
                    parse_delimiter,
                    parse_identifier,
                ))(remaining),
            };

            match result {
                Ok((new_remaining, token)) => {
                    let consumed = &remaining[..(remaining.len() - new_remaining.len())];
                    self.update_position(consumed);

                    match token {
                        Token::Delimiter(Delimiter::IslandOpen) => self.mode = Mode::Expression,
                        Token::Delimiter(Delimiter::IslandClose) => self.mode = Mode::Text,
                        _ => {}
                    }

                    tokens.push(TokenSpan {
                        token,
                        start: start_position,
                        end: self.current_position,
                        line: start_line,
                        column: start_column,
                    });

                    remaining = new_remaining;
                }
                Err(e) => {
                    let found = remaining.chars().take(20).collect::<String>();
                    let span = Span {
                        start: self.current_position,
                        end: self.current_position + 1,
                        line: self.current_line,
                        column: self.current_column,
                    };
                    let error = match e {
                        nom::Err::Incomplete(e) => TokenizerError::ParseError {
                            message: format!("Incomplete input, {:?}", e),
                            found,
                            span,
                        },
                        nom::Err::Error(e) | nom::Err::Failure(e) => TokenizerError::ParseError {
                            message: nom::error::convert_error(remaining, e),
                            found,
                            span,
                        },
                    };
                    tracing::error!("{}", error);
                    return Err(error);
                }
            }
        }

        Ok(tokens)
    }

    fn update_position(&mut self, text: &str) {
        for c in text.chars() {
            self.current_position += c.len_utf8();
            if c == '\n' {
                self.current_line += 1;
                self.current_column = 1;
            } else {
                self.current_column += 1;
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct TokenSpan {
    pub token: Token,
    pub start: usize,
    pub end: usize,
    pub line: usize,
    pub column: usize,
}

impl TokenSpan {
    pub fn location(&self) -> Location {
        Location::new(self.line, self.column)
    }
}

impl fmt::Display for TokenSpan {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.token.fmt(f)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Span {
    pub start: usize,
    pub end: usize,
    pub line: usize,
    pub column: usize,
}

impl Span {
    pub fn location(&self) -> Location {
        Location::new(self.line, self.column)
    }
}

impl fmt::Display for Span {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "line: {}, column: {}, start: {}, end: {}",
            self.line, self.column, self.start, self.end
        )
    }
}

#[tracing::instrument(level = "debug", skip(input))]
fn parse_island_open(input: &str) -> ParserResult<Token> {
    context(
        "expression start",
        value(Token::Delimiter(Delimiter::IslandOpen), tag(ISLAND_OPEN)),
    )(input)
}

/// Literal text up to the next island, or to the end of input.
#[tracing::instrument(level = "debug", skip(input))]
fn parse_template_text(input: &str) -> ParserResult<Token> {
    context(
        "template text",
        map(
            alt((
                take_until1(ISLAND_OPEN),
                verify(rest, |s: &str| !s.is_empty()),
            )),
            |text: &str| Token::Text(text.to_string()),
        ),
    )(input)
}

#[tracing::instrument(level = "debug", skip(input))]
fn parse_identifier(input: &str) -> ParserResult<Token> {
    let (input, id) = context(
        "identifier",
        recognize(pair(
            satisfy(|c: char| c.is_ascii_alphabetic() || c == '_'),
            take_while(|c: char| c.is_ascii_alphanumeric() || c == '_'),
        )),
    )(input)?;

    if let Ok(kw) = Keyword::try_from(id) {
        return Ok((input, Token::Keyword(kw)));
    }

    Ok((input, Token::Identifier(id.to_string())))
}

pub type ParserResult<'a, T> = IResult<&'a str, T, VerboseError<&'a str>>;

pub type TokenizerResult<T> = Result<T, TokenizerError>;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum TokenizerError {
    #[error("Parse error: {message} at position {span}")]
    ParseError {
        message: String,
        found: String,
        span: Span,
    },
}
