pub mod expression;
pub mod template;

use super::{core::*, prelude::*};
use crate::ast::{self, Location};
use crate::tokenizer::{
    keyword::Keyword,
    symbol::{Delimiter, Operator},
    token::{Token, TokenSpan},
};

// 基本的なパーサー
pub fn parse_identifier() -> impl Parser<TokenSpan, ast::Identifier> {
    satisfy("identifier", |span: &TokenSpan| match &span.token {
        Token::Identifier(name) => Some(ast::Identifier::new(name.clone(), span.location())),
        _ => None,
    })
}

pub fn parse_keyword(keyword: Keyword) -> impl Parser<TokenSpan, Location> {
    satisfy(&format!("'{}'", keyword), move |span: &TokenSpan| {
        (span.token == Token::Keyword(keyword)).then(|| span.location())
    })
}

pub fn parse_operator(operator: Operator) -> impl Parser<TokenSpan, Location> {
    satisfy(&format!("'{}'", operator), move |span: &TokenSpan| {
        (span.token == Token::Operator(operator)).then(|| span.location())
    })
}

fn parse_delimiter(delimiter: Delimiter) -> impl Parser<TokenSpan, Location> {
    satisfy(&format!("'{}'", delimiter), move |span: &TokenSpan| {
        (span.token == Token::Delimiter(delimiter)).then(|| span.location())
    })
}

// 区切り文字パーサー
pub fn parse_comma() -> impl Parser<TokenSpan, ()> {
    as_unit(parse_delimiter(Delimiter::Comma))
}

pub fn parse_colon() -> impl Parser<TokenSpan, ()> {
    as_unit(parse_delimiter(Delimiter::Colon))
}

pub fn parse_open_paren() -> impl Parser<TokenSpan, Location> {
    parse_delimiter(Delimiter::OpenParen)
}

pub fn parse_close_paren() -> impl Parser<TokenSpan, ()> {
    as_unit(parse_delimiter(Delimiter::CloseParen))
}

pub fn parse_open_bracket() -> impl Parser<TokenSpan, Location> {
    parse_delimiter(Delimiter::OpenBracket)
}

pub fn parse_close_bracket() -> impl Parser<TokenSpan, ()> {
    as_unit(parse_delimiter(Delimiter::CloseBracket))
}

pub fn parse_open_brace() -> impl Parser<TokenSpan, Location> {
    parse_delimiter(Delimiter::OpenBrace)
}

pub fn parse_close_brace() -> impl Parser<TokenSpan, ()> {
    as_unit(parse_delimiter(Delimiter::CloseBrace))
}

pub fn parse_island_open() -> impl Parser<TokenSpan, ()> {
    as_unit(parse_delimiter(Delimiter::IslandOpen))
}

pub fn parse_island_close() -> impl Parser<TokenSpan, ()> {
    as_unit(parse_delimiter(Delimiter::IslandClose))
}
