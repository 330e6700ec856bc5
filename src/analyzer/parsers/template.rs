//! Template grammar: literal text interleaved with `<%= expression %>`
//! islands.

use super::super::{core::*, prelude::*};
use super::expression::parse_expression;
use super::*;
use crate::ast::Expression;

pub fn parse_template() -> impl Parser<TokenSpan, Vec<Expression>> {
    many(parse_segment())
}

pub fn parse_segment() -> impl Parser<TokenSpan, Expression> {
    label(
        choice(vec![Box::new(parse_text()), Box::new(parse_island())]),
        "template text or '<%='",
    )
}

fn parse_text() -> impl Parser<TokenSpan, Expression> {
    satisfy("template text", |span: &TokenSpan| match &span.token {
        Token::Text(text) => Some(Expression::string(text.clone(), span.location())),
        _ => None,
    })
}

fn parse_island() -> impl Parser<TokenSpan, Expression> {
    delimited(parse_island_open(), parse_expression(), parse_island_close())
}
