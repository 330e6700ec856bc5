use nom::{
    branch::alt,
    bytes::complete::take_while,
    character::complete::{char, digit1, one_of},
    combinator::{map, map_res, opt, recognize},
    error::context,
    sequence::{delimited, pair, tuple},
};

use super::token::{ParserResult, Token};

#[derive(Debug, Clone, PartialEq)]
pub enum Literal {
    String(String),
    Integer(i64),
    Float(f64),
}

#[tracing::instrument(level = "debug", skip(input))]
fn parse_string_literal(input: &str) -> ParserResult<Literal> {
    context(
        "string literal",
        map(
            delimited(char('\''), take_while(|c| c != '\''), char('\'')),
            |content: &str| Literal::String(content.to_string()),
        ),
    )(input)
}

fn exponent(input: &str) -> ParserResult<&str> {
    recognize(tuple((one_of("eE"), opt(one_of("+-")), digit1)))(input)
}

fn fraction(input: &str) -> ParserResult<&str> {
    recognize(pair(char('.'), digit1))(input)
}

/// A float needs a fraction, an exponent, or both.
#[tracing::instrument(level = "debug", skip(input))]
fn parse_float_literal(input: &str) -> ParserResult<Literal> {
    context(
        "float literal",
        map_res(
            recognize(tuple((
                opt(char('-')),
                digit1,
                alt((recognize(pair(fraction, opt(exponent))), exponent)),
            ))),
            |s: &str| s.parse::<f64>().map(Literal::Float),
        ),
    )(input)
}

#[tracing::instrument(level = "debug", skip(input))]
fn parse_integer_literal(input: &str) -> ParserResult<Literal> {
    context(
        "integer literal",
        map_res(recognize(pair(opt(char('-')), digit1)), |s: &str| {
            s.parse::<i64>().map(Literal::Integer)
        }),
    )(input)
}

#[tracing::instrument(level = "debug", skip(input))]
pub fn parse_literal(input: &str) -> ParserResult<Token> {
    context(
        "literal",
        map(
            alt((
                parse_string_literal,
                parse_float_literal,
                parse_integer_literal,
            )),
            Token::Literal,
        ),
    )(input)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_string_literal() {
        let (rest, literal) = parse_string_literal("'US/Eastern', x").unwrap();
        assert_eq!(literal, Literal::String("US/Eastern".to_string()));
        assert_eq!(rest, ", x");

        let (_, literal) = parse_string_literal("''").unwrap();
        assert_eq!(literal, Literal::String(String::new()));

        assert!(parse_string_literal("'unterminated").is_err());
    }

    #[test]
    fn test_integer_literal() {
        let (rest, literal) = parse_integer_literal("123").unwrap();
        assert_eq!(literal, Literal::Integer(123));
        assert_eq!(rest, "");

        let (rest, literal) = parse_integer_literal("-987)").unwrap();
        assert_eq!(literal, Literal::Integer(-987));
        assert_eq!(rest, ")");
    }

    #[test]
    fn test_float_literal() {
        let test_cases = [
            ("123.45", 123.45),
            ("-0.5", -0.5),
            ("123.45e6", 123.45e6),
            ("1e3", 1000.0),
            ("2.5E-2", 0.025),
        ];
        for (input, expected) in test_cases {
            let (rest, literal) = parse_float_literal(input).unwrap();
            assert_eq!(literal, Literal::Float(expected), "input {}", input);
            assert_eq!(rest, "");
        }
    }

    #[test]
    fn test_literal_prefers_float() {
        let (_, token) = parse_literal("248.12").unwrap();
        assert_eq!(token, Token::Literal(Literal::Float(248.12)));

        // a trailing dot is member access, not a fraction
        let (rest, token) = parse_literal("7.name").unwrap();
        assert_eq!(token, Token::Literal(Literal::Integer(7)));
        assert_eq!(rest, ".name");
    }

    #[test]
    fn test_integer_overflow_is_rejected() {
        assert!(parse_literal("99999999999999999999").is_err());
    }
}
