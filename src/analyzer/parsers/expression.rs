//! Expression grammar.
//!
//! ```text
//! expression := primary suffix*
//! suffix     := '(' [expression (',' expression)*] ')'
//!             | '.' identifier
//!             | '[' expression ']'
//! primary    := number | string | ternary | closure | identifier
//!             | list | dictionary | '(' expression ')'
//! ternary    := 'if' '(' expression ',' expression ',' expression ')'
//! closure    := 'fn' '(' [identifier (',' identifier)*] ')' '->' expression
//! list       := '[' [expression (',' expression)*] ']'
//! dictionary := '{' [expression ':' expression (',' ...)*] '}'
//! ```

use std::{cell::Cell, sync::Arc};

use super::super::{core::*, prelude::*};
use super::*;
use crate::ast::{Block, Expression, FunctionLiteral};
use crate::tokenizer::literal::Literal;

/// Deepest expression nesting accepted, counting both bracketed nesting and
/// suffix chains. Deeper input is a syntax error rather than a stack
/// overflow.
pub const MAX_NESTING: usize = 64;

thread_local! {
    static NESTING: Cell<usize> = const { Cell::new(0) };
}

pub fn parse_expression() -> impl Parser<TokenSpan, Expression> {
    Nested {
        parser: label(tuple2(parse_primary(), many(parse_suffix())), "expression"),
    }
}

/// An expression parser that counts how deep it has recursed on this
/// thread.
struct Nested<P> {
    parser: P,
}

struct NestingGuard {
    depth: usize,
}

impl NestingGuard {
    fn enter() -> Self {
        let depth = NESTING.with(|cell| {
            let depth = cell.get() + 1;
            cell.set(depth);
            depth
        });
        Self { depth }
    }
}

impl Drop for NestingGuard {
    fn drop(&mut self) {
        NESTING.with(|cell| cell.set(self.depth - 1));
    }
}

impl<P> Parser<TokenSpan, Expression> for Nested<P>
where
    P: Parser<TokenSpan, (Expression, Vec<Suffix>)>,
{
    fn parse(&self, input: &[TokenSpan], pos: usize) -> ParseResult<Expression> {
        let guard = NestingGuard::enter();
        if guard.depth > MAX_NESTING {
            return Err(too_deep(pos));
        }
        let (next, (primary, suffixes)) = self.parser.parse(input, pos)?;
        if suffixes.len() > MAX_NESTING {
            return Err(too_deep(pos));
        }
        let expression = suffixes
            .into_iter()
            .fold(primary, |target, suffix| suffix.apply(target));
        Ok((next, expression))
    }
}

fn too_deep(position: usize) -> ParseError {
    ParseError::Failure {
        message: format!("expression nested deeper than {} levels", MAX_NESTING),
        position,
    }
}

/// Postfix operation applied to the expression on its left.
enum Suffix {
    Call(Vec<Expression>),
    Member(ast::Identifier),
    Index(Expression, Location),
}

impl Suffix {
    fn apply(self, target: Expression) -> Expression {
        match self {
            Suffix::Call(arguments) => Expression::FunctionCall {
                location: target.location(),
                function: Box::new(target),
                arguments,
            },
            Suffix::Member(member) => Expression::MemberAccess {
                location: member.location,
                parent: Box::new(target),
                member,
            },
            Suffix::Index(key, location) => Expression::CollectionAccess {
                collection: Box::new(target),
                key: Box::new(key),
                location,
            },
        }
    }
}

fn parse_suffix() -> impl Parser<TokenSpan, Suffix> {
    choice(vec![
        Box::new(map(parse_arguments(), Suffix::Call)),
        Box::new(map(
            preceded(as_unit(parse_operator(Operator::Dot)), parse_identifier()),
            Suffix::Member,
        )),
        Box::new(map(
            tuple3(
                parse_open_bracket(),
                lazy(parse_expression),
                parse_close_bracket(),
            ),
            |(location, key, _)| Suffix::Index(key, location),
        )),
    ])
}

fn parse_arguments() -> impl Parser<TokenSpan, Vec<Expression>> {
    with_context(
        delimited(
            as_unit(parse_open_paren()),
            separated_list(lazy(parse_expression), parse_comma()),
            parse_close_paren(),
        ),
        "argument list",
    )
}

fn parse_primary() -> impl Parser<TokenSpan, Expression> {
    choice(vec![
        Box::new(parse_number()),
        Box::new(parse_string()),
        Box::new(parse_ternary()),
        Box::new(parse_closure()),
        Box::new(map(parse_identifier(), Expression::Identifier)),
        Box::new(parse_list()),
        Box::new(parse_dictionary()),
        Box::new(parse_parenthesized()),
    ])
}

fn parse_number() -> impl Parser<TokenSpan, Expression> {
    satisfy("number", |span: &TokenSpan| match span.token {
        Token::Literal(Literal::Integer(value)) => Some(Expression::LongLiteral {
            value,
            location: span.location(),
        }),
        Token::Literal(Literal::Float(value)) => Some(Expression::DoubleLiteral {
            value,
            location: span.location(),
        }),
        _ => None,
    })
}

fn parse_string() -> impl Parser<TokenSpan, Expression> {
    satisfy("string", |span: &TokenSpan| match &span.token {
        Token::Literal(Literal::String(value)) => {
            Some(Expression::string(value.clone(), span.location()))
        }
        _ => None,
    })
}

fn parse_ternary() -> impl Parser<TokenSpan, Expression> {
    with_context(
        map(
            tuple2(
                parse_keyword(Keyword::If),
                delimited(
                    as_unit(parse_open_paren()),
                    tuple3(
                        lazy(parse_expression),
                        preceded(parse_comma(), lazy(parse_expression)),
                        preceded(parse_comma(), lazy(parse_expression)),
                    ),
                    parse_close_paren(),
                ),
            ),
            |(location, (condition, then_value, else_value))| Expression::TernaryIf {
                condition: Box::new(condition),
                then_value: Box::new(then_value),
                else_value: Box::new(else_value),
                location,
            },
        ),
        "if expression",
    )
}

fn parse_closure() -> impl Parser<TokenSpan, Expression> {
    with_context(
        map(
            tuple3(
                parse_keyword(Keyword::Fn),
                delimited(
                    as_unit(parse_open_paren()),
                    separated_list(parse_identifier(), parse_comma()),
                    parse_close_paren(),
                ),
                preceded(
                    as_unit(parse_operator(Operator::ThinArrow)),
                    lazy(parse_expression),
                ),
            ),
            |(location, parameters, body)| {
                let body_location = body.location();
                Expression::FunctionLiteral(Arc::new(FunctionLiteral {
                    parameters,
                    body: Block::new(vec![body], body_location),
                    location,
                }))
            },
        ),
        "closure",
    )
}

fn parse_list() -> impl Parser<TokenSpan, Expression> {
    with_context(
        map(
            tuple3(
                parse_open_bracket(),
                separated_list(lazy(parse_expression), parse_comma()),
                parse_close_bracket(),
            ),
            |(location, elements, _)| Expression::ListLiteral { elements, location },
        ),
        "list",
    )
}

fn parse_dictionary() -> impl Parser<TokenSpan, Expression> {
    with_context(
        map(
            tuple3(
                parse_open_brace(),
                separated_list(
                    tuple2(
                        lazy(parse_expression),
                        preceded(parse_colon(), lazy(parse_expression)),
                    ),
                    parse_comma(),
                ),
                parse_close_brace(),
            ),
            |(location, entries, _)| Expression::DictionaryLiteral { entries, location },
        ),
        "dictionary",
    )
}

fn parse_parenthesized() -> impl Parser<TokenSpan, Expression> {
    delimited(
        as_unit(parse_open_paren()),
        lazy(parse_expression),
        parse_close_paren(),
    )
}

#[cfg(test)]
mod tests {
    use super::super::tests::spans;
    use super::*;
    use pretty_assertions::assert_eq;

    fn parse(text: &str) -> ParseResult<Expression> {
        parse_expression().parse(&spans(&format!("<%={}%>", text)), 1)
    }

    fn parse_ok(text: &str) -> Expression {
        let (_, expression) = parse(text).unwrap();
        expression
    }

    #[test]
    fn test_numbers() {
        assert_eq!(
            parse_ok("-987"),
            Expression::LongLiteral {
                value: -987,
                location: Location::new(1, 4)
            }
        );
        assert_eq!(
            parse_ok("123.45e6"),
            Expression::DoubleLiteral {
                value: 123.45e6,
                location: Location::new(1, 4)
            }
        );
    }

    #[test]
    fn test_call_chain() {
        let expression = parse_ok("f(1)(2)");
        let Expression::FunctionCall {
            function,
            arguments,
            ..
        } = expression
        else {
            panic!("expected call");
        };
        assert_eq!(arguments.len(), 1);
        assert!(matches!(*function, Expression::FunctionCall { .. }));
    }

    #[test]
    fn test_member_and_index_chain() {
        let expression = parse_ok("list[0]['p'].timeMillis");
        let Expression::MemberAccess { parent, member, .. } = expression else {
            panic!("expected member access");
        };
        assert_eq!(member.name, "timeMillis");
        assert_eq!(member.location, Location::new(1, 17));
        let Expression::CollectionAccess { collection, key, .. } = *parent else {
            panic!("expected collection access");
        };
        assert_eq!(*key, Expression::string("p", Location::new(1, 12)));
        assert!(matches!(*collection, Expression::CollectionAccess { .. }));
    }

    #[test]
    fn test_ternary() {
        let expression = parse_ok("if(eq(a, 1), 'one', 'other')");
        let Expression::TernaryIf {
            condition,
            else_value,
            location,
            ..
        } = expression
        else {
            panic!("expected if");
        };
        assert_eq!(location, Location::new(1, 4));
        assert!(matches!(*condition, Expression::FunctionCall { .. }));
        assert_eq!(*else_value, Expression::string("other", Location::new(1, 24)));
    }

    #[test]
    fn test_closure_call() {
        let expression = parse_ok("(fn(a,b) -> add(a,b))(3,4)");
        let Expression::FunctionCall {
            function,
            arguments,
            ..
        } = expression
        else {
            panic!("expected call");
        };
        assert_eq!(arguments.len(), 2);
        let Expression::FunctionLiteral(literal) = *function else {
            panic!("expected closure");
        };
        let names: Vec<&str> = literal
            .parameters
            .iter()
            .map(|parameter| parameter.name.as_str())
            .collect();
        assert_eq!(names, vec!["a", "b"]);
        assert_eq!(literal.body.expressions.len(), 1);
    }

    #[test]
    fn test_empty_collections() {
        assert!(matches!(
            parse_ok("[]"),
            Expression::ListLiteral { elements, .. } if elements.is_empty()
        ));
        assert!(matches!(
            parse_ok("{}"),
            Expression::DictionaryLiteral { entries, .. } if entries.is_empty()
        ));
        assert!(matches!(
            parse_ok("f()"),
            Expression::FunctionCall { arguments, .. } if arguments.is_empty()
        ));
        assert!(matches!(
            parse_ok("fn() -> 1"),
            Expression::FunctionLiteral(literal) if literal.parameters.is_empty()
        ));
    }

    #[test]
    fn test_dictionary() {
        let Expression::DictionaryLiteral { entries, .. } = parse_ok("{'a': 1, b: [2]}") else {
            panic!("expected dictionary");
        };
        assert_eq!(entries.len(), 2);
        assert!(matches!(entries[1].0, Expression::Identifier(_)));
        assert!(matches!(entries[1].1, Expression::ListLiteral { .. }));
    }

    #[test]
    fn test_dangling_separators() {
        for text in ["f(a,)", "[,]", "[a,]", "{,}", "{a:b,}", "{:b}", "{a:}", "f(,a)"] {
            let result = parse(text);
            // either the expression fails or it stops before the island end
            let stopped_early = match &result {
                Ok((pos, _)) => *pos != spans(&format!("<%={}%>", text)).len() - 1,
                Err(_) => true,
            };
            assert!(stopped_early, "{} should not parse", text);
        }
    }

    #[test]
    fn test_nesting_limit() {
        let lists = |depth: usize| format!("{}1{}", "[".repeat(depth), "]".repeat(depth));
        assert!(parse(&lists(MAX_NESTING - 1)).is_ok());
        let error = parse(&lists(MAX_NESTING + 10)).unwrap_err();
        assert!(
            error.to_string().starts_with("expression nested deeper than 64 levels"),
            "{}",
            error
        );
        // the counter unwinds after a failure
        assert!(parse(&lists(MAX_NESTING - 1)).is_ok());

        let members = |count: usize| format!("a{}", ".b".repeat(count));
        assert!(parse(&members(MAX_NESTING)).is_ok());
        assert!(parse(&members(MAX_NESTING + 1)).is_err());
    }

    #[test]
    fn test_error_names_expected() {
        let error = parse("[1,]").unwrap_err();
        assert_eq!(
            error.to_string(),
            "expected expression, found ']' in list"
        );
        assert_eq!(error.position(), 4);
    }
}
