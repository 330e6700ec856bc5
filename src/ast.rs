use core::fmt;
use std::sync::Arc;

use thiserror::Error;

/// Source position of a node, 1-based.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default)]
pub struct Location {
    pub line: usize,
    pub column: usize,
}

impl Location {
    pub fn new(line: usize, column: usize) -> Self {
        Self { line, column }
    }
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "line {}, column {}", self.line, self.column)
    }
}

/// Template Definition
///
/// A block is one renderable unit: the literal text segments and the
/// expression islands of a template, in source order.
///
/// # Example
/// ```text
/// /data/<%=timeFormat(yesterday(), 'yyyy/MM/dd')%>/part-*
/// ```
/// parses into three expressions: the string `/data/`, a function call, and
/// the string `/part-*`.
///
/// # Evaluation
/// - exactly one expression: the block evaluates to that expression's value
/// - otherwise: the rendered forms of all expressions are concatenated
#[derive(Debug, Clone, PartialEq)]
pub struct Block {
    pub expressions: Vec<Expression>,
    pub location: Location,
}

impl Block {
    pub fn new(expressions: Vec<Expression>, location: Location) -> Self {
        Self {
            expressions,
            location,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Identifier {
    pub name: String,
    pub location: Location,
}

impl Identifier {
    pub fn new(name: impl Into<String>, location: Location) -> Self {
        Self {
            name: name.into(),
            location,
        }
    }
}

/// Closure definition: `fn(a, b) -> expr`.
#[derive(Debug, Clone, PartialEq)]
pub struct FunctionLiteral {
    pub parameters: Vec<Identifier>,
    pub body: Block,
    pub location: Location,
}

/// Expression nodes of the template language.
///
/// Nodes are produced once by the parser and never mutated; the evaluator
/// walks them with a single recursive match.
#[derive(Debug, Clone, PartialEq)]
pub enum Expression {
    Block(Block),
    StringLiteral {
        value: String,
        location: Location,
    },
    LongLiteral {
        value: i64,
        location: Location,
    },
    DoubleLiteral {
        value: f64,
        location: Location,
    },
    Identifier(Identifier),
    FunctionCall {
        function: Box<Expression>,
        arguments: Vec<Expression>,
        location: Location,
    },
    TernaryIf {
        condition: Box<Expression>,
        then_value: Box<Expression>,
        else_value: Box<Expression>,
        location: Location,
    },
    ListLiteral {
        elements: Vec<Expression>,
        location: Location,
    },
    DictionaryLiteral {
        entries: Vec<(Expression, Expression)>,
        location: Location,
    },
    CollectionAccess {
        collection: Box<Expression>,
        key: Box<Expression>,
        location: Location,
    },
    MemberAccess {
        parent: Box<Expression>,
        member: Identifier,
        location: Location,
    },
    // shared so closures can hold the body without copying the tree
    FunctionLiteral(Arc<FunctionLiteral>),
}

impl Expression {
    pub fn location(&self) -> Location {
        match self {
            Expression::Block(block) => block.location,
            Expression::Identifier(identifier) => identifier.location,
            Expression::FunctionLiteral(literal) => literal.location,
            Expression::StringLiteral { location, .. }
            | Expression::LongLiteral { location, .. }
            | Expression::DoubleLiteral { location, .. }
            | Expression::FunctionCall { location, .. }
            | Expression::TernaryIf { location, .. }
            | Expression::ListLiteral { location, .. }
            | Expression::DictionaryLiteral { location, .. }
            | Expression::CollectionAccess { location, .. }
            | Expression::MemberAccess { location, .. } => *location,
        }
    }

    pub fn string(value: impl Into<String>, location: Location) -> Self {
        Expression::StringLiteral {
            value: value.into(),
            location,
        }
    }

    pub fn identifier(name: impl Into<String>, location: Location) -> Self {
        Expression::Identifier(Identifier::new(name, location))
    }
}

/// Failure to turn template text into a [`Block`].
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ASTError {
    /// Invalid character or token
    #[error("Lexical error at {location}: {message}")]
    Lexical { message: String, location: Location },
    /// Tokens that do not form a valid template
    #[error("Syntax error at {location}: {message}")]
    Syntax { message: String, location: Location },
}

impl ASTError {
    pub fn location(&self) -> Location {
        match self {
            ASTError::Lexical { location, .. } | ASTError::Syntax { location, .. } => *location,
        }
    }
}

pub type ASTResult<T> = Result<T, ASTError>;
