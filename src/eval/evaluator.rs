use std::{cell::Cell, sync::Arc};

use thiserror::Error;
use tracing::debug;

use crate::{
    analyzer,
    ast::{ASTError, Block, Expression, FunctionLiteral, Location},
    functions::{Args, Function, FunctionCallError, FunctionResult},
};

use super::{context::Context, member::member_of, value::Dictionary, value::Value};

#[derive(Error, Debug, Clone, PartialEq)]
pub enum RenderError {
    #[error(transparent)]
    Template(#[from] ASTError),
    #[error("Unknown property {name} at {location}")]
    UnknownProperty { name: String, location: Location },
    #[error("Expression at {location} is not a function: {found}")]
    NotCallable {
        found: &'static str,
        location: Location,
    },
    #[error("Condition must be boolean expression, got {found} at {location}")]
    ConditionNotBoolean {
        found: &'static str,
        location: Location,
    },
    #[error("[] operator must be used with dictionary or list, got {found} at {location}")]
    NotCollection {
        found: &'static str,
        location: Location,
    },
    #[error("List index must be integer, got {found} at {location}")]
    IndexNotInteger {
        found: &'static str,
        location: Location,
    },
    #[error("List index {index} out of bounds for size {len} at {location}")]
    IndexOutOfBounds {
        index: i64,
        len: usize,
        location: Location,
    },
    #[error("Member {member} not found on {found} at {location}")]
    UnknownMember {
        member: String,
        found: &'static str,
        location: Location,
    },
    #[error("Cannot access member of null at {location}")]
    MemberOfNull { location: Location },
    #[error("Function call at {location} failed: {error}")]
    FunctionCall {
        error: Box<FunctionCallError>,
        location: Location,
    },
    #[error("Evaluation nested deeper than {limit} levels at {location}")]
    TooDeep { limit: usize, location: Location },
}

impl RenderError {
    /// Where in the template the error occurred.
    pub fn location(&self) -> Location {
        match self {
            RenderError::Template(error) => error.location(),
            RenderError::UnknownProperty { location, .. }
            | RenderError::NotCallable { location, .. }
            | RenderError::ConditionNotBoolean { location, .. }
            | RenderError::NotCollection { location, .. }
            | RenderError::IndexNotInteger { location, .. }
            | RenderError::IndexOutOfBounds { location, .. }
            | RenderError::UnknownMember { location, .. }
            | RenderError::MemberOfNull { location }
            | RenderError::FunctionCall { location, .. }
            | RenderError::TooDeep { location, .. } => *location,
        }
    }
}

pub type RenderResult<T> = Result<T, RenderError>;

/// Parses `text` as a template and evaluates it in `context`.
///
/// ```
/// use std::sync::Arc;
/// use pathmetrics::{env::Env, eval::{render, Value}};
///
/// let env = Arc::new(Env::default());
/// let context = Arc::new(env.new_context());
/// assert_eq!(
///     render("foo <%=add(600, 66)%> bar", &context).unwrap(),
///     Value::from("foo 666 bar")
/// );
/// ```
#[tracing::instrument(level = "debug", skip(context))]
pub fn render(text: &str, context: &Arc<Context>) -> RenderResult<Value> {
    let block = analyzer::parse(text)?;
    Evaluator::new().eval_block(&block, context)
}

/// Deepest evaluation nesting per thread, closure calls included.
pub const MAX_DEPTH: usize = 128;

thread_local! {
    static DEPTH: Cell<usize> = const { Cell::new(0) };
}

/// Holds one level of [`DEPTH`] until dropped.
struct DepthGuard {
    depth: usize,
}

impl DepthGuard {
    fn enter() -> Self {
        let depth = DEPTH.with(|cell| {
            let depth = cell.get() + 1;
            cell.set(depth);
            depth
        });
        Self { depth }
    }
}

impl Drop for DepthGuard {
    fn drop(&mut self) {
        DEPTH.with(|cell| cell.set(self.depth - 1));
    }
}

/// Tree-walking evaluator.
#[derive(Debug, Default, Clone, Copy)]
pub struct Evaluator;

impl Evaluator {
    pub fn new() -> Self {
        Self
    }

    /// One expression yields its value, anything else the concatenation of
    /// the rendered parts.
    pub fn eval_block(&self, block: &Block, context: &Arc<Context>) -> RenderResult<Value> {
        if let [single] = block.expressions.as_slice() {
            return self.eval_expression(single, context);
        }
        let mut rendered = String::new();
        for expression in &block.expressions {
            rendered.push_str(&self.eval_expression(expression, context)?.to_string());
        }
        Ok(Value::String(rendered))
    }

    pub fn eval_expression(
        &self,
        expression: &Expression,
        context: &Arc<Context>,
    ) -> RenderResult<Value> {
        let guard = DepthGuard::enter();
        if guard.depth > MAX_DEPTH {
            return Err(RenderError::TooDeep {
                limit: MAX_DEPTH,
                location: expression.location(),
            });
        }
        self.eval_node(expression, context)
    }

    fn eval_node(&self, expression: &Expression, context: &Arc<Context>) -> RenderResult<Value> {
        match expression {
            Expression::Block(block) => self.eval_block(block, context),
            Expression::StringLiteral { value, .. } => Ok(Value::String(value.clone())),
            Expression::LongLiteral { value, .. } => Ok(Value::Long(*value)),
            Expression::DoubleLiteral { value, .. } => Ok(Value::Double(*value)),
            Expression::Identifier(identifier) => context
                .get_property(&identifier.name)
                .ok_or_else(|| RenderError::UnknownProperty {
                    name: identifier.name.clone(),
                    location: identifier.location,
                }),
            Expression::FunctionCall {
                function,
                arguments,
                location,
            } => {
                let callee = match self.eval_expression(function, context)? {
                    Value::Function(callee) => callee,
                    other => {
                        return Err(RenderError::NotCallable {
                            found: other.type_name(),
                            location: function.location(),
                        })
                    }
                };
                let arguments = arguments
                    .iter()
                    .map(|argument| self.eval_expression(argument, context))
                    .collect::<RenderResult<Vec<_>>>()?;
                callee
                    .invoke(arguments, context)
                    .map_err(|error| RenderError::FunctionCall {
                        error: Box::new(error),
                        location: *location,
                    })
            }
            Expression::TernaryIf {
                condition,
                then_value,
                else_value,
                ..
            } => match self.eval_expression(condition, context)? {
                Value::Boolean(true) => self.eval_expression(then_value, context),
                Value::Boolean(false) => self.eval_expression(else_value, context),
                other => Err(RenderError::ConditionNotBoolean {
                    found: other.type_name(),
                    location: condition.location(),
                }),
            },
            Expression::ListLiteral { elements, .. } => elements
                .iter()
                .map(|element| self.eval_expression(element, context))
                .collect::<RenderResult<Vec<_>>>()
                .map(Value::List),
            Expression::DictionaryLiteral { entries, .. } => {
                let mut dict = Dictionary::new();
                for (key, value) in entries {
                    let key = self.eval_expression(key, context)?;
                    let value = self.eval_expression(value, context)?;
                    dict.insert(key, value);
                }
                Ok(Value::Dict(dict))
            }
            Expression::CollectionAccess {
                collection,
                key,
                location,
            } => self.eval_collection_access(collection, key, *location, context),
            Expression::MemberAccess {
                parent,
                member,
                location,
            } => {
                let parent = self.eval_expression(parent, context)?;
                if parent.is_null() {
                    return Err(RenderError::MemberOfNull {
                        location: *location,
                    });
                }
                member_of(&parent, &member.name).ok_or_else(|| RenderError::UnknownMember {
                    member: member.name.clone(),
                    found: parent.type_name(),
                    location: member.location,
                })
            }
            Expression::FunctionLiteral(literal) => Ok(Value::Function(Arc::new(Closure {
                literal: literal.clone(),
                context: context.clone(),
            }))),
        }
    }

    fn eval_collection_access(
        &self,
        collection: &Expression,
        key: &Expression,
        location: Location,
        context: &Arc<Context>,
    ) -> RenderResult<Value> {
        match self.eval_expression(collection, context)? {
            Value::Dict(dict) => {
                let key = self.eval_expression(key, context)?;
                Ok(dict.get(&key).cloned().unwrap_or(Value::Null))
            }
            Value::List(list) => {
                let index = match self.eval_expression(key, context)? {
                    Value::Long(index) => index,
                    other => {
                        return Err(RenderError::IndexNotInteger {
                            found: other.type_name(),
                            location: key.location(),
                        })
                    }
                };
                usize::try_from(index)
                    .ok()
                    .and_then(|i| list.get(i))
                    .cloned()
                    .ok_or(RenderError::IndexOutOfBounds {
                        index,
                        len: list.len(),
                        location,
                    })
            }
            other => Err(RenderError::NotCollection {
                found: other.type_name(),
                location: collection.location(),
            }),
        }
    }
}

/// A function literal bound to the context it was evaluated in.
pub struct Closure {
    literal: Arc<FunctionLiteral>,
    context: Arc<Context>,
}

impl std::fmt::Debug for Closure {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let parameters: Vec<&str> = self
            .literal
            .parameters
            .iter()
            .map(|p| p.name.as_str())
            .collect();
        write!(f, "fn({})", parameters.join(", "))
    }
}

impl Function for Closure {
    fn invoke(&self, args: Vec<Value>, _context: &Arc<Context>) -> FunctionResult<Value> {
        let arity = self.literal.parameters.len();
        Args::new("closure", &args, arity, arity)?;

        let scope = self.context.create_child();
        for (parameter, value) in self.literal.parameters.iter().zip(args) {
            scope.set_property(parameter.name.clone(), value);
        }
        debug!("invoking closure defined at {}", self.literal.location);
        Ok(Evaluator::new().eval_block(&self.literal.body, &Arc::new(scope))?)
    }
}
