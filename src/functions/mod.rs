//! # Function Library
//!
//! Built-in functions callable from templates. Every function checks its
//! argument count and types and fails with a [`FunctionCallError`] on a
//! violation.
//!
//! | family     | functions                                                        |
//! |------------|------------------------------------------------------------------|
//! | common     | `compare`                                                        |
//! | math       | `add` `sub` `mul` `div`                                          |
//! | logic      | `not` `eq` `ne` `lt` `gt` `ltEq` `gtEq`                          |
//! | string     | `match` `matcher` `replace` `replaceRegex` `split` `join` `concat` |
//! | time       | `now` `today` `yesterday` `timeAdd` `timeFormat` `timeParse` `timeToUnixDay` `unixDayToTime` |
//! | collection | `list` `listGet` `listFirst` `listLast` `dict` `dictGet` `sort`  |
//! | storage    | `dirList` `dirListName` `exists` `isDir`                         |
//! | metric     | `metricAgg` `age` `count` `size` `creationDelay`                 |

pub mod collection;
pub mod logic;
pub mod math;
pub mod metric;
pub mod storage;
pub mod string;
pub mod time;

use std::{fmt, sync::Arc};

use strum::IntoEnumIterator;
use thiserror::Error;

use crate::{
    config::Metric,
    eval::{
        time::{TimeError, TimeValue},
        Context, Dictionary, RenderError, Value,
    },
    pipeline::{PathDetail, PathStatus},
    storage::StorageError,
};

#[derive(Error, Debug, Clone, PartialEq)]
pub enum FunctionCallError {
    #[error("{function}: expected {expected} arguments, got {found}")]
    Arity {
        function: String,
        expected: String,
        found: usize,
    },
    #[error("{function}: argument {argument} must be {expected}, got {found}")]
    WrongArgument {
        function: String,
        argument: String,
        expected: &'static str,
        found: &'static str,
    },
    #[error("{function}: {callee} returned {found}, expected {expected}")]
    WrongResult {
        function: String,
        callee: String,
        expected: &'static str,
        found: &'static str,
    },
    #[error("Divide by zero")]
    DivideByZero,
    #[error("Unknown aggregate {0}")]
    UnknownAggregate(String),
    #[error("{0} is not a function")]
    NotAFunction(String),
    #[error(transparent)]
    Time(#[from] TimeError),
    #[error("Invalid regular expression {pattern}: {message}")]
    Regex { pattern: String, message: String },
    #[error(transparent)]
    Storage(#[from] StorageError),
    #[error("{0}")]
    Failed(String),
    #[error("Error in function body: {0}")]
    Render(Box<RenderError>),
}

impl From<RenderError> for FunctionCallError {
    fn from(error: RenderError) -> Self {
        FunctionCallError::Render(Box::new(error))
    }
}

pub type FunctionResult<T> = Result<T, FunctionCallError>;

/// Something a template can call.
///
/// Implemented by the built-ins, by closures written in templates, and by
/// the predicates `matcher` returns.
pub trait Function: Send + Sync + fmt::Debug {
    fn invoke(&self, args: Vec<Value>, context: &Arc<Context>) -> FunctionResult<Value>;
}

/// Built-in functions, named as templates call them.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    strum::Display,
    strum::EnumString,
    strum::EnumIter,
    strum::IntoStaticStr,
)]
#[strum(serialize_all = "camelCase")]
pub enum Builtin {
    // common
    Compare,
    // math
    Add,
    Sub,
    Mul,
    Div,
    // logic
    Not,
    Eq,
    Ne,
    Lt,
    Gt,
    LtEq,
    GtEq,
    // string
    Match,
    Matcher,
    Replace,
    ReplaceRegex,
    Split,
    Join,
    Concat,
    // time
    Now,
    Today,
    Yesterday,
    TimeAdd,
    TimeFormat,
    TimeParse,
    TimeToUnixDay,
    UnixDayToTime,
    // collection
    List,
    ListGet,
    ListFirst,
    ListLast,
    Dict,
    DictGet,
    Sort,
    // storage
    DirList,
    DirListName,
    Exists,
    IsDir,
    // metric
    MetricAgg,
    Age,
    Count,
    Size,
    CreationDelay,
}

impl Builtin {
    pub fn name(&self) -> &'static str {
        self.into()
    }
}

impl Function for Builtin {
    fn invoke(&self, args: Vec<Value>, context: &Arc<Context>) -> FunctionResult<Value> {
        let name = self.name();
        match self {
            Builtin::Compare => logic::compare(Args::new(name, &args, 2, 2)?),
            Builtin::Add => math::add(Args::new(name, &args, 2, 2)?),
            Builtin::Sub => math::sub(Args::new(name, &args, 2, 2)?),
            Builtin::Mul => math::mul(Args::new(name, &args, 2, 2)?),
            Builtin::Div => math::div(Args::new(name, &args, 2, 2)?),
            Builtin::Not => logic::not(Args::new(name, &args, 1, 1)?),
            Builtin::Eq => logic::eq(Args::new(name, &args, 2, 2)?),
            Builtin::Ne => logic::ne(Args::new(name, &args, 2, 2)?),
            Builtin::Lt => math::lt(Args::new(name, &args, 2, 2)?),
            Builtin::Gt => math::gt(Args::new(name, &args, 2, 2)?),
            Builtin::LtEq => math::lt_eq(Args::new(name, &args, 2, 2)?),
            Builtin::GtEq => math::gt_eq(Args::new(name, &args, 2, 2)?),
            Builtin::Match => string::is_match(Args::new(name, &args, 2, 2)?),
            Builtin::Matcher => string::matcher(Args::new(name, &args, 1, 1)?),
            Builtin::Replace => string::replace(Args::new(name, &args, 3, 3)?),
            Builtin::ReplaceRegex => string::replace_regex(Args::new(name, &args, 3, 3)?),
            Builtin::Split => string::split(Args::new(name, &args, 2, 2)?),
            Builtin::Join => string::join(Args::new(name, &args, 2, 2)?),
            Builtin::Concat => string::concat(Args::new(name, &args, 0, usize::MAX)?),
            Builtin::Now => time::now(Args::new(name, &args, 0, 1)?, context),
            Builtin::Today => time::today(Args::new(name, &args, 0, 1)?, context),
            Builtin::Yesterday => time::yesterday(Args::new(name, &args, 0, 1)?, context),
            Builtin::TimeAdd => time::time_add(Args::new(name, &args, 3, 3)?),
            Builtin::TimeFormat => time::time_format(Args::new(name, &args, 2, 2)?),
            Builtin::TimeParse => time::time_parse(Args::new(name, &args, 2, 3)?, context),
            Builtin::TimeToUnixDay => time::time_to_unix_day(Args::new(name, &args, 1, 1)?),
            Builtin::UnixDayToTime => {
                time::unix_day_to_time(Args::new(name, &args, 1, 2)?, context)
            }
            Builtin::List => Ok(Value::List(args)),
            Builtin::ListGet => collection::list_get(Args::new(name, &args, 2, 2)?),
            Builtin::ListFirst => collection::list_first(Args::new(name, &args, 1, 2)?),
            Builtin::ListLast => collection::list_last(Args::new(name, &args, 1, 2)?),
            Builtin::Dict => collection::dict(args),
            Builtin::DictGet => collection::dict_get(Args::new(name, &args, 2, 2)?),
            Builtin::Sort => collection::sort(Args::new(name, &args, 1, 1)?),
            Builtin::DirList => storage::dir_list(Args::new(name, &args, 1, 2)?, context),
            Builtin::DirListName => {
                storage::dir_list_name(Args::new(name, &args, 1, 2)?, context)
            }
            Builtin::Exists => storage::exists(Args::new(name, &args, 1, 1)?, context),
            Builtin::IsDir => storage::is_dir(Args::new(name, &args, 1, 1)?, context),
            Builtin::MetricAgg => metric::metric_agg(Args::new(name, &args, 2, 2)?, context),
            Builtin::Age => metric::age(Args::new(name, &args, 2, 2)?, context),
            Builtin::Count => metric::count(Args::new(name, &args, 2, 2)?),
            Builtin::Size => metric::size(Args::new(name, &args, 2, 2)?),
            Builtin::CreationDelay => {
                metric::creation_delay(Args::new(name, &args, 2, 2)?, context)
            }
        }
    }
}

/// Binds every built-in under its name.
pub fn install(context: &Context) {
    for builtin in Builtin::iter() {
        context.set_property(builtin.name(), Value::Function(Arc::new(builtin)));
    }
}

/// Checked view of a call's arguments.
#[derive(Debug, Clone, Copy)]
pub struct Args<'a> {
    function: &'static str,
    values: &'a [Value],
}

impl<'a> Args<'a> {
    /// Fails unless `min <= values.len() <= max`.
    pub fn new(
        function: &'static str,
        values: &'a [Value],
        min: usize,
        max: usize,
    ) -> FunctionResult<Self> {
        if values.len() < min || values.len() > max {
            let expected = if min == max {
                min.to_string()
            } else if max == usize::MAX {
                format!("at least {}", min)
            } else {
                format!("{} to {}", min, max)
            };
            return Err(FunctionCallError::Arity {
                function: function.to_string(),
                expected,
                found: values.len(),
            });
        }
        Ok(Self { function, values })
    }

    pub fn function_name(&self) -> &'static str {
        self.function
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn values(&self) -> &'a [Value] {
        self.values
    }

    pub fn get(&self, index: usize) -> Option<&'a Value> {
        self.values.get(index)
    }

    fn wrong(&self, index: usize, argument: &str, expected: &'static str) -> FunctionCallError {
        FunctionCallError::WrongArgument {
            function: self.function.to_string(),
            argument: argument.to_string(),
            expected,
            found: self
                .values
                .get(index)
                .map(Value::type_name)
                .unwrap_or("nothing"),
        }
    }

    pub fn value(&self, index: usize, argument: &str) -> FunctionResult<&'a Value> {
        self.values
            .get(index)
            .ok_or_else(|| self.wrong(index, argument, "present"))
    }

    pub fn string(&self, index: usize, argument: &str) -> FunctionResult<&'a str> {
        match self.values.get(index) {
            Some(Value::String(s)) => Ok(s),
            _ => Err(self.wrong(index, argument, "a string")),
        }
    }

    pub fn long(&self, index: usize, argument: &str) -> FunctionResult<i64> {
        match self.values.get(index) {
            Some(Value::Long(n)) => Ok(*n),
            _ => Err(self.wrong(index, argument, "an integer")),
        }
    }

    pub fn boolean(&self, index: usize, argument: &str) -> FunctionResult<bool> {
        match self.values.get(index) {
            Some(Value::Boolean(b)) => Ok(*b),
            _ => Err(self.wrong(index, argument, "a boolean")),
        }
    }

    pub fn list(&self, index: usize, argument: &str) -> FunctionResult<&'a [Value]> {
        match self.values.get(index) {
            Some(Value::List(list)) => Ok(list),
            _ => Err(self.wrong(index, argument, "a list")),
        }
    }

    pub fn dict(&self, index: usize, argument: &str) -> FunctionResult<&'a Dictionary> {
        match self.values.get(index) {
            Some(Value::Dict(dict)) => Ok(dict),
            _ => Err(self.wrong(index, argument, "a dictionary")),
        }
    }

    pub fn time(&self, index: usize, argument: &str) -> FunctionResult<&'a TimeValue> {
        match self.values.get(index) {
            Some(Value::Time(time)) => Ok(time),
            _ => Err(self.wrong(index, argument, "a time value")),
        }
    }

    pub fn function(&self, index: usize, argument: &str) -> FunctionResult<&'a Arc<dyn Function>> {
        match self.values.get(index) {
            Some(Value::Function(function)) => Ok(function),
            _ => Err(self.wrong(index, argument, "a function")),
        }
    }

    pub fn metric(&self, index: usize, argument: &str) -> FunctionResult<&'a Arc<Metric>> {
        match self.values.get(index) {
            Some(Value::Metric(metric)) => Ok(metric),
            _ => Err(self.wrong(index, argument, "a metric")),
        }
    }

    pub fn path_status(&self, index: usize, argument: &str) -> FunctionResult<&'a Arc<PathStatus>> {
        match self.values.get(index) {
            Some(Value::PathStatus(status)) => Ok(status),
            _ => Err(self.wrong(index, argument, "a path status")),
        }
    }

    pub fn path_detail(&self, index: usize, argument: &str) -> FunctionResult<&'a Arc<PathDetail>> {
        match self.values.get(index) {
            Some(Value::PathDetail(detail)) => Ok(detail),
            _ => Err(self.wrong(index, argument, "a path detail")),
        }
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::env::Env;
    use pretty_assertions::assert_eq;
    use std::str::FromStr;

    /// Root context at 2014/08/20 03:12:15.384 UTC with the built-ins.
    pub(crate) fn test_context() -> Arc<Context> {
        let env = Arc::new(Env::builder().with_current_time(1_408_504_335_384).build());
        Arc::new(env.new_context())
    }

    pub(crate) fn call(name: &str, args: Vec<Value>) -> FunctionResult<Value> {
        call_in(&test_context(), name, args)
    }

    pub(crate) fn call_in(
        context: &Arc<Context>,
        name: &str,
        args: Vec<Value>,
    ) -> FunctionResult<Value> {
        match context.get_property(name) {
            Some(Value::Function(function)) => function.invoke(args, context),
            _ => panic!("{} is not installed", name),
        }
    }

    #[test]
    fn test_builtin_names() {
        assert_eq!(Builtin::LtEq.name(), "ltEq");
        assert_eq!(Builtin::ReplaceRegex.name(), "replaceRegex");
        assert_eq!(Builtin::TimeToUnixDay.name(), "timeToUnixDay");
        assert_eq!(Builtin::from_str("isDir").unwrap(), Builtin::IsDir);
        assert_eq!(Builtin::iter().count(), 43);
    }

    #[test]
    fn test_arity() {
        assert_eq!(
            call("add", vec![Value::from(1)]),
            Err(FunctionCallError::Arity {
                function: "add".to_string(),
                expected: "2".to_string(),
                found: 1
            })
        );
        assert!(matches!(
            call("now", vec![Value::from("UTC"), Value::from("UTC")]),
            Err(FunctionCallError::Arity { expected, .. }) if expected == "0 to 1"
        ));
    }

    #[test]
    fn test_wrong_argument_names_the_type() {
        assert_eq!(
            call("not", vec![Value::from("yes")]),
            Err(FunctionCallError::WrongArgument {
                function: "not".to_string(),
                argument: "arg".to_string(),
                expected: "a boolean",
                found: "string"
            })
        );
    }
}
