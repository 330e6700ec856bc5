use std::sync::Arc;

use regex::Regex;

use crate::eval::{Context, Value};

use super::{Args, Function, FunctionCallError, FunctionResult};

fn compile(pattern: &str) -> FunctionResult<Regex> {
    Regex::new(pattern).map_err(|e| FunctionCallError::Regex {
        pattern: pattern.to_string(),
        message: e.to_string(),
    })
}

/// A regex that must match the whole input.
fn compile_anchored(pattern: &str) -> FunctionResult<Regex> {
    Regex::new(&format!("^(?:{})$", pattern)).map_err(|e| FunctionCallError::Regex {
        pattern: pattern.to_string(),
        message: e.to_string(),
    })
}

pub fn is_match(args: Args) -> FunctionResult<Value> {
    let string = args.string(0, "string")?;
    let regex = compile_anchored(args.string(1, "pattern")?)?;
    Ok(Value::Boolean(regex.is_match(string)))
}

/// One-argument predicate returned by `matcher`.
#[derive(Debug)]
pub struct RegexPredicate {
    regex: Regex,
}

impl Function for RegexPredicate {
    fn invoke(&self, args: Vec<Value>, _context: &Arc<Context>) -> FunctionResult<Value> {
        let args = Args::new("matcher", &args, 1, 1)?;
        Ok(Value::Boolean(self.regex.is_match(args.string(0, "string")?)))
    }
}

pub fn matcher(args: Args) -> FunctionResult<Value> {
    let regex = compile_anchored(args.string(0, "pattern")?)?;
    Ok(Value::Function(Arc::new(RegexPredicate { regex })))
}

/// Literal replacement of every occurrence.
pub fn replace(args: Args) -> FunctionResult<Value> {
    let string = args.string(0, "string")?;
    let target = args.string(1, "target")?;
    let replacement = args.string(2, "replacement")?;
    Ok(Value::String(string.replace(target, replacement)))
}

/// `$1` in the replacement refers to a capture group.
pub fn replace_regex(args: Args) -> FunctionResult<Value> {
    let string = args.string(0, "string")?;
    let regex = compile(args.string(1, "pattern")?)?;
    let replacement = args.string(2, "replacement")?;
    Ok(Value::String(
        regex.replace_all(string, replacement).into_owned(),
    ))
}

/// Splits on a literal separator, keeping empty pieces.
pub fn split(args: Args) -> FunctionResult<Value> {
    let string = args.string(0, "string")?;
    let separator = args.string(1, "separator")?;
    if separator.is_empty() {
        return Err(FunctionCallError::Failed(
            "split: separator must not be empty".to_string(),
        ));
    }
    Ok(Value::List(
        string.split(separator).map(Value::from).collect(),
    ))
}

pub fn join(args: Args) -> FunctionResult<Value> {
    let list = args.list(0, "list")?;
    let separator = args.string(1, "separator")?;
    let parts: Vec<String> = list.iter().map(Value::to_string).collect();
    Ok(Value::String(parts.join(separator)))
}

pub fn concat(args: Args) -> FunctionResult<Value> {
    Ok(Value::String(
        args.values().iter().map(Value::to_string).collect(),
    ))
}
