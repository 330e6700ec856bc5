use std::sync::Arc;

use crate::{
    eval::{Context, Value},
    storage::FileEntry,
};

use super::{Args, Function, FunctionCallError, FunctionResult};

/// Lists `dir`, keeping entries whose key (as chosen by `key`) passes the
/// optional predicate, and returns those keys.
fn list_filtered(
    args: Args,
    context: &Arc<Context>,
    key: fn(&FileEntry) -> String,
) -> FunctionResult<Value> {
    let dir = args.string(0, "dir")?;
    let predicate = if args.len() > 1 {
        Some(args.function(1, "filter")?)
    } else {
        None
    };

    let entries = context.env().storage().list_directory(dir)?;
    let mut keys = Vec::with_capacity(entries.len());
    for entry in &entries {
        let candidate = key(entry);
        if let Some(predicate) = predicate {
            if !accepts(predicate.as_ref(), &candidate, context)? {
                continue;
            }
        }
        keys.push(Value::String(candidate));
    }
    Ok(Value::List(keys))
}

fn accepts(predicate: &dyn Function, candidate: &str, context: &Arc<Context>) -> FunctionResult<bool> {
    match predicate.invoke(vec![Value::from(candidate)], context)? {
        Value::Boolean(accepted) => Ok(accepted),
        other => Err(FunctionCallError::WrongResult {
            function: "dirList".to_string(),
            callee: "filter".to_string(),
            expected: "boolean",
            found: other.type_name(),
        }),
    }
}

/// Full paths of a directory's children.
pub fn dir_list(args: Args, context: &Arc<Context>) -> FunctionResult<Value> {
    list_filtered(args, context, |entry| entry.path.clone())
}

/// Names of a directory's children.
pub fn dir_list_name(args: Args, context: &Arc<Context>) -> FunctionResult<Value> {
    list_filtered(args, context, |entry| entry.name().to_string())
}

pub fn exists(args: Args, context: &Arc<Context>) -> FunctionResult<Value> {
    let path = args.string(0, "path")?;
    Ok(Value::Boolean(context.env().storage().exists(path)?))
}

pub fn is_dir(args: Args, context: &Arc<Context>) -> FunctionResult<Value> {
    let path = args.string(0, "path")?;
    Ok(Value::Boolean(context.env().storage().is_directory(path)?))
}
