use std::cmp::Ordering;

use crate::eval::{Dictionary, Value};

use super::{Args, FunctionCallError, FunctionResult};

pub fn list_get(args: Args) -> FunctionResult<Value> {
    let list = args.list(0, "list")?;
    let index = args.long(1, "index")?;
    if index < 0 {
        return Err(FunctionCallError::Failed(format!(
            "Negative list index {}",
            index
        )));
    }
    list.get(index as usize).cloned().ok_or_else(|| {
        FunctionCallError::Failed(format!(
            "Out-of-bound index {}, size {}",
            index,
            list.len()
        ))
    })
}

pub fn list_first(args: Args) -> FunctionResult<Value> {
    let list = args.list(0, "list")?;
    list.first()
        .or_else(|| args.get(1))
        .cloned()
        .ok_or_else(|| FunctionCallError::Failed("Cannot get first element of empty list".into()))
}

pub fn list_last(args: Args) -> FunctionResult<Value> {
    let list = args.list(0, "list")?;
    list.last()
        .or_else(|| args.get(1))
        .cloned()
        .ok_or_else(|| FunctionCallError::Failed("Cannot get last element of empty list".into()))
}

/// `dict(k1, v1, k2, v2, ...)`
pub fn dict(args: Vec<Value>) -> FunctionResult<Value> {
    if args.len() % 2 != 0 {
        return Err(FunctionCallError::Failed(format!(
            "Missing value for key {}",
            args.last().map(Value::to_string).unwrap_or_default()
        )));
    }
    let mut dict = Dictionary::new();
    let mut values = args.into_iter();
    while let (Some(key), Some(value)) = (values.next(), values.next()) {
        dict.insert(key, value);
    }
    Ok(Value::Dict(dict))
}

/// Missing keys yield `Null`.
pub fn dict_get(args: Args) -> FunctionResult<Value> {
    let dict = args.dict(0, "dict")?;
    let key = args.value(1, "key")?;
    Ok(dict.get(key).cloned().unwrap_or(Value::Null))
}

/// Ascending; every element must be comparable with every other.
pub fn sort(args: Args) -> FunctionResult<Value> {
    let list = args.list(0, "list")?;
    if let Some(first) = list.first() {
        if let Some(odd) = list.iter().find(|v| first.compare(v).is_none()) {
            return Err(FunctionCallError::Failed(format!(
                "Cannot sort {} with {}",
                first.type_name(),
                odd.type_name()
            )));
        }
    }
    let mut sorted = list.to_vec();
    sorted.sort_by(|a, b| a.compare(b).unwrap_or(Ordering::Equal));
    Ok(Value::List(sorted))
}
