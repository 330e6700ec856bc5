//! Metric functions. Each is called as `f(metric, pathStatus)` or, for the
//! per-entry ones, `f(metric, pathDetail)`, and returns a double.

use std::{str::FromStr, sync::Arc};

use crate::eval::{Context, Value};

use super::{Args, FunctionCallError, FunctionResult};

/// How `metricAgg` folds per-entry values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, strum::Display, strum::EnumString)]
#[strum(serialize_all = "lowercase")]
pub enum Aggregate {
    Sum,
    Avg,
    Max,
    Min,
}

impl Aggregate {
    pub fn fold(&self, values: &[f64]) -> f64 {
        match self {
            Aggregate::Sum => values.iter().sum(),
            Aggregate::Avg if values.is_empty() => 0.0,
            Aggregate::Avg => values.iter().sum::<f64>() / values.len() as f64,
            Aggregate::Max => values.iter().copied().fold(-f64::MAX, f64::max),
            Aggregate::Min => values.iter().copied().fold(f64::MAX, f64::min),
        }
    }
}

/// Applies the function named by `metric.function` to every path entry and
/// folds the results with `metric.aggregate`. No entries yields
/// `metric.defaultValue`.
pub fn metric_agg(args: Args, context: &Arc<Context>) -> FunctionResult<Value> {
    let metric = args.metric(0, "metric")?;
    let status = args.path_status(1, "pathStatus")?;

    let function = match context.get_property(&metric.function) {
        Some(Value::Function(function)) => function,
        _ => return Err(FunctionCallError::NotAFunction(metric.function.clone())),
    };
    let aggregate_name = metric.aggregate.as_deref().unwrap_or_default();
    let aggregate = Aggregate::from_str(aggregate_name)
        .map_err(|_| FunctionCallError::UnknownAggregate(aggregate_name.to_string()))?;

    if status.path_details.is_empty() {
        return Ok(Value::Double(metric.default_value));
    }

    let mut values = Vec::with_capacity(status.path_details.len());
    for detail in &status.path_details {
        let result = function.invoke(
            vec![Value::Metric(metric.clone()), Value::PathDetail(detail.clone())],
            context,
        )?;
        let value = result.as_double().ok_or_else(|| FunctionCallError::WrongResult {
            function: "metricAgg".to_string(),
            callee: metric.function.clone(),
            expected: "a number",
            found: result.type_name(),
        })?;
        values.push(value);
    }
    Ok(Value::Double(aggregate.fold(&values)))
}

/// Milliseconds between the entry's modification and the run's instant.
pub fn age(args: Args, context: &Arc<Context>) -> FunctionResult<Value> {
    args.metric(0, "metric")?;
    let detail = args.path_detail(1, "pathDetail")?;
    Ok(Value::Double(
        (context.instant() - detail.last_modified_time) as f64,
    ))
}

pub fn size(args: Args) -> FunctionResult<Value> {
    args.metric(0, "metric")?;
    let detail = args.path_detail(1, "pathDetail")?;
    Ok(Value::Double(detail.length as f64))
}

pub fn count(args: Args) -> FunctionResult<Value> {
    args.metric(0, "metric")?;
    let status = args.path_status(1, "pathStatus")?;
    Ok(Value::Double(status.path_details.len() as f64))
}

/// Zero once anything exists at the path; before that, how long past the
/// expected creation time the run is (negative if not yet due).
pub fn creation_delay(args: Args, context: &Arc<Context>) -> FunctionResult<Value> {
    args.metric(0, "metric")?;
    let status = args.path_status(1, "pathStatus")?;
    let expected = status.expected_creation_time.as_ref().ok_or_else(|| {
        FunctionCallError::Failed("Expected creation time not defined".to_string())
    })?;
    if !status.path_details.is_empty() {
        return Ok(Value::Double(0.0));
    }
    Ok(Value::Double((context.instant() - expected.millis()) as f64))
}
