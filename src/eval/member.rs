//! Member access (`parent.member`) tables.
//!
//! Each type that exposes members declares them statically; there is no
//! introspection.

use crate::{
    config::{Metric, Path, Tag},
    pipeline::{PathDetail, PathStatus},
};

use super::{time::TimeValue, value::Value};

pub trait Members {
    const MEMBERS: &'static [&'static str];

    /// `None` if the type has no such member.
    fn member(&self, name: &str) -> Option<Value>;
}

/// Looks up `name` on any value; `None` for unknown members and for types
/// without members.
pub fn member_of(value: &Value, name: &str) -> Option<Value> {
    match value {
        Value::Time(time) => time.member(name),
        Value::PathStatus(status) => status.member(name),
        Value::PathDetail(detail) => detail.member(name),
        Value::Path(path) => path.member(name),
        Value::Tag(tag) => tag.member(name),
        Value::Metric(metric) => metric.member(name),
        _ => None,
    }
}

impl Members for TimeValue {
    const MEMBERS: &'static [&'static str] = &["timeMillis", "timeZone"];

    fn member(&self, name: &str) -> Option<Value> {
        match name {
            "timeMillis" => Some(Value::Long(self.millis())),
            "timeZone" => Some(Value::from(self.zone_id())),
            _ => None,
        }
    }
}

impl Members for PathStatus {
    const MEMBERS: &'static [&'static str] =
        &["name", "value", "path", "pathDetails", "expectedCreationTime"];

    fn member(&self, name: &str) -> Option<Value> {
        match name {
            "name" => Some(Value::from(self.name.as_str())),
            "value" => Some(Value::from(self.value.as_str())),
            "path" => Some(Value::Path(self.path.clone())),
            "pathDetails" => Some(Value::List(
                self.path_details
                    .iter()
                    .cloned()
                    .map(Value::PathDetail)
                    .collect(),
            )),
            "expectedCreationTime" => Some(
                self.expected_creation_time
                    .clone()
                    .map(Value::Time)
                    .unwrap_or(Value::Null),
            ),
            _ => None,
        }
    }
}

impl Members for PathDetail {
    const MEMBERS: &'static [&'static str] =
        &["pathValue", "directory", "length", "lastModifiedTime"];

    fn member(&self, name: &str) -> Option<Value> {
        match name {
            "pathValue" => Some(Value::from(self.path_value.as_str())),
            "directory" => Some(Value::Boolean(self.directory)),
            "length" => Some(Value::Long(self.length as i64)),
            "lastModifiedTime" => Some(Value::Long(self.last_modified_time)),
            _ => None,
        }
    }
}

impl Members for Path {
    const MEMBERS: &'static [&'static str] =
        &["name", "value", "metrics", "tags", "expectedCreationTime"];

    fn member(&self, name: &str) -> Option<Value> {
        match name {
            "name" => Some(Value::from(self.name.as_str())),
            "value" => Some(Value::from(self.value.as_str())),
            "metrics" => Some(Value::List(
                self.metrics.iter().cloned().map(Value::Metric).collect(),
            )),
            "tags" => Some(Value::List(
                self.tags.iter().cloned().map(Value::Tag).collect(),
            )),
            "expectedCreationTime" => Some(Value::from(self.expected_creation_time.clone())),
            _ => None,
        }
    }
}

impl Members for Tag {
    const MEMBERS: &'static [&'static str] = &["key", "value"];

    fn member(&self, name: &str) -> Option<Value> {
        match name {
            "key" => Some(Value::from(self.key.as_str())),
            "value" => Some(Value::from(self.value.as_str())),
            _ => None,
        }
    }
}

impl Members for Metric {
    const MEMBERS: &'static [&'static str] =
        &["name", "function", "aggregate", "aggFunction", "defaultValue"];

    fn member(&self, name: &str) -> Option<Value> {
        match name {
            "name" => Some(Value::from(self.name.clone())),
            "function" => Some(Value::from(self.function.as_str())),
            "aggregate" => Some(Value::from(self.aggregate.clone())),
            "aggFunction" => Some(Value::from(self.agg_function.clone())),
            "defaultValue" => Some(Value::Double(self.default_value)),
            _ => None,
        }
    }
}
