use std::{
    cmp::Ordering,
    fmt,
    hash::{Hash, Hasher},
    sync::Arc,
};

use indexmap::IndexMap;

use crate::{
    config::{Metric, Path, Tag},
    functions::Function,
    pipeline::{PathDetail, PathStatus},
};

use super::time::TimeValue;

/// Runtime value of the template language.
///
/// Pipeline entities (`Metric`, `PathStatus`, ...) travel through templates
/// unchanged so that metric functions can receive them as arguments.
#[derive(Clone, Debug, Default, strum::IntoStaticStr)]
#[strum(serialize_all = "camelCase")]
pub enum Value {
    /// No value, e.g. a dictionary miss.
    #[default]
    Null,
    String(String),
    Long(i64),
    Double(f64),
    Boolean(bool),
    List(Vec<Value>),
    Dict(Dictionary),
    Time(TimeValue),
    Function(Arc<dyn Function>),
    Metric(Arc<Metric>),
    PathStatus(Arc<PathStatus>),
    PathDetail(Arc<PathDetail>),
    Path(Arc<Path>),
    Tag(Arc<Tag>),
}

impl Value {
    pub fn type_name(&self) -> &'static str {
        self.into()
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_long(&self) -> Option<i64> {
        match self {
            Value::Long(n) => Some(*n),
            _ => None,
        }
    }

    /// Doubles, with integers widened.
    pub fn as_double(&self) -> Option<f64> {
        match self {
            Value::Double(d) => Some(*d),
            Value::Long(n) => Some(*n as f64),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Boolean(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_list(&self) -> Option<&[Value]> {
        match self {
            Value::List(list) => Some(list),
            _ => None,
        }
    }

    pub fn as_time(&self) -> Option<&TimeValue> {
        match self {
            Value::Time(time) => Some(time),
            _ => None,
        }
    }

    /// Orders two values of the same kind. Integers and doubles compare
    /// with widening; anything else is incomparable.
    pub fn compare(&self, other: &Value) -> Option<Ordering> {
        match (self, other) {
            (Value::Long(a), Value::Long(b)) => Some(a.cmp(b)),
            (Value::Long(_) | Value::Double(_), Value::Long(_) | Value::Double(_)) => {
                self.as_double()?.partial_cmp(&other.as_double()?)
            }
            (Value::String(a), Value::String(b)) => Some(a.cmp(b)),
            (Value::Boolean(a), Value::Boolean(b)) => Some(a.cmp(b)),
            (Value::Time(a), Value::Time(b)) => Some(a.millis().cmp(&b.millis())),
            _ => None,
        }
    }
}

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Value::Null, Value::Null) => true,
            (Value::String(a), Value::String(b)) => a == b,
            (Value::Long(a), Value::Long(b)) => a == b,
            (Value::Double(a), Value::Double(b)) => a == b,
            (Value::Boolean(a), Value::Boolean(b)) => a == b,
            (Value::List(a), Value::List(b)) => a == b,
            (Value::Dict(a), Value::Dict(b)) => a == b,
            (Value::Time(a), Value::Time(b)) => a == b,
            (Value::Function(a), Value::Function(b)) => {
                Arc::as_ptr(a) as *const () == Arc::as_ptr(b) as *const ()
            }
            (Value::Metric(a), Value::Metric(b)) => a == b,
            (Value::PathStatus(a), Value::PathStatus(b)) => a == b,
            (Value::PathDetail(a), Value::PathDetail(b)) => a == b,
            (Value::Path(a), Value::Path(b)) => a == b,
            (Value::Tag(a), Value::Tag(b)) => a == b,
            _ => false,
        }
    }
}

// NaN is the one value unequal to itself; as a dictionary key it is never
// found again.
impl Eq for Value {}

impl Hash for Value {
    fn hash<H: Hasher>(&self, state: &mut H) {
        std::mem::discriminant(self).hash(state);
        match self {
            Value::String(s) => s.hash(state),
            Value::Long(n) => n.hash(state),
            // 0.0 == -0.0
            Value::Double(d) => (if *d == 0.0 { 0.0f64 } else { *d }).to_bits().hash(state),
            Value::Boolean(b) => b.hash(state),
            Value::List(list) => list.hash(state),
            // equality ignores entry order
            Value::Dict(dict) => dict.len().hash(state),
            Value::Time(time) => time.millis().hash(state),
            Value::Function(function) => (Arc::as_ptr(function) as *const ()).hash(state),
            Value::Null
            | Value::Metric(_)
            | Value::PathStatus(_)
            | Value::PathDetail(_)
            | Value::Path(_)
            | Value::Tag(_) => {}
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Value::Null => write!(f, "null"),
            Value::String(s) => write!(f, "{}", s),
            Value::Long(n) => write!(f, "{}", n),
            // Debug keeps the fraction on whole numbers: 3.0, not 3
            Value::Double(d) => write!(f, "{:?}", d),
            Value::Boolean(b) => write!(f, "{}", b),
            Value::List(list) => {
                write!(f, "[")?;
                for (i, value) in list.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}", value)?;
                }
                write!(f, "]")
            }
            Value::Dict(dict) => write!(f, "{}", dict),
            Value::Time(time) => write!(f, "{}", time),
            Value::Function(function) => write!(f, "{:?}", function),
            Value::Metric(metric) => write!(f, "{}", metric.display_name()),
            Value::PathStatus(status) => write!(f, "{} ({})", status.name, status.value),
            Value::PathDetail(detail) => write!(f, "{}", detail.path_value),
            Value::Path(path) => write!(f, "{}", path.name),
            Value::Tag(tag) => write!(f, "{}={}", tag.key, tag.value),
        }
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::String(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::String(s)
    }
}

impl From<i64> for Value {
    fn from(n: i64) -> Self {
        Value::Long(n)
    }
}

impl From<i32> for Value {
    fn from(n: i32) -> Self {
        Value::Long(n as i64)
    }
}

impl From<f64> for Value {
    fn from(d: f64) -> Self {
        Value::Double(d)
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Boolean(b)
    }
}

impl From<Vec<Value>> for Value {
    fn from(list: Vec<Value>) -> Self {
        Value::List(list)
    }
}

impl From<TimeValue> for Value {
    fn from(time: TimeValue) -> Self {
        Value::Time(time)
    }
}

impl From<Option<String>> for Value {
    fn from(value: Option<String>) -> Self {
        value.map(Value::String).unwrap_or(Value::Null)
    }
}

/// Key/value mapping with value keys, in insertion order. Equality
/// ignores order.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Dictionary {
    entries: IndexMap<Value, Value>,
}

impl Dictionary {
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts or replaces, returning the previous value. A replaced entry
    /// keeps its position.
    pub fn insert(&mut self, key: Value, value: Value) -> Option<Value> {
        self.entries.insert(key, value)
    }

    pub fn get(&self, key: &Value) -> Option<&Value> {
        self.entries.get(key)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&Value, &Value)> {
        self.entries.iter()
    }
}

impl FromIterator<(Value, Value)> for Dictionary {
    fn from_iter<I: IntoIterator<Item = (Value, Value)>>(iter: I) -> Self {
        let mut dict = Dictionary::new();
        for (key, value) in iter {
            dict.insert(key, value);
        }
        dict
    }
}

impl fmt::Display for Dictionary {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{{")?;
        for (i, (key, value)) in self.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{}={}", key, value)?;
        }
        write!(f, "}}")
    }
}
