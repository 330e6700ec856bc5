//! # Path Metric Configuration
//!
//! Declarative description of what to measure. Every string field except
//! `Metric::function`, `Metric::aggregate` and `Metric::agg_function` is a
//! template, rendered by the pipeline at run time.
//!
//! ```json
//! {
//!   "includes": ["common.json"],
//!   "properties": { "root": "/data" },
//!   "paths": [
//!     { "name": "daily", "value": "<%=root%>/daily/*",
//!       "tags": { "env": "prod" },
//!       "metrics": [ { "name": "bytes", "function": "size", "aggregate": "sum" } ] }
//!   ],
//!   "repeats": [ { "var": "x", "list": "<%=['a','b']%>", "paths": [] } ]
//! }
//! ```

pub mod loader;

pub use loader::ConfigBuilder;

use std::{
    fs::File,
    io::BufReader,
    path::{Path as FsPath, PathBuf},
    sync::Arc,
};

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("Failed to parse config {path}: {source}")]
    Json {
        path: String,
        source: serde_json::Error,
    },
    #[error("Failed to resolve include {include} from {path}")]
    Include { include: String, path: String },
    #[error("Include cycle through {0}")]
    IncludeCycle(PathBuf),
}

pub type ConfigResult<T> = Result<T, ConfigError>;

/// One configuration document.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Config {
    #[serde(default)]
    pub includes: Vec<String>,
    /// Global properties in document order; names and values are templates.
    #[serde(default)]
    pub properties: IndexMap<String, String>,
    #[serde(default)]
    pub paths: Vec<Arc<Path>>,
    #[serde(default)]
    pub repeats: Vec<Arc<Repeat>>,
    /// File the config was read from, used to resolve relative includes.
    #[serde(skip)]
    pub location: Option<PathBuf>,
}

impl Config {
    pub fn new(
        properties: IndexMap<String, String>,
        paths: Vec<Arc<Path>>,
        repeats: Vec<Arc<Repeat>>,
    ) -> Self {
        Self {
            includes: Vec::new(),
            properties,
            paths,
            repeats,
            location: None,
        }
    }

    /// Reads a single document without resolving its includes.
    pub fn from_file<P: AsRef<FsPath>>(path: P) -> ConfigResult<Self> {
        let path = path.as_ref();
        let file = File::open(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let mut config: Config = serde_json::from_reader(BufReader::new(file)).map_err(|source| {
            ConfigError::Json {
                path: path.display().to_string(),
                source,
            }
        })?;
        config.location = Some(path.to_path_buf());
        Ok(config)
    }

    pub fn from_str(s: &str) -> ConfigResult<Self> {
        serde_json::from_str(s).map_err(|source| ConfigError::Json {
            path: "<string>".to_string(),
            source,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Path {
    pub name: String,
    pub value: String,
    #[serde(default)]
    pub metrics: Vec<Arc<Metric>>,
    /// Tags keep document order.
    #[serde(default, with = "tag_map")]
    pub tags: Vec<Arc<Tag>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expected_creation_time: Option<String>,
}

impl Path {
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
            metrics: Vec::new(),
            tags: Vec::new(),
            expected_creation_time: None,
        }
    }

    pub fn with_metric(mut self, metric: Metric) -> Self {
        self.metrics.push(Arc::new(metric));
        self
    }

    pub fn with_tag(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.tags.push(Arc::new(Tag::new(key, value)));
        self
    }

    pub fn with_expected_creation_time(mut self, expression: impl Into<String>) -> Self {
        self.expected_creation_time = Some(expression.into());
        self
    }
}

/// A metric to compute for every materialized path.
///
/// `function` names a callable in the render context. With an `aggregate`
/// it is applied per path entry and folded by `metricAgg`; `agg_function`
/// replaces `metricAgg` with another callable of the same shape.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Metric {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    pub function: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub aggregate: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub agg_function: Option<String>,
    #[serde(default)]
    pub default_value: f64,
}

impl Metric {
    pub fn new(name: Option<&str>, function: &str, aggregate: Option<&str>) -> Self {
        Self {
            name: name.map(str::to_string),
            function: function.to_string(),
            aggregate: aggregate.map(str::to_string),
            agg_function: None,
            default_value: 0.0,
        }
    }

    pub fn with_agg_function(mut self, agg_function: &str) -> Self {
        self.agg_function = Some(agg_function.to_string());
        self
    }

    pub fn with_default_value(mut self, default_value: f64) -> Self {
        self.default_value = default_value;
        self
    }

    /// Name the metric is reported under.
    pub fn display_name(&self) -> &str {
        self.name.as_deref().unwrap_or(&self.function)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Repeat {
    pub var: String,
    pub list: String,
    #[serde(default)]
    pub paths: Vec<Arc<Path>>,
    #[serde(default)]
    pub repeats: Vec<Arc<Repeat>>,
}

impl Repeat {
    pub fn new(var: impl Into<String>, list: impl Into<String>) -> Self {
        Self {
            var: var.into(),
            list: list.into(),
            paths: Vec::new(),
            repeats: Vec::new(),
        }
    }

    pub fn with_path(mut self, path: Path) -> Self {
        self.paths.push(Arc::new(path));
        self
    }

    pub fn with_repeat(mut self, repeat: Repeat) -> Self {
        self.repeats.push(Arc::new(repeat));
        self
    }
}

/// Tag key and value; both are templates until the pipeline renders them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tag {
    pub key: String,
    pub value: String,
}

impl Tag {
    pub fn new(key: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            value: value.into(),
        }
    }
}

/// Tags are written as a JSON object but kept as an ordered list.
mod tag_map {
    use std::sync::Arc;

    use indexmap::IndexMap;
    use serde::{Deserialize, Deserializer, Serializer};

    use super::Tag;

    pub fn serialize<S>(tags: &[Arc<Tag>], serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.collect_map(tags.iter().map(|tag| (&tag.key, &tag.value)))
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Vec<Arc<Tag>>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let map = IndexMap::<String, String>::deserialize(deserializer)?;
        Ok(map
            .into_iter()
            .map(|(key, value)| Arc::new(Tag::new(key, value)))
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_config_from_str() {
        let config = Config::from_str(
            r#"{
                "properties": { "b": "2", "a": "1" },
                "paths": [
                    { "name": "daily", "value": "/data/<%=b%>/*",
                      "tags": { "z": "last", "env": "prod" },
                      "metrics": [
                        { "name": "bytes", "function": "size", "aggregate": "sum",
                          "defaultValue": -1 }
                      ],
                      "expectedCreationTime": "<%=today()%>" }
                ],
                "repeats": [
                    { "var": "x", "list": "<%=['a','b']%>",
                      "paths": [ { "name": "p", "value": "/<%=x%>" } ] }
                ]
            }"#,
        )
        .unwrap();

        let names: Vec<&String> = config.properties.keys().collect();
        assert_eq!(names, vec!["b", "a"]);

        let path = &config.paths[0];
        assert_eq!(
            path.tags,
            vec![
                Arc::new(Tag::new("z", "last")),
                Arc::new(Tag::new("env", "prod"))
            ]
        );
        assert_eq!(path.expected_creation_time.as_deref(), Some("<%=today()%>"));
        assert_eq!(path.metrics[0].default_value, -1.0);
        assert_eq!(path.metrics[0].aggregate.as_deref(), Some("sum"));
        assert_eq!(config.repeats[0].paths[0].value, "/<%=x%>");
        assert!(config.repeats[0].repeats.is_empty());
    }

    #[test]
    fn test_defaults() {
        let config = Config::from_str(r#"{ "paths": [ { "name": "a", "value": "/a" } ] }"#).unwrap();
        assert!(config.includes.is_empty());
        assert!(config.paths[0].metrics.is_empty());
        assert!(config.paths[0].tags.is_empty());
        assert_eq!(config.paths[0].expected_creation_time, None);
    }

    #[test]
    fn test_path_requires_value() {
        let result = Config::from_str(r#"{ "paths": [ { "name": "a" } ] }"#);
        assert!(matches!(result, Err(ConfigError::Json { .. })));
    }

    #[test]
    fn test_metric_display_name() {
        assert_eq!(Metric::new(None, "count", None).display_name(), "count");
        assert_eq!(
            Metric::new(Some("bytes"), "size", Some("sum")).display_name(),
            "bytes"
        );
    }

    #[test]
    fn test_tags_serialize_as_map() {
        let path = Path::new("a", "/a").with_tag("env", "prod");
        let json = serde_json::to_value(&path).unwrap();
        assert_eq!(json["tags"], serde_json::json!({ "env": "prod" }));
    }
}
