use std::{fmt, sync::Arc};

use crate::{
    config::{Metric, Path},
    eval::TimeValue,
    storage::FileEntry,
};

use super::PipelineError;

/// One storage entry a path resolved to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PathDetail {
    pub path_value: String,
    pub directory: bool,
    pub length: u64,
    /// Epoch milliseconds.
    pub last_modified_time: i64,
}

impl PathDetail {
    pub fn new(
        path_value: impl Into<String>,
        directory: bool,
        length: u64,
        last_modified_time: i64,
    ) -> Self {
        Self {
            path_value: path_value.into(),
            directory,
            length,
            last_modified_time,
        }
    }
}

impl From<FileEntry> for PathDetail {
    fn from(entry: FileEntry) -> Self {
        Self {
            path_value: entry.path,
            directory: entry.is_directory,
            length: entry.length,
            last_modified_time: entry.modified,
        }
    }
}

/// A materialized path: rendered name and value plus what the value matched.
#[derive(Debug, Clone, PartialEq)]
pub struct PathStatus {
    pub name: String,
    pub value: String,
    pub path: Arc<Path>,
    pub path_details: Vec<Arc<PathDetail>>,
    pub expected_creation_time: Option<TimeValue>,
}

impl PathStatus {
    pub fn new(
        name: impl Into<String>,
        value: impl Into<String>,
        path: Arc<Path>,
        path_details: Vec<Arc<PathDetail>>,
        expected_creation_time: Option<TimeValue>,
    ) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
            path,
            path_details,
            expected_creation_time,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct MetricId {
    pub name: String,
    pub path_name: String,
    /// Rendered tags in declaration order.
    pub tags: Vec<(String, String)>,
}

impl MetricId {
    pub fn new(
        name: impl Into<String>,
        path_name: impl Into<String>,
        tags: Vec<(String, String)>,
    ) -> Self {
        Self {
            name: name.into(),
            path_name: path_name.into(),
            tags,
        }
    }

    /// `pathName.name`
    pub fn full_name(&self) -> String {
        format!("{}.{}", self.path_name, self.name)
    }
}

impl fmt::Display for MetricId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.full_name())?;
        if !self.tags.is_empty() {
            let tags: Vec<String> = self
                .tags
                .iter()
                .map(|(key, value)| format!("{}={}", key, value))
                .collect();
            write!(f, " ({})", tags.join(" "))?;
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct MetricDatum {
    pub id: MetricId,
    pub metric: Arc<Metric>,
    pub path_status: Arc<PathStatus>,
    pub value: f64,
}

/// Outcome of one path: either its status and metric data, or the error that
/// stopped it.
#[derive(Debug, Clone, PartialEq)]
pub struct PathMetrics {
    pub path: Arc<Path>,
    pub path_status: Option<Arc<PathStatus>>,
    pub metric_data: Option<Vec<MetricDatum>>,
    pub error: Option<PipelineError>,
}

impl PathMetrics {
    pub fn success(
        path: Arc<Path>,
        path_status: Arc<PathStatus>,
        metric_data: Vec<MetricDatum>,
    ) -> Self {
        Self {
            path,
            path_status: Some(path_status),
            metric_data: Some(metric_data),
            error: None,
        }
    }

    pub fn failure(path: Arc<Path>, error: PipelineError) -> Self {
        Self {
            path,
            path_status: None,
            metric_data: None,
            error: Some(error),
        }
    }

    pub fn is_success(&self) -> bool {
        self.error.is_none()
    }

    /// Value of the metric reported under `name`, if computed.
    pub fn metric_value(&self, name: &str) -> Option<f64> {
        self.metric_data
            .as_ref()?
            .iter()
            .find(|datum| datum.id.name == name)
            .map(|datum| datum.value)
    }
}
