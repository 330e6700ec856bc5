//! # Metrics Pipeline
//!
//! Turns a [`Config`] into [`PathMetrics`].
//!
//! ```text
//! properties ─▶ root context (sequential, any error aborts)
//!      │
//!      ├─▶ paths ───────────────────────────▶ worker pool ─▶ PathMetrics
//!      └─▶ repeats ─▶ child context per element ─┘   (in discovery order)
//! ```
//!
//! The driving task renders the global properties and expands repeats; every
//! path it discovers becomes one unit of work on a pool bounded by
//! [`Env::max_workers`]. Failures of a single path or repeat go to the
//! [`ErrorHandler`] and do not stop the run.

mod handler;
mod model;
pub mod naming;

pub use handler::{ErrorHandler, LoggingErrorHandler, MockErrorHandler};
pub use model::{MetricDatum, MetricId, PathDetail, PathMetrics, PathStatus};

use std::sync::Arc;

use lazy_static::lazy_static;
use thiserror::Error;
use tokio::{sync::Semaphore, task::JoinHandle};
use tracing::{debug, info};

use crate::{
    config::{Config, Metric, Path, Repeat},
    env::Env,
    eval::{render, Context, RenderError, Value},
    storage::StorageError,
};

use naming::{check_identifier, contains_wildcard};

#[derive(Error, Debug, Clone, PartialEq)]
pub enum PipelineError {
    #[error("Invalid {kind}: '{name}'")]
    InvalidName { kind: &'static str, name: String },
    #[error("{what} must be {expected}, got {found}")]
    WrongType {
        what: String,
        expected: &'static str,
        found: &'static str,
    },
    #[error(transparent)]
    Render(#[from] RenderError),
    #[error(transparent)]
    Storage(#[from] StorageError),
}

pub type PipelineResult<T> = Result<T, PipelineError>;

/// Failure to collect one unit of work.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum WaitError {
    #[error("Worker pool closed: {0}")]
    Acquire(String),
    #[error("Path task failed: {0}")]
    Join(String),
}

impl From<tokio::sync::AcquireError> for WaitError {
    fn from(error: tokio::sync::AcquireError) -> Self {
        WaitError::Acquire(error.to_string())
    }
}

impl From<tokio::task::JoinError> for WaitError {
    fn from(error: tokio::task::JoinError) -> Self {
        WaitError::Join(error.to_string())
    }
}

lazy_static! {
    static ref DEFAULT_METRICS: Vec<Arc<Metric>> = vec![
        Arc::new(Metric::new(Some("age"), "age", Some("max"))),
        Arc::new(Metric::new(Some("size"), "size", Some("sum"))),
        Arc::new(Metric::new(Some("count"), "count", None)),
    ];
    static ref WILDCARD_METRICS: Vec<Arc<Metric>> = vec![
        Arc::new(Metric::new(Some("maxAge"), "age", Some("max"))),
        Arc::new(Metric::new(Some("minAge"), "age", Some("min"))),
        Arc::new(Metric::new(Some("avgAge"), "age", Some("avg"))),
        Arc::new(Metric::new(Some("maxSize"), "size", Some("max"))),
        Arc::new(Metric::new(Some("minSize"), "size", Some("min"))),
        Arc::new(Metric::new(Some("avgSize"), "size", Some("avg"))),
        Arc::new(Metric::new(Some("sumSize"), "size", Some("sum"))),
    ];
    static ref CREATION_DELAY_METRIC: Arc<Metric> =
        Arc::new(Metric::new(Some("creationDelay"), "creationDelay", None));
}

/// Metrics computed for a path status before its configured ones.
pub fn default_metrics(status: &PathStatus) -> Vec<Arc<Metric>> {
    let mut metrics = DEFAULT_METRICS.clone();
    if contains_wildcard(&status.value) {
        metrics.extend(WILDCARD_METRICS.iter().cloned());
    }
    if status.expected_creation_time.is_some() {
        metrics.push(CREATION_DELAY_METRIC.clone());
    }
    metrics
}

type PathTask = JoinHandle<Result<PathMetrics, WaitError>>;

#[derive(Debug, Clone)]
pub struct Pipeline {
    env: Arc<Env>,
    workers: Arc<Semaphore>,
}

impl Pipeline {
    pub fn new(env: Arc<Env>) -> Self {
        let workers = Arc::new(Semaphore::new(env.max_workers()));
        Self { env, workers }
    }

    pub fn env(&self) -> &Arc<Env> {
        &self.env
    }

    /// Computes the metrics of every path in `config`, results in the order
    /// the paths were discovered. Only a failing global property fails the
    /// whole run.
    #[tracing::instrument(level = "debug", skip_all)]
    pub async fn compute_all_metrics(&self, config: &Config) -> PipelineResult<Vec<PathMetrics>> {
        let root = self.global_context(config)?;

        let mut tasks = Vec::new();
        for path in &config.paths {
            self.submit(path, &root, &mut tasks);
        }
        for repeat in &config.repeats {
            self.expand_repeat(repeat, &root, &mut tasks);
        }
        debug!("submitted {} paths", tasks.len());

        let mut results = Vec::with_capacity(tasks.len());
        for task in tasks {
            let outcome = match task.await {
                Ok(outcome) => outcome,
                Err(error) => Err(WaitError::from(error)),
            };
            match outcome {
                Ok(path_metrics) => results.push(path_metrics),
                Err(error) => self.env.error_handler().on_wait_error(&error),
            }
        }
        root.clear();
        info!("computed metrics for {} paths", results.len());
        Ok(results)
    }

    /// Root context with the global properties rendered in document order,
    /// each one visible to the next and to closures rendered before it.
    fn global_context(&self, config: &Config) -> PipelineResult<Arc<Context>> {
        let root = Arc::new(self.env.new_context());
        if let Err(error) = render_properties(config, &root) {
            root.clear();
            return Err(error);
        }
        Ok(root)
    }

    fn submit(&self, path: &Arc<Path>, context: &Arc<Context>, tasks: &mut Vec<PathTask>) {
        let workers = self.workers.clone();
        let path = path.clone();
        let context = context.clone();
        tasks.push(tokio::spawn(async move {
            let _permit = workers.acquire_owned().await?;
            let path_metrics =
                tokio::task::spawn_blocking(move || compute_path_metrics(&path, &context)).await?;
            Ok::<_, WaitError>(path_metrics)
        }));
    }

    fn expand_repeat(&self, repeat: &Arc<Repeat>, context: &Arc<Context>, tasks: &mut Vec<PathTask>) {
        if let Err(error) = self.try_expand_repeat(repeat, context, tasks) {
            self.env.error_handler().on_repeat_error(repeat, &error);
        }
    }

    fn try_expand_repeat(
        &self,
        repeat: &Arc<Repeat>,
        context: &Arc<Context>,
        tasks: &mut Vec<PathTask>,
    ) -> PipelineResult<()> {
        check_identifier("repeat variable", &repeat.var)?;
        let elements = match render(&repeat.list, context)? {
            Value::List(elements) => elements,
            other => {
                return Err(PipelineError::WrongType {
                    what: format!("Repeat list '{}'", repeat.list),
                    expected: "list",
                    found: other.type_name(),
                })
            }
        };
        debug!("repeat {} over {} elements", repeat.var, elements.len());

        for element in elements {
            let child = context.create_child();
            child.set_property(repeat.var.clone(), element);
            let child = Arc::new(child);
            for path in &repeat.paths {
                self.submit(path, &child, tasks);
            }
            for nested in &repeat.repeats {
                self.expand_repeat(nested, &child, tasks);
            }
        }
        Ok(())
    }
}

/// Materializes `path` and computes its metrics; a failure is reported to
/// the error handler and returned as a failed [`PathMetrics`].
pub fn compute_path_metrics(path: &Arc<Path>, context: &Arc<Context>) -> PathMetrics {
    let result = compute_path_status(path, context).and_then(|status| {
        let status = Arc::new(status);
        compute_metric_data(&status, context).map(|data| (status, data))
    });
    match result {
        Ok((status, data)) => PathMetrics::success(path.clone(), status, data),
        Err(error) => {
            context.env().error_handler().on_path_error(path, &error);
            PathMetrics::failure(path.clone(), error)
        }
    }
}

pub fn compute_path_status(path: &Arc<Path>, context: &Arc<Context>) -> PipelineResult<PathStatus> {
    let name = render_string(&path.name, context, "path name")?;
    check_identifier("path name", &name)?;
    let value = render_string(&path.value, context, "path value")?;

    let expected_creation_time = match &path.expected_creation_time {
        Some(expression) => match render(expression, context)? {
            Value::Time(time) => Some(time),
            other => {
                return Err(PipelineError::WrongType {
                    what: format!("Expected creation time of {}", name),
                    expected: "time",
                    found: other.type_name(),
                })
            }
        },
        None => None,
    };

    let path_details = context
        .env()
        .storage()
        .glob(&value)?
        .into_iter()
        .map(|entry| Arc::new(PathDetail::from(entry)))
        .collect::<Vec<_>>();
    debug!("path {} ({}) matched {} entries", name, value, path_details.len());

    Ok(PathStatus::new(
        name,
        value,
        path.clone(),
        path_details,
        expected_creation_time,
    ))
}

/// Default metrics first, then the configured ones. Tags are rendered once
/// and shared by every metric of the path.
pub fn compute_metric_data(
    status: &Arc<PathStatus>,
    context: &Arc<Context>,
) -> PipelineResult<Vec<MetricDatum>> {
    let tags = render_tags(&status.path, context)?;
    default_metrics(status)
        .iter()
        .chain(status.path.metrics.iter())
        .map(|metric| compute_metric(metric, status, tags.clone(), context))
        .collect()
}

fn render_tags(path: &Path, context: &Arc<Context>) -> PipelineResult<Vec<(String, String)>> {
    let mut tags = Vec::with_capacity(path.tags.len());
    for tag in &path.tags {
        let key = render_string(&tag.key, context, "tag key")?;
        check_identifier("tag key", &key)?;
        let value = render_string(&tag.value, context, "tag value")?;
        tags.push((key, value));
    }
    Ok(tags)
}

pub fn compute_metric(
    metric: &Arc<Metric>,
    status: &Arc<PathStatus>,
    tags: Vec<(String, String)>,
    context: &Arc<Context>,
) -> PipelineResult<MetricDatum> {
    let id = MetricId::new(metric.display_name(), status.name.clone(), tags);

    let scope = context.create_child();
    scope.set_property("metric", Value::Metric(metric.clone()));
    scope.set_property("pathStatus", Value::PathStatus(status.clone()));
    let function = match (&metric.agg_function, &metric.aggregate) {
        (Some(agg_function), _) => agg_function.as_str(),
        (None, Some(_)) => "metricAgg",
        (None, None) => metric.function.as_str(),
    };

    let value = match render(
        &format!("<%={}(metric,pathStatus)%>", function),
        &Arc::new(scope),
    )? {
        Value::Double(value) => value,
        Value::Long(value) => value as f64,
        other => {
            return Err(PipelineError::WrongType {
                what: format!("Metric {}", id.full_name()),
                expected: "double",
                found: other.type_name(),
            })
        }
    };

    Ok(MetricDatum {
        id,
        metric: metric.clone(),
        path_status: status.clone(),
        value,
    })
}

fn render_properties(config: &Config, root: &Arc<Context>) -> PipelineResult<()> {
    for (name, value) in &config.properties {
        let name = render_string(name, root, "property name")?;
        check_identifier("property name", &name)?;
        let value = render(value, root)?;
        debug!("property {} = {}", name, value);
        root.set_property(name, value);
    }
    Ok(())
}

fn render_string(text: &str, context: &Arc<Context>, what: &str) -> PipelineResult<String> {
    match render(text, context)? {
        Value::String(rendered) => Ok(rendered),
        other => Err(PipelineError::WrongType {
            what: format!("{} '{}'", what, text),
            expected: "string",
            found: other.type_name(),
        }),
    }
}
