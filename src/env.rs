//! Runtime environment shared by every context of a run.

use std::{fmt, sync::Arc};

use chrono::Utc;
use chrono_tz::Tz;

use crate::{
    eval::Context,
    functions,
    pipeline::{ErrorHandler, LoggingErrorHandler},
    storage::{LocalFileSystem, Storage},
};

pub const DEFAULT_MAX_WORKERS: usize = 1;

/// Default time zone, storage backend, worker limit and error handler.
pub struct Env {
    time_zone: Tz,
    storage: Arc<dyn Storage>,
    max_workers: usize,
    error_handler: Arc<dyn ErrorHandler>,
    current_time: Option<i64>,
}

impl Env {
    pub fn builder() -> EnvBuilder {
        EnvBuilder::new()
    }

    pub fn time_zone(&self) -> Tz {
        self.time_zone
    }

    pub fn storage(&self) -> &Arc<dyn Storage> {
        &self.storage
    }

    pub fn max_workers(&self) -> usize {
        self.max_workers
    }

    pub fn error_handler(&self) -> &Arc<dyn ErrorHandler> {
        &self.error_handler
    }

    /// Epoch milliseconds, from the fixed clock when one is set.
    pub fn current_time_millis(&self) -> i64 {
        self.current_time
            .unwrap_or_else(|| Utc::now().timestamp_millis())
    }

    /// A root context with the built-in functions installed.
    pub fn new_context(self: &Arc<Self>) -> Context {
        let context = Context::new(self.clone());
        functions::install(&context);
        context
    }
}

impl Default for Env {
    fn default() -> Self {
        EnvBuilder::new().build()
    }
}

impl fmt::Debug for Env {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Env")
            .field("time_zone", &self.time_zone)
            .field("storage", &self.storage)
            .field("max_workers", &self.max_workers)
            .field("current_time", &self.current_time)
            .finish()
    }
}

pub struct EnvBuilder {
    time_zone: Tz,
    storage: Option<Arc<dyn Storage>>,
    max_workers: usize,
    error_handler: Option<Arc<dyn ErrorHandler>>,
    current_time: Option<i64>,
}

impl Default for EnvBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl EnvBuilder {
    pub fn new() -> Self {
        Self {
            time_zone: Tz::UTC,
            storage: None,
            max_workers: DEFAULT_MAX_WORKERS,
            error_handler: None,
            current_time: None,
        }
    }

    pub fn with_time_zone(mut self, time_zone: Tz) -> Self {
        self.time_zone = time_zone;
        self
    }

    pub fn with_storage(mut self, storage: Arc<dyn Storage>) -> Self {
        self.storage = Some(storage);
        self
    }

    /// Zero is treated as one.
    pub fn with_max_workers(mut self, max_workers: usize) -> Self {
        self.max_workers = max_workers.max(1);
        self
    }

    pub fn with_error_handler(mut self, error_handler: Arc<dyn ErrorHandler>) -> Self {
        self.error_handler = Some(error_handler);
        self
    }

    /// Fixes the clock for deterministic runs.
    pub fn with_current_time(mut self, millis: i64) -> Self {
        self.current_time = Some(millis);
        self
    }

    pub fn build(self) -> Env {
        Env {
            time_zone: self.time_zone,
            storage: self
                .storage
                .unwrap_or_else(|| Arc::new(LocalFileSystem::new())),
            max_workers: self.max_workers,
            error_handler: self
                .error_handler
                .unwrap_or_else(|| Arc::new(LoggingErrorHandler)),
            current_time: self.current_time,
        }
    }
}
