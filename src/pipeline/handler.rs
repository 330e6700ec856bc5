use tracing::warn;

use crate::config::{Path, Repeat};

use super::{PipelineError, WaitError};

/// Callbacks for failures the pipeline isolates instead of aborting the run.
#[mockall::automock]
pub trait ErrorHandler: Send + Sync {
    /// A unit of work could not be joined; its result is dropped.
    fn on_wait_error(&self, error: &WaitError);

    /// A repeat failed; the rest of that repeat is skipped.
    fn on_repeat_error(&self, repeat: &Repeat, error: &PipelineError);

    /// A path failed; it is reported with the error and no data.
    fn on_path_error(&self, path: &Path, error: &PipelineError);
}

/// Logs every failure and carries on.
#[derive(Debug, Default, Clone, Copy)]
pub struct LoggingErrorHandler;

impl ErrorHandler for LoggingErrorHandler {
    fn on_wait_error(&self, error: &WaitError) {
        warn!("Error while waiting for path metrics: {}", error);
    }

    fn on_repeat_error(&self, repeat: &Repeat, error: &PipelineError) {
        warn!("Error in repeat {} over {}: {}", repeat.var, repeat.list, error);
    }

    fn on_path_error(&self, path: &Path, error: &PipelineError) {
        warn!("Error in path {} ({}): {}", path.name, path.value, error);
    }
}
