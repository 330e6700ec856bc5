use std::io;

use pathmetrics::{config::ConfigError, eval::time::TimeError, pipeline::PipelineError};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum CliError {
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    #[error("{0}")]
    Config(#[from] ConfigError),

    #[error("{0}")]
    Time(#[from] TimeError),

    #[error("Failed to compute metrics: {0}")]
    Pipeline(#[from] PipelineError),
}

pub type CliResult<T> = Result<T, CliError>;
