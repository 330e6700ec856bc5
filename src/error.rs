use thiserror::Error;

use crate::{
    ast::ASTError,
    config::ConfigError,
    eval::RenderError,
    functions::FunctionCallError,
    pipeline::PipelineError,
    storage::StorageError,
};

#[derive(Error, Debug)]
pub enum Error {
    #[error("Config error: {0}")]
    Config(#[from] ConfigError),
    #[error("AST error: {0}")]
    AST(#[from] ASTError),
    #[error("Render error: {0}")]
    Render(#[from] RenderError),
    #[error("Function error: {0}")]
    FunctionCall(#[from] FunctionCallError),
    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),
    #[error("Pipeline error: {0}")]
    Pipeline(#[from] PipelineError),

    #[error("Internal error: {0}")]
    Internal(String),
}

pub type InternalResult<T> = Result<T, Error>;

// エラー作成用のヘルパー関数
impl Error {
    pub fn internal<S: Into<String>>(message: S) -> Self {
        Error::Internal(message.into())
    }
}
