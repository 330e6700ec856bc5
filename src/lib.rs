//! # pathmetrics: Path Metrics from Templated Configuration
//!
//! pathmetrics measures sets of storage paths. A declarative configuration
//! names paths whose names, values and tags are templates; each run renders
//! them against a frozen instant, resolves the results against a storage
//! backend and computes metrics such as age, size and count.
//!
//! ## Template Language
//!
//! Literal text with `<%= expression %>` islands:
//!
//! ```text
//! /logs/<%=timeFormat(yesterday(), 'yyyy/MM/dd')%>/part-*
//! ```
//!
//! Expressions are literals, identifiers, function calls, `if(c, a, b)`,
//! list and dictionary literals, `[index]` and `.member` access, and
//! closures `fn(a, b) -> expr`.
//!
//! ```text
//! Template → Tokenizer → Preprocessor → Parser → Evaluator
//! ```
//!
//! ### Stage 1: Tokenization
//!
//! The [`tokenizer`] module splits template text from expression islands and
//! tokenizes the islands, keeping a line and column for every token.
//!
//! ### Stage 2: Preprocessing
//!
//! The [`preprocessor`] drops whitespace inside islands.
//!
//! ### Stage 3: Parsing
//!
//! The [`analyzer`] builds the [`ast`] with parser combinators.
//!
//! ### Stage 4: Evaluation
//!
//! The [`eval`] module walks the AST in a [`eval::Context`] chain and calls
//! into the built-in [`functions`].
//!
//! ## Metrics Pipeline
//!
//! [`pipeline::Pipeline`] renders the global properties of a
//! [`config::Config`], expands its repeats and computes the metrics of every
//! path on a bounded worker pool. The runtime [`env::Env`] supplies the
//! default time zone, the [`storage`] backend and the error handler.
//!
//! ```no_run
//! use std::sync::Arc;
//! use pathmetrics::{config::ConfigBuilder, env::Env, pipeline::Pipeline};
//!
//! # async fn run() -> pathmetrics::InternalResult<()> {
//! let config = ConfigBuilder::new().from_file("metrics.json")?.build()?;
//! let pipeline = Pipeline::new(Arc::new(Env::default()));
//! for path_metrics in pipeline.compute_all_metrics(&config).await? {
//!     println!("{:?}", path_metrics.path_status);
//! }
//! # Ok(())
//! # }
//! ```

pub mod analyzer;
pub mod ast;
pub mod config;
pub mod env;
pub mod error;
pub mod eval;
pub mod functions;
pub mod pipeline;
pub mod preprocessor;
pub mod storage;
pub mod tokenizer;

// Re-exports
pub use ast::{ASTError, ASTResult, Location};
pub use error::*;
pub use eval::{render, Context, RenderError, Value};
