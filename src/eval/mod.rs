//! # Template Evaluation
//!
//! Evaluates parsed templates against a chain of [`Context`]s.
//!
//! ```text
//! text ─▶ analyzer::parse ─▶ Block ─▶ Evaluator ─▶ Value
//!                                        │
//!                                        └─▶ functions (built-ins, closures)
//! ```
//!
//! A root context is created per run from the [`Env`](crate::env::Env); it
//! freezes the run's instant, which every descendant context shares. Child
//! contexts are built, then sealed into an `Arc` before anything reads them
//! concurrently.

pub mod context;
pub mod evaluator;
pub mod member;
pub mod time;
pub mod value;

pub use context::Context;
pub use evaluator::{render, Closure, Evaluator, RenderError, RenderResult};
pub use time::TimeValue;
pub use value::{Dictionary, Value};
