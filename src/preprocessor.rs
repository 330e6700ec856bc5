//! # Token Preprocessor
//!
//! Sits between the tokenizer and the parser:
//!
//! ```text
//! Template → Tokenizer → Preprocessor → Parser → Evaluator
//! ```
//!
//! Whitespace and newlines inside expression islands only separate tokens,
//! so they are filtered out before parsing. Template text tokens are kept
//! verbatim.
//!
//! ```rust
//! use pathmetrics::preprocessor::{Preprocessor, TokenPreprocessor};
//! use pathmetrics::tokenizer::token::Tokenizer;
//!
//! let spans = Tokenizer::new().tokenize("x <%= add(1, 2) %>").unwrap();
//! let spans = TokenPreprocessor::default().process(spans);
//! assert!(spans.iter().all(|span| !span.token.is_whitespace()));
//! ```

use crate::tokenizer::token::TokenSpan;

/// A trait for preprocessing different types of input
pub trait Preprocessor<T, U = T> {
    /// Process the input of type T and return the processed result
    fn process(&self, input: T) -> U;
}

#[derive(Debug, Default)]
pub struct TokenPreprocessor {}

impl TokenPreprocessor {
    pub fn new() -> Self {
        Self {}
    }
}

impl Preprocessor<Vec<TokenSpan>> for TokenPreprocessor {
    fn process(&self, input: Vec<TokenSpan>) -> Vec<TokenSpan> {
        input
            .into_iter()
            .filter(|span| !span.token.is_whitespace() && !span.token.is_newline())
            .collect()
    }
}
