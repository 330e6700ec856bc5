//! # Template Tokenizer
//!
//! Splits a template into [`token::TokenSpan`]s. The tokenizer has two
//! modes: outside `<%= ... %>` everything is template text, inside an island
//! the expression grammar applies (literals, identifiers, keywords, symbols,
//! whitespace).
//!
//! Every token carries its byte range and 1-based line/column so that
//! lexical and syntax errors can point at the offending position.

pub mod keyword;
pub mod literal;
pub mod symbol;
pub mod token;
pub mod whitespace;
