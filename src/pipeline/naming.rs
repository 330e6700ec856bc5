//! Name rules for properties, paths, tag keys and repeat variables.

use lazy_static::lazy_static;
use regex::Regex;

use super::{PipelineError, PipelineResult};

lazy_static! {
    static ref IDENTIFIER: Regex =
        Regex::new(r"^[a-zA-Z$_][a-zA-Z0-9$_]*$").expect("identifier regex");
    // an unescaped ?, *, [...] or {...}; a leading metacharacter does not count
    static ref WILDCARD: Regex =
        Regex::new(r".*(([^\\][\*\?])|([^\\]\[.*[^\\]\])|([^\\]\{.*[^\\]\})).*")
            .expect("wildcard regex");
}

pub fn is_identifier(name: &str) -> bool {
    IDENTIFIER.is_match(name)
}

/// Fails with `InvalidName` unless `name` is an identifier. `kind` says what
/// the name was for.
pub fn check_identifier(kind: &'static str, name: &str) -> PipelineResult<()> {
    if is_identifier(name) {
        Ok(())
    } else {
        Err(PipelineError::InvalidName {
            kind,
            name: name.to_string(),
        })
    }
}

/// Whether a rendered path value is a glob that can match many entries.
pub fn contains_wildcard(value: &str) -> bool {
    WILDCARD.is_match(value)
}
