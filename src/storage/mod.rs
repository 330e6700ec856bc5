//! # Storage Backends
//!
//! The pipeline only needs four operations from storage: glob a pattern,
//! check existence, check for a directory, and list a directory. Each
//! returns [`FileEntry`] records carrying kind, length and modification
//! time.
//!
//! Glob patterns support `*`, `?`, `[...]` and `{a,b}` alternation, and a
//! backslash makes the next character literal. Braces are expanded by
//! [`expand_braces`] and escapes rewritten by [`bracket_escapes`] before
//! matching, so backends only need to understand the first three.

pub mod in_memory;
pub mod local_fs;

pub use in_memory::InMemoryStorage;
pub use local_fs::LocalFileSystem;

use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors that can occur during storage operations.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum StorageError {
    /// The path does not exist.
    #[error("Path not found: {0}")]
    NotFound(String),

    /// A directory operation was applied to a file.
    #[error("Not a directory: {0}")]
    NotDirectory(String),

    /// The glob pattern could not be compiled.
    #[error("Invalid pattern {pattern}: {message}")]
    InvalidPattern { pattern: String, message: String },

    /// Error reported by the underlying file system.
    #[error("I/O error on {path}: {message}")]
    Io { path: String, message: String },
}

pub type StorageResult<T> = Result<T, StorageError>;

/// One file or directory.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileEntry {
    pub path: String,
    pub is_directory: bool,
    pub length: u64,
    /// Last modification, epoch milliseconds.
    pub modified: i64,
}

impl FileEntry {
    pub fn file(path: impl Into<String>, length: u64, modified: i64) -> Self {
        Self {
            path: path.into(),
            is_directory: false,
            length,
            modified,
        }
    }

    pub fn directory(path: impl Into<String>, modified: i64) -> Self {
        Self {
            path: path.into(),
            is_directory: true,
            length: 0,
            modified,
        }
    }

    /// Last path component.
    pub fn name(&self) -> &str {
        let trimmed = self.path.trim_end_matches('/');
        trimmed.rsplit('/').next().unwrap_or(trimmed)
    }
}

/// Trait that abstracts the storage the pipeline measures.
///
/// # Thread Safety
///
/// Implementations are shared between worker threads through
/// `Arc<dyn Storage>`, which the `Send + Sync` bounds enforce.
pub trait Storage: Send + Sync + fmt::Debug {
    /// All entries matching `pattern`, sorted by path. No match is an empty
    /// list, not an error.
    fn glob(&self, pattern: &str) -> StorageResult<Vec<FileEntry>>;

    fn exists(&self, path: &str) -> StorageResult<bool>;

    fn is_directory(&self, path: &str) -> StorageResult<bool>;

    /// Children of a directory, sorted by path.
    ///
    /// Fails with `NotFound` for a missing path and `NotDirectory` for a
    /// file.
    fn list_directory(&self, path: &str) -> StorageResult<Vec<FileEntry>>;
}

/// Expands `{a,b}` alternation, including nested groups.
///
/// ```
/// use pathmetrics::storage::expand_braces;
///
/// assert_eq!(
///     expand_braces("/logs/{app,web}/2024-{01,02}"),
///     vec![
///         "/logs/app/2024-01",
///         "/logs/app/2024-02",
///         "/logs/web/2024-01",
///         "/logs/web/2024-02",
///     ]
/// );
/// ```
pub fn expand_braces(pattern: &str) -> Vec<String> {
    let Some((open, close)) = find_brace_group(pattern) else {
        return vec![pattern.to_string()];
    };

    let prefix = &pattern[..open];
    let suffix = &pattern[close + 1..];
    split_alternatives(&pattern[open + 1..close])
        .into_iter()
        .flat_map(|alternative| expand_braces(&format!("{}{}{}", prefix, alternative, suffix)))
        .collect()
}

/// Rewrites backslash escapes into the bracket form the `glob` crate
/// understands. Other escaped characters just lose the backslash.
///
/// ```
/// use pathmetrics::storage::bracket_escapes;
///
/// assert_eq!(bracket_escapes(r"/data/\*"), "/data/[*]");
/// assert_eq!(bracket_escapes(r"/data/\{a,b\}"), "/data/{a,b}");
/// ```
pub fn bracket_escapes(pattern: &str) -> String {
    let mut translated = String::with_capacity(pattern.len());
    let mut chars = pattern.chars();
    while let Some(c) = chars.next() {
        if c != '\\' {
            translated.push(c);
            continue;
        }
        match chars.next() {
            Some(escaped @ ('*' | '?' | '[' | ']')) => {
                translated.push('[');
                translated.push(escaped);
                translated.push(']');
            }
            Some(escaped) => translated.push(escaped),
            None => translated.push('\\'),
        }
    }
    translated
}

/// Byte offsets of the first balanced, unescaped `{ ... }` group.
fn find_brace_group(pattern: &str) -> Option<(usize, usize)> {
    let mut open = None;
    let mut depth = 0usize;
    let mut escaped = false;
    for (i, c) in pattern.char_indices() {
        match c {
            _ if escaped => escaped = false,
            '\\' => escaped = true,
            '{' => {
                if depth == 0 {
                    open = Some(i);
                }
                depth += 1;
            }
            '}' if depth > 0 => {
                depth -= 1;
                if depth == 0 {
                    return open.map(|start| (start, i));
                }
            }
            _ => {}
        }
    }
    None
}

/// Splits the inside of a brace group on top-level commas.
fn split_alternatives(inner: &str) -> Vec<&str> {
    let mut parts = Vec::new();
    let mut depth = 0usize;
    let mut start = 0;
    let mut escaped = false;
    for (i, c) in inner.char_indices() {
        match c {
            _ if escaped => escaped = false,
            '\\' => escaped = true,
            '{' => depth += 1,
            '}' => depth = depth.saturating_sub(1),
            ',' if depth == 0 => {
                parts.push(&inner[start..i]);
                start = i + 1;
            }
            _ => {}
        }
    }
    parts.push(&inner[start..]);
    parts
}
