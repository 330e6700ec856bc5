//! Local file system backend.
//!
//! Paths are used as given, or, when a root directory is configured, are
//! resolved below it: with root `/mnt/snapshot` the path `/data/x` refers to
//! `/mnt/snapshot/data/x` and is still reported as `/data/x`.

use std::{
    fs,
    path::{Path, PathBuf},
    time::SystemTime,
};

use chrono::{DateTime, Utc};
use tracing::debug;

use super::{bracket_escapes, expand_braces, FileEntry, Storage, StorageError, StorageResult};

#[derive(Debug, Clone, Default)]
pub struct LocalFileSystem {
    root: Option<PathBuf>,
}

impl LocalFileSystem {
    pub fn new() -> Self {
        Self { root: None }
    }

    /// Resolve every path below `root`.
    pub fn with_root(root: impl Into<PathBuf>) -> Self {
        Self {
            root: Some(root.into()),
        }
    }

    fn resolve(&self, path: &str) -> PathBuf {
        match &self.root {
            Some(root) => root.join(path.trim_start_matches('/')),
            None => PathBuf::from(path),
        }
    }

    /// Like `resolve`, for glob patterns: the root is matched literally.
    fn resolve_pattern(&self, pattern: &str) -> String {
        let pattern = bracket_escapes(pattern);
        match &self.root {
            Some(root) => {
                let root = glob::Pattern::escape(&root.to_string_lossy());
                format!("{}/{}", root.trim_end_matches('/'), pattern.trim_start_matches('/'))
            }
            None => pattern,
        }
    }

    /// Path as the caller sees it, with the root stripped again.
    fn logical(&self, path: &Path) -> String {
        match &self.root {
            Some(root) => match path.strip_prefix(root) {
                Ok(relative) => format!("/{}", relative.display()),
                Err(_) => path.display().to_string(),
            },
            None => path.display().to_string(),
        }
    }

    fn entry(&self, path: &Path) -> StorageResult<FileEntry> {
        let metadata = fs::metadata(path).map_err(|e| io_error(path, e))?;
        let modified = metadata
            .modified()
            .map(to_millis)
            .map_err(|e| io_error(path, e))?;
        Ok(FileEntry {
            path: self.logical(path),
            is_directory: metadata.is_dir(),
            length: if metadata.is_dir() { 0 } else { metadata.len() },
            modified,
        })
    }
}

impl Storage for LocalFileSystem {
    fn glob(&self, pattern: &str) -> StorageResult<Vec<FileEntry>> {
        let mut entries = Vec::new();
        for expanded in expand_braces(pattern) {
            let resolved = self.resolve_pattern(&expanded);
            let paths = glob::glob(&resolved).map_err(|e| StorageError::InvalidPattern {
                pattern: pattern.to_string(),
                message: e.to_string(),
            })?;
            for path in paths {
                let path = path.map_err(|e| StorageError::Io {
                    path: e.path().display().to_string(),
                    message: e.error().to_string(),
                })?;
                entries.push(self.entry(&path)?);
            }
        }
        entries.sort_by(|a, b| a.path.cmp(&b.path));
        entries.dedup_by(|a, b| a.path == b.path);
        debug!("glob {} matched {} entries", pattern, entries.len());
        Ok(entries)
    }

    fn exists(&self, path: &str) -> StorageResult<bool> {
        Ok(self.resolve(path).exists())
    }

    fn is_directory(&self, path: &str) -> StorageResult<bool> {
        Ok(self.resolve(path).is_dir())
    }

    fn list_directory(&self, path: &str) -> StorageResult<Vec<FileEntry>> {
        let resolved = self.resolve(path);
        if !resolved.exists() {
            return Err(StorageError::NotFound(path.to_string()));
        }
        if !resolved.is_dir() {
            return Err(StorageError::NotDirectory(path.to_string()));
        }
        let mut entries = Vec::new();
        for dir_entry in fs::read_dir(&resolved).map_err(|e| io_error(&resolved, e))? {
            let dir_entry = dir_entry.map_err(|e| io_error(&resolved, e))?;
            entries.push(self.entry(&dir_entry.path())?);
        }
        entries.sort_by(|a, b| a.path.cmp(&b.path));
        Ok(entries)
    }
}

fn to_millis(time: SystemTime) -> i64 {
    DateTime::<Utc>::from(time).timestamp_millis()
}

fn io_error(path: &Path, error: std::io::Error) -> StorageError {
    StorageError::Io {
        path: path.display().to_string(),
        message: error.to_string(),
    }
}
