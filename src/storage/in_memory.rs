//! In-memory storage backend.
//!
//! Holds a flat map from absolute path to [`FileEntry`]. Adding a file
//! creates its missing parent directories, so listings stay consistent.
//! Clones share the same map.

use std::sync::Arc;

use dashmap::DashMap;
use glob::{MatchOptions, Pattern};

use super::{bracket_escapes, expand_braces, FileEntry, Storage, StorageError, StorageResult};

const ROOT: &str = "/";

#[derive(Debug, Clone, Default)]
pub struct InMemoryStorage {
    entries: Arc<DashMap<String, FileEntry>>,
}

impl InMemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_file(&self, path: &str, length: u64, modified: i64) -> &Self {
        let path = normalize(path);
        self.add_parents(&path, modified);
        self.entries
            .insert(path.clone(), FileEntry::file(path, length, modified));
        self
    }

    pub fn add_directory(&self, path: &str, modified: i64) -> &Self {
        let path = normalize(path);
        self.add_parents(&path, modified);
        self.entries
            .insert(path.clone(), FileEntry::directory(path, modified));
        self
    }

    pub fn remove(&self, path: &str) {
        let path = normalize(path);
        let prefix = format!("{}/", path);
        self.entries
            .retain(|key, _| key != &path && !key.starts_with(&prefix));
    }

    fn add_parents(&self, path: &str, modified: i64) {
        let mut current = parent(path);
        while let Some(dir) = current {
            if dir == ROOT {
                break;
            }
            self.entries
                .entry(dir.to_string())
                .or_insert_with(|| FileEntry::directory(dir, modified));
            current = parent(dir);
        }
    }

    fn get(&self, path: &str) -> Option<FileEntry> {
        self.entries.get(path).map(|entry| entry.value().clone())
    }
}

impl Storage for InMemoryStorage {
    fn glob(&self, pattern: &str) -> StorageResult<Vec<FileEntry>> {
        let options = MatchOptions {
            require_literal_separator: true,
            ..MatchOptions::new()
        };
        let mut matched = Vec::new();
        for expanded in expand_braces(pattern) {
            let normalized = normalize(&bracket_escapes(&expanded));
            let compiled = Pattern::new(&normalized).map_err(|e| StorageError::InvalidPattern {
                pattern: pattern.to_string(),
                message: e.to_string(),
            })?;
            matched.extend(
                self.entries
                    .iter()
                    .filter(|entry| compiled.matches_with(entry.key(), options))
                    .map(|entry| entry.value().clone()),
            );
        }
        matched.sort_by(|a, b| a.path.cmp(&b.path));
        matched.dedup_by(|a, b| a.path == b.path);
        Ok(matched)
    }

    fn exists(&self, path: &str) -> StorageResult<bool> {
        let path = normalize(path);
        Ok(path == ROOT || self.entries.contains_key(&path))
    }

    fn is_directory(&self, path: &str) -> StorageResult<bool> {
        let path = normalize(path);
        Ok(path == ROOT || self.get(&path).is_some_and(|entry| entry.is_directory))
    }

    fn list_directory(&self, path: &str) -> StorageResult<Vec<FileEntry>> {
        let normalized = normalize(path);
        if normalized != ROOT {
            match self.get(&normalized) {
                None => return Err(StorageError::NotFound(path.to_string())),
                Some(entry) if !entry.is_directory => {
                    return Err(StorageError::NotDirectory(path.to_string()))
                }
                Some(_) => {}
            }
        }
        let mut children: Vec<FileEntry> = self
            .entries
            .iter()
            .filter(|entry| parent(entry.key()) == Some(normalized.as_str()))
            .map(|entry| entry.value().clone())
            .collect();
        children.sort_by(|a, b| a.path.cmp(&b.path));
        Ok(children)
    }
}

fn normalize(path: &str) -> String {
    let trimmed = path.trim_end_matches('/');
    if trimmed.is_empty() {
        ROOT.to_string()
    } else if trimmed.starts_with('/') {
        trimmed.to_string()
    } else {
        format!("/{}", trimmed)
    }
}

fn parent(path: &str) -> Option<&str> {
    if path == ROOT {
        return None;
    }
    match path.rsplit_once('/') {
        Some(("", _)) => Some(ROOT),
        Some((dir, _)) => Some(dir),
        None => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn create_test_storage() -> InMemoryStorage {
        let storage = InMemoryStorage::new();
        storage
            .add_file("/data/a/part-0", 10, 1_000)
            .add_file("/data/a/part-1", 20, 2_000)
            .add_file("/data/b/part-0", 30, 3_000)
            .add_directory("/data/empty", 4_000);
        storage
    }

    #[test]
    fn test_add_file_creates_parents() {
        let storage = create_test_storage();
        assert!(storage.is_directory("/data").unwrap());
        assert!(storage.is_directory("/data/a").unwrap());
        assert!(!storage.is_directory("/data/a/part-0").unwrap());
        assert!(storage.exists("/").unwrap());
    }

    #[test]
    fn test_glob() {
        let storage = create_test_storage();
        let entries = storage.glob("/data/*/part-0").unwrap();
        let lengths: Vec<u64> = entries.iter().map(|e| e.length).collect();
        assert_eq!(lengths, vec![10, 30]);

        // `*` does not cross directories
        assert!(storage.glob("/data/*").unwrap().iter().all(|e| e.is_directory));
        assert_eq!(storage.glob("/data/{a,b}/part-?").unwrap().len(), 3);
        assert!(storage.glob("/nothing/*").unwrap().is_empty());
    }

    #[test]
    fn test_glob_escapes() {
        let storage = InMemoryStorage::new();
        storage
            .add_file("/data/*", 1, 0)
            .add_file("/data/{a,b}", 2, 0)
            .add_file("/data/a", 3, 0);

        let lengths = |pattern: &str| -> Vec<u64> {
            storage.glob(pattern).unwrap().iter().map(|e| e.length).collect()
        };
        assert_eq!(lengths(r"/data/\*"), vec![1]);
        assert_eq!(lengths(r"/data/\{a,b\}"), vec![2]);
        assert_eq!(lengths("/data/*").len(), 3);
    }

    #[test]
    fn test_list_directory() {
        let storage = create_test_storage();
        let names: Vec<String> = storage
            .list_directory("/data/")
            .unwrap()
            .iter()
            .map(|e| e.name().to_string())
            .collect();
        assert_eq!(names, vec!["a", "b", "empty"]);
        assert!(storage.list_directory("/data/empty").unwrap().is_empty());
        assert_eq!(storage.list_directory("/").unwrap().len(), 1);
        assert_eq!(
            storage.list_directory("/data/a/part-0"),
            Err(StorageError::NotDirectory("/data/a/part-0".to_string()))
        );
        assert_eq!(
            storage.list_directory("/nope"),
            Err(StorageError::NotFound("/nope".to_string()))
        );
    }

    #[test]
    fn test_remove_subtree() {
        let storage = create_test_storage();
        storage.remove("/data/a");
        assert!(!storage.exists("/data/a/part-1").unwrap());
        assert!(storage.exists("/data/b/part-0").unwrap());
    }

    #[test]
    fn test_clones_share_entries() {
        let storage = InMemoryStorage::new();
        let clone = storage.clone();
        clone.add_file("/x", 1, 0);
        assert!(storage.exists("/x").unwrap());
    }
}
