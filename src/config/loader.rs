//! Include resolution.
//!
//! A document may name other documents in `includes`. Included documents are
//! loaded (recursively) relative to the including file and merged in front
//! of it: their properties come first and are overridden by name, their
//! paths and repeats precede the including document's own.

use std::{
    path::{Path as FsPath, PathBuf},
    sync::Arc,
};

use indexmap::IndexMap;
use tracing::debug;

use super::{Config, ConfigError, ConfigResult, Path, Repeat};

#[derive(Debug, Default)]
pub struct ConfigBuilder {
    location: Option<PathBuf>,
    includes: Vec<String>,
    properties: IndexMap<String, String>,
    paths: Vec<Arc<Path>>,
    repeats: Vec<Arc<Repeat>>,
}

impl ConfigBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_file<P: AsRef<FsPath>>(self, path: P) -> ConfigResult<Self> {
        Ok(self.add_config(Config::from_file(path)?))
    }

    pub fn from_str(self, s: &str) -> ConfigResult<Self> {
        Ok(self.add_config(Config::from_str(s)?))
    }

    pub fn add_config(mut self, config: Config) -> Self {
        if config.location.is_some() {
            self.location = config.location;
        }
        self.includes.extend(config.includes);
        self.properties.extend(config.properties);
        self.paths.extend(config.paths);
        self.repeats.extend(config.repeats);
        self
    }

    /// Adds or overrides a global property.
    pub fn add_property(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.properties.insert(name.into(), value.into());
        self
    }

    pub fn add_path(mut self, path: Path) -> Self {
        self.paths.push(Arc::new(path));
        self
    }

    pub fn add_repeat(mut self, repeat: Repeat) -> Self {
        self.repeats.push(Arc::new(repeat));
        self
    }

    /// Resolves includes and returns the merged config.
    pub fn build(self) -> ConfigResult<Config> {
        let mut stack: Vec<PathBuf> = self.location.iter().map(|l| canonical(l)).collect();
        self.build_with(&mut stack)
    }

    fn build_with(self, stack: &mut Vec<PathBuf>) -> ConfigResult<Config> {
        let mut expanded = Config {
            location: self.location.clone(),
            ..Config::default()
        };

        for include in &self.includes {
            let location = resolve_include(include, self.location.as_deref())?;
            let key = canonical(&location);
            if stack.contains(&key) {
                return Err(ConfigError::IncludeCycle(key));
            }
            debug!("including {}", location.display());

            stack.push(key);
            let included = ConfigBuilder::new().from_file(&location)?.build_with(stack)?;
            stack.pop();

            expanded.properties.extend(included.properties);
            expanded.paths.extend(included.paths);
            expanded.repeats.extend(included.repeats);
        }

        expanded.properties.extend(self.properties);
        expanded.paths.extend(self.paths);
        expanded.repeats.extend(self.repeats);
        Ok(expanded)
    }
}

fn resolve_include(include: &str, location: Option<&FsPath>) -> ConfigResult<PathBuf> {
    let include_path = FsPath::new(include);
    if include_path.is_absolute() {
        return Ok(include_path.to_path_buf());
    }
    location
        .and_then(FsPath::parent)
        .map(|dir| dir.join(include_path))
        .ok_or_else(|| ConfigError::Include {
            include: include.to_string(),
            path: "<string>".to_string(),
        })
}

fn canonical(path: &FsPath) -> PathBuf {
    path.canonicalize().unwrap_or_else(|_| path.to_path_buf())
}
