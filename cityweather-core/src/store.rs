//! Last-known weather per city name.
//!
//! The file store keeps a single JSON object mapping display name to
//! [`WeatherSummary`]. Writes are last-write-wins per name; there is no
//! schema version and no expiry.

use anyhow::{Context, Result};
use parking_lot::Mutex;
use std::{
    collections::BTreeMap,
    fmt::Debug,
    fs,
    io::{ErrorKind, Write},
    path::{Path, PathBuf},
};
use tempfile::NamedTempFile;

use crate::model::WeatherSummary;

pub type WeatherMap = BTreeMap<String, WeatherSummary>;

pub trait WeatherStore: Send + Sync + Debug {
    fn get(&self, name: &str) -> Result<Option<WeatherSummary>>;

    fn set(&self, name: &str, summary: WeatherSummary) -> Result<()>;

    fn all(&self) -> Result<WeatherMap>;
}

#[derive(Debug, Clone)]
pub struct JsonFileStore {
    path: PathBuf,
}

impl JsonFileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    fn read(&self) -> Result<WeatherMap> {
        let contents = match fs::read_to_string(&self.path) {
            Ok(c) => c,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(WeatherMap::new()),
            Err(e) => {
                return Err(e).with_context(|| {
                    format!("Failed to read weather cache: {}", self.path.display())
                });
            }
        };

        if contents.trim().is_empty() {
            return Ok(WeatherMap::new());
        }

        serde_json::from_str(&contents)
            .with_context(|| format!("Failed to parse weather cache: {}", self.path.display()))
    }

    /// Each write goes to its own temp file in the same directory and is then
    /// renamed over the cache, so readers see either the old or the new map.
    fn write(&self, map: &WeatherMap) -> Result<()> {
        let dir = match self.path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        };
        fs::create_dir_all(dir)
            .with_context(|| format!("Failed to create cache directory: {}", dir.display()))?;

        let json = serde_json::to_string_pretty(map).context("Failed to serialize weather cache")?;

        let mut tmp = NamedTempFile::new_in(dir)
            .with_context(|| format!("Failed to create temp file in {}", dir.display()))?;
        tmp.write_all(json.as_bytes())
            .with_context(|| format!("Failed to write weather cache: {}", tmp.path().display()))?;
        tmp.persist(&self.path)
            .map_err(|e| e.error)
            .with_context(|| format!("Failed to replace weather cache: {}", self.path.display()))?;

        Ok(())
    }
}

impl WeatherStore for JsonFileStore {
    fn get(&self, name: &str) -> Result<Option<WeatherSummary>> {
        Ok(self.read()?.remove(name))
    }

    fn set(&self, name: &str, summary: WeatherSummary) -> Result<()> {
        let mut map = self.read()?;
        map.insert(name.to_string(), summary);
        self.write(&map)?;
        tracing::debug!(city = name, path = %self.path.display(), "cached weather summary");
        Ok(())
    }

    fn all(&self) -> Result<WeatherMap> {
        self.read()
    }
}

/// In-process store.
#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: Mutex<WeatherMap>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl WeatherStore for MemoryStore {
    fn get(&self, name: &str) -> Result<Option<WeatherSummary>> {
        Ok(self.entries.lock().get(name).cloned())
    }

    fn set(&self, name: &str, summary: WeatherSummary) -> Result<()> {
        self.entries.lock().insert(name.to_string(), summary);
        Ok(())
    }

    fn all(&self) -> Result<WeatherMap> {
        Ok(self.entries.lock().clone())
    }
}
