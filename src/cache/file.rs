//! File-backed cursor cache
//!
//! Provides JSON file persistence with atomic writes, so cursors survive
//! between CLI runs.

use super::types::{CacheKey, CursorCache};
use crate::error::{Error, Result};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::sync::RwLock;

/// On-disk layout: query identity → field → value
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
struct CacheFile {
    #[serde(default)]
    queries: BTreeMap<String, BTreeMap<String, Value>>,
}

/// Cursor cache persisted to a JSON file
#[derive(Debug)]
pub struct FileCache {
    /// Path to the cache file
    path: PathBuf,
    /// Current contents (cached)
    data: Arc<RwLock<CacheFile>>,
    /// Whether to write the file on every `set`
    auto_save: bool,
}

impl FileCache {
    /// Open a cache file, loading existing entries if present
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        let data = if path.exists() {
            let contents = std::fs::read_to_string(&path).map_err(|e| Error::Cache {
                message: format!("Failed to read cache file: {e}"),
            })?;
            serde_json::from_str(&contents).map_err(|e| Error::Cache {
                message: format!("Failed to parse cache file: {e}"),
            })?
        } else {
            CacheFile::default()
        };

        Ok(Self {
            path,
            data: Arc::new(RwLock::new(data)),
            auto_save: true,
        })
    }

    /// Create an empty cache that only writes on an explicit `save`
    pub fn without_auto_save(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
            data: Arc::new(RwLock::new(CacheFile::default())),
            auto_save: false,
        }
    }

    /// Set whether every `set` writes the file
    #[must_use]
    pub fn with_auto_save(mut self, auto_save: bool) -> Self {
        self.auto_save = auto_save;
        self
    }

    /// Reload entries from the file, replacing what is held in memory
    pub async fn load(&self) -> Result<()> {
        if !self.path.exists() {
            return Ok(());
        }

        let contents = tokio::fs::read_to_string(&self.path)
            .await
            .map_err(|e| Error::Cache {
                message: format!("Failed to read cache file: {e}"),
            })?;

        let loaded: CacheFile = serde_json::from_str(&contents).map_err(|e| Error::Cache {
            message: format!("Failed to parse cache file: {e}"),
        })?;

        *self.data.write().await = loaded;
        Ok(())
    }

    /// Write current entries to the file
    pub async fn save(&self) -> Result<()> {
        let data = self.data.read().await;
        let contents = serde_json::to_string_pretty(&*data).map_err(|e| Error::Cache {
            message: format!("Failed to serialize cache: {e}"),
        })?;

        // Write to temp file first, then rename for atomicity
        let temp_path = self.path.with_extension("tmp");
        tokio::fs::write(&temp_path, &contents)
            .await
            .map_err(|e| Error::Cache {
                message: format!("Failed to write cache file: {e}"),
            })?;

        tokio::fs::rename(&temp_path, &self.path)
            .await
            .map_err(|e| Error::Cache {
                message: format!("Failed to rename cache file: {e}"),
            })?;

        Ok(())
    }

    /// All entries for one query, keyed by rendered field name
    pub async fn entries(&self, query: &str) -> BTreeMap<String, Value> {
        self.data
            .read()
            .await
            .queries
            .get(query)
            .cloned()
            .unwrap_or_default()
    }

    /// Query identities with stored state
    pub async fn queries(&self) -> Vec<String> {
        self.data.read().await.queries.keys().cloned().collect()
    }

    /// Remove all state for one query. Returns whether anything was removed.
    pub async fn clear_query(&self, query: &str) -> Result<bool> {
        let removed = self.data.write().await.queries.remove(query).is_some();

        if removed && self.auto_save {
            self.save().await?;
        }

        Ok(removed)
    }

    /// Get the cache file path
    pub fn path(&self) -> &Path {
        &self.path
    }
}

#[async_trait]
impl CursorCache for FileCache {
    async fn get(&self, key: &CacheKey) -> Result<Option<Value>> {
        let data = self.data.read().await;
        Ok(data
            .queries
            .get(&key.query)
            .and_then(|fields| fields.get(&key.field.to_string()))
            .cloned())
    }

    async fn set(&self, key: &CacheKey, value: Value) -> Result<()> {
        {
            let mut data = self.data.write().await;
            data.queries
                .entry(key.query.clone())
                .or_default()
                .insert(key.field.to_string(), value);
        }

        if self.auto_save {
            self.save().await?;
        }

        Ok(())
    }
}

impl Clone for FileCache {
    fn clone(&self) -> Self {
        Self {
            path: self.path.clone(),
            data: Arc::clone(&self.data),
            auto_save: self.auto_save,
        }
    }
}
