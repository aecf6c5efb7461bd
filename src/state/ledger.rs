//! Checkpoint ledger implementation
//!
//! Typed access to the cached state of one query. Every read is advisory: a
//! backend error or an undecodable value reads as "absent". Writes log their
//! failures and carry on.

use super::types::{nearest_checkpoint, CursorNotFound, QuerySnapshot};
use crate::cache::{CacheField, CacheKey, CursorCache};
use crate::types::Cursor;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::collections::BTreeSet;
use tracing::{debug, info, warn};

/// Cached checkpoints, cursors and counts for one query identity
#[derive(Debug, Clone)]
pub struct CheckpointLedger<C> {
    cache: C,
    query: String,
}

impl<C: CursorCache> CheckpointLedger<C> {
    /// Create a ledger for `query` on top of `cache`
    pub fn new(cache: C, query: impl Into<String>) -> Self {
        Self {
            cache,
            query: query.into(),
        }
    }

    /// Query identity
    pub fn query(&self) -> &str {
        &self.query
    }

    /// Same cache under another query identity
    #[must_use]
    pub fn rekeyed(self, query: impl Into<String>) -> Self {
        Self {
            cache: self.cache,
            query: query.into(),
        }
    }

    /// Underlying cache
    pub fn cache(&self) -> &C {
        &self.cache
    }

    fn key(&self, field: CacheField) -> CacheKey {
        CacheKey::new(self.query.clone(), field)
    }

    async fn read<T: DeserializeOwned>(&self, field: CacheField) -> Option<T> {
        let key = self.key(field);
        match self.cache.get(&key).await {
            Ok(Some(value)) => match serde_json::from_value(value) {
                Ok(parsed) => Some(parsed),
                Err(e) => {
                    warn!("Ignoring undecodable cache entry {key}: {e}");
                    None
                }
            },
            Ok(None) => None,
            Err(e) => {
                warn!("Cache read failed for {key}: {e}");
                None
            }
        }
    }

    async fn write<T: Serialize>(&self, field: CacheField, value: &T) {
        let key = self.key(field);
        let value = match serde_json::to_value(value) {
            Ok(value) => value,
            Err(e) => {
                warn!("Could not serialize cache entry {key}: {e}");
                return;
            }
        };
        if let Err(e) = self.cache.set(&key, value).await {
            warn!("Cache write failed for {key}: {e}");
        }
    }

    // ========================================================================
    // Checkpoints
    // ========================================================================

    /// Item indices with a registered checkpoint
    pub async fn checkpoints(&self) -> BTreeSet<u64> {
        self.read(CacheField::Checkpoints).await.unwrap_or_default()
    }

    /// Largest registered checkpoint at or below `target`, 0 if none
    pub async fn nearest_checkpoint(&self, target: u64) -> u64 {
        nearest_checkpoint(&self.checkpoints().await, target)
    }

    /// Cursor stored for a checkpoint
    pub async fn cursor(&self, index: u64) -> Result<Cursor, CursorNotFound> {
        debug!("Getting cursor for item {index}");
        self.read(CacheField::Cursor(index))
            .await
            .ok_or(CursorNotFound { index })
    }

    /// Register `index` as a checkpoint and store its cursor
    pub async fn record_checkpoint(&self, index: u64, cursor: &Cursor) {
        let mut checkpoints = self.checkpoints().await;
        if checkpoints.insert(index) {
            self.write(CacheField::Checkpoints, &checkpoints).await;
        }

        info!("Storing cursor for item {index}");
        self.write(CacheField::Cursor(index), cursor).await;
    }

    // ========================================================================
    // Counts
    // ========================================================================

    /// Highest confirmed item count
    pub async fn known_count(&self) -> Option<u64> {
        self.read(CacheField::KnownCount).await
    }

    /// Store `observed` as the known count unless a higher one is cached.
    /// Returns whether the observation was at least the cached count.
    pub async fn raise_known_count(&self, observed: u64) -> bool {
        match self.known_count().await {
            Some(known) if observed < known => false,
            _ => {
                self.write(CacheField::KnownCount, &observed).await;
                true
            }
        }
    }

    /// Item count at end of source
    pub async fn final_count(&self) -> Option<u64> {
        self.read(CacheField::FinalCount).await
    }

    /// Store the end-of-source count. Never overwrites an existing value.
    pub async fn set_final_count(&self, count: u64) -> bool {
        if self.final_count().await.is_some() {
            return false;
        }
        info!("End of source reached at {count} items");
        self.write(CacheField::FinalCount, &count).await;
        true
    }

    /// Read everything cached for this query
    pub async fn snapshot(&self) -> QuerySnapshot {
        let checkpoints: Vec<u64> = self.checkpoints().await.into_iter().collect();
        let mut snapshot = QuerySnapshot {
            query: self.query.clone(),
            known_count: self.known_count().await,
            final_count: self.final_count().await,
            ..Default::default()
        };
        for index in &checkpoints {
            if let Ok(cursor) = self.cursor(*index).await {
                snapshot.cursors.insert(*index, cursor);
            }
        }
        snapshot.checkpoints = checkpoints;
        snapshot
    }
}
