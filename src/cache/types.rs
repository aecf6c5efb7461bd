//! Cache key types and the backend trait

use crate::error::Result;
use async_trait::async_trait;
use serde_json::Value;
use std::fmt;
use std::sync::Arc;

/// Which piece of per-query state an entry holds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum CacheField {
    /// Ordered set of item indices with a stored cursor
    Checkpoints,
    /// Cursor for resuming at the given item index
    Cursor(u64),
    /// Highest confirmed item count
    KnownCount,
    /// Item count at end of source, written once
    FinalCount,
}

impl fmt::Display for CacheField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CacheField::Checkpoints => f.write_str("checkpoints"),
            CacheField::Cursor(index) => write!(f, "cursor/{index}"),
            CacheField::KnownCount => f.write_str("known_count"),
            CacheField::FinalCount => f.write_str("final_count"),
        }
    }
}

/// Composite cache key: query identity plus field
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CacheKey {
    /// Query identity from `ObjectSource::cache_key`
    pub query: String,
    /// Field within that query's state
    pub field: CacheField,
}

impl CacheKey {
    /// Create a key
    pub fn new(query: impl Into<String>, field: CacheField) -> Self {
        Self {
            query: query.into(),
            field,
        }
    }
}

impl fmt::Display for CacheKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}/{}", self.query, self.field)
    }
}

/// Key/value store for cursor state.
///
/// The paginator treats every call as advisory: errors and missing values
/// only make it take a slower path.
#[async_trait]
pub trait CursorCache: Send + Sync {
    /// Read a value
    async fn get(&self, key: &CacheKey) -> Result<Option<Value>>;

    /// Write a value, replacing any previous one
    async fn set(&self, key: &CacheKey, value: Value) -> Result<()>;
}

#[async_trait]
impl<C: CursorCache + ?Sized> CursorCache for Arc<C> {
    async fn get(&self, key: &CacheKey) -> Result<Option<Value>> {
        (**self).get(key).await
    }

    async fn set(&self, key: &CacheKey, value: Value) -> Result<()> {
        (**self).set(key, value).await
    }
}
