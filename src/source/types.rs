//! Object source types and traits
//!
//! Defines the abstraction the paginator drives when replaying batches.

use crate::error::Result;
use crate::types::Cursor;
use async_trait::async_trait;
use std::sync::Arc;

/// Where a fetch starts
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FetchStart {
    /// Zero-based raw position in the unfiltered result set
    Offset(u64),
    /// Resume from a cursor returned by an earlier fetch
    Cursor(Cursor),
}

impl FetchStart {
    /// Start at the very beginning
    pub fn beginning() -> Self {
        Self::Offset(0)
    }

    /// Check if this start uses a cursor
    pub fn is_cursor(&self) -> bool {
        matches!(self, Self::Cursor(_))
    }
}

/// Raw, unfiltered result of a single fetch
#[derive(Debug, Clone)]
pub struct Batch<T> {
    /// Items in source order
    pub items: Vec<T>,
    /// Cursor positioned right after the last item, if the source has one
    pub next_cursor: Option<Cursor>,
}

impl<T> Batch<T> {
    /// Create a batch without a follow-up cursor
    pub fn new(items: Vec<T>) -> Self {
        Self {
            items,
            next_cursor: None,
        }
    }

    /// Attach the cursor produced by this fetch
    #[must_use]
    pub fn with_cursor(mut self, cursor: Cursor) -> Self {
        self.next_cursor = Some(cursor);
        self
    }

    /// Number of raw items
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Check if the batch is empty
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

/// A backend the paginator can read batches from.
///
/// `fetch` must only return fewer than `limit` items when the source is truly
/// exhausted; the paginator treats a short batch as the end of the list.
#[async_trait]
pub trait ObjectSource: Send + Sync {
    /// Item type produced by the source
    type Item: Send + Sync;

    /// Deterministic identity of the query (filters, ordering, resource).
    /// Every cache entry the paginator writes is namespaced under it.
    fn cache_key(&self) -> String;

    /// Whether `fetch` returns usable cursors
    fn supports_cursors(&self) -> bool;

    /// Fetch up to `limit` raw items from `start`
    async fn fetch(&self, start: FetchStart, limit: usize) -> Result<Batch<Self::Item>>;
}

#[async_trait]
impl<S: ObjectSource + ?Sized> ObjectSource for Arc<S> {
    type Item = S::Item;

    fn cache_key(&self) -> String {
        (**self).cache_key()
    }

    fn supports_cursors(&self) -> bool {
        (**self).supports_cursors()
    }

    async fn fetch(&self, start: FetchStart, limit: usize) -> Result<Batch<Self::Item>> {
        (**self).fetch(start, limit).await
    }
}
