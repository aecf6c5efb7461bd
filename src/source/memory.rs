//! In-memory object source
//!
//! Backed by a `Vec`, mostly useful for tests and for paginating data that is
//! already loaded but expensive to filter.

use super::types::{Batch, FetchStart, ObjectSource};
use crate::error::{Error, Result};
use crate::types::Cursor;
use async_trait::async_trait;
use std::sync::atomic::{AtomicUsize, Ordering};
use tracing::debug;

/// Object source over an owned vector.
///
/// In cursor mode every fetch that stops short of the end hands back a
/// cursor encoding the next raw position, so it behaves like a cursor-paged
/// API that also accepts offsets.
#[derive(Debug)]
pub struct VecSource<T> {
    key: String,
    items: Vec<T>,
    cursors: bool,
    fetches: AtomicUsize,
    cursor_fetches: AtomicUsize,
}

impl<T> VecSource<T> {
    /// Positional source without cursor support
    pub fn positional(key: impl Into<String>, items: Vec<T>) -> Self {
        Self {
            key: key.into(),
            items,
            cursors: false,
            fetches: AtomicUsize::new(0),
            cursor_fetches: AtomicUsize::new(0),
        }
    }

    /// Source that hands out cursors
    pub fn cursored(key: impl Into<String>, items: Vec<T>) -> Self {
        Self {
            cursors: true,
            ..Self::positional(key, items)
        }
    }

    /// Total number of `fetch` calls served
    pub fn fetches(&self) -> usize {
        self.fetches.load(Ordering::SeqCst)
    }

    /// Number of `fetch` calls that started from a cursor
    pub fn cursor_fetches(&self) -> usize {
        self.cursor_fetches.load(Ordering::SeqCst)
    }

    /// Number of items held
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Check if the source holds no items
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    fn encode(&self, position: usize) -> Cursor {
        Cursor::new(format!("{}@{position}", self.key))
    }

    fn decode(&self, cursor: &Cursor) -> Result<usize> {
        cursor
            .as_str()
            .strip_prefix(&self.key)
            .and_then(|rest| rest.strip_prefix('@'))
            .and_then(|pos| pos.parse().ok())
            .ok_or_else(|| Error::source(format!("Unrecognized cursor '{cursor}'")))
    }
}

#[async_trait]
impl<T: Clone + Send + Sync> ObjectSource for VecSource<T> {
    type Item = T;

    fn cache_key(&self) -> String {
        self.key.clone()
    }

    fn supports_cursors(&self) -> bool {
        self.cursors
    }

    async fn fetch(&self, start: FetchStart, limit: usize) -> Result<Batch<T>> {
        self.fetches.fetch_add(1, Ordering::SeqCst);

        let position = match &start {
            FetchStart::Offset(offset) => usize::try_from(*offset).unwrap_or(usize::MAX),
            FetchStart::Cursor(cursor) => {
                if !self.cursors {
                    return Err(Error::source("Source does not support cursors"));
                }
                self.cursor_fetches.fetch_add(1, Ordering::SeqCst);
                self.decode(cursor)?
            }
        };

        let begin = position.min(self.items.len());
        let end = begin.saturating_add(limit).min(self.items.len());
        debug!("VecSource '{}' serving [{begin}..{end})", self.key);

        let batch = Batch::new(self.items[begin..end].to_vec());
        // Like a cursor API, the batch that reaches the end carries no cursor
        if self.cursors && end < self.items.len() {
            Ok(batch.with_cursor(self.encode(end)))
        } else {
            Ok(batch)
        }
    }
}
