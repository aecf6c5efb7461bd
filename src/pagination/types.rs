//! Pagination types
//!
//! Configuration, the post-fetch filter and the cursor capability mode.

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;

// ============================================================================
// Configuration
// ============================================================================

/// Configuration for a paginator
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaginatorConfig {
    /// Items per page
    pub per_page: usize,

    /// Raw items per upstream fetch, and the number of filtered items to
    /// gather before a page request stops. Defaults to `per_page`.
    #[serde(default)]
    pub batch_size: Option<usize>,

    /// Whether page 1 may be empty instead of an error
    #[serde(default = "default_allow_empty_first_page")]
    pub allow_empty_first_page: bool,
}

fn default_allow_empty_first_page() -> bool {
    true
}

impl PaginatorConfig {
    /// Create a config with `batch_size == per_page`
    pub fn new(per_page: usize) -> Self {
        Self {
            per_page,
            batch_size: None,
            allow_empty_first_page: default_allow_empty_first_page(),
        }
    }

    /// Set the batch size
    #[must_use]
    pub fn with_batch_size(mut self, batch_size: usize) -> Self {
        self.batch_size = Some(batch_size);
        self
    }

    /// Set whether an empty first page is allowed
    #[must_use]
    pub fn with_allow_empty_first_page(mut self, allow: bool) -> Self {
        self.allow_empty_first_page = allow;
        self
    }

    /// Effective batch size
    pub fn batch_size(&self) -> usize {
        self.batch_size.unwrap_or(self.per_page)
    }

    /// How many pages one batch spans, rounded up
    pub fn pages_per_batch(&self) -> u64 {
        (self.batch_size() as u64).div_ceil(self.per_page.max(1) as u64)
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<()> {
        if self.per_page == 0 {
            return Err(Error::invalid_value("per_page", "must be greater than 0"));
        }
        if self.batch_size == Some(0) {
            return Err(Error::invalid_value("batch_size", "must be greater than 0"));
        }
        Ok(())
    }
}

// ============================================================================
// Filter
// ============================================================================

/// Predicate applied to fetched items before they count toward a page.
///
/// Checkpoints are counted in filtered items, so every filter carries a key
/// naming what it keeps. The key becomes part of the cache namespace and two
/// filters with the same key must keep the same items. `Filter::all()` keeps
/// everything and has no key.
pub struct Filter<T> {
    predicate: Option<Predicate<T>>,
}

struct Predicate<T> {
    key: String,
    test: Arc<dyn Fn(&T) -> bool + Send + Sync>,
}

impl<T> Filter<T> {
    /// Keep every item
    pub fn all() -> Self {
        Self { predicate: None }
    }

    /// Keep items for which `predicate` returns true
    pub fn new(
        key: impl Into<String>,
        predicate: impl Fn(&T) -> bool + Send + Sync + 'static,
    ) -> Self {
        Self {
            predicate: Some(Predicate {
                key: key.into(),
                test: Arc::new(predicate),
            }),
        }
    }

    /// Check if this filter keeps every item
    pub fn is_identity(&self) -> bool {
        self.predicate.is_none()
    }

    /// Identity of the predicate, `None` for `Filter::all()`
    pub fn key(&self) -> Option<&str> {
        self.predicate.as_ref().map(|p| p.key.as_str())
    }

    /// Drop items that do not match, preserving order
    pub fn apply(&self, mut items: Vec<T>) -> Vec<T> {
        if let Some(predicate) = &self.predicate {
            items.retain(|item| (predicate.test)(item));
        }
        items
    }
}

impl<T> Default for Filter<T> {
    fn default() -> Self {
        Self::all()
    }
}

impl<T> Clone for Filter<T> {
    fn clone(&self) -> Self {
        Self {
            predicate: self.predicate.as_ref().map(|p| Predicate {
                key: p.key.clone(),
                test: Arc::clone(&p.test),
            }),
        }
    }
}

impl<T> fmt::Debug for Filter<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.key() {
            None => f.write_str("Filter::all"),
            Some(key) => write!(f, "Filter({key})"),
        }
    }
}

// ============================================================================
// Cursor Mode
// ============================================================================

/// How the paginator re-enters the source, fixed when it is built
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CursorMode {
    /// Raw offsets only; no cursors are cached
    Positional,
    /// Cursors are captured at batch boundaries and cached as checkpoints
    Cursored,
}

impl CursorMode {
    /// Mode for a source's capability flag
    pub fn from_capability(supports_cursors: bool) -> Self {
        if supports_cursors {
            Self::Cursored
        } else {
            Self::Positional
        }
    }
}
