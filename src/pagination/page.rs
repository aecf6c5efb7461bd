//! A materialized page
//!
//! Items are fixed when the page is built. Navigation metadata is not: it is
//! read from the paginator's cache on every call, so a page rendered after
//! later requests sees the newer counts.

use super::paginator::Paginator;
use crate::cache::CursorCache;
use crate::source::ObjectSource;
use std::fmt;

/// One page of filtered items plus a handle back to its paginator
pub struct Page<'a, S: ObjectSource, C: CursorCache> {
    items: Vec<S::Item>,
    number: u64,
    paginator: &'a Paginator<S, C>,
}

impl<'a, S: ObjectSource, C: CursorCache> Page<'a, S, C> {
    pub(crate) fn new(items: Vec<S::Item>, number: u64, paginator: &'a Paginator<S, C>) -> Self {
        Self {
            items,
            number,
            paginator,
        }
    }

    /// Items on this page
    pub fn items(&self) -> &[S::Item] {
        &self.items
    }

    /// Take the items, dropping the paginator handle
    pub fn into_items(self) -> Vec<S::Item> {
        self.items
    }

    /// 1-based page number
    pub fn number(&self) -> u64 {
        self.number
    }

    /// Number of items on this page
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Check if the page has no items
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// The paginator that produced this page
    pub fn paginator(&self) -> &'a Paginator<S, C> {
        self.paginator
    }

    pub fn has_previous(&self) -> bool {
        self.number > 1
    }

    pub fn previous_page_number(&self) -> Option<u64> {
        self.has_previous().then(|| self.number - 1)
    }

    /// 1-based index of the first item, never below 1
    pub fn start_index(&self) -> u64 {
        (self.number.max(1) - 1) * self.paginator.per_page() as u64 + 1
    }

    /// 1-based index of the last item (0 for an empty first page)
    pub fn end_index(&self) -> u64 {
        (self.number.max(1) - 1) * self.paginator.per_page() as u64 + self.items.len() as u64
    }

    /// Whether a later page is known to exist. False while nothing is cached.
    pub async fn has_next(&self) -> bool {
        self.paginator
            .known_page_count()
            .await
            .is_some_and(|pages| self.number < pages)
    }

    pub async fn has_other_pages(&self) -> bool {
        self.has_previous() || self.has_next().await
    }

    pub async fn next_page_number(&self) -> Option<u64> {
        if self.has_next().await {
            Some(self.number + 1)
        } else {
            None
        }
    }

    /// Page numbers to offer around this one.
    ///
    /// The window reaches `ceil(batch_size / per_page)` pages either side,
    /// is clipped at 1 and at the known page count, and always includes the
    /// current page. With an unknown count nothing past the current page is
    /// offered.
    pub async fn available_pages(&self) -> Vec<u64> {
        let width = self.paginator.config().pages_per_batch();
        let lower = self.number.saturating_sub(width).max(1);
        let upper = match self.paginator.known_page_count().await {
            Some(pages) => (self.number + width).min(pages.max(self.number)),
            None => self.number,
        };
        (lower..=upper).collect()
    }

    /// Whether the last page is among `available_pages`
    pub async fn final_page_visible(&self) -> bool {
        match self.paginator.final_page().await {
            Some(last) => self.available_pages().await.contains(&last),
            None => false,
        }
    }
}

impl<S: ObjectSource, C: CursorCache> fmt::Display for Page<'_, S, C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "<Page {}>", self.number)
    }
}

impl<S, C> fmt::Debug for Page<'_, S, C>
where
    S: ObjectSource,
    S::Item: fmt::Debug,
    C: CursorCache,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Page")
            .field("number", &self.number)
            .field("items", &self.items)
            .finish_non_exhaustive()
    }
}
