//! Cursor-caching paginator
//!
//! Translates 1-based page requests into as few upstream fetches as it can.
//! Every full batch read from a cursor-capable source leaves a checkpoint
//! behind: the logical (post-filter) index where the batch ended, plus the
//! cursor that resumes exactly there. A later request starts from the nearest
//! checkpoint at or below its first item instead of from the beginning.
//!
//! All indices are zero-based item indices in the filtered sequence. Page
//! numbers only appear at the public surface.

use super::page::Page;
use super::types::{CursorMode, Filter, PaginatorConfig};
use crate::cache::CursorCache;
use crate::error::{Error, Result};
use crate::source::{Batch, FetchStart, ObjectSource};
use crate::state::CheckpointLedger;
use crate::types::{IntoPageNumber, OutOfRange};
use std::fmt;
use tracing::{debug, info};

/// Where a page request starts reading
#[derive(Debug, Clone)]
struct StartPlan {
    /// Logical index the first fetch starts at
    checkpoint: u64,
    /// Distance from the checkpoint to the first item of the page
    offset: u64,
    /// How the first fetch is issued
    start: FetchStart,
    /// Whether `checkpoint` is known to exist in the source
    confirmed: bool,
}

/// Filtered items gathered by one page request
#[derive(Debug)]
struct Replay<T> {
    items: Vec<T>,
    raw_seen: usize,
    exhausted: bool,
}

/// Paginator over an object source, with cursor state in a cursor cache
pub struct Paginator<S: ObjectSource, C: CursorCache> {
    source: S,
    ledger: CheckpointLedger<C>,
    config: PaginatorConfig,
    filter: Filter<S::Item>,
    mode: CursorMode,
}

impl<S: ObjectSource, C: CursorCache> Paginator<S, C> {
    /// Create a paginator. The source's cursor capability and cache key are
    /// read once here.
    pub fn new(source: S, cache: C, config: PaginatorConfig) -> Result<Self> {
        config.validate()?;
        let mode = CursorMode::from_capability(source.supports_cursors());
        let ledger = CheckpointLedger::new(cache, source.cache_key());
        debug!(
            "Paginator for '{}' ({mode:?}, per_page={}, batch_size={})",
            ledger.query(),
            config.per_page,
            config.batch_size()
        );

        Ok(Self {
            source,
            ledger,
            config,
            filter: Filter::all(),
            mode,
        })
    }

    /// Only count items for which `predicate` returns true. `key` names the
    /// predicate in the cache namespace.
    #[must_use]
    pub fn with_filter(
        self,
        key: impl Into<String>,
        predicate: impl Fn(&S::Item) -> bool + Send + Sync + 'static,
    ) -> Self {
        self.with_predicate(Filter::new(key, predicate))
    }

    /// Replace the item filter, moving to that filter's cache namespace
    #[must_use]
    pub fn with_predicate(mut self, filter: Filter<S::Item>) -> Self {
        let query = query_key(&self.source.cache_key(), &filter);
        debug!("Filter {filter:?} uses query '{query}'");
        self.ledger = self.ledger.rekeyed(query);
        self.filter = filter;
        self
    }

    /// Items per page
    pub fn per_page(&self) -> usize {
        self.config.per_page
    }

    /// Raw items per upstream fetch
    pub fn batch_size(&self) -> usize {
        self.config.batch_size()
    }

    /// Paginator configuration
    pub fn config(&self) -> &PaginatorConfig {
        &self.config
    }

    /// The object source
    pub fn source(&self) -> &S {
        &self.source
    }

    /// Cached state for this paginator's query
    pub fn ledger(&self) -> &CheckpointLedger<C> {
        &self.ledger
    }

    /// How the source is re-entered
    pub fn mode(&self) -> CursorMode {
        self.mode
    }

    // ========================================================================
    // Page Requests
    // ========================================================================

    /// Fetch page `number` (1-based)
    pub async fn page(&self, number: impl IntoPageNumber) -> Result<Page<'_, S, C>> {
        let number = number.into_page_number()?;
        let per_page = self.config.per_page as u64;
        let target = (number - 1).saturating_mul(per_page);

        let plan = self.resolve_start(target).await;
        debug!(
            "Page {number}: target item {target}, checkpoint {}, offset {}, start {:?}",
            plan.checkpoint, plan.offset, plan.start
        );

        let replay = self.replay(&plan).await?;

        // Counts first, so an empty-page error still records what was seen
        if plan.confirmed || replay.raw_seen > 0 {
            let observed = plan.checkpoint + replay.items.len() as u64;
            if self.ledger.raise_known_count(observed).await && replay.exhausted {
                self.ledger.set_final_count(observed).await;
            }
        }

        let mut items = replay.items;
        let offset = usize::try_from(plan.offset).unwrap_or(usize::MAX);
        let items: Vec<S::Item> = if offset < items.len() {
            let end = offset.saturating_add(self.config.per_page).min(items.len());
            items.drain(offset..end).collect()
        } else {
            Vec::new()
        };

        if items.is_empty() && !(number == 1 && self.config.allow_empty_first_page) {
            return Err(Error::out_of_range(
                i64::try_from(number).unwrap_or(i64::MAX),
                OutOfRange::NoResults,
            ));
        }

        Ok(Page::new(items, number, self))
    }

    /// Pick the checkpoint and first fetch for a target item index
    async fn resolve_start(&self, target: u64) -> StartPlan {
        let unfiltered = self.filter.is_identity();

        let positional = |checkpoint: u64, confirmed: bool| StartPlan {
            checkpoint,
            offset: target - checkpoint,
            start: FetchStart::Offset(checkpoint),
            confirmed,
        };

        match self.mode {
            // Without a filter raw and logical indices agree, so jump to the
            // batch boundary directly.
            CursorMode::Positional if unfiltered => {
                let batch = self.config.batch_size() as u64;
                let checkpoint = target - target % batch;
                positional(checkpoint, checkpoint == 0)
            }
            CursorMode::Positional => positional(0, true),
            CursorMode::Cursored => {
                let checkpoint = self.ledger.nearest_checkpoint(target).await;
                if checkpoint == 0 {
                    return positional(0, true);
                }

                match self.ledger.cursor(checkpoint).await {
                    Ok(cursor) => {
                        debug!("Using cached cursor for item {checkpoint}");
                        StartPlan {
                            checkpoint,
                            offset: target - checkpoint,
                            start: FetchStart::Cursor(cursor),
                            confirmed: true,
                        }
                    }
                    Err(missing) if unfiltered => {
                        info!("{missing}, fetching positionally from {checkpoint}");
                        positional(checkpoint, true)
                    }
                    // A filtered checkpoint is not a raw offset
                    Err(missing) => {
                        info!("{missing}, rescanning from the beginning");
                        positional(0, true)
                    }
                }
            }
        }
    }

    /// Fetch batches from the plan's start until the page and the batch
    /// quota are covered or the source runs out
    async fn replay(&self, plan: &StartPlan) -> Result<Replay<S::Item>> {
        let batch_size = self.config.batch_size();
        let needed = usize::try_from(plan.offset)
            .unwrap_or(usize::MAX)
            .saturating_add(self.config.per_page);

        let mut items = Vec::new();
        let mut raw_seen = 0usize;
        let mut start = plan.start.clone();
        // Only read in positional mode, which never starts from a cursor
        let mut raw_position = match &plan.start {
            FetchStart::Offset(offset) => *offset,
            FetchStart::Cursor(_) => 0,
        };

        // Positional sources are asked for one extra item, so a full last
        // batch is told apart from a source that has more.
        let limit = match self.mode {
            CursorMode::Positional => batch_size + 1,
            CursorMode::Cursored => batch_size,
        };

        loop {
            let Batch {
                items: mut raw,
                next_cursor,
            } = self.source.fetch(start, limit).await?;
            let lookahead = self.mode == CursorMode::Positional && raw.len() > batch_size;
            if lookahead {
                raw.truncate(batch_size);
            }
            let raw_len = raw.len();
            raw_seen += raw_len;
            raw_position += raw_len as u64;
            items.extend(self.filter.apply(raw));

            let next = match self.mode {
                _ if raw_len < batch_size => None,
                CursorMode::Positional => lookahead.then_some(FetchStart::Offset(raw_position)),
                // A cursor API signals its last batch by returning no cursor
                CursorMode::Cursored => match next_cursor {
                    Some(cursor) => {
                        let logical = plan.checkpoint + items.len() as u64;
                        self.ledger.record_checkpoint(logical, &cursor).await;
                        Some(FetchStart::Cursor(cursor))
                    }
                    None => None,
                },
            };

            let Some(next) = next else {
                debug!("Source exhausted after {raw_seen} raw items ({raw_len} in the last batch)");
                return Ok(Replay {
                    items,
                    raw_seen,
                    exhausted: true,
                });
            };
            start = next;

            if items.len() >= batch_size && items.len() >= needed {
                return Ok(Replay {
                    items,
                    raw_seen,
                    exhausted: false,
                });
            }
        }
    }

    // ========================================================================
    // Cached Metadata
    // ========================================================================

    /// Whether a cursor is cached for the first item of page `number`
    pub async fn has_cursor_for_page(&self, number: u64) -> bool {
        if number == 0 {
            return false;
        }
        let index = (number - 1).saturating_mul(self.config.per_page as u64);
        self.ledger.cursor(index).await.is_ok()
    }

    /// Highest confirmed item count
    pub async fn known_object_count(&self) -> Option<u64> {
        self.ledger.known_count().await
    }

    /// Item count at end of source, once reached
    pub async fn final_object_count(&self) -> Option<u64> {
        self.ledger.final_count().await
    }

    /// Number of pages known to exist or possibly exist.
    ///
    /// Exact once the end of the source has been seen. Before that the last
    /// replay stopped on a full batch that had more behind it (a cursor, or a
    /// lookahead item from a positional source), so the page holding the next
    /// item is counted too.
    pub async fn known_page_count(&self) -> Option<u64> {
        let per_page = self.config.per_page as u64;
        if let Some(total) = self.ledger.final_count().await {
            return Some(total.div_ceil(per_page));
        }
        self.ledger
            .known_count()
            .await
            .map(|known| known / per_page + 1)
    }

    /// Last page number, once the end of the source has been seen
    pub async fn final_page(&self) -> Option<u64> {
        self.ledger
            .final_count()
            .await
            .map(|total| total.div_ceil(self.config.per_page as u64))
    }
}

/// Cache namespace for a source and filter pair
fn query_key<T>(source_key: &str, filter: &Filter<T>) -> String {
    match filter.key() {
        Some(key) => format!("{source_key}|filter={key}"),
        None => source_key.to_string(),
    }
}

impl<S: ObjectSource, C: CursorCache> fmt::Debug for Paginator<S, C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Paginator")
            .field("query", &self.ledger.query())
            .field("config", &self.config)
            .field("filter", &self.filter)
            .field("mode", &self.mode)
            .finish_non_exhaustive()
    }
}
