//! State types for checkpoint bookkeeping

use crate::types::Cursor;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use thiserror::Error;

/// No cursor is cached for a checkpoint.
///
/// Only the paginator sees this. It falls back to a positional fetch.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
#[error("No cursor available for item {index}")]
pub struct CursorNotFound {
    /// Checkpoint index that was looked up
    pub index: u64,
}

/// Largest checkpoint at or below `target`, or 0 when there is none
pub fn nearest_checkpoint(checkpoints: &BTreeSet<u64>, target: u64) -> u64 {
    checkpoints.range(..=target).next_back().copied().unwrap_or(0)
}

/// Everything cached for one query
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuerySnapshot {
    /// Query identity
    pub query: String,
    /// Item indices with a registered checkpoint
    pub checkpoints: Vec<u64>,
    /// Cursors found for those checkpoints
    pub cursors: BTreeMap<u64, Cursor>,
    /// Highest confirmed item count
    pub known_count: Option<u64>,
    /// Item count at end of source
    pub final_count: Option<u64>,
}
