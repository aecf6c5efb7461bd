//! Tests for checkpoint bookkeeping

use super::*;
use crate::cache::{CacheField, CacheKey, CursorCache, MemoryCache};
use crate::error::{Error, Result};
use crate::types::Cursor;
use async_trait::async_trait;
use serde_json::{json, Value};
use std::collections::BTreeSet;

/// Cache whose every call fails
struct BrokenCache;

#[async_trait]
impl CursorCache for BrokenCache {
    async fn get(&self, _key: &CacheKey) -> Result<Option<Value>> {
        Err(Error::cache("connection refused"))
    }

    async fn set(&self, _key: &CacheKey, _value: Value) -> Result<()> {
        Err(Error::cache("connection refused"))
    }
}

// ============================================================================
// Checkpoint Resolution Tests
// ============================================================================

#[test]
fn test_nearest_checkpoint_empty_set() {
    assert_eq!(nearest_checkpoint(&BTreeSet::new(), 0), 0);
    assert_eq!(nearest_checkpoint(&BTreeSet::new(), 95), 0);
}

#[test]
fn test_nearest_checkpoint_none_below_target() {
    let set: BTreeSet<u64> = [30, 60].into_iter().collect();
    assert_eq!(nearest_checkpoint(&set, 29), 0);
}

#[test]
fn test_nearest_checkpoint_picks_true_maximum() {
    let set: BTreeSet<u64> = [7, 13, 22, 40].into_iter().collect();
    assert_eq!(nearest_checkpoint(&set, 13), 13);
    assert_eq!(nearest_checkpoint(&set, 21), 13);
    assert_eq!(nearest_checkpoint(&set, 39), 22);
    assert_eq!(nearest_checkpoint(&set, 1000), 40);
}

#[test]
fn test_nearest_checkpoint_matches_linear_scan() {
    let set: BTreeSet<u64> = [3, 9, 10, 18, 27, 31].into_iter().collect();
    for target in 0..40 {
        let expected = set.iter().copied().filter(|c| *c <= target).max().unwrap_or(0);
        assert_eq!(nearest_checkpoint(&set, target), expected, "target {target}");
    }
}

// ============================================================================
// Ledger Tests
// ============================================================================

#[tokio::test]
async fn test_record_checkpoint_stores_cursor_and_set() {
    let ledger = CheckpointLedger::new(MemoryCache::new(), "q");

    assert!(ledger.cursor(10).await.is_err());
    ledger.record_checkpoint(10, &Cursor::new("c10")).await;
    ledger.record_checkpoint(25, &Cursor::new("c25")).await;
    ledger.record_checkpoint(10, &Cursor::new("c10b")).await;

    assert_eq!(
        ledger.checkpoints().await.into_iter().collect::<Vec<_>>(),
        vec![10, 25]
    );
    assert_eq!(ledger.cursor(10).await.unwrap(), Cursor::new("c10b"));
    assert_eq!(ledger.nearest_checkpoint(24).await, 10);
    assert_eq!(ledger.nearest_checkpoint(9).await, 0);
}

#[tokio::test]
async fn test_cursor_not_found_carries_index() {
    let ledger = CheckpointLedger::new(MemoryCache::new(), "q");
    let err = ledger.cursor(42).await.unwrap_err();
    assert_eq!(err, CursorNotFound { index: 42 });
    assert_eq!(err.to_string(), "No cursor available for item 42");
}

#[tokio::test]
async fn test_known_count_is_monotonic() {
    let ledger = CheckpointLedger::new(MemoryCache::new(), "q");
    assert!(ledger.known_count().await.is_none());

    assert!(ledger.raise_known_count(10).await);
    assert!(ledger.raise_known_count(20).await);
    assert!(!ledger.raise_known_count(15).await);
    assert!(ledger.raise_known_count(20).await);
    assert_eq!(ledger.known_count().await, Some(20));
}

#[tokio::test]
async fn test_final_count_written_once() {
    let ledger = CheckpointLedger::new(MemoryCache::new(), "q");

    assert!(ledger.set_final_count(25).await);
    assert!(!ledger.set_final_count(30).await);
    assert_eq!(ledger.final_count().await, Some(25));
}

#[tokio::test]
async fn test_queries_are_namespaced() {
    let cache = MemoryCache::new();
    let a = CheckpointLedger::new(cache.clone(), "a");
    let b = CheckpointLedger::new(cache.clone(), "b");

    a.raise_known_count(5).await;
    a.record_checkpoint(5, &Cursor::new("a5")).await;

    assert!(b.known_count().await.is_none());
    assert!(b.checkpoints().await.is_empty());
    assert!(b.cursor(5).await.is_err());
}

#[tokio::test]
async fn test_snapshot() {
    let ledger = CheckpointLedger::new(MemoryCache::new(), "q");
    ledger.record_checkpoint(5, &Cursor::new("c5")).await;
    ledger.raise_known_count(10).await;

    let snapshot = ledger.snapshot().await;
    assert_eq!(snapshot.query, "q");
    assert_eq!(snapshot.checkpoints, vec![5]);
    assert_eq!(snapshot.cursors.get(&5), Some(&Cursor::new("c5")));
    assert_eq!(snapshot.known_count, Some(10));
    assert_eq!(snapshot.final_count, None);
}

// ============================================================================
// Degradation Tests
// ============================================================================

#[tokio::test]
async fn test_broken_cache_reads_as_empty() {
    let ledger = CheckpointLedger::new(BrokenCache, "q");

    ledger.record_checkpoint(10, &Cursor::new("c10")).await;
    assert!(ledger.checkpoints().await.is_empty());
    assert_eq!(ledger.nearest_checkpoint(50).await, 0);
    assert!(ledger.cursor(10).await.is_err());
    assert!(ledger.known_count().await.is_none());
    assert!(ledger.raise_known_count(3).await);
    assert!(ledger.final_count().await.is_none());
}

#[tokio::test]
async fn test_undecodable_entries_are_ignored() {
    let cache = MemoryCache::new();
    cache
        .set(&CacheKey::new("q", CacheField::KnownCount), json!("lots"))
        .await
        .unwrap();
    cache
        .set(&CacheKey::new("q", CacheField::Checkpoints), json!({"bad": true}))
        .await
        .unwrap();

    let ledger = CheckpointLedger::new(cache, "q");
    assert!(ledger.known_count().await.is_none());
    assert!(ledger.checkpoints().await.is_empty());
}
