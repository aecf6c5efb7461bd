//! Cursor cache module
//!
//! Key/value persistence for cursors and counts between page requests.
//!
//! # Overview
//!
//! The cache module provides:
//! - `CursorCache` - get/set trait the paginator writes through
//! - `CacheKey` - structured key: query identity plus field
//! - `MemoryCache` - process-local map
//! - `FileCache` - JSON file persistence with atomic writes
//!
//! No backend offers atomicity across keys. Concurrent page requests for the
//! same query may interleave their writes.

mod file;
mod memory;
mod types;

pub use file::FileCache;
pub use memory::MemoryCache;
pub use types::{CacheField, CacheKey, CursorCache};
