//! Object source module
//!
//! Supports: in-memory vectors, JSON HTTP APIs with cursor tokens
//!
//! # Overview
//!
//! An object source is whatever the paginator reads items from. It only has
//! to answer "give me up to N items starting here", where "here" is either a
//! raw position or a cursor produced by an earlier fetch. Sources that cannot
//! hand out cursors are read positionally.

mod http;
mod memory;
mod types;

pub use http::{
    extract_path, extract_records, extract_string, HttpCursorSource, HttpSourceConfig,
};
pub use memory::VecSource;
pub use types::{Batch, FetchStart, ObjectSource};

#[cfg(test)]
mod tests;
