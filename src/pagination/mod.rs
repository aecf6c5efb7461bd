//! Pagination module
//!
//! Page-numbered access to sources that only move forward.
//!
//! # Overview
//!
//! `Paginator::page(n)` maps page `n` to its first item index, resumes from
//! the nearest cached cursor checkpoint at or below it, replays batches
//! forward through the optional filter and slices out the page. Cursors
//! captured along the way and the running item counts are written back to
//! the cursor cache for the next request.

mod page;
mod paginator;
mod types;

pub use page::Page;
pub use paginator::Paginator;
pub use types::{CursorMode, Filter, PaginatorConfig};
