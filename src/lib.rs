// Allow common clippy pedantic lints that aren't critical for this codebase
#![allow(clippy::cast_possible_truncation)]
#![allow(clippy::cast_sign_loss)]
#![allow(clippy::cast_lossless)]
#![allow(clippy::too_many_lines)]
#![allow(clippy::must_use_candidate)]
#![allow(clippy::items_after_statements)]
#![allow(clippy::needless_pass_by_value)]

//! # cursor-pages
//!
//! Page-numbered pagination over data sources that only expose forward-moving,
//! opaque continuation tokens.
//!
//! ## Features
//!
//! - **1-based pages over cursor APIs**: ask for page N, get exactly that slice
//! - **Cursor checkpoints**: cursors captured at batch boundaries are cached so
//!   later requests resume close to their target instead of rescanning
//! - **Post-fetch filtering**: an optional predicate drops items before they
//!   count toward a page
//! - **Cheap navigation**: `has_next`, page windows and final-page detection
//!   read the cached known/final counts, never the source
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use cursor_pages::cache::MemoryCache;
//! use cursor_pages::pagination::{Paginator, PaginatorConfig};
//! use cursor_pages::source::VecSource;
//!
//! #[tokio::main]
//! async fn main() -> cursor_pages::Result<()> {
//!     let source = VecSource::cursored("numbers", (0..100).collect::<Vec<u32>>());
//!     let paginator = Paginator::new(source, MemoryCache::new(), PaginatorConfig::new(10))?
//!         .with_filter("multiples-of-3", |n: &u32| n % 3 == 0);
//!
//!     let page = paginator.page(2).await?;
//!     println!("{:?} has_next={}", page.items(), page.has_next().await);
//!     Ok(())
//! }
//! ```
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────┐
//! │  Paginator::page(n) ──► Page { items, number, &Paginator }   │
//! └──────────────────────────────────────────────────────────────┘
//!          │ resolve checkpoint          │ replay batches
//! ┌────────┴─────────┐          ┌────────┴─────────┐
//! │ CheckpointLedger │          │   ObjectSource   │
//! │ cursors, counts  │          │ VecSource / HTTP │
//! └────────┬─────────┘          └──────────────────┘
//! ┌────────┴─────────┐
//! │   CursorCache    │
//! │ Memory / File    │
//! └──────────────────┘
//! ```

#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]
#![allow(clippy::doc_markdown)]

// ============================================================================
// Module declarations
// ============================================================================

/// Error types for the crate
pub mod error;

/// Common types: cursors and page numbers
pub mod types;

/// Object sources the paginator reads from
pub mod source;

/// Cursor cache backends
pub mod cache;

/// Checkpoint and count bookkeeping on top of a cursor cache
pub mod state;

/// The paginator and its pages
pub mod pagination;

/// YAML run configuration
pub mod config;

/// Command-line interface
pub mod cli;

// ============================================================================
// Re-exports
// ============================================================================

pub use error::{Error, Result};
pub use types::{Cursor, IntoPageNumber, OutOfRange};

pub use pagination::{Filter, Page, Paginator, PaginatorConfig};

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Crate name
pub const NAME: &str = env!("CARGO_PKG_NAME");
