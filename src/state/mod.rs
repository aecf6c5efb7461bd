//! State management module
//!
//! Handles cursor checkpoints and item counts for one query identity.
//! State lives in a `CursorCache` between page requests.
//!
//! # Overview
//!
//! The state module provides:
//! - `CheckpointLedger` - typed, advisory access to a query's cached state
//! - `nearest_checkpoint` - checkpoint resolution for a target index
//! - `QuerySnapshot` - everything cached for a query, for inspection

mod ledger;
mod types;

pub use ledger::CheckpointLedger;
pub use types::{nearest_checkpoint, CursorNotFound, QuerySnapshot};

#[cfg(test)]
mod tests;
