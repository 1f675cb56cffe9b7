//! Pure planning engine: dish expansion and shopping-list aggregation.
//!
//! # Responsibility
//! - Resolve dishes to per-serving ingredient lines.
//! - Expand composite dishes recursively into leaf ingredient lines.
//! - Merge expansions of a menu range into a categorized shopping list.
//!
//! # Invariants
//! - No I/O happens inside this module; callers provide in-memory snapshots.
//! - Every failure aborts the whole computation; no partial list is produced.

pub mod aggregator;
pub mod catalog;
pub mod category;
pub mod error;
pub mod expander;
