//! Freshness detection for incremental chains.
//!
//! Outputs are compared against their sources by mtime only. Both sides
//! live on the same filesystem, so timestamps are comparable.

mod mtime;

pub use mtime::{get_mtime, is_output_fresh};
