//! Persistence: the raw response cache and the SQLite history store.
//!
//! ## Directory Structure
//!
//! ```text
//! cache/                  # optional, permanent raw responses
//! └── {sha256(url)}.body
//! data.sqlite             # demand, summary and data tables
//! ```

pub mod cache;
pub mod migrations;
pub mod store;

use crate::error::Result;

// Re-export for convenience
pub use cache::{DisabledCache, FileCache};
pub use store::{RunTransaction, Store, StoreStats};

/// Storage for raw response bodies keyed by request URL.
pub trait ResponseCache {
    /// Stored payload for `url`, if any.
    fn get(&self, url: &str) -> Result<Option<Vec<u8>>>;

    /// Store the payload for `url`, replacing any previous one.
    fn put(&self, url: &str, bytes: &[u8]) -> Result<()>;
}
