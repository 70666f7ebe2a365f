//! Backing store abstraction.
//!
//! The persisted state of the profile store lives behind a whole-blob
//! key-value interface. There are no per-key transactions: readers get the
//! complete value and writers replace it.

use async_trait::async_trait;

use crate::error::Result;

/// Whole-blob key-value store.
#[async_trait]
pub trait BlobStore: Send + Sync {
    /// Read the blob stored under `key`, `None` when it was never written.
    async fn get(&self, key: &str) -> Result<Option<Vec<u8>>>;

    /// Replace the blob stored under `key`. `None` removes it.
    async fn update(&self, key: &str, blob: Option<Vec<u8>>) -> Result<()>;
}
