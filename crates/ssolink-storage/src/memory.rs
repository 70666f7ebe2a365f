//! In-memory blob store for hosts without persistence and for tests.

use std::collections::HashMap;

use async_trait::async_trait;
use parking_lot::RwLock;
use ssolink_traits::{BlobStore, Result};

/// Volatile blob store backed by a `HashMap`.
#[derive(Debug, Default)]
pub struct MemoryBlobStore {
    entries: RwLock<HashMap<String, Vec<u8>>>,
}

impl MemoryBlobStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of keys currently stored.
    pub fn len(&self) -> usize {
        self.entries.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.read().is_empty()
    }
}

#[async_trait]
impl BlobStore for MemoryBlobStore {
    async fn get(&self, key: &str) -> Result<Option<Vec<u8>>> {
        Ok(self.entries.read().get(key).cloned())
    }

    async fn update(&self, key: &str, blob: Option<Vec<u8>>) -> Result<()> {
        let mut entries = self.entries.write();
        match blob {
            Some(data) => {
                entries.insert(key.to_string(), data);
            }
            None => {
                entries.remove(key);
            }
        }
        Ok(())
    }
}
