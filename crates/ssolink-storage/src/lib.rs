//! ssolink Storage - backing blob stores for connection profiles
//!
//! The profile store only needs whole-blob `get`/`update` semantics. This
//! crate provides two implementations of that contract:
//!
//! - [`ProfileStateStorage`] - a redb table, one entry per key
//! - [`MemoryBlobStore`] - a volatile map for hosts without persistence
//!
//! # Tables
//!
//! - `profile_state` - profile mapping and current profile pointer

pub mod memory;
pub mod paths;
pub mod profile_state;

mod blob_table;

use anyhow::Result;
use redb::Database;
use std::path::Path;
use std::sync::Arc;

pub use memory::MemoryBlobStore;
pub use profile_state::ProfileStateStorage;
pub use blob_table::{BlobTable, BlobTableDefinition};

/// Central storage manager that initializes all storage subsystems
pub struct Storage {
    db: Arc<Database>,
    pub profile_state: ProfileStateStorage,
}

impl Storage {
    /// Create a new storage instance at the given path.
    ///
    /// This will create the database file if it doesn't exist and initialize
    /// all required tables.
    pub fn new(path: impl AsRef<Path>) -> Result<Self> {
        let db = Arc::new(Database::create(path.as_ref())?);
        Self::with_database(db)
    }

    /// Create a storage instance backed by memory only (for testing).
    pub fn in_memory() -> Result<Self> {
        let db = Arc::new(
            Database::builder().create_with_backend(redb::backends::InMemoryBackend::new())?,
        );
        Self::with_database(db)
    }

    fn with_database(db: Arc<Database>) -> Result<Self> {
        let profile_state = ProfileStateStorage::new(db.clone())?;
        Ok(Self { db, profile_state })
    }

    /// Get a reference to the underlying database
    pub fn get_db(&self) -> Arc<Database> {
        self.db.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ssolink_traits::BlobStore;

    #[tokio::test]
    async fn test_in_memory_storage_shares_database() {
        let storage = Storage::in_memory().unwrap();
        storage
            .profile_state
            .update("auth.profiles", Some(b"{}".to_vec()))
            .await
            .unwrap();

        let reopened = ProfileStateStorage::new(storage.get_db()).unwrap();
        assert_eq!(reopened.keys().unwrap(), vec!["auth.profiles"]);
    }
}
