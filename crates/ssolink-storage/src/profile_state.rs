//! Profile state storage - redb-backed blob store for connection profiles.

use async_trait::async_trait;
use ssolink_traits::{BlobStore, Result};
use tracing::debug;

use crate::{BlobTable, define_blob_table};

define_blob_table! {
    /// Whole-blob profile state persisted in a redb table.
    pub struct ProfileStateStorage { table: "profile_state" }
}

#[async_trait]
impl BlobStore for ProfileStateStorage {
    async fn get(&self, key: &str) -> Result<Option<Vec<u8>>> {
        Ok(self.read_blob(key)?)
    }

    async fn update(&self, key: &str, blob: Option<Vec<u8>>) -> Result<()> {
        let bytes = blob.as_ref().map_or(0, Vec::len);
        let existed = self.replace_blob(key, blob.as_deref())?;
        debug!(key, bytes, existed, "Profile state updated");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use redb::Database;
    use std::sync::Arc;
    use tempfile::tempdir;

    fn setup_test_storage() -> (ProfileStateStorage, tempfile::TempDir) {
        let temp_dir = tempdir().unwrap();
        let db_path = temp_dir.path().join("profile_state.db");
        let db = Arc::new(Database::create(db_path).unwrap());
        let storage = ProfileStateStorage::new(db).unwrap();
        (storage, temp_dir)
    }

    #[tokio::test]
    async fn test_get_missing_key_returns_none() {
        let (storage, _temp_dir) = setup_test_storage();
        assert!(storage.get("auth.profiles").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_update_and_get() {
        let (storage, _temp_dir) = setup_test_storage();

        storage
            .update("auth.currentProfileId", Some(b"sso:1".to_vec()))
            .await
            .unwrap();

        let value = storage.get("auth.currentProfileId").await.unwrap();
        assert_eq!(value.as_deref(), Some(&b"sso:1"[..]));
        assert_eq!(storage.keys().unwrap(), vec!["auth.currentProfileId"]);
    }

    #[tokio::test]
    async fn test_update_none_removes_key() {
        let (storage, _temp_dir) = setup_test_storage();

        storage.update("k", Some(b"v".to_vec())).await.unwrap();
        storage.update("k", None).await.unwrap();
        storage.update("k", None).await.unwrap();

        assert!(storage.get("k").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_state_survives_reopen() {
        let temp_dir = tempdir().unwrap();
        let db_path = temp_dir.path().join("reopen.db");

        {
            let db = Arc::new(Database::create(&db_path).unwrap());
            let storage = ProfileStateStorage::new(db).unwrap();
            storage.update("k", Some(b"persisted".to_vec())).await.unwrap();
        }

        let db = Arc::new(Database::create(&db_path).unwrap());
        let storage = ProfileStateStorage::new(db).unwrap();
        let value = storage.get("k").await.unwrap();
        assert_eq!(value.as_deref(), Some(&b"persisted"[..]));
    }
}
