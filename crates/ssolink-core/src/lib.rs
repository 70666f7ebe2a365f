pub mod auth;
pub mod config;

#[cfg(any(test, feature = "test-utils"))]
pub mod testing;

pub use auth::{
    Connection, ConnectionManager, DiscoveryReport, ProfileStore, Reconciler, StatefulConnection,
    SyncReport,
};
pub use config::AuthConfig;

use ssolink_storage::{MemoryBlobStore, Storage};
use ssolink_traits::{AuditSink, BlobStore, Notifier, ProviderFactory, Result};
use std::sync::Arc;
use tracing::info;

/// Core auth state shared by every host surface
///
/// Wires the backing store selected by [`AuthConfig`] to the profile store,
/// the reconciler and the connection manager.
pub struct AuthCore {
    pub config: AuthConfig,
    pub storage: Option<Arc<Storage>>,
    pub store: Arc<ProfileStore>,
    pub reconciler: Reconciler,
    pub connections: ConnectionManager,
}

impl AuthCore {
    pub fn new(
        config: AuthConfig,
        audit: Arc<dyn AuditSink>,
        notifier: Arc<dyn Notifier>,
        factory: Arc<dyn ProviderFactory>,
    ) -> Result<Self> {
        config.validate()?;

        let (storage, backend): (Option<Arc<Storage>>, Arc<dyn BlobStore>) =
            match &config.storage_path {
                Some(path) => {
                    let storage = Arc::new(Storage::new(path)?);
                    let backend: Arc<dyn BlobStore> = Arc::new(storage.profile_state.clone());
                    info!(path = %path.display(), "Initializing ssolink with redb storage");
                    (Some(storage), backend)
                }
                None => {
                    info!("Initializing ssolink with in-memory storage");
                    let backend: Arc<dyn BlobStore> = Arc::new(MemoryBlobStore::new());
                    (None, backend)
                }
            };

        let store = Arc::new(ProfileStore::with_config(backend, audit, &config));
        let reconciler = Reconciler::with_config(store.clone(), notifier, &config);
        let connections = ConnectionManager::new(store.clone(), factory);

        Ok(Self {
            config,
            storage,
            store,
            reconciler,
            connections,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::StaticProviderFactory;
    use ssolink_models::SsoProfile;
    use ssolink_telemetry::{RecordingAuditSink, RecordingNotifier};
    use tempfile::tempdir;

    fn open(config: AuthConfig) -> AuthCore {
        AuthCore::new(
            config,
            Arc::new(RecordingAuditSink::new()),
            Arc::new(RecordingNotifier::new()),
            Arc::new(StaticProviderFactory::new()),
        )
        .unwrap()
    }

    #[tokio::test]
    async fn test_in_memory_core() {
        let core = open(AuthConfig::default());
        assert!(core.storage.is_none());

        let conn = core
            .connections
            .create_sso_connection(SsoProfile::new("https://x", "us-east-1"))
            .await
            .unwrap();
        assert!(core.store.get_profile(conn.id()).await.unwrap().is_some());
    }

    #[tokio::test]
    async fn test_redb_core_persists_across_reopen() {
        let temp_dir = tempdir().unwrap();
        let config = AuthConfig {
            storage_path: Some(temp_dir.path().join("profiles.db")),
            ..Default::default()
        };

        let id = {
            let core = open(config.clone());
            let conn = core
                .connections
                .create_sso_connection(SsoProfile::new("https://x", "us-east-1"))
                .await
                .unwrap();
            core.connections.use_connection(conn.id()).await.unwrap();
            conn.id().to_string()
        };

        let core = open(config);
        let active = core.connections.active_connection().await.unwrap().unwrap();
        assert_eq!(active.id(), id);
    }

    #[test]
    fn test_invalid_config_rejected() {
        let config = AuthConfig {
            current_profile_key: "auth.profiles".to_string(),
            ..Default::default()
        };
        let result = AuthCore::new(
            config,
            Arc::new(RecordingAuditSink::new()),
            Arc::new(RecordingNotifier::new()),
            Arc::new(StaticProviderFactory::new()),
        );
        assert!(result.is_err());
    }
}
