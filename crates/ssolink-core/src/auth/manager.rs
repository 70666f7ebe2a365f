//! Connection Manager
//!
//! Host-facing entry point: creates SSO connections, tracks the active one
//! and keeps connection state in sync with the profile store.

use std::sync::Arc;

use ssolink_models::{ConnectionState, MetadataUpdate, Profile, SsoProfile};
use ssolink_traits::{ProviderFactory, Result};
use tracing::{debug, info};
use uuid::Uuid;

use super::connection::StatefulConnection;
use super::store::ProfileStore;

const USE_CONNECTION_CALL_SITE: &str = "useConnection";
const CONNECTION_STATE_CALL_SITE: &str = "getConnectionState";

/// Connection lifecycle on top of a [`ProfileStore`]
pub struct ConnectionManager {
    store: Arc<ProfileStore>,
    factory: Arc<dyn ProviderFactory>,
}

impl ConnectionManager {
    pub fn new(store: Arc<ProfileStore>, factory: Arc<dyn ProviderFactory>) -> Self {
        Self { store, factory }
    }

    /// Store a new SSO session under a fresh id.
    pub async fn create_sso_connection(&self, profile: SsoProfile) -> Result<StatefulConnection> {
        let id = Uuid::new_v4().to_string();
        let stored = self.store.add_profile(&id, Profile::Sso(profile)).await?;
        info!(connection_id = %id, label = %stored.label(), "SSO connection created");
        Ok(StatefulConnection::from_stored(&id, &stored, self.factory.as_ref()))
    }

    pub async fn list_connections(&self) -> Result<Vec<StatefulConnection>> {
        Ok(self
            .store
            .list_profiles()
            .await?
            .iter()
            .map(|(id, stored)| StatefulConnection::from_stored(id, stored, self.factory.as_ref()))
            .collect())
    }

    pub async fn get_connection(&self, id: &str) -> Result<Option<StatefulConnection>> {
        Ok(self
            .store
            .get_profile(id)
            .await?
            .map(|stored| StatefulConnection::from_stored(id, &stored, self.factory.as_ref())))
    }

    /// Make `id` the active connection. The profile must exist.
    pub async fn use_connection(&self, id: &str) -> Result<StatefulConnection> {
        let stored = self
            .store
            .get_profile_or_throw_from(USE_CONNECTION_CALL_SITE, id)
            .await?;
        self.store.set_current_profile_id(Some(id)).await?;
        info!(connection_id = id, "Active connection changed");
        Ok(StatefulConnection::from_stored(id, &stored, self.factory.as_ref()))
    }

    /// The active connection, if any.
    ///
    /// A pointer to a profile that no longer exists is cleared.
    pub async fn active_connection(&self) -> Result<Option<StatefulConnection>> {
        let Some(id) = self.store.get_current_profile_id().await? else {
            return Ok(None);
        };

        match self.store.get_profile(&id).await? {
            Some(stored) => Ok(Some(StatefulConnection::from_stored(
                &id,
                &stored,
                self.factory.as_ref(),
            ))),
            None => {
                debug!(connection_id = %id, "Clearing dangling active connection");
                self.store.set_current_profile_id(None).await?;
                Ok(None)
            }
        }
    }

    pub async fn update_connection_state(
        &self,
        id: &str,
        state: ConnectionState,
    ) -> Result<StatefulConnection> {
        let stored = self
            .store
            .update_metadata(id, MetadataUpdate::state(state))
            .await?;
        debug!(connection_id = id, %state, "Connection state updated");
        Ok(StatefulConnection::from_stored(id, &stored, self.factory.as_ref()))
    }

    pub async fn get_connection_state(&self, id: &str) -> Result<ConnectionState> {
        Ok(self
            .store
            .get_profile_or_throw_from(CONNECTION_STATE_CALL_SITE, id)
            .await?
            .connection_state())
    }

    /// Sign out of the active connection and forget it.
    pub async fn logout(&self) -> Result<()> {
        let Some(active) = self.active_connection().await? else {
            return Ok(());
        };

        self.update_connection_state(active.id(), ConnectionState::Unauthenticated)
            .await?;
        self.store.set_current_profile_id(None).await?;
        info!(connection_id = active.id(), "Logged out");
        Ok(())
    }

    /// Delete a connection. Deleting an SSO session also deletes the linked
    /// profiles discovered through it.
    pub async fn delete_connection(&self, id: &str) -> Result<Vec<String>> {
        let mut deleted = Vec::new();

        if let Some(stored) = self.store.get_profile(id).await?
            && stored.profile.as_sso().is_some()
        {
            for (linked_id, profile) in self.store.list_profiles().await? {
                if profile
                    .profile
                    .as_linked()
                    .is_some_and(|linked| linked.sso_session == id)
                {
                    self.store.delete_profile(&linked_id).await?;
                    deleted.push(linked_id);
                }
            }
        }

        self.store.delete_profile(id).await?;
        deleted.push(id.to_string());

        if let Some(current) = self.store.get_current_profile_id().await?
            && deleted.contains(&current)
        {
            self.store.set_current_profile_id(None).await?;
        }

        info!(connection_id = id, deleted = deleted.len(), "Connection deleted");
        Ok(deleted)
    }

    pub fn store(&self) -> &Arc<ProfileStore> {
        &self.store
    }
}
