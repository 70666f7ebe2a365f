//! Profile Store
//!
//! Durable CRUD over the id → profile mapping plus the current profile
//! pointer. The backing store only offers whole-blob reads and writes, so
//! every mutation reads the full mapping, changes it and writes it back.
//! The store takes no locks of its own: callers serialize mutations on one
//! instance.

use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

use parking_lot::Mutex;
use ssolink_models::{
    ConnectionState, MetadataUpdate, Profile, ProfileMetadata, SsoProfile, StoredProfile,
};
use ssolink_traits::{AuditAction, AuditEvent, AuditSink, BlobStore, ConnectionError, Result};
use tracing::{debug, info};

use crate::config::AuthConfig;

/// Call site name used by [`ProfileStore::get_profile_or_throw`].
pub const GET_PROFILE_CALL_SITE: &str = "getProfileOrThrow";

type ProfileMap = BTreeMap<String, StoredProfile>;

/// Persistent store of connection profiles
pub struct ProfileStore {
    backend: Arc<dyn BlobStore>,
    audit: Arc<dyn AuditSink>,
    profiles_key: String,
    current_profile_key: String,
    /// Last (id, state) reported as `Succeeded` per lookup call site
    last_emitted: Mutex<HashMap<&'static str, (String, ConnectionState)>>,
}

impl ProfileStore {
    /// Create a store using the default persistence keys
    pub fn new(backend: Arc<dyn BlobStore>, audit: Arc<dyn AuditSink>) -> Self {
        Self::with_config(backend, audit, &AuthConfig::default())
    }

    /// Create a store using the keys from `config`
    pub fn with_config(
        backend: Arc<dyn BlobStore>,
        audit: Arc<dyn AuditSink>,
        config: &AuthConfig,
    ) -> Self {
        Self {
            backend,
            audit,
            profiles_key: config.profiles_key.clone(),
            current_profile_key: config.current_profile_key.clone(),
            last_emitted: Mutex::new(HashMap::new()),
        }
    }

    /// Look up a profile. A missing id is not an error.
    pub async fn get_profile(&self, id: &str) -> Result<Option<StoredProfile>> {
        let mut profiles = self.load().await?;
        Ok(profiles.remove(id))
    }

    /// Look up a profile that must exist.
    pub async fn get_profile_or_throw(&self, id: &str) -> Result<StoredProfile> {
        self.get_profile_or_throw_from(GET_PROFILE_CALL_SITE, id)
            .await
    }

    /// Look up a profile that must exist, de-duplicating audit events per
    /// `call_site`.
    ///
    /// A hit is reported only when the (id, connection state) pair differs
    /// from the last one reported for the same call site. A miss is always
    /// reported.
    pub async fn get_profile_or_throw_from(
        &self,
        call_site: &'static str,
        id: &str,
    ) -> Result<StoredProfile> {
        let lookup = match self.get_profile(id).await {
            Ok(Some(profile)) => Ok(profile),
            Ok(None) => Err(ConnectionError::not_found(id)),
            Err(error) => Err(error),
        };

        match &lookup {
            Ok(profile) => {
                let current = (id.to_string(), profile.connection_state());
                let changed = {
                    let mut last_emitted = self.last_emitted.lock();
                    if last_emitted.get(call_site) == Some(&current) {
                        false
                    } else {
                        last_emitted.insert(call_site, current);
                        true
                    }
                };
                if changed {
                    self.audit.record(
                        AuditEvent::succeeded(AuditAction::GetProfile, id)
                            .with_sso(profile.profile.as_sso()),
                    );
                }
            }
            Err(error) => {
                self.last_emitted.lock().remove(call_site);
                self.audit
                    .record(AuditEvent::failed(AuditAction::GetProfile, id, error.kind()));
            }
        }

        lookup
    }

    /// Every stored profile. Order carries no meaning.
    pub async fn list_profiles(&self) -> Result<Vec<(String, StoredProfile)>> {
        Ok(self.load().await?.into_iter().collect())
    }

    /// Store a new profile with fresh metadata.
    ///
    /// Re-adding an existing id replaces it, but never with a profile of a
    /// different type.
    pub async fn add_profile(&self, id: &str, profile: Profile) -> Result<StoredProfile> {
        let result = self
            .insert_profile(id, StoredProfile::new(profile))
            .await;
        self.record_outcome(AuditAction::AddProfile, id, &result);
        result
    }

    /// Store a new profile and tag its metadata with the creating `source`.
    pub async fn add_profile_from_source(
        &self,
        id: &str,
        profile: Profile,
        source: &str,
    ) -> Result<StoredProfile> {
        let stored = StoredProfile {
            profile,
            metadata: ProfileMetadata {
                source: Some(source.to_string()),
                ..Default::default()
            },
        };
        let result = self.insert_profile(id, stored).await;
        self.record_outcome(AuditAction::AddProfile, id, &result);
        result
    }

    /// Replace the body of an existing profile, keeping its metadata.
    pub async fn update_profile(&self, id: &str, profile: Profile) -> Result<StoredProfile> {
        let result = self.replace_profile(id, profile).await;
        self.record_outcome(AuditAction::UpdateProfile, id, &result);
        result
    }

    /// Merge metadata fields into an existing profile, keeping its body.
    pub async fn update_metadata(&self, id: &str, update: MetadataUpdate) -> Result<StoredProfile> {
        let result = self.merge_metadata(id, update).await;
        self.record_outcome(AuditAction::UpdateMetadata, id, &result);
        result
    }

    /// Remove a profile. Removing a missing id is a no-op.
    pub async fn delete_profile(&self, id: &str) -> Result<()> {
        match self.remove_profile(id).await {
            Ok(Some(removed)) => {
                info!(profile_id = id, "Profile deleted");
                self.record_outcome(AuditAction::DeleteProfile, id, &Ok(removed));
                Ok(())
            }
            Ok(None) => {
                debug!(profile_id = id, "Delete skipped, profile not stored");
                Ok(())
            }
            Err(error) => {
                self.audit.record(AuditEvent::failed(
                    AuditAction::DeleteProfile,
                    id,
                    error.kind(),
                ));
                Err(error)
            }
        }
    }

    /// Id of the profile currently selected by the user
    pub async fn get_current_profile_id(&self) -> Result<Option<String>> {
        match self.backend.get(&self.current_profile_key).await? {
            Some(bytes) => Ok(serde_json::from_slice(&bytes)?),
            None => Ok(None),
        }
    }

    /// Point the current profile at `id`, or clear it with `None`
    pub async fn set_current_profile_id(&self, id: Option<&str>) -> Result<()> {
        let blob = id.map(serde_json::to_vec).transpose()?;
        self.backend.update(&self.current_profile_key, blob).await?;
        debug!(profile_id = ?id, "Current profile updated");
        Ok(())
    }

    /// Forget which lookups were already reported.
    pub fn reset_audit_state(&self) {
        self.last_emitted.lock().clear();
    }

    async fn insert_profile(&self, id: &str, stored: StoredProfile) -> Result<StoredProfile> {
        let mut profiles = self.load().await?;
        if let Some(existing) = profiles.get(id) {
            ensure_same_type(id, existing, &stored.profile)?;
        }
        profiles.insert(id.to_string(), stored.clone());
        self.save(&profiles).await?;
        info!(profile_id = id, profile_type = %stored.profile_type(), "Profile added");
        Ok(stored)
    }

    async fn replace_profile(&self, id: &str, profile: Profile) -> Result<StoredProfile> {
        let mut profiles = self.load().await?;
        let existing = profiles
            .get_mut(id)
            .ok_or_else(|| ConnectionError::not_found(id))?;
        ensure_same_type(id, existing, &profile)?;

        existing.profile = merge_profile(existing.profile.clone(), profile);
        let updated = existing.clone();
        self.save(&profiles).await?;
        Ok(updated)
    }

    async fn merge_metadata(&self, id: &str, update: MetadataUpdate) -> Result<StoredProfile> {
        let mut profiles = self.load().await?;
        let existing = profiles
            .get_mut(id)
            .ok_or_else(|| ConnectionError::not_found(id))?;

        update.apply_to(&mut existing.metadata);
        let updated = existing.clone();
        self.save(&profiles).await?;
        Ok(updated)
    }

    async fn remove_profile(&self, id: &str) -> Result<Option<StoredProfile>> {
        let mut profiles = self.load().await?;
        let removed = profiles.remove(id);
        if removed.is_some() {
            self.save(&profiles).await?;
        }
        Ok(removed)
    }

    async fn load(&self) -> Result<ProfileMap> {
        match self.backend.get(&self.profiles_key).await? {
            Some(bytes) => Ok(serde_json::from_slice(&bytes)?),
            None => Ok(ProfileMap::new()),
        }
    }

    async fn save(&self, profiles: &ProfileMap) -> Result<()> {
        let bytes = serde_json::to_vec(profiles)?;
        self.backend.update(&self.profiles_key, Some(bytes)).await
    }

    fn record_outcome(&self, action: AuditAction, id: &str, result: &Result<StoredProfile>) {
        let event = match result {
            Ok(stored) => AuditEvent::succeeded(action, id).with_sso(stored.profile.as_sso()),
            Err(error) => AuditEvent::failed(action, id, error.kind()),
        };
        self.audit.record(event);
    }
}

fn ensure_same_type(id: &str, existing: &StoredProfile, requested: &Profile) -> Result<()> {
    if existing.profile_type() != requested.profile_type() {
        return Err(ConnectionError::ProfileTypeMismatch {
            id: id.to_string(),
            existing: existing.profile_type(),
            requested: requested.profile_type(),
        });
    }
    Ok(())
}

/// Shallow merge of a profile update: fields the update leaves unset keep
/// their stored value.
fn merge_profile(existing: Profile, update: Profile) -> Profile {
    match (existing, update) {
        (Profile::Sso(old), Profile::Sso(new)) => Profile::Sso(SsoProfile {
            scopes: new.scopes.or(old.scopes),
            ..new
        }),
        (_, update) => update,
    }
}
