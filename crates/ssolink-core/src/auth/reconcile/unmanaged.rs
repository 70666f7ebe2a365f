//! Unmanaged-profile sync
//!
//! Mirrors statically configured credential providers as `iam/unknown`
//! profiles and drops linked profiles whose SSO session is gone.

use std::collections::HashSet;

use ssolink_models::{IamProfile, Profile, ProfileType, is_linked_profile_id};
use ssolink_traits::{CredentialProviderRegistry, Result};
use tracing::{debug, info};

use super::{Reconciler, SOURCE_SHARED_CREDENTIALS, SyncReport};

impl Reconciler {
    /// Align stored IAM profiles with the registered credential providers.
    pub async fn sync_unmanaged_profiles(
        &self,
        registry: &dyn CredentialProviderRegistry,
    ) -> Result<SyncReport> {
        let providers = registry.get_credential_provider_names().await?;
        let stored = self.store.list_profiles().await?;
        let sso_ids: HashSet<&str> = stored
            .iter()
            .filter(|(_, profile)| profile.profile_type() == ProfileType::Sso)
            .map(|(id, _)| id.as_str())
            .collect();

        let mut report = SyncReport::default();
        for (id, profile) in &stored {
            match &profile.profile {
                Profile::Iam(IamProfile::Linked(linked))
                    if !sso_ids.contains(linked.sso_session.as_str()) =>
                {
                    self.store.delete_profile(id).await?;
                    registry.remove_provider(id).await?;
                    info!(
                        profile_id = %id,
                        sso_session = %linked.sso_session,
                        "Removed orphaned linked profile"
                    );
                    report.orphaned.push(id.clone());
                }
                Profile::Iam(IamProfile::Unknown(_)) if !providers.contains_key(id) => {
                    self.store.delete_profile(id).await?;
                    info!(profile_id = %id, "Removed profile of vanished credential provider");
                    report.removed.push(id.clone());
                }
                _ => {}
            }
        }

        let stored_ids: HashSet<&str> = stored.iter().map(|(id, _)| id.as_str()).collect();
        let mut new_ids: Vec<&String> = providers
            .keys()
            .filter(|id| !is_linked_profile_id(id) && !stored_ids.contains(id.as_str()))
            .collect();
        new_ids.sort();

        for id in new_ids {
            let profile = Profile::unknown_iam(id.as_str());
            self.store
                .add_profile_from_source(id, profile, SOURCE_SHARED_CREDENTIALS)
                .await?;
            debug!(profile_id = %id, "Added profile for credential provider");
            report.added.push(id.clone());
        }

        if let Some(current) = self.store.get_current_profile_id().await?
            && (report.removed.contains(&current) || report.orphaned.contains(&current))
        {
            self.store.set_current_profile_id(None).await?;
            info!(profile_id = %current, "Cleared current profile removed by sync");
        }

        Ok(report)
    }
}
