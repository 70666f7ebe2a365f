//! Linked-profile discovery
//!
//! Walks the account/role catalog of an SSO session and keeps one
//! `iam/linked` profile per (account, role) pair. New profiles are yielded
//! as they are created. Once the catalog has been fully drained, linked
//! profiles of the session that no longer appear in it are deleted.

use std::collections::HashSet;

use async_stream::try_stream;
use futures::{Stream, StreamExt};
use ssolink_models::{
    LinkedIamProfile, ProfileType, SsoProfile, StoredProfile, linked_profile_id,
    truncate_start_url,
};
use ssolink_traits::{BoxStream, ConnectionError, FederationClient, Result};
use tracing::{debug, info, warn};

use super::{DiscoveryReport, Reconciler, SOURCE_DISCOVERY};

/// Call site used when a sync run resolves its source profile
const SYNC_CALL_SITE: &str = "syncLinkedProfiles";

enum DiscoveryEvent {
    Created(String, StoredProfile),
    Removed(String),
    Finished {
        accounts_seen: usize,
        roles_found: usize,
        degraded: bool,
    },
}

impl Reconciler {
    /// Lazily discover the linked profiles of `source_id`.
    ///
    /// Only newly created profiles are yielded. Dropping the stream stops
    /// pagination and skips stale cleanup.
    pub fn discover_linked_profiles<'a>(
        &'a self,
        source_id: &'a str,
        source: &'a SsoProfile,
        client: &'a dyn FederationClient,
    ) -> BoxStream<'a, Result<(String, StoredProfile)>> {
        Box::pin(
            self.discovery_events(source_id, source, client)
                .filter_map(|event| async move {
                    match event {
                        Ok(DiscoveryEvent::Created(id, stored)) => Some(Ok((id, stored))),
                        Ok(DiscoveryEvent::Removed(_) | DiscoveryEvent::Finished { .. }) => None,
                        Err(error) => Some(Err(error)),
                    }
                }),
        )
    }

    /// Run discovery for a stored `sso` profile to completion.
    pub async fn sync_linked_profiles(
        &self,
        source_id: &str,
        client: &dyn FederationClient,
    ) -> Result<DiscoveryReport> {
        let stored = self
            .store
            .get_profile_or_throw_from(SYNC_CALL_SITE, source_id)
            .await?;
        let Some(source) = stored.profile.as_sso() else {
            return Err(ConnectionError::ProfileTypeMismatch {
                id: source_id.to_string(),
                existing: stored.profile_type(),
                requested: ProfileType::Sso,
            });
        };

        let mut report = DiscoveryReport::default();
        let mut events = Box::pin(self.discovery_events(source_id, source, client));
        while let Some(event) = events.next().await {
            match event? {
                DiscoveryEvent::Created(id, _) => report.created.push(id),
                DiscoveryEvent::Removed(id) => report.removed.push(id),
                DiscoveryEvent::Finished {
                    accounts_seen,
                    roles_found,
                    degraded,
                } => {
                    report.accounts_seen = accounts_seen;
                    report.roles_found = roles_found;
                    report.degraded = degraded;
                }
            }
        }

        info!(
            source_id,
            created = report.created.len(),
            removed = report.removed.len(),
            degraded = report.degraded,
            "Linked profile sync complete"
        );
        Ok(report)
    }

    fn discovery_events<'a>(
        &'a self,
        source_id: &'a str,
        source: &'a SsoProfile,
        client: &'a dyn FederationClient,
    ) -> impl Stream<Item = Result<DiscoveryEvent>> + Send + 'a {
        try_stream! {
            let mut accounts_seen = HashSet::new();
            let mut found = HashSet::new();
            let mut degraded = false;

            let mut accounts = client.list_accounts();
            while let Some(account) = accounts.next().await {
                let account = match account {
                    Ok(account) => account,
                    Err(error) => {
                        warn!(source_id, %error, "Failed to list accounts");
                        degraded = true;
                        break;
                    }
                };
                accounts_seen.insert(account.account_id.clone());

                let mut roles = client.list_account_roles(&account.account_id);
                while let Some(role) = roles.next().await {
                    let role = match role {
                        Ok(role) => role,
                        Err(error) => {
                            warn!(
                                source_id,
                                account_id = %account.account_id,
                                %error,
                                "Failed to list account roles"
                            );
                            degraded = true;
                            break;
                        }
                    };

                    let id = linked_profile_id(source_id, &role.role_name, &role.account_id);
                    if !found.insert(id.clone()) {
                        continue;
                    }
                    if self.store.get_profile(&id).await?.is_some() {
                        debug!(profile_id = %id, "Linked profile already stored");
                        continue;
                    }

                    let linked = LinkedIamProfile::new(source_id, role.role_name, role.account_id);
                    let stored = self
                        .store
                        .add_profile_from_source(&id, linked.into(), SOURCE_DISCOVERY)
                        .await?;
                    info!(profile_id = %id, "Linked profile discovered");
                    yield DiscoveryEvent::Created(id, stored);
                }
            }

            self.warn_if_empty(source, accounts_seen.len(), found.len());

            if degraded {
                warn!(source_id, "Catalog listing incomplete, skipping stale profile cleanup");
            } else {
                for id in self.remove_stale(source_id, &found).await? {
                    yield DiscoveryEvent::Removed(id);
                }
            }

            yield DiscoveryEvent::Finished {
                accounts_seen: accounts_seen.len(),
                roles_found: found.len(),
                degraded,
            };
        }
    }

    /// Delete linked profiles of `source_id` that the catalog no longer lists.
    async fn remove_stale(&self, source_id: &str, found: &HashSet<String>) -> Result<Vec<String>> {
        let stale: Vec<String> = self
            .store
            .list_profiles()
            .await?
            .into_iter()
            .filter(|(id, stored)| {
                stored
                    .profile
                    .as_linked()
                    .is_some_and(|linked| linked.sso_session == source_id)
                    && !found.contains(id)
            })
            .map(|(id, _)| id)
            .collect();

        for id in &stale {
            self.store.delete_profile(id).await?;
            info!(profile_id = %id, "Removed stale linked profile");
        }
        Ok(stale)
    }

    /// Warn when a session limited to catalog access sees nothing.
    fn warn_if_empty(&self, source: &SsoProfile, accounts_seen: usize, roles_found: usize) {
        if !self.warn_on_empty_discovery || !source.has_only_account_access() {
            return;
        }

        let name = truncate_start_url(&source.start_url);
        let message = if accounts_seen == 0 {
            format!(
                "IAM Identity Center ({name}) returned no AWS accounts. \
                 Ask your administrator to assign you an account."
            )
        } else if roles_found == 0 {
            format!(
                "IAM Identity Center ({name}) returned no roles for any account. \
                 Ask your administrator to assign you a permission set."
            )
        } else {
            return;
        };
        self.warn_once(message);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::store::ProfileStore;
    use crate::testing::ScriptedFederationClient;
    use ssolink_models::{Profile, SCOPE_SSO_ACCOUNT_ACCESS};
    use ssolink_storage::MemoryBlobStore;
    use ssolink_telemetry::{NoopAuditSink, RecordingNotifier};
    use std::sync::Arc;

    const SOURCE_ID: &str = "sso:1";

    fn source() -> SsoProfile {
        SsoProfile::new("https://my-org.awsapps.com/start", "us-east-1")
            .with_scopes([SCOPE_SSO_ACCOUNT_ACCESS])
    }

    async fn setup() -> (Reconciler, Arc<RecordingNotifier>) {
        let store = Arc::new(ProfileStore::new(
            Arc::new(MemoryBlobStore::new()),
            Arc::new(NoopAuditSink),
        ));
        store
            .add_profile(SOURCE_ID, Profile::Sso(source()))
            .await
            .unwrap();
        let notifier = Arc::new(RecordingNotifier::new());
        (Reconciler::new(store, notifier.clone()), notifier)
    }

    #[tokio::test]
    async fn test_discovery_yields_created_profiles() {
        let (reconciler, _notifier) = setup().await;
        let client = ScriptedFederationClient::new()
            .with_account("111", ["Admin", "ReadOnly"])
            .with_account("222", ["Admin"]);
        let source = source();

        let created: Vec<_> = reconciler
            .discover_linked_profiles(SOURCE_ID, &source, &client)
            .map(|item| item.unwrap().0)
            .collect()
            .await;

        assert_eq!(
            created,
            vec![
                "sso:sso:1#Admin-111",
                "sso:sso:1#ReadOnly-111",
                "sso:sso:1#Admin-222"
            ]
        );

        let stored = reconciler
            .store()
            .get_profile("sso:sso:1#Admin-222")
            .await
            .unwrap()
            .unwrap();
        assert_eq!(stored.metadata.source.as_deref(), Some(SOURCE_DISCOVERY));
        assert_eq!(stored.profile.as_linked().unwrap().sso_account_id, "222");
    }

    #[tokio::test]
    async fn test_early_stop_stops_pagination() {
        let (reconciler, _notifier) = setup().await;
        let client = ScriptedFederationClient::new()
            .with_account("111", ["Admin"])
            .with_account("222", ["Admin"]);
        let source = source();

        let first = reconciler
            .discover_linked_profiles(SOURCE_ID, &source, &client)
            .next()
            .await
            .unwrap()
            .unwrap();

        assert_eq!(first.0, "sso:sso:1#Admin-111");
        assert_eq!(client.role_requests(), vec!["111"]);
    }

    #[tokio::test]
    async fn test_role_listing_failure_degrades_run() {
        let (reconciler, _notifier) = setup().await;
        let client = ScriptedFederationClient::new()
            .with_account("111", ["Admin"])
            .with_account("222", ["Admin"])
            .fail_roles_for("111");

        let report = reconciler
            .sync_linked_profiles(SOURCE_ID, &client)
            .await
            .unwrap();

        assert!(report.degraded);
        assert_eq!(report.created, vec!["sso:sso:1#Admin-222"]);
        assert_eq!(report.accounts_seen, 2);
    }

    #[tokio::test]
    async fn test_no_accounts_warns_once() {
        let (reconciler, notifier) = setup().await;
        let client = ScriptedFederationClient::new();

        reconciler.sync_linked_profiles(SOURCE_ID, &client).await.unwrap();
        reconciler.sync_linked_profiles(SOURCE_ID, &client).await.unwrap();

        let messages = notifier.messages();
        assert_eq!(messages.len(), 1);
        assert!(messages[0].contains("(my-org) returned no AWS accounts"));
    }

    #[tokio::test]
    async fn test_account_listing_failure_warns_and_keeps_profiles() {
        let (reconciler, notifier) = setup().await;
        let existing = LinkedIamProfile::new(SOURCE_ID, "Admin", "111");
        reconciler
            .store()
            .add_profile(&existing.id(), existing.clone().into())
            .await
            .unwrap();
        let client = ScriptedFederationClient::new()
            .with_account("111", ["Admin"])
            .fail_accounts_after(0);

        let report = reconciler
            .sync_linked_profiles(SOURCE_ID, &client)
            .await
            .unwrap();

        assert!(report.degraded);
        assert_eq!(report.accounts_seen, 0);
        assert!(report.removed.is_empty());
        assert!(client.role_requests().is_empty());

        let messages = notifier.messages();
        assert_eq!(messages.len(), 1);
        assert!(messages[0].contains("returned no AWS accounts"));
        assert!(
            reconciler
                .store()
                .get_profile(&existing.id())
                .await
                .unwrap()
                .is_some()
        );
    }

    #[tokio::test]
    async fn test_no_roles_warning_is_distinct() {
        let (reconciler, notifier) = setup().await;
        let client = ScriptedFederationClient::new().with_account("111", Vec::<String>::new());

        let report = reconciler
            .sync_linked_profiles(SOURCE_ID, &client)
            .await
            .unwrap();

        assert_eq!(report.accounts_seen, 1);
        assert_eq!(report.roles_found, 0);
        let messages = notifier.messages();
        assert_eq!(messages.len(), 1);
        assert!(messages[0].contains("no roles for any account"));
    }

    #[tokio::test]
    async fn test_broad_scopes_suppress_warning() {
        let store = Arc::new(ProfileStore::new(
            Arc::new(MemoryBlobStore::new()),
            Arc::new(NoopAuditSink),
        ));
        let broad = SsoProfile::new("https://my-org.awsapps.com/start", "us-east-1")
            .with_scopes([SCOPE_SSO_ACCOUNT_ACCESS, "codewhisperer:completions"]);
        store.add_profile(SOURCE_ID, broad.into()).await.unwrap();
        let notifier = Arc::new(RecordingNotifier::new());
        let reconciler = Reconciler::new(store, notifier.clone());

        reconciler
            .sync_linked_profiles(SOURCE_ID, &ScriptedFederationClient::new())
            .await
            .unwrap();

        assert!(notifier.messages().is_empty());
    }

    #[tokio::test]
    async fn test_sync_requires_sso_source() {
        let (reconciler, _notifier) = setup().await;
        reconciler
            .store()
            .add_profile("profile:default", Profile::unknown_iam("profile:default"))
            .await
            .unwrap();

        let error = reconciler
            .sync_linked_profiles("profile:default", &ScriptedFederationClient::new())
            .await
            .unwrap_err();
        assert!(matches!(error, ConnectionError::ProfileTypeMismatch { .. }));

        let error = reconciler
            .sync_linked_profiles("sso:missing", &ScriptedFederationClient::new())
            .await
            .unwrap_err();
        assert!(matches!(error, ConnectionError::ProfileNotFound { .. }));
    }
}
