#![allow(dead_code)]

use std::collections::BTreeMap;
use std::sync::Arc;

use futures::stream;
use parking_lot::Mutex;
use ssolink_core::{AuthConfig, ProfileStore, Reconciler};
use ssolink_models::{SCOPE_SSO_ACCOUNT_ACCESS, SsoProfile};
use ssolink_storage::MemoryBlobStore;
use ssolink_telemetry::{RecordingAuditSink, RecordingNotifier};
use ssolink_traits::{AccountInfo, BoxStream, ConnectionError, FederationClient, Result, RoleInfo};

pub const SOURCE_ID: &str = "sso:1";

/// Account/role catalog that can change between discovery runs.
#[derive(Default)]
pub struct Catalog {
    accounts: Mutex<BTreeMap<String, Vec<String>>>,
    broken: Mutex<bool>,
}

impl Catalog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn grant(&self, account_id: &str, role_name: &str) {
        self.accounts
            .lock()
            .entry(account_id.to_string())
            .or_default()
            .push(role_name.to_string());
    }

    pub fn revoke(&self, account_id: &str, role_name: &str) {
        if let Some(roles) = self.accounts.lock().get_mut(account_id) {
            roles.retain(|role| role != role_name);
        }
    }

    /// Make the account listing fail after its first page.
    pub fn set_broken(&self, broken: bool) {
        *self.broken.lock() = broken;
    }
}

impl FederationClient for Catalog {
    fn list_accounts(&self) -> BoxStream<'_, Result<AccountInfo>> {
        let mut items: Vec<Result<AccountInfo>> = self
            .accounts
            .lock()
            .keys()
            .map(|id| Ok(AccountInfo::new(id.clone())))
            .collect();
        if *self.broken.lock() {
            items.truncate(1);
            items.push(Err(ConnectionError::Federation("page 2 timed out".to_string())));
        }
        Box::pin(stream::iter(items))
    }

    fn list_account_roles(&self, account_id: &str) -> BoxStream<'_, Result<RoleInfo>> {
        let items: Vec<Result<RoleInfo>> = self
            .accounts
            .lock()
            .get(account_id)
            .into_iter()
            .flatten()
            .map(|role| Ok(RoleInfo::new(role.clone(), account_id)))
            .collect();
        Box::pin(stream::iter(items))
    }
}

pub struct Harness {
    pub store: Arc<ProfileStore>,
    pub reconciler: Reconciler,
    pub audit: Arc<RecordingAuditSink>,
    pub notifier: Arc<RecordingNotifier>,
}

impl Harness {
    pub fn new() -> Self {
        let audit = Arc::new(RecordingAuditSink::new());
        let notifier = Arc::new(RecordingNotifier::new());
        let store = Arc::new(ProfileStore::new(
            Arc::new(MemoryBlobStore::new()),
            audit.clone(),
        ));
        let reconciler =
            Reconciler::with_config(store.clone(), notifier.clone(), &AuthConfig::default());
        Self {
            store,
            reconciler,
            audit,
            notifier,
        }
    }

    /// Store the `sso:1` session every discovery run starts from.
    pub async fn with_source(self) -> Self {
        self.store
            .add_profile(SOURCE_ID, source_profile().into())
            .await
            .unwrap();
        self
    }

    pub async fn stored_ids(&self) -> Vec<String> {
        let mut ids: Vec<String> = self
            .store
            .list_profiles()
            .await
            .unwrap()
            .into_iter()
            .map(|(id, _)| id)
            .collect();
        ids.sort();
        ids
    }
}

pub fn source_profile() -> SsoProfile {
    SsoProfile::new("https://acme.awsapps.com/start", "us-east-1")
        .with_scopes([SCOPE_SSO_ACCOUNT_ACCESS])
}
