//! In-memory collaborators for tests and embedders without real backends.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use futures::stream;
use parking_lot::Mutex;
use ssolink_models::{IamProfile, SsoProfile};
use ssolink_traits::{
    AccountInfo, AwsCredentials, BoxStream, ClientRegistration, ConnectionError,
    CredentialProviderRegistry, CredentialsProvider, FederationClient, ProviderDescriptor,
    ProviderFactory, Result, RoleInfo, SsoToken, TokenProvider,
};

/// Federation client serving a fixed catalog.
///
/// Accounts are listed in insertion order. Listings can be made to fail
/// after a number of items to exercise degraded runs.
#[derive(Debug, Default)]
pub struct ScriptedFederationClient {
    accounts: Vec<(String, Vec<String>)>,
    fail_accounts_after: Option<usize>,
    failing_role_accounts: Vec<String>,
    role_requests: Mutex<Vec<String>>,
}

impl ScriptedFederationClient {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an account and the roles it offers.
    pub fn with_account<R: Into<String>>(
        mut self,
        account_id: impl Into<String>,
        roles: impl IntoIterator<Item = R>,
    ) -> Self {
        self.accounts.push((
            account_id.into(),
            roles.into_iter().map(Into::into).collect(),
        ));
        self
    }

    /// Fail the account listing after `count` accounts were yielded.
    pub fn fail_accounts_after(mut self, count: usize) -> Self {
        self.fail_accounts_after = Some(count);
        self
    }

    /// Fail the role listing of `account_id` before yielding anything.
    pub fn fail_roles_for(mut self, account_id: impl Into<String>) -> Self {
        self.failing_role_accounts.push(account_id.into());
        self
    }

    /// Accounts whose roles were requested, in request order.
    pub fn role_requests(&self) -> Vec<String> {
        self.role_requests.lock().clone()
    }
}

impl FederationClient for ScriptedFederationClient {
    fn list_accounts(&self) -> BoxStream<'_, Result<AccountInfo>> {
        let mut items: Vec<Result<AccountInfo>> = self
            .accounts
            .iter()
            .map(|(account_id, _)| Ok(AccountInfo::new(account_id.clone())))
            .collect();
        if let Some(count) = self.fail_accounts_after {
            items.truncate(count);
            items.push(Err(ConnectionError::Federation(
                "ListAccounts: throttled".to_string(),
            )));
        }
        Box::pin(stream::iter(items))
    }

    fn list_account_roles(&self, account_id: &str) -> BoxStream<'_, Result<RoleInfo>> {
        self.role_requests.lock().push(account_id.to_string());

        if self.failing_role_accounts.iter().any(|id| id == account_id) {
            return Box::pin(stream::iter(vec![Err(ConnectionError::Federation(
                format!("ListAccountRoles({account_id}): access denied"),
            ))]));
        }

        let items: Vec<Result<RoleInfo>> = self
            .accounts
            .iter()
            .filter(|(id, _)| id == account_id)
            .flat_map(|(id, roles)| {
                roles
                    .iter()
                    .map(move |role| Ok(RoleInfo::new(role.clone(), id.clone())))
            })
            .collect();
        Box::pin(stream::iter(items))
    }
}

/// Credential provider registry backed by a map.
#[derive(Debug, Default)]
pub struct InMemoryRegistry {
    providers: Mutex<HashMap<String, ProviderDescriptor>>,
    fail_listing: bool,
}

impl InMemoryRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_provider(self, id: impl Into<String>, credential_type_id: &str) -> Self {
        self.providers
            .lock()
            .insert(id.into(), ProviderDescriptor::new(credential_type_id));
        self
    }

    /// Make every enumeration fail.
    pub fn failing() -> Self {
        Self {
            fail_listing: true,
            ..Self::default()
        }
    }

    pub fn contains(&self, id: &str) -> bool {
        self.providers.lock().contains_key(id)
    }
}

#[async_trait]
impl CredentialProviderRegistry for InMemoryRegistry {
    async fn get_credential_provider_names(&self) -> Result<HashMap<String, ProviderDescriptor>> {
        if self.fail_listing {
            return Err(ConnectionError::Registry(
                "credential providers unavailable".to_string(),
            ));
        }
        Ok(self.providers.lock().clone())
    }

    async fn remove_provider(&self, id: &str) -> Result<()> {
        self.providers.lock().remove(id);
        Ok(())
    }
}

/// Providers returning canned credentials derived from the connection id.
#[derive(Debug, Default, Clone, Copy)]
pub struct StaticProviderFactory;

impl StaticProviderFactory {
    pub fn new() -> Self {
        Self
    }
}

impl ProviderFactory for StaticProviderFactory {
    fn credentials_provider(
        &self,
        id: &str,
        _profile: &IamProfile,
    ) -> Arc<dyn CredentialsProvider> {
        Arc::new(StaticCredentials { id: id.to_string() })
    }

    fn token_provider(&self, id: &str, profile: &SsoProfile) -> Arc<dyn TokenProvider> {
        Arc::new(StaticToken {
            id: id.to_string(),
            scopes: profile.scope_list().to_vec(),
        })
    }
}

struct StaticCredentials {
    id: String,
}

#[async_trait]
impl CredentialsProvider for StaticCredentials {
    async fn get_credentials(&self) -> Result<AwsCredentials> {
        Ok(AwsCredentials {
            access_key_id: format!("AKIA-{}", self.id),
            secret_access_key: "secret".to_string(),
            session_token: None,
            expiration: None,
        })
    }
}

struct StaticToken {
    id: String,
    scopes: Vec<String>,
}

#[async_trait]
impl TokenProvider for StaticToken {
    async fn get_token(&self) -> Result<Option<SsoToken>> {
        Ok(Some(SsoToken {
            access_token: format!("token-{}", self.id),
            expires_at: far_future(),
        }))
    }

    async fn get_registration(&self) -> Result<Option<ClientRegistration>> {
        Ok(Some(ClientRegistration {
            client_id: format!("client-{}", self.id),
            client_secret: "secret".to_string(),
            expires_at: far_future(),
            scopes: self.scopes.clone(),
        }))
    }
}

fn far_future() -> chrono::DateTime<chrono::Utc> {
    chrono::DateTime::<chrono::Utc>::MAX_UTC
}
