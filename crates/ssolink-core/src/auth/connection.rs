//! Runtime connections
//!
//! A connection is a stored profile bound to the provider that produces its
//! credentials (IAM) or bearer token (SSO).

use std::fmt;
use std::sync::Arc;

use ssolink_models::{
    ConnectionKind, ConnectionState, IamProfile, Profile, ProfileType, ScopeSet, SsoProfile,
    StoredProfile,
};
use ssolink_traits::{
    AwsCredentials, ClientRegistration, CredentialsProvider, ProviderFactory, Result, SsoToken,
    TokenProvider,
};

/// Connection backed by an `iam` profile
#[derive(Clone)]
pub struct IamConnection {
    pub id: String,
    pub label: String,
    pub profile: IamProfile,
    provider: Arc<dyn CredentialsProvider>,
}

impl IamConnection {
    pub async fn get_credentials(&self) -> Result<AwsCredentials> {
        self.provider.get_credentials().await
    }
}

impl fmt::Debug for IamConnection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("IamConnection")
            .field("id", &self.id)
            .field("label", &self.label)
            .field("profile", &self.profile)
            .finish_non_exhaustive()
    }
}

/// Connection backed by an `sso` profile
#[derive(Clone)]
pub struct SsoConnection {
    pub id: String,
    pub label: String,
    pub profile: SsoProfile,
    provider: Arc<dyn TokenProvider>,
}

impl SsoConnection {
    pub async fn get_token(&self) -> Result<Option<SsoToken>> {
        self.provider.get_token().await
    }

    pub async fn get_registration(&self) -> Result<Option<ClientRegistration>> {
        self.provider.get_registration().await
    }

    pub fn scopes(&self) -> &[String] {
        self.profile.scope_list()
    }
}

impl fmt::Debug for SsoConnection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SsoConnection")
            .field("id", &self.id)
            .field("label", &self.label)
            .field("profile", &self.profile)
            .finish_non_exhaustive()
    }
}

#[derive(Debug, Clone)]
pub enum Connection {
    Iam(IamConnection),
    Sso(SsoConnection),
}

impl Connection {
    /// Bind a stored profile to its provider.
    pub fn from_stored(id: &str, stored: &StoredProfile, factory: &dyn ProviderFactory) -> Self {
        let label = stored.label();
        match &stored.profile {
            Profile::Iam(profile) => Connection::Iam(IamConnection {
                id: id.to_string(),
                label,
                provider: factory.credentials_provider(id, profile),
                profile: profile.clone(),
            }),
            Profile::Sso(profile) => Connection::Sso(SsoConnection {
                id: id.to_string(),
                label,
                provider: factory.token_provider(id, profile),
                profile: profile.clone(),
            }),
        }
    }

    pub fn id(&self) -> &str {
        match self {
            Connection::Iam(conn) => &conn.id,
            Connection::Sso(conn) => &conn.id,
        }
    }

    pub fn label(&self) -> &str {
        match self {
            Connection::Iam(conn) => &conn.label,
            Connection::Sso(conn) => &conn.label,
        }
    }

    pub fn as_iam(&self) -> Option<&IamConnection> {
        match self {
            Connection::Iam(conn) => Some(conn),
            Connection::Sso(_) => None,
        }
    }

    pub fn as_sso(&self) -> Option<&SsoConnection> {
        match self {
            Connection::Sso(conn) => Some(conn),
            Connection::Iam(_) => None,
        }
    }
}

impl ConnectionKind for Connection {
    fn profile_type(&self) -> ProfileType {
        match self {
            Connection::Iam(_) => ProfileType::Iam,
            Connection::Sso(_) => ProfileType::Sso,
        }
    }

    fn start_url(&self) -> Option<&str> {
        self.as_sso().map(|conn| conn.profile.start_url.as_str())
    }
}

impl ScopeSet for Connection {
    fn contains_scope(&self, scope: &str) -> bool {
        self.as_sso()
            .is_some_and(|conn| conn.profile.contains_scope(scope))
    }

    fn scope_count(&self) -> usize {
        self.as_sso().map_or(0, |conn| conn.profile.scope_count())
    }
}

/// A connection together with its current authentication state
#[derive(Debug, Clone)]
pub struct StatefulConnection {
    pub connection: Connection,
    pub state: ConnectionState,
}

impl StatefulConnection {
    pub fn from_stored(id: &str, stored: &StoredProfile, factory: &dyn ProviderFactory) -> Self {
        Self {
            connection: Connection::from_stored(id, stored, factory),
            state: stored.connection_state(),
        }
    }

    pub fn id(&self) -> &str {
        self.connection.id()
    }

    pub fn label(&self) -> &str {
        self.connection.label()
    }
}

impl ConnectionKind for StatefulConnection {
    fn profile_type(&self) -> ProfileType {
        self.connection.profile_type()
    }

    fn start_url(&self) -> Option<&str> {
        self.connection.start_url()
    }
}

impl ScopeSet for StatefulConnection {
    fn contains_scope(&self, scope: &str) -> bool {
        self.connection.contains_scope(scope)
    }

    fn scope_count(&self) -> usize {
        self.connection.scope_count()
    }
}
