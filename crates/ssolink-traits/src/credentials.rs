//! Credential and token provider abstractions.
//!
//! Runtime connections hand out credentials (IAM) or bearer tokens (SSO). The
//! flows that obtain them live in the host; ssolink only wires providers to
//! connections through a [`ProviderFactory`].

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use ssolink_models::{IamProfile, SsoProfile};

use crate::error::Result;

/// Temporary or static AWS credentials
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AwsCredentials {
    pub access_key_id: String,
    pub secret_access_key: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub session_token: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expiration: Option<DateTime<Utc>>,
}

/// Bearer token of an SSO session
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SsoToken {
    pub access_token: String,
    pub expires_at: DateTime<Utc>,
}

/// OIDC client registration backing an SSO session
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClientRegistration {
    pub client_id: String,
    pub client_secret: String,
    pub expires_at: DateTime<Utc>,
    #[serde(default)]
    pub scopes: Vec<String>,
}

#[async_trait]
pub trait CredentialsProvider: Send + Sync {
    async fn get_credentials(&self) -> Result<AwsCredentials>;
}

#[async_trait]
pub trait TokenProvider: Send + Sync {
    /// Current token, `None` when the session has never been authenticated.
    async fn get_token(&self) -> Result<Option<SsoToken>>;

    /// Client registration, `None` when none has been made yet.
    async fn get_registration(&self) -> Result<Option<ClientRegistration>>;
}

/// Builds the providers behind runtime connections.
pub trait ProviderFactory: Send + Sync {
    fn credentials_provider(&self, id: &str, profile: &IamProfile) -> Arc<dyn CredentialsProvider>;

    fn token_provider(&self, id: &str, profile: &SsoProfile) -> Arc<dyn TokenProvider>;
}
