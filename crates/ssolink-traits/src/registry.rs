//! Credential provider registry abstraction.
//!
//! Static credential profiles are configured outside ssolink (shared
//! credential files, environment, ...). The registry enumerates them and lets
//! the core drop registrations it knows to be stale.

use std::collections::HashMap;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::Result;

/// Descriptor of an externally registered credential provider.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProviderDescriptor {
    /// Kind of credentials the provider produces (e.g. `profile`, `ec2`)
    pub credential_type_id: String,
}

impl ProviderDescriptor {
    pub fn new(credential_type_id: impl Into<String>) -> Self {
        Self {
            credential_type_id: credential_type_id.into(),
        }
    }
}

#[async_trait]
pub trait CredentialProviderRegistry: Send + Sync {
    /// Every provider currently registered, keyed by provider id.
    async fn get_credential_provider_names(&self) -> Result<HashMap<String, ProviderDescriptor>>;

    /// Drop a registration. Removing an unknown id is not an error.
    async fn remove_provider(&self, id: &str) -> Result<()>;
}
