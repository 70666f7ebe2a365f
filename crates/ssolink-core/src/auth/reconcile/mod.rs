//! Profile reconciliation
//!
//! Aligns stored profiles with two external sources of truth:
//! - the account/role catalog of an SSO session ([`linked`])
//! - the statically configured credential providers ([`unmanaged`])
//!
//! Both passes are idempotent and may be re-run at any time.

pub mod linked;
pub mod unmanaged;

use std::collections::HashSet;
use std::sync::Arc;

use parking_lot::Mutex;
use serde::Serialize;
use ssolink_traits::Notifier;
use tracing::warn;

use super::store::ProfileStore;
use crate::config::AuthConfig;

/// Metadata source of profiles created by linked-profile discovery
pub const SOURCE_DISCOVERY: &str = "discovery";

/// Metadata source of profiles created by unmanaged-profile sync
pub const SOURCE_SHARED_CREDENTIALS: &str = "sharedCredentials";

/// Outcome of a complete linked-profile discovery run
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DiscoveryReport {
    /// Linked profiles created by this run
    pub created: Vec<String>,
    /// Stale linked profiles deleted by this run
    pub removed: Vec<String>,
    /// Distinct accounts listed by the catalog
    pub accounts_seen: usize,
    /// Distinct linked ids derived from the catalog, new or not
    pub roles_found: usize,
    /// A listing failed, so the catalog view was partial and cleanup skipped
    pub degraded: bool,
}

/// Outcome of an unmanaged-profile sync
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SyncReport {
    /// `iam/unknown` profiles added for new providers
    pub added: Vec<String>,
    /// `iam/unknown` profiles whose provider disappeared
    pub removed: Vec<String>,
    /// Linked profiles whose SSO session no longer exists
    pub orphaned: Vec<String>,
}

impl SyncReport {
    pub fn is_empty(&self) -> bool {
        self.added.is_empty() && self.removed.is_empty() && self.orphaned.is_empty()
    }
}

/// Runs reconciliation passes against one profile store
pub struct Reconciler {
    store: Arc<ProfileStore>,
    notifier: Arc<dyn Notifier>,
    warn_on_empty_discovery: bool,
    /// Rendered warnings already shown to the user
    warned: Mutex<HashSet<String>>,
}

impl Reconciler {
    pub fn new(store: Arc<ProfileStore>, notifier: Arc<dyn Notifier>) -> Self {
        Self::with_config(store, notifier, &AuthConfig::default())
    }

    pub fn with_config(
        store: Arc<ProfileStore>,
        notifier: Arc<dyn Notifier>,
        config: &AuthConfig,
    ) -> Self {
        Self {
            store,
            notifier,
            warn_on_empty_discovery: config.warn_on_empty_discovery,
            warned: Mutex::new(HashSet::new()),
        }
    }

    pub fn store(&self) -> &Arc<ProfileStore> {
        &self.store
    }

    /// Show `message` unless the exact same text was shown before.
    fn warn_once(&self, message: String) {
        if !self.warned.lock().insert(message.clone()) {
            return;
        }
        warn!(%message, "Discovery returned nothing");
        self.notifier.warn(&message);
    }
}
