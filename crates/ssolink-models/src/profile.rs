//! Core types for connection profile management
//!
//! Defines the persisted profile shapes and their metadata.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::scopes::ScopeSet;

/// Start URL shared by every AWS Builder ID session.
pub const BUILDER_ID_START_URL: &str = "https://view.awsapps.com/start";

/// Minimal scope granting access to the account/role catalog.
pub const SCOPE_SSO_ACCOUNT_ACCESS: &str = "sso:account:access";

/// Prefix carried by every linked profile id.
pub const LINKED_PROFILE_PREFIX: &str = "sso:";

/// Build the deterministic id of a linked profile.
///
/// The same (session, role, account) triple always maps to the same id, which
/// is what keeps discovery from creating duplicates.
pub fn linked_profile_id(sso_session: &str, role_name: &str, account_id: &str) -> String {
    format!("{LINKED_PROFILE_PREFIX}{sso_session}#{role_name}-{account_id}")
}

/// Whether an id has the shape of a linked profile id.
pub fn is_linked_profile_id(id: &str) -> bool {
    id.starts_with(LINKED_PROFILE_PREFIX)
}

/// Shorten an Identity Center start URL to its directory alias.
///
/// `https://my-org.awsapps.com/start` becomes `my-org`; anything else is
/// returned unchanged.
pub fn truncate_start_url(start_url: &str) -> &str {
    let without_scheme = start_url
        .strip_prefix("https://")
        .or_else(|| start_url.strip_prefix("http://"))
        .unwrap_or(start_url);

    without_scheme
        .trim_end_matches('/')
        .strip_suffix(".awsapps.com/start")
        .unwrap_or(start_url)
}

/// Discriminant of a profile, immutable once stored.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProfileType {
    Sso,
    Iam,
}

impl fmt::Display for ProfileType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProfileType::Sso => write!(f, "sso"),
            ProfileType::Iam => write!(f, "iam"),
        }
    }
}

/// Authentication state of a connection
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ConnectionState {
    /// No usable credentials yet
    #[default]
    Unauthenticated,
    /// An authentication flow is in progress
    Authenticating,
    /// Credentials were obtained and are usable
    Valid,
    /// Credentials were rejected or expired
    Invalid,
}

impl ConnectionState {
    /// Only a valid connection can be handed out for requests.
    pub fn is_usable(&self) -> bool {
        matches!(self, ConnectionState::Valid)
    }
}

impl fmt::Display for ConnectionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConnectionState::Unauthenticated => write!(f, "unauthenticated"),
            ConnectionState::Authenticating => write!(f, "authenticating"),
            ConnectionState::Valid => write!(f, "valid"),
            ConnectionState::Invalid => write!(f, "invalid"),
        }
    }
}

/// Identity-only SSO session profile. Holds no credentials.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SsoProfile {
    /// Region of the Identity Center instance
    pub sso_region: String,
    /// Start URL of the Identity Center portal
    pub start_url: String,
    /// Scopes requested for the session
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scopes: Option<Vec<String>>,
}

impl SsoProfile {
    pub fn new(start_url: impl Into<String>, sso_region: impl Into<String>) -> Self {
        Self {
            sso_region: sso_region.into(),
            start_url: start_url.into(),
            scopes: None,
        }
    }

    pub fn with_scopes<S: Into<String>>(mut self, scopes: impl IntoIterator<Item = S>) -> Self {
        self.scopes = Some(scopes.into_iter().map(Into::into).collect());
        self
    }

    pub fn is_builder_id(&self) -> bool {
        self.start_url == BUILDER_ID_START_URL
    }

    /// Scopes of the session; an absent list is treated as empty.
    pub fn scope_list(&self) -> &[String] {
        self.scopes.as_deref().unwrap_or_default()
    }

    /// True when the session was granted nothing beyond catalog access.
    pub fn has_only_account_access(&self) -> bool {
        self.scope_list()
            .iter()
            .all(|scope| scope == SCOPE_SSO_ACCOUNT_ACCESS)
    }

    /// Human readable name of the session.
    pub fn display_label(&self) -> String {
        if self.is_builder_id() {
            "AWS Builder ID".to_string()
        } else {
            format!("IAM Identity Center ({})", truncate_start_url(&self.start_url))
        }
    }
}

/// IAM profile whose credentials come from a role discovered through an SSO session
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LinkedIamProfile {
    pub name: String,
    /// Id of the `sso` profile this role was discovered from
    pub sso_session: String,
    pub sso_role_name: String,
    pub sso_account_id: String,
}

impl LinkedIamProfile {
    pub fn new(
        sso_session: impl Into<String>,
        role_name: impl Into<String>,
        account_id: impl Into<String>,
    ) -> Self {
        let sso_role_name = role_name.into();
        let sso_account_id = account_id.into();
        Self {
            name: format!("{sso_role_name}-{sso_account_id}"),
            sso_session: sso_session.into(),
            sso_role_name,
            sso_account_id,
        }
    }

    /// The deterministic id this profile is stored under.
    pub fn id(&self) -> String {
        linked_profile_id(&self.sso_session, &self.sso_role_name, &self.sso_account_id)
    }
}

/// Externally managed static credential profile
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UnknownIamProfile {
    pub name: String,
}

/// IAM profile variants, tagged by `subtype`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "subtype", rename_all = "lowercase")]
pub enum IamProfile {
    Linked(LinkedIamProfile),
    Unknown(UnknownIamProfile),
}

impl IamProfile {
    pub fn name(&self) -> &str {
        match self {
            IamProfile::Linked(linked) => &linked.name,
            IamProfile::Unknown(unknown) => &unknown.name,
        }
    }
}

/// A connection profile, tagged by `type`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum Profile {
    Sso(SsoProfile),
    Iam(IamProfile),
}

impl Profile {
    /// Create an externally managed IAM profile
    pub fn unknown_iam(name: impl Into<String>) -> Self {
        Profile::Iam(IamProfile::Unknown(UnknownIamProfile { name: name.into() }))
    }

    pub fn profile_type(&self) -> ProfileType {
        match self {
            Profile::Sso(_) => ProfileType::Sso,
            Profile::Iam(_) => ProfileType::Iam,
        }
    }

    pub fn as_sso(&self) -> Option<&SsoProfile> {
        match self {
            Profile::Sso(sso) => Some(sso),
            Profile::Iam(_) => None,
        }
    }

    pub fn as_linked(&self) -> Option<&LinkedIamProfile> {
        match self {
            Profile::Iam(IamProfile::Linked(linked)) => Some(linked),
            Profile::Iam(IamProfile::Unknown(_)) | Profile::Sso(_) => None,
        }
    }

    pub fn is_unknown_iam(&self) -> bool {
        matches!(self, Profile::Iam(IamProfile::Unknown(_)))
    }

    /// Label derived from the profile body alone.
    pub fn display_label(&self) -> String {
        match self {
            Profile::Sso(sso) => sso.display_label(),
            Profile::Iam(iam) => iam.name().to_string(),
        }
    }
}

impl From<SsoProfile> for Profile {
    fn from(profile: SsoProfile) -> Self {
        Profile::Sso(profile)
    }
}

impl From<LinkedIamProfile> for Profile {
    fn from(profile: LinkedIamProfile) -> Self {
        Profile::Iam(IamProfile::Linked(profile))
    }
}

/// Mutable bookkeeping kept next to every stored profile
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfileMetadata {
    /// User supplied label, overrides the derived one
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    #[serde(default)]
    pub connection_state: ConnectionState,
    /// Which part of the host created the profile
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,
}

/// Partial metadata update. Absent fields are left untouched.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MetadataUpdate {
    pub label: Option<String>,
    pub connection_state: Option<ConnectionState>,
    pub source: Option<String>,
}

impl MetadataUpdate {
    pub fn state(connection_state: ConnectionState) -> Self {
        Self {
            connection_state: Some(connection_state),
            ..Default::default()
        }
    }

    pub fn label(label: impl Into<String>) -> Self {
        Self {
            label: Some(label.into()),
            ..Default::default()
        }
    }

    pub fn source(source: impl Into<String>) -> Self {
        Self {
            source: Some(source.into()),
            ..Default::default()
        }
    }

    /// Merge the present fields into existing metadata.
    pub fn apply_to(self, metadata: &mut ProfileMetadata) {
        if let Some(label) = self.label {
            metadata.label = Some(label);
        }
        if let Some(connection_state) = self.connection_state {
            metadata.connection_state = connection_state;
        }
        if let Some(source) = self.source {
            metadata.source = Some(source);
        }
    }
}

/// A profile as persisted in the store
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoredProfile {
    #[serde(flatten)]
    pub profile: Profile,
    #[serde(default)]
    pub metadata: ProfileMetadata,
}

impl StoredProfile {
    /// Wrap a freshly created profile with initial metadata.
    pub fn new(profile: Profile) -> Self {
        Self {
            profile,
            metadata: ProfileMetadata::default(),
        }
    }

    pub fn profile_type(&self) -> ProfileType {
        self.profile.profile_type()
    }

    pub fn connection_state(&self) -> ConnectionState {
        self.metadata.connection_state
    }

    pub fn label(&self) -> String {
        self.metadata
            .label
            .clone()
            .unwrap_or_else(|| self.profile.display_label())
    }
}

impl ScopeSet for SsoProfile {
    fn contains_scope(&self, scope: &str) -> bool {
        self.scope_list().iter().any(|s| s == scope)
    }

    fn scope_count(&self) -> usize {
        self.scope_list().len()
    }
}

impl ScopeSet for Profile {
    fn contains_scope(&self, scope: &str) -> bool {
        self.as_sso().is_some_and(|sso| sso.contains_scope(scope))
    }

    fn scope_count(&self) -> usize {
        self.as_sso().map_or(0, ScopeSet::scope_count)
    }
}

impl ScopeSet for StoredProfile {
    fn contains_scope(&self, scope: &str) -> bool {
        self.profile.contains_scope(scope)
    }

    fn scope_count(&self) -> usize {
        self.profile.scope_count()
    }
}
