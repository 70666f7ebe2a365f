//! Audit event model and sinks.
//!
//! Every state-changing profile store operation reports its outcome as an
//! [`AuditEvent`]. Delivery is the sink's concern; recording never fails the
//! operation being audited.

use std::fmt;

use chrono::Utc;
use serde::{Deserialize, Serialize};
use ssolink_models::SsoProfile;

/// Profile store operation being audited
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum AuditAction {
    GetProfile,
    AddProfile,
    UpdateProfile,
    UpdateMetadata,
    DeleteProfile,
}

impl AuditAction {
    pub fn as_str(&self) -> &'static str {
        match self {
            AuditAction::GetProfile => "getProfile",
            AuditAction::AddProfile => "addProfile",
            AuditAction::UpdateProfile => "updateProfile",
            AuditAction::UpdateMetadata => "updateMetadata",
            AuditAction::DeleteProfile => "deleteProfile",
        }
    }
}

impl fmt::Display for AuditAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Outcome of an audited operation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AuditResult {
    Succeeded,
    Failed,
}

impl fmt::Display for AuditResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AuditResult::Succeeded => write!(f, "Succeeded"),
            AuditResult::Failed => write!(f, "Failed"),
        }
    }
}

/// Scope metadata attached to events about `sso` profiles
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SsoAuditMetadata {
    /// Comma separated scope list
    pub scopes: String,
    pub sso_region: String,
    pub start_url: String,
}

impl From<&SsoProfile> for SsoAuditMetadata {
    fn from(profile: &SsoProfile) -> Self {
        Self {
            scopes: profile.scope_list().join(","),
            sso_region: profile.sso_region.clone(),
            start_url: profile.start_url.clone(),
        }
    }
}

/// A single audit record
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuditEvent {
    pub action: AuditAction,
    /// Profile id the operation targeted
    pub id: String,
    pub result: AuditResult,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sso: Option<SsoAuditMetadata>,
    /// Unix timestamp in milliseconds
    pub timestamp: i64,
}

impl AuditEvent {
    pub fn succeeded(action: AuditAction, id: impl Into<String>) -> Self {
        Self {
            action,
            id: id.into(),
            result: AuditResult::Succeeded,
            reason: None,
            sso: None,
            timestamp: Utc::now().timestamp_millis(),
        }
    }

    pub fn failed(action: AuditAction, id: impl Into<String>, reason: impl Into<String>) -> Self {
        Self {
            result: AuditResult::Failed,
            reason: Some(reason.into()),
            ..Self::succeeded(action, id)
        }
    }

    pub fn with_sso(mut self, profile: Option<&SsoProfile>) -> Self {
        self.sso = profile.map(SsoAuditMetadata::from);
        self
    }
}

/// Receiver of audit events
pub trait AuditSink: Send + Sync {
    fn record(&self, event: AuditEvent);
}

/// Receiver of user-facing warnings.
///
/// Hosts route these to their UI; ssolink only decides when to warn.
pub trait Notifier: Send + Sync {
    fn warn(&self, message: &str);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_failed_event_carries_reason() {
        let event = AuditEvent::failed(AuditAction::GetProfile, "missing", "ProfileNotFound");
        assert_eq!(event.result, AuditResult::Failed);
        assert_eq!(event.reason.as_deref(), Some("ProfileNotFound"));
        assert!(event.sso.is_none());
    }

    #[test]
    fn test_sso_metadata_from_profile() {
        let profile = SsoProfile::new("https://x", "us-east-1").with_scopes(["a", "b"]);
        let event = AuditEvent::succeeded(AuditAction::AddProfile, "sso:1").with_sso(Some(&profile));

        let sso = event.sso.unwrap();
        assert_eq!(sso.scopes, "a,b");
        assert_eq!(sso.sso_region, "us-east-1");
        assert_eq!(sso.start_url, "https://x");
    }

    #[test]
    fn test_event_serializes_action_names() {
        let event = AuditEvent::succeeded(AuditAction::DeleteProfile, "p");
        let value = serde_json::to_value(&event).unwrap();
        assert_eq!(value["action"], "deleteProfile");
        assert_eq!(value["result"], "Succeeded");
        assert!(value.get("reason").is_none());
    }
}
