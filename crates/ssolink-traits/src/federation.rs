//! Federation catalog abstraction.
//!
//! A federation client lists the accounts an SSO session can reach and the
//! roles available in each account. Pagination is the client's concern; the
//! core only sees flat, lazily produced streams.

use std::pin::Pin;

use futures::Stream;
use serde::{Deserialize, Serialize};

use crate::error::Result;

/// Boxed, sendable stream used at every async listing seam.
pub type BoxStream<'a, T> = Pin<Box<dyn Stream<Item = T> + Send + 'a>>;

/// An account reachable from an SSO session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AccountInfo {
    pub account_id: String,
}

impl AccountInfo {
    pub fn new(account_id: impl Into<String>) -> Self {
        Self {
            account_id: account_id.into(),
        }
    }
}

/// A role that can be assumed in an account.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RoleInfo {
    pub role_name: String,
    pub account_id: String,
}

impl RoleInfo {
    pub fn new(role_name: impl Into<String>, account_id: impl Into<String>) -> Self {
        Self {
            role_name: role_name.into(),
            account_id: account_id.into(),
        }
    }
}

/// Paginated account/role catalog of a federation provider.
///
/// Both listings are finite. An `Err` item ends the listing; implementations
/// should not yield further items after an error.
pub trait FederationClient: Send + Sync {
    fn list_accounts(&self) -> BoxStream<'_, Result<AccountInfo>>;

    fn list_account_roles(&self, account_id: &str) -> BoxStream<'_, Result<RoleInfo>>;
}
