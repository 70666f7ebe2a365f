//! Connection classification and scope predicates.

use crate::profile::{
    BUILDER_ID_START_URL, Profile, ProfileType, SsoProfile, StoredProfile,
};

/// Anything that carries a set of granted scopes.
pub trait ScopeSet {
    fn contains_scope(&self, scope: &str) -> bool;
    fn scope_count(&self) -> usize;
}

impl<S: AsRef<str>> ScopeSet for [S] {
    fn contains_scope(&self, scope: &str) -> bool {
        self.iter().any(|s| s.as_ref() == scope)
    }

    fn scope_count(&self) -> usize {
        self.len()
    }
}

impl<S: AsRef<str>> ScopeSet for Vec<S> {
    fn contains_scope(&self, scope: &str) -> bool {
        self.as_slice().contains_scope(scope)
    }

    fn scope_count(&self) -> usize {
        self.len()
    }
}

impl<S: AsRef<str>, const N: usize> ScopeSet for [S; N] {
    fn contains_scope(&self, scope: &str) -> bool {
        self.as_slice().contains_scope(scope)
    }

    fn scope_count(&self) -> usize {
        N
    }
}

/// Anything that can be classified as an IAM or SSO connection.
pub trait ConnectionKind {
    fn profile_type(&self) -> ProfileType;

    /// Start URL of an SSO connection, `None` for IAM.
    fn start_url(&self) -> Option<&str>;
}

impl ConnectionKind for SsoProfile {
    fn profile_type(&self) -> ProfileType {
        ProfileType::Sso
    }

    fn start_url(&self) -> Option<&str> {
        Some(&self.start_url)
    }
}

impl ConnectionKind for Profile {
    fn profile_type(&self) -> ProfileType {
        Profile::profile_type(self)
    }

    fn start_url(&self) -> Option<&str> {
        self.as_sso().map(|sso| sso.start_url.as_str())
    }
}

impl ConnectionKind for StoredProfile {
    fn profile_type(&self) -> ProfileType {
        self.profile.profile_type()
    }

    fn start_url(&self) -> Option<&str> {
        ConnectionKind::start_url(&self.profile)
    }
}

/// Which flavour of SSO connection a caller is asking about
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SsoKind {
    #[default]
    Any,
    /// IAM Identity Center, i.e. every SSO session that is not Builder ID
    Idc,
    BuilderId,
}

pub fn is_iam_connection<T: ConnectionKind + ?Sized>(conn: Option<&T>) -> bool {
    conn.is_some_and(|c| c.profile_type() == ProfileType::Iam)
}

/// Classify an SSO connection.
///
/// Builder ID is recognised by its fixed start URL. Identity Center has no
/// positive marker of its own and is every other SSO connection.
pub fn is_sso_connection<T: ConnectionKind + ?Sized>(conn: Option<&T>, kind: SsoKind) -> bool {
    let Some(conn) = conn else {
        return false;
    };
    if conn.profile_type() != ProfileType::Sso {
        return false;
    }

    let is_builder_id = conn.start_url() == Some(BUILDER_ID_START_URL);
    match kind {
        SsoKind::Any => true,
        SsoKind::BuilderId => is_builder_id,
        SsoKind::Idc => !is_builder_id,
    }
}

pub fn is_builder_id_connection<T: ConnectionKind + ?Sized>(conn: Option<&T>) -> bool {
    is_sso_connection(conn, SsoKind::BuilderId)
}

pub fn is_idc_connection<T: ConnectionKind + ?Sized>(conn: Option<&T>) -> bool {
    is_sso_connection(conn, SsoKind::Idc)
}

/// True when every required scope is granted by `target`.
pub fn has_scopes<T, S>(target: &T, required: &[S]) -> bool
where
    T: ScopeSet + ?Sized,
    S: AsRef<str>,
{
    required
        .iter()
        .all(|scope| target.contains_scope(scope.as_ref()))
}

/// True when `target` grants exactly the required scopes, in any order.
pub fn has_exact_scopes<T, S>(target: &T, required: &[S]) -> bool
where
    T: ScopeSet + ?Sized,
    S: AsRef<str>,
{
    target.scope_count() == required.len() && has_scopes(target, required)
}
