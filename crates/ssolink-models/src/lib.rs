//! ssolink Models - profile and connection shapes.
//!
//! Pure data and predicates shared by every ssolink crate:
//! - `Profile` and its `sso` / `iam` (linked, unknown) variants
//! - `StoredProfile` with its `ProfileMetadata` and `ConnectionState`
//! - Classification predicates (`is_iam_connection`, `is_sso_connection`)
//! - Scope predicates (`has_scopes`, `has_exact_scopes`)
//! - Deterministic linked profile ids

pub mod profile;
pub mod scopes;

pub use profile::{
    BUILDER_ID_START_URL, ConnectionState, IamProfile, LINKED_PROFILE_PREFIX, LinkedIamProfile,
    MetadataUpdate, Profile, ProfileMetadata, ProfileType, SCOPE_SSO_ACCOUNT_ACCESS, SsoProfile,
    StoredProfile, UnknownIamProfile, is_linked_profile_id, linked_profile_id, truncate_start_url,
};
pub use scopes::{
    ConnectionKind, ScopeSet, SsoKind, has_exact_scopes, has_scopes, is_builder_id_connection,
    is_iam_connection, is_idc_connection, is_sso_connection,
};
