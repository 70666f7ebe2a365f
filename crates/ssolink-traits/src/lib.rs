//! ssolink Traits - collaborator seams and shared errors.
//!
//! The connection core talks to everything outside its own bookkeeping
//! through the traits defined here:
//! - `BlobStore` for persisted state
//! - `FederationClient` for the account/role catalog
//! - `CredentialProviderRegistry` for statically configured credentials
//! - `AuditSink` and `Notifier` for audit events and user warnings
//! - `ProviderFactory`, `CredentialsProvider`, `TokenProvider` for runtime connections

pub mod audit;
pub mod credentials;
pub mod error;
pub mod federation;
pub mod registry;
pub mod store;

// Error types
pub use error::{ConnectionError, Result};

// Audit
pub use audit::{AuditAction, AuditEvent, AuditResult, AuditSink, Notifier, SsoAuditMetadata};

// Runtime connection providers
pub use credentials::{
    AwsCredentials, ClientRegistration, CredentialsProvider, ProviderFactory, SsoToken,
    TokenProvider,
};

// Federation catalog
pub use federation::{AccountInfo, BoxStream, FederationClient, RoleInfo};

// Credential provider registry
pub use registry::{CredentialProviderRegistry, ProviderDescriptor};

// Backing store
pub use store::BlobStore;
