//! Error types shared across ssolink crates

use ssolink_models::ProfileType;
use thiserror::Error;

/// Connection/profile management errors
#[derive(Error, Debug)]
pub enum ConnectionError {
    #[error("Profile not found: {id}")]
    ProfileNotFound { id: String },

    #[error("Cannot change profile type of {id} from \"{existing}\" to \"{requested}\"")]
    ProfileTypeMismatch {
        id: String,
        existing: ProfileType,
        requested: ProfileType,
    },

    #[error("Federation request failed: {0}")]
    Federation(String),

    #[error("Credential provider registry error: {0}")]
    Registry(String),

    #[error("Invalid configuration: {0}")]
    Config(String),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error(transparent)]
    Storage(#[from] anyhow::Error),
}

impl ConnectionError {
    pub fn not_found(id: impl Into<String>) -> Self {
        Self::ProfileNotFound { id: id.into() }
    }

    /// Short stable name of the error kind, used as the audit `reason`.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::ProfileNotFound { .. } => "ProfileNotFound",
            Self::ProfileTypeMismatch { .. } => "ProfileTypeMismatch",
            Self::Federation(_) => "FederationError",
            Self::Registry(_) => "RegistryError",
            Self::Config(_) => "ConfigError",
            Self::Serialization(_) => "SerializationError",
            Self::Storage(_) => "StorageError",
        }
    }
}

/// Result type alias for connection operations
pub type Result<T> = std::result::Result<T, ConnectionError>;
