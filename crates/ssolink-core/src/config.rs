//! Auth configuration
//!
//! Loads from a TOML file, e.g. `~/.ssolink/config.toml`:
//!
//! ```toml
//! profiles_key = "auth.profiles"
//! current_profile_key = "auth.currentProfileId"
//! warn_on_empty_discovery = true
//! storage_path = "/home/me/.ssolink/profiles.db"
//! ```

use serde::{Deserialize, Serialize};
use ssolink_traits::{ConnectionError, Result};
use std::path::{Path, PathBuf};

/// Configuration for the profile store and reconciler
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AuthConfig {
    /// Blob key holding the id → profile mapping
    pub profiles_key: String,
    /// Blob key holding the current profile id
    pub current_profile_key: String,
    /// Warn the user when discovery finds no accounts or roles
    pub warn_on_empty_discovery: bool,
    /// redb database file; profiles stay in memory when unset
    #[serde(skip_serializing_if = "Option::is_none")]
    pub storage_path: Option<PathBuf>,
}

fn default_profiles_key() -> String {
    "auth.profiles".to_string()
}
fn default_current_profile_key() -> String {
    "auth.currentProfileId".to_string()
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            profiles_key: default_profiles_key(),
            current_profile_key: default_current_profile_key(),
            warn_on_empty_discovery: true,
            storage_path: None,
        }
    }
}

impl AuthConfig {
    /// Parse a TOML document. Missing fields take their defaults.
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let config: Self =
            toml::from_str(content).map_err(|e| ConnectionError::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from a specific path
    ///
    /// A missing file yields the defaults.
    pub fn load_from_path(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        if !path.exists() {
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(path).map_err(|e| {
            ConnectionError::Config(format!("failed to read {}: {e}", path.display()))
        })?;
        Self::from_toml_str(&content)
    }

    /// Get the default configuration file path
    pub fn default_path() -> Result<PathBuf> {
        ssolink_storage::paths::resolve_ssolink_dir()
            .map(|dir| dir.join("config.toml"))
            .map_err(ConnectionError::Storage)
    }

    pub fn validate(&self) -> Result<()> {
        if self.profiles_key.trim().is_empty() {
            return Err(ConnectionError::Config(
                "profiles_key must not be empty".to_string(),
            ));
        }
        if self.current_profile_key.trim().is_empty() {
            return Err(ConnectionError::Config(
                "current_profile_key must not be empty".to_string(),
            ));
        }
        if self.profiles_key == self.current_profile_key {
            return Err(ConnectionError::Config(format!(
                "profiles_key and current_profile_key must differ (both are '{}')",
                self.profiles_key
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_defaults() {
        let config = AuthConfig::default();
        assert_eq!(config.profiles_key, "auth.profiles");
        assert_eq!(config.current_profile_key, "auth.currentProfileId");
        assert!(config.warn_on_empty_discovery);
        assert!(config.storage_path.is_none());
        config.validate().unwrap();
    }

    #[test]
    fn test_partial_toml_keeps_defaults() {
        let config = AuthConfig::from_toml_str("warn_on_empty_discovery = false").unwrap();
        assert!(!config.warn_on_empty_discovery);
        assert_eq!(config.profiles_key, "auth.profiles");
    }

    #[test]
    fn test_identical_keys_rejected() {
        let error = AuthConfig::from_toml_str(
            r#"
            profiles_key = "same"
            current_profile_key = "same"
            "#,
        )
        .unwrap_err();
        assert!(matches!(error, ConnectionError::Config(_)));
    }

    #[test]
    fn test_empty_key_rejected() {
        let config = AuthConfig {
            profiles_key: "  ".to_string(),
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_invalid_toml_is_config_error() {
        let error = AuthConfig::from_toml_str("profiles_key = [").unwrap_err();
        assert_eq!(error.kind(), "ConfigError");
    }

    #[test]
    fn test_load_from_path() {
        let dir = tempdir().unwrap();

        let missing = AuthConfig::load_from_path(dir.path().join("missing.toml")).unwrap();
        assert_eq!(missing, AuthConfig::default());

        let path = dir.path().join("config.toml");
        std::fs::write(&path, "storage_path = \"/tmp/profiles.db\"\n").unwrap();
        let loaded = AuthConfig::load_from_path(&path).unwrap();
        assert_eq!(loaded.storage_path, Some(PathBuf::from("/tmp/profiles.db")));
    }
}
