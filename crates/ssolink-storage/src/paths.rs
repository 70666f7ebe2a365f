//! Path utilities for ssolink directory resolution.

use anyhow::Result;
use std::path::PathBuf;

const SSOLINK_DIR: &str = ".ssolink";

/// Environment variable to override the ssolink directory.
const SSOLINK_DIR_ENV: &str = "SSOLINK_DIR";

/// Resolve the ssolink data directory.
/// Priority: SSOLINK_DIR env var > ~/.ssolink/
pub fn resolve_ssolink_dir() -> Result<PathBuf> {
    if let Ok(dir) = std::env::var(SSOLINK_DIR_ENV)
        && !dir.trim().is_empty()
    {
        return Ok(PathBuf::from(dir));
    }
    dirs::home_dir()
        .map(|h| h.join(SSOLINK_DIR))
        .ok_or_else(|| anyhow::anyhow!("Failed to determine home directory"))
}
