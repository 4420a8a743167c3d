//! Authority configuration, loaded from TOML.

use std::path::{Path, PathBuf};

use chrono::Duration;
use serde::{Deserialize, Serialize};

/// 60 days: persistent ("remember me") sessions.
pub const DEFAULT_SESSION_VALIDITY_SECS: u64 = 60 * 24 * 60 * 60;

/// 15 minutes: transient sessions.
pub const DEFAULT_TRANSIENT_VALIDITY_SECS: u64 = 15 * 60;

/// Upper bound for any validity window (10 years).
pub const MAX_VALIDITY_SECS: u64 = 10 * 365 * 24 * 60 * 60;

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read config at {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("invalid config: {0}")]
    Invalid(String),
}

/// Session lifecycle settings.
///
/// ```toml
/// session_validity_secs = 5184000
/// transient_validity_secs = 900
/// single_active_session = true
/// retain_signed_out_sessions = false
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct AuthorityConfig {
    /// Lifetime of persistent session certificates.
    pub session_validity_secs: u64,
    /// Lifetime of transient session certificates.
    pub transient_validity_secs: u64,
    /// Refuse a new session while an active one exists for the same user and
    /// client key.
    pub single_active_session: bool,
    /// Keep signed-out sessions as invalidated records instead of deleting them.
    pub retain_signed_out_sessions: bool,
}

impl Default for AuthorityConfig {
    fn default() -> Self {
        Self {
            session_validity_secs: DEFAULT_SESSION_VALIDITY_SECS,
            transient_validity_secs: DEFAULT_TRANSIENT_VALIDITY_SECS,
            single_active_session: false,
            retain_signed_out_sessions: false,
        }
    }
}

impl AuthorityConfig {
    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&content)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        for (name, secs) in [
            ("session_validity_secs", self.session_validity_secs),
            ("transient_validity_secs", self.transient_validity_secs),
        ] {
            if secs == 0 {
                return Err(ConfigError::Invalid(format!("{name} must be positive")));
            }
            if secs > MAX_VALIDITY_SECS {
                return Err(ConfigError::Invalid(format!(
                    "{name} must not exceed {MAX_VALIDITY_SECS}"
                )));
            }
        }
        Ok(())
    }

    /// Persistent window, clamped to [`MAX_VALIDITY_SECS`].
    #[must_use]
    pub fn session_validity(&self) -> Duration {
        clamped_window(self.session_validity_secs)
    }

    /// Transient window, clamped to [`MAX_VALIDITY_SECS`].
    #[must_use]
    pub fn transient_validity(&self) -> Duration {
        clamped_window(self.transient_validity_secs)
    }
}

fn clamped_window(secs: u64) -> Duration {
    let secs = i64::try_from(secs.min(MAX_VALIDITY_SECS)).unwrap_or(i64::MAX);
    Duration::try_seconds(secs).unwrap_or(Duration::MAX)
}
