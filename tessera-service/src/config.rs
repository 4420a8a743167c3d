//! Service configuration, loaded from TOML.

use std::path::{Path, PathBuf};

use chrono::Duration;
use serde::{Deserialize, Serialize};
use tessera_auth::{PublicKey, TrustedKeys, WireError};

/// 15 minutes: inter-service certificates.
pub const DEFAULT_CERTIFICATE_VALIDITY_SECS: u64 = 15 * 60;

/// Upper bound for the inter-service window (30 days).
pub const MAX_CERTIFICATE_VALIDITY_SECS: u64 = 30 * 24 * 60 * 60;

pub const DEFAULT_MAX_BODY_BYTES: usize = 10 * 1024 * 1024;

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

    #[error("trusted_issuers[{index}] is not a valid key: {source}")]
    InvalidIssuerKey {
        index: usize,
        #[source]
        source: WireError,
    },
}

/// Settings for a service that accepts certificates.
///
/// ```toml
/// # base64 of the tagged public key of every accepted issuer
/// trusted_issuers = ["AdGt...="]
/// certificate_validity_secs = 900
/// max_body_bytes = 10485760
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ServiceConfig {
    pub trusted_issuers: Vec<String>,
    /// Lifetime of certificates this service issues to other services.
    pub certificate_validity_secs: u64,
    /// Larger request bodies are not hashed and stay anonymous.
    pub max_body_bytes: usize,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            trusted_issuers: Vec::new(),
            certificate_validity_secs: DEFAULT_CERTIFICATE_VALIDITY_SECS,
            max_body_bytes: DEFAULT_MAX_BODY_BYTES,
        }
    }
}

impl ServiceConfig {
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
        if self.certificate_validity_secs == 0 {
            return Err(ConfigError::Invalid(
                "certificate_validity_secs must be positive".to_string(),
            ));
        }
        if self.certificate_validity_secs > MAX_CERTIFICATE_VALIDITY_SECS {
            return Err(ConfigError::Invalid(format!(
                "certificate_validity_secs must not exceed {MAX_CERTIFICATE_VALIDITY_SECS}"
            )));
        }
        if self.max_body_bytes == 0 {
            return Err(ConfigError::Invalid("max_body_bytes must be positive".to_string()));
        }
        self.trusted_keys().map(|_| ())
    }

    /// Decode [`trusted_issuers`](Self::trusted_issuers).
    pub fn trusted_keys(&self) -> Result<TrustedKeys, ConfigError> {
        self.trusted_issuers
            .iter()
            .enumerate()
            .map(|(index, encoded)| {
                PublicKey::from_base64(encoded.trim())
                    .map_err(|source| ConfigError::InvalidIssuerKey { index, source })
            })
            .collect()
    }

    /// Inter-service window, clamped to [`MAX_CERTIFICATE_VALIDITY_SECS`].
    #[must_use]
    pub fn certificate_validity(&self) -> Duration {
        let secs = self
            .certificate_validity_secs
            .min(MAX_CERTIFICATE_VALIDITY_SECS);
        i64::try_from(secs)
            .ok()
            .and_then(Duration::try_seconds)
            .unwrap_or(Duration::MAX)
    }
}
