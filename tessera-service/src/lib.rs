//! Service-side authentication for Tessera.
//!
//! - [`filter`] - per-request certificate and signature checks
//! - [`issuer`] - short-lived certificates for calling other services
//! - [`config`] - trusted issuers and windows from TOML

pub mod config;
pub mod filter;
pub mod issuer;

pub use config::{ConfigError, ServiceConfig};
pub use filter::{AnonymousReason, AuthContext, AuthFilter, AuthOutcome};
pub use issuer::ServiceIssuer;
