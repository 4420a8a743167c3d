//! Certificates: the signed credential an authority issues and services verify.
//!
//! - [`Certificate`] - issuer key, client key, expiry, role mask and payload
//! - [`RoleMask`] / [`Role`] - role sets packed into 64 bits
//! - [`CertificateValidator`] - signature, trust and expiry checks

mod certificate;
mod error;
mod roles;
mod validator;

pub use certificate::{decode_base64, encode_base64, Certificate, CERTIFICATE_VERSION};
pub use error::{CertError, Rejection, RoleError};
pub use roles::{Role, RoleMask, MAX_ROLES};
pub use validator::CertificateValidator;
