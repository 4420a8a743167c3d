//! Binary wire primitives: tagged key/signature blobs, the `Signable`
//! contract, signing, and byte-exact verification.
//!
//! All multi-byte integers are big-endian.

mod error;
mod reader;
mod signable;
mod signer;
mod tagged;
mod validator;

pub use error::WireError;
pub use reader::{WireReader, MAX_FIELD_LEN};
pub use signable::{read_prefixed_str, write_prefixed, OpaquePayload, Signable};
pub use signer::sign;
pub use tagged::{Mechanism, TaggedBytes};
pub use validator::{deserialize, validate, validate_with, Verified};
