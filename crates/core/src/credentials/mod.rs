//! Vendor credential access.
//!
//! Credentials reach the vendor clients through the
//! [`CredentialProvider`] trait; where they come from (environment,
//! mounted secret, test fixture) is the caller's concern. Encrypted
//! payloads are handled by the two decryption utilities in
//! [`decrypt`](self::decrypt_aes_gcm).

mod decrypt;
mod error;
mod providers;
mod traits;

pub use decrypt::{decrypt_aes_gcm, decrypt_xor};
pub use error::CredentialError;
pub use providers::{EnvCredentialProvider, StaticCredentialProvider};
pub use traits::{CredentialProvider, SecretString};
