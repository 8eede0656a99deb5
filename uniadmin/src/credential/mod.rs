//! Password hashing and verification (Argon2id, PHC strings).

mod config;
mod errors;
mod verifier;

pub use errors::CredentialError;
pub use verifier::CredentialVerifier;
