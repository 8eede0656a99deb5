use argon2::{
    Algorithm, Argon2, Params, Version,
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
};
use ring::rand::{SecureRandom, SystemRandom};

use super::config::{ARGON2_ITERATIONS, ARGON2_MEMORY_KIB, ARGON2_PARALLELISM};
use super::errors::CredentialError;

/// Hashes new passwords and checks submitted ones against stored digests.
///
/// New digests use the configured cost. Verification always uses the parameters
/// embedded in the stored digest, so raising the cost does not lock out old accounts.
#[derive(Clone)]
pub struct CredentialVerifier {
    argon2: Argon2<'static>,
}

impl std::fmt::Debug for CredentialVerifier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CredentialVerifier").finish_non_exhaustive()
    }
}

impl CredentialVerifier {
    /// Argon2id with explicit cost: memory in KiB, iterations, lanes.
    pub fn new(memory_kib: u32, iterations: u32, parallelism: u32) -> Result<Self, CredentialError> {
        let params = Params::new(memory_kib, iterations, parallelism, None)
            .map_err(|e| CredentialError::Params(e.to_string()))?;
        Ok(Self {
            argon2: Argon2::new(Algorithm::Argon2id, Version::V0x13, params),
        })
    }

    /// Cost taken from `ARGON2_MEMORY_KIB`, `ARGON2_ITERATIONS` and `ARGON2_PARALLELISM`.
    pub fn from_env() -> Result<Self, CredentialError> {
        Self::new(*ARGON2_MEMORY_KIB, *ARGON2_ITERATIONS, *ARGON2_PARALLELISM)
    }

    /// Returns a PHC string such as `$argon2id$v=19$m=19456,t=2,p=1$<salt>$<hash>`.
    pub fn hash(&self, plaintext: &str) -> Result<String, CredentialError> {
        let mut salt_bytes = [0u8; 16];
        SystemRandom::new()
            .fill(&mut salt_bytes)
            .map_err(|_| CredentialError::Hashing("Failed to generate salt".to_string()))?;
        let salt = SaltString::encode_b64(&salt_bytes)
            .map_err(|e| CredentialError::Hashing(e.to_string()))?;
        let digest = self
            .argon2
            .hash_password(plaintext.as_bytes(), &salt)
            .map_err(|e| CredentialError::Hashing(e.to_string()))?;
        Ok(digest.to_string())
    }

    /// `true` only when `plaintext` matches `digest`. Malformed digests never match.
    pub fn verify(&self, plaintext: &str, digest: &str) -> bool {
        let parsed = match PasswordHash::new(digest) {
            Ok(parsed) => parsed,
            Err(e) => {
                tracing::warn!("Stored password digest is malformed: {}", e);
                return false;
            }
        };
        self.argon2
            .verify_password(plaintext.as_bytes(), &parsed)
            .is_ok()
    }

    /// [`Self::hash`] on the blocking thread pool, for use from request handlers.
    pub async fn hash_password(&self, plaintext: &str) -> Result<String, CredentialError> {
        let verifier = self.clone();
        let plaintext = plaintext.to_string();
        tokio::task::spawn_blocking(move || verifier.hash(&plaintext))
            .await
            .map_err(|e| CredentialError::Hashing(format!("Hashing task failed: {e}")))?
    }

    /// [`Self::verify`] on the blocking thread pool. A task that fails never matches.
    pub async fn verify_password(&self, plaintext: &str, digest: &str) -> bool {
        let verifier = self.clone();
        let plaintext = plaintext.to_string();
        let digest = digest.to_string();
        match tokio::task::spawn_blocking(move || verifier.verify(&plaintext, &digest)).await {
            Ok(matched) => matched,
            Err(e) => {
                tracing::error!("Password verification task failed: {}", e);
                false
            }
        }
    }
}
