use base64::engine::general_purpose::STANDARD as B64;
use base64::Engine;
use pbkdf2::pbkdf2_hmac;
use rand::rngs::OsRng;
use rand::RngCore;
use serde::{Deserialize, Serialize};
use sha2::Sha256;

use crate::error::{AppError, Result};

pub const DEFAULT_PBKDF2_ITERATIONS: u32 = 200_000;

fn default_pbkdf2_iterations() -> u32 {
    DEFAULT_PBKDF2_ITERATIONS
}

/// PBKDF2-HMAC-SHA256 digest of the admin secret. Salt and hash are base64.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthRecord {
    pub salt: String,
    pub hash: String,
    #[serde(default = "default_pbkdf2_iterations")]
    pub iterations: u32,
}

impl AuthRecord {
    /// Hash `secret` under a fresh random salt.
    pub fn from_secret(secret: &str, iterations: u32) -> Result<Self> {
        if secret.is_empty() {
            return Err(AppError::Config("admin secret must not be empty".to_string()));
        }
        let iterations = iterations.max(1);
        let mut salt = [0u8; 16];
        OsRng.fill_bytes(&mut salt);
        let key = derive_key(secret, &salt, iterations);
        Ok(Self {
            salt: encode_b64(&salt),
            hash: encode_b64(key.as_slice()),
            iterations,
        })
    }

    /// Reject records that can never verify.
    pub fn validate(&self) -> Result<()> {
        if self.salt.is_empty() || self.hash.is_empty() {
            return Err(AppError::Config(
                "admin.hashed needs both salt and hash".to_string(),
            ));
        }
        decode_b64(self.salt.as_str())?;
        Ok(())
    }

    pub fn verify(&self, candidate: &str) -> bool {
        if candidate.is_empty() {
            return false;
        }
        let Ok(salt) = decode_b64(self.salt.as_str()) else {
            return false;
        };
        let key = derive_key(candidate, salt.as_slice(), self.iterations.max(1));
        encode_b64(key.as_slice()) == self.hash
    }
}

fn derive_key(password: &str, salt: &[u8], iterations: u32) -> [u8; 32] {
    let mut key = [0u8; 32];
    pbkdf2_hmac::<Sha256>(password.as_bytes(), salt, iterations, &mut key);
    key
}

fn decode_b64(value: &str) -> Result<Vec<u8>> {
    B64.decode(value)
        .map_err(|err| AppError::Config(format!("invalid base64 in admin.hashed: {err}")))
}

fn encode_b64(bytes: &[u8]) -> String {
    B64.encode(bytes)
}
