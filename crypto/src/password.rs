//! Argon2id password hashing.
//!
//! Each hash gets a fresh 16-byte random salt. The output is a PHC string
//! (`$argon2id$v=19$m=...,t=...,p=...$salt$hash`) so verification never needs
//! out-of-band parameters, and stronger defaults can be rolled out without
//! invalidating existing hashes.

use argon2::password_hash::{
    PasswordHash as PhcHash, PasswordHasher as _, PasswordVerifier, SaltString,
};
use argon2::{Algorithm, Argon2, Params, Version};
use rand::RngCore;
use wicket_types::PasswordHash;

use crate::CryptoError;

/// Default cost: 19 MiB memory, 2 iterations, 1 lane. Comparable in offline
/// attack cost to a bcrypt work factor of 10.
const ARGON2_MEMORY_KIB: u32 = 19 * 1024;
const ARGON2_ITERATIONS: u32 = 2;
const ARGON2_PARALLELISM: u32 = 1;

/// Salt length in bytes.
const SALT_LEN: usize = 16;

/// Argon2id cost parameters.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct HashParams {
    pub memory_kib: u32,
    pub iterations: u32,
    pub parallelism: u32,
}

impl Default for HashParams {
    fn default() -> Self {
        Self {
            memory_kib: ARGON2_MEMORY_KIB,
            iterations: ARGON2_ITERATIONS,
            parallelism: ARGON2_PARALLELISM,
        }
    }
}

/// Salted one-way password hasher.
#[derive(Clone, Debug, Default)]
pub struct PasswordHasher {
    params: HashParams,
}

impl PasswordHasher {
    pub fn new(params: HashParams) -> Self {
        Self { params }
    }

    pub fn params(&self) -> HashParams {
        self.params
    }

    /// Hash a plaintext password with a fresh random salt.
    pub fn hash(&self, password: &str) -> Result<PasswordHash, CryptoError> {
        let mut salt_bytes = [0u8; SALT_LEN];
        rand::thread_rng().fill_bytes(&mut salt_bytes);
        let salt = SaltString::encode_b64(&salt_bytes)
            .map_err(|e| CryptoError::Hash(format!("salt encoding failed: {e}")))?;

        let argon2 = self.argon2()?;
        let hash = argon2
            .hash_password(password.as_bytes(), &salt)
            .map_err(|e| CryptoError::Hash(e.to_string()))?;
        Ok(PasswordHash::new(hash.to_string()))
    }

    /// Check a plaintext password against a stored hash.
    ///
    /// Returns `Ok(false)` on mismatch; `Err` only if the stored hash is not a
    /// parseable PHC string.
    pub fn verify(&self, password: &str, hash: &PasswordHash) -> Result<bool, CryptoError> {
        let parsed =
            PhcHash::new(hash.as_str()).map_err(|e| CryptoError::MalformedHash(e.to_string()))?;
        Ok(Argon2::default()
            .verify_password(password.as_bytes(), &parsed)
            .is_ok())
    }

    fn argon2(&self) -> Result<Argon2<'static>, CryptoError> {
        let params = Params::new(
            self.params.memory_kib,
            self.params.iterations,
            self.params.parallelism,
            None,
        )
        .map_err(|e| CryptoError::Params(e.to_string()))?;
        Ok(Argon2::new(Algorithm::Argon2id, Version::V0x13, params))
    }
}
