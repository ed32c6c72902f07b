//! Cryptographic primitives for the wicket registration service.
//!
//! - **Argon2id** salted one-way password hashing, encoded as PHC strings
//!   so the parameters travel with every stored hash
//! - **Blake2b-256** digests used as fixed-size index keys

pub mod error;
pub mod hash;
pub mod password;

pub use error::CryptoError;
pub use hash::blake2b_256;
pub use password::{HashParams, PasswordHasher};
