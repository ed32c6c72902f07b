//! Nullable infrastructure for deterministic testing.
//!
//! Inspired by the "A-frame architecture" pattern from RsNano.
//! All external dependencies (account storage, the challenge service, the
//! gate endpoint and widget) are abstracted behind traits. This crate provides test-friendly
//! implementations that:
//! - Return deterministic values
//! - Can be controlled programmatically (fault injection, stale reads)
//! - Never touch the filesystem or network
//!
//! Usage: swap real implementations for nullables in tests.

pub mod challenge;
pub mod gate;
pub mod store;

pub use challenge::NullChallengeVerifier;
pub use gate::{NullChallengeWidget, NullGateClient};
pub use store::{NullAccountStore, NullStoreFault};
