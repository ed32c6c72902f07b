//! Abstract storage traits for the wicket registration service.
//!
//! Every storage backend (LMDB, in-memory for testing) implements these
//! traits. The rest of the codebase depends only on the traits.

pub mod account;
pub mod error;

pub use account::AccountStore;
pub use error::StoreError;
