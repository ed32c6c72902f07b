//! LMDB storage backend for the wicket registration service.
//!
//! Implements the storage traits from `wicket-store` using the `heed` LMDB
//! bindings. Each logical table maps to one LMDB database within a single
//! environment. Databases are only ever created by the [`Migrator`]; a server
//! started against an unmigrated environment reports the schema as missing
//! instead of silently creating it.

pub mod account;
pub mod environment;
pub mod error;
pub mod migration;

pub use account::LmdbAccountStore;
pub use environment::LmdbEnvironment;
pub use error::LmdbError;
pub use migration::{Migrator, CURRENT_SCHEMA_VERSION};
