//! LMDB environment setup.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use heed::{Env, EnvOpenOptions};

use crate::account::LmdbAccountStore;
use crate::LmdbError;

/// Account records keyed by big-endian account id.
pub const ACCOUNTS_DB: &str = "accounts";
/// Unique index: phone number → account id.
pub const PHONE_INDEX_DB: &str = "phone_index";
/// Unique index: parent phone number → account id.
pub const PARENT_PHONE_INDEX_DB: &str = "parent_phone_index";
/// Bookkeeping: schema version, id sequence.
pub const META_DB: &str = "meta";

/// Every named database the current schema expects.
pub const ALL_DATABASES: &[&str] = &[ACCOUNTS_DB, PHONE_INDEX_DB, PARENT_PHONE_INDEX_DB, META_DB];

const MAX_DBS: u32 = 8;

/// Wraps the LMDB environment.
pub struct LmdbEnvironment {
    env: Arc<Env>,
    path: PathBuf,
}

impl LmdbEnvironment {
    /// Open or create an LMDB environment at the given path.
    ///
    /// Only the environment is created here; the named databases are
    /// created by [`crate::Migrator::run`].
    pub fn open(path: &Path, map_size: usize) -> Result<Self, LmdbError> {
        std::fs::create_dir_all(path)?;
        // SAFETY: the environment is opened once per process and per path;
        // the daemon never opens the same data directory twice.
        let env = unsafe {
            EnvOpenOptions::new()
                .map_size(map_size)
                .max_dbs(MAX_DBS)
                .open(path)?
        };
        tracing::debug!(path = %path.display(), map_size, "opened LMDB environment");
        Ok(Self {
            env: Arc::new(env),
            path: path.to_path_buf(),
        })
    }

    pub fn env(&self) -> &Arc<Env> {
        &self.env
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// An account store bound to this environment.
    pub fn account_store(&self) -> LmdbAccountStore {
        LmdbAccountStore::new(Arc::clone(&self.env))
    }
}
