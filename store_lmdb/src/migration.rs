//! Database schema migration engine.
//!
//! Tracks a monotonically increasing schema version in the `meta` database
//! and runs sequential migration steps to bring an older (or empty)
//! environment up to date. All steps run inside one write transaction, so a
//! failed migration leaves the environment untouched.

use heed::types::Bytes;
use heed::{Database, Env, RwTxn};

use crate::environment::{
    LmdbEnvironment, ACCOUNTS_DB, META_DB, PARENT_PHONE_INDEX_DB, PHONE_INDEX_DB,
};
use crate::LmdbError;

/// The schema version that the current code expects.
pub const CURRENT_SCHEMA_VERSION: u32 = 1;

pub(crate) const SCHEMA_VERSION_KEY: &[u8] = b"schema_version";

/// Runs database migrations to bring the schema up to date.
pub struct Migrator;

impl Migrator {
    /// Create missing databases and run any needed migrations.
    ///
    /// - Version 0 means a fresh environment (no version stored yet).
    /// - If the stored version matches `CURRENT_SCHEMA_VERSION`, this is a no-op.
    /// - If the stored version is *higher* than what this code supports,
    ///   the environment was written by a newer release and we refuse to touch it.
    ///
    /// Returns the schema version now in effect.
    pub fn run(environment: &LmdbEnvironment) -> Result<u32, LmdbError> {
        let env = environment.env();
        let mut wtxn = env.write_txn()?;
        let meta: Database<Bytes, Bytes> = env.create_database(&mut wtxn, Some(META_DB))?;
        let current = read_version(&meta, &wtxn)?.unwrap_or(0);

        if current == CURRENT_SCHEMA_VERSION {
            tracing::info!(version = current, "database schema is up to date");
            return Ok(current);
        }

        if current > CURRENT_SCHEMA_VERSION {
            return Err(LmdbError::Heed(format!(
                "database schema version {} is newer than supported version {}",
                current, CURRENT_SCHEMA_VERSION
            )));
        }

        for version in current..CURRENT_SCHEMA_VERSION {
            tracing::info!(from = version, to = version + 1, "running migration");
            run_migration(env, &mut wtxn, version, version + 1)?;
        }

        meta.put(
            &mut wtxn,
            SCHEMA_VERSION_KEY,
            &CURRENT_SCHEMA_VERSION.to_be_bytes(),
        )?;
        wtxn.commit()?;

        tracing::info!(version = CURRENT_SCHEMA_VERSION, "migration complete");
        Ok(CURRENT_SCHEMA_VERSION)
    }

    /// The schema version recorded in the environment, or `None` if the
    /// environment has never been migrated.
    pub fn schema_version(environment: &LmdbEnvironment) -> Result<Option<u32>, LmdbError> {
        let env = environment.env();
        let rtxn = env.read_txn()?;
        let meta: Option<Database<Bytes, Bytes>> = env.open_database(&rtxn, Some(META_DB))?;
        match meta {
            Some(db) => read_version(&db, &rtxn),
            None => Ok(None),
        }
    }
}

fn read_version(
    meta: &Database<Bytes, Bytes>,
    txn: &heed::RoTxn<'_>,
) -> Result<Option<u32>, LmdbError> {
    match meta.get(txn, SCHEMA_VERSION_KEY)? {
        Some(bytes) => {
            let arr: [u8; 4] = bytes.try_into().map_err(|_| {
                LmdbError::Serialization("schema_version has unexpected byte length".to_string())
            })?;
            Ok(Some(u32::from_be_bytes(arr)))
        }
        None => Ok(None),
    }
}

fn run_migration(env: &Env, wtxn: &mut RwTxn<'_>, from: u32, to: u32) -> Result<(), LmdbError> {
    match (from, to) {
        (0, 1) => {
            // Initial schema: account records plus one unique index per
            // identity field.
            for name in [ACCOUNTS_DB, PHONE_INDEX_DB, PARENT_PHONE_INDEX_DB] {
                env.create_database::<Bytes, Bytes>(wtxn, Some(name))?;
            }
            Ok(())
        }
        _ => Err(LmdbError::Heed(format!(
            "unknown migration: {} -> {}",
            from, to
        ))),
    }
}
