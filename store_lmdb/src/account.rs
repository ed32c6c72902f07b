//! LMDB implementation of AccountStore.
//!
//! Layout:
//! - `accounts`: `id_be (8 bytes)` → bincode [`Account`]
//! - `phone_index`: `blake2b_256(phone)` → `id_be`
//! - `parent_phone_index`: `blake2b_256(parent phone)` → `id_be`
//! - `meta["next_account_id"]`: `u64 be`
//!
//! Uniqueness is enforced inside the single write transaction of
//! [`AccountStore::insert_account`]. LMDB admits one writer at a time, so the
//! index probe and the index write cannot interleave with another insert.
//!
//! Index keys are digests because LMDB caps keys at 511 bytes and phone
//! numbers carry no length limit. A digest hit is confirmed against the
//! stored record before it counts.

use std::sync::{Arc, RwLock};

use heed::types::Bytes;
use heed::{Database, Env, RoTxn};

use wicket_crypto::blake2b_256;
use wicket_store::{AccountStore, StoreError};
use wicket_types::{Account, AccountId, NewAccount, PhoneNumber, Timestamp, UniqueField};

use crate::environment::{ACCOUNTS_DB, META_DB, PARENT_PHONE_INDEX_DB, PHONE_INDEX_DB};
use crate::LmdbError;

const NEXT_ACCOUNT_ID_KEY: &[u8] = b"next_account_id";

#[derive(Clone, Copy)]
struct AccountTables {
    accounts: Database<Bytes, Bytes>,
    phone_index: Database<Bytes, Bytes>,
    parent_phone_index: Database<Bytes, Bytes>,
    meta: Database<Bytes, Bytes>,
}

pub struct LmdbAccountStore {
    env: Arc<Env>,
    /// Resolved lazily so a server started before `migrate` picks the
    /// databases up once they exist.
    tables: RwLock<Option<AccountTables>>,
}

impl LmdbAccountStore {
    pub fn new(env: Arc<Env>) -> Self {
        Self {
            env,
            tables: RwLock::new(None),
        }
    }

    fn tables(&self) -> Result<AccountTables, LmdbError> {
        if let Some(tables) = *self
            .tables
            .read()
            .map_err(|_| LmdbError::Heed("account table cache poisoned".to_string()))?
        {
            return Ok(tables);
        }

        // Handles opened inside a committed transaction stay valid for the
        // lifetime of the environment.
        let wtxn = self.env.write_txn()?;
        let open = |name: &'static str| -> Result<Database<Bytes, Bytes>, LmdbError> {
            self.env
                .open_database::<Bytes, Bytes>(&wtxn, Some(name))?
                .ok_or(LmdbError::MissingDatabase(name))
        };
        let tables = AccountTables {
            accounts: open(ACCOUNTS_DB)?,
            phone_index: open(PHONE_INDEX_DB)?,
            parent_phone_index: open(PARENT_PHONE_INDEX_DB)?,
            meta: open(META_DB)?,
        };
        wtxn.commit()?;

        if let Ok(mut cache) = self.tables.write() {
            *cache = Some(tables);
        }
        Ok(tables)
    }

    fn load(
        &self,
        tables: &AccountTables,
        rtxn: &RoTxn<'_>,
        id_bytes: &[u8],
    ) -> Result<Account, LmdbError> {
        match tables.accounts.get(rtxn, id_bytes)? {
            Some(bytes) => Ok(bincode::deserialize(bytes)?),
            None => Err(LmdbError::NotFound(format!(
                "account {}",
                decode_id(id_bytes)?
            ))),
        }
    }

    fn lookup(
        &self,
        tables: &AccountTables,
        rtxn: &RoTxn<'_>,
        field: UniqueField,
        phone: &PhoneNumber,
    ) -> Result<Option<Account>, LmdbError> {
        let index = match field {
            UniqueField::PhoneNumber => tables.phone_index,
            UniqueField::ParentPhoneNumber => tables.parent_phone_index,
        };
        let Some(id_bytes) = index.get(rtxn, &index_key(phone))? else {
            return Ok(None);
        };
        let account = self.load(tables, rtxn, id_bytes)?;
        let stored = match field {
            UniqueField::PhoneNumber => &account.phone_number,
            UniqueField::ParentPhoneNumber => &account.parent_phone_number,
        };
        if stored != phone {
            return Err(LmdbError::DigestCollision(field.as_str()));
        }
        Ok(Some(account))
    }
}

fn index_key(phone: &PhoneNumber) -> [u8; 32] {
    blake2b_256(phone.as_bytes())
}

fn decode_id(bytes: &[u8]) -> Result<AccountId, LmdbError> {
    let arr: [u8; 8] = bytes
        .try_into()
        .map_err(|_| LmdbError::Serialization(format!("account id has {} bytes", bytes.len())))?;
    Ok(AccountId::from_be_bytes(arr))
}

impl AccountStore for LmdbAccountStore {
    fn find_matching(
        &self,
        phone_number: &PhoneNumber,
        parent_phone_number: &PhoneNumber,
    ) -> Result<Option<Account>, StoreError> {
        let tables = self.tables()?;
        let rtxn = self.env.read_txn().map_err(LmdbError::from)?;
        if let Some(account) =
            self.lookup(&tables, &rtxn, UniqueField::PhoneNumber, phone_number)?
        {
            return Ok(Some(account));
        }
        Ok(self.lookup(
            &tables,
            &rtxn,
            UniqueField::ParentPhoneNumber,
            parent_phone_number,
        )?)
    }

    fn insert_account(&self, account: NewAccount) -> Result<Account, StoreError> {
        let tables = self.tables()?;
        let mut wtxn = self.env.write_txn().map_err(LmdbError::from)?;

        let phone_key = index_key(&account.phone_number);
        let parent_key = index_key(&account.parent_phone_number);
        if self
            .lookup(&tables, &wtxn, UniqueField::PhoneNumber, &account.phone_number)?
            .is_some()
        {
            return Err(StoreError::Duplicate(UniqueField::PhoneNumber));
        }
        if self
            .lookup(
                &tables,
                &wtxn,
                UniqueField::ParentPhoneNumber,
                &account.parent_phone_number,
            )?
            .is_some()
        {
            return Err(StoreError::Duplicate(UniqueField::ParentPhoneNumber));
        }

        let next = match tables
            .meta
            .get(&wtxn, NEXT_ACCOUNT_ID_KEY)
            .map_err(LmdbError::from)?
        {
            Some(bytes) => decode_id(bytes)?.as_u64(),
            None => 1,
        };
        let id = AccountId::new(next);
        let id_bytes = id.to_be_bytes();
        let account = Account::from_new(id, account, Timestamp::now());
        let record = bincode::serialize(&account).map_err(LmdbError::from)?;

        tables
            .accounts
            .put(&mut wtxn, &id_bytes, &record)
            .map_err(LmdbError::from)?;
        tables
            .phone_index
            .put(&mut wtxn, &phone_key, &id_bytes)
            .map_err(LmdbError::from)?;
        tables
            .parent_phone_index
            .put(&mut wtxn, &parent_key, &id_bytes)
            .map_err(LmdbError::from)?;
        tables
            .meta
            .put(&mut wtxn, NEXT_ACCOUNT_ID_KEY, &(next + 1).to_be_bytes())
            .map_err(LmdbError::from)?;
        wtxn.commit().map_err(LmdbError::from)?;

        tracing::debug!(account_id = %account.id, "account inserted");
        Ok(account)
    }

    fn get_account(&self, id: AccountId) -> Result<Account, StoreError> {
        let tables = self.tables()?;
        let rtxn = self.env.read_txn().map_err(LmdbError::from)?;
        Ok(self.load(&tables, &rtxn, &id.to_be_bytes())?)
    }

    fn get_by_phone(&self, phone_number: &PhoneNumber) -> Result<Option<Account>, StoreError> {
        let tables = self.tables()?;
        let rtxn = self.env.read_txn().map_err(LmdbError::from)?;
        Ok(self.lookup(&tables, &rtxn, UniqueField::PhoneNumber, phone_number)?)
    }

    fn account_count(&self) -> Result<u64, StoreError> {
        let tables = self.tables()?;
        let rtxn = self.env.read_txn().map_err(LmdbError::from)?;
        Ok(tables.accounts.len(&rtxn).map_err(LmdbError::from)?)
    }
}
