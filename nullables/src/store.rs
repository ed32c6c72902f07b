//! Nullable store: thread-safe in-memory account storage for testing.

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Mutex;

use wicket_store::{AccountStore, StoreError};
use wicket_types::{Account, AccountId, NewAccount, PhoneNumber, Timestamp, UniqueField};

/// A failure mode the store can be told to produce on every call.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum NullStoreFault {
    /// Tables were never created.
    SchemaMissing,
    /// The backend cannot be reached.
    Unavailable,
    /// An unclassified backend failure.
    Backend,
}

impl NullStoreFault {
    fn to_error(self) -> StoreError {
        match self {
            Self::SchemaMissing => StoreError::SchemaMissing("table \"accounts\" does not exist".into()),
            Self::Unavailable => StoreError::Unavailable("connection refused".into()),
            Self::Backend => StoreError::Backend("disk full".into()),
        }
    }
}

/// An in-memory account store for testing.
/// Thread-safe for use with tokio's multi-threaded runtime.
///
/// Uniqueness is enforced atomically on insert, like a real backend.
pub struct NullAccountStore {
    accounts: Mutex<Vec<Account>>,
    fault: Mutex<Option<NullStoreFault>>,
    /// When set, `find_matching` sees nothing, reproducing a registration that
    /// raced past the pre-check.
    stale_reads: AtomicBool,
    insert_attempts: AtomicUsize,
}

impl NullAccountStore {
    pub fn new() -> Self {
        Self {
            accounts: Mutex::new(Vec::new()),
            fault: Mutex::new(None),
            stale_reads: AtomicBool::new(false),
            insert_attempts: AtomicUsize::new(0),
        }
    }

    /// A store that fails every call with `fault`.
    pub fn with_fault(fault: NullStoreFault) -> Self {
        let store = Self::new();
        store.set_fault(Some(fault));
        store
    }

    pub fn set_fault(&self, fault: Option<NullStoreFault>) {
        *self.fault.lock().unwrap() = fault;
    }

    pub fn set_stale_reads(&self, stale: bool) {
        self.stale_reads.store(stale, Ordering::SeqCst);
    }

    /// All stored accounts (for assertions).
    pub fn accounts(&self) -> Vec<Account> {
        self.accounts.lock().unwrap().clone()
    }

    /// Number of times `insert_account` was called, successful or not.
    pub fn insert_attempts(&self) -> usize {
        self.insert_attempts.load(Ordering::SeqCst)
    }

    fn check_fault(&self) -> Result<(), StoreError> {
        match *self.fault.lock().unwrap() {
            Some(fault) => Err(fault.to_error()),
            None => Ok(()),
        }
    }
}

impl Default for NullAccountStore {
    fn default() -> Self {
        Self::new()
    }
}

impl AccountStore for NullAccountStore {
    fn find_matching(
        &self,
        phone_number: &PhoneNumber,
        parent_phone_number: &PhoneNumber,
    ) -> Result<Option<Account>, StoreError> {
        self.check_fault()?;
        if self.stale_reads.load(Ordering::SeqCst) {
            return Ok(None);
        }
        Ok(self
            .accounts
            .lock()
            .unwrap()
            .iter()
            .find(|a| {
                &a.phone_number == phone_number || &a.parent_phone_number == parent_phone_number
            })
            .cloned())
    }

    fn insert_account(&self, account: NewAccount) -> Result<Account, StoreError> {
        self.insert_attempts.fetch_add(1, Ordering::SeqCst);
        self.check_fault()?;
        let mut accounts = self.accounts.lock().unwrap();
        if accounts.iter().any(|a| a.phone_number == account.phone_number) {
            return Err(StoreError::Duplicate(UniqueField::PhoneNumber));
        }
        if accounts
            .iter()
            .any(|a| a.parent_phone_number == account.parent_phone_number)
        {
            return Err(StoreError::Duplicate(UniqueField::ParentPhoneNumber));
        }
        let id = AccountId::new(accounts.len() as u64 + 1);
        let account = Account::from_new(id, account, Timestamp::now());
        accounts.push(account.clone());
        Ok(account)
    }

    fn get_account(&self, id: AccountId) -> Result<Account, StoreError> {
        self.check_fault()?;
        self.accounts
            .lock()
            .unwrap()
            .iter()
            .find(|a| a.id == id)
            .cloned()
            .ok_or_else(|| StoreError::NotFound(format!("account {id}")))
    }

    fn get_by_phone(&self, phone_number: &PhoneNumber) -> Result<Option<Account>, StoreError> {
        self.check_fault()?;
        Ok(self
            .accounts
            .lock()
            .unwrap()
            .iter()
            .find(|a| &a.phone_number == phone_number)
            .cloned())
    }

    fn account_count(&self) -> Result<u64, StoreError> {
        self.check_fault()?;
        Ok(self.accounts.lock().unwrap().len() as u64)
    }
}
