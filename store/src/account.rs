//! Account storage trait.

use crate::StoreError;
use wicket_types::{Account, AccountId, NewAccount, PhoneNumber};

/// Trait for account storage operations.
///
/// Implementations must enforce uniqueness of `phone_number` and of
/// `parent_phone_number` atomically inside [`AccountStore::insert_account`],
/// each field independently of the other. Application-level pre-checks
/// through [`AccountStore::find_matching`] only exist to produce a friendly
/// error in the common case; they cannot close the race between two
/// concurrent registrations.
pub trait AccountStore: Send + Sync {
    /// First existing account whose phone number equals `phone_number` OR
    /// whose parent phone number equals `parent_phone_number`.
    fn find_matching(
        &self,
        phone_number: &PhoneNumber,
        parent_phone_number: &PhoneNumber,
    ) -> Result<Option<Account>, StoreError>;

    /// Persist a new account, assigning its id.
    ///
    /// Fails with [`StoreError::Duplicate`] naming the colliding field if either
    /// unique field is already taken; nothing is written in that case.
    fn insert_account(&self, account: NewAccount) -> Result<Account, StoreError>;

    fn get_account(&self, id: AccountId) -> Result<Account, StoreError>;

    fn get_by_phone(&self, phone_number: &PhoneNumber) -> Result<Option<Account>, StoreError>;

    fn account_count(&self) -> Result<u64, StoreError>;
}
