//! Account entity and the fields that identify it.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::{PhoneNumber, Timestamp, ValidationError};

/// Storage-assigned account identifier.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct AccountId(u64);

impl AccountId {
    pub fn new(id: u64) -> Self {
        Self(id)
    }

    pub fn as_u64(&self) -> u64 {
        self.0
    }

    /// Big-endian key bytes, so LMDB iteration order follows allocation order.
    pub fn to_be_bytes(&self) -> [u8; 8] {
        self.0.to_be_bytes()
    }

    pub fn from_be_bytes(bytes: [u8; 8]) -> Self {
        Self(u64::from_be_bytes(bytes))
    }
}

impl fmt::Display for AccountId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Account role. Every account created by registration starts as [`Role::User`].
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Role {
    #[default]
    User,
    Admin,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::User => "USER",
            Self::Admin => "ADMIN",
        }
    }
}

/// An encoded one-way password hash (PHC string format).
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PasswordHash(String);

impl PasswordHash {
    pub fn new(encoded: impl Into<String>) -> Self {
        Self(encoded.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for PasswordHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("PasswordHash(..)")
    }
}

/// The identity fields that must each be unique across all accounts.
///
/// Uniqueness is per field: a phone number is only compared against other
/// accounts' phone numbers, never against their parent phone numbers.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum UniqueField {
    PhoneNumber,
    ParentPhoneNumber,
}

impl UniqueField {
    /// Wire name of the field, as used in request bodies.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::PhoneNumber => "phoneNumber",
            Self::ParentPhoneNumber => "parentPhoneNumber",
        }
    }
}

impl fmt::Display for UniqueField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A validated account that has not been persisted yet.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewAccount {
    pub full_name: String,
    pub phone_number: PhoneNumber,
    pub parent_phone_number: PhoneNumber,
    pub password_hash: PasswordHash,
    pub role: Role,
}

impl NewAccount {
    /// Build a new account with the default role.
    ///
    /// Rejects a phone number equal to the parent phone number.
    pub fn new(
        full_name: impl Into<String>,
        phone_number: PhoneNumber,
        parent_phone_number: PhoneNumber,
        password_hash: PasswordHash,
    ) -> Result<Self, ValidationError> {
        if phone_number == parent_phone_number {
            return Err(ValidationError::PhoneEqualsParent);
        }
        Ok(Self {
            full_name: full_name.into(),
            phone_number,
            parent_phone_number,
            password_hash,
            role: Role::default(),
        })
    }
}

/// A persisted account.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Account {
    pub id: AccountId,
    pub full_name: String,
    pub phone_number: PhoneNumber,
    pub parent_phone_number: PhoneNumber,
    pub password_hash: PasswordHash,
    pub role: Role,
    pub created_at: Timestamp,
}

impl Account {
    pub fn from_new(id: AccountId, new: NewAccount, created_at: Timestamp) -> Self {
        Self {
            id,
            full_name: new.full_name,
            phone_number: new.phone_number,
            parent_phone_number: new.parent_phone_number,
            password_hash: new.password_hash,
            role: new.role,
            created_at,
        }
    }

    /// Which unique field of this account collides with a candidate, if any.
    ///
    /// The phone number is checked first, so a record matching on both
    /// fields reports [`UniqueField::PhoneNumber`].
    pub fn conflict_with(
        &self,
        phone_number: &PhoneNumber,
        parent_phone_number: &PhoneNumber,
    ) -> Option<UniqueField> {
        if &self.phone_number == phone_number {
            Some(UniqueField::PhoneNumber)
        } else if &self.parent_phone_number == parent_phone_number {
            Some(UniqueField::ParentPhoneNumber)
        } else {
            None
        }
    }
}
