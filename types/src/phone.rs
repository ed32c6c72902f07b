//! Phone number identity field.

use serde::{Deserialize, Serialize};
use std::fmt;

/// A phone number as submitted by the user.
///
/// No normalisation is applied: two numbers are the same identity only if
/// their strings are byte-for-byte equal.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PhoneNumber(String);

impl PhoneNumber {
    pub fn new(raw: impl Into<String>) -> Self {
        Self(raw.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Key bytes used by storage indexes.
    pub fn as_bytes(&self) -> &[u8] {
        self.0.as_bytes()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Display for PhoneNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<String> for PhoneNumber {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<&str> for PhoneNumber {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}
