//! Fundamental types for the wicket registration service.
//!
//! This crate defines the types shared across every other crate in the workspace:
//! accounts and their identity fields, roles, timestamps, and the validation
//! errors that describe a malformed registration submission.

pub mod account;
pub mod error;
pub mod phone;
pub mod time;

pub use account::{Account, AccountId, NewAccount, PasswordHash, Role, UniqueField};
pub use error::ValidationError;
pub use phone::PhoneNumber;
pub use time::Timestamp;
