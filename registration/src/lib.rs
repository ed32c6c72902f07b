//! Account registration.
//!
//! A submission is checked in a fixed order and the first failure wins:
//! required fields, challenge token presence, challenge configuration,
//! challenge verification, password confirmation, phone distinctness,
//! uniqueness pre-check. Only then is the password hashed and the account
//! inserted. The challenge token is always re-verified here, whatever the
//! client-side gate believes.

pub mod error;
pub mod request;
pub mod service;

pub use error::RegistrationError;
pub use request::RegistrationRequest;
pub use service::RegistrationService;
