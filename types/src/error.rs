//! Client-correctable validation failures.

use thiserror::Error;

/// A registration or gate submission that is malformed or internally
/// inconsistent. The display text is safe to return to the caller verbatim.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("Missing required fields")]
    MissingFields,

    #[error("reCaptcha verification required")]
    ChallengeRequired,

    #[error("Token is required")]
    TokenRequired,

    #[error("Passwords do not match")]
    PasswordMismatch,

    #[error("Phone number cannot be the same as parent phone number")]
    PhoneEqualsParent,

    #[error("Invalid request body")]
    MalformedBody,
}
