use thiserror::Error;
use wicket_challenge::ChallengeError;
use wicket_store::StoreError;
use wicket_types::{UniqueField, ValidationError};

#[derive(Debug, Error)]
pub enum RegistrationError {
    /// Malformed or inconsistent input; the caller can fix it.
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// The challenge token was rejected or could not be checked.
    #[error("challenge verification failed: {0}")]
    Challenge(ChallengeError),

    /// A unique identity field is already taken.
    #[error("{0} already exists")]
    Conflict(UniqueField),

    /// The server is missing a required secret. Operator-facing.
    #[error("configuration error: {0}")]
    Configuration(String),

    /// The store's schema is not initialized or the store is unreachable.
    /// Operator-facing.
    #[error("persistence unavailable: {0}")]
    PersistenceUnavailable(String),

    #[error("internal error: {0}")]
    Internal(String),
}

impl From<ChallengeError> for RegistrationError {
    fn from(e: ChallengeError) -> Self {
        match e {
            ChallengeError::MissingToken => {
                RegistrationError::Validation(ValidationError::ChallengeRequired)
            }
            ChallengeError::NotConfigured => RegistrationError::Configuration(e.to_string()),
            other => RegistrationError::Challenge(other),
        }
    }
}

impl From<StoreError> for RegistrationError {
    fn from(e: StoreError) -> Self {
        match e {
            StoreError::Duplicate(field) => RegistrationError::Conflict(field),
            not_ready if not_ready.is_not_ready() => {
                RegistrationError::PersistenceUnavailable(not_ready.to_string())
            }
            other => RegistrationError::Internal(other.to_string()),
        }
    }
}
