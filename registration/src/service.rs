//! The registration workflow.

use std::sync::Arc;

use tracing::{debug, info, warn};
use zeroize::Zeroizing;

use wicket_challenge::ChallengeVerifier;
use wicket_crypto::PasswordHasher;
use wicket_store::{AccountStore, StoreError};
use wicket_types::{Account, NewAccount, PhoneNumber, ValidationError};

use crate::error::RegistrationError;
use crate::request::RegistrationRequest;

/// Fields that survived the presence check.
struct Submission<'a> {
    full_name: &'a str,
    phone_number: PhoneNumber,
    parent_phone_number: PhoneNumber,
    password: &'a str,
    confirm_password: &'a str,
    token: &'a str,
}

/// Orchestrates validation, challenge verification and persistence for one
/// registration. Cheap to clone and share across request handlers.
#[derive(Clone)]
pub struct RegistrationService {
    store: Arc<dyn AccountStore>,
    verifier: Arc<dyn ChallengeVerifier>,
    hasher: PasswordHasher,
}

impl RegistrationService {
    pub fn new(
        store: Arc<dyn AccountStore>,
        verifier: Arc<dyn ChallengeVerifier>,
        hasher: PasswordHasher,
    ) -> Self {
        Self {
            store,
            verifier,
            hasher,
        }
    }

    pub fn verifier(&self) -> &Arc<dyn ChallengeVerifier> {
        &self.verifier
    }

    /// Register a new account.
    ///
    /// Nothing is written unless every check passes; a failed registration
    /// leaves the store unchanged.
    pub async fn register(
        &self,
        request: &RegistrationRequest,
    ) -> Result<Account, RegistrationError> {
        let submission = required_fields(request)?;

        if !self.verifier.is_configured() {
            warn!("registration rejected: challenge secret is not configured");
            return Err(RegistrationError::Configuration(
                "challenge secret key is not set".into(),
            ));
        }

        if let Err(e) = self.verifier.verify(submission.token).await {
            debug!(error = %e, "challenge rejected during registration");
            return Err(e.into());
        }

        if submission.password != submission.confirm_password {
            return Err(ValidationError::PasswordMismatch.into());
        }
        if submission.phone_number == submission.parent_phone_number {
            return Err(ValidationError::PhoneEqualsParent.into());
        }

        let (phone, parent) = (
            submission.phone_number.clone(),
            submission.parent_phone_number.clone(),
        );
        let existing = self
            .with_store(move |store| store.find_matching(&phone, &parent))
            .await?;
        if let Some(field) = existing.and_then(|account| {
            account.conflict_with(&submission.phone_number, &submission.parent_phone_number)
        }) {
            debug!(%field, "registration rejected: identity already taken");
            return Err(RegistrationError::Conflict(field));
        }

        let password_hash = self.hash_password(submission.password).await?;
        let new = NewAccount::new(
            submission.full_name,
            submission.phone_number,
            submission.parent_phone_number,
            password_hash,
        )?;

        let account = self
            .with_store(move |store| store.insert_account(new))
            .await
            .inspect_err(|e| {
                if let RegistrationError::Conflict(field) = e {
                    debug!(%field, "registration lost a uniqueness race");
                }
            })?;

        info!(
            account_id = %account.id,
            role = account.role.as_str(),
            "account registered"
        );
        Ok(account)
    }

    /// Store calls block (an LMDB insert holds the single write lock), so
    /// they run on the blocking pool.
    async fn with_store<T, F>(&self, op: F) -> Result<T, RegistrationError>
    where
        T: Send + 'static,
        F: FnOnce(&dyn AccountStore) -> Result<T, StoreError> + Send + 'static,
    {
        let store = Arc::clone(&self.store);
        tokio::task::spawn_blocking(move || op(store.as_ref()))
            .await
            .map_err(|e| RegistrationError::Internal(format!("store task failed: {e}")))?
            .map_err(RegistrationError::from)
    }

    /// Argon2 is deliberately slow; keep it off the async workers.
    async fn hash_password(
        &self,
        password: &str,
    ) -> Result<wicket_types::PasswordHash, RegistrationError> {
        let hasher = self.hasher.clone();
        let password = Zeroizing::new(password.to_string());
        tokio::task::spawn_blocking(move || hasher.hash(&password))
            .await
            .map_err(|e| RegistrationError::Internal(format!("hashing task failed: {e}")))?
            .map_err(|e| RegistrationError::Internal(e.to_string()))
    }
}

fn required_fields(request: &RegistrationRequest) -> Result<Submission<'_>, ValidationError> {
    let (
        Some(full_name),
        Some(phone_number),
        Some(parent_phone_number),
        Some(password),
        Some(confirm_password),
    ) = (
        request.full_name(),
        request.phone_number(),
        request.parent_phone_number(),
        request.password(),
        request.confirm_password(),
    )
    else {
        return Err(ValidationError::MissingFields);
    };

    let token = request
        .challenge_token()
        .ok_or(ValidationError::ChallengeRequired)?;

    Ok(Submission {
        full_name,
        phone_number: PhoneNumber::from(phone_number),
        parent_phone_number: PhoneNumber::from(parent_phone_number),
        password,
        confirm_password,
        token,
    })
}
