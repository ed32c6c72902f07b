use async_trait::async_trait;

use crate::ChallengeError;

/// Confirms a challenge-response token with the verification service.
///
/// `Ok(())` is a positive verdict. Implementations check, in order: token
/// presence ([`ChallengeError::MissingToken`]), server configuration
/// ([`ChallengeError::NotConfigured`], no outbound call is made), then issue
/// exactly one request. Any negative verdict, transport failure or malformed
/// reply is a verification failure; nothing is retried.
#[async_trait]
pub trait ChallengeVerifier: Send + Sync {
    async fn verify(&self, token: &str) -> Result<(), ChallengeError>;

    /// Whether the server-held secret is present.
    fn is_configured(&self) -> bool;
}
