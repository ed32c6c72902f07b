use thiserror::Error;

#[derive(Debug, Error)]
pub enum ChallengeError {
    #[error("challenge token is missing")]
    MissingToken,

    #[error("challenge secret is not configured")]
    NotConfigured,

    #[error("challenge rejected (error codes: [{}])", .error_codes.join(", "))]
    Rejected { error_codes: Vec<String> },

    #[error("challenge service unreachable: {0}")]
    Transport(String),

    #[error("malformed challenge service response: {0}")]
    MalformedResponse(String),
}

impl ChallengeError {
    /// The token was checked and did not pass: a negative verdict, or no
    /// usable verdict at all.
    pub fn is_verification_failure(&self) -> bool {
        matches!(
            self,
            Self::Rejected { .. } | Self::Transport(_) | Self::MalformedResponse(_)
        )
    }
}
