//! Nullable challenge verifier: scripted verdicts without a network.

use std::collections::HashSet;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;
use wicket_challenge::{ChallengeError, ChallengeVerifier};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Mode {
    Scripted,
    Unconfigured,
    Unreachable,
}

/// A verifier that accepts a fixed set of tokens and records every
/// outbound call it would have made.
pub struct NullChallengeVerifier {
    mode: Mode,
    accepted: HashSet<String>,
    calls: AtomicUsize,
    seen: Mutex<Vec<String>>,
}

impl NullChallengeVerifier {
    fn with_mode(mode: Mode, accepted: &[&str]) -> Self {
        Self {
            mode,
            accepted: accepted.iter().map(|t| t.to_string()).collect(),
            calls: AtomicUsize::new(0),
            seen: Mutex::new(Vec::new()),
        }
    }

    /// Accepts exactly `tokens`; every other token is rejected.
    pub fn accepting(tokens: &[&str]) -> Self {
        Self::with_mode(Mode::Scripted, tokens)
    }

    /// No server secret: every call fails before reaching the service.
    pub fn unconfigured() -> Self {
        Self::with_mode(Mode::Unconfigured, &[])
    }

    /// The service cannot be reached: every call is a transport failure.
    pub fn unreachable() -> Self {
        Self::with_mode(Mode::Unreachable, &[])
    }

    /// Number of calls that reached the (simulated) service.
    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    /// Tokens sent to the service, in order.
    pub fn seen_tokens(&self) -> Vec<String> {
        self.seen.lock().unwrap().clone()
    }
}

#[async_trait]
impl ChallengeVerifier for NullChallengeVerifier {
    async fn verify(&self, token: &str) -> Result<(), ChallengeError> {
        if token.is_empty() {
            return Err(ChallengeError::MissingToken);
        }
        if self.mode == Mode::Unconfigured {
            return Err(ChallengeError::NotConfigured);
        }
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.seen.lock().unwrap().push(token.to_string());

        match self.mode {
            Mode::Unreachable => Err(ChallengeError::Transport("connection refused".into())),
            _ if self.accepted.contains(token) => Ok(()),
            _ => Err(ChallengeError::Rejected {
                error_codes: vec!["invalid-input-response".to_string()],
            }),
        }
    }

    fn is_configured(&self) -> bool {
        self.mode != Mode::Unconfigured
    }
}
