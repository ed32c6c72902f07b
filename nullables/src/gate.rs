//! Nullable gate collaborators: a widget that counts resets and a gate
//! client with scripted verdicts.

use std::collections::HashSet;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use wicket_gate::{ChallengeWidget, GateError, GateVerifyClient};

#[derive(Debug, Default)]
pub struct NullChallengeWidget {
    resets: usize,
}

impl NullChallengeWidget {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn resets(&self) -> usize {
        self.resets
    }
}

impl ChallengeWidget for NullChallengeWidget {
    fn reset(&mut self) {
        self.resets += 1;
    }
}

/// A gate client that accepts a fixed set of tokens, or is offline.
pub struct NullGateClient {
    accepted: HashSet<String>,
    offline: bool,
    calls: AtomicUsize,
}

impl NullGateClient {
    pub fn accepting(tokens: &[&str]) -> Self {
        Self {
            accepted: tokens.iter().map(|t| t.to_string()).collect(),
            offline: false,
            calls: AtomicUsize::new(0),
        }
    }

    pub fn offline() -> Self {
        Self {
            offline: true,
            ..Self::accepting(&[])
        }
    }

    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl GateVerifyClient for NullGateClient {
    async fn verify(&self, token: &str) -> Result<bool, GateError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.offline {
            return Err(GateError::Transport("network unreachable".into()));
        }
        Ok(self.accepted.contains(token))
    }
}
