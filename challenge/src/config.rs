//! Challenge service configuration.
//!
//! Built once at startup and handed to the verifier. A missing secret is not
//! a startup failure: verification calls report
//! [`crate::ChallengeError::NotConfigured`] instead.

use serde::Deserialize;
use std::fmt;
use zeroize::{Zeroize, ZeroizeOnDrop};

/// Google reCAPTCHA verification endpoint.
pub const DEFAULT_VERIFY_URL: &str = "https://www.google.com/recaptcha/api/siteverify";

/// Default per-request timeout for the verification call, in seconds.
pub const DEFAULT_TIMEOUT_SECS: u64 = 10;

/// Server-held secret for the verification service. Never logged.
#[derive(Clone, PartialEq, Eq, Deserialize, Zeroize, ZeroizeOnDrop)]
#[serde(transparent)]
pub struct SecretKey(String);

impl SecretKey {
    pub fn new(secret: impl Into<String>) -> Self {
        Self(secret.into())
    }

    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for SecretKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("SecretKey(<redacted>)")
    }
}

#[derive(Clone, Debug, Deserialize)]
pub struct ChallengeConfig {
    /// Server-only secret. Absent (or empty) means unconfigured.
    #[serde(default)]
    pub secret_key: Option<SecretKey>,

    /// Client-visible site key used to render the widget.
    #[serde(default)]
    pub site_key: Option<String>,

    #[serde(default = "default_verify_url")]
    pub verify_url: String,

    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

fn default_verify_url() -> String {
    DEFAULT_VERIFY_URL.to_string()
}

fn default_timeout_secs() -> u64 {
    DEFAULT_TIMEOUT_SECS
}

impl ChallengeConfig {
    pub fn new(secret_key: Option<SecretKey>, site_key: Option<String>) -> Self {
        Self {
            secret_key,
            site_key,
            ..Default::default()
        }
    }

    /// The secret, if one is set and non-empty.
    pub fn secret(&self) -> Option<&SecretKey> {
        self.secret_key.as_ref().filter(|s| !s.expose().is_empty())
    }

    /// The site key, if one is set and non-empty.
    pub fn site_key(&self) -> Option<&str> {
        self.site_key.as_deref().filter(|s| !s.is_empty())
    }
}

impl Default for ChallengeConfig {
    fn default() -> Self {
        Self {
            secret_key: None,
            site_key: None,
            verify_url: default_verify_url(),
            timeout_secs: default_timeout_secs(),
        }
    }
}
