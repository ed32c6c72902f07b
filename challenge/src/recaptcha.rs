//! reCAPTCHA `siteverify` client.
//!
//! `POST {verify_url}` with form fields `secret` and `response`; the reply is
//! `{"success": bool, "error-codes": [...], ...}` and only `success` decides
//! the verdict.

use async_trait::async_trait;
use serde::Deserialize;
use std::time::Duration;

use crate::{ChallengeConfig, ChallengeError, ChallengeVerifier};

/// Default connection timeout.
const DEFAULT_CONNECT_TIMEOUT: Duration = Duration::from_secs(5);

/// Raw JSON response from the verification service.
#[derive(Debug, Deserialize)]
struct SiteVerifyResponse {
    success: bool,
    #[serde(default, rename = "error-codes")]
    error_codes: Vec<String>,
    #[serde(default)]
    hostname: Option<String>,
}

pub struct RecaptchaVerifier {
    /// HTTP client (reusable connection pool).
    http_client: reqwest::Client,
    config: ChallengeConfig,
}

impl RecaptchaVerifier {
    pub fn new(config: ChallengeConfig) -> Self {
        let http_client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .connect_timeout(DEFAULT_CONNECT_TIMEOUT)
            .build()
            .unwrap_or_default();
        Self {
            http_client,
            config,
        }
    }

    pub fn config(&self) -> &ChallengeConfig {
        &self.config
    }
}

#[async_trait]
impl ChallengeVerifier for RecaptchaVerifier {
    async fn verify(&self, token: &str) -> Result<(), ChallengeError> {
        if token.is_empty() {
            return Err(ChallengeError::MissingToken);
        }
        let secret = self.config.secret().ok_or(ChallengeError::NotConfigured)?;

        let response = self
            .http_client
            .post(&self.config.verify_url)
            .form(&[("secret", secret.expose()), ("response", token)])
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    ChallengeError::Transport(format!("request timed out: {e}"))
                } else if e.is_connect() {
                    ChallengeError::Transport(format!("connection failed: {e}"))
                } else {
                    ChallengeError::Transport(e.to_string())
                }
            })?;

        let status = response.status();
        let body = response
            .bytes()
            .await
            .map_err(|e| ChallengeError::Transport(format!("failed to read response: {e}")))?;
        let reply: SiteVerifyResponse = serde_json::from_slice(&body).map_err(|e| {
            ChallengeError::MalformedResponse(format!("HTTP status {status}: {e}"))
        })?;

        if reply.success {
            tracing::debug!(hostname = ?reply.hostname, "challenge token accepted");
            Ok(())
        } else {
            tracing::debug!(error_codes = ?reply.error_codes, "challenge token rejected");
            Err(ChallengeError::Rejected {
                error_codes: reply.error_codes,
            })
        }
    }

    fn is_configured(&self) -> bool {
        self.config.secret().is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn response_deserialization() {
        let json = r#"{"success": true, "challenge_ts": "2024-01-01T00:00:00Z", "hostname": "example.com"}"#;
        let resp: SiteVerifyResponse = serde_json::from_str(json).unwrap();
        assert!(resp.success);
        assert!(resp.error_codes.is_empty());
        assert_eq!(resp.hostname.as_deref(), Some("example.com"));
    }

    #[test]
    fn response_with_error_codes() {
        let json = r#"{"success": false, "error-codes": ["invalid-input-response"]}"#;
        let resp: SiteVerifyResponse = serde_json::from_str(json).unwrap();
        assert!(!resp.success);
        assert_eq!(resp.error_codes, vec!["invalid-input-response"]);
    }

    #[test]
    fn response_without_success_is_malformed() {
        assert!(serde_json::from_str::<SiteVerifyResponse>(r#"{"score": 0.9}"#).is_err());
    }
}
