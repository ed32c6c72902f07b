//! HTTP client for the gate verification endpoint.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::config::GateConfig;
use crate::error::GateError;

/// Default timeout for gate requests.
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(15);

/// Default connection timeout.
const DEFAULT_CONNECT_TIMEOUT: Duration = Duration::from_secs(5);

pub const VERIFY_GATE_PATH: &str = "/api/auth/verify-recaptcha-gate";
pub const GATE_CONFIG_PATH: &str = "/api/auth/gate-config";

/// Asks the server whether a challenge token is valid.
#[async_trait]
pub trait GateVerifyClient: Send + Sync {
    /// `Ok(false)` is a rejected token; `Err` means the server could not be asked.
    async fn verify(&self, token: &str) -> Result<bool, GateError>;
}

#[derive(Serialize)]
struct VerifyRequest<'a> {
    token: &'a str,
}

/// `{"success": bool, "error"?: string}`. Only `success` is consulted.
#[derive(Debug, Deserialize)]
struct VerifyResponse {
    success: bool,
    #[serde(default)]
    error: Option<String>,
}

/// Talks to a wicket server over HTTP.
pub struct HttpGateClient {
    /// HTTP client (reusable connection pool).
    http_client: reqwest::Client,
    base_url: String,
}

impl HttpGateClient {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self::with_timeout(base_url, DEFAULT_TIMEOUT)
    }

    pub fn with_timeout(base_url: impl Into<String>, timeout: Duration) -> Self {
        let http_client = reqwest::Client::builder()
            .timeout(timeout)
            .connect_timeout(DEFAULT_CONNECT_TIMEOUT)
            .build()
            .unwrap_or_default();
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Self {
            http_client,
            base_url,
        }
    }

    /// `GET /api/auth/gate-config`
    pub async fn fetch_config(&self) -> Result<GateConfig, GateError> {
        let url = format!("{}{GATE_CONFIG_PATH}", self.base_url);
        let response = self
            .http_client
            .get(&url)
            .send()
            .await
            .map_err(transport_error)?;

        if !response.status().is_success() {
            return Err(GateError::MalformedResponse(format!(
                "HTTP status {}",
                response.status()
            )));
        }
        response
            .json()
            .await
            .map_err(|e| GateError::MalformedResponse(format!("failed to parse gate config: {e}")))
    }
}

#[async_trait]
impl GateVerifyClient for HttpGateClient {
    async fn verify(&self, token: &str) -> Result<bool, GateError> {
        let url = format!("{}{VERIFY_GATE_PATH}", self.base_url);
        let response = self
            .http_client
            .post(&url)
            .json(&VerifyRequest { token })
            .send()
            .await
            .map_err(transport_error)?;

        // Rejections come back as 4xx with a JSON body; read it either way.
        let status = response.status();
        let body = response
            .bytes()
            .await
            .map_err(|e| GateError::Transport(format!("failed to read response: {e}")))?;
        let reply: VerifyResponse = serde_json::from_slice(&body)
            .map_err(|e| GateError::MalformedResponse(format!("HTTP status {status}: {e}")))?;

        if !reply.success {
            tracing::debug!(%status, error = ?reply.error, "gate verification refused");
        }
        Ok(reply.success)
    }
}

fn transport_error(e: reqwest::Error) -> GateError {
    if e.is_timeout() {
        GateError::Transport(format!("request timed out: {e}"))
    } else if e.is_connect() {
        GateError::Transport(format!("connection failed: {e}"))
    } else {
        GateError::Transport(e.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn response_deserialization() {
        let ok: VerifyResponse = serde_json::from_str(r#"{"success":true}"#).unwrap();
        assert!(ok.success);
        let bad: VerifyResponse =
            serde_json::from_str(r#"{"success":false,"error":"Invalid reCaptcha token"}"#)
                .unwrap();
        assert!(!bad.success);
        assert_eq!(bad.error.as_deref(), Some("Invalid reCaptcha token"));
    }

    #[test]
    fn base_url_trailing_slash_is_trimmed() {
        let client = HttpGateClient::new("http://localhost:3000/");
        assert_eq!(client.base_url, "http://localhost:3000");
    }

    #[tokio::test]
    async fn unreachable_server_is_transport_error() {
        let client = HttpGateClient::with_timeout("http://127.0.0.1:1", Duration::from_secs(2));
        assert!(matches!(
            client.verify("t").await,
            Err(GateError::Transport(_))
        ));
    }
}
