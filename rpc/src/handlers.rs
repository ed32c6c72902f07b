//! HTTP request handlers.

use axum::body::Bytes;
use axum::extract::State;
use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::{Deserialize, Serialize};
use tracing::{info_span, Instrument};

use wicket_challenge::ChallengeError;
use wicket_gate::GateConfig;
use wicket_registration::{RegistrationError, RegistrationRequest};
use wicket_types::ValidationError;

use crate::error::RpcError;
use crate::server::RpcState;

// ── Register ─────────────────────────────────────────────────────────────

#[derive(Serialize)]
pub struct SuccessResponse {
    pub success: bool,
}

/// `POST /api/auth/register`. Rejections are plain text.
pub async fn register(State(state): State<RpcState>, body: Bytes) -> Response {
    async move {
        let request: RegistrationRequest = match serde_json::from_slice(&body) {
            Ok(request) => request,
            Err(_) => {
                state.metrics.record_registration("validation");
                return RpcError::from(ValidationError::MalformedBody).into_response();
            }
        };

        let outcome = state.registration.register(&request).await;
        state
            .metrics
            .record_registration(registration_outcome(&outcome));

        match outcome {
            Ok(_) => Json(SuccessResponse { success: true }).into_response(),
            Err(e) => RpcError::from(e).into_response(),
        }
    }
    .instrument(info_span!("rpc", action = "register"))
    .await
}

fn registration_outcome<T>(outcome: &Result<T, RegistrationError>) -> &'static str {
    match outcome {
        Ok(_) => "created",
        Err(RegistrationError::Validation(_)) => "validation",
        Err(RegistrationError::Challenge(_)) => "challenge",
        Err(RegistrationError::Conflict(_)) => "conflict",
        Err(RegistrationError::Configuration(_)) => "configuration",
        Err(RegistrationError::PersistenceUnavailable(_)) => "unavailable",
        Err(RegistrationError::Internal(_)) => "internal",
    }
}

// ── Gate ─────────────────────────────────────────────────────────────────

#[derive(Deserialize)]
pub struct VerifyGateRequest {
    #[serde(default)]
    pub token: Option<String>,
}

/// `POST /api/auth/verify-recaptcha-gate`. Every reply is JSON.
pub async fn verify_gate(State(state): State<RpcState>, body: Bytes) -> Response {
    async move {
        let outcome = check_gate_token(&state, &body).await;
        state.metrics.record_gate_verification(gate_outcome(&outcome));

        match outcome {
            Ok(()) => Json(SuccessResponse { success: true }).into_response(),
            Err(e) => e.into_json_response(),
        }
    }
    .instrument(info_span!("rpc", action = "verify_gate"))
    .await
}

async fn check_gate_token(state: &RpcState, body: &[u8]) -> Result<(), RpcError> {
    let request: VerifyGateRequest =
        serde_json::from_slice(body).map_err(|_| ValidationError::MalformedBody)?;
    let token = request
        .token
        .filter(|t| !t.is_empty())
        .ok_or(ValidationError::TokenRequired)?;

    if !state.verifier.is_configured() {
        return Err(ChallengeError::NotConfigured.into());
    }
    state.verifier.verify(&token).await?;
    Ok(())
}

fn gate_outcome(outcome: &Result<(), RpcError>) -> &'static str {
    match outcome {
        Ok(()) => "verified",
        Err(RpcError::Validation(_)) => "invalid",
        Err(RpcError::Challenge(ChallengeError::NotConfigured)) => "configuration",
        Err(RpcError::Challenge(e)) if e.is_verification_failure() => "rejected",
        Err(_) => "error",
    }
}

/// `GET /api/auth/gate-config`
pub async fn gate_config(State(state): State<RpcState>) -> Json<GateConfig> {
    Json(state.gate.as_ref().clone())
}

// ── Health / metrics ─────────────────────────────────────────────────────

#[derive(Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
}

pub async fn health() -> Json<HealthResponse> {
    Json(HealthResponse { status: "ok" })
}

pub async fn metrics(State(state): State<RpcState>) -> Response {
    match state.metrics.encode() {
        Ok(text) => (
            StatusCode::OK,
            [(header::CONTENT_TYPE, "text/plain; version=0.0.4")],
            text,
        )
            .into_response(),
        Err(e) => RpcError::Server(format!("metrics encoding failed: {e}")).into_response(),
    }
}
