//! RPC error types and their HTTP mapping.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use thiserror::Error;
use tracing::error;

use wicket_challenge::ChallengeError;
use wicket_registration::RegistrationError;
use wicket_types::{UniqueField, ValidationError};

const INVALID_TOKEN: &str = "Invalid reCaptcha token";
const CONFIGURATION: &str = "Server configuration error";
const NOT_INITIALIZED: &str = "Database not initialized. Please run database migrations.";
const INTERNAL: &str = "Internal server error";

#[derive(Debug, Error)]
pub enum RpcError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error(transparent)]
    Registration(#[from] RegistrationError),

    #[error(transparent)]
    Challenge(#[from] ChallengeError),

    #[error("server error: {0}")]
    Server(String),
}

impl RpcError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            RpcError::Validation(_) => StatusCode::BAD_REQUEST,
            RpcError::Registration(e) => match e {
                RegistrationError::Validation(_)
                | RegistrationError::Challenge(_)
                | RegistrationError::Conflict(_) => StatusCode::BAD_REQUEST,
                RegistrationError::PersistenceUnavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
                RegistrationError::Configuration(_) | RegistrationError::Internal(_) => {
                    StatusCode::INTERNAL_SERVER_ERROR
                }
            },
            RpcError::Challenge(ChallengeError::NotConfigured) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
            RpcError::Challenge(_) => StatusCode::BAD_REQUEST,
            RpcError::Server(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Text returned to the caller. Operator-facing faults get a generic
    /// message; the detail stays in the server log.
    pub fn public_message(&self) -> String {
        match self {
            RpcError::Validation(v) => v.to_string(),
            RpcError::Registration(e) => match e {
                RegistrationError::Validation(v) => v.to_string(),
                RegistrationError::Challenge(_) => INVALID_TOKEN.to_string(),
                RegistrationError::Conflict(UniqueField::PhoneNumber) => {
                    "Phone number already exists".to_string()
                }
                RegistrationError::Conflict(UniqueField::ParentPhoneNumber) => {
                    "Parent phone number already exists".to_string()
                }
                RegistrationError::Configuration(_) => CONFIGURATION.to_string(),
                RegistrationError::PersistenceUnavailable(_) => NOT_INITIALIZED.to_string(),
                RegistrationError::Internal(_) => INTERNAL.to_string(),
            },
            RpcError::Challenge(ChallengeError::MissingToken) => {
                ValidationError::TokenRequired.to_string()
            }
            RpcError::Challenge(ChallengeError::NotConfigured) => CONFIGURATION.to_string(),
            RpcError::Challenge(_) => INVALID_TOKEN.to_string(),
            RpcError::Server(_) => INTERNAL.to_string(),
        }
    }

    pub fn is_server_fault(&self) -> bool {
        self.status_code().is_server_error()
    }

    fn log(&self) {
        if self.is_server_fault() {
            error!(status = self.status_code().as_u16(), error = %self, "request failed");
        } else {
            tracing::debug!(error = %self, "request rejected");
        }
    }

    /// `{"success": false, "error": "..."}` with the mapped status.
    pub fn into_json_response(self) -> Response {
        self.log();
        (
            self.status_code(),
            Json(serde_json::json!({ "success": false, "error": self.public_message() })),
        )
            .into_response()
    }
}

/// Plain-text body with the mapped status.
impl IntoResponse for RpcError {
    fn into_response(self) -> Response {
        self.log();
        (self.status_code(), self.public_message()).into_response()
    }
}
