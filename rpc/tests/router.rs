//! In-process router tests against nullable collaborators.

use std::sync::Arc;

use axum::body::{to_bytes, Body};
use axum::http::{Request, StatusCode};
use axum::Router;
use tower::ServiceExt;

use wicket_crypto::{HashParams, PasswordHasher};
use wicket_gate::GateConfig;
use wicket_nullables::{NullAccountStore, NullChallengeVerifier, NullStoreFault};
use wicket_registration::RegistrationService;
use wicket_rpc::{build_router, RpcState};

struct Harness {
    store: Arc<NullAccountStore>,
    verifier: Arc<NullChallengeVerifier>,
    state: RpcState,
}

impl Harness {
    fn new(verifier: NullChallengeVerifier, store: NullAccountStore) -> Self {
        let store = Arc::new(store);
        let verifier = Arc::new(verifier);
        let registration = RegistrationService::new(
            store.clone(),
            verifier.clone(),
            PasswordHasher::new(HashParams {
                memory_kib: 64,
                iterations: 1,
                parallelism: 1,
            }),
        );
        let state = RpcState::new(
            registration,
            GateConfig::new(Some("site-key".into()), None),
        );
        Self {
            store,
            verifier,
            state,
        }
    }

    fn accepting() -> Self {
        Self::new(
            NullChallengeVerifier::accepting(&["ok"]),
            NullAccountStore::new(),
        )
    }

    fn router(&self) -> Router {
        build_router(self.state.clone())
    }
}

fn scenario_a() -> serde_json::Value {
    serde_json::json!({
        "fullName": "X",
        "phoneNumber": "100",
        "parentPhoneNumber": "200",
        "password": "p",
        "confirmPassword": "p",
        "challengeToken": "ok"
    })
}

async fn post(app: Router, uri: &str, body: String) -> (StatusCode, String) {
    let response = app
        .oneshot(
            Request::builder()
                .method("POST")
                .uri(uri)
                .header("content-type", "application/json")
                .body(Body::from(body))
                .unwrap(),
        )
        .await
        .unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    (status, String::from_utf8(bytes.to_vec()).unwrap())
}

async fn get(app: Router, uri: &str) -> (StatusCode, String) {
    let response = app
        .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
        .await
        .unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    (status, String::from_utf8(bytes.to_vec()).unwrap())
}

fn json(body: &str) -> serde_json::Value {
    serde_json::from_str(body).unwrap()
}

// ── Register ─────────────────────────────────────────────────────────────

#[tokio::test]
async fn register_success() {
    let h = Harness::accepting();
    let (status, body) = post(h.router(), "/api/auth/register", scenario_a().to_string()).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json(&body), serde_json::json!({ "success": true }));
    let stored = h.store.accounts();
    assert_eq!(stored.len(), 1);
    assert_ne!(stored[0].password_hash.as_str(), "p");
}

#[tokio::test]
async fn register_same_phones() {
    let h = Harness::accepting();
    let mut payload = scenario_a();
    payload["parentPhoneNumber"] = "100".into();

    let (status, body) = post(h.router(), "/api/auth/register", payload.to_string()).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body, "Phone number cannot be the same as parent phone number");
    assert!(h.store.accounts().is_empty());
}

#[tokio::test]
async fn register_twice_conflicts_on_phone() {
    let h = Harness::accepting();
    let (first, _) = post(h.router(), "/api/auth/register", scenario_a().to_string()).await;
    assert_eq!(first, StatusCode::OK);

    let (status, body) = post(h.router(), "/api/auth/register", scenario_a().to_string()).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body, "Phone number already exists");
    assert_eq!(h.store.accounts().len(), 1);
}

#[tokio::test]
async fn register_parent_conflict() {
    let h = Harness::accepting();
    post(h.router(), "/api/auth/register", scenario_a().to_string()).await;

    let mut payload = scenario_a();
    payload["phoneNumber"] = "101".into();
    let (status, body) = post(h.router(), "/api/auth/register", payload.to_string()).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body, "Parent phone number already exists");
}

#[tokio::test]
async fn register_without_secret_is_500_and_silent() {
    let h = Harness::new(NullChallengeVerifier::unconfigured(), NullAccountStore::new());
    let (status, body) = post(h.router(), "/api/auth/register", scenario_a().to_string()).await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body, "Server configuration error");
    assert_eq!(h.verifier.call_count(), 0);
    assert!(h.store.accounts().is_empty());
}

#[tokio::test]
async fn register_with_rejected_token() {
    let h = Harness::accepting();
    let mut payload = scenario_a();
    payload["challengeToken"] = "bad".into();

    let (status, body) = post(h.router(), "/api/auth/register", payload.to_string()).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body, "Invalid reCaptcha token");
}

#[tokio::test]
async fn register_missing_fields_and_token() {
    let h = Harness::accepting();

    let mut payload = scenario_a();
    payload.as_object_mut().unwrap().remove("fullName");
    let (status, body) = post(h.router(), "/api/auth/register", payload.to_string()).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body, "Missing required fields");

    let mut payload = scenario_a();
    payload.as_object_mut().unwrap().remove("challengeToken");
    let (status, body) = post(h.router(), "/api/auth/register", payload.to_string()).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body, "reCaptcha verification required");
}

#[tokio::test]
async fn register_password_mismatch() {
    let h = Harness::accepting();
    let mut payload = scenario_a();
    payload["confirmPassword"] = "q".into();
    let (status, body) = post(h.router(), "/api/auth/register", payload.to_string()).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body, "Passwords do not match");
}

#[tokio::test]
async fn register_accepts_legacy_token_field() {
    let h = Harness::accepting();
    let mut payload = scenario_a();
    let token = payload.as_object_mut().unwrap().remove("challengeToken").unwrap();
    payload["recaptchaToken"] = token;
    let (status, _) = post(h.router(), "/api/auth/register", payload.to_string()).await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn register_malformed_body() {
    let h = Harness::accepting();
    let (status, body) = post(h.router(), "/api/auth/register", "{not json".into()).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body, "Invalid request body");
}

#[tokio::test]
async fn register_before_migration_is_503() {
    let h = Harness::new(
        NullChallengeVerifier::accepting(&["ok"]),
        NullAccountStore::with_fault(NullStoreFault::SchemaMissing),
    );
    let (status, body) = post(h.router(), "/api/auth/register", scenario_a().to_string()).await;
    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(body, "Database not initialized. Please run database migrations.");
}

#[tokio::test]
async fn register_backend_fault_is_500() {
    let h = Harness::new(
        NullChallengeVerifier::accepting(&["ok"]),
        NullAccountStore::with_fault(NullStoreFault::Backend),
    );
    let (status, body) = post(h.router(), "/api/auth/register", scenario_a().to_string()).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body, "Internal server error");
}

// ── Gate ─────────────────────────────────────────────────────────────────

#[tokio::test]
async fn gate_accepts_valid_token() {
    let h = Harness::accepting();
    let (status, body) = post(
        h.router(),
        "/api/auth/verify-recaptcha-gate",
        r#"{"token":"ok"}"#.into(),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json(&body), serde_json::json!({ "success": true }));
}

#[tokio::test]
async fn gate_rejects_bad_token() {
    let h = Harness::accepting();
    let (status, body) = post(
        h.router(),
        "/api/auth/verify-recaptcha-gate",
        r#"{"token":"bad"}"#.into(),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(
        json(&body),
        serde_json::json!({ "success": false, "error": "Invalid reCaptcha token" })
    );
}

#[tokio::test]
async fn gate_missing_token() {
    let h = Harness::accepting();
    for body in [r#"{}"#, r#"{"token":""}"#] {
        let (status, reply) =
            post(h.router(), "/api/auth/verify-recaptcha-gate", body.into()).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(json(&reply)["error"], "Token is required");
    }
    assert_eq!(h.verifier.call_count(), 0);
}

#[tokio::test]
async fn gate_without_secret() {
    let h = Harness::new(NullChallengeVerifier::unconfigured(), NullAccountStore::new());
    let (status, body) = post(
        h.router(),
        "/api/auth/verify-recaptcha-gate",
        r#"{"token":"ok"}"#.into(),
    )
    .await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(
        json(&body),
        serde_json::json!({ "success": false, "error": "Server configuration error" })
    );
}

#[tokio::test]
async fn gate_unreachable_verifier_is_rejection() {
    let h = Harness::new(NullChallengeVerifier::unreachable(), NullAccountStore::new());
    let (status, body) = post(
        h.router(),
        "/api/auth/verify-recaptcha-gate",
        r#"{"token":"ok"}"#.into(),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json(&body)["success"], false);
}

#[tokio::test]
async fn registration_reverifies_gate_token() {
    let h = Harness::accepting();
    let (status, _) = post(
        h.router(),
        "/api/auth/verify-recaptcha-gate",
        r#"{"token":"ok"}"#.into(),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let (status, _) = post(h.router(), "/api/auth/register", scenario_a().to_string()).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(h.verifier.seen_tokens(), vec!["ok", "ok"]);
}

// ── Config / health / metrics ────────────────────────────────────────────

#[tokio::test]
async fn gate_config_exposes_public_settings_only() {
    let h = Harness::accepting();
    let (status, body) = get(h.router(), "/api/auth/gate-config").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        json(&body),
        serde_json::json!({ "siteKey": "site-key", "storageKey": "recaptcha_verified" })
    );
}

#[tokio::test]
async fn health_is_ok() {
    let h = Harness::accepting();
    let (status, body) = get(h.router(), "/health").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json(&body), serde_json::json!({ "status": "ok" }));
}

#[tokio::test]
async fn metrics_count_outcomes() {
    let h = Harness::accepting();
    post(h.router(), "/api/auth/register", scenario_a().to_string()).await;
    post(h.router(), "/api/auth/register", scenario_a().to_string()).await;
    post(
        h.router(),
        "/api/auth/verify-recaptcha-gate",
        r#"{"token":"bad"}"#.into(),
    )
    .await;

    let (status, body) = get(h.router(), "/metrics").await;
    assert_eq!(status, StatusCode::OK);
    assert!(body.contains(r#"wicket_registrations_total{outcome="created"} 1"#));
    assert!(body.contains(r#"wicket_registrations_total{outcome="conflict"} 1"#));
    assert!(body.contains(r#"wicket_gate_verifications_total{outcome="rejected"} 1"#));
}
