//! Axum-based HTTP server.

use std::future::Future;
use std::net::SocketAddr;
use std::sync::Arc;

use axum::http::{header, HeaderValue, Method};
use axum::routing::{get, post};
use axum::Router;
use tokio::net::TcpListener;
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use tracing::{info, warn};

use wicket_challenge::ChallengeVerifier;
use wicket_gate::GateConfig;
use wicket_registration::RegistrationService;

use crate::error::RpcError;
use crate::handlers;
use crate::metrics::RpcMetrics;

/// Shared handler state. Holds no per-request mutable data.
#[derive(Clone)]
pub struct RpcState {
    pub registration: RegistrationService,
    /// Used by the gate endpoint. Each call verifies afresh.
    pub verifier: Arc<dyn ChallengeVerifier>,
    pub gate: Arc<GateConfig>,
    pub metrics: Arc<RpcMetrics>,
}

impl RpcState {
    pub fn new(registration: RegistrationService, gate: GateConfig) -> Self {
        Self {
            verifier: registration.verifier().clone(),
            registration,
            gate: Arc::new(gate),
            metrics: Arc::new(RpcMetrics::new()),
        }
    }
}

pub fn build_router(state: RpcState) -> Router {
    Router::new()
        .route("/api/auth/register", post(handlers::register))
        .route("/api/auth/verify-recaptcha-gate", post(handlers::verify_gate))
        .route("/api/auth/gate-config", get(handlers::gate_config))
        .route("/health", get(handlers::health))
        .route("/metrics", get(handlers::metrics))
        .with_state(state)
}

fn cors_layer(origins: &[String]) -> CorsLayer {
    let base = CorsLayer::new()
        .allow_methods([Method::GET, Method::POST])
        .allow_headers([header::CONTENT_TYPE]);

    if origins.iter().any(|o| o == "*") {
        return base.allow_origin(Any);
    }
    let allowed: Vec<HeaderValue> = origins
        .iter()
        .filter_map(|o| match HeaderValue::from_str(o) {
            Ok(value) => Some(value),
            Err(_) => {
                warn!(origin = %o, "ignoring invalid CORS origin");
                None
            }
        })
        .collect();
    base.allow_origin(AllowOrigin::list(allowed))
}

pub struct RpcServer {
    pub addr: SocketAddr,
    cors_origins: Vec<String>,
    state: RpcState,
}

impl RpcServer {
    pub fn new(addr: SocketAddr, state: RpcState) -> Self {
        Self {
            addr,
            cors_origins: Vec::new(),
            state,
        }
    }

    /// Allow cross-origin requests from `origins` (`"*"` allows any).
    pub fn with_cors(mut self, origins: Vec<String>) -> Self {
        self.cors_origins = origins;
        self
    }

    pub fn state(&self) -> &RpcState {
        &self.state
    }

    pub fn router(&self) -> Router {
        let router = build_router(self.state.clone());
        if self.cors_origins.is_empty() {
            router
        } else {
            router.layer(cors_layer(&self.cors_origins))
        }
    }

    /// Bind to the configured address and serve until ctrl-c.
    pub async fn start(self) -> Result<(), RpcError> {
        let listener = TcpListener::bind(self.addr)
            .await
            .map_err(|e| RpcError::Server(format!("failed to bind {}: {e}", self.addr)))?;
        self.serve(listener, async {
            let _ = tokio::signal::ctrl_c().await;
        })
        .await
    }

    /// Serve on an already-bound listener until `shutdown` resolves.
    pub async fn serve<F>(self, listener: TcpListener, shutdown: F) -> Result<(), RpcError>
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let local = listener
            .local_addr()
            .map_err(|e| RpcError::Server(e.to_string()))?;
        info!(addr = %local, "HTTP server listening");

        axum::serve(listener, self.router())
            .with_graceful_shutdown(shutdown)
            .await
            .map_err(|e| RpcError::Server(e.to_string()))?;

        info!("HTTP server stopped");
        Ok(())
    }
}
