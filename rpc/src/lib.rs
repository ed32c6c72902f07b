//! HTTP server for the wicket registration service.
//!
//! Provides endpoints for:
//! - Account registration (`POST /api/auth/register`)
//! - Gate token verification (`POST /api/auth/verify-recaptcha-gate`)
//! - Public gate settings (`GET /api/auth/gate-config`)
//! - Liveness (`GET /health`) and Prometheus metrics (`GET /metrics`)

pub mod error;
pub mod handlers;
pub mod metrics;
pub mod server;

pub use error::RpcError;
pub use metrics::RpcMetrics;
pub use server::{build_router, RpcServer, RpcState};
