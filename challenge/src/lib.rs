//! Human-verification challenge checking.
//!
//! A challenge token is produced client-side by the challenge widget and
//! must be confirmed by the external verification service before the server
//! trusts it. Verification is stateless: every call site verifies its own
//! token, and no verdict is ever cached.
//!
//! - [`ChallengeVerifier`] is the seam the rest of the workspace depends on.
//! - [`RecaptchaVerifier`] talks to a reCAPTCHA-compatible `siteverify` endpoint.

pub mod config;
pub mod error;
pub mod recaptcha;
pub mod verifier;

pub use config::{ChallengeConfig, SecretKey};
pub use error::ChallengeError;
pub use recaptcha::RecaptchaVerifier;
pub use verifier::ChallengeVerifier;
