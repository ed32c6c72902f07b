//! The client side of the human-verification gate.
//!
//! A browsing session starts out blocked. The [`GateSessionController`] reads
//! the session once, shows the challenge widget until a token is confirmed by
//! the server, then records the verdict in the session so the gate is not
//! shown again until the session ends.

pub mod client;
pub mod config;
pub mod controller;
pub mod error;
pub mod session;
pub mod state;
pub mod widget;

pub use client::{GateVerifyClient, HttpGateClient};
pub use config::{GateConfig, DEFAULT_STORAGE_KEY};
pub use controller::GateSessionController;
pub use error::GateError;
pub use session::{BrowserSession, SessionStorage};
pub use state::{GateNotice, GateState, GateView};
pub use widget::ChallengeWidget;
