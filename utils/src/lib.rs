//! Shared utilities for the wicket registration service.

pub mod logging;

pub use logging::{init_logging, LogFormat};
