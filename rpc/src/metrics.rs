//! Prometheus metrics for the HTTP surface.
//!
//! [`RpcMetrics`] owns a dedicated [`Registry`] that the `/metrics` endpoint
//! encodes into the Prometheus text exposition format.

use prometheus::{
    register_int_counter_vec_with_registry, Encoder, IntCounterVec, Opts, Registry, TextEncoder,
};

pub struct RpcMetrics {
    /// The Prometheus registry that owns every metric below.
    pub registry: Registry,
    /// Registration attempts by outcome (`created`, `conflict`, ...).
    pub registrations: IntCounterVec,
    /// Gate verification attempts by outcome (`verified`, `rejected`, ...).
    pub gate_verifications: IntCounterVec,
}

impl RpcMetrics {
    pub fn new() -> Self {
        let registry = Registry::new();

        let registrations = register_int_counter_vec_with_registry!(
            Opts::new(
                "wicket_registrations_total",
                "Registration attempts by outcome"
            ),
            &["outcome"],
            registry
        )
        .expect("failed to register registrations counter");

        let gate_verifications = register_int_counter_vec_with_registry!(
            Opts::new(
                "wicket_gate_verifications_total",
                "Gate verification attempts by outcome"
            ),
            &["outcome"],
            registry
        )
        .expect("failed to register gate_verifications counter");

        Self {
            registry,
            registrations,
            gate_verifications,
        }
    }

    pub fn record_registration(&self, outcome: &str) {
        self.registrations.with_label_values(&[outcome]).inc();
    }

    pub fn record_gate_verification(&self, outcome: &str) {
        self.gate_verifications.with_label_values(&[outcome]).inc();
    }

    /// Encode every registered metric in the text exposition format.
    pub fn encode(&self) -> Result<String, prometheus::Error> {
        let mut buffer = Vec::new();
        TextEncoder::new().encode(&self.registry.gather(), &mut buffer)?;
        String::from_utf8(buffer).map_err(|e| prometheus::Error::Msg(e.to_string()))
    }
}

impl Default for RpcMetrics {
    fn default() -> Self {
        Self::new()
    }
}
