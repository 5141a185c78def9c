use metrics::{counter, gauge, histogram};
use metrics_exporter_prometheus::PrometheusBuilder;
use std::time::Instant;
use crate::error::{Result, WalletError};

pub struct Metrics;

impl Metrics {
    pub fn init(port: u16) -> Result<()> {
        PrometheusBuilder::new()
            .with_http_listener(([0, 0, 0, 0], port))
            .install()
            .map_err(|e| WalletError::Config(format!("Failed to install Prometheus metrics exporter: {}", e)))
    }

    pub fn record_connect(chain_id: u64, success: bool, duration: f64) {
        let chain = chain_id.to_string();
        counter!("wallet_connect_total", 1, "chain" => chain.clone());
        histogram!("wallet_connect_duration_seconds", duration, "chain" => chain.clone());
        if success {
            counter!("wallet_connect_success", 1, "chain" => chain);
        } else {
            counter!("wallet_connect_failure", 1, "chain" => chain);
        }
    }

    pub fn record_chain_switch(chain_id: u64, outcome: &str) {
        counter!("wallet_chain_switch_total", 1, "chain" => chain_id.to_string(), "outcome" => outcome.to_string());
    }

    pub fn record_chain_registration(chain_id: u64, success: bool) {
        let outcome = if success { "registered" } else { "rejected" };
        counter!("wallet_chain_registration_total", 1, "chain" => chain_id.to_string(), "outcome" => outcome);
    }

    pub fn record_binding(contract: &str) {
        counter!("contract_bindings_total", 1, "contract" => contract.to_string());
    }

    pub fn record_connected(connected: bool) {
        gauge!("wallet_connected", if connected { 1.0 } else { 0.0 });
    }
}

pub struct Timer {
    start: Instant,
}

impl Timer {
    pub fn new() -> Self {
        Self {
            start: Instant::now(),
        }
    }

    pub fn elapsed(&self) -> f64 {
        self.start.elapsed().as_secs_f64()
    }
}
