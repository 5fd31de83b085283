// packages/engine/src/observability/mod.rs
//! Logging and metrics setup
//!
//! - **Tracing**: `tracing-subscriber` fmt layer, `RUST_LOG` overrides the
//!   configured level, optional JSON output
//! - **Metrics**: Prometheus recorder for the counters and histograms the
//!   environment emits (`swarmlab_rounds_total`, `swarmlab_agent_runs_total`,
//!   `swarmlab_agent_failures_total`, `swarmlab_round_duration_seconds`)

use crate::utils::config::ObservabilityConfig;
use crate::utils::errors::{EngineError, Result};
use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};
use tracing_subscriber::EnvFilter;

/// Install the global tracing subscriber
pub fn init_tracing(config: &ObservabilityConfig) -> Result<()> {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&config.log_level))
        .map_err(|e| EngineError::ObservabilityError(format!("Invalid log filter: {}", e)))?;

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr);

    let installed = if config.json_logs {
        builder.json().try_init()
    } else {
        builder.try_init()
    };

    installed.map_err(|e| EngineError::ObservabilityError(format!("Failed to install tracing: {}", e)))
}

/// Install the Prometheus metrics recorder
///
/// The returned handle renders the current metrics in text exposition format.
pub fn init_metrics() -> Result<PrometheusHandle> {
    PrometheusBuilder::new()
        .install_recorder()
        .map_err(|e| EngineError::ObservabilityError(format!("Failed to install metrics recorder: {}", e)))
}
