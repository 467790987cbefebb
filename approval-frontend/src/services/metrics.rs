//! Metrics collection and Prometheus export.

use crate::policy::DocumentAction;
use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};
use std::sync::{Mutex, OnceLock};

/// Global handle to the Prometheus recorder.
pub static METRICS_HANDLE: OnceLock<PrometheusHandle> = OnceLock::new();

/// Serializes installation so concurrent callers see one recorder.
static INSTALL_LOCK: Mutex<()> = Mutex::new(());

/// Install the Prometheus recorder. Later calls are no-ops.
pub fn init_metrics() -> anyhow::Result<()> {
    let _guard = INSTALL_LOCK
        .lock()
        .map_err(|_| anyhow::anyhow!("metrics installation lock poisoned"))?;

    if METRICS_HANDLE.get().is_some() {
        return Ok(());
    }

    let handle = PrometheusBuilder::new()
        .install_recorder()
        .map_err(|e| anyhow::anyhow!("failed to install Prometheus recorder: {}", e))?;

    let _ = METRICS_HANDLE.set(handle);
    Ok(())
}

/// Current metrics in Prometheus text format.
pub fn get_metrics() -> String {
    METRICS_HANDLE
        .get()
        .map(|handle| handle.render())
        .unwrap_or_else(|| "# Metrics recorder not initialized".to_string())
}

/// Count an action refused by the review policy before reaching the backend.
pub fn record_policy_denial(action: DocumentAction) {
    metrics::counter!("policy_denials_total", "action" => action.as_str()).increment(1);
}

/// Count an action the backend refused after the policy allowed it.
pub fn record_backend_rejection(action: DocumentAction, status: u16) {
    metrics::counter!(
        "backend_rejections_total",
        "action" => action.as_str(),
        "status" => status.to_string()
    )
    .increment(1);
}
