use metrics::{counter, describe_counter, describe_gauge, describe_histogram, gauge, histogram};
use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};
use std::time::Duration;

/// Install the Prometheus recorder and describe every metric
pub fn init_metrics() -> anyhow::Result<PrometheusHandle> {
    let handle = PrometheusBuilder::new()
        .install_recorder()
        .map_err(|e| anyhow::anyhow!("Failed to install Prometheus recorder: {}", e))?;

    init_metric_descriptions();

    Ok(handle)
}

/// Describe metrics (safe to call more than once)
fn init_metric_descriptions() {
    describe_counter!(
        "hoststats_page_requests_total",
        "Total number of page requests served"
    );
    describe_counter!(
        "hoststats_ledger_writes_total",
        "Request ledger writes by outcome"
    );
    describe_histogram!(
        "hoststats_sample_duration_seconds",
        "Time spent sampling host metrics"
    );
    describe_gauge!(
        "hoststats_server_id",
        "Server id this instance registered in the ledger"
    );
    describe_gauge!(
        "hoststats_info",
        "Build information"
    );

    gauge!("hoststats_info", "version" => env!("CARGO_PKG_VERSION")).set(1.0);
}

/// Record a served page
pub fn record_page(route: &'static str) {
    counter!("hoststats_page_requests_total", "route" => route).increment(1);
}

/// Record the outcome of a ledger write
pub fn record_ledger_write(written: bool) {
    let outcome = if written { "written" } else { "dropped" };
    counter!("hoststats_ledger_writes_total", "outcome" => outcome).increment(1);
}

/// Record how long a stats sample took
pub fn record_sample_duration(fast: bool, duration: Duration) {
    let mode = if fast { "fast" } else { "full" };
    histogram!("hoststats_sample_duration_seconds", "mode" => mode).record(duration.as_secs_f64());
}

/// Publish the registered server id
pub fn record_server_id(server_id: i64) {
    gauge!("hoststats_server_id").set(server_id as f64);
}
