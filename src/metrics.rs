use axum::{routing::get, Router};
use metrics::gauge;
use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};

/// Install the Prometheus recorder and publish the configured TTL as a static
/// gauge. Call once at startup, before the first counter fires.
pub fn init_recorder(cache_ttl_secs: u64) -> PrometheusHandle {
    let handle = PrometheusBuilder::new()
        .install_recorder()
        .expect("prometheus: install recorder");
    gauge!("widget_cache_ttl_secs").set(cache_ttl_secs as f64);
    handle
}

/// Router exposing `/metrics` in the Prometheus exposition format; merge it
/// into the main router.
pub fn router(handle: PrometheusHandle) -> Router {
    Router::new().route(
        "/metrics",
        get(move || {
            let h = handle.clone();
            async move { h.render() }
        }),
    )
}
