use crate::imagery::SourceKind;
use crate::mood::AnalysisSource;
use axum::{http::StatusCode, response::IntoResponse};
use lazy_static::lazy_static;
use prometheus::{CounterVec, Encoder, HistogramOpts, HistogramVec, Opts, Registry, TextEncoder};
use std::time::Duration;

/// Metric name prefix for all mood board metrics
const PREFIX: &str = "moodboard";

/// Routes served by the API; anything else is reported as "other".
const KNOWN_PATHS: &[&str] = &[
    "/",
    "/api/analyze-mood",
    "/api/images",
    "/api/generate-image",
    "/api/save-board",
    "/api/example-prompts",
    "/api/health",
];

lazy_static! {
    // Global Prometheus registry
    pub static ref REGISTRY: Registry = Registry::new();

    // HTTP Request Metrics
    pub static ref HTTP_REQUESTS_TOTAL: CounterVec = CounterVec::new(
        Opts::new(format!("{PREFIX}_http_requests_total"), "Total number of HTTP requests"),
        &["method", "path", "status"]
    ).expect("Failed to create http_requests_total metric");

    pub static ref HTTP_REQUEST_DURATION_SECONDS: HistogramVec = HistogramVec::new(
        HistogramOpts::new(
            format!("{PREFIX}_http_request_duration_seconds"),
            "HTTP request duration in seconds"
        )
        .buckets(vec![0.01, 0.05, 0.1, 0.5, 1.0, 5.0, 15.0, 30.0, 60.0, 120.0]),
        &["method", "path"]
    ).expect("Failed to create http_request_duration_seconds metric");

    // Pipeline Metrics
    pub static ref MOOD_CLASSIFICATIONS_TOTAL: CounterVec = CounterVec::new(
        Opts::new(
            format!("{PREFIX}_mood_classifications_total"),
            "Mood classifications by source and failure kind"
        ),
        &["source", "failure"]
    ).expect("Failed to create mood_classifications_total metric");

    pub static ref IMAGES_TOTAL: CounterVec = CounterVec::new(
        Opts::new(format!("{PREFIX}_images_total"), "Board images by source kind"),
        &["source_kind"]
    ).expect("Failed to create images_total metric");
}

/// Initialize all metrics and register them with the Prometheus registry
pub fn init_metrics() {
    // Register all metrics - ignore errors if already registered (for tests)
    let _ = REGISTRY.register(Box::new(HTTP_REQUESTS_TOTAL.clone()));
    let _ = REGISTRY.register(Box::new(HTTP_REQUEST_DURATION_SECONDS.clone()));
    let _ = REGISTRY.register(Box::new(MOOD_CLASSIFICATIONS_TOTAL.clone()));
    let _ = REGISTRY.register(Box::new(IMAGES_TOTAL.clone()));
}

pub fn endpoint_label(path: &str) -> &'static str {
    KNOWN_PATHS
        .iter()
        .find(|known| **known == path)
        .copied()
        .unwrap_or("other")
}

/// Record an HTTP request
pub fn record_http_request(method: &str, path: &str, status: u16, duration: Duration) {
    let path = endpoint_label(path);
    HTTP_REQUESTS_TOTAL
        .with_label_values(&[method, path, &status.to_string()])
        .inc();

    HTTP_REQUEST_DURATION_SECONDS
        .with_label_values(&[method, path])
        .observe(duration.as_secs_f64());
}

/// Record which path produced a mood analysis
pub fn record_classification(source: AnalysisSource, failure: Option<&str>) {
    MOOD_CLASSIFICATIONS_TOTAL
        .with_label_values(&[source.as_str(), failure.unwrap_or("none")])
        .inc();
}

pub fn record_image(kind: SourceKind) {
    IMAGES_TOTAL.with_label_values(&[kind.as_str()]).inc();
}

/// Handler for the /metrics endpoint
pub async fn metrics_handler() -> impl IntoResponse {
    let encoder = TextEncoder::new();
    let metric_families = REGISTRY.gather();

    let mut buffer = vec![];
    match encoder.encode(&metric_families, &mut buffer) {
        Ok(()) => {
            let response = String::from_utf8(buffer).unwrap_or_default();
            (StatusCode::OK, response)
        }
        Err(e) => {
            tracing::error!("Failed to encode metrics: {}", e);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                format!("Failed to encode metrics: {}", e),
            )
        }
    }
}
